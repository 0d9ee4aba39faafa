use glam::{Vec2, Vec3};

use crate::picking::ViewportRect;
use crate::scene::resources::GpuResources;
use crate::transform::TransformMode;
use crate::viewport::ViewportContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Delete,
    Character(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub control: bool,
}

/// Window-system independent input, translated from winit in `window.rs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { button: PointerButton },
    /// Positive values scroll away from the user.
    Wheel { delta_y: f32 },
    Key { key: EditorKey, modifiers: KeyModifiers },
    Resize { width: u32, height: u32 },
}

/// Whether the dispatcher acted on an event. Consumed events must not trigger
/// any default behavior of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Consumed,
    Ignored,
}

impl From<bool> for EventResponse {
    fn from(consumed: bool) -> Self {
        if consumed {
            EventResponse::Consumed
        } else {
            EventResponse::Ignored
        }
    }
}

/// Routes input to picking, the orbit camera and the keyboard shortcuts.
pub struct InputDispatcher {
    viewport: ViewportRect,
}

impl InputDispatcher {
    pub fn new(viewport: ViewportRect) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> ViewportRect {
        self.viewport
    }

    pub fn dispatch(
        &mut self,
        event: InputEvent,
        ctx: &mut ViewportContext,
        resources: &mut dyn GpuResources,
    ) -> EventResponse {
        match event {
            InputEvent::PointerDown {
                button: PointerButton::Primary,
                position,
            } => {
                self.select_at(position, ctx);
                EventResponse::Consumed
            }
            InputEvent::PointerDown {
                button: PointerButton::Secondary,
                position,
            } => {
                ctx.camera.begin_drag(position);
                EventResponse::Consumed
            }
            InputEvent::PointerDown { .. } => EventResponse::Ignored,
            InputEvent::PointerMove { position } => ctx.camera.drag_to(position).into(),
            InputEvent::PointerUp {
                button: PointerButton::Secondary,
            } => {
                ctx.camera.end_drag();
                EventResponse::Consumed
            }
            InputEvent::PointerUp { .. } => EventResponse::Ignored,
            InputEvent::Wheel { delta_y } => {
                ctx.camera.zoom(delta_y);
                EventResponse::Consumed
            }
            InputEvent::Key { key, modifiers } => self.handle_key(key, modifiers, ctx, resources),
            InputEvent::Resize { width, height } => {
                self.viewport = ViewportRect::from_size(width, height);
                ctx.camera.resize(width, height);
                EventResponse::Ignored
            }
        }
    }

    fn select_at(&self, position: Vec2, ctx: &mut ViewportContext) {
        let hit = ctx
            .picking
            .pick(position, self.viewport, &ctx.camera, &ctx.registry);

        match hit {
            Some(id) => {
                ctx.select(id);
            }
            None => ctx.clear_selection(),
        }
    }

    fn handle_key(
        &mut self,
        key: EditorKey,
        modifiers: KeyModifiers,
        ctx: &mut ViewportContext,
        resources: &mut dyn GpuResources,
    ) -> EventResponse {
        if modifiers.control {
            match key {
                EditorKey::Character('z') if modifiers.shift => return ctx.redo(resources).into(),
                EditorKey::Character('z') => return ctx.undo(resources).into(),
                EditorKey::Character('y') => return ctx.redo(resources).into(),
                _ => {}
            }
        }

        if ctx.selection().is_none() {
            return EventResponse::Ignored;
        }

        let step = if modifiers.shift {
            ctx.config.nudge_step_fast
        } else {
            ctx.config.nudge_step
        };

        match key {
            EditorKey::Delete => {
                ctx.remove_selected(resources);
            }
            EditorKey::Character('g') => ctx.set_mode(TransformMode::Translate),
            EditorKey::Character('r') => ctx.set_mode(TransformMode::Rotate),
            EditorKey::Character('s') => ctx.set_mode(TransformMode::Scale),
            EditorKey::ArrowUp => {
                ctx.nudge_selected(Vec3::Y * step);
            }
            EditorKey::ArrowDown => {
                ctx.nudge_selected(Vec3::NEG_Y * step);
            }
            EditorKey::ArrowLeft => {
                ctx.nudge_selected(Vec3::NEG_X * step);
            }
            EditorKey::ArrowRight => {
                ctx.nudge_selected(Vec3::X * step);
            }
            EditorKey::Character(_) => return EventResponse::Ignored,
        }

        EventResponse::Consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::scene::object::{ObjectId, PrimitiveKind};
    use crate::scene::resources::testing::CountingResources;

    struct Harness {
        dispatcher: InputDispatcher,
        ctx: ViewportContext,
        resources: CountingResources,
    }

    impl Harness {
        fn new() -> Self {
            let mut resources = CountingResources::default();
            let config = EditorConfig {
                seed: Some(99),
                ..EditorConfig::default()
            };
            let ctx = ViewportContext::new(config, &mut resources);
            let mut harness = Self {
                dispatcher: InputDispatcher::new(ViewportRect::from_size(1, 1)),
                ctx,
                resources,
            };
            harness.send(InputEvent::Resize {
                width: 800,
                height: 600,
            });
            harness
        }

        fn send(&mut self, event: InputEvent) -> EventResponse {
            self.dispatcher
                .dispatch(event, &mut self.ctx, &mut self.resources)
        }

        /// A cube at the origin, which is where the camera looks.
        fn cube_at_center(&mut self) -> ObjectId {
            let id = self.ctx.add(PrimitiveKind::Cube, &mut self.resources);
            let position = self.ctx.registry.get(id).unwrap().position;
            self.ctx.registry.translate(id, -position);
            id
        }

        fn key(&mut self, key: EditorKey, shift: bool) -> EventResponse {
            self.send(InputEvent::Key {
                key,
                modifiers: KeyModifiers {
                    shift,
                    control: false,
                },
            })
        }

        fn click(&mut self, button: PointerButton, x: f32, y: f32) -> EventResponse {
            self.send(InputEvent::PointerDown {
                button,
                position: Vec2::new(x, y),
            })
        }
    }

    #[test]
    fn primary_click_selects_and_click_on_empty_space_clears() {
        let mut h = Harness::new();
        let id = h.cube_at_center();

        assert_eq!(h.click(PointerButton::Primary, 400.0, 300.0), EventResponse::Consumed);
        assert_eq!(h.ctx.selection(), Some(id));
        assert_eq!(h.ctx.transform.attached(), Some(id));

        h.click(PointerButton::Primary, 5.0, 5.0);
        assert_eq!(h.ctx.selection(), None);
        assert_eq!(h.ctx.transform.attached(), None);
    }

    #[test]
    fn secondary_drag_orbits_only_while_held() {
        let mut h = Harness::new();
        let start = h.ctx.camera.eye();

        assert_eq!(
            h.send(InputEvent::PointerMove {
                position: Vec2::new(50.0, 0.0)
            }),
            EventResponse::Ignored
        );
        assert_eq!(h.ctx.camera.eye(), start);

        h.click(PointerButton::Secondary, 0.0, 0.0);
        h.send(InputEvent::PointerMove {
            position: Vec2::new(50.0, 20.0),
        });
        let orbited = h.ctx.camera.eye();
        assert_ne!(orbited, start);
        assert!((orbited.length() - start.length()).abs() < 1e-4);

        h.send(InputEvent::PointerUp {
            button: PointerButton::Secondary,
        });
        h.send(InputEvent::PointerMove {
            position: Vec2::new(300.0, 300.0),
        });
        assert_eq!(h.ctx.camera.eye(), orbited);
    }

    #[test]
    fn secondary_click_does_not_change_selection() {
        let mut h = Harness::new();
        let id = h.cube_at_center();
        h.ctx.select(id);

        h.click(PointerButton::Secondary, 5.0, 5.0);
        assert_eq!(h.ctx.selection(), Some(id));
    }

    #[test]
    fn wheel_zooms() {
        let mut h = Harness::new();
        let radius = h.ctx.camera.spherical().radius;

        h.send(InputEvent::Wheel { delta_y: 1.0 });
        assert!((h.ctx.camera.spherical().radius - radius * 1.1).abs() < 1e-4);
    }

    #[test]
    fn keys_without_selection_do_nothing() {
        let mut h = Harness::new();
        let id = h.cube_at_center();

        assert_eq!(h.key(EditorKey::Character('s'), false), EventResponse::Ignored);
        assert_eq!(h.key(EditorKey::Delete, false), EventResponse::Ignored);
        assert_eq!(h.key(EditorKey::ArrowUp, false), EventResponse::Ignored);

        assert_eq!(h.ctx.transform.mode(), TransformMode::Translate);
        assert!(h.ctx.registry.contains(id));
        assert_eq!(h.ctx.registry.get(id).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn mode_keys_switch_mode() {
        let mut h = Harness::new();
        let id = h.cube_at_center();
        h.ctx.select(id);

        h.key(EditorKey::Character('r'), false);
        assert_eq!(h.ctx.transform.mode(), TransformMode::Rotate);
        h.key(EditorKey::Character('s'), false);
        assert_eq!(h.ctx.transform.mode(), TransformMode::Scale);
        h.key(EditorKey::Character('g'), false);
        assert_eq!(h.ctx.transform.mode(), TransformMode::Translate);
        assert_eq!(h.key(EditorKey::Character('x'), false), EventResponse::Ignored);
    }

    #[test]
    fn arrows_nudge_with_fine_and_coarse_steps() {
        let mut h = Harness::new();
        let id = h.cube_at_center();
        h.ctx.select(id);

        h.key(EditorKey::ArrowRight, false);
        h.key(EditorKey::ArrowUp, true);
        h.key(EditorKey::ArrowLeft, true);
        h.key(EditorKey::ArrowDown, false);

        let position = h.ctx.registry.get(id).unwrap().position;
        assert!((position - Vec3::new(0.01 - 0.1, 0.1 - 0.01, 0.0)).length() < 1e-6);
    }

    #[test]
    fn delete_removes_selection() {
        let mut h = Harness::new();
        let id = h.cube_at_center();
        h.ctx.select(id);

        assert_eq!(h.key(EditorKey::Delete, false), EventResponse::Consumed);
        assert!(!h.ctx.registry.contains(id));
        assert_eq!(h.ctx.selection(), None);
        assert_eq!(h.ctx.transform.attached(), None);
        assert_eq!(h.resources.geometries_released, 1);

        assert_eq!(h.key(EditorKey::Delete, false), EventResponse::Ignored);
        assert_eq!(h.resources.geometries_released, 1);
    }

    #[test]
    fn control_z_undoes_without_selection() {
        let mut h = Harness::new();
        let id = h.cube_at_center();

        let undo = InputEvent::Key {
            key: EditorKey::Character('z'),
            modifiers: KeyModifiers {
                shift: false,
                control: true,
            },
        };
        // The add is the only recorded command.
        assert_eq!(h.send(undo), EventResponse::Consumed);
        assert!(!h.ctx.registry.contains(id));
        assert_eq!(h.send(undo), EventResponse::Ignored);
    }

    #[test]
    fn control_does_not_block_delete_or_arrows() {
        let mut h = Harness::new();
        let id = h.cube_at_center();
        h.ctx.select(id);
        let control = KeyModifiers {
            shift: false,
            control: true,
        };

        let nudge = InputEvent::Key {
            key: EditorKey::ArrowRight,
            modifiers: control,
        };
        assert_eq!(h.send(nudge), EventResponse::Consumed);
        assert!((h.ctx.registry.get(id).unwrap().position - Vec3::new(0.01, 0.0, 0.0)).length() < 1e-6);

        let delete = InputEvent::Key {
            key: EditorKey::Delete,
            modifiers: control,
        };
        assert_eq!(h.send(delete), EventResponse::Consumed);
        assert!(!h.ctx.registry.contains(id));
    }

    #[test]
    fn resize_updates_viewport_and_aspect() {
        let mut h = Harness::new();
        h.send(InputEvent::Resize {
            width: 1000,
            height: 500,
        });

        assert_eq!(h.dispatcher.viewport(), ViewportRect::from_size(1000, 500));
        assert!((h.ctx.camera.aspect() - 2.0).abs() < 1e-6);
    }
}
