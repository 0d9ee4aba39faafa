use imgui::Condition;

use crate::menu::MenuEntry;
use crate::scene::color::Color;
use crate::scene::object::{HelperKind, ObjectId, PrimitiveKind};
use crate::scene::resources::GpuResources;
use crate::transform::TransformMode;
use crate::viewport::ViewportContext;

/// A user request from the editor panels. The UI only reads the context while
/// drawing; requests are applied afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChromeAction {
    Add(PrimitiveKind),
    Remove(ObjectId),
    Select(ObjectId),
    SetColor(ObjectId, Color),
    /// The color picker was released.
    EndColorEdit,
    SetMode(TransformMode),
    SetHelperVisible(HelperKind, bool),
    SetBackground(Color),
    Undo,
    Redo,
}

pub fn draw(ui: &imgui::Ui, ctx: &ViewportContext, menu: &[MenuEntry]) -> Vec<ChromeAction> {
    let mut actions = Vec::new();

    ui.main_menu_bar(|| {
        for entry in menu {
            ui.menu(&entry.name, || match entry.name.as_str() {
                "Edit" => {
                    if ui
                        .menu_item_config("Undo")
                        .shortcut("Ctrl+Z")
                        .enabled(ctx.history.can_undo())
                        .build()
                    {
                        actions.push(ChromeAction::Undo);
                    }
                    if ui
                        .menu_item_config("Redo")
                        .shortcut("Ctrl+Y")
                        .enabled(ctx.history.can_redo())
                        .build()
                    {
                        actions.push(ChromeAction::Redo);
                    }
                }
                "Create" => {
                    for kind in PrimitiveKind::ALL {
                        if ui.menu_item(kind.label()) {
                            actions.push(ChromeAction::Add(kind));
                        }
                    }
                }
                _ => ui.text_disabled("Nothing here yet"),
            });
        }
    });

    ui.window("Tools")
        .position([10.0, 30.0], Condition::FirstUseEver)
        .size([220.0, 330.0], Condition::FirstUseEver)
        .build(|| {
            ui.text("Add");
            for kind in PrimitiveKind::ALL {
                if ui.button(kind.label()) {
                    actions.push(ChromeAction::Add(kind));
                }
            }

            ui.separator();
            ui.text("Transform");
            for mode in TransformMode::ALL {
                let active = ctx.transform.mode() == mode;
                if ui.selectable_config(mode.label()).selected(active).build() {
                    actions.push(ChromeAction::SetMode(mode));
                }
            }

            ui.separator();
            for (label, helper) in [("Grid", HelperKind::Grid), ("Axes", HelperKind::Axes)] {
                let mut visible = ctx.registry.helper_visible(helper);
                if ui.checkbox(label, &mut visible) {
                    actions.push(ChromeAction::SetHelperVisible(helper, visible));
                }
            }

            let mut background = ctx.background.to_srgb_f32();
            if ui.color_edit3("Background", &mut background) {
                actions.push(ChromeAction::SetBackground(Color::from_srgb_f32(background)));
            }
        });

    ui.window("Outliner")
        .position([10.0, 370.0], Condition::FirstUseEver)
        .size([300.0, 260.0], Condition::FirstUseEver)
        .build(|| {
            if ctx.registry.is_empty() {
                ui.text_disabled("Scene is empty");
            }

            for object in ctx.registry.objects() {
                let _id = ui.push_id_usize(object.id.0 as usize);
                let selected = ctx.selection() == Some(object.id);
                let label = match object.kind() {
                    Some(kind) => format!("{} {}", kind.label(), object.id.0),
                    None => object.id.to_string(),
                };

                if ui
                    .selectable_config(&label)
                    .selected(selected)
                    .size([110.0, 0.0])
                    .build()
                {
                    actions.push(ChromeAction::Select(object.id));
                }

                ui.same_line();
                let mut color = object.color.to_srgb_f32();
                if ui
                    .color_edit3_config("##color", &mut color)
                    .inputs(false)
                    .build()
                {
                    actions.push(ChromeAction::SetColor(object.id, Color::from_srgb_f32(color)));
                }
                if ui.is_item_deactivated_after_edit() {
                    actions.push(ChromeAction::EndColorEdit);
                }

                ui.same_line();
                if ui.small_button("Delete") {
                    actions.push(ChromeAction::Remove(object.id));
                }
            }
        });

    let selected = match ctx.selection() {
        Some(id) => id.to_string(),
        None => "nothing".to_string(),
    };
    ui.window("Status")
        .position([320.0, 30.0], Condition::FirstUseEver)
        .always_auto_resize(true)
        .build(|| {
            ui.text(format!(
                "{} objects | mode: {} | selected: {selected}",
                ctx.registry.len(),
                ctx.transform.mode()
            ));
        });

    actions
}

pub fn apply(action: ChromeAction, ctx: &mut ViewportContext, resources: &mut dyn GpuResources) {
    log::debug!("Chrome action {action:?}");

    match action {
        ChromeAction::Add(kind) => {
            ctx.add(kind, resources);
        }
        ChromeAction::Remove(id) => {
            ctx.remove(id, resources);
        }
        ChromeAction::Select(id) => {
            ctx.select(id);
        }
        ChromeAction::SetColor(id, color) => {
            ctx.update_color(id, color);
        }
        ChromeAction::EndColorEdit => ctx.end_color_edit(),
        ChromeAction::SetMode(mode) => ctx.set_mode(mode),
        ChromeAction::SetHelperVisible(helper, visible) => ctx.set_helper_visible(helper, visible),
        ChromeAction::SetBackground(color) => ctx.background = color,
        ChromeAction::Undo => {
            ctx.undo(resources);
        }
        ChromeAction::Redo => {
            ctx.redo(resources);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::scene::resources::testing::CountingResources;

    fn context() -> (ViewportContext, CountingResources) {
        let mut resources = CountingResources::default();
        let config = EditorConfig {
            seed: Some(21),
            ..EditorConfig::default()
        };
        (ViewportContext::new(config, &mut resources), resources)
    }

    #[test]
    fn add_select_and_recolor_through_actions() {
        let (mut ctx, mut resources) = context();
        apply(ChromeAction::Add(PrimitiveKind::Cylinder), &mut ctx, &mut resources);
        let id = ctx.registry.objects().next().unwrap().id;

        apply(ChromeAction::Select(id), &mut ctx, &mut resources);
        assert_eq!(ctx.selection(), Some(id));

        let teal = Color::from_hex(0x008080);
        apply(ChromeAction::SetColor(id, teal), &mut ctx, &mut resources);
        assert_eq!(ctx.registry.get(id).unwrap().color, teal);

        apply(ChromeAction::Undo, &mut ctx, &mut resources);
        assert_ne!(ctx.registry.get(id).unwrap().color, teal);
        apply(ChromeAction::Redo, &mut ctx, &mut resources);
        assert_eq!(ctx.registry.get(id).unwrap().color, teal);
    }

    #[test]
    fn releasing_the_picker_splits_color_history() {
        let (mut ctx, mut resources) = context();
        let id = ctx.add(PrimitiveKind::Cube, &mut resources);
        let red = Color::from_hex(0xff0000);
        let dark_red = Color::from_hex(0x800000);
        let blue = Color::from_hex(0x0000ff);

        apply(ChromeAction::SetColor(id, red), &mut ctx, &mut resources);
        apply(ChromeAction::SetColor(id, dark_red), &mut ctx, &mut resources);
        apply(ChromeAction::EndColorEdit, &mut ctx, &mut resources);
        apply(ChromeAction::SetColor(id, blue), &mut ctx, &mut resources);

        // Add, one entry per picker drag.
        assert_eq!(ctx.history.len(), 3);
        apply(ChromeAction::Undo, &mut ctx, &mut resources);
        assert_eq!(ctx.registry.get(id).unwrap().color, dark_red);
    }

    #[test]
    fn delete_button_clears_selection() {
        let (mut ctx, mut resources) = context();
        let id = ctx.add(PrimitiveKind::Cone, &mut resources);
        ctx.select(id);

        apply(ChromeAction::Remove(id), &mut ctx, &mut resources);
        assert!(ctx.registry.is_empty());
        assert_eq!(ctx.selection(), None);
        assert_eq!(ctx.transform.attached(), None);
    }

    #[test]
    fn view_settings() {
        let (mut ctx, mut resources) = context();

        apply(ChromeAction::SetMode(TransformMode::Rotate), &mut ctx, &mut resources);
        assert_eq!(ctx.transform.mode(), TransformMode::Rotate);

        apply(
            ChromeAction::SetHelperVisible(HelperKind::Axes, false),
            &mut ctx,
            &mut resources,
        );
        assert!(!ctx.registry.helper_visible(HelperKind::Axes));
        assert!(ctx.registry.helper_visible(HelperKind::Grid));

        let white = Color::WHITE;
        apply(ChromeAction::SetBackground(white), &mut ctx, &mut resources);
        assert_eq!(ctx.background, white);
    }
}
