use glam::Vec3;
use rand::{rngs::StdRng, SeedableRng};

use crate::camera::OrbitCamera;
use crate::config::EditorConfig;
use crate::history::{Command, HistoryStack};
use crate::picking::PickingService;
use crate::scene::color::Color;
use crate::scene::object::{HelperKind, ObjectId, PrimitiveKind};
use crate::scene::registry::{ObjectSnapshot, SceneObjectRegistry};
use crate::scene::resources::GpuResources;
use crate::transform::{TransformController, TransformMode};

/// All editor state for one viewport: objects, selection, manipulation mode,
/// camera and undo history. Created once and handed to the input and render
/// code by reference.
pub struct ViewportContext {
    pub config: EditorConfig,
    pub registry: SceneObjectRegistry,
    pub transform: TransformController,
    pub camera: OrbitCamera,
    pub picking: PickingService,
    pub history: HistoryStack,
    pub background: Color,
    selection: Option<ObjectId>,
    rng: StdRng,
}

impl ViewportContext {
    pub fn new(config: EditorConfig, resources: &mut dyn GpuResources) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            registry: SceneObjectRegistry::new(&config, resources),
            transform: TransformController::new(config.highlight_emissive),
            camera: OrbitCamera::new(&config.camera),
            picking: PickingService::new(),
            history: HistoryStack::new(),
            background: config.background,
            selection: None,
            rng,
            config,
        }
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    pub fn add(&mut self, kind: PrimitiveKind, resources: &mut dyn GpuResources) -> ObjectId {
        let id = self.registry.add(kind, &mut self.rng, resources);
        if let Some(snapshot) = self.registry.snapshot(id) {
            self.history.push(Command::Add(snapshot));
        }
        id
    }

    pub fn add_named(&mut self, name: &str, resources: &mut dyn GpuResources) -> Option<ObjectId> {
        let kind = name.parse::<PrimitiveKind>().ok()?;
        Some(self.add(kind, resources))
    }

    /// Removes an object. If it was selected, the selection and the transform
    /// attachment are cleared as part of the same call.
    pub fn remove(&mut self, id: ObjectId, resources: &mut dyn GpuResources) -> bool {
        match self.remove_untracked(id, resources) {
            Some(snapshot) => {
                self.history.push(Command::Remove(snapshot));
                true
            }
            None => false,
        }
    }

    fn remove_untracked(
        &mut self,
        id: ObjectId,
        resources: &mut dyn GpuResources,
    ) -> Option<ObjectSnapshot> {
        if self.selection == Some(id) || self.transform.is_attached(id) {
            self.clear_selection();
        }
        self.registry.remove(id, resources)
    }

    pub fn update_color(&mut self, id: ObjectId, color: Color) -> bool {
        let Some(from) = self.registry.get(id).map(|object| object.color) else {
            return false;
        };
        if from == color {
            return true;
        }

        self.registry.update_color(id, color);
        self.history.push(Command::ColorChange {
            id,
            from,
            to: color,
        });
        true
    }

    /// Selects a live object and attaches the transform controller to it.
    pub fn select(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.registry.get(id) else {
            return false;
        };

        self.transform.attach(object);
        self.selection = Some(id);
        log::debug!("Selected {id}");
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.transform.detach();
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        self.transform.set_mode(mode);
    }

    /// Moves the selected object. Positions are only ever written through the registry.
    pub fn nudge_selected(&mut self, delta: Vec3) -> bool {
        match self.selection {
            Some(id) => self.registry.translate(id, delta),
            None => false,
        }
    }

    pub fn remove_selected(&mut self, resources: &mut dyn GpuResources) -> bool {
        match self.selection {
            Some(id) => self.remove(id, resources),
            None => false,
        }
    }

    /// The color picker was released; later changes are a separate undo step.
    pub fn end_color_edit(&mut self) {
        self.history.end_edit();
    }

    pub fn set_helper_visible(&mut self, helper: HelperKind, visible: bool) {
        self.registry.set_helper_visible(helper, visible);
    }

    pub fn undo(&mut self, resources: &mut dyn GpuResources) -> bool {
        let Some(command) = self.history.undo() else {
            return false;
        };

        match command {
            Command::Add(snapshot) => {
                // Keep edits made since the add (nudges) for the redo.
                if let Some(latest) = self.remove_untracked(snapshot.id, resources) {
                    self.history.replace_undone(Command::Add(latest));
                }
            }
            Command::Remove(snapshot) => {
                self.registry.restore(snapshot, resources);
            }
            Command::ColorChange { id, from, .. } => {
                self.registry.update_color(id, from);
            }
        }

        log::debug!("Undid {command:?}");
        true
    }

    pub fn redo(&mut self, resources: &mut dyn GpuResources) -> bool {
        let Some(command) = self.history.redo() else {
            return false;
        };

        match command {
            Command::Add(snapshot) => {
                self.registry.restore(snapshot, resources);
            }
            Command::Remove(snapshot) => {
                if let Some(latest) = self.remove_untracked(snapshot.id, resources) {
                    self.history.replace_redone(Command::Remove(latest));
                }
            }
            Command::ColorChange { id, to, .. } => {
                self.registry.update_color(id, to);
            }
        }

        log::debug!("Redid {command:?}");
        true
    }

    /// Releases every GPU resource owned by the scene.
    pub fn release(&mut self, resources: &mut dyn GpuResources) {
        self.clear_selection();
        self.registry.clear(resources);
    }
}
