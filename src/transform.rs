use std::fmt;

use crate::scene::color::Color;
use crate::scene::object::{MaterialStyle, ObjectId, SceneObject};
use crate::scene::resources::MaterialKey;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub const ALL: [TransformMode; 3] = [
        TransformMode::Translate,
        TransformMode::Rotate,
        TransformMode::Scale,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TransformMode::Translate => "Translate",
            TransformMode::Rotate => "Rotate",
            TransformMode::Scale => "Scale",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub id: ObjectId,
    /// Material the object had when it was attached.
    pub base_material: MaterialKey,
    pub emissive: Color,
}

/// Tracks the single object being manipulated and the active mode.
///
/// Highlighting never touches the object itself: the controller keeps an
/// emissive override for the attached id and the renderer asks
/// [`TransformController::effective_style`] for the color to draw.
#[derive(Debug, Clone)]
pub struct TransformController {
    attached: Option<Attachment>,
    mode: TransformMode,
    highlight: Color,
}

impl TransformController {
    pub fn new(highlight: Color) -> Self {
        Self {
            attached: None,
            mode: TransformMode::default(),
            highlight,
        }
    }

    pub fn attach(&mut self, object: &SceneObject) {
        self.detach();

        self.attached = Some(Attachment {
            id: object.id,
            base_material: object.material.key(),
            emissive: self.highlight,
        });
    }

    pub fn detach(&mut self) {
        if let Some(attachment) = self.attached.take() {
            log::trace!("Detached {}", attachment.id);
        }
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn attached(&self) -> Option<ObjectId> {
        self.attached.map(|attachment| attachment.id)
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attached.as_ref()
    }

    pub fn is_attached(&self, id: ObjectId) -> bool {
        self.attached() == Some(id)
    }

    /// The object's own material, with the highlight applied when it is attached.
    pub fn effective_style(&self, object: &SceneObject) -> MaterialStyle {
        match self.attached {
            Some(attachment) if attachment.id == object.id => MaterialStyle {
                color: object.color,
                emissive: attachment.emissive,
            },
            _ => object.base_style(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::config::EditorConfig;
    use crate::scene::object::PrimitiveKind;
    use crate::scene::registry::SceneObjectRegistry;
    use crate::scene::resources::testing::CountingResources;

    const HIGHLIGHT: Color = Color::from_hex(0x444444);

    fn two_objects() -> (SceneObjectRegistry, ObjectId, ObjectId) {
        let mut resources = CountingResources::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut registry = SceneObjectRegistry::new(&EditorConfig::default(), &mut resources);
        let a = registry.add(PrimitiveKind::Cube, &mut rng, &mut resources);
        let b = registry.add(PrimitiveKind::Sphere, &mut rng, &mut resources);
        (registry, a, b)
    }

    #[test]
    fn attach_then_detach_restores_base_appearance() {
        let (registry, a, _) = two_objects();
        let object = registry.get(a).unwrap();
        let base_material = object.material.key();
        let mut controller = TransformController::new(HIGHLIGHT);

        controller.attach(object);
        assert_eq!(controller.attached(), Some(a));
        assert_eq!(controller.attachment().unwrap().base_material, base_material);
        let highlighted = controller.effective_style(object);
        assert_eq!(highlighted.emissive, HIGHLIGHT);
        assert_eq!(highlighted.color, object.color);

        controller.detach();
        assert_eq!(controller.attached(), None);
        assert_eq!(controller.effective_style(object), object.base_style());
        assert_eq!(object.material.key(), base_material);
    }

    #[test]
    fn detach_is_idempotent() {
        let (registry, a, _) = two_objects();
        let mut controller = TransformController::new(HIGHLIGHT);
        controller.attach(registry.get(a).unwrap());

        controller.detach();
        controller.detach();
        assert_eq!(controller.attached(), None);

        let mut fresh = TransformController::new(HIGHLIGHT);
        fresh.detach();
        assert_eq!(fresh.attached(), None);
    }

    #[test]
    fn only_one_object_is_attached() {
        let (registry, a, b) = two_objects();
        let object_a = registry.get(a).unwrap();
        let object_b = registry.get(b).unwrap();
        let mut controller = TransformController::new(HIGHLIGHT);

        controller.attach(object_a);
        controller.attach(object_b);

        assert_eq!(controller.attached(), Some(b));
        assert_eq!(controller.effective_style(object_a), object_a.base_style());
        assert_eq!(controller.effective_style(object_b).emissive, HIGHLIGHT);
    }

    #[test]
    fn mode_survives_attachment_changes() {
        let (registry, a, b) = two_objects();
        let mut controller = TransformController::new(HIGHLIGHT);
        assert_eq!(controller.mode(), TransformMode::Translate);

        controller.set_mode(TransformMode::Scale);
        controller.attach(registry.get(a).unwrap());
        controller.attach(registry.get(b).unwrap());
        controller.detach();

        assert_eq!(controller.mode(), TransformMode::Scale);
    }
}
