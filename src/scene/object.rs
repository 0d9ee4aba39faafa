use std::fmt;
use std::str::FromStr;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::scene::color::Color;
use crate::scene::resources::{GeometryHandle, MaterialHandle};

/// Unique for the lifetime of a registry, never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Cylinder,
    Cone,
    Torus,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 5] = [
        PrimitiveKind::Cube,
        PrimitiveKind::Sphere,
        PrimitiveKind::Cylinder,
        PrimitiveKind::Cone,
        PrimitiveKind::Torus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Cube => "cube",
            PrimitiveKind::Sphere => "sphere",
            PrimitiveKind::Cylinder => "cylinder",
            PrimitiveKind::Cone => "cone",
            PrimitiveKind::Torus => "torus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrimitiveKind::Cube => "Cube",
            PrimitiveKind::Sphere => "Sphere",
            PrimitiveKind::Cylinder => "Cylinder",
            PrimitiveKind::Cone => "Cone",
            PrimitiveKind::Torus => "Torus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPrimitive(pub String);

impl fmt::Display for UnknownPrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown primitive type: {}", self.0)
    }
}

impl std::error::Error for UnknownPrimitive {}

impl FromStr for PrimitiveKind {
    type Err = UnknownPrimitive;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownPrimitive(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperKind {
    Grid,
    Axes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Primitive(PrimitiveKind),
    Helper(HelperKind),
}

/// What the renderer needs to shade a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialStyle {
    pub color: Color,
    pub emissive: Color,
}

impl MaterialStyle {
    pub fn base(color: Color) -> Self {
        Self {
            color,
            emissive: Color::BLACK,
        }
    }
}

pub struct SceneObject {
    pub id: ObjectId,
    pub shape: Shape,
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Color,
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub helper: bool,
    pub pickable: bool,
    pub visible: bool,
}

impl SceneObject {
    pub fn kind(&self) -> Option<PrimitiveKind> {
        match self.shape {
            Shape::Primitive(kind) => Some(kind),
            Shape::Helper(_) => None,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }

    pub fn base_style(&self) -> MaterialStyle {
        MaterialStyle::base(self.color)
    }
}

impl fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneObject")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("position", &self.position)
            .field("color", &self.color)
            .field("visible", &self.visible)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_names_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.name().parse::<PrimitiveKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_primitive_is_rejected() {
        assert_eq!(
            "unknown".parse::<PrimitiveKind>(),
            Err(UnknownPrimitive("unknown".to_string()))
        );
        assert!("Cube".parse::<PrimitiveKind>().is_err());
    }
}
