use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::scene::geometry::Topology;
use crate::scene::object::{MaterialStyle, Shape};
use crate::viewport::ViewportContext;

/// Per-object uniform block, matches `ObjectData` in the scene shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: Mat4,
    pub normal_matrix: Mat4,
    pub color: Vec4,
    pub emissive: Vec4,
}

impl ObjectUniform {
    pub fn new(model: Mat4, style: MaterialStyle) -> Self {
        Self {
            model,
            normal_matrix: model.inverse().transpose(),
            color: style.color.to_linear().extend(1.0),
            emissive: style.emissive.to_linear().extend(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub geometry: u32,
    pub material: u32,
    pub topology: Topology,
    pub uniform: ObjectUniform,
}

/// Everything visible this frame, with selection highlighting resolved.
/// Triangle meshes come first so line helpers draw over a filled depth buffer.
pub fn collect_draws(ctx: &ViewportContext) -> Vec<DrawItem> {
    let mut items: Vec<DrawItem> = ctx
        .registry
        .iter_all()
        .filter(|object| object.visible)
        .map(|object| DrawItem {
            geometry: object.geometry.slot(),
            material: object.material.slot(),
            topology: match object.shape {
                Shape::Primitive(_) => Topology::Triangles,
                Shape::Helper(_) => Topology::Lines,
            },
            uniform: ObjectUniform::new(object.model_matrix(), ctx.transform.effective_style(object)),
        })
        .collect();

    items.sort_by_key(|item| item.topology == Topology::Lines);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::scene::color::Color;
    use crate::scene::object::{HelperKind, PrimitiveKind};
    use crate::scene::resources::testing::CountingResources;

    fn context() -> (ViewportContext, CountingResources) {
        let mut resources = CountingResources::default();
        let config = EditorConfig {
            seed: Some(3),
            ..EditorConfig::default()
        };
        (ViewportContext::new(config, &mut resources), resources)
    }

    #[test]
    fn helpers_draw_as_lines_after_meshes() {
        let (mut ctx, mut resources) = context();
        ctx.add(PrimitiveKind::Cube, &mut resources);

        let draws = collect_draws(&ctx);
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].topology, Topology::Triangles);
        assert!(draws[1..].iter().all(|item| item.topology == Topology::Lines));
    }

    #[test]
    fn hidden_helpers_are_skipped() {
        let (mut ctx, _) = context();
        ctx.set_helper_visible(HelperKind::Grid, false);
        assert_eq!(collect_draws(&ctx).len(), 1);

        ctx.set_helper_visible(HelperKind::Axes, false);
        assert!(collect_draws(&ctx).is_empty());
    }

    #[test]
    fn selected_object_is_drawn_highlighted() {
        let (mut ctx, mut resources) = context();
        let a = ctx.add(PrimitiveKind::Cube, &mut resources);
        let b = ctx.add(PrimitiveKind::Sphere, &mut resources);
        ctx.select(a);

        let material_of = |id| ctx.registry.get(id).unwrap().material.slot();
        let emissive_of = |slot| {
            collect_draws(&ctx)
                .into_iter()
                .find(|item| item.material == slot)
                .unwrap()
                .uniform
                .emissive
        };

        let highlight = ctx.config.highlight_emissive.to_linear().extend(1.0);
        assert_eq!(emissive_of(material_of(a)), highlight);
        assert_eq!(emissive_of(material_of(b)), Color::BLACK.to_linear().extend(1.0));
    }

    #[test]
    fn uniform_carries_model_and_linear_color() {
        let (mut ctx, mut resources) = context();
        let id = ctx.add(PrimitiveKind::Torus, &mut resources);
        let object = ctx.registry.get(id).unwrap();

        let draw = collect_draws(&ctx)
            .into_iter()
            .find(|item| item.material == object.material.slot())
            .unwrap();
        assert_eq!(draw.uniform.model, object.model_matrix());
        assert_eq!(draw.uniform.color, object.color.to_linear().extend(1.0));
    }
}
