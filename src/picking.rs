use std::collections::HashMap;

use glam::Vec2;

use crate::camera::OrbitCamera;
use crate::math::bounds::BoundingSphere;
use crate::math::ray::Ray;
use crate::scene::geometry::MeshData;
use crate::scene::object::{ObjectId, PrimitiveKind};
use crate::scene::registry::SceneObjectRegistry;

/// Pixel rectangle of the viewport inside the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Maps a pointer position to `[-1, 1]` with +Y up.
    pub fn to_ndc(&self, pointer: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }

        Some(Vec2::new(
            (pointer.x - self.x) / self.width * 2.0 - 1.0,
            -((pointer.y - self.y) / self.height * 2.0 - 1.0),
        ))
    }
}

struct PickMesh {
    mesh: MeshData,
    bounds: BoundingSphere,
}

/// Resolves the object under the pointer by casting a ray against CPU copies
/// of the primitive meshes.
pub struct PickingService {
    meshes: HashMap<PrimitiveKind, PickMesh>,
}

impl PickingService {
    pub fn new() -> Self {
        let meshes = PrimitiveKind::ALL
            .into_iter()
            .map(|kind| {
                let mesh = MeshData::primitive(kind);
                let bounds = mesh.bounding_sphere();
                (kind, PickMesh { mesh, bounds })
            })
            .collect();

        Self { meshes }
    }

    pub fn pick(
        &self,
        pointer: Vec2,
        viewport: ViewportRect,
        camera: &OrbitCamera,
        registry: &SceneObjectRegistry,
    ) -> Option<ObjectId> {
        let ndc = viewport.to_ndc(pointer)?;
        self.pick_ray(&camera.ray(ndc), registry)
    }

    /// Nearest pickable object along the ray. Helpers are never candidates.
    pub fn pick_ray(&self, ray: &Ray, registry: &SceneObjectRegistry) -> Option<ObjectId> {
        let mut nearest: Option<(ObjectId, f32)> = None;

        for object in registry.pickable() {
            let Some(pick_mesh) = object.kind().and_then(|kind| self.meshes.get(&kind)) else {
                continue;
            };

            let model = object.model_matrix();
            let Some(entry) = pick_mesh.bounds.transform(&model).intersect_ray(ray) else {
                continue;
            };
            if nearest.is_some_and(|(_, best)| entry > best) {
                continue;
            }

            let hit = pick_mesh
                .mesh
                .triangles()
                .filter_map(|triangle| ray.intersect_transformed_triangle(triangle, &model))
                .min_by(f32::total_cmp);

            if let Some(distance) = hit {
                if nearest.map_or(true, |(_, best)| distance < best) {
                    nearest = Some((object.id, distance));
                }
            }
        }

        nearest.map(|(id, _)| id)
    }
}

impl Default for PickingService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::config::EditorConfig;
    use crate::scene::resources::testing::CountingResources;

    fn registry_with(positions: &[(PrimitiveKind, Vec3)]) -> (SceneObjectRegistry, Vec<ObjectId>) {
        let mut resources = CountingResources::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut registry = SceneObjectRegistry::new(&EditorConfig::default(), &mut resources);

        let ids = positions
            .iter()
            .map(|&(kind, position)| {
                let id = registry.add(kind, &mut rng, &mut resources);
                let current = registry.get(id).unwrap().position;
                registry.translate(id, position - current);
                id
            })
            .collect();

        (registry, ids)
    }

    #[test]
    fn ndc_maps_corners_and_center() {
        let rect = ViewportRect {
            x: 100.0,
            y: 50.0,
            width: 800.0,
            height: 600.0,
        };

        assert_eq!(rect.to_ndc(Vec2::new(100.0, 50.0)), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(rect.to_ndc(Vec2::new(500.0, 350.0)), Some(Vec2::ZERO));
        assert_eq!(rect.to_ndc(Vec2::new(900.0, 650.0)), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(ViewportRect::from_size(0, 600).to_ndc(Vec2::ZERO), None);
    }

    #[test]
    fn nearest_object_wins() {
        let (registry, ids) = registry_with(&[
            (PrimitiveKind::Cube, Vec3::new(0.0, 0.0, -10.0)),
            (PrimitiveKind::Sphere, Vec3::new(0.0, 0.0, -5.0)),
        ]);
        let picking = PickingService::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert_eq!(picking.pick_ray(&ray, &registry), Some(ids[1]));
    }

    #[test]
    fn miss_returns_none() {
        let (registry, _) = registry_with(&[(PrimitiveKind::Cube, Vec3::new(0.0, 0.0, -5.0))]);
        let picking = PickingService::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        assert_eq!(picking.pick_ray(&ray, &registry), None);
    }

    #[test]
    fn torus_hole_is_not_a_hit() {
        let (registry, _) = registry_with(&[(PrimitiveKind::Torus, Vec3::new(0.0, 0.0, -5.0))]);
        let picking = PickingService::new();

        let through_hole = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(picking.pick_ray(&through_hole, &registry), None);

        let through_ring = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_Z);
        assert!(picking.pick_ray(&through_ring, &registry).is_some());
    }

    #[test]
    fn helpers_are_ignored() {
        let (registry, _) = registry_with(&[]);
        let picking = PickingService::new();

        // Straight down onto the grid and along the X axis helper.
        let down = Ray::new(Vec3::new(0.5, 5.0, 0.5), Vec3::NEG_Y);
        let along_axis = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X);
        assert_eq!(picking.pick_ray(&down, &registry), None);
        assert_eq!(picking.pick_ray(&along_axis, &registry), None);
    }

    #[test]
    fn pick_through_camera_hits_object_at_target() {
        let (registry, ids) = registry_with(&[(PrimitiveKind::Cube, Vec3::ZERO)]);
        let picking = PickingService::new();
        let mut camera = OrbitCamera::new(&EditorConfig::default().camera);
        camera.resize(800, 600);
        let viewport = ViewportRect::from_size(800, 600);

        let center = Vec2::new(400.0, 300.0);
        assert_eq!(picking.pick(center, viewport, &camera, &registry), Some(ids[0]));

        let corner = Vec2::new(2.0, 2.0);
        assert_eq!(picking.pick(corner, viewport, &camera, &registry), None);
    }
}
