use glam::{Mat4, Vec3};

use crate::math::ray::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn transform(&self, matrix: &Mat4) -> BoundingSphere {
        let center = matrix.transform_point3(self.center);
        let scale = matrix.to_scale_rotation_translation().0;
        let radius = self.radius * scale.abs().max_element();
        BoundingSphere { center, radius }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    /// Distance along the ray to the first point on the sphere, or 0 if the
    /// ray starts inside it.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.contains_point(ray.origin) {
            return Some(0.0);
        }

        let to_center = self.center - ray.origin;
        let along = to_center.dot(ray.direction);
        if along < 0.0 {
            return None;
        }

        let distance_squared = to_center.length_squared() - along * along;
        let radius_squared = self.radius * self.radius;
        if distance_squared > radius_squared {
            return None;
        }

        Some(along - (radius_squared - distance_squared).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_scales_radius_by_largest_axis() {
        let sphere = BoundingSphere {
            center: Vec3::ZERO,
            radius: 1.0,
        };
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 3.0, 2.0),
            glam::Quat::IDENTITY,
            Vec3::new(1.0, 0.0, 0.0),
        );

        let transformed = sphere.transform(&matrix);
        assert_eq!(transformed.center, Vec3::new(1.0, 0.0, 0.0));
        assert!((transformed.radius - 3.0).abs() < 1e-5);
    }

    #[test]
    fn ray_hits_front_of_sphere() {
        let sphere = BoundingSphere {
            center: Vec3::new(0.0, 0.0, -5.0),
            radius: 1.0,
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!((sphere.intersect_ray(&ray).unwrap() - 4.0).abs() < 1e-5);

        let away = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(sphere.intersect_ray(&away), None);

        let beside = Ray::new(Vec3::new(2.0, 0.0, 0.0), Vec3::NEG_Z);
        assert_eq!(sphere.intersect_ray(&beside), None);
    }
}
