use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Always normalized.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn between(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from)
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Möller–Trumbore. Both faces count as hits, returns the distance along the ray.
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3]) -> Option<f32> {
        const EPSILON: f32 = 1e-7;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let determinant = edge1.dot(p);
        if determinant.abs() < EPSILON {
            return None;
        }

        let inverse = 1.0 / determinant;
        let s = self.origin - a;
        let u = s.dot(p) * inverse;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inverse;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inverse;
        (t > EPSILON).then_some(t)
    }

    /// Hit distance against a triangle given in object space, measured in world space.
    pub fn intersect_transformed_triangle(&self, triangle: [Vec3; 3], model: &Mat4) -> Option<f32> {
        self.intersect_triangle(triangle.map(|vertex| model.transform_point3(vertex)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: [Vec3; 3] = [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];

    #[test]
    fn hits_triangle_in_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let t = ray.intersect_triangle(TRIANGLE).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
        assert!(ray.at(t).length() < 1e-5);
    }

    #[test]
    fn back_faces_are_hit_too() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        assert!(ray.intersect_triangle(TRIANGLE).is_some());
    }

    #[test]
    fn misses_behind_and_outside() {
        let behind = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Z);
        assert_eq!(behind.intersect_triangle(TRIANGLE), None);

        let outside = Ray::new(Vec3::new(5.0, 0.0, 3.0), Vec3::NEG_Z);
        assert_eq!(outside.intersect_triangle(TRIANGLE), None);

        let parallel = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::X);
        assert_eq!(parallel.intersect_triangle(TRIANGLE), None);
    }

    #[test]
    fn transformed_triangle_uses_world_distance() {
        let model = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let t = ray.intersect_transformed_triangle(TRIANGLE, &model).unwrap();
        assert!((t - 5.0).abs() < 1e-5);
    }
}
