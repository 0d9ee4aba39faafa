use std::f32::consts::PI;

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;
use crate::math::ray::Ray;

/// Keeps the polar angle strictly inside the open interval, not on its bounds.
const POLAR_EPSILON: f32 = 1e-4;

/// Spherical coordinates with Y up: `phi` is measured from +Y, `theta` around
/// Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    pub fn from_cartesian(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }

        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_cartesian(self) -> Vec3 {
        let ring = self.phi.sin() * self.radius;
        Vec3::new(
            ring * self.theta.sin(),
            self.phi.cos() * self.radius,
            ring * self.theta.cos(),
        )
    }
}

/// Perspective camera orbiting a fixed target. Every input sample is applied
/// immediately, there is no smoothing between frames.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    spherical: Spherical,
    target: Vec3,
    aspect: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    orbit_speed: f32,
    polar_range: (f32, f32),
    zoom_out_factor: f32,
    zoom_in_factor: f32,
    zoom_limits: Option<(f32, f32)>,
    drag_anchor: Option<Vec2>,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let polar_range = (
            config.polar_margin + POLAR_EPSILON,
            PI - config.polar_margin - POLAR_EPSILON,
        );

        let mut spherical = Spherical::from_cartesian(config.eye);
        spherical.phi = spherical.phi.clamp(polar_range.0, polar_range.1);

        Self {
            spherical,
            target: Vec3::ZERO,
            aspect: 1.0,
            fov_y: config.fov_y_degrees.to_radians(),
            near: config.near,
            far: config.far,
            orbit_speed: config.orbit_speed,
            polar_range,
            zoom_out_factor: config.zoom_out_factor,
            zoom_in_factor: config.zoom_in_factor,
            zoom_limits: config.zoom_limits,
            drag_anchor: None,
        }
    }

    pub fn spherical(&self) -> Spherical {
        self.spherical
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.spherical.to_cartesian()
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn begin_drag(&mut self, pointer: Vec2) {
        self.drag_anchor = Some(pointer);
    }

    /// Orbits by the pointer movement since the last sample. Returns false
    /// when no drag is in progress.
    pub fn drag_to(&mut self, pointer: Vec2) -> bool {
        let Some(anchor) = self.drag_anchor else {
            return false;
        };

        self.orbit(pointer - anchor);
        self.drag_anchor = Some(pointer);
        true
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn orbit(&mut self, delta: Vec2) {
        let (min, max) = self.polar_range;
        self.spherical.theta -= delta.x * self.orbit_speed;
        self.spherical.phi = (self.spherical.phi + delta.y * self.orbit_speed).clamp(min, max);
    }

    /// Positive deltas move away from the target, negative ones toward it.
    pub fn zoom(&mut self, delta_y: f32) {
        let factor = if delta_y > 0.0 {
            self.zoom_out_factor
        } else if delta_y < 0.0 {
            self.zoom_in_factor
        } else {
            return;
        };

        let mut radius = self.spherical.radius * factor;
        if let Some((min, max)) = self.zoom_limits {
            radius = radius.clamp(min, max);
        }
        self.spherical.radius = radius;
    }

    /// Only the aspect ratio changes, the orbit position is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.aspect = width as f32 / height as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point in normalized device coordinates.
    pub fn ray(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::between(near, far)
    }
}
