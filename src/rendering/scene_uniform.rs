use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::config::LightingConfig;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniformState {
    pub view_proj: Mat4,
    /// Clip space of the sun's shadow map.
    pub light_view_proj: Mat4,
    pub ambient: Vec4,
    /// Unit vector pointing towards the light.
    pub sun_direction: Vec4,
    pub sun_color: Vec4,
}

impl SceneUniformState {
    pub fn new(view_proj: Mat4, lighting: &LightingConfig) -> Self {
        Self {
            view_proj,
            light_view_proj: light_view_projection(lighting),
            ambient: (lighting.ambient_color.to_linear() * lighting.ambient_intensity).extend(1.0),
            sun_direction: lighting.sun_position.normalize_or_zero().extend(0.0),
            sun_color: (lighting.sun_color.to_linear() * lighting.sun_intensity).extend(1.0),
        }
    }
}

/// Orthographic projection from the sun towards the origin.
pub fn light_view_projection(lighting: &LightingConfig) -> Mat4 {
    let extent = lighting.shadow_extent;
    let view = Mat4::look_at_rh(lighting.sun_position, Vec3::ZERO, Vec3::Y);
    let projection = Mat4::orthographic_rh(
        -extent,
        extent,
        -extent,
        extent,
        lighting.shadow_near,
        lighting.shadow_far,
    );
    projection * view
}

pub struct SceneUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl SceneUniform {
    pub fn new(device: &wgpu::Device, initial_state: SceneUniformState) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene uniform buffer"),
            contents: bytemuck::cast_slice(&[initial_state]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene uniform bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene uniform bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: None,
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, state: SceneUniformState) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[state]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;

    #[test]
    fn lighting_is_premultiplied_by_intensity() {
        let lighting = EditorConfig::default().lighting;
        let state = SceneUniformState::new(Mat4::IDENTITY, &lighting);

        let sun = lighting.sun_color.to_linear() * lighting.sun_intensity;
        assert!((state.sun_color.truncate() - sun).length() < 1e-6);
        assert!((state.sun_direction.truncate().length() - 1.0).abs() < 1e-6);
        assert_eq!(state.sun_direction.w, 0.0);
        assert_eq!(std::mem::size_of::<SceneUniformState>(), 176);
    }

    #[test]
    fn shadow_frustum_covers_the_spawn_area() {
        let lighting = EditorConfig::default().lighting;
        let light = light_view_projection(&lighting);

        for corner in [
            Vec3::new(-2.0, 0.0, -2.0),
            Vec3::new(2.0, 2.0, 2.0),
            Vec3::new(-2.0, 2.0, 2.0),
            Vec3::new(2.0, 0.0, -2.0),
        ] {
            let clip = light.project_point3(corner);
            assert!(clip.x.abs() <= 1.0 && clip.y.abs() <= 1.0, "{corner} -> {clip}");
            assert!((0.0..=1.0).contains(&clip.z), "{corner} -> {clip}");
        }

        // Nearer to the sun means a smaller depth.
        let toward_sun = light.project_point3(lighting.sun_position.normalize());
        let origin = light.project_point3(Vec3::ZERO);
        assert!(toward_sun.z < origin.z);
    }
}
