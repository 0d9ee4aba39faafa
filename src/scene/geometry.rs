use std::f32::consts::{PI, TAU};
use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use itertools::iproduct;

use crate::math::bounds::BoundingSphere;
use crate::scene::color::Color;
use crate::scene::object::PrimitiveKind;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// Only used by line geometry, surfaces take their color from the material.
    pub color: Vec3,
}

impl Vertex {
    fn surface(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            color: Vec3::ONE,
        }
    }

    fn line(position: Vec3, color: Color) -> Self {
        Self {
            position,
            normal: Vec3::Y,
            color: color.to_linear(),
        }
    }
}

pub const VERTEX_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, color) as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: &'static str,
    pub topology: Topology,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Cube => cube(1.0),
            PrimitiveKind::Sphere => sphere(1.0, 32, 16),
            PrimitiveKind::Cylinder => frustum("Cylinder", 1.0, 1.0, 1.0, 32),
            PrimitiveKind::Cone => frustum("Cone", 0.0, 1.0, 1.0, 32),
            PrimitiveKind::Torus => torus(1.0, 0.4, 12, 48),
        }
    }

    /// Square grid on the XZ plane. The two center lines are drawn darker.
    pub fn grid(size: f32, divisions: u32) -> Self {
        const CENTER: Color = Color::from_hex(0x444444);
        const LINES: Color = Color::from_hex(0x888888);

        let half = size / 2.0;
        let step = size / divisions as f32;
        let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);

        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            let color = if i == divisions / 2 { CENTER } else { LINES };

            vertices.push(Vertex::line(Vec3::new(-half, 0.0, k), color));
            vertices.push(Vertex::line(Vec3::new(half, 0.0, k), color));
            vertices.push(Vertex::line(Vec3::new(k, 0.0, -half), color));
            vertices.push(Vertex::line(Vec3::new(k, 0.0, half), color));
        }

        let indices = (0..vertices.len() as u32).collect();

        Self {
            name: "Grid",
            topology: Topology::Lines,
            vertices,
            indices,
        }
    }

    pub fn axes(length: f32) -> Self {
        let axes = [
            (Vec3::X, Color::from_hex(0xff0000)),
            (Vec3::Y, Color::from_hex(0x00ff00)),
            (Vec3::Z, Color::from_hex(0x0000ff)),
        ];

        let vertices: Vec<Vertex> = axes
            .iter()
            .flat_map(|&(axis, color)| {
                [
                    Vertex::line(Vec3::ZERO, color),
                    Vertex::line(axis * length, color),
                ]
            })
            .collect();
        let indices = (0..vertices.len() as u32).collect();

        Self {
            name: "Axes",
            topology: Topology::Lines,
            vertices,
            indices,
        }
    }

    pub fn bounding_sphere(&self) -> BoundingSphere {
        let radius = self
            .vertices
            .iter()
            .map(|vertex| vertex.position.length())
            .fold(0.0f32, f32::max);

        BoundingSphere {
            center: Vec3::ZERO,
            radius,
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let indices: &[u32] = match self.topology {
            Topology::Triangles => &self.indices,
            Topology::Lines => &[],
        };

        indices.chunks_exact(3).map(move |triangle| {
            [
                self.vertices[triangle[0] as usize].position,
                self.vertices[triangle[1] as usize].position,
                self.vertices[triangle[2] as usize].position,
            ]
        })
    }
}

fn cube(size: f32) -> MeshData {
    let half = size / 2.0;
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for normal in [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z] {
        // Two axes spanning the face, chosen so that u x v == normal
        let u = if normal.y.abs() > 0.5 {
            Vec3::X
        } else {
            Vec3::Y.cross(normal)
        };
        let v = normal.cross(u);

        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0f32, -1.0f32), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = (normal + u * su + v * sv) * half;
            vertices.push(Vertex::surface(position, normal));
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData {
        name: "Cube",
        topology: Topology::Triangles,
        vertices,
        indices,
    }
}

/// Builds a (cols + 1) x (rows + 1) vertex lattice from a parametric surface.
fn lattice(
    cols: u32,
    rows: u32,
    surface: impl Fn(f32, f32) -> (Vec3, Vec3),
) -> (Vec<Vertex>, Vec<u32>) {
    let vertices = iproduct!(0..=rows, 0..=cols)
        .map(|(row, col)| {
            let (position, normal) = surface(col as f32 / cols as f32, row as f32 / rows as f32);
            Vertex::surface(position, normal)
        })
        .collect();

    let stride = cols + 1;
    let indices = iproduct!(0..rows, 0..cols)
        .flat_map(|(row, col)| {
            let a = row * stride + col;
            let b = a + stride;
            [a, b, a + 1, b, b + 1, a + 1]
        })
        .collect();

    (vertices, indices)
}

fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let (vertices, indices) = lattice(width_segments, height_segments, |u, v| {
        let phi = u * TAU;
        let theta = v * PI;
        let normal = Vec3::new(
            -phi.cos() * theta.sin(),
            theta.cos(),
            phi.sin() * theta.sin(),
        );
        (normal * radius, normal)
    });

    MeshData {
        name: "Sphere",
        topology: Topology::Triangles,
        vertices,
        indices,
    }
}

/// Cylinder or cone around the Y axis, centered on the origin, with caps on
/// every end whose radius is non-zero.
fn frustum(
    name: &'static str,
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> MeshData {
    let half = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;

    let (mut vertices, mut indices) = lattice(radial_segments, 1, |u, v| {
        let angle = u * TAU;
        let radius = radius_top + (radius_bottom - radius_top) * v;
        let (sin, cos) = angle.sin_cos();
        let position = Vec3::new(radius * sin, half - v * height, radius * cos);
        let normal = Vec3::new(sin, slope, cos).normalize();
        (position, normal)
    });

    for (radius, y, normal) in [(radius_top, half, Vec3::Y), (radius_bottom, -half, Vec3::NEG_Y)] {
        if radius <= 0.0 {
            continue;
        }

        let center = vertices.len() as u32;
        vertices.push(Vertex::surface(Vec3::new(0.0, y, 0.0), normal));

        for segment in 0..=radial_segments {
            let (sin, cos) = (segment as f32 / radial_segments as f32 * TAU).sin_cos();
            vertices.push(Vertex::surface(Vec3::new(radius * sin, y, radius * cos), normal));
        }

        for segment in 0..radial_segments {
            let a = center + 1 + segment;
            indices.extend_from_slice(&[center, a, a + 1]);
        }
    }

    MeshData {
        name,
        topology: Topology::Triangles,
        vertices,
        indices,
    }
}

fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let (vertices, indices) = lattice(tubular_segments, radial_segments, |u, v| {
        let (sin_u, cos_u) = (u * TAU).sin_cos();
        let (sin_v, cos_v) = (v * TAU).sin_cos();
        let center = Vec3::new(radius * cos_u, radius * sin_u, 0.0);
        let position = Vec3::new(
            (radius + tube * cos_v) * cos_u,
            (radius + tube * cos_v) * sin_u,
            tube * sin_v,
        );
        (position, (position - center).normalize())
    });

    MeshData {
        name: "Torus",
        topology: Topology::Triangles,
        vertices,
        indices,
    }
}
