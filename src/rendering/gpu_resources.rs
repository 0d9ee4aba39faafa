use wgpu::util::DeviceExt;

use crate::rendering::draw_list::ObjectUniform;
use crate::scene::geometry::{MeshData, Topology};
use crate::scene::resources::{GeometryHandle, GpuResources, MaterialHandle, Slots};

pub struct GpuGeometry {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub topology: Topology,
}

pub struct GpuMaterial {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// wgpu-backed allocator for scene object geometry and materials.
pub struct WgpuResources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    material_layout: wgpu::BindGroupLayout,
    geometries: Slots<GpuGeometry>,
    materials: Slots<GpuMaterial>,
}

impl WgpuResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object material bind group layout"),
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

        Self {
            device: device.clone(),
            queue: queue.clone(),
            material_layout,
            geometries: Slots::new(),
            materials: Slots::new(),
        }
    }

    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_layout
    }

    pub fn geometry(&self, slot: u32) -> Option<&GpuGeometry> {
        self.geometries.get(slot)
    }

    pub fn material(&self, slot: u32) -> Option<&GpuMaterial> {
        self.materials.get(slot)
    }

    pub fn write_material(&self, slot: u32, uniform: &ObjectUniform) {
        if let Some(material) = self.materials.get(slot) {
            self.queue
                .write_buffer(&material.buffer, 0, bytemuck::cast_slice(&[*uniform]));
        }
    }

    /// Destroys whatever is still allocated. Called once at shutdown, after the
    /// scene has released its own handles.
    pub fn destroy_all(&mut self) {
        let mut leaked = 0;
        for geometry in self.geometries.drain() {
            geometry.vertex_buffer.destroy();
            geometry.index_buffer.destroy();
            leaked += 1;
        }
        for material in self.materials.drain() {
            material.buffer.destroy();
            leaked += 1;
        }

        if leaked > 0 {
            log::warn!("Destroyed {leaked} GPU resources that were never released");
        }
    }
}

impl GpuResources for WgpuResources {
    fn create_geometry(&mut self, mesh: &MeshData) -> GeometryHandle {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(mesh.name),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(mesh.name),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        log::trace!(
            "Uploaded {} ({} vertices, {} indices)",
            mesh.name,
            mesh.vertices.len(),
            mesh.indices.len()
        );

        self.geometries.insert_geometry(GpuGeometry {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            topology: mesh.topology,
        })
    }

    fn create_material(&mut self, label: &str) -> MaterialHandle {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ObjectUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        self.materials
            .insert_material(GpuMaterial { buffer, bind_group })
    }

    fn release_geometry(&mut self, handle: GeometryHandle) {
        match self.geometries.take_geometry(handle) {
            Some(geometry) => {
                geometry.vertex_buffer.destroy();
                geometry.index_buffer.destroy();
            }
            None => log::error!("Released a geometry that was not allocated"),
        }
    }

    fn release_material(&mut self, handle: MaterialHandle) {
        match self.materials.take_material(handle) {
            Some(material) => material.buffer.destroy(),
            None => log::error!("Released a material that was not allocated"),
        }
    }
}
