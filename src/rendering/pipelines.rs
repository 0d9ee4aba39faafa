use crate::rendering::shader_loader::{PipelineFactory, ShaderDefinition};
use crate::rendering::texture::DepthTexture;
use crate::scene::geometry::VERTEX_LAYOUT;

pub const MESH_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Mesh",
    path: "mesh.wgsl",
    embedded: include_str!("../../assets/shaders/mesh.wgsl"),
};

pub const LINES_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Lines",
    path: "lines.wgsl",
    embedded: include_str!("../../assets/shaders/lines.wgsl"),
};

pub const SHADOW_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Shadow",
    path: "shadow.wgsl",
    embedded: include_str!("../../assets/shaders/shadow.wgsl"),
};

/// Both scene pipelines share the same bind groups: scene uniform at 0,
/// per-object uniform at 1, shadow map at 2.
pub fn scene_pipeline_factory(
    layout: wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> PipelineFactory {
    Box::new(move |device, def, source| {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(def.name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(def.name),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[VERTEX_LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTexture::DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            }),
        )
    })
}

/// Depth-only pipeline for the shadow pass. The slope bias keeps lit faces
/// from shadowing themselves.
pub fn shadow_pipeline_factory(layout: wgpu::PipelineLayout) -> PipelineFactory {
    Box::new(move |device, def, source| {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(def.name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(def.name),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &module,
                    entry_point: Some("vs_main"),
                    buffers: &[VERTEX_LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DepthTexture::DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            }),
        )
    })
}
