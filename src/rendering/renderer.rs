use std::sync::Arc;

use anyhow::Context;
use glam::Mat4;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    config::EditorConfig,
    rendering::{
        draw_list::{collect_draws, DrawItem},
        gpu_resources::WgpuResources,
        imgui_renderer::ImguiRendererState,
        pipelines::{
            scene_pipeline_factory, shadow_pipeline_factory, LINES_SHADER, MESH_SHADER,
            SHADOW_SHADER,
        },
        scene_uniform::{SceneUniform, SceneUniformState},
        shader_loader::{PipelineCacheBuilder, PipelineId, ShaderLoader},
        shadow::ShadowMap,
        texture::DepthTexture,
    },
    scene::geometry::Topology,
    viewport::ViewportContext,
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    /// Dropped first on shutdown, while the device is still alive.
    surface: Option<wgpu::Surface<'static>>,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,

    pub resources: WgpuResources,
    scene_uniform: SceneUniform,
    depth_texture: DepthTexture,
    shadow_map: ShadowMap,
    shader_loader: ShaderLoader,
    mesh_pipeline: PipelineId,
    line_pipeline: PipelineId,
    shadow_pipeline: PipelineId,
    imgui: ImguiRendererState,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        config: &EditorConfig,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("Surface reports no supported formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let resources = WgpuResources::new(&device, &queue);
        let scene_uniform = SceneUniform::new(
            &device,
            SceneUniformState::new(Mat4::IDENTITY, &config.lighting),
        );
        let depth_texture = DepthTexture::new(&device, &surface_config, "Depth Texture");
        let shadow_map = ShadowMap::new(&device, config.lighting.shadow_map_size);

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene pipeline layout"),
            bind_group_layouts: &[
                &scene_uniform.bind_group_layout,
                resources.material_layout(),
                &shadow_map.bind_group_layout,
            ],
            push_constant_ranges: &[],
        });
        let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shadow pipeline layout"),
            bind_group_layouts: &[&scene_uniform.bind_group_layout, resources.material_layout()],
            push_constant_ranges: &[],
        });

        let mut cache_builder = PipelineCacheBuilder::new();
        let mesh_pipeline = cache_builder.add_shader(
            MESH_SHADER,
            scene_pipeline_factory(
                layout.clone(),
                surface_format,
                wgpu::PrimitiveTopology::TriangleList,
            ),
        );
        let line_pipeline = cache_builder.add_shader(
            LINES_SHADER,
            scene_pipeline_factory(layout, surface_format, wgpu::PrimitiveTopology::LineList),
        );
        let shadow_pipeline =
            cache_builder.add_shader(SHADOW_SHADER, shadow_pipeline_factory(shadow_layout));
        let shader_loader =
            ShaderLoader::new(&device, cache_builder, config.shader_hot_reload)?;

        let imgui = ImguiRendererState::new(&device, &queue, surface_format, imgui_context);

        log::info!(
            "Renderer ready on {} ({:?}, {surface_format:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        Ok(Self {
            window,
            size,
            surface: Some(surface),
            surface_config,
            device,
            queue,
            resources,
            scene_uniform,
            depth_texture,
            shadow_map,
            shader_loader,
            mesh_pipeline,
            line_pipeline,
            shadow_pipeline,
            imgui,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };

        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            surface.configure(&self.device, &self.surface_config);
            self.depth_texture.resize(&self.device, &self.surface_config);
        }
    }

    pub fn render(
        &mut self,
        ctx: &ViewportContext,
        draw_data: &imgui::DrawData,
    ) -> Result<(), wgpu::SurfaceError> {
        let Some(surface) = self.surface.as_ref() else {
            return Ok(());
        };

        self.shader_loader.load_pending_shaders();

        self.scene_uniform.update(
            &self.queue,
            SceneUniformState::new(ctx.camera.view_projection(), &ctx.config.lighting),
        );

        let draws = collect_draws(ctx);
        for item in &draws {
            self.resources.write_material(item.material, &item.uniform);
        }

        let output = surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.render_shadows(&mut encoder, &draws);

        {
            let background = ctx.background.to_linear();
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background.x as f64,
                            g: background.y as f64,
                            b: background.z as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_texture.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.scene_uniform.bind_group, &[]);
            render_pass.set_bind_group(2, &self.shadow_map.bind_group, &[]);
            self.draw_items(&mut render_pass, &draws);
        }

        self.imgui
            .render(&view, draw_data, &self.device, &self.queue, &mut encoder);

        self.queue.submit([encoder.finish()]);
        output.present();

        Ok(())
    }

    /// Depth from the sun for every triangle mesh. Helpers cast no shadows.
    fn render_shadows(&self, encoder: &mut wgpu::CommandEncoder, draws: &[DrawItem]) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow render pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.shadow_map.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(pipeline) = self.shader_loader.cache.get(self.shadow_pipeline) else {
            return;
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.scene_uniform.bind_group, &[]);

        for item in draws.iter().filter(|item| item.topology == Topology::Triangles) {
            let (Some(geometry), Some(material)) = (
                self.resources.geometry(item.geometry),
                self.resources.material(item.material),
            ) else {
                continue;
            };

            render_pass.set_bind_group(1, &material.bind_group, &[]);
            render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
            render_pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
        }
    }

    fn draw_items(&self, render_pass: &mut wgpu::RenderPass<'_>, draws: &[DrawItem]) {
        let mut bound: Option<Topology> = None;

        for item in draws {
            let (Some(geometry), Some(material)) = (
                self.resources.geometry(item.geometry),
                self.resources.material(item.material),
            ) else {
                log::warn!("Skipping draw with missing GPU resources");
                continue;
            };

            if bound != Some(item.topology) {
                let id = match item.topology {
                    Topology::Triangles => self.mesh_pipeline,
                    Topology::Lines => self.line_pipeline,
                };
                let Some(pipeline) = self.shader_loader.cache.get(id) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                bound = Some(item.topology);
            }

            render_pass.set_bind_group(1, &material.bind_group, &[]);
            render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
            render_pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
        }
    }

    /// First shutdown step: the window stops being a render target.
    pub fn detach_surface(&mut self) {
        if self.surface.take().is_some() {
            log::debug!("Render surface detached");
        }
    }

    /// Last shutdown step. The scene must have released its handles already.
    pub fn dispose(mut self) {
        self.detach_surface();
        self.resources.destroy_all();
        self.device.destroy();
        log::debug!("Graphics device destroyed");
    }
}
