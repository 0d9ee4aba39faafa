pub struct DepthTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    label: String,
}

impl DepthTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: impl Into<String>,
    ) -> Self {
        let label: String = label.into();
        let texture = Self::create_wgpu_texture(device, config, &label);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        DepthTexture {
            texture,
            view,
            label,
        }
    }

    fn create_wgpu_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };

        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) {
        self.texture.destroy();
        self.texture = Self::create_wgpu_texture(device, config, &self.label);
        self.view = self
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
