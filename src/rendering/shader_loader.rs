use std::{
    path::Path,
    sync::{
        mpsc::{self, channel},
        Arc,
    },
    time::Duration,
};

use anyhow::Context;
use id_arena::{Arena, Id};
use notify_debouncer_mini::{
    new_debouncer_opt, notify::*, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::{PollType, RenderPipeline};

const SHADER_FOLDER: &str = "assets/shaders";

pub type PipelineFactory = Box<
    dyn Sync
        + Send
        + Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<wgpu::RenderPipeline>,
>;

/// A shader file under `assets/shaders`. The embedded copy is used when the
/// file can't be read from disk, so the binary runs from any directory.
#[derive(Debug, Clone)]
pub struct ShaderDefinition {
    pub name: &'static str,
    pub path: &'static str,
    pub embedded: &'static str,
}

impl ShaderDefinition {
    fn source(&self) -> String {
        let path = Path::new(SHADER_FOLDER).join(self.path);
        match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                log::debug!(
                    "Using embedded {} ({} not readable: {e})",
                    self.name,
                    path.display()
                );
                self.embedded.to_string()
            }
        }
    }
}

pub struct ShaderEntry {
    pipeline_id: PipelineId,
    def: ShaderDefinition,
    factory: PipelineFactory,
}

pub type PipelineId = Id<PipelineCacheEntry>;

#[derive(Default)]
pub struct PipelineCacheEntry(Option<wgpu::RenderPipeline>);

pub struct PipelineCacheBuilder {
    shaders: Arena<ShaderEntry>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self {
            shaders: Arena::new(),
            pipelines: Arena::new(),
        }
    }

    pub fn add_shader(&mut self, def: ShaderDefinition, factory: PipelineFactory) -> PipelineId {
        let pipeline_id = self.pipelines.alloc(PipelineCacheEntry::default());
        self.shaders.alloc(ShaderEntry {
            pipeline_id,
            def,
            factory,
        });
        pipeline_id
    }
}

pub struct PipelineCache {
    shaders: Arc<Arena<ShaderEntry>>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCache {
    pub fn get(&self, id: PipelineId) -> Option<&RenderPipeline> {
        self.pipelines.get(id).and_then(|entry| entry.0.as_ref())
    }
}

/// Compiles every registered pipeline up front. With hot reload enabled, edits
/// under the shader folder are recompiled on the watcher thread and swapped in
/// at the start of the next frame. A broken edit keeps the previous pipeline.
pub struct ShaderLoader {
    pub cache: PipelineCache,
    receiver: mpsc::Receiver<(&'static str, PipelineId, wgpu::RenderPipeline)>,
    _debouncer: Option<Debouncer<RecommendedWatcher>>,
}

impl ShaderLoader {
    pub fn new(
        device: &wgpu::Device,
        builder: PipelineCacheBuilder,
        hot_reload: bool,
    ) -> anyhow::Result<Self> {
        let mut pipelines = builder.pipelines;
        for (_, shader) in builder.shaders.iter() {
            let pipeline = compile(device, &shader.def, &shader.def.source(), &shader.factory)
                .or_else(|e| {
                    log::warn!("{e:#}, falling back to the embedded shader");
                    compile(device, &shader.def, shader.def.embedded, &shader.factory)
                })
                .with_context(|| format!("Failed to compile shader: {}", shader.def.name))?;

            if let Some(entry) = pipelines.get_mut(shader.pipeline_id) {
                entry.0 = Some(pipeline);
            }
        }

        let cache = PipelineCache {
            shaders: Arc::new(builder.shaders),
            pipelines,
        };

        let (sender, receiver) = channel();
        let debouncer = if hot_reload {
            watch_shaders(device.clone(), cache.shaders.clone(), sender)
                .map_err(|e| log::warn!("Shader hot reload disabled: {e:#}"))
                .ok()
        } else {
            None
        };

        Ok(Self {
            cache,
            receiver,
            _debouncer: debouncer,
        })
    }

    pub fn load_pending_shaders(&mut self) {
        while let Ok((name, pipeline_id, pipeline)) = self.receiver.try_recv() {
            if let Some(entry) = self.cache.pipelines.get_mut(pipeline_id) {
                log::info!("Shader reloaded: {name}");
                entry.0 = Some(pipeline);
            }
        }
    }
}

fn watch_shaders(
    device: wgpu::Device,
    shaders: Arc<Arena<ShaderEntry>>,
    sender: mpsc::Sender<(&'static str, PipelineId, wgpu::RenderPipeline)>,
) -> anyhow::Result<Debouncer<RecommendedWatcher>> {
    let mut debouncer = new_debouncer_opt(
        notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
        move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    if event.kind != DebouncedEventKind::Any {
                        continue;
                    }

                    let Some((_, entry)) = shaders
                        .iter()
                        .find(|(_, entry)| event.path.ends_with(entry.def.path))
                    else {
                        continue;
                    };

                    let source = match std::fs::read_to_string(&event.path) {
                        Ok(source) => source,
                        Err(e) => {
                            log::warn!("Failed to read {}: {e}", event.path.display());
                            continue;
                        }
                    };

                    match compile(&device, &entry.def, &source, &entry.factory) {
                        Ok(pipeline) => {
                            if sender
                                .send((entry.def.name, entry.pipeline_id, pipeline))
                                .is_err()
                            {
                                return;
                            }
                        }
                        Err(e) => log::error!("Failed to reload shader: {e:#}"),
                    }
                }
            }
            Err(e) => log::error!("Error debouncing shader changes: {e}"),
        },
    )
    .context("Failed to create shader watcher")?;

    let absolute_shader_folder = Path::new(SHADER_FOLDER)
        .canonicalize()
        .context("Shader folder not found")?;

    debouncer
        .watcher()
        .watch(&absolute_shader_folder, RecursiveMode::Recursive)
        .context("Failed to watch shader folder")?;

    log::info!("Watching {} for changes", absolute_shader_folder.display());

    Ok(debouncer)
}

fn compile(
    device: &wgpu::Device,
    shader_def: &ShaderDefinition,
    source: &str,
    factory: &PipelineFactory,
) -> anyhow::Result<wgpu::RenderPipeline> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = factory(device, shader_def, source);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation.")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        return Err(anyhow::anyhow!(
            "Shader compilation failed for {}: {}",
            shader_def.name,
            error
        ));
    }

    pipeline
}
