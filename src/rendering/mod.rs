pub mod draw_list;
pub mod gpu_resources;
pub mod imgui_renderer;
pub mod pipelines;
pub mod renderer;
pub mod scene_uniform;
pub mod shader_loader;
pub mod shadow;
pub mod texture;
