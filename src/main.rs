use anyhow::Result;

mod camera;
mod chrome;
mod config;
mod history;
mod input;
mod math;
mod menu;
mod picking;
mod rendering;
mod scene;
mod transform;
mod viewport;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(window::run())?;

    Ok(())
}
