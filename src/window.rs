use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::{
    chrome,
    config::EditorConfig,
    input::{EditorKey, InputDispatcher, InputEvent, KeyModifiers, PointerButton},
    menu::{self, MenuEntry},
    picking::ViewportRect,
    rendering::renderer::Renderer,
    viewport::ViewportContext,
};

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    config: EditorConfig,
    menu: Vec<MenuEntry>,
    renderer: Option<Renderer>,
    viewport: Option<ViewportContext>,
    dispatcher: InputDispatcher,
    imgui: Option<ImguiState>,
    cursor: Vec2,
    modifiers: KeyModifiers,
    handle_resizes: bool,
    last_frame: Instant,
    startup_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: EditorConfig, menu: Vec<MenuEntry>) -> Self {
        Self {
            config,
            menu,
            renderer: None,
            viewport: None,
            dispatcher: InputDispatcher::new(ViewportRect::from_size(0, 0)),
            imgui: None,
            cursor: Vec2::ZERO,
            modifiers: KeyModifiers::default(),
            handle_resizes: false,
            last_frame: Instant::now(),
            startup_error: None,
        }
    }

    fn setup_imgui(&mut self, window: &Window) {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        self.imgui = Some(ImguiState { context, platform });
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes().with_title("Scene Editor");
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );
        self.setup_imgui(&window);
        let imgui = self.imgui.as_mut().context("Imgui was not initialized")?;

        let mut renderer = pollster::block_on(Renderer::new(
            window.clone(),
            &self.config,
            &mut imgui.context,
        ))
        .context("Failed to initialize renderer")?;

        let mut viewport = ViewportContext::new(self.config.clone(), &mut renderer.resources);
        let size = window.inner_size();
        self.dispatcher.dispatch(
            InputEvent::Resize {
                width: size.width,
                height: size.height,
            },
            &mut viewport,
            &mut renderer.resources,
        );

        window.request_redraw();
        self.renderer = Some(renderer);
        self.viewport = Some(viewport);
        self.handle_resizes = true;
        Ok(())
    }

    fn dispatch(&mut self, event: InputEvent) {
        if let (Some(renderer), Some(viewport)) = (self.renderer.as_mut(), self.viewport.as_mut()) {
            self.dispatcher
                .dispatch(event, viewport, &mut renderer.resources);
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(imgui), Some(viewport)) = (
            self.renderer.as_mut(),
            self.imgui.as_mut(),
            self.viewport.as_mut(),
        ) else {
            return;
        };

        let now = Instant::now();
        imgui
            .context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(e) = imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
        {
            log::error!("Failed to prepare Imgui frame: {e}");
            return;
        }

        let ui = imgui.context.new_frame();
        let actions = chrome::draw(ui, viewport, &self.menu);
        imgui.platform.prepare_render(ui, &renderer.window);
        let draw_data = imgui.context.render();

        for action in actions {
            chrome::apply(action, viewport, &mut renderer.resources);
        }

        match renderer.render(viewport, draw_data) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
            }
            Err(other) => {
                log::error!("Unexpected error: {:?}", other);
            }
        }

        renderer.window.request_redraw();
    }

    /// Shutdown order: surface, resize handling, scene resources, device.
    fn teardown(&mut self) {
        let Some(mut renderer) = self.renderer.take() else {
            return;
        };

        renderer.detach_surface();
        self.handle_resizes = false;
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.release(&mut renderer.resources);
        }
        renderer.dispose();

        log::info!("Viewport shut down");
    }

    fn wants_mouse(&self) -> bool {
        self.imgui
            .as_ref()
            .is_some_and(|imgui| imgui.context.io().want_capture_mouse)
    }

    fn wants_keyboard(&self) -> bool {
        self.imgui
            .as_ref()
            .is_some_and(|imgui| imgui.context.io().want_capture_keyboard)
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

fn editor_key(key: &Key) -> Option<EditorKey> {
    match key {
        Key::Named(NamedKey::Delete) => Some(EditorKey::Delete),
        Key::Named(NamedKey::ArrowUp) => Some(EditorKey::ArrowUp),
        Key::Named(NamedKey::ArrowDown) => Some(EditorKey::ArrowDown),
        Key::Named(NamedKey::ArrowLeft) => Some(EditorKey::ArrowLeft),
        Key::Named(NamedKey::ArrowRight) => Some(EditorKey::ArrowRight),
        Key::Character(text) => text
            .chars()
            .next()
            .map(|c| EditorKey::Character(c.to_ascii_lowercase())),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() || self.startup_error.is_some() {
            return;
        }

        if let Err(e) = self.start(event_loop) {
            log::error!("{e:#}");
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if let (Some(imgui), Some(renderer)) = (self.imgui.as_mut(), self.renderer.as_ref()) {
            imgui.platform.handle_event::<()>(
                imgui.context.io_mut(),
                &renderer.window,
                &Event::WindowEvent {
                    window_id,
                    event: event.clone(),
                },
            );
        }

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if !self.handle_resizes {
                    return;
                }
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                }
                self.dispatch(InputEvent::Resize {
                    width: new_size.width,
                    height: new_size.height,
                });
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                self.modifiers = KeyModifiers {
                    shift: state.shift_key(),
                    control: state.control_key(),
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                if !self.wants_mouse() {
                    self.dispatch(InputEvent::PointerMove {
                        position: self.cursor,
                    });
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = pointer_button(button);
                match state {
                    ElementState::Pressed if !self.wants_mouse() => {
                        self.dispatch(InputEvent::PointerDown {
                            button,
                            position: self.cursor,
                        });
                    }
                    // Releases always reach the viewport so a drag never gets stuck.
                    ElementState::Released => self.dispatch(InputEvent::PointerUp { button }),
                    _ => {}
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y,
                    MouseScrollDelta::PixelDelta(position) => -position.y as f32,
                };
                if !self.wants_mouse() {
                    self.dispatch(InputEvent::Wheel { delta_y });
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || self.wants_keyboard() {
                    return;
                }
                if let Some(key) = editor_key(&event.logical_key) {
                    let modifiers = self.modifiers;
                    self.dispatch(InputEvent::Key { key, modifiers });
                }
            }
            _ => (),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(EditorConfig::from_env(), menu::default_menu());
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
