//! Platform layer: window, GL context, event loop, input.
//!
//! Owns the one thread the GL context lives on: everything device-side is
//! created after `make_current` and driven from the event loop below.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use glutin::{
    Api, ContextBuilder, GlProfile, GlRequest,
    dpi::PhysicalSize,
    event::{DeviceEvent, ElementState, Event, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{CursorGrabMode, WindowBuilder},
};

use asset::{mesh::MeshData, obj, texture::TextureData};
use corelib::camera::CameraInput;
use renderer::GlowBackend;
use renderer::scene::{SceneDesc, SceneRenderer};

pub struct RunConfig {
    pub width: u32,
    pub height: u32,
    pub model_path: Option<PathBuf>,
    pub texture_path: Option<PathBuf>,
    pub mipmap: bool,
    pub post_process: bool,
    pub show_fps: bool,
}

/// Held-key state folded into per-frame camera input.
#[derive(Default)]
struct InputState {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    look_x: f32,
    look_y: f32,
}

impl InputState {
    fn key(&mut self, key: VirtualKeyCode, pressed: bool) {
        match key {
            VirtualKeyCode::W => self.forward = pressed,
            VirtualKeyCode::S => self.back = pressed,
            VirtualKeyCode::A => self.left = pressed,
            VirtualKeyCode::D => self.right = pressed,
            VirtualKeyCode::Space => self.up = pressed,
            VirtualKeyCode::LShift => self.down = pressed,
            _ => {}
        }
    }

    /// Drain accumulated look deltas and snapshot the movement axes.
    fn take_camera_input(&mut self) -> CameraInput {
        let input = CameraInput {
            forward: axis(self.forward, self.back),
            strafe: axis(self.right, self.left),
            vertical: axis(self.up, self.down),
            look_x: self.look_x,
            look_y: self.look_y,
        };
        self.look_x = 0.0;
        self.look_y = 0.0;
        input
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i32 - negative as i32) as f32
}

struct FpsCounter {
    frames: u32,
    window_start: Instant,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            window_start: Instant::now(),
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.window_start.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            log::info!("{:.1} fps", self.frames as f32 / elapsed);
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }
}

/// Open the window, build the scene and run until closed.
pub fn run(config: RunConfig) -> Result<()> {
    let mesh = match &config.model_path {
        Some(path) => obj::load_obj_from_path(path)?,
        None => MeshData::unit_quad(),
    };
    let texture = match &config.texture_path {
        Some(path) => TextureData::from_path(path)?,
        None => TextureData::checkerboard(64),
    };

    let event_loop = EventLoop::new();
    let window_builder = WindowBuilder::new()
        .with_title("glsandbox")
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(false);
    let windowed_context = ContextBuilder::new()
        .with_gl(GlRequest::Specific(Api::OpenGl, (3, 3)))
        .with_gl_profile(GlProfile::Core)
        .with_vsync(true)
        .build_windowed(window_builder, &event_loop)
        .context("Failed to create GL window")?;
    let windowed_context = unsafe { windowed_context.make_current() }
        .map_err(|(_, err)| anyhow::anyhow!("Failed to make GL context current: {err:?}"))?;

    log::info!(
        "Window created: {}x{}",
        windowed_context.window().inner_size().width,
        windowed_context.window().inner_size().height
    );

    let window = windowed_context.window();
    if let Err(err) = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    {
        log::warn!("Cursor grab unavailable: {err}");
    }
    window.set_cursor_visible(false);

    let gl = unsafe {
        GlowBackend::from_loader(|name| windowed_context.get_proc_address(name) as *const _)
    };

    let desc = SceneDesc {
        mesh,
        texture: Some(texture),
        mipmap: config.mipmap,
        post_process: config.post_process,
        width: config.width,
        height: config.height,
    };
    let scene = SceneRenderer::new(gl, desc)?;
    let mut scene = Some(scene);

    let mut input = InputState::default();
    let mut last_frame = Instant::now();
    let mut fps = FpsCounter::new();
    let show_fps = config.show_fps;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    log::info!("Close requested; shutting down");
                    if let Some(scene) = scene.take() {
                        scene.shutdown();
                    }
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    windowed_context.resize(size);
                    if let Some(scene) = scene.as_mut() {
                        scene.resize(size.width, size.height);
                    }
                }
                WindowEvent::KeyboardInput { input: key, .. } => {
                    if let Some(code) = key.virtual_keycode {
                        let pressed = key.state == ElementState::Pressed;
                        if code == VirtualKeyCode::Escape && pressed {
                            log::info!("Escape pressed; shutting down");
                            if let Some(scene) = scene.take() {
                                scene.shutdown();
                            }
                            *control_flow = ControlFlow::Exit;
                        } else {
                            input.key(code, pressed);
                        }
                    }
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta: (dx, dy) },
                ..
            } => {
                // Grabbed-cursor convention: moving right/down turns
                // right/down, so the deltas negate into look axes.
                input.look_x -= dx as f32;
                input.look_y -= dy as f32;
            }
            Event::MainEventsCleared => {
                windowed_context.window().request_redraw();
            }
            Event::RedrawRequested(_) => {
                let Some(scene) = scene.as_mut() else { return };
                let now = Instant::now();
                let dt = (now - last_frame).as_secs_f32();
                last_frame = now;

                scene.update(dt, &input.take_camera_input());
                scene.render();
                if let Err(err) = windowed_context.swap_buffers() {
                    log::error!("Failed to swap buffers: {err:?}");
                }
                if show_fps {
                    fps.tick();
                }
            }
            _ => {}
        }
    })
}
