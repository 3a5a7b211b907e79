use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use crate::{
    camera::Arcball, demo::DemoState, render::backend::RenderBackend,
    render::wgpu_backend::WgpuBackend,
};

struct App {
    window: Option<Arc<Window>>,
    backend: Option<WgpuBackend>,
    demo: Option<DemoState>,
    arcball: Option<Arcball>,
    mouse_pos: Vec2,
    dragging: bool,
    last_frame: Instant,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            backend: None,
            demo: None,
            arcball: None,
            mouse_pos: Vec2::ZERO,
            dragging: false,
            last_frame: Instant::now(),
        }
    }

    fn handle_key(&mut self, event_loop: &winit::event_loop::ActiveEventLoop, code: KeyCode) {
        let Some(demo) = self.demo.as_mut() else {
            return;
        };
        match code {
            KeyCode::KeyQ => event_loop.exit(),
            KeyCode::KeyC => demo.toggle_clip(),
            KeyCode::KeyB => demo.toggle_clip_side(),
            KeyCode::KeyF => demo.toggle_fog(),
            KeyCode::Equal | KeyCode::NumpadAdd => demo.adjust_fog_end(0.5),
            KeyCode::Minus | KeyCode::NumpadSubtract => demo.adjust_fog_end(-0.5),
            KeyCode::KeyK => demo.adjust_roughness(-0.1),
            KeyCode::KeyL => demo.adjust_roughness(0.1),
            KeyCode::KeyR => demo.reset_roughness(),
            _ => (),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let window_attributes = Window::default_attributes().with_title("Desk scene");
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("could not create window"),
        );

        let mut backend =
            pollster::block_on(WgpuBackend::new(window.clone())).expect("could not init renderer");
        let mut demo = DemoState::new(&mut backend).expect("could not build scene");

        let size = window.inner_size();
        demo.camera
            .set_aspect(size.width.max(1) as f32 / size.height.max(1) as f32);
        self.arcball = Some(demo.camera.create_arcball(size.width as f32, size.height as f32));

        self.window = Some(window);
        self.backend = Some(backend);
        self.demo = Some(demo);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(backend) = self.backend.as_mut() {
                    backend.resize(new_size.width, new_size.height);
                }
                if let Some(demo) = self.demo.as_mut() {
                    demo.camera
                        .set_aspect(new_size.width.max(1) as f32 / new_size.height.max(1) as f32);
                }
                if let Some(arcball) = self.arcball.as_mut() {
                    arcball.resize(new_size.width as f32, new_size.height as f32);
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_frame.elapsed().as_secs_f32();
                self.last_frame = Instant::now();

                let (Some(window), Some(backend), Some(demo)) = (
                    self.window.as_ref(),
                    self.backend.as_mut(),
                    self.demo.as_mut(),
                ) else {
                    return;
                };

                demo.update(dt);

                let frame = backend
                    .begin_frame()
                    .and_then(|()| demo.render(backend))
                    .and_then(|()| backend.end_frame());
                if let Err(e) = frame {
                    log::error!("frame failed: {e:#}");
                }

                window.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = Vec2::new(position.x as f32, position.y as f32);
                if self.dragging {
                    if let (Some(arcball), Some(demo)) =
                        (self.arcball.as_mut(), self.demo.as_mut())
                    {
                        arcball.accumulate_mouse_motion(self.mouse_pos.x, self.mouse_pos.y);
                        demo.camera.set_rotation(arcball.rotation());
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    if let Some(arcball) = self.arcball.as_mut() {
                        arcball.init_mouse_motion(self.mouse_pos.x, self.mouse_pos.y);
                        self.dragging = true;
                    }
                }
                ElementState::Released => {
                    self.dragging = false;
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                };
                if let Some(demo) = self.demo.as_mut() {
                    demo.zoom(notches);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(event_loop, code);
                    }
                }
            }
            _ => (),
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("could not create event loop")?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    Ok(())
}
