use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use sierpinski_camera::{CameraRig, Phase};
use sierpinski_geometry::{NormalMode, SubdivisionDepth, generate, light_marker_cube};
use sierpinski_input::{DepthAction, InputEvent, InputState, MoveKey};
use sierpinski_render::FrameComposer;
use sierpinski_render_wgpu::PyramidRenderer;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "pyramid-desktop", about = "Interactive Sierpinski pyramid viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial subdivision depth
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=7))]
    depth: u8,

    /// Smooth vertex normals instead of flat face normals
    #[arg(long)]
    smooth: bool,
}

/// Session state: everything outside the GPU.
struct SessionState {
    depth: SubdivisionDepth,
    normal_mode: NormalMode,
    input: InputState,
    camera: CameraRig,
    composer: FrameComposer,
    last_frame: Option<Instant>,
    show_hint: bool,
}

impl SessionState {
    fn new(depth: SubdivisionDepth, normal_mode: NormalMode) -> Self {
        Self {
            depth,
            normal_mode,
            input: InputState::new(),
            camera: CameraRig::new(),
            composer: FrameComposer::new(),
            last_frame: None,
            show_hint: true,
        }
    }

    /// Elapsed seconds since the previous frame; 0 on the very first one.
    fn frame_dt(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.last_frame {
            Some(last) => (now - last).as_secs_f32().min(0.1),
            None => 0.0,
        };
        self.last_frame = Some(now);
        dt
    }

    /// Draw the overlay; returns a new depth if the slider moved.
    fn draw_ui(&mut self, ctx: &EguiContext) -> Option<u8> {
        let mut requested = None;

        egui::Window::new("Sierpinski")
            .default_width(220.0)
            .show(ctx, |ui| {
                let mut depth = self.depth.get();
                if ui
                    .add(egui::Slider::new(&mut depth, 0..=7).text("subdivisions"))
                    .changed()
                {
                    requested = Some(depth);
                }
                ui.label(format!(
                    "{} triangles",
                    4_u32.pow(u32::from(self.depth.get()) + 1)
                ));
                ui.separator();
                let pos = self.camera.position();
                ui.label(format!(
                    "camera ({:.1}, {:.1}, {:.1})",
                    pos.x, pos.y, pos.z
                ));
                match self.camera.phase() {
                    Phase::Intro => ui.label("intro"),
                    Phase::Interactive => ui.label(if self.input.controls_enabled() {
                        "free look"
                    } else {
                        "idle"
                    }),
                };
                ui.separator();
                ui.small("M: toggle mouse look | WASD + Z/X: move");
                ui.small("Left/right click: more/less detail");
            });

        if self.show_hint {
            egui::Area::new(egui::Id::new("hint"))
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.heading("Press M to move the camera.");
                });
            if self.camera.phase() == Phase::Interactive && self.input.controls_enabled() {
                self.show_hint = false;
            }
        }

        requested
    }
}

struct GpuApp {
    session: SessionState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<PyramidRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(session: SessionState) -> Self {
        Self {
            session,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    /// Bring up the window, surface, device, and renderer. Any failure
    /// here means the environment cannot render at all.
    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Sierpinski Pyramid")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable graphics adapter; a GPU with Vulkan, Metal, or DX12 is required")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("pyramid_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        // The shader applies its own gamma 2.2, so prefer a non-sRGB
        // surface to avoid encoding twice.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let fractal = generate(self.session.depth, self.session.normal_mode);
        let cube = light_marker_cube();
        let renderer = PyramidRenderer::new(
            &device,
            surface_format,
            size.width,
            size.height,
            &fractal,
            &cube,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU initialized"
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        Ok(())
    }

    /// Set a new subdivision depth and rebuild the fractal buffers. One
    /// regeneration per call; no-ops when the depth is unchanged.
    fn apply_depth(&mut self, depth: SubdivisionDepth) {
        if depth == self.session.depth {
            return;
        }
        self.session.depth = depth;
        if let (Some(device), Some(renderer)) = (&self.device, &mut self.renderer) {
            let mesh = generate(depth, self.session.normal_mode);
            renderer.replace_fractal(device, &mesh);
            tracing::info!(depth = depth.get(), "subdivision depth changed");
        }
    }

    /// The M toggle: flip controls and request or release exclusive
    /// pointer capture. Capture failure leaves the absolute-coordinate
    /// fallback path active.
    fn toggle_controls(&mut self) {
        let enabling = !self.session.input.controls_enabled();
        self.session.input.push(InputEvent::ToggleControls);

        let Some(window) = &self.window else {
            return;
        };
        if enabling {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
                .is_ok();
            if grabbed {
                window.set_cursor_visible(false);
                self.session.input.push(InputEvent::CaptureChanged(true));
            } else {
                tracing::warn!("pointer capture unavailable; using absolute pointer deltas");
            }
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
            self.session.input.push(InputEvent::CaptureChanged(false));
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let mapped = match key {
            KeyCode::KeyW => Some(MoveKey::Forward),
            KeyCode::KeyS => Some(MoveKey::Back),
            KeyCode::KeyA => Some(MoveKey::Left),
            KeyCode::KeyD => Some(MoveKey::Right),
            KeyCode::KeyZ => Some(MoveKey::Up),
            KeyCode::KeyX => Some(MoveKey::Down),
            _ => None,
        };

        if let Some(mapped) = mapped {
            self.session.input.push(if pressed {
                InputEvent::KeyDown(mapped)
            } else {
                InputEvent::KeyUp(mapped)
            });
        } else if key == KeyCode::KeyM && !pressed {
            self.toggle_controls();
        }
    }

    fn redraw(&mut self) {
        let dt = self.session.frame_dt();

        // Drain this frame's input in arrival order, then apply any
        // click-driven depth steps.
        let mut depth = self.session.depth;
        for action in self.session.input.drain() {
            depth = match action {
                DepthAction::Increase => depth.increased(),
                DepthAction::Decrease => depth.decreased(),
            };
        }
        self.apply_depth(depth);

        self.session.camera.advance(&mut self.session.input, dt);

        let (Some(surface), Some(device), Some(queue), Some(config)) = (
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
        ) else {
            return;
        };

        let viewport = Vec2::new(config.width as f32, config.height as f32);
        let plan = self.session.composer.compose(
            self.session.camera.view_matrix(),
            viewport,
            self.session.depth.get(),
            dt,
        );

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(renderer) = &self.renderer {
            renderer.render(device, queue, &view, &plan);
        }

        // Overlay pass.
        let raw_input = self
            .egui_winit
            .as_mut()
            .unwrap()
            .take_egui_input(self.window.as_ref().unwrap());
        let mut slider_depth = None;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            slider_depth = self.session.draw_ui(ctx);
        });

        self.egui_winit.as_mut().unwrap().handle_platform_output(
            self.window.as_ref().unwrap(),
            full_output.platform_output,
        );

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        {
            let device = self.device.as_ref().unwrap();
            let queue = self.queue.as_ref().unwrap();
            let egui_renderer = self.egui_renderer.as_mut().unwrap();
            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        output.present();

        // Slider changes apply on the next frame, through the same path
        // as clicks.
        if let Some(value) = slider_depth {
            if let Ok(depth) = SubdivisionDepth::new(value) {
                self.apply_depth(depth);
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            // No rendering context means nothing meaningful to show.
            tracing::error!("cannot initialize rendering: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.session.input.push(InputEvent::PointerAbsolute {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Released,
                ..
            } => match button {
                MouseButton::Left => self.session.input.push(InputEvent::LeftRelease),
                MouseButton::Right => self.session.input.push(InputEvent::RightRelease),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.session.input.push(InputEvent::PointerRelative {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("pyramid-desktop starting");

    let depth = SubdivisionDepth::new(cli.depth)?;
    let normal_mode = if cli.smooth {
        NormalMode::Smooth
    } else {
        NormalMode::Flat
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(SessionState::new(depth, normal_mode));
    event_loop.run_app(&mut app)?;

    Ok(())
}
