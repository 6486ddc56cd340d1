use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use lantern_kernel::{FrameDriver, SceneConfig};
use lantern_render_wgpu::{DrawStats, OrbitCamera, WgpuRenderer};
use lantern_tools::{FrameStats, SceneInspector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "lantern-desktop", about = "Lantern scene viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to load, overriding the config
    #[arg(short, long)]
    asset: Option<PathBuf>,
}

/// Application state that does not depend on the GPU.
struct AppState {
    driver: FrameDriver,
    camera: OrbitCamera,
    stats: FrameStats,
    last_draw: DrawStats,
    show_overlay: bool,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,
    last_frame: Instant,
}

impl AppState {
    fn new(driver: FrameDriver) -> Self {
        let camera = OrbitCamera::from_view(&driver.config().initial_view());
        Self {
            driver,
            camera,
            stats: FrameStats::new(),
            last_draw: DrawStats::default(),
            show_overlay: true,
            dragging: false,
            cursor: None,
            last_frame: Instant::now(),
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.show_overlay = !self.show_overlay,
            KeyCode::KeyR => {
                self.camera = OrbitCamera::from_view(&self.driver.config().initial_view());
            }
            _ => {}
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if let (true, Some(prev)) = (self.dragging, self.cursor) {
            self.camera
                .rotate((position.x - prev.x) as f32, (position.y - prev.y) as f32);
        }
        self.cursor = Some(position);
    }

    fn handle_drop(&mut self, path: PathBuf) {
        let placement = self.driver.config().placement();
        if let Some(session) = self.driver.session_mut() {
            tracing::info!(path = %path.display(), "loading dropped model");
            session.request_asset(path, placement);
        }
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        egui::Window::new("Stats")
            .default_pos([10.0, 10.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("{:.0} fps", self.stats.fps()));
                if let (Some(avg), Some(min), Some(max)) = (
                    self.stats.average_ms(),
                    self.stats.min_ms(),
                    self.stats.max_ms(),
                ) {
                    ui.label(format!("{avg:.2} ms (min {min:.2} / max {max:.2})"));
                }
                ui.separator();

                if let Some(session) = self.driver.session() {
                    let summary = SceneInspector::summary(session);
                    ui.label(format!(
                        "Objects: {} ({} dynamic)",
                        summary.objects, summary.dynamic_objects
                    ));
                    ui.label(format!("Bodies: {}", summary.bodies));
                    ui.label(format!("Simulated: {:.1} s", summary.simulated_seconds));
                    if summary.pending_loads > 0 {
                        ui.label(format!("Loading {} model(s)...", summary.pending_loads));
                    }
                    if summary.failed_loads > 0 {
                        ui.colored_label(
                            egui::Color32::LIGHT_RED,
                            format!("{} load(s) failed, see log", summary.failed_loads),
                        );
                    }
                }
                ui.label(format!(
                    "Draws: {} cubes, {} meshes, {} tris",
                    self.last_draw.cubes, self.last_draw.meshes, self.last_draw.triangles
                ));
                ui.separator();
                ui.small("LMB drag: orbit | Wheel: zoom | R: reset | F1: hide");
            });
    }
}

/// Window, surface and everything created from the device.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        driver: &FrameDriver,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Lantern")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

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
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lantern_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            driver.config().render,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw_overlay(
        &mut self,
        egui_ctx: &EguiContext,
        state: &AppState,
        view: &wgpu::TextureView,
    ) {
        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(driver: FrameDriver) -> Self {
        Self {
            state: AppState::new(driver),
            gpu: None,
            egui_ctx: EguiContext::default(),
            fatal: None,
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let now = Instant::now();
        self.state
            .stats
            .record((now - self.state.last_frame).as_secs_f32());
        self.state.last_frame = now;

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
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

        let camera = self.state.camera;
        if let Some(session) = self.state.driver.session_mut() {
            let orbit_view = camera.apply(session.view());
            session.set_view(orbit_view);
        }

        let aspect = gpu.aspect();
        let mut frame = gpu.renderer.frame(&gpu.device, &gpu.queue, &view, aspect);
        match self.state.driver.frame(&mut frame) {
            Ok(draw) => self.state.last_draw = draw,
            Err(e) => tracing::error!("frame failed: {e}"),
        }

        gpu.draw_overlay(&self.egui_ctx, &self.state, &view);
        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx, &self.state.driver) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("GPU initialization failed: {e:#}");
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.handle_cursor(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.camera.zoom(lines);
            }
            WindowEvent::DroppedFile(path) => {
                self.state.handle_drop(path);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("lantern-desktop starting");

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if cli.asset.is_some() {
        config.asset_path = cli.asset;
    }

    let mut driver = FrameDriver::new(config);
    driver.start()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(driver);
    event_loop.run_app(&mut app)?;

    match app.fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
