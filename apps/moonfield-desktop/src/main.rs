use anyhow::{Context, Result, anyhow};
use clap::Parser;
use glam::Vec2;
use moonfield_input::{PointerButton, PointerTracker};
use moonfield_render_wgpu::{FrameTarget, WgpuRenderer};
use moonfield_runner::{AppContext, SceneConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Pixels per wheel line, to match browsers' scroll deltas.
const LINE_DELTA: f32 = 100.0;

#[derive(Parser)]
#[command(name = "moonfield-desktop", about = "Moonfield scene in a desktop window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding space.jpg, moon.jpg and image.png
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Seed for star placement
    #[arg(long)]
    seed: Option<u64>,

    /// Rotate the torus a fixed step per frame instead of per elapsed time
    #[arg(long)]
    per_frame: bool,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };
        if let Some(root) = &self.assets {
            config.assets.root = root.clone();
        }
        if self.seed.is_some() {
            config.stars.seed = self.seed;
        }
        if self.per_frame {
            config.animation.time_scaled = false;
        }
        Ok(config)
    }
}

/// Window, surface and device; created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
}

impl Gpu {
    fn new(window: Arc<Window>, size: (u32, u32)) -> Result<Self> {
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
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("moonfield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.0,
            height: size.1,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, &queue, format, size.0, size.1);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn resize(&mut self, (width, height): (u32, u32)) {
        if self.config.width == width && self.config.height == height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }
}

struct App {
    /// Consumed when the window is created.
    config: Option<SceneConfig>,
    ctx: Option<AppContext>,
    gpu: Option<Gpu>,
    pointer: PointerTracker,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        Self {
            config: Some(config),
            ctx: None,
            gpu: None,
            pointer: PointerTracker::new(),
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut config = self
            .config
            .take()
            .ok_or_else(|| anyhow!("window already initialized"))?;
        let window_cfg = &config.window;

        let attrs = Window::default_attributes()
            .with_title(format!("{} [{}]", window_cfg.title, window_cfg.surface_id))
            .with_inner_size(LogicalSize::new(window_cfg.width, window_cfg.height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let physical = window.inner_size();
        let mut gpu = Gpu::new(window, (physical.width.max(1), physical.height.max(1)))?;

        // Decoded textures must fit the device's texture size limit.
        let device_max = gpu.device.limits().max_texture_dimension_2d;
        config.assets.max_texture_dimension = config.assets.max_texture_dimension.min(device_max);

        let scale = gpu.window.scale_factor();
        let logical: LogicalSize<u32> = physical.to_logical(scale);
        let ctx = AppContext::new(config, logical.width.max(1), logical.height.max(1), scale)?;
        gpu.resize(ctx.surface().drawing_buffer_size());
        gpu.window.request_redraw();

        self.ctx = Some(ctx);
        self.gpu = Some(gpu);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>, scale: f64) {
        let (Some(ctx), Some(gpu)) = (&mut self.ctx, &mut self.gpu) else {
            return;
        };
        ctx.set_pixel_ratio(scale);
        let logical: LogicalSize<u32> = size.to_logical(scale);
        if ctx.resize(logical.width, logical.height) {
            gpu.resize(ctx.surface().drawing_buffer_size());
        }
    }

    fn redraw(&mut self) {
        let (Some(ctx), Some(gpu)) = (&mut self.ctx, &mut self.gpu) else {
            return;
        };
        let now = Instant::now();
        let elapsed = now - self.last_frame;
        self.last_frame = now;

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.window.request_redraw();
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

        let mut target = FrameTarget {
            renderer: &mut gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            view: &view,
        };
        let (report, stats) = ctx.frame(elapsed, &mut target);
        if report.loads_applied > 0 {
            tracing::debug!(
                frame = report.frame,
                loads = report.loads_applied,
                uploaded = stats.textures_uploaded,
                "textures applied"
            );
        }

        output.present();
        gpu.window.request_redraw();
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Right),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.error.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let scale = self
                    .gpu
                    .as_ref()
                    .map_or(1.0, |gpu| gpu.window.scale_factor());
                self.handle_resize(size, scale);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(size) = self.gpu.as_ref().map(|gpu| gpu.window.inner_size()) {
                    self.handle_resize(size, scale_factor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                if let (Some(action), Some(ctx)) = (self.pointer.move_to(position), &mut self.ctx) {
                    ctx.handle_pointer(action);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer.leave();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = pointer_button(button) {
                    match state {
                        ElementState::Pressed => self.pointer.press(button),
                        ElementState::Released => self.pointer.release(button),
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Scrolling up moves the camera closer.
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_DELTA,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                if let (Some(action), Some(ctx)) = (self.pointer.wheel(dy), &mut self.ctx) {
                    ctx.handle_pointer(action);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
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
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    tracing::info!("moonfield-desktop starting");
    let config = cli.scene_config()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
