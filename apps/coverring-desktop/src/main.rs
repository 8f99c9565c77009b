use anyhow::{Context, Result};
use clap::Parser;
use coverring_assets::{CoverCatalog, CoverImage};
use coverring_input::{Action, DoubleClick, KeyBindings};
use coverring_kernel::{PageScope, RowAnimator, RowBounds, SceneBuilder, SceneConfig, SceneState};
use coverring_render::{HeadCamera, StereoRig, ViewControls};
use coverring_render_wgpu::WgpuRenderer;
use coverring_tools::SceneInspector;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowId};

#[derive(Parser)]
#[command(name = "coverring-desktop", about = "Cover ring desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML scene configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding `{year}_{month}.jpg` cover images
    #[arg(long, default_value = "./covers")]
    covers_dir: PathBuf,

    /// Override the total number of covers
    #[arg(long)]
    total: Option<usize>,

    /// Override the number of covers per row
    #[arg(long)]
    per_row: Option<usize>,

    /// Page only the row under the cursor instead of the whole ring
    #[arg(long)]
    scoped_paging: bool,

    /// Fail on pages past the first or last row instead of ignoring them
    #[arg(long)]
    strict_rows: bool,

    /// Render a single view instead of side-by-side eyes
    #[arg(long)]
    mono: bool,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(total) = self.total {
            config.layout.total_objects = total;
        }
        if let Some(per_row) = self.per_row {
            config.layout.per_row = per_row;
        }
        if self.scoped_paging {
            config.animator.page_scope = PageScope::CurrentRow;
        }
        if self.strict_rows {
            config.animator.row_bounds = RowBounds::Reject;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Application state.
struct AppState {
    scene: SceneState,
    animator: RowAnimator,
    camera: HeadCamera,
    rig: StereoRig,
    bindings: KeyBindings,
    catalog: CoverCatalog,
    double_click: DoubleClick,
    show_inspector: bool,
    mouse_captured: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(config: SceneConfig, covers_dir: PathBuf, stereo: bool) -> Self {
        let scene = SceneBuilder::build(&config.layout);
        let mut rig = StereoRig::default();
        rig.set_stereo(stereo);

        Self {
            scene,
            animator: RowAnimator::new(config.animator),
            camera: HeadCamera::at_eye_height(config.layout.eye_height),
            rig,
            bindings: KeyBindings::default(),
            catalog: CoverCatalog::new(covers_dir),
            double_click: DoubleClick::default(),
            show_inspector: true,
            mouse_captured: false,
            last_frame: Instant::now(),
        }
    }

    /// Cover images in scene order, one per texture layer.
    fn load_covers(&self) -> Vec<CoverImage> {
        let covers: Vec<CoverImage> = self
            .scene
            .covers()
            .map(|cover| self.catalog.load_or_placeholder(cover.key))
            .collect();
        let placeholders = covers.iter().filter(|c| c.placeholder).count();
        tracing::info!(
            "loaded {} covers from {} ({placeholders} placeholders)",
            covers.len(),
            self.catalog.root().display()
        );
        covers
    }

    fn update(&mut self, dt: f32) {
        self.camera.update(dt);
        self.animator.execute(&mut self.scene);
    }

    /// Run an action. Returns true when the window should go full screen,
    /// which every full-screen request does.
    fn perform(&mut self, action: Action) -> bool {
        match action {
            Action::ZeroSensor => {
                self.camera.zero_sensor();
                false
            }
            Action::FullScreen => {
                self.rig.set_full_screen(true);
                true
            }
            Action::Noop => false,
            _ => {
                if let Some(command) = action.row_command() {
                    match self.animator.apply(&mut self.scene, command) {
                        Ok(true) => tracing::debug!("{action:?} -> row {}", self.scene.current_row()),
                        Ok(false) => {}
                        Err(e) => tracing::warn!("{action:?} rejected: {e}"),
                    }
                }
                false
            }
        }
    }

    fn handle_key(&mut self, key: &Key) -> bool {
        match key {
            Key::Named(NamedKey::F1) => {
                self.show_inspector = !self.show_inspector;
                false
            }
            Key::Character(text) => {
                let action = self.bindings.action_for_text(text);
                self.perform(action)
            }
            _ => false,
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_inspector {
            return;
        }

        let summary = SceneInspector::summary(&self.scene, &self.animator);

        egui::SidePanel::left("inspector")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Cover Ring");
                ui.separator();
                ui.label(format!("Rows: {}  Covers: {}", summary.rows, summary.covers));
                match summary.current_year {
                    Some(year) => ui.label(format!("Row {}: {year}", summary.current_row)),
                    None => ui.label("No rows"),
                };
                ui.label(format!(
                    "Animation: {} {:.2} / {:.2}",
                    summary.animation, summary.progress, summary.limit
                ));
                ui.label(format!(
                    "Paging: {:?}  Full screen: {}",
                    self.animator.config().page_scope,
                    self.rig.is_full_screen()
                ));
                let fwd = self.camera.forward();
                ui.label(format!(
                    "Looking: ({:.2}, {:.2}, {:.2})",
                    fwd.x, fwd.y, fwd.z
                ));
                ui.separator();

                let mut stereo = self.rig.is_stereo();
                if ui.checkbox(&mut stereo, "Side-by-side stereo").changed() {
                    self.rig.set_stereo(stereo);
                }
                if ui.button("Zero sensor").clicked() {
                    self.camera.zero_sensor();
                }

                ui.separator();
                ui.heading("Current row");
                let row = summary.current_row;
                for slot in 0..self.scene.row(row).map_or(0, <[_]>::len) {
                    if let Some(info) = SceneInspector::inspect_cover(&self.scene, row, slot) {
                        ui.small(format!(
                            "{} at ({:.1}, {:.1}, {:.1})",
                            info.key, info.position[0], info.position[1], info.position[2]
                        ));
                    }
                }

                ui.separator();
                ui.small(self.bindings.help());
                ui.small("F1: Toggle HUD | RMB: Look | Double-click: Full screen");
            });
    }
}

/// Window, device and the renderers drawing into it.
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
        covers: &[CoverImage],
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Cover Ring")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("coverring_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
            covers,
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

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn redraw(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
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

        let eyes = state.rig.eyes(&state.camera);
        self.renderer
            .render(&self.device, &self.queue, &view, &eyes, &state.scene);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
        self.window.request_redraw();
    }

    fn enter_full_screen(&self) {
        self.window
            .set_fullscreen(Some(Fullscreen::Borderless(None)));
        tracing::info!("entered full screen");
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn full_screen_requested(&self) {
        if let Some(gpu) = &self.gpu {
            gpu.enter_full_screen();
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let covers = self.state.load_covers();
        match Gpu::new(event_loop, &self.egui_ctx, &covers) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.rig.set_size(size.width, size.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
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
                self.state.rig.set_size(new_size.width, new_size.height);
                if let Some(gpu) = &mut self.gpu {
                    // The window manager can leave full screen without us.
                    self.state
                        .rig
                        .set_full_screen(gpu.window.fullscreen().is_some());
                    gpu.resize(new_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if self.state.handle_key(&logical_key) {
                    self.full_screen_requested();
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if self.state.double_click.press(Instant::now())
                    && self.state.perform(Action::FullScreen)
                {
                    self.full_screen_requested();
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.mouse_captured = btn_state == ElementState::Pressed;
                if let Some(gpu) = &self.gpu {
                    gpu.window.set_cursor_visible(!self.state.mouse_captured);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
                self.state.last_frame = now;
                self.state.update(dt);

                if let Some(gpu) = &mut self.gpu {
                    gpu.redraw(&mut self.state, &self.egui_ctx);
                }
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
            if self.state.mouse_captured {
                self.state.camera.look(delta.0 as f32, delta.1 as f32);
            }
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

    tracing::info!("coverring-desktop starting");

    let config = cli.scene_config()?;
    let state = AppState::new(config, cli.covers_dir, !cli.mono);

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(SceneConfig::default(), PathBuf::from("./covers"), true)
    }

    #[test]
    fn full_screen_is_requested_every_time() {
        let mut state = state();
        assert!(state.perform(Action::FullScreen));
        assert!(state.rig.is_full_screen());
        // Still requested after the flag is already set.
        assert!(state.perform(Action::FullScreen));

        // Leaving full screen outside the app does not block the next request.
        state.rig.set_full_screen(false);
        assert!(state.handle_key(&Key::Character("F".into())));
    }

    #[test]
    fn paging_keys_drive_the_animator() {
        let mut state = state();
        assert!(!state.handle_key(&Key::Character("w".into())));
        assert_eq!(state.scene.current_row(), 6);
        assert!(state.animator.is_active());
        assert!(!state.handle_key(&Key::Character("q".into())));
        assert_eq!(state.scene.current_row(), 6);
    }
}
