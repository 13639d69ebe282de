//! Window host: event loop, mount/teardown and the per-frame drive.

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId, WindowLevel},
};

use crate::blend::BlendStrategy;
use crate::config::BackgroundConfig;
use crate::error::BackgroundError;
use crate::gpu::GpuState;
use crate::input::{Input, Key};
use crate::lifecycle::{Lifecycle, MountState};
use crate::shader::{build_instances, Uniforms};
use crate::simulation::Simulation;
use crate::theme::Theme;

/// Frames between FPS log lines.
const FPS_LOG_INTERVAL: u64 = 600;

/// A morphing cube background.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// Background::new()
///     .with_theme(Theme::Light)
///     .with_object_count(729)
///     .run()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Background {
    config: BackgroundConfig,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: BackgroundConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_object_count(mut self, count: u32) -> Self {
        self.config.object_count = count;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    pub fn with_blend_strategy(mut self, strategy: BlendStrategy) -> Self {
        self.config.blend.strategy = strategy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Borderless window pinned beneath other windows.
    pub fn with_background_mode(mut self, enabled: bool) -> Self {
        self.config.window.background = enabled;
        self
    }

    pub fn config(&self) -> &BackgroundConfig {
        &self.config
    }

    /// Validate the configuration and run until the window closes.
    pub fn run(self) -> Result<(), BackgroundError> {
        self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = App::new(self.config);
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

/// Poll only while frames are produced; otherwise sleep until an event.
fn control_flow_for(state: MountState) -> ControlFlow {
    match state {
        MountState::Running => ControlFlow::Poll,
        _ => ControlFlow::Wait,
    }
}

/// Per-mount resources. Dropped as a unit on teardown.
struct Mounted {
    window: Arc<Window>,
    simulation: Simulation,
    gpu: Option<GpuState>,
}

struct App {
    config: BackgroundConfig,
    lifecycle: Lifecycle,
    input: Input,
    mounted: Option<Mounted>,
}

impl App {
    fn new(config: BackgroundConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
            input: Input::new(),
            mounted: None,
        }
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) {
        if !self.lifecycle.begin_mount() {
            return;
        }

        let wc = &self.config.window;
        let mut attrs = Window::default_attributes()
            .with_title(wc.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(wc.width, wc.height));
        if wc.background {
            attrs = attrs
                .with_decorations(false)
                .with_window_level(WindowLevel::AlwaysOnBottom);
        }

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                self.lifecycle.degrade();
                event_loop.set_control_flow(control_flow_for(self.lifecycle.state()));
                return;
            }
        };

        let size = window.inner_size();
        let simulation = Simulation::new(&self.config, size.width, size.height);

        let gpu = match pollster::block_on(GpuState::new(
            window.clone(),
            self.config.object_count as usize,
        )) {
            Ok(gpu) => {
                self.lifecycle.mounted();
                window.request_redraw();
                Some(gpu)
            }
            Err(e) => {
                warn!("{e}");
                self.lifecycle.degrade();
                None
            }
        };

        event_loop.set_control_flow(control_flow_for(self.lifecycle.state()));
        self.mounted = Some(Mounted {
            window,
            simulation,
            gpu,
        });
    }

    fn teardown(&mut self) {
        if !self.lifecycle.begin_teardown() {
            return;
        }
        if let Some(mounted) = self.mounted.take() {
            if let Some(gpu) = mounted.gpu {
                gpu.release();
            }
            info!(frames = mounted.simulation.time().frame(), "background stopped");
        }
        self.lifecycle.finish_teardown();
    }

    fn handle_keys(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(Key::Escape) {
            self.teardown();
            event_loop.exit();
            return;
        }
        let Some(mounted) = &mut self.mounted else {
            return;
        };
        if self.input.key_pressed(Key::T) {
            let next = mounted.simulation.theme().toggled();
            mounted.simulation.set_theme(next);
        }
        if self.input.key_pressed(Key::Space) {
            mounted.simulation.time_mut().toggle_pause();
            debug!(paused = mounted.simulation.time().is_paused(), "clock toggled");
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.lifecycle.is_running() {
            return;
        }
        let Some(mounted) = &mut self.mounted else {
            return;
        };
        let Some(gpu) = &mut mounted.gpu else {
            return;
        };

        let sim = &mut mounted.simulation;
        sim.step();

        let frame = sim.time().frame();
        if frame % FPS_LOG_INTERVAL == 0 {
            debug!(frame, fps = sim.time().fps(), "frame stats");
        }

        let uniforms = Uniforms::new(sim.camera(), sim.style());
        let instances = build_instances(sim.objects(), sim.camera().position);

        match gpu.render(&uniforms, &instances, sim.style().clear_color) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("surface lost, reconfiguring");
                gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                self.teardown();
                event_loop.exit();
                return;
            }
            Err(e) => warn!("render error: {e:?}"),
        }

        mounted.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.mounted.is_none() {
            self.mount(event_loop);
        }
    }

    fn suspended(&mut self, event_loop: &ActiveEventLoop) {
        self.teardown();
        event_loop.set_control_flow(control_flow_for(self.lifecycle.state()));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(mounted) = &mut self.mounted {
            self.input
                .handle_event(&event, mounted.simulation.pointer_mut());
        }

        match event {
            WindowEvent::CloseRequested => {
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(mounted) = &mut self.mounted {
                    mounted
                        .simulation
                        .resize(physical_size.width, physical_size.height);
                    if let Some(gpu) = &mut mounted.gpu {
                        gpu.resize(physical_size);
                    }
                }
            }
            WindowEvent::KeyboardInput { .. } => {
                self.handle_keys(event_loop);
                self.input.begin_frame();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}
