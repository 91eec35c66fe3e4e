use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::backend::{GpuInit, WgpuBackend};
use crate::core::{App, AppControl, FrameClock, FrameCtx, WindowCtx};
use crate::renderer::{Renderer, RendererInit};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
    /// Redraw continuously instead of only when the window asks for it.
    pub continuous: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "kiln".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            resizable: true,
            continuous: true,
        }
    }
}

/// Runtime commands issued from a frame.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.commands.push(Command::SetTitle(title.into()));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }
}

enum Command {
    SetTitle(String),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, renderer_init: RendererInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, renderer_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.failure.map_or(Ok(()), Err)
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: Renderer<WgpuBackend<'this>>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_init: RendererInit,
    app: A,

    window: Option<WindowEntry>,
    exit_requested: bool,
    /// First fatal error; returned from [`Runtime::run`].
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, renderer_init: RendererInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            renderer_init,
            app,
            window: None,
            exit_requested: false,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let renderer_init = self.renderer_init.clone();

        let mut entry = WindowEntry::try_new(FrameClock::new(), window, |w| {
            build_renderer(w, gpu_init, renderer_init)
        })?;

        entry.with_renderer_mut(|renderer| self.app.on_init(renderer))?;
        entry.with_window(|w| w.request_redraw());

        self.window = Some(entry);
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        let Some(entry) = &mut self.window else { return };
        entry.with_renderer_mut(|r| {
            if let Err(e) = r.set_window_resolution(size.width, size.height) {
                log::warn!("resize to {}x{} failed: {e}", size.width, size.height);
            }
        });
        entry.with_window(|w| w.request_redraw());
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, ctx: RuntimeCtx) {
        for cmd in ctx.commands {
            match cmd {
                Command::SetTitle(title) => {
                    if let Some(entry) = &self.window {
                        entry.with_window(|w| w.set_title(&title));
                    }
                }
                Command::Exit => self.exit_requested = true,
            }
        }

        if self.exit_requested {
            // Drop the renderer before the event loop tears the window down.
            self.window = None;
            event_loop.exit();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId) {
        let mut runtime_ctx = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window else { return };

        entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: window_id,
                    window: fields.window,
                },
                renderer: fields.renderer,
                time: fields.clock.tick(),
                runtime: &mut runtime_ctx,
            };
            control = app.on_frame(&mut ctx);
        });

        if control == AppControl::Exit {
            runtime_ctx.exit();
        }
        self.apply_commands(event_loop, runtime_ctx);
    }
}

fn build_renderer(window: &Window, gpu_init: GpuInit, init: RendererInit) -> Result<Renderer<WgpuBackend<'_>>> {
    let backend = pollster::block_on(WgpuBackend::new(window, gpu_init))
        .context("GPU initialization failed for window")?;
    Ok(Renderer::new(backend, init)?)
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e.context("failed to create initial window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);
        if self.config.continuous {
            if let Some(entry) = &self.window {
                entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        if self.window.is_none() {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            let mut ctx = RuntimeCtx::default();
            ctx.exit();
            self.apply_commands(event_loop, ctx);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                let mut ctx = RuntimeCtx::default();
                ctx.exit();
                self.apply_commands(event_loop, ctx);
            }

            WindowEvent::Resized(size) => self.resize(*size),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|e| e.with_window(|w| w.inner_size())) {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop, window_id),

            _ => {}
        }
    }
}
