use winit::event::WindowEvent;

use crate::backend::WgpuBackend;
use crate::renderer::Renderer;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application driven by [`crate::window::Runtime`].
pub trait App {
    /// Called once the window and its renderer exist. Load images and
    /// compile programs here.
    fn on_init(&mut self, renderer: &mut Renderer<WgpuBackend<'_>>) -> anyhow::Result<()> {
        let _ = renderer;
        Ok(())
    }

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
