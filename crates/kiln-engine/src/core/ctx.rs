use winit::window::{Window, WindowId};

use crate::backend::WgpuBackend;
use crate::coords::Color;
use crate::renderer::Renderer;
use crate::target::Target;
use crate::window::RuntimeCtx;

use super::app::AppControl;
use super::time::FrameTime;

/// The runtime's window.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Physical size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}

/// Per-frame context passed to [`super::App::on_frame`].
///
/// `'a` spans the callback; `'w` is the window borrow carried by the backend.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut Renderer<WgpuBackend<'w>>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'w> FrameCtx<'_, 'w> {
    /// Clears the window target to `clear`, runs `draw` against it, then flips.
    ///
    /// Returns [`AppControl::Exit`] when drawing or presenting fails.
    pub fn render<F>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&mut Renderer<WgpuBackend<'w>>, Target) -> anyhow::Result<()>,
    {
        let Some(target) = self.renderer.window() else {
            log::error!("renderer has no window target");
            return AppControl::Exit;
        };

        let drawn = self
            .renderer
            .clear_color(target, clear)
            .map_err(anyhow::Error::from)
            .and_then(|()| draw(self.renderer, target));
        if let Err(e) = drawn {
            log::error!("frame failed: {e:#}");
            return AppControl::Exit;
        }

        self.window.window.pre_present_notify();
        match self.renderer.flip() {
            Ok(()) => AppControl::Continue,
            Err(e) => {
                log::error!("present failed: {e}");
                AppControl::Exit
            }
        }
    }
}
