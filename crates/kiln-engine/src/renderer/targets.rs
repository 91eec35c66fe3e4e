use std::rc::Rc;

use crate::backend::{Backend, Features, PixelRegion};
use crate::coords::{Color, Rect, Vec2};
use crate::error::{Error, Result};
use crate::format::{PixelBuffer, PixelFormat};
use crate::target::{self, BlendMode, Camera, Clip, RenderTarget, Target, TargetKind};
use crate::texture::Image;

use super::Renderer;

impl<B: Backend> Renderer<B> {
    // ── lifecycle ─────────────────────────────────────────────────────────

    /// The window surface target, until it is freed.
    pub fn window(&self) -> Option<Target> {
        self.window
    }

    /// Read-only view of a target's state.
    pub fn target(&self, target: Target) -> Option<&RenderTarget> {
        self.targets.get(target)
    }

    /// Render target drawing into `image`. Calling it again returns the same target.
    pub fn load_target(&mut self, image: &Image) -> Result<Target> {
        self.report("load_target", |r| {
            r.check_image(image)?;
            if let Some(existing) = image.target().filter(|t| r.targets.contains(*t)) {
                return Ok(existing);
            }
            if !r.features.contains(Features::RENDER_TARGETS) {
                return Err(Error::backend("render targets are not supported"));
            }

            let handle = r
                .backend
                .create_framebuffer(image.handle)
                .map_err(|e| Error::backend(format!("framebuffer for image: {e}")))?;

            let mut rt = RenderTarget::new(
                handle,
                TargetKind::Texture {
                    image: Rc::downgrade(&image.0),
                },
                image.width,
                image.height,
                r.init.enable_blending,
            );
            rt.line_thickness = r.init.line_thickness;
            let target = r.targets.insert(rt);
            image.target.set(Some(target));
            log::debug!("Renderer: target {handle:?} for {}x{} image", image.width, image.height);
            Ok(target)
        })
    }

    /// Destroys `target`. The image it wraps, if any, stays alive.
    pub fn free_target(&mut self, target: Target) -> Result<()> {
        self.report("free_target", |r| {
            r.target_ref(target)?;
            r.destroy_target(target);
            Ok(())
        })
    }

    pub(super) fn destroy_target(&mut self, target: Target) {
        if self.batch_target == Some(target) {
            if let Err(err) = self.flush_batch() {
                log::warn!("Renderer: flush before freeing target failed: {err}");
            }
            self.batch_target = None;
        }
        let Some(rt) = self.targets.remove(target) else { return };

        if self.window == Some(target) {
            self.window = None;
        }
        if let TargetKind::Texture { image } = &rt.kind {
            if let Some(image) = image.upgrade() {
                image.target.set(None);
            }
        }
        self.cache.forget_framebuffer(rt.handle);
        if !rt.handle.is_window() {
            self.backend.delete_framebuffer(rt.handle);
        }
    }

    // ── clearing ──────────────────────────────────────────────────────────

    /// Clears the visible area of `target` to transparent black.
    pub fn clear(&mut self, target: Target) -> Result<()> {
        self.clear_color(target, Color::TRANSPARENT)
    }

    /// Fills the visible (clipped) area of `target` with `color`.
    pub fn clear_color(&mut self, target: Target, color: Color) -> Result<()> {
        self.report("clear", |r| {
            r.bind_target(target)?;
            r.flush_batch()?;
            let scissor = target::scissor_region(r.target_ref(target)?);
            if scissor.is_empty() {
                return Ok(());
            }
            r.backend.clear(color, Some(scissor))
        })
    }

    // ── clipping ──────────────────────────────────────────────────────────

    /// Enables clipping to `rect` and returns the previous clip rect.
    pub fn set_clip(&mut self, target: Target, rect: Rect) -> Result<Rect> {
        self.report("set_clip", |r| {
            r.target_ref(target)?;
            r.flush_target(target)?;
            let rt = r.target_mut(target)?;
            let previous = rt.clip.rect;
            rt.clip = Clip { enabled: true, rect };
            Ok(previous)
        })
    }

    /// Disables clipping; the clip rect resets to the whole target.
    pub fn unset_clip(&mut self, target: Target) -> Result<()> {
        self.report("unset_clip", |r| {
            r.target_ref(target)?;
            r.flush_target(target)?;
            r.target_mut(target)?.reset_clip();
            Ok(())
        })
    }

    pub fn clip(&self, target: Target) -> Result<Clip> {
        Ok(self.target_ref(target)?.clip)
    }

    // ── readback ──────────────────────────────────────────────────────────

    /// Contents of `target`, rows top to bottom.
    ///
    /// Window targets read back the whole surface as RGBA; texture targets
    /// return the wrapped image's logical area in its channel count.
    pub fn read_target_pixels(&mut self, target: Target) -> Result<PixelBuffer> {
        self.report("read_target_pixels", |r| r.target_pixels(target))
    }

    pub(super) fn target_pixels(&mut self, target: Target) -> Result<PixelBuffer> {
        self.bind_target(target)?;
        self.flush_batch()?;

        let rt = self.target_ref(target)?;
        let (w, h) = (rt.base_width, rt.base_height);
        let window = rt.is_window();
        let channels = match &rt.kind {
            TargetKind::Texture { image } => image.upgrade().map_or(4, |i| i.channels()),
            TargetKind::Window => 4,
        };

        let rgba = self.backend.read_pixels(PixelRegion::from_size(w, h))?;
        let buffer = PixelBuffer::from_raw(w, h, PixelFormat::rgba32(), rgba)?;
        let buffer = if window { buffer.flipped_vertically() } else { buffer };
        Ok(match channels {
            3 => buffer.converted(PixelFormat::rgb24()),
            _ => buffer,
        })
    }

    /// Color at logical `(x, y)`, top-left origin. Transparent black outside the target.
    pub fn get_pixel(&mut self, target: Target, x: i32, y: i32) -> Result<Color> {
        self.report("get_pixel", |r| {
            let Some((px, py)) = target::pixel_position(r.target_ref(target)?, x, y) else {
                return Ok(Color::TRANSPARENT);
            };
            r.bind_target(target)?;
            r.flush_batch()?;
            let rgba = r.backend.read_pixels(PixelRegion::new(px, py, 1, 1))?;
            match rgba.as_slice() {
                [red, green, blue, alpha, ..] => Ok(Color::rgba(*red, *green, *blue, *alpha)),
                _ => Err(Error::backend("short pixel read")),
            }
        })
    }

    // ── view ──────────────────────────────────────────────────────────────

    pub fn camera(&self, target: Target) -> Result<Camera> {
        Ok(self.target_ref(target)?.camera)
    }

    /// Sets the camera (`None` restores the default) and returns the previous one.
    pub fn set_camera(&mut self, target: Target, camera: Option<Camera>) -> Result<Camera> {
        self.report("set_camera", |r| {
            r.target_ref(target)?;
            r.flush_target(target)?;
            let rt = r.target_mut(target)?;
            Ok(std::mem::replace(&mut rt.camera, camera.unwrap_or_default()))
        })
    }

    /// Draws in a `width` x `height` logical space scaled onto the surface.
    pub fn set_virtual_resolution(&mut self, target: Target, width: u32, height: u32) -> Result<()> {
        self.report("set_virtual_resolution", |r| {
            if width == 0 || height == 0 {
                return Err(Error::invalid(format!("virtual resolution {width}x{height}")));
            }
            r.target_ref(target)?;
            r.flush_target(target)?;
            r.target_mut(target)?.set_virtual_resolution(width, height);
            Ok(())
        })
    }

    pub fn unset_virtual_resolution(&mut self, target: Target) -> Result<()> {
        self.report("unset_virtual_resolution", |r| {
            r.target_ref(target)?;
            r.flush_target(target)?;
            r.target_mut(target)?.unset_virtual_resolution();
            Ok(())
        })
    }

    /// Converts surface pixel coordinates into the target's logical space.
    pub fn virtual_coords(&self, target: Target, x: f32, y: f32) -> Result<Vec2> {
        Ok(self.target_ref(target)?.virtual_coords(x, y))
    }

    /// Resizes the window surface.
    pub fn set_window_resolution(&mut self, width: u32, height: u32) -> Result<()> {
        self.report("set_window_resolution", |r| {
            let window = r.window.ok_or_else(|| Error::User("no window target".into()))?;
            if width == 0 || height == 0 {
                return Err(Error::invalid(format!("window resolution {width}x{height}")));
            }
            r.flush_target(window)?;
            r.backend.resize_window(width, height)?;
            r.target_mut(window)?.resize_base(width, height);
            Ok(())
        })
    }

    // ── blending ──────────────────────────────────────────────────────────

    pub fn blending(&self, target: Target) -> Result<bool> {
        Ok(self.target_ref(target)?.blending)
    }

    pub fn set_blending(&mut self, target: Target, enabled: bool) -> Result<()> {
        self.report("set_blending", |r| {
            if r.target_ref(target)?.blending != enabled {
                r.flush_target(target)?;
                r.target_mut(target)?.blending = enabled;
            }
            Ok(())
        })
    }

    /// Selects a blend preset. Presets the backend cannot express are ignored.
    pub fn set_blend_mode(&mut self, target: Target, mode: BlendMode) -> Result<()> {
        self.report("set_blend_mode", |r| {
            if r.target_ref(target)?.blend_mode == mode {
                return Ok(());
            }
            if !mode.is_supported(r.features) {
                log::debug!("Renderer: blend mode {mode:?} unavailable, ignored");
                return Ok(());
            }
            r.flush_target(target)?;
            r.target_mut(target)?.blend_mode = mode;
            Ok(())
        })
    }

    pub fn blend_mode(&self, target: Target) -> Result<BlendMode> {
        Ok(self.target_ref(target)?.blend_mode)
    }
}
