use std::rc::Weak;

use crate::backend::{FramebufferHandle, ProgramHandle};
use crate::coords::{Rect, Vec2};
use crate::texture::ImageData;

use super::{BlendMode, Camera};

/// What a render target draws into.
#[derive(Debug, Clone)]
pub enum TargetKind {
    /// The window surface.
    Window,
    /// A framebuffer wrapping an image. The image outlives the target.
    Texture { image: Weak<ImageData> },
}

/// Scissor rectangle in logical target coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Clip {
    pub enabled: bool,
    pub rect: Rect,
}

/// State of one render target.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub(crate) handle: FramebufferHandle,
    pub(crate) kind: TargetKind,

    /// Logical size callers draw in.
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// Physical size of the surface behind the target.
    pub(crate) base_width: u32,
    pub(crate) base_height: u32,
    pub(crate) virtual_resolution: bool,

    pub(crate) clip: Clip,
    pub(crate) camera: Camera,
    pub(crate) program: ProgramHandle,
    pub(crate) blending: bool,
    pub(crate) blend_mode: BlendMode,
    pub(crate) line_thickness: f32,
}

impl RenderTarget {
    pub(crate) fn new(handle: FramebufferHandle, kind: TargetKind, width: u32, height: u32, blending: bool) -> Self {
        Self {
            handle,
            kind,
            width,
            height,
            base_width: width,
            base_height: height,
            virtual_resolution: false,
            clip: Clip {
                enabled: false,
                rect: Rect::from_size(width as f32, height as f32),
            },
            camera: Camera::default(),
            program: ProgramHandle::NONE,
            blending,
            blend_mode: BlendMode::Normal,
            line_thickness: 1.0,
        }
    }

    pub fn handle(&self) -> FramebufferHandle {
        self.handle
    }

    pub fn kind(&self) -> &TargetKind {
        &self.kind
    }

    pub fn is_window(&self) -> bool {
        matches!(self.kind, TargetKind::Window)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn base_width(&self) -> u32 {
        self.base_width
    }

    pub fn base_height(&self) -> u32 {
        self.base_height
    }

    pub fn has_virtual_resolution(&self) -> bool {
        self.virtual_resolution
    }

    pub fn clip(&self) -> Clip {
        self.clip
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn blending(&self) -> bool {
        self.blending
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn line_thickness(&self) -> f32 {
        self.line_thickness
    }

    /// Full logical area.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width as f32, self.height as f32)
    }

    /// Physical pixels per logical pixel on each axis.
    pub fn scale(&self) -> Vec2 {
        Vec2::new(
            self.base_width as f32 / self.width.max(1) as f32,
            self.base_height as f32 / self.height.max(1) as f32,
        )
    }

    /// Maps physical surface coordinates to logical ones.
    pub fn virtual_coords(&self, x: f32, y: f32) -> Vec2 {
        let s = self.scale();
        Vec2::new(x / s.x, y / s.y)
    }

    /// Switches to a logical size independent of the surface.
    pub(crate) fn set_virtual_resolution(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.virtual_resolution = true;
        self.reset_clip();
    }

    pub(crate) fn unset_virtual_resolution(&mut self) {
        self.width = self.base_width;
        self.height = self.base_height;
        self.virtual_resolution = false;
        self.reset_clip();
    }

    /// New physical size; the logical size follows unless it is virtual.
    pub(crate) fn resize_base(&mut self, width: u32, height: u32) {
        self.base_width = width;
        self.base_height = height;
        if !self.virtual_resolution {
            self.width = width;
            self.height = height;
            self.reset_clip();
        }
    }

    pub(crate) fn reset_clip(&mut self) {
        self.clip = Clip {
            enabled: false,
            rect: self.bounds(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(w: u32, h: u32) -> RenderTarget {
        RenderTarget::new(FramebufferHandle::WINDOW, TargetKind::Window, w, h, true)
    }

    #[test]
    fn clip_defaults_to_full_target() {
        let t = window(64, 32);
        assert!(!t.clip().enabled);
        assert_eq!(t.clip().rect, Rect::from_size(64.0, 32.0));
        assert_eq!(t.line_thickness(), 1.0);
    }

    #[test]
    fn virtual_resolution_scales_coords() {
        let mut t = window(800, 600);
        t.set_virtual_resolution(400, 300);
        assert_eq!(t.scale(), Vec2::new(2.0, 2.0));
        assert_eq!(t.virtual_coords(200.0, 100.0), Vec2::new(100.0, 50.0));

        t.unset_virtual_resolution();
        assert_eq!(t.width(), 800);
    }

    #[test]
    fn resize_keeps_virtual_size() {
        let mut t = window(800, 600);
        t.set_virtual_resolution(400, 300);
        t.resize_base(1600, 1200);
        assert_eq!((t.width(), t.height()), (400, 300));
        assert_eq!(t.base_width(), 1600);
    }
}
