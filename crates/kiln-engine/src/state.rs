//! Memo of the texture and framebuffer last bound on the backend.
//!
//! The renderer consults the cache before every bind. A changed binding
//! forces a flush first because pending vertices belong to the old one.

use crate::backend::{FramebufferHandle, TextureHandle};

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct StateCache {
    texture: Option<TextureHandle>,
    /// Modulation color of the bound image, normalized RGBA.
    texture_color: [f32; 4],
    framebuffer: Option<FramebufferHandle>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn texture_color(&self) -> [f32; 4] {
        self.texture_color
    }

    pub fn framebuffer(&self) -> Option<FramebufferHandle> {
        self.framebuffer
    }

    pub fn is_texture_bound(&self, texture: TextureHandle) -> bool {
        self.texture == Some(texture)
    }

    /// Whether `framebuffer` is current.
    ///
    /// Without render-target support only the window surface can ever be
    /// bound, so the check collapses to "is this the window".
    pub fn is_framebuffer_bound(&self, framebuffer: FramebufferHandle, render_targets: bool) -> bool {
        if !render_targets {
            return framebuffer.is_window();
        }
        self.framebuffer == Some(framebuffer)
    }

    pub fn set_texture(&mut self, texture: TextureHandle, color: [f32; 4]) {
        self.texture = Some(texture);
        self.texture_color = color;
    }

    /// Updates the color of the bound image without changing the binding.
    pub fn set_texture_color(&mut self, texture: TextureHandle, color: [f32; 4]) {
        if self.is_texture_bound(texture) {
            self.texture_color = color;
        }
    }

    pub fn set_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffer = Some(framebuffer);
    }

    /// Resets the texture slot if it holds `texture`. Returns whether it did.
    pub fn forget_texture(&mut self, texture: TextureHandle) -> bool {
        if self.is_texture_bound(texture) {
            self.texture = None;
            return true;
        }
        false
    }

    /// Resets the framebuffer slot if it holds `framebuffer`. Returns whether it did.
    pub fn forget_framebuffer(&mut self, framebuffer: FramebufferHandle) -> bool {
        if self.framebuffer == Some(framebuffer) {
            self.framebuffer = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unbound() {
        let c = StateCache::new();
        assert_eq!(c.texture(), None);
        assert_eq!(c.framebuffer(), None);
    }

    #[test]
    fn forget_only_matching_texture() {
        let mut c = StateCache::new();
        c.set_texture(TextureHandle(3), [1.0; 4]);
        assert!(!c.forget_texture(TextureHandle(4)));
        assert!(c.is_texture_bound(TextureHandle(3)));
        assert!(c.forget_texture(TextureHandle(3)));
        assert_eq!(c.texture(), None);
    }

    #[test]
    fn color_update_ignores_other_textures() {
        let mut c = StateCache::new();
        c.set_texture(TextureHandle(1), [1.0; 4]);
        c.set_texture_color(TextureHandle(2), [0.0; 4]);
        assert_eq!(c.texture_color(), [1.0; 4]);
        c.set_texture_color(TextureHandle(1), [0.5; 4]);
        assert_eq!(c.texture_color(), [0.5; 4]);
    }

    #[test]
    fn without_render_targets_only_window_is_bound() {
        let mut c = StateCache::new();
        assert!(c.is_framebuffer_bound(FramebufferHandle::WINDOW, false));
        assert!(!c.is_framebuffer_bound(FramebufferHandle(5), false));

        c.set_framebuffer(FramebufferHandle(5));
        assert!(c.is_framebuffer_bound(FramebufferHandle(5), true));
        assert!(!c.is_framebuffer_bound(FramebufferHandle::WINDOW, true));
    }

    #[test]
    fn forget_framebuffer_resets_slot() {
        let mut c = StateCache::new();
        c.set_framebuffer(FramebufferHandle(2));
        assert!(c.forget_framebuffer(FramebufferHandle(2)));
        assert!(!c.is_framebuffer_bound(FramebufferHandle(2), true));
    }
}
