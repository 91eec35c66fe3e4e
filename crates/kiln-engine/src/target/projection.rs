use crate::backend::PixelRegion;
use crate::coords::{Mat4, Rect};

use super::RenderTarget;

const NEAR: f32 = -1.0;
const FAR: f32 = 1.0;

/// Logical target coordinates to clip space, camera included.
///
/// Window targets are y-down: logical y = 0 is the top of the window, which
/// is the last row in memory. Texture targets keep logical y = 0 on memory
/// row 0, which is the top row of the image.
pub fn projection(target: &RenderTarget) -> Mat4 {
    let w = target.width as f32;
    let h = target.height as f32;
    let cam = target.camera;

    let ortho = if target.is_window() {
        Mat4::ortho(cam.x, cam.x + w, cam.y + h, cam.y, NEAR, FAR)
    } else {
        Mat4::ortho(cam.x, cam.x + w, cam.y, cam.y + h, NEAR, FAR)
    };
    ortho * cam.view(w, h)
}

/// The whole physical surface.
pub fn viewport(target: &RenderTarget) -> PixelRegion {
    PixelRegion::from_size(target.base_width, target.base_height)
}

/// The active clip in physical memory coordinates, cut to the target.
///
/// An empty region means nothing may be drawn.
pub fn scissor_region(target: &RenderTarget) -> PixelRegion {
    let rect = if target.clip.enabled {
        target.clip.rect
    } else {
        target.bounds()
    };
    let Some(rect) = rect.intersect(target.bounds()) else {
        return PixelRegion::default();
    };
    to_memory(target, rect)
}

fn to_memory(target: &RenderTarget, rect: Rect) -> PixelRegion {
    let s = target.scale();
    let x0 = (rect.x * s.x).round().max(0.0) as u32;
    let x1 = ((rect.x + rect.w) * s.x).round().max(0.0) as u32;
    let y0 = (rect.y * s.y).round().max(0.0) as u32;
    let y1 = ((rect.y + rect.h) * s.y).round().max(0.0) as u32;

    let x1 = x1.min(target.base_width);
    let y1 = y1.min(target.base_height);
    let w = x1.saturating_sub(x0);
    let h = y1.saturating_sub(y0);

    if target.is_window() {
        PixelRegion::new(x0, target.base_height.saturating_sub(y1), w, h)
    } else {
        PixelRegion::new(x0, y0, w, h)
    }
}

/// Memory position of the logical pixel `(x, y)`, `None` outside the target.
pub fn pixel_position(target: &RenderTarget, x: i32, y: i32) -> Option<(u32, u32)> {
    if x < 0 || y < 0 || x as u32 >= target.width || y as u32 >= target.height {
        return None;
    }
    let s = target.scale();
    let px = ((x as f32 * s.x) as u32).min(target.base_width.saturating_sub(1));
    let py = ((y as f32 * s.y) as u32).min(target.base_height.saturating_sub(1));
    if target.is_window() {
        Some((px, target.base_height - 1 - py))
    } else {
        Some((px, py))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FramebufferHandle;
    use crate::target::TargetKind;

    fn window(w: u32, h: u32) -> RenderTarget {
        RenderTarget::new(FramebufferHandle::WINDOW, TargetKind::Window, w, h, true)
    }

    fn texture(w: u32, h: u32) -> RenderTarget {
        RenderTarget::new(
            FramebufferHandle(1),
            TargetKind::Texture { image: std::rc::Weak::new() },
            w,
            h,
            true,
        )
    }

    fn clip_to(target: &mut RenderTarget, rect: Rect) {
        target.clip.enabled = true;
        target.clip.rect = rect;
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn window_top_maps_to_clip_top() {
        let p = projection(&window(100, 50));
        let top = p.transform_point(0.0, 0.0, 0.0);
        assert!((top[0] + 1.0).abs() < 1e-6 && (top[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn texture_top_maps_to_first_row() {
        let p = projection(&texture(100, 50));
        let top = p.transform_point(0.0, 0.0, 0.0);
        assert!((top[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn camera_offset_shifts_view() {
        let mut t = texture(100, 100);
        t.camera.x = 50.0;
        let p = projection(&t);
        let left = p.transform_point(50.0, 0.0, 0.0);
        assert!((left[0] + 1.0).abs() < 1e-6);
    }

    // ── scissor ───────────────────────────────────────────────────────────

    #[test]
    fn unclipped_scissor_is_full_surface() {
        assert_eq!(scissor_region(&texture(30, 20)), PixelRegion::from_size(30, 20));
    }

    #[test]
    fn window_clip_is_flipped() {
        let mut t = window(100, 100);
        clip_to(&mut t, Rect::new(10.0, 10.0, 20.0, 30.0));
        assert_eq!(scissor_region(&t), PixelRegion::new(10, 60, 20, 30));
    }

    #[test]
    fn clip_scales_with_virtual_resolution() {
        let mut t = window(200, 200);
        t.set_virtual_resolution(100, 100);
        clip_to(&mut t, Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(scissor_region(&t), PixelRegion::new(0, 100, 100, 100));
    }

    #[test]
    fn clip_outside_target_is_empty() {
        let mut t = texture(10, 10);
        clip_to(&mut t, Rect::new(20.0, 20.0, 5.0, 5.0));
        assert!(scissor_region(&t).is_empty());
        clip_to(&mut t, Rect::new(2.0, 2.0, 0.0, 5.0));
        assert!(scissor_region(&t).is_empty());
    }

    #[test]
    fn clip_is_cut_to_bounds() {
        let mut t = texture(10, 10);
        clip_to(&mut t, Rect::new(-5.0, 5.0, 10.0, 10.0));
        assert_eq!(scissor_region(&t), PixelRegion::new(0, 5, 5, 5));
    }

    // ── pixels ────────────────────────────────────────────────────────────

    #[test]
    fn pixel_positions() {
        assert_eq!(pixel_position(&window(10, 10), 0, 0), Some((0, 9)));
        assert_eq!(pixel_position(&texture(10, 10), 3, 4), Some((3, 4)));
        assert_eq!(pixel_position(&texture(10, 10), 10, 0), None);
        assert_eq!(pixel_position(&texture(10, 10), -1, 0), None);
    }
}
