use crate::backend::Vertex;
use crate::coords::{Rect, Vec2};

use super::VERTICES_PER_QUAD;

/// Inward inset, in texels, that keeps linear filtering from bleeding across
/// source-rect edges.
const TEXEL_INSET: f32 = 0.1;

/// Normalized texture coordinates of a source rect.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TexCoords {
    pub s1: f32,
    pub t1: f32,
    pub s2: f32,
    pub t2: f32,
}

/// Texture coordinates of `src` inside storage of `tex_w` x `tex_h` texels.
pub fn tex_coords(src: Rect, tex_w: u32, tex_h: u32) -> TexCoords {
    let tw = tex_w.max(1) as f32;
    let th = tex_h.max(1) as f32;
    TexCoords {
        s1: (src.x + TEXEL_INSET) / tw,
        t1: (src.y + TEXEL_INSET) / th,
        s2: (src.x + src.w - TEXEL_INSET) / tw,
        t2: (src.y + src.h - TEXEL_INSET) / th,
    }
}

/// Placement of one blit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlitTransform {
    /// Destination of the pivot.
    pub x: f32,
    pub y: f32,
    /// Pivot inside the source rect, from its top-left corner.
    pub pivot: Vec2,
    /// Clockwise on screen, in degrees.
    pub angle: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl BlitTransform {
    /// Untransformed blit centred at `(x, y)`.
    pub fn centered(src: Rect, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            pivot: Vec2::new(src.w / 2.0, src.h / 2.0),
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

/// Destination corners (TL, TR, BR, BL) of a `src`-sized quad under `t`.
///
/// The quad starts centred on the origin, is scaled around its centre,
/// shifted so the scaled pivot sits on the origin, rotated, then moved to
/// `(t.x, t.y)`.
pub fn transformed_corners(src: Rect, t: &BlitTransform) -> [Vec2; 4] {
    let half_w = src.w * t.scale_x / 2.0;
    let half_h = src.h * t.scale_y / 2.0;

    let pivot = (t.pivot - Vec2::new(src.w / 2.0, src.h / 2.0)).scaled(t.scale_x, t.scale_y);

    let corners = [
        Vec2::new(-half_w, -half_h),
        Vec2::new(half_w, -half_h),
        Vec2::new(half_w, half_h),
        Vec2::new(-half_w, half_h),
    ];

    let origin = Vec2::new(t.x, t.y);
    corners.map(|c| {
        let c = c - pivot;
        let c = if t.angle != 0.0 { c.rotated(t.angle) } else { c };
        c + origin
    })
}

/// Destination corners of a `src`-sized quad under a 3x3 column-major matrix,
/// then translated to `(x, y)`.
pub fn matrix_corners(src: Rect, x: f32, y: f32, m: &[f32; 9]) -> [Vec2; 4] {
    let hw = src.w / 2.0;
    let hh = src.h / 2.0;
    [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ]
    .map(|v| {
        Vec2::new(
            m[0] * v.x + m[3] * v.y + m[6] + x,
            m[1] * v.x + m[4] * v.y + m[7] + y,
        )
    })
}

/// Six vertices for corners TL, TR, BR, BL.
pub fn quad_vertices(corners: [Vec2; 4], tc: TexCoords, z: f32) -> [Vertex; VERTICES_PER_QUAD] {
    let [tl, tr, br, bl] = corners;
    let tl = Vertex::new(tl.x, tl.y, z, tc.s1, tc.t1);
    let tr = Vertex::new(tr.x, tr.y, z, tc.s2, tc.t1);
    let br = Vertex::new(br.x, br.y, z, tc.s2, tc.t2);
    let bl = Vertex::new(bl.x, bl.y, z, tc.s1, tc.t2);
    [tl, tr, br, tl, br, bl]
}

/// One entry of a batched blit: centre position and optional source rect.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub src: Option<Rect>,
}

impl Sprite {
    pub const fn at(x: f32, y: f32) -> Self {
        Self { x, y, src: None }
    }
}
