//! Triangle rasterization for the software backend.

use crate::backend::{BlendEquation, BlendFactor, BlendState, DrawState, SamplerState, Vertex};

use super::surface::{to_byte, to_unit, Surface};

#[derive(Debug, Copy, Clone)]
struct ScreenVertex {
    x: f32,
    y: f32,
    s: f32,
    t: f32,
}

/// Maps a vertex through the projection and viewport into memory coordinates.
fn to_screen(state: &DrawState, v: &Vertex) -> ScreenVertex {
    let clip = state.projection.transform_point(v.pos[0], v.pos[1], v.pos[2]);
    let w = if clip[3].abs() > f32::EPSILON { clip[3] } else { 1.0 };
    let vp = state.viewport;
    ScreenVertex {
        x: vp.x as f32 + (clip[0] / w + 1.0) * 0.5 * vp.w as f32,
        y: vp.y as f32 + (clip[1] / w + 1.0) * 0.5 * vp.h as f32,
        s: v.tex[0],
        t: v.tex[1],
    }
}

#[inline]
fn edge(a: ScreenVertex, b: ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

/// Pixels exactly on an edge belong to one side only, so shared quad
/// diagonals are never blended twice.
#[inline]
fn owns_edge(a: ScreenVertex, b: ScreenVertex) -> bool {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dy > 0.0 || (dy == 0.0 && dx < 0.0)
}

#[inline]
fn covers(w: f32, a: ScreenVertex, b: ScreenVertex) -> bool {
    w > 0.0 || (w == 0.0 && owns_edge(a, b))
}

/// Draws `vertices` as a triangle list into `dst`.
///
/// Returns the number of fragments written.
pub(super) fn draw_triangles(
    dst: &mut Surface,
    texture: Option<(&Surface, SamplerState)>,
    state: &DrawState,
    vertices: &[Vertex],
) -> u64 {
    let Some(bounds) = dst.clamp(state.scissor) else { return 0 };
    let mut written = 0;

    for tri in vertices.chunks_exact(3) {
        let a = to_screen(state, &tri[0]);
        let mut b = to_screen(state, &tri[1]);
        let mut c = to_screen(state, &tri[2]);

        let mut area = edge(a, b, c.x, c.y);
        if area == 0.0 || !area.is_finite() {
            continue;
        }
        if area < 0.0 {
            std::mem::swap(&mut b, &mut c);
            area = -area;
        }

        let minifying = texture.is_some_and(|(tex, _)| {
            let uv_area = ((b.s - a.s) * (c.t - a.t) - (c.s - a.s) * (b.t - a.t)).abs()
                * tex.width() as f32
                * tex.height() as f32;
            uv_area > area
        });

        let min_x = a.x.min(b.x).min(c.x).floor().max(bounds.x as f32) as u32;
        let min_y = a.y.min(b.y).min(c.y).floor().max(bounds.y as f32) as u32;
        let max_x = (a.x.max(b.x).max(c.x).ceil() as i64).min((bounds.x + bounds.w) as i64);
        let max_y = (a.y.max(b.y).max(c.y).ceil() as i64).min((bounds.y + bounds.h) as i64);
        if max_x <= min_x as i64 || max_y <= min_y as i64 {
            continue;
        }

        for py in min_y..max_y as u32 {
            for px in min_x..max_x as u32 {
                let cx = px as f32 + 0.5;
                let cy = py as f32 + 0.5;

                let w0 = edge(b, c, cx, cy);
                let w1 = edge(c, a, cx, cy);
                let w2 = edge(a, b, cx, cy);
                if !(covers(w0, b, c) && covers(w1, c, a) && covers(w2, a, b)) {
                    continue;
                }

                let (l0, l1, l2) = (w0 / area, w1 / area, w2 / area);
                let mut src = state.color;
                if state.textured {
                    if let Some((tex, sampler)) = texture {
                        let s = a.s * l0 + b.s * l1 + c.s * l2;
                        let t = a.t * l0 + b.t * l1 + c.t * l2;
                        let texel = tex.sample(s, t, sampler, minifying);
                        for i in 0..4 {
                            src[i] *= texel[i];
                        }
                    }
                }

                let out = match state.blend {
                    Some(blend) => apply_blend(blend, src, to_unit(dst.get(px, py))),
                    None => src,
                };
                dst.set(px, py, to_byte(out));
                written += 1;
            }
        }
    }

    written
}

fn factor(f: BlendFactor, src: [f32; 4], dst: [f32; 4], channel: usize) -> f32 {
    match f {
        BlendFactor::Zero => 0.0,
        BlendFactor::One => 1.0,
        BlendFactor::SrcColor => src[channel],
        BlendFactor::OneMinusSrcColor => 1.0 - src[channel],
        BlendFactor::DstColor => dst[channel],
        BlendFactor::OneMinusDstColor => 1.0 - dst[channel],
        BlendFactor::SrcAlpha => src[3],
        BlendFactor::OneMinusSrcAlpha => 1.0 - src[3],
        BlendFactor::DstAlpha => dst[3],
        BlendFactor::OneMinusDstAlpha => 1.0 - dst[3],
    }
}

pub(super) fn apply_blend(blend: BlendState, src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let (sf, df) = if i < 3 {
            (blend.src_color, blend.dst_color)
        } else {
            (blend.src_alpha, blend.dst_alpha)
        };
        let s = src[i] * factor(sf, src, dst, i);
        let d = dst[i] * factor(df, src, dst, i);
        *slot = match blend.equation {
            BlendEquation::Add => s + d,
            BlendEquation::Subtract => s - d,
            BlendEquation::ReverseSubtract => d - s,
        }
        .clamp(0.0, 1.0);
    }
    out
}
