//! CPU triangulation of primitive shapes.
//!
//! Every generator returns a triangle list in logical target coordinates.
//! Angles are degrees; 0 points along +X and positive angles turn towards +Y.

use crate::backend::Vertex;
use crate::coords::{Rect, Vec2};

const MIN_SEGMENTS: usize = 8;
const MAX_SEGMENTS: usize = 256;

fn push_tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2) {
    for p in [a, b, c] {
        out.push(Vertex::new(p.x, p.y, 0.0, 0.0, 0.0));
    }
}

/// Quad with corners in order around its edge.
fn push_quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2) {
    push_tri(out, a, b, c);
    push_tri(out, a, c, d);
}

fn push_rect(out: &mut Vec<Vertex>, x0: f32, y0: f32, x1: f32, y1: f32) {
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    push_quad(
        out,
        Vec2::new(x0, y0),
        Vec2::new(x1, y0),
        Vec2::new(x1, y1),
        Vec2::new(x0, y1),
    );
}

/// Segments for a `sweep`-degree arc of `radius`, dense enough to look round.
fn segments(radius: f32, sweep: f32) -> usize {
    let full = (radius.abs().sqrt() * 6.0) as usize;
    let n = (full as f32 * sweep.abs() / 360.0).ceil() as usize;
    n.clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

fn on_circle(center: Vec2, radius: f32, degrees: f32) -> Vec2 {
    let (s, c) = degrees.to_radians().sin_cos();
    Vec2::new(center.x + radius * c, center.y + radius * s)
}

/// Sweep from `start` to `end`, normalized to at most one turn.
fn normalized_sweep(start: f32, end: f32) -> f32 {
    let mut sweep = end - start;
    if sweep.abs() > 360.0 {
        sweep = 360.0f32.copysign(sweep);
    }
    sweep
}

pub fn pixel(x: f32, y: f32) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(6);
    push_rect(&mut out, x, y, x + 1.0, y + 1.0);
    out
}

/// Segment `a`-`b` as a quad `thickness` wide.
pub fn line(a: Vec2, b: Vec2, thickness: f32) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(6);
    push_line(&mut out, a, b, thickness);
    out
}

fn push_line(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, thickness: f32) {
    let half = thickness.max(0.0) / 2.0;
    let d = b - a;
    let len = (d.x * d.x + d.y * d.y).sqrt();
    if len <= f32::EPSILON {
        push_rect(out, a.x - half, a.y - half, a.x + half, a.y + half);
        return;
    }
    let n = Vec2::new(-d.y, d.x) * (half / len);
    push_quad(out, a + n, b + n, b - n, a - n);
}

/// Ring segment between `inner` and `outer` radius.
fn push_ring(out: &mut Vec<Vertex>, center: Vec2, inner: f32, outer: f32, start: f32, sweep: f32) {
    let n = segments(outer, sweep);
    let step = sweep / n as f32;
    for i in 0..n {
        let a0 = start + step * i as f32;
        let a1 = a0 + step;
        push_quad(
            out,
            on_circle(center, outer, a0),
            on_circle(center, outer, a1),
            on_circle(center, inner, a1),
            on_circle(center, inner, a0),
        );
    }
}

/// Pie slice.
fn push_fan(out: &mut Vec<Vertex>, center: Vec2, radius: f32, start: f32, sweep: f32) {
    let n = segments(radius, sweep);
    let step = sweep / n as f32;
    for i in 0..n {
        let a0 = start + step * i as f32;
        push_tri(
            out,
            center,
            on_circle(center, radius, a0),
            on_circle(center, radius, a0 + step),
        );
    }
}

/// Stroke of an arc, centred on `radius`.
pub fn arc(center: Vec2, radius: f32, start: f32, end: f32, thickness: f32) -> Vec<Vertex> {
    let mut out = Vec::new();
    let sweep = normalized_sweep(start, end);
    if sweep == 0.0 || radius <= 0.0 {
        return out;
    }
    let half = thickness.max(0.0) / 2.0;
    push_ring(&mut out, center, (radius - half).max(0.0), radius + half, start, sweep);
    out
}

pub fn arc_filled(center: Vec2, radius: f32, start: f32, end: f32) -> Vec<Vertex> {
    let mut out = Vec::new();
    let sweep = normalized_sweep(start, end);
    if sweep == 0.0 || radius <= 0.0 {
        return out;
    }
    push_fan(&mut out, center, radius, start, sweep);
    out
}

pub fn circle(center: Vec2, radius: f32, thickness: f32) -> Vec<Vertex> {
    arc(center, radius, 0.0, 360.0, thickness)
}

pub fn circle_filled(center: Vec2, radius: f32) -> Vec<Vertex> {
    arc_filled(center, radius, 0.0, 360.0)
}

pub fn tri(points: [Vec2; 3], thickness: f32) -> Vec<Vertex> {
    polygon(&points, thickness)
}

pub fn tri_filled(points: [Vec2; 3]) -> Vec<Vertex> {
    let mut out = Vec::with_capacity(3);
    push_tri(&mut out, points[0], points[1], points[2]);
    out
}

/// Outline straddling the rectangle's edges.
pub fn rectangle(rect: Rect, thickness: f32) -> Vec<Vertex> {
    let r = rect.normalized();
    let half = thickness.max(0.0) / 2.0;
    let (ox0, oy0, ox1, oy1) = (r.x - half, r.y - half, r.x + r.w + half, r.y + r.h + half);
    let (ix0, iy0, ix1, iy1) = (r.x + half, r.y + half, r.x + r.w - half, r.y + r.h - half);

    let mut out = Vec::with_capacity(24);
    if ix1 <= ix0 || iy1 <= iy0 {
        push_rect(&mut out, ox0, oy0, ox1, oy1);
        return out;
    }
    push_rect(&mut out, ox0, oy0, ox1, iy0);
    push_rect(&mut out, ox0, iy1, ox1, oy1);
    push_rect(&mut out, ox0, iy0, ix0, iy1);
    push_rect(&mut out, ix1, iy0, ox1, iy1);
    out
}

pub fn rectangle_filled(rect: Rect) -> Vec<Vertex> {
    let r = rect.normalized();
    let mut out = Vec::with_capacity(6);
    push_rect(&mut out, r.x, r.y, r.x + r.w, r.y + r.h);
    out
}

fn corner_radius(rect: Rect, radius: f32) -> f32 {
    radius.max(0.0).min(rect.w / 2.0).min(rect.h / 2.0)
}

/// Corner centres and their start angles: top-left, top-right, bottom-right, bottom-left.
fn corners(r: Rect, radius: f32) -> [(Vec2, f32); 4] {
    [
        (Vec2::new(r.x + radius, r.y + radius), 180.0),
        (Vec2::new(r.x + r.w - radius, r.y + radius), 270.0),
        (Vec2::new(r.x + r.w - radius, r.y + r.h - radius), 0.0),
        (Vec2::new(r.x + radius, r.y + r.h - radius), 90.0),
    ]
}

pub fn rectangle_round(rect: Rect, radius: f32, thickness: f32) -> Vec<Vertex> {
    let r = rect.normalized();
    let radius = corner_radius(r, radius);
    if radius <= 0.0 {
        return rectangle(r, thickness);
    }

    let mut out = Vec::new();
    let (x0, y0, x1, y1) = (r.x, r.y, r.x + r.w, r.y + r.h);
    push_line(&mut out, Vec2::new(x0 + radius, y0), Vec2::new(x1 - radius, y0), thickness);
    push_line(&mut out, Vec2::new(x1, y0 + radius), Vec2::new(x1, y1 - radius), thickness);
    push_line(&mut out, Vec2::new(x1 - radius, y1), Vec2::new(x0 + radius, y1), thickness);
    push_line(&mut out, Vec2::new(x0, y1 - radius), Vec2::new(x0, y0 + radius), thickness);

    let half = thickness.max(0.0) / 2.0;
    for (center, start) in corners(r, radius) {
        push_ring(&mut out, center, (radius - half).max(0.0), radius + half, start, 90.0);
    }
    out
}

pub fn rectangle_round_filled(rect: Rect, radius: f32) -> Vec<Vertex> {
    let r = rect.normalized();
    let radius = corner_radius(r, radius);
    if radius <= 0.0 {
        return rectangle_filled(r);
    }

    let mut out = Vec::new();
    let (x0, y0, x1, y1) = (r.x, r.y, r.x + r.w, r.y + r.h);
    push_rect(&mut out, x0 + radius, y0, x1 - radius, y1);
    push_rect(&mut out, x0, y0 + radius, x0 + radius, y1 - radius);
    push_rect(&mut out, x1 - radius, y0 + radius, x1, y1 - radius);
    for (center, start) in corners(r, radius) {
        push_fan(&mut out, center, radius, start, 90.0);
    }
    out
}

/// Closed outline through `points`.
pub fn polygon(points: &[Vec2], thickness: f32) -> Vec<Vertex> {
    let mut out = Vec::new();
    if points.len() < 2 {
        return out;
    }
    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        push_line(&mut out, a, b, thickness);
    }
    out
}

/// Fan triangulation; exact for convex polygons.
pub fn polygon_filled(points: &[Vec2]) -> Vec<Vertex> {
    let mut out = Vec::new();
    if points.len() < 3 {
        return out;
    }
    for pair in points[1..].windows(2) {
        push_tri(&mut out, points[0], pair[0], pair[1]);
    }
    out
}
