//! Primitive shapes drawn through the renderer.
//!
//! Shapes are triangulated on the CPU and submitted as one untextured draw
//! per call, after any pending blits.

pub mod geometry;

use crate::backend::{Backend, Vertex};
use crate::coords::{Color, Rect, Vec2};
use crate::error::{Error, Result};
use crate::renderer::Renderer;
use crate::target::Target;

impl<B: Backend> Renderer<B> {
    fn draw_shape(
        &mut self,
        function: &'static str,
        target: Target,
        color: Color,
        build: impl FnOnce(f32) -> Vec<Vertex>,
    ) -> Result<()> {
        self.report(function, |r| {
            let thickness = r.line_thickness(target)?;
            let vertices = build(thickness);
            r.draw_untextured(target, color, &vertices)
        })
    }

    pub fn pixel(&mut self, target: Target, x: f32, y: f32, color: Color) -> Result<()> {
        self.draw_shape("pixel", target, color, |_| geometry::pixel(x, y))
    }

    pub fn line(&mut self, target: Target, from: Vec2, to: Vec2, color: Color) -> Result<()> {
        self.draw_shape("line", target, color, |t| geometry::line(from, to, t))
    }

    /// Arc outline from `start` to `end` degrees.
    pub fn arc(&mut self, target: Target, center: Vec2, radius: f32, start: f32, end: f32, color: Color) -> Result<()> {
        self.draw_shape("arc", target, color, |t| geometry::arc(center, radius, start, end, t))
    }

    pub fn arc_filled(
        &mut self,
        target: Target,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        color: Color,
    ) -> Result<()> {
        self.draw_shape("arc_filled", target, color, |_| {
            geometry::arc_filled(center, radius, start, end)
        })
    }

    pub fn circle(&mut self, target: Target, center: Vec2, radius: f32, color: Color) -> Result<()> {
        self.draw_shape("circle", target, color, |t| geometry::circle(center, radius, t))
    }

    pub fn circle_filled(&mut self, target: Target, center: Vec2, radius: f32, color: Color) -> Result<()> {
        self.draw_shape("circle_filled", target, color, |_| geometry::circle_filled(center, radius))
    }

    pub fn tri(&mut self, target: Target, points: [Vec2; 3], color: Color) -> Result<()> {
        self.draw_shape("tri", target, color, |t| geometry::tri(points, t))
    }

    pub fn tri_filled(&mut self, target: Target, points: [Vec2; 3], color: Color) -> Result<()> {
        self.draw_shape("tri_filled", target, color, |_| geometry::tri_filled(points))
    }

    pub fn rectangle(&mut self, target: Target, rect: Rect, color: Color) -> Result<()> {
        self.draw_shape("rectangle", target, color, |t| geometry::rectangle(rect, t))
    }

    pub fn rectangle_filled(&mut self, target: Target, rect: Rect, color: Color) -> Result<()> {
        self.draw_shape("rectangle_filled", target, color, |_| geometry::rectangle_filled(rect))
    }

    pub fn rectangle_round(&mut self, target: Target, rect: Rect, radius: f32, color: Color) -> Result<()> {
        self.draw_shape("rectangle_round", target, color, |t| {
            geometry::rectangle_round(rect, radius, t)
        })
    }

    pub fn rectangle_round_filled(&mut self, target: Target, rect: Rect, radius: f32, color: Color) -> Result<()> {
        self.draw_shape("rectangle_round_filled", target, color, |_| {
            geometry::rectangle_round_filled(rect, radius)
        })
    }

    pub fn polygon(&mut self, target: Target, points: &[Vec2], color: Color) -> Result<()> {
        self.draw_shape("polygon", target, color, |t| geometry::polygon(points, t))
    }

    /// Fills a convex polygon.
    pub fn polygon_filled(&mut self, target: Target, points: &[Vec2], color: Color) -> Result<()> {
        self.draw_shape("polygon_filled", target, color, |_| geometry::polygon_filled(points))
    }

    /// Sets the stroke width of outlines drawn into `target`; returns the previous width.
    pub fn set_line_thickness(&mut self, target: Target, thickness: f32) -> Result<f32> {
        self.report("set_line_thickness", |r| {
            if !thickness.is_finite() || thickness < 0.0 {
                return Err(Error::invalid(format!("line thickness {thickness}")));
            }
            let rt = r.target_mut(target)?;
            Ok(std::mem::replace(&mut rt.line_thickness, thickness))
        })
    }

    pub fn line_thickness(&self, target: Target) -> Result<f32> {
        Ok(self.target_ref(target)?.line_thickness)
    }
}
