use crate::backend::Backend;
use crate::batch::{matrix_corners, quad_vertices, tex_coords, transformed_corners, BlitTransform, Sprite};
use crate::coords::{Rect, Vec2};
use crate::error::{Error, Result};
use crate::target::Target;
use crate::texture::Image;

use super::Renderer;

impl<B: Backend> Renderer<B> {
    /// Draws `src` of `image` (the whole image when `None`) centred at `(x, y)`.
    pub fn blit(&mut self, image: &Image, src: Option<Rect>, target: Target, x: f32, y: f32) -> Result<()> {
        self.report("blit", |r| {
            r.blit_with(image, src, target, |src| {
                transformed_corners(src, &BlitTransform::centered(src, x, y))
            })
        })
    }

    /// Like [`Renderer::blit`], rotated by `degrees` around the centre.
    pub fn blit_rotate(
        &mut self,
        image: &Image,
        src: Option<Rect>,
        target: Target,
        x: f32,
        y: f32,
        degrees: f32,
    ) -> Result<()> {
        self.report("blit_rotate", |r| {
            r.blit_with(image, src, target, |src| {
                let t = BlitTransform {
                    angle: degrees,
                    ..BlitTransform::centered(src, x, y)
                };
                transformed_corners(src, &t)
            })
        })
    }

    /// Like [`Renderer::blit`], scaled around the centre.
    #[allow(clippy::too_many_arguments)]
    pub fn blit_scale(
        &mut self,
        image: &Image,
        src: Option<Rect>,
        target: Target,
        x: f32,
        y: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> Result<()> {
        self.report("blit_scale", |r| {
            r.blit_with(image, src, target, |src| {
                let t = BlitTransform {
                    scale_x,
                    scale_y,
                    ..BlitTransform::centered(src, x, y)
                };
                transformed_corners(src, &t)
            })
        })
    }

    /// Rotation and scale around the centre.
    #[allow(clippy::too_many_arguments)]
    pub fn blit_transform(
        &mut self,
        image: &Image,
        src: Option<Rect>,
        target: Target,
        x: f32,
        y: f32,
        degrees: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> Result<()> {
        self.report("blit_transform", |r| {
            r.blit_with(image, src, target, |src| {
                let t = BlitTransform {
                    angle: degrees,
                    scale_x,
                    scale_y,
                    ..BlitTransform::centered(src, x, y)
                };
                transformed_corners(src, &t)
            })
        })
    }

    /// Rotation and scale around an arbitrary pivot; the pivot lands on `(transform.x, transform.y)`.
    pub fn blit_transform_x(
        &mut self,
        image: &Image,
        src: Option<Rect>,
        target: Target,
        transform: BlitTransform,
    ) -> Result<()> {
        self.report("blit_transform_x", |r| {
            r.blit_with(image, src, target, |src| transformed_corners(src, &transform))
        })
    }

    /// Applies a 3x3 column-major matrix to the centred quad, then moves it to `(x, y)`.
    pub fn blit_transform_matrix(
        &mut self,
        image: &Image,
        src: Option<Rect>,
        target: Target,
        x: f32,
        y: f32,
        matrix: &[f32; 9],
    ) -> Result<()> {
        self.report("blit_transform_matrix", |r| {
            r.blit_with(image, src, target, |src| matrix_corners(src, x, y, matrix))
        })
    }

    /// Stretches `src` over `dest`.
    pub fn blit_rect(&mut self, image: &Image, src: Option<Rect>, target: Target, dest: Rect) -> Result<()> {
        self.report("blit_rect", |r| {
            r.blit_with(image, src, target, |_| {
                let min = dest.min();
                let max = dest.max();
                [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]
            })
        })
    }

    /// Draws many sprites of one image; they share a single texture bind.
    pub fn blit_batch(&mut self, image: &Image, target: Target, sprites: &[Sprite]) -> Result<()> {
        self.report("blit_batch", |r| {
            r.prepare_blit(image, target)?;
            for sprite in sprites {
                let src = sprite.src.unwrap_or_else(|| full_rect(image));
                r.push_quad(image, src, |src| {
                    transformed_corners(src, &BlitTransform::centered(src, sprite.x, sprite.y))
                })?;
            }
            Ok(())
        })
    }

    fn blit_with(
        &mut self,
        image: &Image,
        src: Option<Rect>,
        target: Target,
        corners: impl FnOnce(Rect) -> [Vec2; 4],
    ) -> Result<()> {
        self.prepare_blit(image, target)?;
        let src = src.unwrap_or_else(|| full_rect(image));
        self.push_quad(image, src, corners)
    }

    /// Validates the pair and binds both; the batch then belongs to them.
    fn prepare_blit(&mut self, image: &Image, target: Target) -> Result<()> {
        self.check_image(image)?;
        self.target_ref(target)?;
        self.bind_target(target)?;
        self.bind_image(image)
    }

    fn push_quad(&mut self, image: &Image, src: Rect, corners: impl FnOnce(Rect) -> [Vec2; 4]) -> Result<()> {
        if src.has_negative_size() || !src.is_finite() {
            return Err(Error::invalid(format!("source rect {src:?}")));
        }
        let tc = tex_coords(src, image.texture_width, image.texture_height);
        let vertices = quad_vertices(corners(src), tc, 0.0);

        if !self.batch.has_room() {
            self.flush_batch()?;
        }
        self.batch.push_quad(vertices);
        self.stats.blits += 1;
        Ok(())
    }
}

fn full_rect(image: &Image) -> Rect {
    Rect::from_size(image.width as f32, image.height as f32)
}
