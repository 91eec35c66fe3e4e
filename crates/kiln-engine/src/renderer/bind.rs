use crate::backend::{Backend, DrawState, Features, Vertex};
use crate::coords::Color;
use crate::error::{Error, Result};
use crate::target::{self, Target};
use crate::texture::Image;

use super::Renderer;

impl<B: Backend> Renderer<B> {
    /// Makes `target` the destination of subsequent draws.
    ///
    /// Pending blits aimed elsewhere are flushed first.
    pub(super) fn bind_target(&mut self, target: Target) -> Result<()> {
        let handle = self.target_ref(target)?.handle;
        let render_targets = self.features.contains(Features::RENDER_TARGETS);
        if !render_targets && !handle.is_window() {
            return Err(Error::unsupported("render targets are not supported"));
        }

        if self.batch_target != Some(target) {
            self.flush_batch()?;
        }
        if !self.cache.is_framebuffer_bound(handle, render_targets) {
            self.flush_batch()?;
            self.backend.bind_framebuffer(handle);
            self.cache.set_framebuffer(handle);
        }
        self.batch_target = Some(target);
        Ok(())
    }

    /// Makes `image` the sampled texture, flushing blits of the previous one.
    pub(super) fn bind_image(&mut self, image: &Image) -> Result<()> {
        if self.cache.is_texture_bound(image.handle) {
            return Ok(());
        }
        self.flush_batch()?;
        self.backend.bind_texture(Some(image.handle));
        self.cache.set_texture(image.handle, image.color().to_f32());
        Ok(())
    }

    /// Flushes if `target` has blits waiting.
    pub(super) fn flush_target(&mut self, target: Target) -> Result<()> {
        if self.batch_target == Some(target) {
            self.flush_batch()?;
        }
        Ok(())
    }

    /// Draw state for `target`; `None` when its clip leaves nothing visible.
    pub(super) fn draw_state(&self, target: Target, textured: bool, color: [f32; 4]) -> Result<Option<DrawState>> {
        let rt = self.target_ref(target)?;
        let scissor = target::scissor_region(rt);
        if scissor.is_empty() {
            return Ok(None);
        }
        let program = self.shaders.program_for(rt.program, textured);
        Ok(Some(DrawState {
            viewport: target::viewport(rt),
            projection: target::projection(rt),
            scissor,
            blend: rt.blending.then(|| rt.blend_mode.state()),
            textured,
            color,
            program,
        }))
    }

    /// Submits the pending blits as one draw.
    ///
    /// Without vertices, a destination or a bound texture this only resets
    /// the batch.
    pub(super) fn flush_batch(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let (Some(target), Some(_)) = (self.batch_target, self.cache.texture()) else {
            self.batch.clear();
            return Ok(());
        };
        if !self.targets.contains(target) {
            self.batch.clear();
            return Ok(());
        }

        let state = self.draw_state(target, true, self.cache.texture_color());
        let result = match state {
            Ok(Some(state)) => {
                self.stats.flushes += 1;
                self.tier
                    .submit_path()
                    .submit(&mut self.backend, &state, self.batch.vertices())
            }
            Ok(None) => Ok(()),
            Err(err) => Err(err),
        };
        self.batch.clear();
        result
    }

    /// Draws `vertices` in a flat color after any pending blits.
    pub(crate) fn draw_untextured(&mut self, target: Target, color: Color, vertices: &[Vertex]) -> Result<()> {
        self.bind_target(target)?;
        self.flush_batch()?;
        if vertices.is_empty() {
            return Ok(());
        }
        let Some(state) = self.draw_state(target, false, color.to_f32())? else {
            return Ok(());
        };
        self.tier.submit_path().submit(&mut self.backend, &state, vertices)?;
        self.stats.shape_draws += 1;
        Ok(())
    }

    /// Submits pending blits now.
    pub fn flush(&mut self) -> Result<()> {
        self.report("flush", |r| r.flush_batch())
    }
}
