//! The renderer context.
//!
//! A [`Renderer`] owns one backend together with everything that used to be
//! process-wide state in immediate-mode 2D libraries: the bind cache, the
//! blit batch, the image and target registries, shader programs and the
//! error queue. Operations are grouped by concern:
//!
//! - `images`: create, upload, read back and free images
//! - `targets`: window and texture render targets, clip, camera, blending
//! - `blit`: textured quads through the batch
//! - `shaders`: compile, link, activate and uniforms
//!
//! Primitive shapes live in [`crate::shapes`].

mod bind;
mod blit;
mod config;
mod images;
mod shaders;
mod targets;

#[cfg(test)]
mod tests;

use std::sync::atomic::{AtomicU32, Ordering};

use crate::backend::{Backend, Features, FramebufferHandle, Tier};
use crate::batch::BatchBuffer;
use crate::error::{Error, ErrorKind, ErrorQueue, ErrorRecord, Result};
use crate::shader::ShaderPipeline;
use crate::state::StateCache;
use crate::target::{RenderTarget, Target, TargetKind, TargetStore};
use crate::texture::{Image, TextureStore};

pub use config::RendererInit;

static NEXT_RENDERER_ID: AtomicU32 = AtomicU32::new(1);

/// Counters for renderer-level work.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Batches submitted to the backend.
    pub flushes: u64,
    /// Quads appended to the batch.
    pub blits: u64,
    /// Shape draws, one per shape call.
    pub shape_draws: u64,
}

pub struct Renderer<B: Backend> {
    id: u32,
    backend: B,
    init: RendererInit,
    tier: Tier,
    features: Features,

    cache: StateCache,
    batch: BatchBuffer,
    /// Target the pending batch draws into.
    batch_target: Option<Target>,

    textures: TextureStore,
    targets: TargetStore,
    window: Option<Target>,

    shaders: ShaderPipeline,
    errors: ErrorQueue,
    stats: RendererStats,
}

impl<B: Backend> Renderer<B> {
    /// Wraps `backend` and creates the window target.
    pub fn new(mut backend: B, init: RendererInit) -> Result<Self> {
        let id = NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed);
        let tier = backend.tier();
        let features = backend.features();
        let (window_w, window_h) = backend.window_size();
        if window_w == 0 || window_h == 0 {
            return Err(Error::backend("window surface has no size"));
        }

        let shaders = ShaderPipeline::new(&mut backend);
        let mut targets = TargetStore::new(id);
        let window = targets.insert(RenderTarget::new(
            FramebufferHandle::WINDOW,
            TargetKind::Window,
            window_w,
            window_h,
            init.enable_blending,
        ));
        if let Some(rt) = targets.get_mut(window) {
            rt.line_thickness = init.line_thickness;
        }

        log::debug!(
            "Renderer: #{id} {tier:?} window={window_w}x{window_h} shaders={} features={features:?}",
            shaders.is_enabled()
        );

        Ok(Self {
            id,
            backend,
            tier,
            features,
            cache: StateCache::new(),
            batch: BatchBuffer::new(init.blit_buffer_capacity),
            batch_target: None,
            textures: TextureStore::new(),
            targets,
            window: Some(window),
            shaders,
            errors: ErrorQueue::new(),
            stats: RendererStats::default(),
            init,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct backend access; pending blits are not flushed.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn features(&self) -> Features {
        self.features
    }

    /// Whether every feature in `features` is available.
    pub fn is_feature_enabled(&self, features: Features) -> bool {
        self.features.contains(features)
    }

    pub fn init(&self) -> &RendererInit {
        &self.init
    }

    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Vertices waiting in the blit batch.
    pub fn pending_vertices(&self) -> usize {
        self.batch.len()
    }

    pub fn live_images(&self) -> usize {
        self.textures.len()
    }

    pub fn live_targets(&self) -> usize {
        self.targets.len()
    }

    // ── errors ────────────────────────────────────────────────────────────

    /// Records a failure of `function`. Dropped silently once the queue is full.
    pub fn push_error(&mut self, function: &'static str, kind: ErrorKind, details: impl Into<String>) {
        let details = details.into();
        if self.init.log_errors {
            log::warn!("Renderer: {function}: {kind}: {details}");
        }
        self.errors.push(function, kind, details);
    }

    /// Most recent recorded failure.
    pub fn pop_error(&mut self) -> Option<ErrorRecord> {
        self.errors.pop()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Runs `f`, recording its error under `function`.
    pub(crate) fn report<T>(&mut self, function: &'static str, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = f(self);
        if let Err(err) = &result {
            self.push_error(function, err.kind(), err.to_string());
        }
        result
    }

    // ── validation ────────────────────────────────────────────────────────

    fn check_image(&self, image: &Image) -> Result<()> {
        if image.renderer != self.id {
            return Err(Error::invalid("image belongs to another renderer"));
        }
        if !self.textures.contains(image.handle) {
            return Err(Error::invalid("image texture was destroyed"));
        }
        Ok(())
    }

    pub(crate) fn target_ref(&self, target: Target) -> Result<&RenderTarget> {
        self.targets.get(target).ok_or(Error::NullArgument("target"))
    }

    pub(crate) fn target_mut(&mut self, target: Target) -> Result<&mut RenderTarget> {
        self.targets.get_mut(target).ok_or(Error::NullArgument("target"))
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Flushes pending blits and presents the window.
    pub fn flip(&mut self) -> Result<()> {
        self.report("flip", |r| {
            if r.window.is_none() {
                return Err(Error::User("no window target".into()));
            }
            r.flush_batch()?;
            r.backend.present()
        })
    }

    /// Tears down every object the renderer still owns.
    fn shutdown(&mut self) {
        if let Err(err) = self.flush_batch() {
            log::warn!("Renderer: final flush failed: {err}");
        }
        for target in self.targets.handles() {
            self.destroy_target(target);
        }
        let leftovers = self.textures.drain();
        if !leftovers.is_empty() {
            log::debug!("Renderer: releasing {} unfreed images", leftovers.len());
        }
        for handle in leftovers {
            self.backend.delete_texture(handle);
        }
        self.cache.clear();
        self.shaders.release(&mut self.backend);
        log::debug!("Renderer: #{} shut down", self.id);
    }
}

impl<B: Backend> Drop for Renderer<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
