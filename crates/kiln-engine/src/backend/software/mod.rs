//! CPU reference backend.
//!
//! Emulates any [`Tier`] and feature set, which makes it the backend used by
//! the test-suite and by headless tools. Programs are validated and their
//! uniforms tracked, but fragments are shaded by the built-in pipeline.

mod raster;
mod surface;

use std::collections::HashMap;

use crate::backend::{
    Backend, DrawState, Features, FramebufferHandle, PixelRegion, ProgramHandle, SamplerState,
    ShaderHandle, ShaderStage, TexelData, TextureHandle, Tier, UniformValue, Vertex,
};
use crate::coords::Color;
use crate::error::{Error, Result};
use crate::format::{GpuFormat, PixelBuffer, PixelFormat};
use crate::shader::reflect::{self, Reflection, UniformSlot};

pub use surface::Surface;

/// Initialization parameters for the software backend.
#[derive(Debug, Clone)]
pub struct SoftwareInit {
    /// Emulated capability tier.
    pub tier: Tier,

    /// Exposed features. `None` uses the tier defaults.
    pub features: Option<Features>,

    /// Window surface size in physical pixels.
    pub window_width: u32,
    pub window_height: u32,

    /// Maximum number of live textures; `None` is unbounded.
    pub max_textures: Option<usize>,
}

impl Default for SoftwareInit {
    fn default() -> Self {
        Self {
            tier: Tier::VertexBuffers,
            features: None,
            window_width: 640,
            window_height: 480,
            max_textures: None,
        }
    }
}

/// Counters for driver-level work, reset with [`SoftwareBackend::reset_stats`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SoftwareStats {
    pub draw_calls: u64,
    pub vertices: u64,
    pub fragments: u64,
    pub texture_binds: u64,
    pub framebuffer_binds: u64,
    pub uploads: u64,
    pub clears: u64,
    pub presents: u64,
}

#[derive(Debug, Default)]
struct SoftTexture {
    surface: Surface,
    sampler: SamplerState,
}

#[derive(Debug)]
struct SoftShader {
    stage: ShaderStage,
    reflection: Reflection,
}

#[derive(Debug, Default)]
struct SoftProgram {
    uniforms: Vec<UniformSlot>,
    values: HashMap<u32, UniformValue>,
}

pub struct SoftwareBackend {
    tier: Tier,
    features: Features,
    max_textures: Option<usize>,

    window: Surface,
    textures: HashMap<TextureHandle, SoftTexture>,
    framebuffers: HashMap<FramebufferHandle, TextureHandle>,
    shaders: HashMap<ShaderHandle, SoftShader>,
    programs: HashMap<ProgramHandle, SoftProgram>,
    next_id: u32,

    bound_texture: Option<TextureHandle>,
    bound_framebuffer: FramebufferHandle,
    streamed: Vec<Vertex>,

    stats: SoftwareStats,
}

impl SoftwareBackend {
    pub fn new(init: SoftwareInit) -> Self {
        let features = init.features.unwrap_or_else(|| init.tier.default_features());
        log::debug!(
            "SoftwareBackend: {:?} {}x{} features={features:?}",
            init.tier,
            init.window_width,
            init.window_height
        );
        Self {
            tier: init.tier,
            features,
            max_textures: init.max_textures,
            window: Surface::new(init.window_width, init.window_height, false),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            next_id: 1,
            bound_texture: None,
            bound_framebuffer: FramebufferHandle::WINDOW,
            streamed: Vec::new(),
            stats: SoftwareStats::default(),
        }
    }

    pub fn stats(&self) -> SoftwareStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SoftwareStats::default();
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }

    /// Copy of the window surface, rows top to bottom.
    pub fn snapshot(&self) -> PixelBuffer {
        let (w, h) = (self.window.width(), self.window.height());
        let mut out = PixelBuffer::new(w, h, PixelFormat::rgba32());
        for y in 0..h {
            for x in 0..w {
                out.set_pixel(x, h - 1 - y, Color::from(self.window.get(x, y)));
            }
        }
        out
    }

    fn next_handle(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn texture_mut(&mut self, texture: TextureHandle) -> Result<&mut SoftTexture> {
        self.textures
            .get_mut(&texture)
            .ok_or_else(|| Error::backend(format!("unknown texture {}", texture.0)))
    }

    fn bound_surface(&self) -> Result<&Surface> {
        if self.bound_framebuffer.is_window() {
            return Ok(&self.window);
        }
        let tex = self
            .framebuffers
            .get(&self.bound_framebuffer)
            .and_then(|t| self.textures.get(t))
            .ok_or_else(|| Error::backend("bound framebuffer has no attachment"))?;
        Ok(&tex.surface)
    }

    /// Runs `f` on the bound framebuffer surface with the bound texture available for sampling.
    fn with_target<R>(
        &mut self,
        f: impl FnOnce(&mut Surface, Option<(&Surface, SamplerState)>) -> R,
    ) -> Result<R> {
        if self.bound_framebuffer.is_window() {
            let sampled = self.bound_texture.and_then(|t| self.textures.get(&t));
            return Ok(f(&mut self.window, sampled.map(|t| (&t.surface, t.sampler))));
        }

        let attached = *self
            .framebuffers
            .get(&self.bound_framebuffer)
            .ok_or_else(|| Error::backend("bound framebuffer was deleted"))?;
        let mut target = self
            .textures
            .remove(&attached)
            .ok_or_else(|| Error::backend("framebuffer attachment was deleted"))?;

        // Sampling the attachment itself reads a snapshot of it.
        let feedback = (self.bound_texture == Some(attached)).then(|| target.surface.clone());
        let sampled = match &feedback {
            Some(copy) => Some((copy, target.sampler)),
            None => self
                .bound_texture
                .and_then(|t| self.textures.get(&t))
                .map(|t| (&t.surface, t.sampler)),
        };
        let out = f(&mut target.surface, sampled);
        self.textures.insert(attached, target);
        Ok(out)
    }
}

impl Backend for SoftwareBackend {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn features(&self) -> Features {
        self.features
    }

    fn window_size(&self) -> (u32, u32) {
        (self.window.width(), self.window.height())
    }

    fn resize_window(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::invalid(format!("window size {width}x{height}")));
        }
        self.window = Surface::new(width, height, false);
        Ok(())
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&mut self) -> Result<TextureHandle> {
        if self.max_textures.is_some_and(|max| self.textures.len() >= max) {
            return Err(Error::backend("out of texture handles"));
        }
        let handle = TextureHandle(self.next_handle());
        self.textures.insert(handle, SoftTexture::default());
        Ok(handle)
    }

    fn specify_texture(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        format: GpuFormat,
        pixels: Option<TexelData<'_>>,
    ) -> Result<()> {
        if !format.is_storage_format() {
            return Err(Error::UnsupportedFormat(format!("{format:?} storage")));
        }
        let tex = self.texture_mut(texture)?;
        tex.surface = Surface::for_format(width, height, format);
        if let Some(data) = pixels {
            tex.surface.write(PixelRegion::from_size(width, height), data)?;
            self.stats.uploads += 1;
        }
        Ok(())
    }

    fn upload_texture(&mut self, texture: TextureHandle, region: PixelRegion, data: TexelData<'_>) -> Result<()> {
        let features = self.features;
        if !features.contains(data.format.required_feature()) {
            return Err(Error::UnsupportedFormat(format!("{:?} uploads", data.format)));
        }
        self.texture_mut(texture)?.surface.write(region, data)?;
        self.stats.uploads += 1;
        Ok(())
    }

    fn read_texture(&mut self, texture: TextureHandle, region: PixelRegion) -> Result<Vec<u8>> {
        if !self.features.contains(Features::TEXTURE_READBACK) {
            return Err(Error::unsupported("texture readback"));
        }
        self.texture_mut(texture)?.surface.read(region)
    }

    fn set_sampler(&mut self, texture: TextureHandle, sampler: SamplerState) {
        if let Some(tex) = self.textures.get_mut(&texture) {
            tex.sampler = sampler;
        }
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> Result<()> {
        // Sampling always reads the base level.
        self.texture_mut(texture).map(|_| ())
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.bound_texture = texture;
        self.stats.texture_binds += 1;
    }

    // ── framebuffers ──────────────────────────────────────────────────────

    fn create_framebuffer(&mut self, texture: TextureHandle) -> Result<FramebufferHandle> {
        if !self.features.contains(Features::RENDER_TARGETS) {
            return Err(Error::unsupported("render targets"));
        }
        let complete = self.textures.get(&texture).is_some_and(|t| t.surface.is_allocated());
        if !complete {
            return Err(Error::backend("incomplete framebuffer attachment"));
        }
        let handle = FramebufferHandle(self.next_handle());
        self.framebuffers.insert(handle, texture);
        Ok(handle)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if framebuffer.is_window() {
            return;
        }
        self.framebuffers.remove(&framebuffer);
        if self.bound_framebuffer == framebuffer {
            self.bound_framebuffer = FramebufferHandle::WINDOW;
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.bound_framebuffer = framebuffer;
        self.stats.framebuffer_binds += 1;
    }

    fn read_pixels(&mut self, region: PixelRegion) -> Result<Vec<u8>> {
        self.bound_surface()?.read(region)
    }

    fn clear(&mut self, color: Color, scissor: Option<PixelRegion>) -> Result<()> {
        self.stats.clears += 1;
        self.with_target(|dst, _| {
            let region = scissor.unwrap_or(PixelRegion::from_size(dst.width(), dst.height()));
            dst.fill(region, color.to_array());
        })
    }

    // ── drawing ───────────────────────────────────────────────────────────

    fn draw_arrays(&mut self, state: &DrawState, vertices: &[Vertex]) -> Result<()> {
        let fragments = self.with_target(|dst, tex| raster::draw_triangles(dst, tex, state, vertices))?;
        self.stats.draw_calls += 1;
        self.stats.vertices += vertices.len() as u64;
        self.stats.fragments += fragments;
        Ok(())
    }

    fn stream_vertices(&mut self, vertices: &[Vertex]) -> Result<()> {
        self.streamed.clear();
        self.streamed.extend_from_slice(vertices);
        Ok(())
    }

    fn draw_streamed(&mut self, state: &DrawState, count: u32) -> Result<()> {
        let streamed = std::mem::take(&mut self.streamed);
        let count = (count as usize).min(streamed.len());
        let result = self.draw_arrays(state, &streamed[..count]);
        self.streamed = streamed;
        result
    }

    // ── shaders ───────────────────────────────────────────────────────────

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String> {
        let (_, reflection) = reflect::validate(stage, source)?;
        let handle = ShaderHandle(self.next_handle());
        self.shaders.insert(handle, SoftShader { stage, reflection });
        Ok(handle)
    }

    fn link_program(&mut self, shaders: &[ShaderHandle]) -> Result<ProgramHandle, String> {
        if shaders.is_empty() {
            return Err("no shaders attached".to_string());
        }
        let mut stages = Vec::with_capacity(shaders.len());
        for handle in shaders {
            let shader = self
                .shaders
                .get(handle)
                .ok_or_else(|| format!("shader {} is not a compiled shader", handle.0))?;
            if stages.iter().any(|s: &&SoftShader| s.stage == shader.stage) {
                return Err(format!("more than one {:?} shader attached", shader.stage));
            }
            stages.push(shader);
        }
        let uniforms = reflect::merge_uniforms(stages.iter().map(|s| &s.reflection));
        let handle = ProgramHandle(self.next_handle());
        self.programs.insert(
            handle,
            SoftProgram {
                uniforms,
                values: HashMap::new(),
            },
        );
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.programs
            .get(&program)?
            .uniforms
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.slot)
    }

    fn set_uniform(&mut self, program: ProgramHandle, location: u32, value: UniformValue) {
        if let Some(p) = self.programs.get_mut(&program) {
            p.values.insert(location, value);
        }
    }

    fn uniform(&self, program: ProgramHandle, location: u32) -> Option<UniformValue> {
        self.programs.get(&program)?.values.get(&location).cloned()
    }

    // ── presentation ──────────────────────────────────────────────────────

    fn present(&mut self) -> Result<()> {
        self.stats.presents += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> SoftwareBackend {
        SoftwareBackend::new(SoftwareInit {
            window_width: 8,
            window_height: 4,
            ..Default::default()
        })
    }

    #[test]
    fn texture_limit_reports_exhaustion() {
        let mut b = SoftwareBackend::new(SoftwareInit {
            max_textures: Some(1),
            ..Default::default()
        });
        b.create_texture().unwrap();
        assert!(b.create_texture().is_err());
    }

    #[test]
    fn framebuffer_needs_storage() {
        let mut b = backend();
        let t = b.create_texture().unwrap();
        assert!(b.create_framebuffer(t).is_err());
        b.specify_texture(t, 4, 4, GpuFormat::Rgba, None).unwrap();
        assert!(b.create_framebuffer(t).is_ok());
    }

    #[test]
    fn clear_respects_scissor() {
        let mut b = backend();
        b.clear(Color::rgba(1, 2, 3, 4), Some(PixelRegion::new(0, 0, 2, 1))).unwrap();
        let px = b.read_pixels(PixelRegion::new(0, 0, 3, 1)).unwrap();
        assert_eq!(px, vec![1, 2, 3, 4, 1, 2, 3, 4, 0, 0, 0, 0]);
    }

    #[test]
    fn swizzled_upload_requires_feature() {
        let mut b = SoftwareBackend::new(SoftwareInit {
            features: Some(Features::empty()),
            ..Default::default()
        });
        let t = b.create_texture().unwrap();
        b.specify_texture(t, 1, 1, GpuFormat::Rgba, None).unwrap();
        let data = TexelData { format: GpuFormat::Bgra, pitch: 4, bytes: &[0; 4] };
        assert!(b.upload_texture(t, PixelRegion::from_size(1, 1), data).is_err());
    }

    #[test]
    fn readback_disabled_on_embedded() {
        let mut b = SoftwareBackend::new(SoftwareInit {
            tier: Tier::Embedded,
            ..Default::default()
        });
        let t = b.create_texture().unwrap();
        b.specify_texture(t, 1, 1, GpuFormat::Rgb, None).unwrap();
        assert!(b.read_texture(t, PixelRegion::from_size(1, 1)).is_err());
    }

    #[test]
    fn link_rejects_unknown_shader() {
        let mut b = backend();
        assert!(b.link_program(&[ShaderHandle(42)]).is_err());
        assert!(b.link_program(&[]).is_err());
    }
}
