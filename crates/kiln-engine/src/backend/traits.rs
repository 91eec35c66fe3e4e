use crate::coords::Color;
use crate::error::Result;
use crate::format::GpuFormat;

use super::{
    DrawState, Features, FramebufferHandle, PixelRegion, ProgramHandle, SamplerState, ShaderHandle,
    ShaderStage, TexelData, TextureHandle, Tier, UniformValue, Vertex,
};

/// Driver-level operations the renderer is built on.
///
/// Memory convention: framebuffer and texture rows are addressed in memory
/// order. Uploads write the first source row to memory row `region.y`.
/// A draw maps clip-space y = -1 to viewport memory row `viewport.y`.
pub trait Backend {
    fn tier(&self) -> Tier;

    fn features(&self) -> Features;

    /// Physical size of the window surface.
    fn window_size(&self) -> (u32, u32);

    fn resize_window(&mut self, width: u32, height: u32) -> Result<()>;

    // ── textures ──────────────────────────────────────────────────────────

    /// Allocates a texture name without storage.
    fn create_texture(&mut self) -> Result<TextureHandle>;

    /// (Re)defines storage. `None` leaves the contents undefined.
    fn specify_texture(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        format: GpuFormat,
        pixels: Option<TexelData<'_>>,
    ) -> Result<()>;

    /// Replaces the texels inside `region`.
    fn upload_texture(&mut self, texture: TextureHandle, region: PixelRegion, data: TexelData<'_>) -> Result<()>;

    /// Reads `region` of the base level as tight RGBA8 rows in memory order.
    fn read_texture(&mut self, texture: TextureHandle, region: PixelRegion) -> Result<Vec<u8>>;

    fn set_sampler(&mut self, texture: TextureHandle, sampler: SamplerState);

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> Result<()>;

    fn delete_texture(&mut self, texture: TextureHandle);

    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    // ── framebuffers ──────────────────────────────────────────────────────

    /// Attaches `texture` as a color target. Fails when the attachment is incomplete.
    fn create_framebuffer(&mut self, texture: TextureHandle) -> Result<FramebufferHandle>;

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle);

    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Reads `region` of the bound framebuffer as tight RGBA8 rows in memory order.
    fn read_pixels(&mut self, region: PixelRegion) -> Result<Vec<u8>>;

    /// Fills the bound framebuffer (restricted to `scissor` when given).
    fn clear(&mut self, color: Color, scissor: Option<PixelRegion>) -> Result<()>;

    // ── drawing ───────────────────────────────────────────────────────────

    /// Draws a triangle list from client memory into the bound framebuffer.
    fn draw_arrays(&mut self, state: &DrawState, vertices: &[Vertex]) -> Result<()>;

    /// Replaces the contents of the streaming vertex buffer.
    fn stream_vertices(&mut self, vertices: &[Vertex]) -> Result<()>;

    /// Draws `count` streamed vertices as a triangle list.
    fn draw_streamed(&mut self, state: &DrawState, count: u32) -> Result<()>;

    // ── shaders ───────────────────────────────────────────────────────────

    /// Compiles one stage; on failure returns the compiler log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String>;

    /// Links compiled stages into a program; on failure returns the linker log.
    fn link_program(&mut self, shaders: &[ShaderHandle]) -> Result<ProgramHandle, String>;

    fn delete_shader(&mut self, shader: ShaderHandle);

    fn delete_program(&mut self, program: ProgramHandle);

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;

    fn set_uniform(&mut self, program: ProgramHandle, location: u32, value: UniformValue);

    fn uniform(&self, program: ProgramHandle, location: u32) -> Option<UniformValue>;

    // ── presentation ──────────────────────────────────────────────────────

    /// Shows the window framebuffer.
    fn present(&mut self) -> Result<()>;
}
