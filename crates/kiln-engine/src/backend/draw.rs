use bytemuck::{Pod, Zeroable};

use crate::coords::Mat4;
use crate::format::GpuFormat;

use super::{Features, ProgramHandle};

/// One batched vertex: logical position plus texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub tex: [f32; 2],
}

impl Vertex {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, s: f32, t: f32) -> Self {
        Self {
            pos: [x, y, z],
            tex: [s, t],
        }
    }
}

/// Integer rectangle in framebuffer memory (row 0 first in memory).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl PixelRegion {
    #[inline]
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub const fn from_size(w: u32, h: u32) -> Self {
        Self::new(0, 0, w, h)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }
}

/// Texel bytes handed to an upload.
#[derive(Debug, Copy, Clone)]
pub struct TexelData<'a> {
    pub format: GpuFormat,
    /// Byte stride between rows.
    pub pitch: usize,
    pub bytes: &'a [u8],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Sampling state of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SamplerState {
    pub min: FilterMode,
    pub mag: FilterMode,
    /// Filter between mip levels; `None` samples the base level only.
    pub mipmap: Option<FilterMode>,
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            min: FilterMode::Linear,
            mag: FilterMode::Linear,
            mipmap: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    /// `src * sf + dst * df`
    Add,
    /// `src * sf - dst * df`
    Subtract,
    /// `dst * df - src * sf`
    ReverseSubtract,
}

/// Blend function applied when writing fragments.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub equation: BlendEquation,
}

impl BlendState {
    pub const fn new(src: BlendFactor, dst: BlendFactor, equation: BlendEquation) -> Self {
        Self::separate(src, dst, src, dst, equation)
    }

    pub const fn separate(
        src_color: BlendFactor,
        dst_color: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
        equation: BlendEquation,
    ) -> Self {
        Self {
            src_color,
            dst_color,
            src_alpha,
            dst_alpha,
            equation,
        }
    }

    /// Standard straight-alpha compositing.
    pub const NORMAL: BlendState = BlendState::new(
        BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha,
        BlendEquation::Add,
    );
}

/// Everything a backend needs to execute one batched draw.
///
/// The texture and framebuffer come from the backend's current bindings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawState {
    /// Viewport in framebuffer memory coordinates.
    pub viewport: PixelRegion,
    /// Logical space to clip space. Clip-space y = -1 is framebuffer memory row 0.
    pub projection: Mat4,
    /// Fragments outside this region are discarded.
    pub scissor: PixelRegion,
    /// `None` writes fragments unblended.
    pub blend: Option<BlendState>,
    /// Sample the bound texture; otherwise fragments take `color` alone.
    pub textured: bool,
    /// Modulation color, normalized RGBA.
    pub color: [f32; 4],
    pub program: ProgramHandle,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
}

impl ShaderStage {
    pub fn required_feature(self) -> Features {
        match self {
            ShaderStage::Vertex => Features::VERTEX_SHADER,
            ShaderStage::Fragment => Features::FRAGMENT_SHADER,
            ShaderStage::Geometry => Features::GEOMETRY_SHADER,
        }
    }

    /// Matching naga entry-point stage; WGSL has no geometry stage.
    pub fn as_naga(self) -> Option<naga::ShaderStage> {
        match self {
            ShaderStage::Vertex => Some(naga::ShaderStage::Vertex),
            ShaderStage::Fragment => Some(naga::ShaderStage::Fragment),
            ShaderStage::Geometry => None,
        }
    }
}

/// Value written to a program uniform.
///
/// Each uniform location is one 16-byte slot; matrices take one slot per column.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Float(Vec<f32>),
    /// Column-major matrix of `cols` columns with `rows` components each.
    Matrix { cols: u8, rows: u8, values: Vec<f32> },
}

impl UniformValue {
    pub fn int(v: i32) -> Self {
        UniformValue::Int(vec![v])
    }

    pub fn uint(v: u32) -> Self {
        UniformValue::UInt(vec![v])
    }

    pub fn float(v: f32) -> Self {
        UniformValue::Float(vec![v])
    }

    /// Number of 16-byte slots the value spans.
    pub fn slot_count(&self) -> usize {
        match self {
            UniformValue::Int(v) => v.len().div_ceil(4).max(1),
            UniformValue::UInt(v) => v.len().div_ceil(4).max(1),
            UniformValue::Float(v) => v.len().div_ceil(4).max(1),
            UniformValue::Matrix { cols, .. } => *cols as usize,
        }
    }

    /// Raw 32-bit words laid out slot by slot.
    pub fn to_slots(&self) -> Vec<[u32; 4]> {
        fn pack(words: impl Iterator<Item = u32>, slots: usize) -> Vec<[u32; 4]> {
            let mut out = vec![[0u32; 4]; slots];
            for (i, w) in words.enumerate().take(slots * 4) {
                out[i / 4][i % 4] = w;
            }
            out
        }

        let slots = self.slot_count();
        match self {
            UniformValue::Int(v) => pack(v.iter().map(|x| *x as u32), slots),
            UniformValue::UInt(v) => pack(v.iter().copied(), slots),
            UniformValue::Float(v) => pack(v.iter().map(|x| x.to_bits()), slots),
            UniformValue::Matrix { cols, rows, values } => {
                let rows = *rows as usize;
                let mut out = vec![[0u32; 4]; *cols as usize];
                for (c, slot) in out.iter_mut().enumerate() {
                    for r in 0..rows.min(4) {
                        if let Some(v) = values.get(c * rows + r) {
                            slot[r] = v.to_bits();
                        }
                    }
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_five_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }

    #[test]
    fn vector_uniform_spans_one_slot() {
        let v = UniformValue::Float(vec![1.0, 2.0, 3.0]);
        assert_eq!(v.slot_count(), 1);
        assert_eq!(v.to_slots()[0][2], 3.0f32.to_bits());
    }

    #[test]
    fn matrix_uniform_pads_columns() {
        let v = UniformValue::Matrix {
            cols: 2,
            rows: 3,
            values: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        };
        let slots = v.to_slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1], [4.0f32.to_bits(), 5.0f32.to_bits(), 6.0f32.to_bits(), 0]);
    }
}
