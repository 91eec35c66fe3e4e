//! GPU backend seam.
//!
//! The renderer drives a [`Backend`] the way a driver is driven: bind a
//! texture and a framebuffer, then draw triangles with a [`DrawState`].
//! Binding is stateful on purpose; [`crate::state::StateCache`] elides
//! redundant binds on the renderer side.
//!
//! Two implementations ship with the crate:
//! - [`SoftwareBackend`]: CPU rasterizer, any [`Tier`] and feature set
//! - [`WgpuBackend`]: wgpu device with a window surface or headless

mod draw;
mod features;
mod handles;
mod traits;

pub mod software;
pub mod gpu;

pub use draw::{
    BlendEquation, BlendFactor, BlendState, DrawState, FilterMode, PixelRegion, SamplerState,
    ShaderStage, TexelData, UniformValue, Vertex,
};
pub use features::{Features, Tier};
pub use handles::{FramebufferHandle, ProgramHandle, ShaderHandle, TextureHandle};
pub use software::{SoftwareBackend, SoftwareInit};
pub use traits::Backend;
pub use gpu::{GpuInit, WgpuBackend};
