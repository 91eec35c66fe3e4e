//! Pixel format negotiation between CPU pixel buffers and GPU textures.
//!
//! CPU buffers describe their layout with channel bit masks over a little-endian
//! pixel word. GPU textures are RGB or RGBA; some backends also accept BGR, BGRA
//! and ABGR uploads directly. [`resolve`] decides whether a buffer can be
//! uploaded as-is or needs a conversion copy first.

mod buffer;
mod gpu;
mod masks;
mod resolve;

pub use buffer::PixelBuffer;
pub use gpu::GpuFormat;
pub use masks::{ChannelMasks, ChannelShift, PixelFormat};
pub use resolve::{resolve, Resolution};
