//! Coordinate and geometry types shared by the batcher, targets and backends.
//!
//! Logical space:
//! - origin top-left of the render target
//! - +X right, +Y down
//!
//! Backends receive vertices in logical space together with a projection
//! matrix; the matrix is what maps logical space onto framebuffer memory.

mod color;
mod mat4;
mod rect;
mod vec2;

pub use color::Color;
pub use mat4::Mat4;
pub use rect::Rect;
pub use vec2::Vec2;
