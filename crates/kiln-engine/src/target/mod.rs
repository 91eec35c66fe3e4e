//! Render targets: the window surface and framebuffers wrapping images.

mod blend;
mod camera;
mod projection;
mod render_target;
mod store;

pub use blend::BlendMode;
pub use camera::Camera;
pub use projection::{pixel_position, projection, scissor_region, viewport};
pub use render_target::{Clip, RenderTarget, TargetKind};
pub use store::{Target, TargetStore};
