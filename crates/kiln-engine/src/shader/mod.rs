//! Shader programs: compile, link and the built-in default programs.

mod pipeline;
pub(crate) mod reflect;

pub use pipeline::{ShaderPipeline, MAX_MESSAGE_LEN};
pub use reflect::{USER_UNIFORM_BINDING, USER_UNIFORM_GROUP, USER_UNIFORM_SLOTS};

/// Vertex stage shared by both default programs.
pub const DEFAULT_VERTEX_SOURCE: &str = include_str!("shaders/default_vertex.wgsl");

/// Fragment stage sampling the bound image, modulated by the image color.
pub const DEFAULT_TEXTURED_SOURCE: &str = include_str!("shaders/default_textured.wgsl");

/// Fragment stage emitting the draw color.
pub const DEFAULT_UNTEXTURED_SOURCE: &str = include_str!("shaders/default_untextured.wgsl");
