//! Blit batching: quad geometry, the fixed-capacity vertex buffer and the
//! per-tier submission strategy.
//!
//! Every blit becomes six vertices (triangles TL, TR, BR and TL, BR, BL).
//! Vertices accumulate until a state change or overflow forces a flush, which
//! issues a single draw for the whole run.

mod buffer;
mod quad;
mod submit;

pub use buffer::{BatchBuffer, DEFAULT_CAPACITY, VERTICES_PER_QUAD};
pub use quad::{matrix_corners, quad_vertices, tex_coords, transformed_corners, BlitTransform, Sprite, TexCoords};
pub use submit::SubmitPath;
