//! Kiln engine crate.
//!
//! Batched 2D rendering over interchangeable GPU backends: images and render
//! targets, transformed sprite blits, shader programs and primitive shapes.

pub mod backend;
pub mod batch;
pub mod codec;
pub mod coords;
pub mod core;
pub mod error;
pub mod format;
pub mod logging;
pub mod renderer;
pub mod shader;
pub mod shapes;
pub mod state;
pub mod target;
pub mod texture;
pub mod window;

pub use error::{Error, ErrorKind, Result};
pub use renderer::{Renderer, RendererInit};
