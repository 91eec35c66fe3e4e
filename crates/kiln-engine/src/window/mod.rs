//! Window + runtime loop.
//!
//! Owns the `winit` event loop and the window, builds a wgpu-backed
//! [`crate::Renderer`] on it and drives an [`crate::core::App`].

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
