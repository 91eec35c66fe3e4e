//! Application contract driven by the windowed runtime.
//!
//! Applications implement [`App`]; the runtime hands them a [`FrameCtx`]
//! holding the window and its renderer once per redraw.

mod app;
mod ctx;
mod time;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
pub use time::{FrameClock, FrameTime};
