//! Error types and the per-renderer error queue.
//!
//! Every fallible renderer operation returns [`Result`]; the renderer also
//! records each failure in its [`ErrorQueue`] so callers that ignore return
//! values can still drain diagnostics later.

mod kind;
mod queue;

pub use kind::{Error, ErrorKind, Result};
pub use queue::{ErrorQueue, ErrorRecord, MAX_ERRORS};
