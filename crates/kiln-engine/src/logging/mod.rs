//! Logging utilities.
//!
//! Logger initialization for binaries embedding the engine. The library itself
//! only talks to the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
