//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the crate goes
//! through the standard `log` facade, so embedders that already have a
//! logger can skip this module entirely.

mod init;

pub use init::{LoggingConfig, init_logging};
