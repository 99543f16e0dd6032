//! Logging utilities.
//!
//! Everything in this crate reports through the `log` facade; this module only
//! decides where those records go. Binaries call [`init_logging`] once, tests
//! and library users may install any other logger instead.

mod init;

pub use init::{init_logging, LoggingConfig};
