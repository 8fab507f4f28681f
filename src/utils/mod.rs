//! Utility modules for common functionality.
//!
//! - logging: Logging utilities

pub mod logging;

pub use logging::*;
