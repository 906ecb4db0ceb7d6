//! # Vitrine Utilities
//!
//! Shared utilities for the Vitrine workspace: logging infrastructure
//! built on `tracing`, used by the introspection engine and the CLI alike.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogLevel};
pub use tracing::{debug, error, info, trace, warn};
