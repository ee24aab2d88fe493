//! Utility modules for llamaup

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
