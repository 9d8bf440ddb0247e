//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

use crate::core::config::LoggingConfig;

/// Initialize the logging system from a [`LoggingConfig`]
///
/// `RUST_LOG` takes precedence over the configured level when it is set.
/// Safe to call more than once; later calls leave the installed logger alone.
pub fn init_with_config(config: &LoggingConfig) {
    let mut builder = env_logger::Builder::new();

    match std::env::var("RUST_LOG") {
        Ok(filter) => builder.parse_filters(&filter),
        Err(_) => builder.parse_filters(&config.log_level),
    };

    if builder.try_init().is_err() {
        log::debug!("logger already initialized; keeping existing logger");
    }
}
