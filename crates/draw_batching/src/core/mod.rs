//! # Core Module
//!
//! Shared configuration used by every batching subsystem.
//!
//! ## Organization
//!
//! - **Config**: batching behaviour and logging configuration

pub mod config;

pub use config::{
    ApplicationConfig,
    BatchingConfig,
    LoggingConfig,
    Config,
    ConfigError,
};
