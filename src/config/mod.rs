//! Configuration management.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, InputConfig, LoggingConfig, PlayerConfig, ShutdownConfig};
