//! Configuration
//!
//! Client rate limits, the kubeconfig context and logging settings, loaded
//! from `config.yaml` in the configuration directory with environment
//! variable overrides.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{ClientConfig, Config, LoggerConfig};
