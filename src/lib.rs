//! kubecollect
//!
//! Resolves resource type names against a cluster's discovery data and lists
//! objects of many resource types across many namespaces concurrently,
//! tolerating authorization failures where a narrower scope can still answer.

pub mod client;
pub mod config;
pub mod discovery;
pub mod dynamic;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod resource;
pub mod transport;

// Re-export commonly used types for convenience
pub use client::ResourceClient;
pub use config::{ClientConfig, Config, ConfigLoader, LoggerConfig};
pub use error::{ApiError, Error, Result};
pub use mapper::ResolutionError;
pub use resource::{GetOptions, ListOptions, ListScope, ResourceDescriptor};
