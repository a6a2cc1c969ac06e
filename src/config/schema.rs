//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Kubernetes client configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

/// Kubernetes client configuration
///
/// The rate limits are applied once, when the client is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Sustained requests per second
    #[serde(default = "default_qps")]
    pub qps: u32,

    /// Requests allowed in a burst above the sustained rate
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Kubeconfig context to use instead of the current one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    /// Log filter directive, e.g. "info" or "kubecollect=debug"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write debug logs to a temporary file instead of stderr
    #[serde(default = "default_false")]
    pub debug: bool,
}

// Default value functions
fn default_qps() -> u32 {
    200
}

fn default_burst() -> u32 {
    400
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            qps: default_qps(),
            burst: default_burst(),
            context: None,
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            debug: default_false(),
        }
    }
}
