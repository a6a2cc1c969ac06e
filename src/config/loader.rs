//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{
    paths,
    schema::{ClientConfig, Config, LoggerConfig},
};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    pub fn load() -> Result<Config> {
        let mut config = Config::default();

        let root_path = paths::root_config_path();
        if root_path.exists() {
            config = Self::load_file(&root_path)?;
        }

        config = Self::apply_env_overrides(config)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Check that the client limits can build a rate limiter
    pub fn validate(config: &Config) -> Result<()> {
        let ClientConfig { qps, burst, .. } = &config.client;
        if *qps == 0 {
            return Err(anyhow::anyhow!("client.qps must be greater than zero"));
        }
        if *burst == 0 {
            return Err(anyhow::anyhow!("client.burst must be greater than zero"));
        }
        if burst < qps {
            return Err(anyhow::anyhow!(
                "client.burst ({}) must not be lower than client.qps ({})",
                burst,
                qps
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Result<Config> {
        if let Ok(qps) = std::env::var("KUBECOLLECT_QPS") {
            config.client.qps = qps
                .parse()
                .context("KUBECOLLECT_QPS must be a number")?;
        }

        if let Ok(burst) = std::env::var("KUBECOLLECT_BURST") {
            config.client.burst = burst
                .parse()
                .context("KUBECOLLECT_BURST must be a number")?;
        }

        if let Ok(context) = std::env::var("KUBECOLLECT_CONTEXT") {
            config.client.context = if context.is_empty() {
                None
            } else {
                Some(context)
            };
        }

        if let Ok(level) = std::env::var("KUBECOLLECT_LOG") {
            config.logger = LoggerConfig {
                level,
                ..config.logger
            };
        }

        Ok(config)
    }
}
