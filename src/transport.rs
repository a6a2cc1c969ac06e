//! Kubernetes transport
//!
//! Builds the authenticated kube-rs client every provider shares and pairs it
//! with a client-side rate limiter. The limits are fixed once at construction
//! so the fan-out of a large listing cannot burst past them.
//!
//! Uses the default kubeconfig loading strategy unless a context is named:
//! 1. In-cluster config (if running in a pod)
//! 2. KUBECONFIG environment variable
//! 3. ~/.kube/config

use anyhow::{Context, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::config::ClientConfig;

/// Rate-limited handle on a Kubernetes API server
#[derive(Clone)]
pub struct Transport {
    client: Client,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl Transport {
    /// Connect using the kubeconfig context named in `config`, or the inferred default
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let kube_config = match config.context.as_deref() {
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context.to_string()),
                    ..Default::default()
                };
                Config::from_kubeconfig(&options)
                    .await
                    .with_context(|| format!("Failed to load kubeconfig context '{}'", context))?
            }
            None => Config::infer()
                .await
                .context("Failed to infer Kubernetes configuration")?,
        };
        tracing::debug!(
            "Connecting to {} (qps={}, burst={})",
            kube_config.cluster_url,
            config.qps,
            config.burst
        );

        let client = Client::try_from(kube_config).context("Failed to create Kubernetes client")?;
        Self::new(client, config)
    }

    /// Wrap an existing client with the rate limits from `config`
    pub fn new(client: Client, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client,
            limiter: Arc::new(rate_limiter(config.qps, config.burst)?),
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Wait until the rate limiter admits one more request
    pub async fn throttle(&self) {
        self.limiter.until_ready().await;
    }
}

fn rate_limiter(qps: u32, burst: u32) -> Result<DefaultDirectRateLimiter> {
    let qps = NonZeroU32::new(qps).context("qps must be greater than zero")?;
    let burst = NonZeroU32::new(burst).context("burst must be greater than zero")?;
    Ok(RateLimiter::direct(Quota::per_second(qps).allow_burst(burst)))
}
