//! Resource client
//!
//! `ResourceClient` is the entry point for library consumers: it resolves
//! resource type strings, fetches single objects and lists objects across
//! resource types and namespaces.

mod aggregate;

pub use aggregate::{ScopePlan, list_many};

use anyhow::Result as AnyResult;
use kube::core::DynamicObject;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::discovery::{DiscoveryProvider, KubeDiscovery, fetch_all};
use crate::dynamic::{KubeObjectProvider, ObjectProvider};
use crate::error::{Error, Result};
use crate::mapper::{DiscoveryRestMapper, RestMapper, resolve};
use crate::resource::{GetOptions, ListOptions, ResourceDescriptor};
use crate::transport::Transport;

/// Read access to the resources of one cluster
///
/// # Example
///
/// ```rust,no_run
/// use kubecollect::{ClientConfig, ListOptions, ResourceClient};
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = ResourceClient::connect(&ClientConfig::default()).await?;
///
/// let deployments = client.resolve("deploy").await?;
/// let objects = client
///     .list(&ListOptions {
///         resources: vec![deployments],
///         namespaces: vec!["default".to_string(), "kube-system".to_string()],
///     })
///     .await?;
/// println!("{} deployments", objects.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ResourceClient {
    discovery: Arc<dyn DiscoveryProvider>,
    mapper: Arc<dyn RestMapper>,
    objects: Arc<dyn ObjectProvider>,
}

impl ResourceClient {
    /// Assemble a client from its three providers
    pub fn new(
        discovery: Arc<dyn DiscoveryProvider>,
        mapper: Arc<dyn RestMapper>,
        objects: Arc<dyn ObjectProvider>,
    ) -> Self {
        Self {
            discovery,
            mapper,
            objects,
        }
    }

    /// Connect to the cluster selected by `config`
    pub async fn connect(config: &ClientConfig) -> AnyResult<Self> {
        let transport = Transport::connect(config).await?;
        Ok(Self::from_transport(transport))
    }

    /// Wire the kube-backed providers on one shared transport
    pub fn from_transport(transport: Transport) -> Self {
        let discovery: Arc<dyn DiscoveryProvider> = Arc::new(KubeDiscovery::new(transport.clone()));
        let mapper = Arc::new(DiscoveryRestMapper::new(discovery.clone()));
        let objects = Arc::new(KubeObjectProvider::new(transport));
        Self::new(discovery, mapper, objects)
    }

    /// Resolve a resource type string such as `po`, `deployments.apps` or
    /// `ingresses.v1.networking.k8s.io`
    pub async fn resolve(&self, type_str: &str) -> Result<ResourceDescriptor> {
        Ok(resolve(self.mapper.as_ref(), type_str).await?)
    }

    /// All resource types that can be listed; this is what an empty
    /// [`ListOptions::resources`] expands to
    pub async fn api_resources(&self) -> Result<Vec<ResourceDescriptor>> {
        fetch_all(self.discovery.as_ref()).await
    }

    /// Fetch one object by name
    ///
    /// The namespace in `opts` is ignored for cluster-scoped resources.
    pub async fn get(&self, name: &str, opts: &GetOptions) -> Result<DynamicObject> {
        tracing::debug!("Get \"{}\" with options: {:?}", name, opts);
        let scope = opts.resource.scope_for(Some(opts.namespace.as_str()));
        self.objects
            .get(&opts.resource, scope.namespace(), name)
            .await
            .map_err(|source| Error::Get {
                name: name.to_string(),
                resource: opts.resource.clone(),
                scope,
                source,
            })
    }

    /// List objects of every requested resource type in every requested scope
    ///
    /// Authorization failures are suppressed where a narrower scope can still
    /// make progress; any other failure aborts the whole listing.
    pub async fn list(&self, opts: &ListOptions) -> Result<Vec<DynamicObject>> {
        self.list_with_cancellation(opts, &CancellationToken::new())
            .await
    }

    /// Like [`list`](Self::list), stopping early with [`Error::Cancelled`] once
    /// `cancel` fires
    pub async fn list_with_cancellation(
        &self,
        opts: &ListOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<DynamicObject>> {
        tracing::debug!("List with options: {:?}", opts);
        let resources = if opts.resources.is_empty() {
            self.api_resources().await?
        } else {
            opts.resources.clone()
        };
        let plan = ScopePlan::from_namespaces(&opts.namespaces);
        list_many(self.objects.clone(), resources, plan, cancel).await
    }
}
