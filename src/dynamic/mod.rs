//! Dynamic object access
//!
//! [`ObjectProvider`] is the get/list seam the client works through; objects
//! are kept as untyped [`DynamicObject`]s. [`KubeObjectProvider`] implements it
//! with `Api<DynamicObject>` on a rate-limited transport.

mod lister;

pub use lister::{PAGE_LIMIT, list_all};

use async_trait::async_trait;
use kube::Api;
use kube::api::ListParams;
use kube::core::DynamicObject;

use crate::error::ApiError;
use crate::resource::ResourceDescriptor;
use crate::transport::Transport;

/// One page of a paginated list response
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub items: Vec<DynamicObject>,
    /// Token to request the next page; `None` on the last page
    pub continue_token: Option<String>,
}

/// Reads objects of any resource type
#[async_trait]
pub trait ObjectProvider: Send + Sync {
    /// Fetch a single object; `namespace` is `None` for cluster scope
    async fn get(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ApiError>;

    /// Fetch one page of at most `limit` objects
    ///
    /// `Ok(None)` means the backend returned no list at all, which callers
    /// treat as an empty result.
    async fn list(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        limit: u32,
        continue_token: Option<&str>,
    ) -> Result<Option<ObjectPage>, ApiError>;
}

/// Object access against a live API server
#[derive(Clone)]
pub struct KubeObjectProvider {
    transport: Transport,
}

impl KubeObjectProvider {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    fn api(&self, resource: &ResourceDescriptor, namespace: Option<&str>) -> Api<DynamicObject> {
        let api_resource = resource.to_api_resource();
        let client = self.transport.client().clone();
        match resource.scope_for(namespace).namespace() {
            Some(ns) => Api::namespaced_with(client, ns, &api_resource),
            None => Api::all_with(client, &api_resource),
        }
    }
}

#[async_trait]
impl ObjectProvider for KubeObjectProvider {
    async fn get(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ApiError> {
        self.transport.throttle().await;
        Ok(self.api(resource, namespace).get(name).await?)
    }

    async fn list(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        limit: u32,
        continue_token: Option<&str>,
    ) -> Result<Option<ObjectPage>, ApiError> {
        let mut params = ListParams::default().limit(limit);
        if let Some(token) = continue_token {
            params = params.continue_token(token);
        }

        self.transport.throttle().await;
        let list = self.api(resource, namespace).list(&params).await?;
        Ok(Some(ObjectPage {
            items: list.items,
            continue_token: list.metadata.continue_.filter(|token| !token.is_empty()),
        }))
    }
}
