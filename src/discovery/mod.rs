//! Server resource discovery
//!
//! The [`DiscoveryProvider`] trait is the seam between the catalog/mapper and
//! whatever enumerates the server's API groups. [`KubeDiscovery`] implements
//! it against a live API server through the `/api` and `/apis` endpoints.

mod catalog;

pub use catalog::{SUPERSEDED_RESOURCES, SupersededResource, fetch_all, parse_group_version};

use async_trait::async_trait;
use futures::future::try_join_all;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use std::collections::HashSet;

use crate::error::ApiError;
use crate::transport::Transport;

/// A resource entry advertised by the server for one group/version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredResource {
    /// Plural name, e.g. "deployments" (subresources look like "pods/log")
    pub name: String,
    pub singular_name: String,
    pub kind: String,
    pub namespaced: bool,
    pub verbs: Vec<String>,
    pub short_names: Vec<String>,
}

impl DiscoveredResource {
    pub fn is_subresource(&self) -> bool {
        self.name.contains('/')
    }

    /// Check that every verb in `required` is advertised
    pub fn supports_all(&self, required: &[&str]) -> bool {
        required
            .iter()
            .all(|verb| self.verbs.iter().any(|v| v == verb))
    }
}

/// Resources served under one group/version string (e.g. "apps/v1")
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceList {
    pub group_version: String,
    pub resources: Vec<DiscoveredResource>,
}

impl From<APIResourceList> for ResourceList {
    fn from(list: APIResourceList) -> Self {
        Self {
            group_version: list.group_version,
            resources: list
                .resources
                .into_iter()
                .map(|r| DiscoveredResource {
                    name: r.name,
                    singular_name: r.singular_name,
                    kind: r.kind,
                    namespaced: r.namespaced,
                    verbs: r.verbs,
                    short_names: r.short_names.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Enumerates the resource types a server offers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    /// Every served resource once, at the most preferred version serving it
    async fn preferred_resources(&self) -> Result<Vec<ResourceList>, ApiError>;

    /// Every served group/version, with each group's preferred version first
    async fn server_resources(&self) -> Result<Vec<ResourceList>, ApiError>;
}

/// Keep each (group, resource) at the first version that serves it
///
/// `lists` must be ordered with each group's preferred version first, so a
/// resource only served at an older version is still kept there. Lists left
/// without resources are dropped.
pub fn preferred_only(lists: Vec<ResourceList>) -> Vec<ResourceList> {
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .filter_map(|mut list| {
            let group = parse_group_version(&list.group_version)
                .map(|gv| gv.group)
                .unwrap_or_default();
            list.resources
                .retain(|resource| seen.insert((group.clone(), resource.name.clone())));
            (!list.resources.is_empty()).then_some(list)
        })
        .collect()
}

/// Discovery against a live API server
#[derive(Clone)]
pub struct KubeDiscovery {
    transport: Transport,
}

impl KubeDiscovery {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// Every served group/version, each group's preferred version first
    async fn group_versions(&self) -> Result<Vec<String>, ApiError> {
        let client = self.transport.client();

        self.transport.throttle().await;
        let mut group_versions = client.list_core_api_versions().await?.versions;

        self.transport.throttle().await;
        let groups = client.list_api_groups().await?;
        for group in groups.groups {
            let preferred = group
                .preferred_version
                .as_ref()
                .or_else(|| group.versions.first())
                .map(|v| v.group_version.clone());
            let Some(preferred) = preferred else {
                tracing::debug!("API group {} advertises no versions", group.name);
                continue;
            };
            let others: Vec<String> = group
                .versions
                .iter()
                .map(|v| v.group_version.clone())
                .filter(|gv| *gv != preferred)
                .collect();
            group_versions.push(preferred);
            group_versions.extend(others);
        }
        Ok(group_versions)
    }

    async fn resources_for(&self, group_version: &str) -> Result<ResourceList, ApiError> {
        self.transport.throttle().await;
        let client = self.transport.client();
        // Core group versions have no "group/" prefix
        let list = if group_version.contains('/') {
            client.list_api_group_resources(group_version).await?
        } else {
            client.list_core_api_resources(group_version).await?
        };
        Ok(list.into())
    }

    async fn collect(&self) -> Result<Vec<ResourceList>, ApiError> {
        let group_versions = self.group_versions().await?;
        let lists = try_join_all(group_versions.iter().map(|gv| self.resources_for(gv))).await?;
        tracing::debug!("Discovered {} group versions", lists.len());
        Ok(lists)
    }
}

#[async_trait]
impl DiscoveryProvider for KubeDiscovery {
    async fn preferred_resources(&self) -> Result<Vec<ResourceList>, ApiError> {
        Ok(preferred_only(self.collect().await?))
    }

    async fn server_resources(&self) -> Result<Vec<ResourceList>, ApiError> {
        self.collect().await
    }
}
