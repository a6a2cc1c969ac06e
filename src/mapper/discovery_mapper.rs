//! REST mapper backed by server discovery
//!
//! Loads every served group/version on first use and answers lookups from
//! the cached index for the rest of its lifetime.

use async_trait::async_trait;
use kube::core::GroupVersionKind;
use kube::discovery::Scope;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{GroupKind, GroupVersionResource, MappingError, RestMapper, RestMapping};
use crate::discovery::{DiscoveryProvider, ResourceList, parse_group_version};

/// One served resource at one version
#[derive(Debug, Clone)]
struct MappedResource {
    group: String,
    version: String,
    plural: String,
    singular: String,
    short_names: Vec<String>,
    kind: String,
    scope: Scope,
}

impl MappedResource {
    fn answers_to(&self, name: &str) -> bool {
        self.plural == name || self.singular == name || self.short_names.iter().any(|s| s == name)
    }

    fn gvr(&self) -> GroupVersionResource {
        GroupVersionResource::new(&self.group, &self.version, &self.plural)
    }

    fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }
}

/// Resources in discovery order, each group's preferred version first
#[derive(Debug, Default)]
struct MappingIndex {
    resources: Vec<MappedResource>,
}

impl MappingIndex {
    fn build(lists: Vec<ResourceList>) -> Self {
        let mut resources = Vec::new();
        for list in lists {
            let Some(gv) = parse_group_version(&list.group_version) else {
                tracing::debug!("Skipping malformed group version {:?}", list.group_version);
                continue;
            };
            for resource in list.resources {
                if resource.is_subresource() {
                    continue;
                }
                let singular = if resource.singular_name.is_empty() {
                    resource.kind.to_lowercase()
                } else {
                    resource.singular_name
                };
                resources.push(MappedResource {
                    group: gv.group.clone(),
                    version: gv.version.clone(),
                    plural: resource.name,
                    singular,
                    short_names: resource.short_names,
                    kind: resource.kind,
                    scope: if resource.namespaced {
                        Scope::Namespaced
                    } else {
                        Scope::Cluster
                    },
                });
            }
        }
        Self { resources }
    }

    fn resource_for(&self, input: &GroupVersionResource) -> Result<GroupVersionResource, MappingError> {
        let resource = input.resource.to_lowercase();
        let mut candidates = self.resources.iter().filter(|r| {
            r.answers_to(&resource)
                && (input.group.is_empty() || r.group == input.group)
                && (input.version.is_empty() || r.version == input.version)
        });

        let first = candidates
            .next()
            .ok_or_else(|| MappingError::NoMatch(describe(input)))?;
        if first.group.is_empty() {
            return Ok(first.gvr());
        }
        // An unqualified name shared by several groups resolves to the core group if it has one
        let core = candidates.find(|r| r.group.is_empty());
        Ok(core.unwrap_or(first).gvr())
    }

    fn kind_for(&self, input: &GroupVersionResource) -> Result<GroupVersionKind, MappingError> {
        self.resources
            .iter()
            .find(|r| {
                r.group == input.group && r.version == input.version && r.answers_to(&input.resource)
            })
            .map(MappedResource::gvk)
            .ok_or_else(|| MappingError::NoMatch(describe(input)))
    }

    fn rest_mapping(&self, group_kind: &GroupKind) -> Result<RestMapping, MappingError> {
        self.resources
            .iter()
            .find(|r| r.group == group_kind.group && r.kind == group_kind.kind)
            .map(|r| RestMapping {
                resource: r.gvr(),
                gvk: r.gvk(),
                scope: r.scope.clone(),
            })
            .ok_or_else(|| {
                if group_kind.group.is_empty() {
                    MappingError::NoMatch(format!("kind \"{}\"", group_kind.kind))
                } else {
                    MappingError::NoMatch(format!(
                        "kind \"{}\" in group \"{}\"",
                        group_kind.kind, group_kind.group
                    ))
                }
            })
    }
}

fn describe(gvr: &GroupVersionResource) -> String {
    let mut out = format!("resource \"{}\"", gvr.resource);
    if !gvr.group.is_empty() {
        out.push_str(&format!(" in group \"{}\"", gvr.group));
    }
    if !gvr.version.is_empty() {
        out.push_str(&format!(" at version \"{}\"", gvr.version));
    }
    out
}

/// Deferred mapper that discovers server resources on first lookup
pub struct DiscoveryRestMapper {
    discovery: Arc<dyn DiscoveryProvider>,
    index: OnceCell<MappingIndex>,
}

impl DiscoveryRestMapper {
    pub fn new(discovery: Arc<dyn DiscoveryProvider>) -> Self {
        Self {
            discovery,
            index: OnceCell::new(),
        }
    }

    async fn index(&self) -> Result<&MappingIndex, MappingError> {
        self.index
            .get_or_try_init(|| async {
                let lists = self
                    .discovery
                    .server_resources()
                    .await
                    .map_err(MappingError::Discovery)?;
                let index = MappingIndex::build(lists);
                tracing::debug!("Loaded {} resource mappings", index.resources.len());
                Ok::<_, MappingError>(index)
            })
            .await
    }
}

#[async_trait]
impl RestMapper for DiscoveryRestMapper {
    async fn resource_for(
        &self,
        input: &GroupVersionResource,
    ) -> Result<GroupVersionResource, MappingError> {
        self.index().await?.resource_for(input)
    }

    async fn kind_for(
        &self,
        resource: &GroupVersionResource,
    ) -> Result<GroupVersionKind, MappingError> {
        self.index().await?.kind_for(resource)
    }

    async fn rest_mapping(&self, group_kind: &GroupKind) -> Result<RestMapping, MappingError> {
        self.index().await?.rest_mapping(group_kind)
    }
}
