//! REST mapping and resource type resolution
//!
//! A [`RestMapper`] answers three questions about the server's resource
//! types: which resource a partial group/version/resource refers to, which
//! kind a resource serves, and whether a group/kind is namespaced.
//! [`resolve`] chains them to turn user input like `deploy`,
//! `deployments.apps` or `deployments.v1.apps` into a [`ResourceDescriptor`].
//!
//! [`ResourceDescriptor`]: crate::ResourceDescriptor

mod discovery_mapper;
mod resolver;

pub use discovery_mapper::DiscoveryRestMapper;
pub use resolver::{ResolutionError, resolve};

use async_trait::async_trait;
use kube::core::GroupVersionKind;
use kube::discovery::Scope;

use crate::error::ApiError;

/// A resource name qualified by its API group
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

impl GroupResource {
    /// Parse `resource` or `resource.group`, splitting on the first dot
    pub fn parse(arg: &str) -> Self {
        match arg.split_once('.') {
            Some((resource, group)) => Self {
                group: group.to_string(),
                resource: resource.to_string(),
            },
            None => Self {
                group: String::new(),
                resource: arg.to_string(),
            },
        }
    }

    pub fn with_version(self, version: &str) -> GroupVersionResource {
        GroupVersionResource {
            group: self.group,
            version: version.to_string(),
            resource: self.resource,
        }
    }
}

/// A resource name qualified by group and version; empty parts act as wildcards
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }
}

/// A kind qualified by its API group
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

/// Everything the mapper knows about one served resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestMapping {
    pub resource: GroupVersionResource,
    pub gvk: GroupVersionKind,
    pub scope: Scope,
}

/// Split a type argument into its fully specified and group/resource readings
///
/// `resource.version.group` (two or more dots) yields a fully specified
/// resource; the group/resource reading is always returned as a fallback.
pub fn parse_resource_arg(arg: &str) -> (Option<GroupVersionResource>, GroupResource) {
    let fully_specified = if arg.matches('.').count() >= 2 {
        let mut parts = arg.splitn(3, '.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(resource), Some(version), Some(group)) => {
                Some(GroupVersionResource::new(group, version, resource))
            }
            _ => None,
        }
    } else {
        None
    };
    (fully_specified, GroupResource::parse(arg))
}

/// Why a mapping lookup failed
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("no matches for {0}")]
    NoMatch(String),

    #[error("failed to load discovery information: {0}")]
    Discovery(#[source] ApiError),
}

/// Maps resources to kinds and scopes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RestMapper: Send + Sync {
    /// Complete a partially specified resource; an empty version picks the preferred one
    async fn resource_for(
        &self,
        input: &GroupVersionResource,
    ) -> Result<GroupVersionResource, MappingError>;

    /// The kind served by a fully specified resource
    async fn kind_for(&self, resource: &GroupVersionResource)
    -> Result<GroupVersionKind, MappingError>;

    /// Mapping for a group/kind at its preferred version
    async fn rest_mapping(&self, group_kind: &GroupKind) -> Result<RestMapping, MappingError>;
}
