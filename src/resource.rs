//! Resource descriptors and request options
//!
//! A [`ResourceDescriptor`] is the resolved identity of an API resource type.
//! It is a minimal projection of the discovery metadata: enough to build
//! get/list requests against the dynamic API, nothing more.

use kube::core::{ApiResource, GroupVersionKind};
use std::fmt;

/// Resolved identity of an API resource type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceDescriptor {
    /// API group (empty for the core group)
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Plural resource name, e.g. "deployments"
    pub name: String,
    pub namespaced: bool,
}

impl ResourceDescriptor {
    /// The apiVersion string objects of this type carry
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn group_version_kind(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(&self.group, &self.version, &self.kind)
    }

    /// Convert into the kube-rs dynamic type used by `Api<DynamicObject>`
    pub fn to_api_resource(&self) -> ApiResource {
        ApiResource::from_gvk_with_plural(&self.group_version_kind(), &self.name)
    }

    /// Scope a request for this resource in the given namespace
    ///
    /// Cluster-scoped resources and empty namespaces always map to cluster scope.
    pub fn scope_for(&self, namespace: Option<&str>) -> ListScope {
        match namespace {
            Some(ns) if self.namespaced && !ns.is_empty() => ListScope::Namespace(ns.to_string()),
            _ => ListScope::Cluster,
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.name, self.version)
        } else {
            write!(f, "{}.{}.{}", self.name, self.version, self.group)
        }
    }
}

/// Scope of a single get or list call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListScope {
    Cluster,
    Namespace(String),
}

impl ListScope {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            ListScope::Cluster => None,
            ListScope::Namespace(ns) => Some(ns),
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, ListScope::Cluster)
    }
}

impl fmt::Display for ListScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListScope::Cluster => write!(f, "at the cluster scope"),
            ListScope::Namespace(ns) => write!(f, "in the namespace \"{}\"", ns),
        }
    }
}

/// Options for fetching a single object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetOptions {
    pub resource: ResourceDescriptor,
    /// Ignored when the resource is cluster-scoped
    pub namespace: String,
}

/// Options for listing objects across resource types and namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Resource types to list; empty lists every readable discovered type
    pub resources: Vec<ResourceDescriptor>,
    /// Namespaces to list in; empty means cluster scope, and an empty entry
    /// adds a cluster-scope pass next to the named namespaces
    pub namespaces: Vec<String>,
}
