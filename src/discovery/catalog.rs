//! Readable resource catalog
//!
//! Turns the server's preferred resources into the descriptors a listing
//! over "everything" should visit.

use kube::core::GroupVersion;

use super::DiscoveryProvider;
use crate::error::{Error, Result};
use crate::resource::ResourceDescriptor;

/// Verbs a resource must advertise to be listed
const REQUIRED_VERBS: &[&str] = &["watch", "list", "get"];

/// A (group, kind) served twice by the server because it migrated groups
pub struct SupersededResource {
    pub group: &'static str,
    pub kind: &'static str,
    /// Group that now serves the resource
    pub superseded_by: &'static str,
}

/// Duplicated resources excluded from the catalog (Kubernetes v1.18 and above)
///
/// To exclude another migrated resource, add an entry here.
pub const SUPERSEDED_RESOURCES: &[SupersededResource] = &[
    SupersededResource {
        group: "",
        kind: "Event",
        superseded_by: "events.k8s.io",
    },
    SupersededResource {
        group: "extensions",
        kind: "Ingress",
        superseded_by: "networking.k8s.io",
    },
];

fn superseded_by(group: &str, kind: &str) -> Option<&'static str> {
    SUPERSEDED_RESOURCES
        .iter()
        .find(|entry| entry.group == group && entry.kind == kind)
        .map(|entry| entry.superseded_by)
}

/// Parse a discovery group/version string
///
/// Accepts "v1" for the core group and "group/version" otherwise. Empty
/// components and additional slashes are rejected.
pub fn parse_group_version(group_version: &str) -> Option<GroupVersion> {
    match group_version.split('/').collect::<Vec<_>>().as_slice() {
        [version] if !version.is_empty() => Some(GroupVersion::gv("", version)),
        [group, version] if !group.is_empty() && !version.is_empty() => {
            Some(GroupVersion::gv(group, version))
        }
        _ => None,
    }
}

/// Fetch every resource type that can be watched, listed and fetched
///
/// Results are not cached; every call queries the discovery provider.
pub async fn fetch_all(discovery: &dyn DiscoveryProvider) -> Result<Vec<ResourceDescriptor>> {
    let lists = discovery
        .preferred_resources()
        .await
        .map_err(Error::Discovery)?;

    let mut descriptors = Vec::new();
    for list in lists {
        if list.resources.is_empty() {
            continue;
        }
        let Some(gv) = parse_group_version(&list.group_version) else {
            tracing::debug!(
                "Ignoring invalid discovered resource {:?}: malformed group version",
                list.group_version
            );
            continue;
        };
        for resource in list.resources {
            if !resource.supports_all(REQUIRED_VERBS) {
                continue;
            }
            let descriptor = ResourceDescriptor {
                group: gv.group.clone(),
                version: gv.version.clone(),
                kind: resource.kind,
                name: resource.name,
                namespaced: resource.namespaced,
            };
            if let Some(replacement) = superseded_by(&descriptor.group, &descriptor.kind) {
                tracing::debug!(
                    "Exclude duplicated discovered resource: {} (served by {})",
                    descriptor,
                    replacement
                );
                continue;
            }
            descriptors.push(descriptor);
        }
    }

    tracing::debug!(
        "Discovered {} available API resources to list",
        descriptors.len()
    );
    Ok(descriptors)
}
