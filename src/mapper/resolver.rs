//! Resource type resolution

use kube::discovery::Scope;

use super::{GroupKind, MappingError, RestMapper, parse_resource_arg};
use crate::resource::ResourceDescriptor;

fn in_group(group: &str) -> String {
    if group.is_empty() {
        String::new()
    } else {
        format!(" in group \"{}\"", group)
    }
}

/// A resource type string that could not be resolved
///
/// Each variant names the stage that failed; messages are meant to be shown
/// to users as-is.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("the server doesn't have a resource type \"{resource}\"{}", in_group(.group))]
    UnknownResource {
        resource: String,
        group: String,
        #[source]
        source: MappingError,
    },

    #[error("the server couldn't identify a kind for resource type \"{resource}\"{}", in_group(.group))]
    UnknownKind {
        resource: String,
        group: String,
        #[source]
        source: MappingError,
    },

    #[error("the server couldn't identify a group kind for resource type \"{kind}\"{}", in_group(.group))]
    UnknownGroupKind {
        kind: String,
        group: String,
        #[source]
        source: MappingError,
    },
}

/// Resolve a free-form resource type string into a descriptor
///
/// The input is lowercased and may be a bare name (`pods`, `po`), a
/// `resource.group` pair or a fully specified `resource.version.group`.
pub async fn resolve(
    mapper: &dyn RestMapper,
    type_str: &str,
) -> Result<ResourceDescriptor, ResolutionError> {
    let arg = type_str.to_lowercase();
    let (fully_specified, partial) = parse_resource_arg(&arg);

    let mut resolved = None;
    if let Some(gvr) = fully_specified {
        resolved = mapper.resource_for(&gvr).await.ok();
    }
    let gvr = match resolved {
        Some(gvr) => gvr,
        None => {
            let unversioned = partial.clone().with_version("");
            mapper
                .resource_for(&unversioned)
                .await
                .map_err(|source| ResolutionError::UnknownResource {
                    resource: partial.resource,
                    group: partial.group,
                    source,
                })?
        }
    };

    let gvk = mapper
        .kind_for(&gvr)
        .await
        .map_err(|source| ResolutionError::UnknownKind {
            resource: gvr.resource.clone(),
            group: gvr.group.clone(),
            source,
        })?;

    let group_kind = GroupKind {
        group: gvk.group.clone(),
        kind: gvk.kind.clone(),
    };
    let mapping = mapper.rest_mapping(&group_kind).await.map_err(|source| {
        ResolutionError::UnknownGroupKind {
            kind: gvk.kind.clone(),
            group: gvk.group.clone(),
            source,
        }
    })?;

    Ok(ResourceDescriptor {
        name: gvr.resource,
        namespaced: mapping.scope == Scope::Namespaced,
        group: gvk.group,
        version: gvk.version,
        kind: gvk.kind,
    })
}
