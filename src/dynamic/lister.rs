//! Paginated listing of one resource type in one scope

use kube::core::DynamicObject;
use tokio_util::sync::CancellationToken;

use super::ObjectProvider;
use crate::error::{ApiError, Error, Result};
use crate::resource::ResourceDescriptor;

/// Maximum number of objects requested per page
pub const PAGE_LIMIT: u32 = 250;

/// List every object of `resource` in `namespace` (`None` for cluster scope)
///
/// Pages are requested in continuation order until the server stops handing
/// out tokens. Cancellation is checked before each page and aborts a page in
/// flight. Forbidden responses come back as [`Error::Forbidden`] so callers
/// can decide whether to suppress them; not-found ends the listing with what
/// was collected so far.
pub async fn list_all(
    objects: &dyn ObjectProvider,
    resource: &ResourceDescriptor,
    namespace: Option<&str>,
    cancel: &CancellationToken,
) -> Result<Vec<DynamicObject>> {
    let scope = resource.scope_for(namespace);
    let mut items = Vec::new();
    let mut next: Option<String> = None;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            response = objects.list(resource, scope.namespace(), PAGE_LIMIT, next.as_deref()) => response,
        };

        let page = match response {
            Ok(Some(page)) => page,
            Ok(None) => break,
            Err(ApiError::NotFound(_)) => break,
            Err(source @ ApiError::Forbidden(_)) => {
                if scope.is_cluster() {
                    tracing::debug!("No access to list at cluster scope for resource: {}", resource);
                } else {
                    tracing::debug!("No access to list {} for resource: {}", scope, resource);
                }
                return Err(Error::Forbidden {
                    resource: resource.clone(),
                    scope,
                    source,
                });
            }
            Err(source) => {
                return Err(Error::List {
                    resource: resource.clone(),
                    scope,
                    source,
                });
            }
        };

        items.extend(page.items);
        match page.continue_token {
            Some(token) if !token.is_empty() => next = Some(token),
            _ => break,
        }
    }

    tracing::debug!("Got {:4} objects from resource {}: {}", items.len(), scope, resource);
    Ok(items)
}
