//! Concurrent listing across resource types and namespaces
//!
//! Every resource type gets its own task; namespaced resources may fan out
//! again into one task per namespace. All tasks share a cancellation token
//! so the first unsuppressed failure stops the rest.

use kube::core::DynamicObject;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::dynamic::{ObjectProvider, list_all};
use crate::error::{Error, Result};
use crate::resource::ResourceDescriptor;

/// Which scopes a listing visits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopePlan {
    /// Run a cluster-scope pass
    pub cluster: bool,
    /// Distinct namespaces to list in
    pub namespaces: BTreeSet<String>,
}

impl ScopePlan {
    /// No namespaces means cluster scope; an empty entry adds a cluster pass
    pub fn from_namespaces(namespaces: &[String]) -> Self {
        let mut plan = Self {
            cluster: namespaces.is_empty(),
            namespaces: BTreeSet::new(),
        };
        for ns in namespaces {
            if ns.is_empty() {
                plan.cluster = true;
            } else {
                plan.namespaces.insert(ns.clone());
            }
        }
        plan
    }
}

/// State shared by every listing task of one aggregation
#[derive(Clone)]
struct Branch {
    objects: Arc<dyn ObjectProvider>,
    collected: Arc<Mutex<Vec<DynamicObject>>>,
    namespaces: Arc<BTreeSet<String>>,
    cluster: bool,
    cancel: CancellationToken,
}

impl Branch {
    async fn list_into(&self, resource: &ResourceDescriptor, namespace: Option<&str>) -> Result<()> {
        let items = list_all(self.objects.as_ref(), resource, namespace, &self.cancel).await?;
        self.collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(items);
        Ok(())
    }

    async fn run(self, resource: ResourceDescriptor) -> Result<()> {
        // Cluster-scoped resources have a single scope to list, whatever was requested
        if !resource.namespaced {
            return match self.list_into(&resource, None).await {
                Err(err) if err.is_forbidden() => {
                    tracing::debug!("Suppressing forbidden cluster-scope listing of {}", resource);
                    Ok(())
                }
                other => other,
            };
        }

        if self.cluster {
            match self.list_into(&resource, None).await {
                Err(err) if err.is_forbidden() => {
                    tracing::debug!(
                        "Retrying {} in {} namespace(s) after cluster-scope denial",
                        resource,
                        self.namespaces.len()
                    );
                }
                other => return other,
            }
        }
        self.run_namespaces(&resource).await
    }

    async fn run_namespaces(&self, resource: &ResourceDescriptor) -> Result<()> {
        let inner = Branch {
            cancel: self.cancel.child_token(),
            ..self.clone()
        };
        let mut tasks = JoinSet::new();
        for ns in self.namespaces.iter() {
            if inner.cancel.is_cancelled() {
                break;
            }
            let branch = inner.clone();
            let resource = resource.clone();
            let ns = ns.clone();
            tasks.spawn(async move {
                match branch.list_into(&resource, Some(&ns)).await {
                    Err(err) if err.is_forbidden() => {
                        tracing::debug!("Suppressing forbidden listing of {}: {}", resource, err);
                        Ok(())
                    }
                    other => other,
                }
            });
        }
        join_branches(&mut tasks, &inner.cancel).await
    }
}

/// Wait for every task, cancelling the rest once one fails
///
/// Returns the first failure observed; failures of siblings that were
/// cancelled because of it are dropped. A token cancelled by the caller
/// yields [`Error::Cancelled`] even if no task got to run.
async fn join_branches(tasks: &mut JoinSet<Result<()>>, cancel: &CancellationToken) -> Result<()> {
    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.map_err(Error::from).and_then(|result| result);
        if let Err(err) = outcome {
            if first_error.is_none() {
                cancel.cancel();
                first_error = Some(err);
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        // Cancelled from above before any task got to fail
        None if cancel.is_cancelled() => Err(Error::Cancelled),
        None => Ok(()),
    }
}

/// List `resources` in every scope of `plan`
///
/// Repeated resources are listed once. Either every non-suppressed listing
/// succeeds and all objects are returned, or the first failure is returned
/// and partial results are discarded.
pub async fn list_many(
    objects: Arc<dyn ObjectProvider>,
    resources: Vec<ResourceDescriptor>,
    plan: ScopePlan,
    cancel: &CancellationToken,
) -> Result<Vec<DynamicObject>> {
    let root = Branch {
        objects,
        collected: Arc::new(Mutex::new(Vec::new())),
        namespaces: Arc::new(plan.namespaces),
        cluster: plan.cluster,
        cancel: cancel.child_token(),
    };

    let mut seen = HashSet::new();
    let mut tasks = JoinSet::new();
    for resource in resources {
        // A repeated resource would list every scope twice
        if !seen.insert(resource.clone()) {
            continue;
        }
        tasks.spawn(root.clone().run(resource));
    }
    join_branches(&mut tasks, &root.cancel).await?;

    let items = std::mem::take(
        &mut *root
            .collected
            .lock()
            .unwrap_or_else(PoisonError::into_inner),
    );
    tracing::debug!(
        "Got {:4} objects from {} API resources",
        items.len(),
        seen.len()
    );
    Ok(items)
}
