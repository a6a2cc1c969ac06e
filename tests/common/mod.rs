//! In-memory cluster used by the integration tests
//!
//! Serves discovery data and scripted list/get responses per
//! (resource, namespace) pair, recording every list request it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use kube::core::DynamicObject;
use kubecollect::discovery::{DiscoveredResource, DiscoveryProvider, ResourceList, preferred_only};
use kubecollect::dynamic::{ObjectPage, ObjectProvider};
use kubecollect::mapper::DiscoveryRestMapper;
use kubecollect::{ApiError, ResourceClient, ResourceDescriptor};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// How the fake answers list requests for one (resource, namespace) pair
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Object names per page; every page but the last carries a continue token
    Pages(Vec<Vec<&'static str>>),
    Forbidden,
    /// Non-authorization failure with this HTTP status
    Fail(u16),
    /// No list in the response at all
    Absent,
    /// Never answers
    Hang,
}

/// One recorded list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub resource: String,
    pub namespace: Option<String>,
    pub limit: u32,
    pub continue_token: Option<String>,
}

#[derive(Default)]
pub struct FakeCluster {
    lists: Vec<ResourceList>,
    behaviors: HashMap<(String, Option<String>), Behavior>,
    calls: Mutex<Vec<ListCall>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise `resource` under `group_version`
    ///
    /// Serve a group's preferred version before its other versions.
    pub fn serve(mut self, group_version: &str, resource: DiscoveredResource) -> Self {
        match self
            .lists
            .iter_mut()
            .find(|list| list.group_version == group_version)
        {
            Some(list) => list.resources.push(resource),
            None => self.lists.push(ResourceList {
                group_version: group_version.to_string(),
                resources: vec![resource],
            }),
        }
        self
    }

    /// Script the answer for `resource` listed in `namespace` (`None` for cluster scope)
    pub fn on(mut self, resource: &str, namespace: Option<&str>, behavior: Behavior) -> Self {
        self.behaviors.insert(
            (resource.to_string(), namespace.map(str::to_string)),
            behavior,
        );
        self
    }

    pub fn calls(&self) -> Vec<ListCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of first-page requests made for a (resource, namespace) pair
    pub fn passes(&self, resource: &str, namespace: Option<&str>) -> usize {
        self.calls()
            .iter()
            .filter(|call| {
                call.resource == resource
                    && call.namespace.as_deref() == namespace
                    && call.continue_token.is_none()
            })
            .count()
    }

    fn behavior(&self, resource: &str, namespace: Option<&str>) -> Behavior {
        self.behaviors
            .get(&(resource.to_string(), namespace.map(str::to_string)))
            .cloned()
            .unwrap_or(Behavior::Pages(vec![vec![]]))
    }
}

fn object(resource: &ResourceDescriptor, namespace: Option<&str>, name: &str) -> DynamicObject {
    let obj = DynamicObject::new(name, &resource.to_api_resource());
    match namespace {
        Some(ns) => obj.within(ns),
        None => obj,
    }
}

#[async_trait]
impl DiscoveryProvider for FakeCluster {
    async fn preferred_resources(&self) -> Result<Vec<ResourceList>, ApiError> {
        Ok(preferred_only(self.lists.clone()))
    }

    async fn server_resources(&self) -> Result<Vec<ResourceList>, ApiError> {
        Ok(self.lists.clone())
    }
}

#[async_trait]
impl ObjectProvider for FakeCluster {
    async fn get(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject, ApiError> {
        match self.behavior(&resource.name, namespace) {
            Behavior::Pages(pages) if pages.iter().flatten().any(|n| *n == name) => {
                Ok(object(resource, namespace, name))
            }
            Behavior::Forbidden => Err(ApiError::Forbidden(format!(
                "{} \"{}\" is forbidden",
                resource.name, name
            ))),
            Behavior::Fail(code) => Err(ApiError::Server {
                code,
                message: "injected failure".to_string(),
            }),
            Behavior::Hang => futures::future::pending().await,
            _ => Err(ApiError::NotFound(format!(
                "{} \"{}\" not found",
                resource.name, name
            ))),
        }
    }

    async fn list(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        limit: u32,
        continue_token: Option<&str>,
    ) -> Result<Option<ObjectPage>, ApiError> {
        self.calls.lock().unwrap().push(ListCall {
            resource: resource.name.clone(),
            namespace: namespace.map(str::to_string),
            limit,
            continue_token: continue_token.map(str::to_string),
        });

        match self.behavior(&resource.name, namespace) {
            Behavior::Pages(pages) => {
                let index: usize = continue_token
                    .and_then(|token| token.strip_prefix("page-"))
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                let names = pages.get(index).cloned().unwrap_or_default();
                let next = index + 1;
                Ok(Some(ObjectPage {
                    items: names
                        .iter()
                        .map(|name| object(resource, namespace, name))
                        .collect(),
                    continue_token: (next < pages.len()).then(|| format!("page-{}", next)),
                }))
            }
            Behavior::Forbidden => Err(ApiError::Forbidden(format!(
                "{} is forbidden: cannot list resource",
                resource.name
            ))),
            Behavior::Fail(code) => Err(ApiError::Server {
                code,
                message: "injected failure".to_string(),
            }),
            Behavior::Absent => Ok(None),
            Behavior::Hang => futures::future::pending().await,
        }
    }
}

/// A resource entry that supports get, list and watch
pub fn readable(name: &str, kind: &str, namespaced: bool) -> DiscoveredResource {
    DiscoveredResource {
        name: name.to_string(),
        singular_name: kind.to_lowercase(),
        kind: kind.to_string(),
        namespaced,
        verbs: ["get", "list", "watch"].iter().map(|v| v.to_string()).collect(),
        short_names: vec![],
    }
}

pub fn descriptor(group: &str, version: &str, kind: &str, name: &str, namespaced: bool) -> ResourceDescriptor {
    ResourceDescriptor {
        group: group.to_string(),
        version: version.to_string(),
        kind: kind.to_string(),
        name: name.to_string(),
        namespaced,
    }
}

pub fn pods() -> ResourceDescriptor {
    descriptor("", "v1", "Pod", "pods", true)
}

pub fn configmaps() -> ResourceDescriptor {
    descriptor("", "v1", "ConfigMap", "configmaps", true)
}

pub fn nodes() -> ResourceDescriptor {
    descriptor("", "v1", "Node", "nodes", false)
}

/// Build a client whose three providers are all backed by `cluster`
pub fn client(cluster: Arc<FakeCluster>) -> ResourceClient {
    let mapper = Arc::new(DiscoveryRestMapper::new(cluster.clone()));
    ResourceClient::new(cluster.clone(), mapper, cluster)
}

/// Sorted `namespace/name` keys of the returned objects
pub fn keys(objects: &[DynamicObject]) -> Vec<String> {
    let mut keys: Vec<String> = objects
        .iter()
        .map(|o| {
            format!(
                "{}/{}",
                o.metadata.namespace.clone().unwrap_or_default(),
                o.metadata.name.clone().unwrap_or_default()
            )
        })
        .collect();
    keys.sort();
    keys
}
