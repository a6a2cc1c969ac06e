//! Listing across resource types and namespaces
//!
//! Covers scope selection, namespace deduplication, suppression of
//! authorization failures and abort-on-first-failure behavior.

mod common;

use common::{Behavior, FakeCluster, client, configmaps, keys, nodes, pods, readable};
use kubecollect::{Error, ListOptions, ListScope};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn namespaces(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_everything_at_cluster_scope() {
    let mut unreadable = readable("bindings", "Binding", true);
    unreadable.verbs = vec!["create".to_string()];
    let cluster = Arc::new(
        FakeCluster::new()
            .serve("v1", readable("nodes", "Node", false))
            .serve("v1", unreadable)
            .on("nodes", None, Behavior::Pages(vec![vec!["node-a", "node-b"]])),
    );

    let objects = client(cluster.clone())
        .list(&ListOptions::default())
        .await
        .unwrap();

    assert_eq!(keys(&objects), vec!["/node-a", "/node-b"]);
    assert_eq!(cluster.passes("bindings", None), 0);
}

#[tokio::test]
async fn test_forbidden_namespace_does_not_stop_siblings() {
    let cluster = Arc::new(
        FakeCluster::new()
            .on("pods", Some("a"), Behavior::Pages(vec![vec!["web-0", "web-1"]]))
            .on("pods", Some("b"), Behavior::Forbidden)
            .on("configmaps", Some("a"), Behavior::Pages(vec![vec!["settings"]]))
            .on("configmaps", Some("b"), Behavior::Pages(vec![vec!["ca-bundle"]])),
    );

    let objects = client(cluster.clone())
        .list(&ListOptions {
            resources: vec![pods(), configmaps()],
            namespaces: namespaces(&["a", "b"]),
        })
        .await
        .unwrap();

    assert_eq!(
        keys(&objects),
        vec!["a/settings", "a/web-0", "a/web-1", "b/ca-bundle"]
    );
    assert_eq!(cluster.passes("pods", None), 0);
}

#[tokio::test]
async fn test_server_error_in_one_namespace_fails_everything() {
    let cluster = Arc::new(
        FakeCluster::new()
            .on("pods", Some("a"), Behavior::Pages(vec![vec!["web-0"]]))
            .on("pods", Some("b"), Behavior::Fail(500))
            .on("configmaps", Some("a"), Behavior::Pages(vec![vec!["settings"]])),
    );

    let err = client(cluster)
        .list(&ListOptions {
            resources: vec![pods(), configmaps()],
            namespaces: namespaces(&["a", "b"]),
        })
        .await
        .unwrap_err();

    match err {
        Error::List { resource, scope, .. } => {
            assert_eq!(resource.name, "pods");
            assert_eq!(scope, ListScope::Namespace("b".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_duplicate_namespaces_are_listed_once() {
    let cluster = Arc::new(FakeCluster::new());

    client(cluster.clone())
        .list(&ListOptions {
            resources: vec![pods(), configmaps()],
            namespaces: namespaces(&["a", "b", "a", "b", "a"]),
        })
        .await
        .unwrap();

    for resource in ["pods", "configmaps"] {
        assert_eq!(cluster.passes(resource, Some("a")), 1);
        assert_eq!(cluster.passes(resource, Some("b")), 1);
        assert_eq!(cluster.passes(resource, None), 0);
    }
    assert_eq!(cluster.calls().len(), 4);
}

#[tokio::test]
async fn test_duplicate_resources_are_listed_once() {
    let cluster = Arc::new(
        FakeCluster::new()
            .on("pods", Some("a"), Behavior::Pages(vec![vec!["web-0"]]))
            .on("nodes", None, Behavior::Pages(vec![vec!["node-a"]])),
    );

    let objects = client(cluster.clone())
        .list(&ListOptions {
            resources: vec![pods(), nodes(), pods(), nodes()],
            namespaces: namespaces(&["a"]),
        })
        .await
        .unwrap();

    assert_eq!(keys(&objects), vec!["/node-a", "a/web-0"]);
    assert_eq!(cluster.passes("pods", Some("a")), 1);
    assert_eq!(cluster.passes("nodes", None), 1);
    assert_eq!(cluster.calls().len(), 2);
}

#[tokio::test]
async fn test_empty_namespace_adds_cluster_pass() {
    let cluster = Arc::new(
        FakeCluster::new()
            .on("pods", None, Behavior::Pages(vec![vec!["web-0"]]))
            .on("configmaps", None, Behavior::Forbidden)
            .on("configmaps", Some("a"), Behavior::Pages(vec![vec!["settings"]])),
    );

    let objects = client(cluster.clone())
        .list(&ListOptions {
            resources: vec![pods(), configmaps()],
            namespaces: namespaces(&["a", ""]),
        })
        .await
        .unwrap();

    // pods succeeded at cluster scope so no namespace pass follows
    assert_eq!(cluster.passes("pods", None), 1);
    assert_eq!(cluster.passes("pods", Some("a")), 0);
    // configmaps fell back to the namespace after the cluster-scope denial
    assert_eq!(cluster.passes("configmaps", None), 1);
    assert_eq!(cluster.passes("configmaps", Some("a")), 1);
    assert_eq!(keys(&objects), vec!["/web-0", "a/settings"]);
}

#[tokio::test]
async fn test_forbidden_cluster_scoped_resource_yields_nothing() {
    let cluster = Arc::new(
        FakeCluster::new()
            .on("nodes", None, Behavior::Forbidden)
            .on("pods", None, Behavior::Pages(vec![vec!["web-0"]])),
    );

    let objects = client(cluster)
        .list(&ListOptions {
            resources: vec![nodes(), pods()],
            namespaces: vec![],
        })
        .await
        .unwrap();

    assert_eq!(keys(&objects), vec!["/web-0"]);
}

#[tokio::test]
async fn test_cluster_scoped_resource_failure_is_final() {
    let cluster = Arc::new(FakeCluster::new().on("nodes", None, Behavior::Fail(503)));

    let err = client(cluster.clone())
        .list(&ListOptions {
            resources: vec![nodes()],
            namespaces: namespaces(&["", "a"]),
        })
        .await
        .unwrap_err();

    assert!(!err.is_forbidden());
    assert_eq!(cluster.calls().len(), 1);
}

#[tokio::test]
async fn test_cluster_scoped_resource_listed_once_for_namespaces() {
    let cluster = Arc::new(
        FakeCluster::new().on("nodes", None, Behavior::Pages(vec![vec!["node-a"]])),
    );

    let objects = client(cluster.clone())
        .list(&ListOptions {
            resources: vec![nodes()],
            namespaces: namespaces(&["a", "b"]),
        })
        .await
        .unwrap();

    assert_eq!(keys(&objects), vec!["/node-a"]);
    assert_eq!(cluster.calls().len(), 1);
    assert_eq!(cluster.passes("nodes", None), 1);
}

#[tokio::test]
async fn test_namespaced_forbidden_without_namespaces_is_empty() {
    let cluster = Arc::new(FakeCluster::new().on("pods", None, Behavior::Forbidden));

    let objects = client(cluster.clone())
        .list(&ListOptions {
            resources: vec![pods()],
            namespaces: vec![],
        })
        .await
        .unwrap();

    assert!(objects.is_empty());
    assert_eq!(cluster.calls().len(), 1);
}

#[tokio::test]
async fn test_failure_cancels_hanging_branches() {
    let cluster = Arc::new(
        FakeCluster::new()
            .on("pods", None, Behavior::Hang)
            .on("configmaps", None, Behavior::Fail(500)),
    );

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client(cluster).list(&ListOptions {
            resources: vec![pods(), configmaps()],
            namespaces: vec![],
        }),
    )
    .await
    .expect("listing should stop once a branch fails");

    match result {
        Err(Error::List { resource, .. }) => assert_eq!(resource.name, "configmaps"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_failure_cancels_sibling_namespaces() {
    let cluster = Arc::new(
        FakeCluster::new()
            .on("pods", Some("a"), Behavior::Hang)
            .on("pods", Some("b"), Behavior::Fail(500)),
    );

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client(cluster).list(&ListOptions {
            resources: vec![pods()],
            namespaces: namespaces(&["a", "b"]),
        }),
    )
    .await
    .expect("listing should stop once a namespace fails");

    assert!(matches!(result, Err(Error::List { .. })));
}

#[tokio::test]
async fn test_caller_cancellation() {
    let cluster = Arc::new(FakeCluster::new().on("pods", None, Behavior::Hang));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client(cluster).list_with_cancellation(
            &ListOptions {
                resources: vec![pods()],
                namespaces: vec![],
            },
            &cancel,
        ),
    )
    .await
    .expect("listing should observe cancellation");

    assert!(matches!(result, Err(Error::Cancelled)));
}

#[tokio::test]
async fn test_already_cancelled_makes_no_requests() {
    let cluster = Arc::new(FakeCluster::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client(cluster.clone())
        .list_with_cancellation(
            &ListOptions {
                resources: vec![pods(), configmaps()],
                namespaces: namespaces(&["a"]),
            },
            &cancel,
        )
        .await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(cluster.calls().is_empty());
}
