//! Error types
//!
//! `ApiError` classifies a single backend failure. `Error` is what the
//! resolve/get/list operations return, carrying the resource and scope
//! context needed to render a precise diagnostic.

use crate::mapper::ResolutionError;
use crate::resource::{ListScope, ResourceDescriptor};

/// A failure reported by one of the backend providers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server responded with status {code}: {message}")]
    Server { code: u16, message: String },

    #[error(transparent)]
    Kube(kube::Error),
}

impl ApiError {
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ApiError::Forbidden(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

impl From<kube::Error> for ApiError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => match response.code {
                403 => ApiError::Forbidden(response.message),
                404 => ApiError::NotFound(response.message),
                code => ApiError::Server {
                    code,
                    message: response.message,
                },
            },
            other => ApiError::Kube(other),
        }
    }
}

/// Errors returned by [`ResourceClient`](crate::ResourceClient) operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("failed to discover API resources: {0}")]
    Discovery(#[source] ApiError),

    #[error(
        "no access to list resource type \"{}\" in API group \"{}\" {scope}",
        .resource.name,
        .resource.group
    )]
    Forbidden {
        resource: ResourceDescriptor,
        scope: ListScope,
        #[source]
        source: ApiError,
    },

    #[error(
        "failed to list resource type \"{}\" in API group \"{}\" {scope}: {source}",
        .resource.name,
        .resource.group
    )]
    List {
        resource: ResourceDescriptor,
        scope: ListScope,
        #[source]
        source: ApiError,
    },

    #[error(
        "failed to get \"{name}\" of resource type \"{}\" in API group \"{}\" {scope}: {source}",
        .resource.name,
        .resource.group
    )]
    Get {
        name: String,
        resource: ResourceDescriptor,
        scope: ListScope,
        #[source]
        source: ApiError,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("listing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// True when the failure is an authorization denial from the server
    pub fn is_forbidden(&self) -> bool {
        match self {
            Error::Forbidden { .. } => true,
            Error::Get { source, .. } => source.is_forbidden(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Get { source, .. } if source.is_not_found())
    }
}

/// Result type for resource operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
