use kube::Error as KubeError;
use thiserror::Error;

use crate::akuity::RemoteError;
use crate::manifest::TargetError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] KubeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("could not transform {what}: {reason}")]
    Transform { what: String, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("not reconciled: {0}")]
    NotReconciled(String),

    #[error("Akuity API error: {0}")]
    Remote(String),

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("target cluster error: {0}")]
    Target(#[from] TargetError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("finalizer error: {0}")]
    Finalizer(String),
}

impl Error {
    pub fn transform(what: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::Transform {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_not_reconciled(&self) -> bool {
        matches!(self, Error::NotReconciled(_))
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(msg) => Error::NotFound(msg),
            RemoteError::NotReconciled(msg) => Error::NotReconciled(msg),
            RemoteError::Transport(msg) => Error::Remote(msg),
        }
    }
}
