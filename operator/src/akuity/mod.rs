//! Seam to the Akuity Platform API.
//!
//! The transport behind [`AkuityClient`] is provided by the embedding binary;
//! this crate only depends on the trait.

mod poll;
mod stream;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use poll::{PollPolicy, wait_until_settled};
pub use stream::collect_manifests;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::error::Error;
use types::{ApplyInstanceRequest, Cluster, ClusterManifest, ExportedInstance, Instance};

pub const DEFAULT_SERVER_URL: &str = "https://akuity.cloud/";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("{0} was not found")]
    NotFound(String),
    #[error("{0} has not yet been reconciled")]
    NotReconciled(String),
    #[error("{0}")]
    Transport(String),
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }

    pub fn is_not_reconciled(&self) -> bool {
        matches!(self, RemoteError::NotReconciled(_))
    }
}

/// Paired channels of a server-streamed manifest download. The data channel
/// carries raw chunks in order, the error channel carries server failures.
pub struct ManifestStream {
    pub data: mpsc::Receiver<Vec<u8>>,
    pub errors: mpsc::Receiver<RemoteError>,
}

#[async_trait]
pub trait AkuityClient: Send + Sync {
    async fn get_cluster(&self, instance_id: &str, name: &str) -> Result<Cluster, RemoteError>;

    /// Opens the agent manifest stream of a cluster, addressed by cluster id.
    async fn get_cluster_manifests(
        &self,
        instance_id: &str,
        cluster_id: &str,
    ) -> Result<ManifestStream, RemoteError>;

    async fn apply_cluster(
        &self,
        instance_id: &str,
        cluster: &ClusterManifest,
    ) -> Result<(), RemoteError>;

    async fn delete_cluster(&self, instance_id: &str, name: &str) -> Result<(), RemoteError>;

    async fn get_instance(&self, name: &str) -> Result<Instance, RemoteError>;

    async fn export_instance(&self, name: &str) -> Result<ExportedInstance, RemoteError>;

    async fn apply_instance(&self, request: &ApplyInstanceRequest) -> Result<(), RemoteError>;

    async fn delete_instance(&self, name: &str) -> Result<(), RemoteError>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub organization_id: String,
    pub api_key_id: String,
    pub api_key_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("organization_id", &self.organization_id)
            .field("api_key_id", &self.api_key_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(
        organization_id: impl Into<String>,
        api_key_id: impl Into<String>,
        api_key_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        let creds = Self {
            organization_id: organization_id.into(),
            api_key_id: api_key_id.into(),
            api_key_secret: api_key_secret.into(),
        };

        if creds.organization_id.is_empty() {
            return Err(Error::Config("organization ID must not be empty".into()));
        }
        if creds.api_key_id.is_empty() {
            return Err(Error::Config("API key ID must not be empty".into()));
        }
        if creds.api_key_secret.is_empty() {
            return Err(Error::Config("API key secret must not be empty".into()));
        }

        Ok(creds)
    }

    /// Value of the `Authorization` header an `AkuityClient` transport sends
    /// with every API call.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}:{}", self.api_key_id, self.api_key_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_reject_empty_parts() {
        assert!(Credentials::new("", "id", "secret").is_err());
        assert!(Credentials::new("org", "", "secret").is_err());
        assert!(Credentials::new("org", "id", "").is_err());

        let creds = Credentials::new("org", "id", "secret").unwrap();
        assert_eq!(creds.authorization_header(), "Bearer id:secret");
    }

    #[test]
    fn credentials_debug_hides_secret() {
        let creds = Credentials::new("org", "id", "hunter2").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
