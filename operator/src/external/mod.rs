mod cluster;
mod instance;

pub use cluster::ClusterClient;
pub use instance::InstanceClient;

use async_trait::async_trait;
use kube::{Api, Client};

use crate::crd::{ClusterSpec, Instance};
use crate::error::Error;
use crate::manifest::{DiscoveryMapper, KubeTarget, ManifestApplier, target_client};
use crate::metrics::Metrics;

#[async_trait]
pub trait InstanceLookup: Send + Sync {
    async fn instance_name(&self, resource_name: &str) -> Result<String, Error>;
}

/// Applies or removes agent manifests on the workload cluster of a Cluster.
#[async_trait]
pub trait AgentInstaller: Send + Sync {
    async fn apply_manifests(
        &self,
        cluster: &ClusterSpec,
        manifests: &str,
        delete: bool,
    ) -> Result<usize, Error>;
}

#[derive(Clone)]
pub struct KubeAccess {
    client: Client,
    metrics: Metrics,
}

impl KubeAccess {
    pub fn new(client: Client, metrics: Metrics) -> Self {
        Self { client, metrics }
    }
}

#[async_trait]
impl InstanceLookup for KubeAccess {
    async fn instance_name(&self, resource_name: &str) -> Result<String, Error> {
        let api: Api<Instance> = Api::all(self.client.clone());
        let instance = api.get_opt(resource_name).await?.ok_or_else(|| {
            Error::NotFound(format!("instance with instanceRef {resource_name}"))
        })?;
        Ok(instance.spec.name)
    }
}

#[async_trait]
impl AgentInstaller for KubeAccess {
    async fn apply_manifests(
        &self,
        cluster: &ClusterSpec,
        manifests: &str,
        delete: bool,
    ) -> Result<usize, Error> {
        let client = target_client(&self.client, cluster).await?;
        let mapper = DiscoveryMapper::new(client.clone()).await?;
        let count = ManifestApplier::new(KubeTarget::new(client), mapper)
            .apply(manifests, delete)
            .await?;
        self.metrics.documents(delete, count);
        Ok(count)
    }
}
