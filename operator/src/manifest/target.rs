use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    Api, Client, Config,
    api::{DeleteParams, DynamicObject, Patch, PatchParams},
    config::{KubeConfigOptions, Kubeconfig},
    core::{ApiResource, GroupVersionKind},
    discovery::Discovery,
};
use serde_json::{Value, json};
use tracing::debug;

use super::{ClusterTarget, FIELD_MANAGER, Location, ResourceMapper, TargetError};
use crate::crd::ClusterSpec;
use crate::error::Error;

pub const KUBECONFIG_KEY: &str = "kubeconfig";

/// Builds a client for the workload cluster of `cluster`, either from the
/// in-cluster service account or from a kubeconfig secret.
pub async fn target_client(kube: &Client, cluster: &ClusterSpec) -> Result<Client, Error> {
    let config = if cluster.enable_in_cluster_kubeconfig {
        Config::incluster()
            .map_err(|e| Error::Config(format!("could not build in cluster kube config: {e}")))?
    } else {
        let secret_ref = cluster.kubeconfig_secret_ref.as_ref().ok_or_else(|| {
            Error::Config("kubeconfigSecretRef must be set without in cluster kubeconfig".into())
        })?;
        let secrets: Api<Secret> = Api::namespaced(kube.clone(), &secret_ref.namespace);
        let secret = secrets.get(&secret_ref.name).await?;

        let raw = secret
            .data
            .as_ref()
            .and_then(|d| d.get(KUBECONFIG_KEY))
            .ok_or_else(|| {
                Error::Config(format!(
                    "secret {} in namespace {} has no {KUBECONFIG_KEY} key",
                    secret_ref.name, secret_ref.namespace
                ))
            })?;
        let text = std::str::from_utf8(&raw.0)
            .map_err(|e| Error::Config(format!("kubeconfig is not UTF-8: {e}")))?;
        let kubeconfig = Kubeconfig::from_yaml(text)
            .map_err(|e| Error::Config(format!("could not parse kubeconfig: {e}")))?;
        Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| Error::Config(format!("could not load kubeconfig: {e}")))?
    };

    Ok(Client::try_from(config)?)
}

pub struct DiscoveryMapper {
    discovery: Discovery,
}

impl DiscoveryMapper {
    pub async fn new(client: Client) -> Result<Self, Error> {
        let discovery = Discovery::new(client).run().await?;
        Ok(Self { discovery })
    }
}

impl ResourceMapper for DiscoveryMapper {
    fn resolve(&self, gvk: &GroupVersionKind) -> Option<ApiResource> {
        self.discovery.resolve_gvk(gvk).map(|(ar, _caps)| ar)
    }
}

pub struct KubeTarget {
    client: Client,
}

impl KubeTarget {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, at: &Location) -> Api<DynamicObject> {
        match &at.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &at.resource),
            None => Api::all_with(self.client.clone(), &at.resource),
        }
    }
}

fn target_error(at: &Location, err: kube::Error) -> TargetError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => {
            TargetError::NotFound(format!("{} {}", at.resource.kind, at.name))
        }
        other => TargetError::Request(other.to_string()),
    }
}

#[async_trait]
impl ClusterTarget for KubeTarget {
    async fn get(&self, at: &Location) -> Result<Value, TargetError> {
        let obj = self
            .api(at)
            .get(&at.name)
            .await
            .map_err(|e| target_error(at, e))?;
        serde_json::to_value(obj).map_err(|e| TargetError::Request(e.to_string()))
    }

    async fn apply(&self, at: &Location, body: &Value) -> Result<(), TargetError> {
        self.api(at)
            .patch(&at.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Apply(body))
            .await
            .map_err(|e| target_error(at, e))?;
        debug!(kind = %at.resource.kind, name = %at.name, "applied");
        Ok(())
    }

    async fn patch_metadata(&self, at: &Location, metadata: &Value) -> Result<(), TargetError> {
        let params = PatchParams {
            field_manager: Some(FIELD_MANAGER.into()),
            ..Default::default()
        };
        let patch = json!({ "metadata": metadata });
        self.api(at)
            .patch(&at.name, &params, &Patch::Merge(&patch))
            .await
            .map_err(|e| target_error(at, e))?;
        Ok(())
    }

    async fn delete(&self, at: &Location) -> Result<(), TargetError> {
        self.api(at)
            .delete(&at.name, &DeleteParams::default())
            .await
            .map_err(|e| target_error(at, e))?;
        debug!(kind = %at.resource.kind, name = %at.name, "deleted");
        Ok(())
    }
}
