//! In-memory platform used by tests. Writes are folded into the stored
//! objects the way the platform would report them back.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::{
    ApplyInstanceRequest, Cluster, ClusterData, ClusterManifest, ExportedInstance, Instance,
    RECONCILIATION_SUCCESSFUL, StatusCode,
};
use super::{AkuityClient, ManifestStream, RemoteError};
use crate::crd::ClusterSize;

#[derive(Default)]
struct State {
    clusters: BTreeMap<String, Cluster>,
    scripted_reads: BTreeMap<String, VecDeque<Result<i32, RemoteError>>>,
    cluster_reads: BTreeMap<String, usize>,
    manifests: BTreeMap<String, Vec<String>>,
    manifest_error: Option<RemoteError>,
    instances: BTreeMap<String, Instance>,
    exports: BTreeMap<String, ExportedInstance>,
    get_cluster_error: Option<RemoteError>,
    get_instance_error: Option<RemoteError>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeAkuity {
    state: Mutex<State>,
}

impl FakeAkuity {
    pub fn with_instance(self, instance: Instance, export: ExportedInstance) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.exports.insert(instance.name.clone(), export);
            state.instances.insert(instance.name.clone(), instance);
        }
        self
    }

    pub fn with_manifests(self, cluster_id: &str, chunks: &[&str]) -> Self {
        self.state.lock().unwrap().manifests.insert(
            cluster_id.to_string(),
            chunks.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn fail_manifests(self, err: RemoteError) -> Self {
        self.state.lock().unwrap().manifest_error = Some(err);
        self
    }

    pub fn fail_get_cluster(self, err: RemoteError) -> Self {
        self.state.lock().unwrap().get_cluster_error = Some(err);
        self
    }

    pub fn fail_get_instance(self, err: RemoteError) -> Self {
        self.state.lock().unwrap().get_instance_error = Some(err);
        self
    }

    /// Queues reconciliation codes (or errors) returned by successive reads.
    pub fn script_cluster_reads(&self, name: &str, reads: Vec<Result<i32, RemoteError>>) {
        self.state
            .lock()
            .unwrap()
            .scripted_reads
            .insert(name.to_string(), reads.into());
    }

    pub fn cluster_reads(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .cluster_reads
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn stored_cluster(&self, name: &str) -> Option<Cluster> {
        self.state.lock().unwrap().clusters.get(name).cloned()
    }
}

/// How the platform reports a cluster after applying its manifest.
pub fn cluster_from_manifest(manifest: &ClusterManifest) -> Cluster {
    let size = match manifest.spec.data.size.as_str() {
        "small" => ClusterSize::Small.code(),
        "medium" => ClusterSize::Medium.code(),
        "large" => ClusterSize::Large.code(),
        _ => 0,
    };
    let data = &manifest.spec.data;

    Cluster {
        id: format!("id-{}", manifest.metadata.name),
        name: manifest.metadata.name.clone(),
        description: manifest.spec.description.clone(),
        namespace: manifest.metadata.namespace.clone(),
        namespace_scoped: manifest.spec.namespace_scoped,
        data: ClusterData {
            size,
            auto_upgrade_disabled: data.auto_upgrade_disabled,
            kustomization: data.kustomization.clone(),
            app_replication: data.app_replication,
            target_version: data.target_version.clone(),
            redis_tunneling: data.redis_tunneling,
            multi_cluster_k8s_dashboard_enabled: data.multi_cluster_k8s_dashboard_enabled,
            labels: manifest.metadata.labels.clone(),
            annotations: manifest.metadata.annotations.clone(),
        },
        agent_state: None,
        health_status: Some(StatusCode {
            code: 1,
            message: String::new(),
        }),
        reconciliation_status: Some(StatusCode {
            code: RECONCILIATION_SUCCESSFUL,
            message: String::new(),
        }),
    }
}

/// How the platform reports an instance and its export after an apply.
pub fn instance_from_request(request: &ApplyInstanceRequest) -> (Instance, ExportedInstance) {
    let instance = Instance {
        id: format!("id-{}", request.id),
        name: request.id.clone(),
        description: request.argocd.spec.description.clone(),
        version: request.argocd.spec.version.clone(),
        hostname: format!("{}.cd.akuity.cloud", request.id),
        cluster_count: 0,
        owner_organization_name: "acme".into(),
        health_status: Some(StatusCode {
            code: 1,
            message: String::new(),
        }),
        reconciliation_status: Some(StatusCode {
            code: RECONCILIATION_SUCCESSFUL,
            message: String::new(),
        }),
        spec: Some(request.argocd.spec.instance_spec.clone()),
    };
    let export = ExportedInstance {
        argocd_configmap: request.argocd_configmap.clone(),
        argocd_rbac_configmap: request.argocd_rbac_configmap.clone(),
        notifications_configmap: request.notifications_configmap.clone(),
        image_updater_configmap: request.image_updater_configmap.clone(),
        image_updater_ssh_configmap: request.image_updater_ssh_configmap.clone(),
        argocd_known_hosts_configmap: request.argocd_known_hosts_configmap.clone(),
        argocd_tls_certs_configmap: request.argocd_tls_certs_configmap.clone(),
        config_management_plugins: request.config_management_plugins.clone(),
    };
    (instance, export)
}

#[async_trait]
impl AkuityClient for FakeAkuity {
    async fn get_cluster(&self, instance_id: &str, name: &str) -> Result<Cluster, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_cluster:{instance_id}/{name}"));
        *state.cluster_reads.entry(name.to_string()).or_default() += 1;

        if let Some(err) = state.get_cluster_error.clone() {
            return Err(err);
        }

        let scripted = state
            .scripted_reads
            .get_mut(name)
            .and_then(|reads| reads.pop_front());
        match scripted {
            Some(Ok(code)) => {
                let mut cluster = state.clusters.get(name).cloned().unwrap_or_else(|| Cluster {
                    id: format!("id-{name}"),
                    name: name.to_string(),
                    ..Default::default()
                });
                cluster.reconciliation_status = Some(StatusCode {
                    code,
                    message: String::new(),
                });
                Ok(cluster)
            }
            Some(Err(err)) => Err(err),
            None => state
                .clusters
                .get(name)
                .cloned()
                .ok_or_else(|| RemoteError::NotFound(format!("cluster {name}"))),
        }
    }

    async fn get_cluster_manifests(
        &self,
        instance_id: &str,
        cluster_id: &str,
    ) -> Result<ManifestStream, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("get_cluster_manifests:{instance_id}/{cluster_id}"));

        let chunks = state.manifests.get(cluster_id).cloned().unwrap_or_default();
        let (data_tx, data) = mpsc::channel(chunks.len().max(1));
        let (err_tx, errors) = mpsc::channel(1);
        for chunk in chunks {
            let _ = data_tx.try_send(chunk.into_bytes());
        }
        if let Some(err) = state.manifest_error.clone() {
            let _ = err_tx.try_send(err);
        }
        Ok(ManifestStream { data, errors })
    }

    async fn apply_cluster(
        &self,
        instance_id: &str,
        cluster: &ClusterManifest,
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!(
            "apply_cluster:{instance_id}/{}",
            cluster.metadata.name
        ));
        state
            .clusters
            .insert(cluster.metadata.name.clone(), cluster_from_manifest(cluster));
        Ok(())
    }

    async fn delete_cluster(&self, instance_id: &str, name: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete_cluster:{instance_id}/{name}"));
        state
            .clusters
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RemoteError::NotFound(format!("cluster {name}")))
    }

    async fn get_instance(&self, name: &str) -> Result<Instance, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get_instance:{name}"));
        if let Some(err) = state.get_instance_error.clone() {
            return Err(err);
        }
        state
            .instances
            .get(name)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("instance {name}")))
    }

    async fn export_instance(&self, name: &str) -> Result<ExportedInstance, RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("export_instance:{name}"));
        state
            .exports
            .get(name)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("instance {name}")))
    }

    async fn apply_instance(&self, request: &ApplyInstanceRequest) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("apply_instance:{}", request.id));
        let (instance, export) = instance_from_request(request);
        state.exports.insert(request.id.clone(), export);
        state.instances.insert(request.id.clone(), instance);
        Ok(())
    }

    async fn delete_instance(&self, name: &str) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete_instance:{name}"));
        state.exports.remove(name);
        state
            .instances
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RemoteError::NotFound(format!("instance {name}")))
    }
}
