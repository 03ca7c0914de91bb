use std::sync::Arc;

use kube::ResourceExt;
use tracing::{debug, info};

use super::{AgentInstaller, InstanceLookup};
use crate::akuity::{AkuityClient, PollPolicy, collect_manifests, wait_until_settled};
use crate::bridge::{cluster_observation, cluster_to_canonical, cluster_to_wire};
use crate::convergence::{Observation, is_up_to_date, readiness};
use crate::crd::{Cluster, ClusterSpec, EXTERNAL_NAME_ANNOTATION, external_name, set_condition};
use crate::error::Error;
use crate::late_init::late_initialize_cluster;
use crate::normalize::normalize_cluster;

pub struct ClusterClient {
    akuity: Arc<dyn AkuityClient>,
    instances: Arc<dyn InstanceLookup>,
    installer: Arc<dyn AgentInstaller>,
    poll: PollPolicy,
}

impl ClusterClient {
    pub fn new(
        akuity: Arc<dyn AkuityClient>,
        instances: Arc<dyn InstanceLookup>,
        installer: Arc<dyn AgentInstaller>,
        poll: PollPolicy,
    ) -> Self {
        Self {
            akuity,
            instances,
            installer,
            poll,
        }
    }

    /// The platform id of the instance the cluster belongs to. An explicit
    /// id wins over the instance reference.
    pub async fn instance_id(&self, spec: &ClusterSpec) -> Result<String, Error> {
        if let Some(id) = spec.instance_id.as_deref().filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }

        let reference = spec
            .instance_ref
            .as_ref()
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::Config("one of instanceId or instanceRef must be provided".into())
            })?;

        let name = self.instances.instance_name(reference).await?;
        let instance = self.akuity.get_instance(&name).await?;
        Ok(instance.id)
    }

    pub async fn observe(&self, cr: &mut Cluster, instance_id: &str) -> Result<Observation, Error> {
        let Some(name) = external_name(cr) else {
            return Ok(Observation::absent());
        };

        let remote = match self.akuity.get_cluster(instance_id, &name).await {
            Ok(remote) => remote,
            Err(error) => {
                // Permission denied looks the same as not found here.
                debug!(%error, cluster = %name, "cluster read failed, treating as not found");
                return Ok(Observation::absent());
            }
        };

        let canonical = cluster_to_canonical(&remote, &cr.spec)?;
        late_initialize_cluster(&mut cr.spec, &canonical)?;

        let at_provider = cluster_observation(&remote)?;
        let ready = readiness(at_provider.health_status.code);
        let status = cr.status.get_or_insert_with(Default::default);
        status.at_provider = Some(at_provider);
        set_condition(status.conditions.get_or_insert_with(Vec::new), ready);

        let up_to_date = is_up_to_date(&cr.spec, &canonical, |d, o| normalize_cluster(d, o))?;
        Ok(Observation::present(up_to_date))
    }

    pub async fn create(&self, cr: &mut Cluster, instance_id: &str) -> Result<(), Error> {
        let wire = cluster_to_wire(&cr.spec)?;
        self.akuity.apply_cluster(instance_id, &wire).await?;
        info!(cluster = %wire.metadata.name, %instance_id, "cluster created");

        if cr.spec.has_target_access() {
            let manifests = self.agent_manifests(instance_id, &cr.spec.name).await?;
            let applied = self
                .installer
                .apply_manifests(&cr.spec, &manifests, false)
                .await?;
            info!(cluster = %cr.spec.name, documents = applied, "agent installed");
        }

        cr.annotations_mut()
            .insert(EXTERNAL_NAME_ANNOTATION.into(), wire.metadata.name);
        Ok(())
    }

    pub async fn update(&self, cr: &Cluster, instance_id: &str) -> Result<(), Error> {
        let wire = cluster_to_wire(&cr.spec)?;
        self.akuity.apply_cluster(instance_id, &wire).await?;
        info!(cluster = %wire.metadata.name, %instance_id, "cluster updated");
        Ok(())
    }

    pub async fn delete(&self, cr: &Cluster, instance_id: &str) -> Result<(), Error> {
        let Some(name) = external_name(cr) else {
            return Ok(());
        };

        if cr.spec.remove_agent_resources_on_destroy && cr.spec.has_target_access() {
            let manifests = self.agent_manifests(instance_id, &cr.spec.name).await?;
            let removed = self
                .installer
                .apply_manifests(&cr.spec, &manifests, true)
                .await?;
            info!(cluster = %cr.spec.name, documents = removed, "agent removed");
        }

        self.akuity.delete_cluster(instance_id, &name).await?;
        info!(cluster = %name, %instance_id, "cluster deleted");
        Ok(())
    }

    async fn agent_manifests(&self, instance_id: &str, name: &str) -> Result<String, Error> {
        let cluster = wait_until_settled(self.akuity.as_ref(), instance_id, name, self.poll).await?;
        let stream = self
            .akuity
            .get_cluster_manifests(instance_id, &cluster.id)
            .await?;
        Ok(collect_manifests(stream).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::akuity::RemoteError;
    use crate::akuity::fake::FakeAkuity;
    use crate::akuity::types::{Instance, ExportedInstance};
    use crate::crd::{Condition, NameRef};
    use crate::external::fake::FakeKube;
    use crate::fixtures::cluster_spec;

    const MANIFEST: &str = "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: akuity\n---\napiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: akuity-agent\n  namespace: akuity\n";

    fn client(akuity: &Arc<FakeAkuity>, kube: &Arc<FakeKube>) -> ClusterClient {
        ClusterClient::new(
            akuity.clone(),
            kube.clone(),
            kube.clone(),
            PollPolicy::default(),
        )
    }

    fn resource() -> Cluster {
        Cluster::new("prod", cluster_spec())
    }

    #[tokio::test]
    async fn missing_external_name_means_absent() {
        let akuity = Arc::new(FakeAkuity::default());
        let kube = Arc::new(FakeKube::default());
        let mut cr = resource();

        let obs = client(&akuity, &kube).observe(&mut cr, "inst-1").await.unwrap();
        assert_eq!(obs, Observation::absent());
        assert!(akuity.calls().is_empty());
    }

    #[tokio::test]
    async fn create_installs_agent_and_converges() {
        let akuity = Arc::new(FakeAkuity::default().with_manifests("id-prod", &[MANIFEST]));
        let kube = Arc::new(FakeKube::default());
        let clusters = client(&akuity, &kube);
        let mut cr = resource();

        clusters.create(&mut cr, "inst-1").await.unwrap();

        assert_eq!(external_name(&cr).as_deref(), Some("prod"));
        assert_eq!(kube.applied(), vec![(MANIFEST.to_string(), false)]);
        assert_eq!(
            akuity.calls(),
            vec![
                "apply_cluster:inst-1/prod",
                "get_cluster:inst-1/prod",
                "get_cluster_manifests:inst-1/id-prod",
            ]
        );

        let obs = clusters.observe(&mut cr, "inst-1").await.unwrap();
        assert_eq!(obs, Observation::present(true));

        let status = cr.status.as_ref().unwrap();
        let at_provider = status.at_provider.as_ref().unwrap();
        assert_eq!(at_provider.id, "id-prod");
        assert_eq!(at_provider.agent_size, "large");
        assert_eq!(status.conditions.as_ref().unwrap()[0], Condition::available());
    }

    #[tokio::test]
    async fn create_without_target_access_skips_agent() {
        let akuity = Arc::new(FakeAkuity::default());
        let kube = Arc::new(FakeKube::default());
        let mut cr = resource();
        cr.spec.kubeconfig_secret_ref = None;

        client(&akuity, &kube).create(&mut cr, "inst-1").await.unwrap();
        assert!(kube.applied().is_empty());
        assert_eq!(akuity.calls(), vec!["apply_cluster:inst-1/prod"]);
    }

    #[tokio::test]
    async fn drift_is_detected_and_fixed_by_update() {
        let akuity = Arc::new(FakeAkuity::default());
        let kube = Arc::new(FakeKube::default());
        let clusters = client(&akuity, &kube);
        let mut cr = resource();
        cr.spec.kubeconfig_secret_ref = None;
        clusters.create(&mut cr, "inst-1").await.unwrap();

        cr.spec.cluster_spec.description = Some("staging".into());
        let obs = clusters.observe(&mut cr, "inst-1").await.unwrap();
        assert_eq!(obs, Observation::present(false));

        clusters.update(&cr, "inst-1").await.unwrap();
        let obs = clusters.observe(&mut cr, "inst-1").await.unwrap();
        assert_eq!(obs, Observation::present(true));
        assert_eq!(akuity.stored_cluster("prod").unwrap().description, "staging");
    }

    #[tokio::test]
    async fn observe_late_initializes_unset_fields() {
        let akuity = Arc::new(FakeAkuity::default());
        let kube = Arc::new(FakeKube::default());
        let clusters = client(&akuity, &kube);
        let mut cr = resource();
        cr.spec.kubeconfig_secret_ref = None;
        clusters.create(&mut cr, "inst-1").await.unwrap();

        cr.spec.cluster_spec.data.target_version = None;
        cr.spec.namespace = None;
        let obs = clusters.observe(&mut cr, "inst-1").await.unwrap();

        assert_eq!(obs, Observation::present(true));
        assert_eq!(cr.spec.cluster_spec.data.target_version.as_deref(), Some("0.5.0"));
        assert_eq!(cr.spec.namespace.as_deref(), Some("akuity"));
    }

    #[tokio::test]
    async fn manifest_stream_errors_abort_create() {
        let akuity = Arc::new(
            FakeAkuity::default()
                .with_manifests("id-prod", &[MANIFEST])
                .fail_manifests(RemoteError::Transport("stream reset".into())),
        );
        let kube = Arc::new(FakeKube::default());
        let mut cr = resource();

        let err = client(&akuity, &kube)
            .create(&mut cr, "inst-1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
        assert!(kube.applied().is_empty());
        assert_eq!(external_name(&cr), None);
    }

    #[tokio::test]
    async fn any_read_failure_means_absent() {
        let akuity = Arc::new(
            FakeAkuity::default().fail_get_cluster(RemoteError::Transport("permission denied".into())),
        );
        let kube = Arc::new(FakeKube::default());
        let mut cr = resource();
        cr.annotations_mut()
            .insert(EXTERNAL_NAME_ANNOTATION.into(), "prod".into());

        let obs = client(&akuity, &kube).observe(&mut cr, "inst-1").await.unwrap();
        assert_eq!(obs, Observation::absent());
        assert!(cr.status.is_none());
    }

    #[tokio::test]
    async fn delete_removes_agent_before_the_cluster() {
        let akuity = Arc::new(FakeAkuity::default().with_manifests("id-prod", &[MANIFEST]));
        let kube = Arc::new(FakeKube::default());
        let clusters = client(&akuity, &kube);
        let mut cr = resource();
        clusters.create(&mut cr, "inst-1").await.unwrap();

        clusters.delete(&cr, "inst-1").await.unwrap();

        assert_eq!(kube.applied().last(), Some(&(MANIFEST.to_string(), true)));
        assert_eq!(akuity.calls().last().map(String::as_str), Some("delete_cluster:inst-1/prod"));
        assert!(akuity.stored_cluster("prod").is_none());
    }

    #[tokio::test]
    async fn delete_keeps_agent_unless_asked() {
        let akuity = Arc::new(FakeAkuity::default());
        let kube = Arc::new(FakeKube::default());
        let clusters = client(&akuity, &kube);
        let mut cr = resource();
        cr.spec.remove_agent_resources_on_destroy = false;
        cr.spec.kubeconfig_secret_ref = None;
        clusters.create(&mut cr, "inst-1").await.unwrap();
        cr.spec.kubeconfig_secret_ref = cluster_spec().kubeconfig_secret_ref;

        clusters.delete(&cr, "inst-1").await.unwrap();
        assert!(kube.applied().is_empty());
        assert_eq!(
            akuity.calls(),
            vec!["apply_cluster:inst-1/prod", "delete_cluster:inst-1/prod"]
        );
    }

    #[tokio::test]
    async fn delete_without_external_name_does_nothing() {
        let akuity = Arc::new(FakeAkuity::default());
        let kube = Arc::new(FakeKube::default());
        client(&akuity, &kube).delete(&resource(), "inst-1").await.unwrap();
        assert!(akuity.calls().is_empty());
    }

    #[tokio::test]
    async fn instance_id_resolution() {
        let akuity = Arc::new(FakeAkuity::default().with_instance(
            Instance {
                id: "inst-42".into(),
                name: "argocd".into(),
                ..Default::default()
            },
            ExportedInstance::default(),
        ));
        let kube = Arc::new(FakeKube::default().with_instance("my-argocd", "argocd"));
        let clusters = client(&akuity, &kube);

        let mut spec = cluster_spec();
        assert_eq!(clusters.instance_id(&spec).await.unwrap(), "inst-1");

        spec.instance_id = None;
        spec.instance_ref = Some(NameRef {
            name: "my-argocd".into(),
        });
        assert_eq!(clusters.instance_id(&spec).await.unwrap(), "inst-42");

        spec.instance_ref = Some(NameRef {
            name: "unknown".into(),
        });
        assert!(clusters.instance_id(&spec).await.unwrap_err().is_not_found());

        spec.instance_ref = None;
        assert!(matches!(
            clusters.instance_id(&spec).await,
            Err(Error::Config(_))
        ));
    }
}
