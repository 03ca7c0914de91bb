use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::StreamExt;
use kube::{
    Api, Client, Resource, ResourceExt,
    api::{Patch, PatchParams},
    core::object::{HasSpec, HasStatus},
};
use kube_runtime::{Controller, controller::Action, events::Recorder, watcher};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::akuity::AkuityClient;
use crate::config::Settings;
use crate::convergence::Observation;
use crate::crd::{Cluster, Condition, Conditioned, Instance};
use crate::error::Error;
use crate::event::{Ctx, Outcome, make_reporter, with_event};
use crate::external::{ClusterClient, InstanceClient, KubeAccess};
use crate::finalizer::{
    FINALIZER, ensure_finalizer_present, has_finalizer, is_deleting, remove_finalizer,
};
use crate::metrics::Metrics;
use crate::normalize::NormalizeRules;

#[async_trait]
pub trait External<K: Send + Sync>: Send + Sync {
    async fn observe(&self, cr: &mut K) -> Result<Observation, Error>;
    async fn create(&self, cr: &mut K) -> Result<(), Error>;
    async fn update(&self, cr: &K) -> Result<(), Error>;
    async fn delete(&self, cr: &K) -> Result<(), Error>;
}

/// Cluster operations bound to the instance id resolved for this pass.
pub struct ClusterPass<'a> {
    clusters: &'a ClusterClient,
    instance_id: String,
}

#[async_trait]
impl External<Cluster> for ClusterPass<'_> {
    async fn observe(&self, cr: &mut Cluster) -> Result<Observation, Error> {
        self.clusters.observe(cr, &self.instance_id).await
    }

    async fn create(&self, cr: &mut Cluster) -> Result<(), Error> {
        self.clusters.create(cr, &self.instance_id).await
    }

    async fn update(&self, cr: &Cluster) -> Result<(), Error> {
        self.clusters.update(cr, &self.instance_id).await
    }

    async fn delete(&self, cr: &Cluster) -> Result<(), Error> {
        self.clusters.delete(cr, &self.instance_id).await
    }
}

#[async_trait]
impl External<Instance> for InstanceClient {
    async fn observe(&self, cr: &mut Instance) -> Result<Observation, Error> {
        InstanceClient::observe(self, cr).await
    }

    async fn create(&self, cr: &mut Instance) -> Result<(), Error> {
        InstanceClient::create(self, cr).await
    }

    async fn update(&self, cr: &Instance) -> Result<(), Error> {
        InstanceClient::update(self, cr).await
    }

    async fn delete(&self, cr: &Instance) -> Result<(), Error> {
        InstanceClient::delete(self, cr).await
    }
}

pub async fn converge<K, X>(ext: &X, cr: &mut K) -> Result<Outcome, Error>
where
    K: Conditioned + Send + Sync,
    X: External<K> + ?Sized,
{
    let observation = ext.observe(cr).await?;
    if !observation.exists {
        ext.create(cr).await?;
        cr.record_condition(Condition::creating());
        return Ok(Outcome::Created);
    }
    if !observation.up_to_date {
        ext.update(cr).await?;
        return Ok(Outcome::Updated);
    }
    Ok(Outcome::NoOp)
}

pub async fn retire<K, X>(ext: &X, cr: &mut K) -> Result<Outcome, Error>
where
    K: Conditioned + Send + Sync,
    X: External<K> + ?Sized,
{
    let observation = ext.observe(cr).await?;
    cr.record_condition(Condition::deleting());
    if !observation.exists {
        return Ok(Outcome::NoOp);
    }
    ext.delete(cr).await?;
    Ok(Outcome::Deleted)
}

pub fn mark_synced<K: Conditioned>(cr: &mut K, result: &Result<Outcome, Error>) {
    let condition = match result {
        Ok(_) => Condition::reconcile_success(),
        Err(e) => Condition::reconcile_error(e.to_string()),
    };
    cr.record_condition(condition);
}

pub async fn reconcile_cluster(cr: Arc<Cluster>, ctx: Arc<Ctx>) -> Result<Action, Error> {
    let api: Api<Cluster> = Api::all(ctx.client.clone());
    match ctx.clusters.instance_id(&cr.spec).await {
        Ok(instance_id) => {
            let pass = ClusterPass {
                clusters: &ctx.clusters,
                instance_id,
            };
            drive(&api, &ctx, &cr, Ok(&pass)).await
        }
        Err(e) => drive::<Cluster, ClusterPass>(&api, &ctx, &cr, Err(e)).await,
    }
}

pub async fn reconcile_instance(cr: Arc<Instance>, ctx: Arc<Ctx>) -> Result<Action, Error> {
    let api: Api<Instance> = Api::all(ctx.client.clone());
    drive(&api, &ctx, &cr, Ok(&ctx.instances)).await
}

pub fn error_policy<K>(cr: Arc<K>, error: &Error, ctx: Arc<Ctx>) -> Action
where
    K: Resource<DynamicType = ()>,
{
    let kind = K::kind(&());
    warn!(%kind, name = %cr.name_any(), %error, "reconcile failed");
    ctx.metrics.reconciled(&kind, "error");
    Action::requeue(Duration::from_secs(10))
}

async fn drive<K, X>(
    api: &Api<K>,
    ctx: &Ctx,
    cr: &K,
    ext: Result<&X, Error>,
) -> Result<Action, Error>
where
    K: Resource<DynamicType = ()>
        + HasSpec
        + HasStatus
        + Conditioned
        + Clone
        + Serialize
        + DeserializeOwned
        + Debug
        + Send
        + Sync,
    K::Spec: Serialize + PartialEq,
    K::Status: Serialize + PartialEq,
    X: External<K> + ?Sized,
{
    let kind = K::kind(&()).to_string();
    let name = cr.name_any();
    let deleting = is_deleting(cr);

    if deleting && !has_finalizer(cr, FINALIZER) {
        return Ok(Action::await_change());
    }
    if !deleting {
        ensure_finalizer_present(api, cr).await?;
    }

    debug!(%kind, %name, deleting, "reconciling");
    let mut live = cr.clone();
    let outcome = with_event(
        ctx,
        cr,
        &format!("{kind} {name} synchronized with the Akuity Platform"),
        "ReconcileError",
        sync_pass(api, cr, &mut live, ext, deleting),
    )
    .await?;

    if deleting {
        remove_finalizer(api, cr).await?;
    }

    ctx.metrics.reconciled(&kind, outcome.as_str());
    info!(%kind, %name, outcome = outcome.as_str(), "reconciled");
    Ok(if deleting {
        Action::await_change()
    } else {
        Action::requeue(ctx.requeue)
    })
}

async fn sync_pass<K, X>(
    api: &Api<K>,
    before: &K,
    live: &mut K,
    ext: Result<&X, Error>,
    deleting: bool,
) -> Result<Outcome, Error>
where
    K: Resource<DynamicType = ()>
        + HasSpec
        + HasStatus
        + Conditioned
        + Clone
        + Serialize
        + DeserializeOwned
        + Debug
        + Send
        + Sync,
    K::Spec: Serialize + PartialEq,
    K::Status: Serialize + PartialEq,
    X: External<K> + ?Sized,
{
    let result = match ext {
        Ok(ext) if deleting => retire(ext, live).await,
        Ok(ext) => converge(ext, live).await,
        Err(e) => Err(e),
    };
    mark_synced(live, &result);

    if let Err(e) = persist(api, before, live).await {
        if result.is_ok() {
            return Err(e);
        }
        error!(error = %e, "could not persist status of a failed pass");
    }
    result
}

/// Writes back what the pass changed: annotations and late-initialized spec
/// fields through the main resource, observations through the status
/// sub-resource.
async fn persist<K>(api: &Api<K>, before: &K, after: &K) -> Result<(), Error>
where
    K: Resource<DynamicType = ()>
        + HasSpec
        + HasStatus
        + Clone
        + DeserializeOwned
        + Debug,
    K::Spec: Serialize + PartialEq,
    K::Status: Serialize + PartialEq,
{
    let name = after.name_any();

    if before.annotations() != after.annotations() || before.spec() != after.spec() {
        let patch = json!({
            "metadata": {"annotations": after.annotations()},
            "spec": after.spec(),
        });
        api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
    }

    if before.status() != after.status() {
        let patch = json!({
            "status": after.status()
        });
        api.patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
    }
    Ok(())
}

/// Runs the Cluster and Instance controllers until a shutdown signal.
///
/// Entry point for a binary that embeds an `AkuityClient` transport; this
/// crate's own binary only prints the CRDs.
pub async fn run(
    client: Client,
    akuity: Arc<dyn AkuityClient>,
    settings: Settings,
) -> Result<(), Error> {
    let metrics = Metrics::new().map_err(|e| Error::Config(format!("metrics: {e}")))?;
    let access = Arc::new(KubeAccess::new(client.clone(), metrics.clone()));

    let ctx = Arc::new(Ctx {
        client: client.clone(),
        recorder: Recorder::new(client.clone(), make_reporter()),
        clusters: ClusterClient::new(
            akuity.clone(),
            access.clone(),
            access,
            settings.reconcile_poll,
        ),
        instances: InstanceClient::new(akuity, NormalizeRules::default()),
        metrics,
        requeue: settings.poll_interval,
    });

    info!(server = %settings.server_url, "starting Cluster and Instance controllers");

    let clusters = Controller::new(Api::<Cluster>::all(client.clone()), watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile_cluster, error_policy::<Cluster>, ctx.clone())
        .for_each(|result| async move {
            match result {
                Ok(object) => debug!(?object, "cluster reconciliation completed"),
                Err(e) => warn!(error = %e, "cluster reconciliation error"),
            }
        });

    let instances = Controller::new(Api::<Instance>::all(client), watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile_instance, error_policy::<Instance>, ctx)
        .for_each(|result| async move {
            match result {
                Ok(object) => debug!(?object, "instance reconciliation completed"),
                Err(e) => warn!(error = %e, "instance reconciliation error"),
            }
        });

    futures::join!(clusters, instances);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::akuity::PollPolicy;
    use crate::akuity::fake::FakeAkuity;
    use crate::crd::{EXTERNAL_NAME_ANNOTATION, external_name};
    use crate::external::fake::FakeKube;
    use crate::fixtures::{cluster_spec, instance_spec};

    const MANIFEST: &str = "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: akuity\n";

    fn condition<'a>(conditions: &'a [Condition], kind: &str) -> &'a Condition {
        conditions.iter().find(|c| c.r#type == kind).unwrap()
    }

    #[tokio::test]
    async fn instance_is_created_then_left_alone() {
        let akuity = Arc::new(FakeAkuity::default());
        let instances = InstanceClient::new(akuity.clone(), NormalizeRules::default());
        let mut cr = Instance::new("my-argocd", instance_spec());

        let outcome = converge(&instances, &mut cr).await.unwrap();
        assert_eq!(outcome, Outcome::Created);
        assert_eq!(external_name(&cr).as_deref(), Some("argocd"));
        let conditions = cr.status.as_ref().unwrap().conditions.as_ref().unwrap();
        assert_eq!(condition(conditions, "Ready"), &Condition::creating());

        assert_eq!(converge(&instances, &mut cr).await.unwrap(), Outcome::NoOp);
        let conditions = cr.status.as_ref().unwrap().conditions.as_ref().unwrap();
        assert_eq!(condition(conditions, "Ready"), &Condition::available());
    }

    #[tokio::test]
    async fn drifted_instance_is_updated() {
        let akuity = Arc::new(FakeAkuity::default());
        let instances = InstanceClient::new(akuity.clone(), NormalizeRules::default());
        let mut cr = Instance::new("my-argocd", instance_spec());
        converge(&instances, &mut cr).await.unwrap();

        cr.spec.argocd.as_mut().unwrap().spec.version = "v2.14.0".into();
        assert_eq!(converge(&instances, &mut cr).await.unwrap(), Outcome::Updated);
        assert_eq!(converge(&instances, &mut cr).await.unwrap(), Outcome::NoOp);
    }

    #[tokio::test]
    async fn retire_deletes_only_what_exists() {
        let akuity = Arc::new(FakeAkuity::default());
        let instances = InstanceClient::new(akuity.clone(), NormalizeRules::default());
        let mut cr = Instance::new("my-argocd", instance_spec());

        assert_eq!(retire(&instances, &mut cr).await.unwrap(), Outcome::NoOp);
        assert!(akuity.calls().is_empty());

        converge(&instances, &mut cr).await.unwrap();
        assert_eq!(retire(&instances, &mut cr).await.unwrap(), Outcome::Deleted);
        assert_eq!(
            akuity.calls().last().map(String::as_str),
            Some("delete_instance:argocd")
        );
        let conditions = cr.status.as_ref().unwrap().conditions.as_ref().unwrap();
        assert_eq!(condition(conditions, "Ready"), &Condition::deleting());
    }

    #[tokio::test]
    async fn cluster_pass_installs_and_removes_agent() {
        let akuity = Arc::new(FakeAkuity::default().with_manifests("id-prod", &[MANIFEST]));
        let kube = Arc::new(FakeKube::default());
        let clusters = ClusterClient::new(
            akuity.clone(),
            kube.clone(),
            kube.clone(),
            PollPolicy::default(),
        );
        let pass = ClusterPass {
            clusters: &clusters,
            instance_id: "inst-1".into(),
        };
        let mut cr = Cluster::new("prod", cluster_spec());

        assert_eq!(converge(&pass, &mut cr).await.unwrap(), Outcome::Created);
        assert_eq!(converge(&pass, &mut cr).await.unwrap(), Outcome::NoOp);
        assert_eq!(retire(&pass, &mut cr).await.unwrap(), Outcome::Deleted);

        assert_eq!(
            kube.applied(),
            vec![(MANIFEST.to_string(), false), (MANIFEST.to_string(), true)]
        );
        assert_eq!(
            akuity.calls().last().map(String::as_str),
            Some("delete_cluster:inst-1/prod")
        );
    }

    #[tokio::test]
    async fn failures_are_recorded_as_synced_false() {
        let akuity = Arc::new(FakeAkuity::default());
        let instances = InstanceClient::new(akuity.clone(), NormalizeRules::default());
        let mut cr = Instance::new("my-argocd", instance_spec());
        cr.annotations_mut()
            .insert(EXTERNAL_NAME_ANNOTATION.into(), "argocd".into());

        let result: Result<Outcome, Error> = Err(Error::Remote("connection refused".into()));
        mark_synced(&mut cr, &result);
        let conditions = cr.status.as_ref().unwrap().conditions.as_ref().unwrap();
        let synced = condition(conditions, "Synced");
        assert_eq!(synced.status, "False");
        assert_eq!(
            synced.message.as_deref(),
            Some("Akuity API error: connection refused")
        );

        let result = converge(&instances, &mut cr).await;
        mark_synced(&mut cr, &result);
        let conditions = cr.status.as_ref().unwrap().conditions.as_ref().unwrap();
        assert_eq!(
            condition(conditions, "Synced"),
            &Condition::reconcile_success()
        );
    }
}
