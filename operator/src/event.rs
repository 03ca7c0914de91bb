use std::time::Duration;

use kube::runtime::events::{Event, EventType};
use kube::{Client, Resource};
use kube_runtime::events::{Recorder, Reporter};

use crate::error::Error;
use crate::external::{ClusterClient, InstanceClient};
use crate::metrics::Metrics;

pub struct Ctx {
    pub client: Client,
    pub recorder: Recorder,
    pub clusters: ClusterClient,
    pub instances: InstanceClient,
    pub metrics: Metrics,
    /// Requeue interval after a successful pass.
    pub requeue: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoOp,
    Created,
    Updated,
    Deleted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::NoOp => "noop",
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::Deleted => "deleted",
        }
    }
}

pub fn make_reporter() -> Reporter {
    Reporter {
        controller: "akuity-operator".into(),
        instance: std::env::var("POD_NAME").ok(),
    }
}

pub async fn emit_event<K>(
    ctx: &Ctx,
    obj: &K,
    reason: &str,
    note: &str,
    event_type: EventType,
) -> Result<(), Error>
where
    K: Resource<DynamicType = ()> + std::fmt::Debug,
{
    ctx.recorder
        .publish(
            &Event {
                type_: event_type,
                reason: reason.into(),
                note: Some(note.into()),
                action: reason.into(),
                secondary: None,
            },
            &obj.object_ref(&()),
        )
        .await?;

    Ok(())
}

/// Runs `op`, publishing a Normal event when it changed something and a
/// Warning event carrying the error otherwise. Event failures are ignored.
pub async fn with_event<E, K>(
    ctx: &Ctx,
    obj: &K,
    success_msg: &str,
    fail_reason: &str,
    op: impl std::future::Future<Output = Result<Outcome, E>>,
) -> Result<Outcome, E>
where
    E: std::fmt::Display,
    K: Resource<DynamicType = ()> + std::fmt::Debug,
{
    match op.await {
        Ok(outcome) => {
            let reason = match outcome {
                Outcome::Created => Some("Created"),
                Outcome::Updated => Some("Updated"),
                Outcome::Deleted => Some("Deleted"),
                Outcome::NoOp => None,
            };
            if let Some(reason) = reason {
                let _ = emit_event(ctx, obj, reason, success_msg, EventType::Normal).await;
            }
            Ok(outcome)
        }
        Err(e) => {
            let _ = emit_event(ctx, obj, fail_reason, &e.to_string(), EventType::Warning).await;
            Err(e)
        }
    }
}
