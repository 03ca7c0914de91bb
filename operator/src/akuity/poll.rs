use std::time::Duration;

use tracing::debug;

use super::types::Cluster;
use super::{AkuityClient, RemoteError};

/// Bounded retry with a doubling delay between reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub initial_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl PollPolicy {
    fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay
            .checked_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
            .unwrap_or(Duration::MAX)
    }
}

/// Reads the cluster until its reconciliation reaches a terminal state.
///
/// Not-found and in-flight reconciliation are retried; any other error is
/// returned at once. Running out of attempts is always `NotReconciled`.
pub async fn wait_until_settled(
    client: &dyn AkuityClient,
    instance_id: &str,
    name: &str,
    policy: PollPolicy,
) -> Result<Cluster, RemoteError> {
    let mut last = RemoteError::NotReconciled(format!("cluster {name}"));

    for attempt in 0..policy.attempts {
        if attempt > 0 {
            tokio::time::sleep(policy.delay_after(attempt - 1)).await;
        }

        match client.get_cluster(instance_id, name).await {
            Ok(cluster) if cluster.is_settled() => return Ok(cluster),
            Ok(cluster) => {
                debug!(
                    instance_id,
                    cluster = name,
                    attempt,
                    code = cluster.reconciliation_code(),
                    "cluster not yet reconciled"
                );
                last = RemoteError::NotReconciled(format!("cluster {name}"));
            }
            Err(err) if err.is_not_found() || err.is_not_reconciled() => {
                debug!(instance_id, cluster = name, attempt, error = %err, "cluster not yet readable");
                last = err;
            }
            Err(err) => return Err(err),
        }
    }

    Err(RemoteError::NotReconciled(format!(
        "cluster {name} after {} attempts: {last}",
        policy.attempts
    )))
}
