use std::collections::BTreeMap;

use super::{kustomization_to_json, kustomization_to_yaml, non_empty, non_empty_map};
use crate::akuity::types::{
    AKUITY_API_VERSION, AgentHealthStatus, Cluster, ClusterManifest, ClusterManifestData,
    ClusterManifestSpec, ObjectMeta, StatusCode,
};
use crate::crd::{
    AgentStateObservation, ClusterData, ClusterObservation, ClusterProperties, ClusterSize,
    ClusterSpec, ObservedStatus,
};
use crate::error::Error;

/// Canonical form of a remote cluster. Fields that only exist on the custom
/// resource (instance reference, target access, destroy policy) are carried
/// over from `desired`.
pub fn cluster_to_canonical(remote: &Cluster, desired: &ClusterSpec) -> Result<ClusterSpec, Error> {
    let data = &remote.data;
    let kustomization = kustomization_to_yaml(data.kustomization.as_ref())
        .map_err(|e| Error::transform(format!("cluster {}", remote.name), e))?;

    Ok(ClusterSpec {
        instance_id: desired.instance_id.clone(),
        instance_ref: desired.instance_ref.clone(),
        name: remote.name.clone(),
        namespace: non_empty(&remote.namespace),
        cluster_spec: ClusterProperties {
            description: non_empty(&remote.description),
            namespace_scoped: Some(remote.namespace_scoped),
            data: ClusterData {
                size: Some(ClusterSize::from_code(data.size).unwrap_or_default()),
                auto_upgrade_disabled: data.auto_upgrade_disabled,
                kustomization,
                app_replication: data.app_replication,
                target_version: non_empty(&data.target_version),
                redis_tunneling: data.redis_tunneling,
                multi_cluster_k8s_dashboard_enabled: data.multi_cluster_k8s_dashboard_enabled,
            },
        },
        labels: non_empty_map(&data.labels),
        annotations: non_empty_map(&data.annotations),
        kubeconfig_secret_ref: desired.kubeconfig_secret_ref.clone(),
        enable_in_cluster_kubeconfig: desired.enable_in_cluster_kubeconfig,
        remove_agent_resources_on_destroy: desired.remove_agent_resources_on_destroy,
    })
}

pub fn cluster_to_wire(desired: &ClusterSpec) -> Result<ClusterManifest, Error> {
    let data = &desired.cluster_spec.data;
    let kustomization = kustomization_to_json(data.kustomization.as_deref())
        .map_err(|e| Error::transform(format!("cluster {}", desired.name), e))?;

    Ok(ClusterManifest {
        api_version: AKUITY_API_VERSION.into(),
        kind: "Cluster".into(),
        metadata: ObjectMeta {
            name: desired.name.clone(),
            namespace: desired.namespace.clone().unwrap_or_default(),
            labels: desired.labels.clone().unwrap_or_default(),
            annotations: desired.annotations.clone().unwrap_or_default(),
        },
        spec: ClusterManifestSpec {
            description: desired.cluster_spec.description.clone().unwrap_or_default(),
            namespace_scoped: desired.cluster_spec.namespace_scoped.unwrap_or_default(),
            data: ClusterManifestData {
                size: data.size.unwrap_or_default().as_str().into(),
                auto_upgrade_disabled: data.auto_upgrade_disabled,
                kustomization,
                app_replication: data.app_replication,
                target_version: data.target_version.clone().unwrap_or_default(),
                redis_tunneling: data.redis_tunneling,
                multi_cluster_k8s_dashboard_enabled: data.multi_cluster_k8s_dashboard_enabled,
            },
        },
    })
}

pub fn cluster_observation(remote: &Cluster) -> Result<ClusterObservation, Error> {
    let data = &remote.data;
    let kustomization = kustomization_to_yaml(data.kustomization.as_ref())?.unwrap_or_default();
    let agent_size = ClusterSize::from_code(data.size)
        .map(ClusterSize::as_str)
        .unwrap_or("unspecified");

    Ok(ClusterObservation {
        id: remote.id.clone(),
        name: remote.name.clone(),
        description: remote.description.clone(),
        namespace: remote.namespace.clone(),
        namespace_scoped: remote.namespace_scoped,
        labels: data.labels.clone(),
        annotations: data.annotations.clone(),
        auto_upgrade_disabled: data.auto_upgrade_disabled.unwrap_or_default(),
        app_replication: data.app_replication.unwrap_or_default(),
        target_version: data.target_version.clone(),
        redis_tunneling: data.redis_tunneling.unwrap_or_default(),
        agent_state: agent_state_observation(remote),
        health_status: observed(remote.health_status.as_ref()),
        reconciliation_status: observed(remote.reconciliation_status.as_ref()),
        kustomization,
        agent_size: agent_size.into(),
    })
}

fn agent_state_observation(remote: &Cluster) -> AgentStateObservation {
    let Some(state) = &remote.agent_state else {
        return AgentStateObservation::default();
    };

    // Later buckets win when an agent shows up twice.
    let mut statuses = BTreeMap::new();
    if let Some(health) = &state.status {
        for bucket in [&health.healthy, &health.progressing, &health.degraded, &health.unknown] {
            statuses.extend(bucket.iter().map(|(agent, s)| (agent.clone(), agent_status(s))));
        }
    }

    AgentStateObservation {
        version: state.version.clone(),
        argo_cd_version: state.argo_cd_version.clone(),
        statuses,
    }
}

fn agent_status(s: &AgentHealthStatus) -> ObservedStatus {
    ObservedStatus {
        code: s.status,
        message: non_empty(&s.message),
    }
}

pub(crate) fn observed(status: Option<&StatusCode>) -> ObservedStatus {
    status
        .map(|s| ObservedStatus {
            code: s.code,
            message: non_empty(&s.message),
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::akuity::fake::cluster_from_manifest;
    use crate::akuity::types::{AgentHealth, AgentState, ClusterData as WireData};
    use crate::compare::equivalent;
    use crate::fixtures::cluster_spec as desired;
    use serde_json::json;

    #[test]
    fn wire_then_canonical_reproduces_desired() {
        let d = desired();
        let wire = cluster_to_wire(&d).unwrap();
        let remote = cluster_from_manifest(&wire);
        let canonical = cluster_to_canonical(&remote, &d).unwrap();

        assert!(equivalent(&canonical, &d).unwrap());
        assert_eq!(canonical.cluster_spec.data.size, Some(ClusterSize::Large));
        assert_eq!(canonical.namespace.as_deref(), Some("akuity"));
        assert_eq!(canonical.kubeconfig_secret_ref, d.kubeconfig_secret_ref);
    }

    #[test]
    fn empty_size_is_written_as_small() {
        let mut d = desired();
        d.cluster_spec.data.size = None;
        let wire = cluster_to_wire(&d).unwrap();
        assert_eq!(wire.spec.data.size, "small");
    }

    #[test]
    fn unknown_size_code_is_small_in_canonical_and_unspecified_in_observation() {
        let remote = Cluster {
            id: "c-1".into(),
            name: "prod".into(),
            data: WireData {
                size: 0,
                ..Default::default()
            },
            ..Default::default()
        };

        let canonical = cluster_to_canonical(&remote, &ClusterSpec::default()).unwrap();
        assert_eq!(canonical.cluster_spec.data.size, Some(ClusterSize::Small));

        let obs = cluster_observation(&remote).unwrap();
        assert_eq!(obs.agent_size, "unspecified");
    }

    #[test]
    fn observation_merges_agent_buckets() {
        let status = |code: i32| AgentHealthStatus {
            status: code,
            message: String::new(),
        };
        let remote = Cluster {
            id: "c-1".into(),
            name: "prod".into(),
            agent_state: Some(AgentState {
                version: "0.5.0".into(),
                argo_cd_version: "v2.13.1".into(),
                status: Some(AgentHealth {
                    healthy: BTreeMap::from([("repo-server".into(), status(1))]),
                    degraded: BTreeMap::from([("app-controller".into(), status(3))]),
                    unknown: BTreeMap::from([("repo-server".into(), status(4))]),
                    ..Default::default()
                }),
            }),
            health_status: Some(StatusCode {
                code: 1,
                message: "healthy".into(),
            }),
            ..Default::default()
        };

        let obs = cluster_observation(&remote).unwrap();
        assert_eq!(obs.agent_state.statuses.len(), 2);
        assert_eq!(obs.agent_state.statuses["app-controller"].code, 3);
        assert_eq!(obs.agent_state.statuses["repo-server"].code, 4);
        assert_eq!(obs.health_status.code, 1);
        assert_eq!(obs.health_status.message.as_deref(), Some("healthy"));
    }

    #[test]
    fn invalid_kustomization_fails_the_write() {
        let mut d = desired();
        d.cluster_spec.data.kustomization = Some("kind: [".into());
        assert!(matches!(cluster_to_wire(&d), Err(Error::Transform { .. })));
    }

    #[test]
    fn wire_kustomization_becomes_yaml() {
        let remote = Cluster {
            name: "prod".into(),
            data: WireData {
                kustomization: Some(json!({"kind": "Kustomization"})),
                ..Default::default()
            },
            ..Default::default()
        };
        let canonical = cluster_to_canonical(&remote, &ClusterSpec::default()).unwrap();
        assert_eq!(
            canonical.cluster_spec.data.kustomization.as_deref(),
            Some("kind: Kustomization\n")
        );
    }
}
