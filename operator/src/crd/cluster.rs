use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Condition, NameRef, ObservedStatus, SecretRef};

#[derive(CustomResource, Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[kube(
    group = "core.akuity.io",
    version = "v1alpha1",
    kind = "Cluster",
    plural = "clusters",
    derive = "Default",
    status = "ClusterStatus",
    shortname = "akc",
    printcolumn = r#"{"name":"Instance", "type":"string", "jsonPath":".spec.instanceId"}"#,
    printcolumn = r#"{"name":"Agent", "type":"string", "jsonPath":".status.atProvider.agentSize"}"#
)]
pub struct ClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_ref: Option<NameRef>,
    pub name: String,
    /// Namespace the agent is installed into on the workload cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub cluster_spec: ClusterProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_secret_ref: Option<SecretRef>,
    #[serde(default)]
    pub enable_in_cluster_kubeconfig: bool,
    #[serde(default)]
    pub remove_agent_resources_on_destroy: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_scoped: Option<bool>,
    #[serde(default)]
    pub data: ClusterData,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ClusterSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_upgrade_disabled: Option<bool>,
    /// Kustomization applied to the agent manifests, as YAML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_replication: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_tunneling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_cluster_k8s_dashboard_enabled: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClusterSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl ClusterSize {
    /// Maps a platform size code. Unknown and unspecified codes yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Small),
            2 => Some(Self::Medium),
            3 => Some(Self::Large),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Small => 1,
            Self::Medium => 2,
            Self::Large => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    pub at_provider: Option<ClusterObservation>,
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterObservation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub namespace_scoped: bool,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub auto_upgrade_disabled: bool,
    #[serde(default)]
    pub app_replication: bool,
    #[serde(default)]
    pub target_version: String,
    #[serde(default)]
    pub redis_tunneling: bool,
    #[serde(default)]
    pub agent_state: AgentStateObservation,
    #[serde(default)]
    pub health_status: ObservedStatus,
    #[serde(default)]
    pub reconciliation_status: ObservedStatus,
    #[serde(default)]
    pub kustomization: String,
    /// `small`, `medium`, `large` or `unspecified`.
    #[serde(default)]
    pub agent_size: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentStateObservation {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub argo_cd_version: String,
    #[serde(default)]
    pub statuses: BTreeMap<String, ObservedStatus>,
}

impl ClusterSpec {
    pub fn has_target_access(&self) -> bool {
        self.enable_in_cluster_kubeconfig
            || self
                .kubeconfig_secret_ref
                .as_ref()
                .is_some_and(|r| !r.name.is_empty())
    }
}
