//! Wire representations exchanged with the Akuity Platform API.
//!
//! Reads return API objects (`Cluster`, `Instance`, `ExportedInstance`), writes
//! send declarative manifests (`ClusterManifest`, `ApplyInstanceRequest`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crd::{
    AgentPermissionsRule, AiSupportEngineerExtension, AppInAnyNamespaceConfig, AppSetDelegate,
    ApplicationSetExtension, AppsetPlugin, AppsetPolicy, CrossplaneExtension, CustomDeprecatedApi,
    ExtensionInstallEntry, HostAliases, ImageUpdaterDelegate, IpAllowListEntry,
    KubeVisionArgoExtension, KubeVisionConfig, RepoServerDelegate, SecretsManagementConfig,
};

pub const AKUITY_API_VERSION: &str = "argocd.akuity.io/v1alpha1";

pub const HEALTH_HEALTHY: i32 = 1;

pub const RECONCILIATION_UNSPECIFIED: i32 = 0;
pub const RECONCILIATION_SUCCESSFUL: i32 = 1;
pub const RECONCILIATION_PROGRESSING: i32 = 2;
pub const RECONCILIATION_FAILED: i32 = 3;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCode {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub namespace_scoped: bool,
    #[serde(default)]
    pub data: ClusterData,
    #[serde(default)]
    pub agent_state: Option<AgentState>,
    #[serde(default)]
    pub health_status: Option<StatusCode>,
    #[serde(default)]
    pub reconciliation_status: Option<StatusCode>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterData {
    /// Size code: 0 unspecified, 1 small, 2 medium, 3 large.
    #[serde(default)]
    pub size: i32,
    #[serde(default)]
    pub auto_upgrade_disabled: Option<bool>,
    #[serde(default)]
    pub kustomization: Option<Value>,
    #[serde(default)]
    pub app_replication: Option<bool>,
    #[serde(default)]
    pub target_version: String,
    #[serde(default)]
    pub redis_tunneling: Option<bool>,
    #[serde(default)]
    pub multi_cluster_k8s_dashboard_enabled: Option<bool>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub argo_cd_version: String,
    #[serde(default)]
    pub status: Option<AgentHealth>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentHealth {
    #[serde(default)]
    pub healthy: BTreeMap<String, AgentHealthStatus>,
    #[serde(default)]
    pub progressing: BTreeMap<String, AgentHealthStatus>,
    #[serde(default)]
    pub degraded: BTreeMap<String, AgentHealthStatus>,
    #[serde(default)]
    pub unknown: BTreeMap<String, AgentHealthStatus>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentHealthStatus {
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ClusterManifestSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManifestSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub namespace_scoped: bool,
    pub data: ClusterManifestData,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterManifestData {
    /// `small`, `medium` or `large`.
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_upgrade_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomization: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_replication: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_tunneling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_cluster_k8s_dashboard_enabled: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub cluster_count: u32,
    #[serde(default)]
    pub owner_organization_name: String,
    #[serde(default)]
    pub health_status: Option<StatusCode>,
    #[serde(default)]
    pub reconciliation_status: Option<StatusCode>,
    #[serde(default)]
    pub spec: Option<InstanceSpec>,
}

/// Instance settings as the platform stores them. Same shape on read and write.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_allow_list: Vec<IpAllowListEntry>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subdomain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declarative_management_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionInstallEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_customization_defaults: Option<ClusterCustomization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_updater_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_ip_allow_list_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_server_delegate: Option<RepoServerDelegate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_extension_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_history_extension_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossplane_extension: Option<CrossplaneExtension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_updater_delegate: Option<ImageUpdaterDelegate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_set_delegate: Option<AppSetDelegate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_extension_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appset_policy: Option<AppsetPolicy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_aliases: Vec<HostAliases>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_permissions_rules: Vec<AgentPermissionsRule>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fqdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_cluster_k8s_dashboard_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_vision_argo_extension: Option<KubeVisionArgoExtension>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_updater_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_deprecated_apis: Vec<CustomDeprecatedApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_vision_config: Option<KubeVisionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_in_any_namespace_config: Option<AppInAnyNamespaceConfig>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub basepath: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appset_progressive_syncs_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_support_engineer_extension: Option<AiSupportEngineerExtension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<SecretsManagementConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub appset_plugins: Vec<AppsetPlugin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_set_extension: Option<ApplicationSetExtension>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_upgrade_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomization: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_replication: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_tunneling: Option<bool>,
}

/// Argo CD configuration exported from an instance. Config maps and plugins
/// arrive as untyped documents.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportedInstance {
    #[serde(default)]
    pub argocd_configmap: Option<Value>,
    #[serde(default)]
    pub argocd_rbac_configmap: Option<Value>,
    #[serde(default)]
    pub notifications_configmap: Option<Value>,
    #[serde(default)]
    pub image_updater_configmap: Option<Value>,
    #[serde(default)]
    pub image_updater_ssh_configmap: Option<Value>,
    #[serde(default)]
    pub argocd_known_hosts_configmap: Option<Value>,
    #[serde(default)]
    pub argocd_tls_certs_configmap: Option<Value>,
    #[serde(default)]
    pub config_management_plugins: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceBundle {
    pub instance: Instance,
    pub export: ExportedInstance,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArgoCDManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ArgoCDManifestSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArgoCDManifestSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub version: String,
    pub instance_spec: InstanceSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplyInstanceRequest {
    pub id: String,
    pub argocd: ArgoCDManifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_configmap: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_rbac_configmap: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_configmap: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_updater_configmap: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_updater_ssh_configmap: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_known_hosts_configmap: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_tls_certs_configmap: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config_management_plugins: Vec<Value>,
}

impl Cluster {
    pub fn reconciliation_code(&self) -> i32 {
        self.reconciliation_status
            .as_ref()
            .map(|s| s.code)
            .unwrap_or(RECONCILIATION_UNSPECIFIED)
    }

    /// Successful and failed are terminal; anything else is still in flight.
    pub fn is_settled(&self) -> bool {
        matches!(
            self.reconciliation_code(),
            RECONCILIATION_SUCCESSFUL | RECONCILIATION_FAILED
        )
    }
}
