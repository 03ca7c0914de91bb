use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArgoCD {
    #[serde(default)]
    pub spec: ArgoCDSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArgoCDSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    #[serde(default)]
    pub instance_spec: ArgoCDInstanceSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArgoCDInstanceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_allow_list: Vec<IpAllowListEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_cluster_k8s_dashboard_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_vision_argo_extension: Option<KubeVisionArgoExtension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_updater_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_deprecated_apis: Vec<CustomDeprecatedApi>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_vision_config: Option<KubeVisionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_in_any_namespace_config: Option<AppInAnyNamespaceConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basepath: Option<String>,
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

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IpAllowListEntry {
    #[serde(default)]
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionInstallEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
}

/// Agent defaults applied to every cluster of the instance.
#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterCustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_upgrade_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_replication: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis_tunneling: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCluster {
    #[serde(default)]
    pub cluster_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepoServerDelegate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_cluster: Option<ManagedCluster>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpdaterDelegate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_cluster: Option<ManagedCluster>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSetDelegate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_cluster: Option<ManagedCluster>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrossplaneExtension {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<CrossplaneExtensionResource>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrossplaneExtensionResource {
    #[serde(default)]
    pub group: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppsetPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_policy: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostAliases {
    #[serde(default)]
    pub ip: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hostnames: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentPermissionsRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub api_groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubeVisionArgoExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_usernames: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_groups: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomDeprecatedApi {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub new_api_version: String,
    #[serde(default)]
    pub deprecated_in_kubernetes_version: String,
    #[serde(default)]
    pub unavailable_in_kubernetes_version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubeVisionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve_scan_config: Option<CveScanConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_config: Option<AiConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CveScanConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescan_interval: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runbooks: Vec<Runbook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incidents: Option<IncidentsConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Runbook {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_argocd_apps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_k8s_namespaces: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscriptions: Vec<IncidentSubscription>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub webhooks: Vec<IncidentWebhookConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSubscription {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub argocd_applications: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub k8s_namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runbooks: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentWebhookConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description_path: String,
    #[serde(default)]
    pub cluster_path: String,
    #[serde(default)]
    pub k8s_namespace_path: String,
    #[serde(default)]
    pub argocd_application_name_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppInAnyNamespaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSupportEngineerExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretsManagementConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<ClusterSecretMapping>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<ClusterSecretMapping>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSecretMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<ObjectSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<ObjectSelector>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSelector {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelectorRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppsetPlugin {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub request_timeout: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSetExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// A config management plugin run as a sidecar of the repo server.
#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigManagementPlugin {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub spec: PluginSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate: Option<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discover: Option<Discover>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Parameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_file_mode: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Discover {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find: Option<Find>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Find {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glob: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    #[serde(default, rename = "static", skip_serializing_if = "Vec::is_empty")]
    pub static_: Vec<ParameterAnnouncement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<Command>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParameterAnnouncement {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_type: Option<String>,
    #[serde(default, rename = "string", skip_serializing_if = "Option::is_none")]
    pub string_: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub array: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub map: BTreeMap<String, String>,
}
