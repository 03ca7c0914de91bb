use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ArgoCD, Condition, ConfigManagementPlugin, ObservedStatus};

pub type ConfigMapData = BTreeMap<String, String>;

#[derive(CustomResource, Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[kube(
    group = "core.akuity.io",
    version = "v1alpha1",
    kind = "Instance",
    plural = "instances",
    derive = "Default",
    status = "InstanceStatus",
    shortname = "aki",
    printcolumn = r#"{"name":"Hostname", "type":"string", "jsonPath":".status.atProvider.hostname"}"#
)]
pub struct InstanceSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd: Option<ArgoCD>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_image_updater_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_image_updater_ssh_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_notifications_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_rbac_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_ssh_known_hosts_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_tls_certs_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_management_plugins: Option<BTreeMap<String, ConfigManagementPlugin>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    pub at_provider: Option<InstanceObservation>,
    pub conditions: Option<Vec<Condition>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceObservation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub cluster_count: u32,
    #[serde(default)]
    pub health_status: ObservedStatus,
    #[serde(default)]
    pub reconciliation_status: ObservedStatus,
    #[serde(default)]
    pub owner_organization_name: String,
    #[serde(default)]
    pub argocd: ArgoCD,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_image_updater_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_image_updater_ssh_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_notifications_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_rbac_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_ssh_known_hosts_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argocd_tls_certs_config_map: Option<ConfigMapData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_management_plugins: Option<BTreeMap<String, ConfigManagementPlugin>>,
}
