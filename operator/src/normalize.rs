//! Reconciles cosmetic differences between a desired spec and the observed
//! canonical form before they are compared. Only ever applied to copies.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compare::{equal, equivalent};
use crate::crd::{ClusterSpec, ConfigMapData, InstanceSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeRules {
    /// argocd-cm keys the platform manages itself.
    pub ignored_config_keys: Vec<String>,
    /// argocd-cm key prefix whose values are comma-joined sets.
    pub set_valued_prefix: String,
    /// argocd-cm keys holding a YAML map of resource customizations.
    pub structured_keys: Vec<String>,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            ignored_config_keys: [
                "cluster.inClusterEnabled",
                "resource.respectRBAC",
                "application.resourceTrackingMethod",
                "url",
            ]
            .map(String::from)
            .to_vec(),
            set_valued_prefix: "accounts.".into(),
            structured_keys: vec!["resource.customizations".into()],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
struct ResourceCustomization {
    #[serde(default, rename = "health.lua")]
    health: String,
    #[serde(default)]
    actions: String,
    #[serde(default, rename = "ignoreDifferences")]
    ignore_differences: String,
    #[serde(default, rename = "knownTypeFields")]
    known_type_fields: String,
}

type ResourceCustomizations = BTreeMap<String, Option<ResourceCustomization>>;

pub fn normalize_cluster(desired: &mut ClusterSpec, observed: &ClusterSpec) {
    let data = &mut desired.cluster_spec.data;
    let actual = &observed.cluster_spec.data;

    if data.multi_cluster_k8s_dashboard_enabled.is_none() {
        data.multi_cluster_k8s_dashboard_enabled = actual.multi_cluster_k8s_dashboard_enabled;
    }
    adopt_equivalent_yaml(&mut data.kustomization, &actual.kustomization);
}

pub fn normalize_instance(
    desired: &mut InstanceSpec,
    observed: &mut InstanceSpec,
    rules: &NormalizeRules,
) {
    if let (Some(argocd), Some(actual)) = (desired.argocd.as_mut(), observed.argocd.as_ref()) {
        let spec = &mut argocd.spec.instance_spec;
        let actual = &actual.spec.instance_spec;

        if spec.multi_cluster_k8s_dashboard_enabled.is_none() {
            spec.multi_cluster_k8s_dashboard_enabled = actual.multi_cluster_k8s_dashboard_enabled;
        }

        // Only one of them takes effect on the platform.
        let set = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        if set(&spec.fqdn) && set(&spec.subdomain) {
            spec.fqdn.clone_from(&actual.fqdn);
            spec.subdomain.clone_from(&actual.subdomain);
        }

        if spec.kube_vision_config.is_none() {
            spec.kube_vision_config.clone_from(&actual.kube_vision_config);
        }
        if spec.ai_support_engineer_extension.is_none() {
            spec.ai_support_engineer_extension
                .clone_from(&actual.ai_support_engineer_extension);
        }

        if let (Some(defaults), Some(actual_defaults)) = (
            spec.cluster_customization_defaults.as_mut(),
            actual.cluster_customization_defaults.as_ref(),
        ) {
            adopt_equivalent_yaml(&mut defaults.kustomization, &actual_defaults.kustomization);
        }
    }

    if let Some(config) = desired.argocd_config_map.as_mut() {
        normalize_argocd_config(config, observed.argocd_config_map.as_ref(), rules);
    }
    for config in [
        desired.argocd_config_map.as_mut(),
        observed.argocd_config_map.as_mut(),
    ]
    .into_iter()
    .flatten()
    {
        for key in &rules.ignored_config_keys {
            config.remove(key);
        }
    }
}

fn normalize_argocd_config(
    config: &mut ConfigMapData,
    observed: Option<&ConfigMapData>,
    rules: &NormalizeRules,
) {
    let Some(observed) = observed else {
        return;
    };

    for (key, value) in config.iter_mut() {
        let Some(actual) = observed.get(key) else {
            continue;
        };

        if key.starts_with(&rules.set_valued_prefix) {
            if comma_set(value) == comma_set(actual) {
                value.clone_from(actual);
            }
        } else if rules.structured_keys.contains(key) && same_customizations(value, actual) {
            value.clone_from(actual);
        }
    }
}

fn comma_set(s: &str) -> BTreeSet<&str> {
    s.split(',').map(str::trim).filter(|v| !v.is_empty()).collect()
}

fn same_customizations(a: &str, b: &str) -> bool {
    let parse = |s: &str| serde_yaml::from_str::<Option<ResourceCustomizations>>(s);
    match (parse(a), parse(b)) {
        (Ok(a), Ok(b)) => {
            equivalent(&a.unwrap_or_default(), &b.unwrap_or_default()).unwrap_or(false)
        }
        _ => false,
    }
}

/// Adopts the observed YAML text when both sides parse to the same document.
fn adopt_equivalent_yaml(desired: &mut Option<String>, observed: &Option<String>) {
    let (Some(d), Some(o)) = (desired.as_deref(), observed.as_deref()) else {
        return;
    };
    let parse = |s: &str| serde_yaml::from_str::<Value>(s);
    if let (Ok(a), Ok(b)) = (parse(d), parse(o)) {
        if equal(&a, &b) {
            *desired = observed.clone();
        }
    }
}
