//! Translation between platform wire objects and the canonical spec shape.
//!
//! Everything here is pure. Failures come only from malformed embedded
//! documents.

mod cluster;
mod instance;

pub use cluster::{cluster_observation, cluster_to_canonical, cluster_to_wire};
pub use instance::{
    cluster_customization_from_wire, instance_observation, instance_to_canonical, instance_to_wire,
};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::akuity::types::AKUITY_API_VERSION;
use crate::crd::{ConfigManagementPlugin, ConfigMapData, PluginSpec};
use crate::error::Error;

pub const ARGOCD_CM: &str = "argocd-cm";
pub const ARGOCD_IMAGE_UPDATER_CM: &str = "argocd-image-updater-config";
pub const ARGOCD_IMAGE_UPDATER_SSH_CM: &str = "argocd-image-updater-ssh-config";
pub const ARGOCD_NOTIFICATIONS_CM: &str = "argocd-notifications-cm";
pub const ARGOCD_RBAC_CM: &str = "argocd-rbac-cm";
pub const ARGOCD_SSH_KNOWN_HOSTS_CM: &str = "argocd-ssh-known-hosts-cm";
pub const ARGOCD_TLS_CERTS_CM: &str = "argocd-tls-certs-cm";

pub const ANNOTATION_CMP_ENABLED: &str = "akuity.io/enabled";
pub const ANNOTATION_CMP_IMAGE: &str = "akuity.io/image";

pub(crate) fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

pub(crate) fn non_empty_map(m: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    (!m.is_empty()).then(|| m.clone())
}

/// Renders a wire kustomization as YAML. Absent and empty documents yield `None`.
pub fn kustomization_to_yaml(kustomization: Option<&Value>) -> Result<Option<String>, Error> {
    match kustomization {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(fields)) if fields.is_empty() => Ok(None),
        Some(v) => serde_yaml::to_string(v)
            .map(Some)
            .map_err(|e| Error::transform("kustomization", e)),
    }
}

pub fn kustomization_to_json(kustomization: Option<&str>) -> Result<Option<Value>, Error> {
    let Some(text) = kustomization.filter(|s| !s.trim().is_empty()) else {
        return Ok(None);
    };

    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| Error::transform("kustomization from YAML", e))?;
    Ok(match value {
        Value::Null => None,
        v => Some(v),
    })
}

pub fn config_map_to_wire(name: &str, data: Option<&ConfigMapData>) -> Option<Value> {
    let data = data.filter(|d| !d.is_empty())?;
    Some(json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": {"name": name},
        "data": data,
    }))
}

/// Reads the data of an exported config map. Both a full `ConfigMap`
/// document and a bare data map are accepted.
pub fn config_map_from_wire(name: &str, doc: Option<&Value>) -> Result<Option<ConfigMapData>, Error> {
    let fields = match doc {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(fields)) => fields,
        Some(_) => return Err(Error::transform(format!("{name} configmap"), "not an object")),
    };

    let data = if fields.get("kind").and_then(Value::as_str) == Some("ConfigMap") {
        match fields.get("data") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(data)) => data,
            Some(_) => {
                return Err(Error::transform(format!("{name} configmap"), "data is not an object"));
            }
        }
    } else {
        fields
    };

    let mut out = ConfigMapData::new();
    for (key, value) in data {
        let Value::String(s) = value else {
            return Err(Error::transform(
                format!("{name} configmap"),
                format!("value of {key} is not a string"),
            ));
        };
        out.insert(key.clone(), s.clone());
    }

    Ok((!out.is_empty()).then_some(out))
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct PluginDocument {
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    kind: String,
    metadata: PluginMetadata,
    #[serde(default)]
    spec: PluginSpec,
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct PluginMetadata {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    annotations: BTreeMap<String, String>,
}

pub fn plugins_to_wire(
    plugins: Option<&BTreeMap<String, ConfigManagementPlugin>>,
) -> Result<Vec<Value>, Error> {
    let Some(plugins) = plugins else {
        return Ok(Vec::new());
    };

    plugins
        .iter()
        .map(|(name, plugin)| {
            let doc = PluginDocument {
                api_version: AKUITY_API_VERSION.into(),
                kind: "ConfigManagementPlugin".into(),
                metadata: PluginMetadata {
                    name: name.clone(),
                    annotations: BTreeMap::from([
                        (ANNOTATION_CMP_ENABLED.to_string(), plugin.enabled.to_string()),
                        (ANNOTATION_CMP_IMAGE.to_string(), plugin.image.clone()),
                    ]),
                },
                spec: plugin.spec.clone(),
            };
            serde_json::to_value(doc)
                .map_err(|e| Error::transform(format!("config management plugin {name}"), e))
        })
        .collect()
}

pub fn plugins_from_wire(
    docs: &[Value],
) -> Result<Option<BTreeMap<String, ConfigManagementPlugin>>, Error> {
    if docs.is_empty() {
        return Ok(None);
    }

    let mut plugins = BTreeMap::new();
    for doc in docs {
        let doc: PluginDocument = serde_json::from_value(doc.clone())
            .map_err(|e| Error::transform("config management plugin", e))?;
        let annotations = &doc.metadata.annotations;
        plugins.insert(
            doc.metadata.name.clone(),
            ConfigManagementPlugin {
                enabled: annotations
                    .get(ANNOTATION_CMP_ENABLED)
                    .is_some_and(|v| v == "true"),
                image: annotations
                    .get(ANNOTATION_CMP_IMAGE)
                    .cloned()
                    .unwrap_or_default(),
                spec: doc.spec,
            },
        );
    }
    Ok(Some(plugins))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{Command, Parameters};

    #[test]
    fn kustomization_yaml_json_round_trip() {
        let yaml = "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\n";
        let json = kustomization_to_json(Some(yaml)).unwrap().unwrap();
        assert_eq!(json["kind"], "Kustomization");

        let back = kustomization_to_yaml(Some(&json)).unwrap().unwrap();
        let reparsed: Value = serde_yaml::from_str(&back).unwrap();
        assert_eq!(reparsed, json);
    }

    #[test]
    fn empty_kustomization_is_absent() {
        assert_eq!(kustomization_to_json(None).unwrap(), None);
        assert_eq!(kustomization_to_json(Some("  \n")).unwrap(), None);
        assert_eq!(kustomization_to_yaml(Some(&json!({}))).unwrap(), None);
        assert_eq!(kustomization_to_yaml(Some(&Value::Null)).unwrap(), None);
    }

    #[test]
    fn malformed_kustomization_is_a_transform_error() {
        let err = kustomization_to_json(Some("kind: [unclosed")).unwrap_err();
        assert!(matches!(err, Error::Transform { .. }));
    }

    #[test]
    fn config_map_accepts_document_and_bare_data() {
        let doc = config_map_to_wire(
            ARGOCD_CM,
            Some(&ConfigMapData::from([("url".into(), "https://cd".into())])),
        )
        .unwrap();
        assert_eq!(doc["metadata"]["name"], ARGOCD_CM);

        let from_doc = config_map_from_wire(ARGOCD_CM, Some(&doc)).unwrap().unwrap();
        assert_eq!(from_doc["url"], "https://cd");

        let bare = json!({"admin.enabled": "false"});
        let from_bare = config_map_from_wire(ARGOCD_CM, Some(&bare)).unwrap().unwrap();
        assert_eq!(from_bare["admin.enabled"], "false");

        assert_eq!(config_map_to_wire(ARGOCD_CM, Some(&ConfigMapData::new())), None);
    }

    #[test]
    fn config_map_rejects_non_string_values() {
        let doc = json!({"timeout.reconciliation": 180});
        assert!(config_map_from_wire(ARGOCD_CM, Some(&doc)).is_err());
    }

    #[test]
    fn plugins_carry_enabled_and_image_in_annotations() {
        let plugin = ConfigManagementPlugin {
            enabled: true,
            image: "grafana/tanka:0.25.0".into(),
            spec: PluginSpec {
                version: Some("v1.0".into()),
                generate: Some(Command {
                    command: vec!["tk".into()],
                    args: vec!["show".into()],
                }),
                parameters: Some(Parameters::default()),
                ..Default::default()
            },
        };
        let plugins = BTreeMap::from([("tanka".to_string(), plugin.clone())]);

        let docs = plugins_to_wire(Some(&plugins)).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["metadata"]["annotations"][ANNOTATION_CMP_ENABLED], "true");
        assert_eq!(docs[0]["kind"], "ConfigManagementPlugin");

        let back = plugins_from_wire(&docs).unwrap().unwrap();
        assert_eq!(back["tanka"], plugin);
    }

    #[test]
    fn undecodable_plugin_is_an_error() {
        assert!(plugins_from_wire(&[json!({"spec": {}})]).is_err());
        assert_eq!(plugins_from_wire(&[]).unwrap(), None);
    }
}
