mod argocd;
mod cluster;
mod instance;

pub use argocd::*;
pub use cluster::*;
pub use instance::*;

use kube::{Resource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const GROUP: &str = "core.akuity.io";

/// Annotation holding the identifier of the object on the Akuity Platform.
pub const EXTERNAL_NAME_ANNOTATION: &str = "core.akuity.io/external-name";

pub fn external_name<K: Resource>(obj: &K) -> Option<String> {
    obj.annotations()
        .get(EXTERNAL_NAME_ANNOTATION)
        .filter(|name| !name.is_empty())
        .cloned()
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NameRef {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: String,
    pub namespace: String,
}

/// A status code reported by the Akuity Platform together with its message.
#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObservedStatus {
    #[serde(default)]
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub r#type: String,
    pub status: String,
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl Condition {
    pub fn available() -> Self {
        Self::ready("True", "Available", None)
    }

    pub fn unavailable() -> Self {
        Self::ready("False", "Unavailable", None)
    }

    pub fn creating() -> Self {
        Self::ready("False", "Creating", None)
    }

    pub fn deleting() -> Self {
        Self::ready("False", "Deleting", None)
    }

    pub fn reconcile_success() -> Self {
        Self::synced("True", "ReconcileSuccess", None)
    }

    pub fn reconcile_error(message: impl Into<String>) -> Self {
        Self::synced("False", "ReconcileError", Some(message.into()))
    }

    fn ready(status: &str, reason: &str, message: Option<String>) -> Self {
        Self {
            r#type: "Ready".into(),
            status: status.into(),
            reason: Some(reason.into()),
            message,
        }
    }

    fn synced(status: &str, reason: &str, message: Option<String>) -> Self {
        Self {
            r#type: "Synced".into(),
            status: status.into(),
            reason: Some(reason.into()),
            message,
        }
    }
}

pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) {
    match conditions.iter_mut().find(|c| c.r#type == condition.r#type) {
        Some(existing) => *existing = condition,
        None => conditions.push(condition),
    }
}

pub trait Conditioned {
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;

    fn record_condition(&mut self, condition: Condition) {
        set_condition(self.conditions_mut(), condition);
    }
}

impl Conditioned for Cluster {
    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        self.status
            .get_or_insert_with(Default::default)
            .conditions
            .get_or_insert_with(Vec::new)
    }
}

impl Conditioned for Instance {
    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        self.status
            .get_or_insert_with(Default::default)
            .conditions
            .get_or_insert_with(Vec::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_condition_replaces_same_type() {
        let mut conditions = vec![Condition::creating(), Condition::reconcile_success()];
        set_condition(&mut conditions, Condition::available());
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].status, "True");
        assert_eq!(conditions[0].reason.as_deref(), Some("Available"));

        set_condition(&mut conditions, Condition::reconcile_error("boom"));
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[1].message.as_deref(), Some("boom"));
    }

    #[test]
    fn external_name_ignores_empty_annotation() {
        let mut cluster = Cluster::new("c", ClusterSpec::default());
        assert_eq!(external_name(&cluster), None);

        cluster
            .annotations_mut()
            .insert(EXTERNAL_NAME_ANNOTATION.into(), String::new());
        assert_eq!(external_name(&cluster), None);

        cluster
            .annotations_mut()
            .insert(EXTERNAL_NAME_ANNOTATION.into(), "prod".into());
        assert_eq!(external_name(&cluster).as_deref(), Some("prod"));
    }
}
