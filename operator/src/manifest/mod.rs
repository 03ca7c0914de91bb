//! Applies the multi-document agent manifests of a cluster to the workload
//! cluster.

mod routing;
mod target;

pub use routing::{Route, ScopeTable};
pub use target::{DiscoveryMapper, KubeTarget, target_client};

use async_trait::async_trait;
use kube::core::{ApiResource, GroupVersionKind};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::error::Error;

pub const FIELD_MANAGER: &str = "akuity-operator";

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Request(String),
}

impl TargetError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TargetError::NotFound(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub resource: ApiResource,
    /// `None` addresses the resource without a namespace segment.
    pub namespace: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredObject {
    pub location: Location,
    pub route: Route,
    pub body: Value,
}

pub trait ResourceMapper: Send + Sync {
    fn resolve(&self, gvk: &GroupVersionKind) -> Option<ApiResource>;
}

#[async_trait]
pub trait ClusterTarget: Send + Sync {
    async fn get(&self, at: &Location) -> Result<Value, TargetError>;

    async fn apply(&self, at: &Location, body: &Value) -> Result<(), TargetError>;

    /// Merge patch of `metadata` only.
    async fn patch_metadata(&self, at: &Location, metadata: &Value) -> Result<(), TargetError>;

    async fn delete(&self, at: &Location) -> Result<(), TargetError>;
}

pub struct ManifestApplier<T, M> {
    target: T,
    mapper: M,
    scopes: ScopeTable,
}

impl<T: ClusterTarget, M: ResourceMapper> ManifestApplier<T, M> {
    pub fn new(target: T, mapper: M) -> Self {
        Self::with_scopes(target, mapper, ScopeTable::default())
    }

    pub fn with_scopes(target: T, mapper: M, scopes: ScopeTable) -> Self {
        Self {
            target,
            mapper,
            scopes,
        }
    }

    /// Applies (or deletes) every document of `manifest` in order and returns
    /// how many were processed. The first failure aborts the rest.
    pub async fn apply(&self, manifest: &str, delete: bool) -> Result<usize, Error> {
        let digest = digest(manifest);
        let objects = self.discover(manifest)?;
        info!(%digest, documents = objects.len(), delete, "applying cluster manifests");

        for obj in &objects {
            let at = &obj.location;
            debug!(
                gvk = %format!("{}/{}", at.resource.api_version, at.resource.kind),
                name = %at.name,
                namespace = ?at.namespace,
                delete,
                "applying object"
            );
            let result = if delete {
                match self.target.delete(at).await {
                    Err(e) if e.is_not_found() => Ok(()),
                    other => other,
                }
            } else {
                self.write(obj).await
            };
            result.map_err(|e| {
                Error::Manifest(format!(
                    "could not apply {} {}: {e}",
                    at.resource.kind, at.name
                ))
            })?;
        }

        Ok(objects.len())
    }

    async fn write(&self, obj: &DiscoveredObject) -> Result<(), TargetError> {
        let at = &obj.location;
        if obj.route != Route::GuardedSingleton {
            return self.target.apply(at, &obj.body).await;
        }

        // Never overwrite an existing one, only its metadata.
        match self.target.get(at).await {
            Ok(_) => {
                let metadata = obj.body.get("metadata").cloned().unwrap_or(Value::Null);
                self.target.patch_metadata(at, &metadata).await
            }
            Err(e) if e.is_not_found() => self.target.apply(at, &obj.body).await,
            Err(e) => Err(e),
        }
    }

    /// Decodes and resolves all documents before anything is written.
    pub fn discover(&self, manifest: &str) -> Result<Vec<DiscoveredObject>, Error> {
        let mut objects = Vec::new();
        for doc in split_documents(manifest) {
            if let Some(body) = decode(doc)? {
                objects.push(self.locate(body)?);
            }
        }
        Ok(objects)
    }

    fn locate(&self, body: Value) -> Result<DiscoveredObject, Error> {
        let field = |pointer: &str| {
            body.pointer(pointer)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let api_version = field("/apiVersion")
            .ok_or_else(|| Error::Manifest("document is missing apiVersion".into()))?;
        let kind =
            field("/kind").ok_or_else(|| Error::Manifest("document is missing kind".into()))?;
        let name = field("/metadata/name")
            .ok_or_else(|| Error::Manifest(format!("{kind} is missing metadata.name")))?;
        let namespace = field("/metadata/namespace");

        let (group, version) = api_version
            .split_once('/')
            .unwrap_or(("", api_version.as_str()));
        let gvk = GroupVersionKind::gvk(group, version, &kind);
        let resource = self
            .mapper
            .resolve(&gvk)
            .ok_or_else(|| Error::Manifest(format!("no API resource for {api_version} {kind}")))?;

        let route = self.scopes.route(&resource.plural);
        let namespace = match route {
            Route::Namespaced => namespace,
            Route::ClusterScoped | Route::GuardedSingleton => None,
        };

        Ok(DiscoveredObject {
            location: Location {
                resource,
                namespace,
                name,
            },
            route,
            body,
        })
    }
}

/// Splits on `---` separator lines. Blank segments are skipped.
pub fn split_documents(manifest: &str) -> impl Iterator<Item = &str> {
    let mut docs = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    for line in manifest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            docs.push(&manifest[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    docs.push(&manifest[start..]);
    docs.into_iter().filter(|d| !d.trim().is_empty())
}

/// `None` for documents holding only comments.
fn decode(doc: &str) -> Result<Option<Value>, Error> {
    let value: Value = serde_yaml::from_str(doc)
        .map_err(|e| Error::Manifest(format!("could not decode manifest: {e}")))?;
    Ok(match value {
        Value::Null => None,
        v @ Value::Object(_) => Some(v),
        _ => return Err(Error::Manifest("manifest document is not an object".into())),
    })
}

/// Short content digest used to correlate log lines of one manifest.
pub fn digest(manifest: &str) -> String {
    let sum = Sha256::digest(manifest.as_bytes());
    hex::encode(&sum[..6])
}
