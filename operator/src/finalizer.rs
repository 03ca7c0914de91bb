use std::fmt::Debug;

use kube::{
    Api, Resource, ResourceExt,
    api::{Patch, PatchParams},
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::Error;
use crate::event::Outcome;

pub const FINALIZER: &str = "core.akuity.io/finalizer";

pub fn is_deleting<K: Resource>(obj: &K) -> bool {
    obj.meta().deletion_timestamp.is_some()
}

pub fn has_finalizer<K: Resource>(obj: &K, finalizer: &str) -> bool {
    obj.finalizers().iter().any(|f| f == finalizer)
}

pub async fn ensure_finalizer_present<K>(api: &Api<K>, obj: &K) -> Result<Outcome, Error>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    if has_finalizer(obj, FINALIZER) {
        return Ok(Outcome::NoOp);
    }

    let mut finalizers = obj.finalizers().to_vec();
    finalizers.push(FINALIZER.into());
    patch_finalizers(api, obj, finalizers).await?;
    Ok(Outcome::Created)
}

pub async fn remove_finalizer<K>(api: &Api<K>, obj: &K) -> Result<Outcome, Error>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    if !has_finalizer(obj, FINALIZER) {
        return Ok(Outcome::NoOp);
    }

    let mut finalizers = obj.finalizers().to_vec();
    finalizers.retain(|f| f != FINALIZER);
    patch_finalizers(api, obj, finalizers).await?;
    Ok(Outcome::Deleted)
}

async fn patch_finalizers<K>(api: &Api<K>, obj: &K, finalizers: Vec<String>) -> Result<(), Error>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    let name = obj.name_any();
    let patch = json!({
        "metadata": {"finalizers": finalizers}
    });

    api.patch_metadata(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .map_err(|e| Error::Finalizer(format!("could not update finalizers of {name}: {e}")))?;
    Ok(())
}
