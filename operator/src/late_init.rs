//! Fills unset optional fields of a desired spec from the canonical form of
//! the observed object. A field that is already set is never touched.

use serde_yaml::Value as YamlValue;

use crate::crd::{ClusterSpec, InstanceSpec};
use crate::error::Error;

fn adopt<T: Clone>(desired: &mut Option<T>, observed: &Option<T>) {
    if desired.is_none() {
        desired.clone_from(observed);
    }
}

fn adopt_kustomization(
    desired: &mut Option<String>,
    observed: &Option<String>,
    what: &str,
) -> Result<(), Error> {
    if desired.as_deref().is_some_and(|k| !k.is_empty()) {
        return Ok(());
    }
    if let Some(yaml) = observed {
        serde_yaml::from_str::<YamlValue>(yaml)
            .map_err(|e| Error::transform(format!("{what} kustomization"), e))?;
    }
    *desired = observed.clone();
    Ok(())
}

pub fn late_initialize_cluster(desired: &mut ClusterSpec, observed: &ClusterSpec) -> Result<(), Error> {
    adopt(&mut desired.namespace, &observed.namespace);

    let data = &mut desired.cluster_spec.data;
    let actual = &observed.cluster_spec.data;
    adopt(&mut data.size, &actual.size);
    adopt(&mut data.auto_upgrade_disabled, &actual.auto_upgrade_disabled);
    adopt(&mut data.app_replication, &actual.app_replication);
    adopt(&mut data.target_version, &actual.target_version);
    adopt(&mut data.redis_tunneling, &actual.redis_tunneling);
    adopt(
        &mut data.multi_cluster_k8s_dashboard_enabled,
        &actual.multi_cluster_k8s_dashboard_enabled,
    );
    adopt_kustomization(
        &mut data.kustomization,
        &actual.kustomization,
        &format!("cluster {}", observed.name),
    )
}

pub fn late_initialize_instance(
    desired: &mut InstanceSpec,
    observed: &InstanceSpec,
) -> Result<(), Error> {
    if let (Some(argocd), Some(actual)) = (desired.argocd.as_mut(), observed.argocd.as_ref()) {
        let spec = &mut argocd.spec.instance_spec;
        let actual = &actual.spec.instance_spec;

        adopt(&mut spec.subdomain, &actual.subdomain);
        adopt(
            &mut spec.declarative_management_enabled,
            &actual.declarative_management_enabled,
        );
        adopt(&mut spec.appset_policy, &actual.appset_policy);

        match (
            spec.cluster_customization_defaults.as_mut(),
            actual.cluster_customization_defaults.as_ref(),
        ) {
            (None, Some(observed_defaults)) => {
                if let Some(yaml) = &observed_defaults.kustomization {
                    serde_yaml::from_str::<YamlValue>(yaml).map_err(|e| {
                        Error::transform("cluster customization defaults kustomization", e)
                    })?;
                }
                spec.cluster_customization_defaults = Some(observed_defaults.clone());
            }
            (Some(defaults), Some(observed_defaults)) => adopt_kustomization(
                &mut defaults.kustomization,
                &observed_defaults.kustomization,
                "cluster customization defaults",
            )?,
            _ => {}
        }
    }

    adopt(&mut desired.argocd_config_map, &observed.argocd_config_map);
    adopt(
        &mut desired.argocd_ssh_known_hosts_config_map,
        &observed.argocd_ssh_known_hosts_config_map,
    );
    adopt(&mut desired.argocd_rbac_config_map, &observed.argocd_rbac_config_map);
    adopt(
        &mut desired.argocd_tls_certs_config_map,
        &observed.argocd_tls_certs_config_map,
    );
    adopt(
        &mut desired.config_management_plugins,
        &observed.config_management_plugins,
    );

    Ok(())
}
