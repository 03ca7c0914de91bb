use super::cluster::observed;
use super::{
    ARGOCD_CM, ARGOCD_IMAGE_UPDATER_CM, ARGOCD_IMAGE_UPDATER_SSH_CM, ARGOCD_NOTIFICATIONS_CM,
    ARGOCD_RBAC_CM, ARGOCD_SSH_KNOWN_HOSTS_CM, ARGOCD_TLS_CERTS_CM, config_map_from_wire,
    config_map_to_wire, kustomization_to_json, kustomization_to_yaml, non_empty, plugins_from_wire,
    plugins_to_wire,
};
use crate::akuity::types::{
    AKUITY_API_VERSION, ApplyInstanceRequest, ArgoCDManifest, ArgoCDManifestSpec,
    ClusterCustomization as WireClusterCustomization, Instance, InstanceBundle,
    InstanceSpec as WireInstanceSpec, ObjectMeta,
};
use crate::crd::{
    ArgoCD, ArgoCDInstanceSpec, ArgoCDSpec, ClusterCustomization, InstanceObservation,
    InstanceSpec,
};
use crate::error::Error;

pub fn instance_to_canonical(bundle: &InstanceBundle) -> Result<InstanceSpec, Error> {
    let export = &bundle.export;

    Ok(InstanceSpec {
        name: bundle.instance.name.clone(),
        argocd: Some(argocd_from_wire(&bundle.instance)?),
        argocd_config_map: config_map_from_wire(ARGOCD_CM, export.argocd_configmap.as_ref())?,
        argocd_image_updater_config_map: config_map_from_wire(
            ARGOCD_IMAGE_UPDATER_CM,
            export.image_updater_configmap.as_ref(),
        )?,
        argocd_image_updater_ssh_config_map: config_map_from_wire(
            ARGOCD_IMAGE_UPDATER_SSH_CM,
            export.image_updater_ssh_configmap.as_ref(),
        )?,
        argocd_notifications_config_map: config_map_from_wire(
            ARGOCD_NOTIFICATIONS_CM,
            export.notifications_configmap.as_ref(),
        )?,
        argocd_rbac_config_map: config_map_from_wire(
            ARGOCD_RBAC_CM,
            export.argocd_rbac_configmap.as_ref(),
        )?,
        argocd_ssh_known_hosts_config_map: config_map_from_wire(
            ARGOCD_SSH_KNOWN_HOSTS_CM,
            export.argocd_known_hosts_configmap.as_ref(),
        )?,
        argocd_tls_certs_config_map: config_map_from_wire(
            ARGOCD_TLS_CERTS_CM,
            export.argocd_tls_certs_configmap.as_ref(),
        )?,
        config_management_plugins: plugins_from_wire(&export.config_management_plugins)?,
    })
}

pub fn instance_to_wire(desired: &InstanceSpec) -> Result<ApplyInstanceRequest, Error> {
    let argocd = desired
        .argocd
        .as_ref()
        .ok_or_else(|| Error::transform(format!("instance {}", desired.name), "argocd must be set"))?;

    Ok(ApplyInstanceRequest {
        id: desired.name.clone(),
        argocd: ArgoCDManifest {
            api_version: AKUITY_API_VERSION.into(),
            kind: "ArgoCD".into(),
            metadata: ObjectMeta {
                name: desired.name.clone(),
                ..Default::default()
            },
            spec: ArgoCDManifestSpec {
                description: argocd.spec.description.clone().unwrap_or_default(),
                version: argocd.spec.version.clone(),
                instance_spec: instance_spec_to_wire(&argocd.spec.instance_spec)?,
            },
        },
        argocd_configmap: config_map_to_wire(ARGOCD_CM, desired.argocd_config_map.as_ref()),
        argocd_rbac_configmap: config_map_to_wire(
            ARGOCD_RBAC_CM,
            desired.argocd_rbac_config_map.as_ref(),
        ),
        notifications_configmap: config_map_to_wire(
            ARGOCD_NOTIFICATIONS_CM,
            desired.argocd_notifications_config_map.as_ref(),
        ),
        image_updater_configmap: config_map_to_wire(
            ARGOCD_IMAGE_UPDATER_CM,
            desired.argocd_image_updater_config_map.as_ref(),
        ),
        image_updater_ssh_configmap: config_map_to_wire(
            ARGOCD_IMAGE_UPDATER_SSH_CM,
            desired.argocd_image_updater_ssh_config_map.as_ref(),
        ),
        argocd_known_hosts_configmap: config_map_to_wire(
            ARGOCD_SSH_KNOWN_HOSTS_CM,
            desired.argocd_ssh_known_hosts_config_map.as_ref(),
        ),
        argocd_tls_certs_configmap: config_map_to_wire(
            ARGOCD_TLS_CERTS_CM,
            desired.argocd_tls_certs_config_map.as_ref(),
        ),
        config_management_plugins: plugins_to_wire(desired.config_management_plugins.as_ref())?,
    })
}

pub fn instance_observation(bundle: &InstanceBundle) -> Result<InstanceObservation, Error> {
    let instance = &bundle.instance;
    let canonical = instance_to_canonical(bundle)?;

    Ok(InstanceObservation {
        id: instance.id.clone(),
        name: instance.name.clone(),
        hostname: instance.hostname.clone(),
        cluster_count: instance.cluster_count,
        health_status: observed(instance.health_status.as_ref()),
        reconciliation_status: observed(instance.reconciliation_status.as_ref()),
        owner_organization_name: instance.owner_organization_name.clone(),
        argocd: canonical.argocd.unwrap_or_default(),
        argocd_config_map: canonical.argocd_config_map,
        argocd_image_updater_config_map: canonical.argocd_image_updater_config_map,
        argocd_image_updater_ssh_config_map: canonical.argocd_image_updater_ssh_config_map,
        argocd_notifications_config_map: canonical.argocd_notifications_config_map,
        argocd_rbac_config_map: canonical.argocd_rbac_config_map,
        argocd_ssh_known_hosts_config_map: canonical.argocd_ssh_known_hosts_config_map,
        argocd_tls_certs_config_map: canonical.argocd_tls_certs_config_map,
        config_management_plugins: canonical.config_management_plugins,
    })
}

fn argocd_from_wire(instance: &Instance) -> Result<ArgoCD, Error> {
    let instance_spec = match &instance.spec {
        Some(spec) => instance_spec_from_wire(spec)?,
        None => ArgoCDInstanceSpec::default(),
    };

    Ok(ArgoCD {
        spec: ArgoCDSpec {
            description: non_empty(&instance.description),
            version: instance.version.clone(),
            instance_spec,
        },
    })
}

fn instance_spec_from_wire(spec: &WireInstanceSpec) -> Result<ArgoCDInstanceSpec, Error> {
    Ok(ArgoCDInstanceSpec {
        ip_allow_list: spec.ip_allow_list.clone(),
        subdomain: non_empty(&spec.subdomain),
        declarative_management_enabled: spec.declarative_management_enabled,
        extensions: spec.extensions.clone(),
        cluster_customization_defaults: cluster_customization_from_wire(
            spec.cluster_customization_defaults.as_ref(),
        )?,
        image_updater_enabled: spec.image_updater_enabled,
        backend_ip_allow_list_enabled: spec.backend_ip_allow_list_enabled,
        repo_server_delegate: spec.repo_server_delegate.clone(),
        audit_extension_enabled: spec.audit_extension_enabled,
        sync_history_extension_enabled: spec.sync_history_extension_enabled,
        crossplane_extension: spec.crossplane_extension.clone(),
        image_updater_delegate: spec.image_updater_delegate.clone(),
        app_set_delegate: spec.app_set_delegate.clone(),
        assistant_extension_enabled: spec.assistant_extension_enabled,
        appset_policy: spec.appset_policy.clone(),
        host_aliases: spec.host_aliases.clone(),
        agent_permissions_rules: spec.agent_permissions_rules.clone(),
        fqdn: non_empty(&spec.fqdn),
        multi_cluster_k8s_dashboard_enabled: spec.multi_cluster_k8s_dashboard_enabled,
        kube_vision_argo_extension: spec.kube_vision_argo_extension.clone(),
        image_updater_version: non_empty(&spec.image_updater_version),
        custom_deprecated_apis: spec.custom_deprecated_apis.clone(),
        kube_vision_config: spec.kube_vision_config.clone(),
        app_in_any_namespace_config: spec.app_in_any_namespace_config.clone(),
        basepath: non_empty(&spec.basepath),
        appset_progressive_syncs_enabled: spec.appset_progressive_syncs_enabled,
        ai_support_engineer_extension: spec.ai_support_engineer_extension.clone(),
        secrets: spec.secrets.clone(),
        appset_plugins: spec.appset_plugins.clone(),
        application_set_extension: spec.application_set_extension.clone(),
    })
}

fn instance_spec_to_wire(spec: &ArgoCDInstanceSpec) -> Result<WireInstanceSpec, Error> {
    Ok(WireInstanceSpec {
        ip_allow_list: spec.ip_allow_list.clone(),
        subdomain: spec.subdomain.clone().unwrap_or_default(),
        declarative_management_enabled: spec.declarative_management_enabled,
        extensions: spec.extensions.clone(),
        cluster_customization_defaults: cluster_customization_to_wire(
            spec.cluster_customization_defaults.as_ref(),
        )?,
        image_updater_enabled: spec.image_updater_enabled,
        backend_ip_allow_list_enabled: spec.backend_ip_allow_list_enabled,
        repo_server_delegate: spec.repo_server_delegate.clone(),
        audit_extension_enabled: spec.audit_extension_enabled,
        sync_history_extension_enabled: spec.sync_history_extension_enabled,
        crossplane_extension: spec.crossplane_extension.clone(),
        image_updater_delegate: spec.image_updater_delegate.clone(),
        app_set_delegate: spec.app_set_delegate.clone(),
        assistant_extension_enabled: spec.assistant_extension_enabled,
        appset_policy: spec.appset_policy.clone(),
        host_aliases: spec.host_aliases.clone(),
        agent_permissions_rules: spec.agent_permissions_rules.clone(),
        fqdn: spec.fqdn.clone().unwrap_or_default(),
        multi_cluster_k8s_dashboard_enabled: spec.multi_cluster_k8s_dashboard_enabled,
        kube_vision_argo_extension: spec.kube_vision_argo_extension.clone(),
        image_updater_version: spec.image_updater_version.clone().unwrap_or_default(),
        custom_deprecated_apis: spec.custom_deprecated_apis.clone(),
        kube_vision_config: spec.kube_vision_config.clone(),
        app_in_any_namespace_config: spec.app_in_any_namespace_config.clone(),
        basepath: spec.basepath.clone().unwrap_or_default(),
        appset_progressive_syncs_enabled: spec.appset_progressive_syncs_enabled,
        ai_support_engineer_extension: spec.ai_support_engineer_extension.clone(),
        secrets: spec.secrets.clone(),
        appset_plugins: spec.appset_plugins.clone(),
        application_set_extension: spec.application_set_extension.clone(),
    })
}

pub fn cluster_customization_from_wire(
    wire: Option<&WireClusterCustomization>,
) -> Result<Option<ClusterCustomization>, Error> {
    let Some(wire) = wire else {
        return Ok(None);
    };

    Ok(Some(ClusterCustomization {
        auto_upgrade_disabled: wire.auto_upgrade_disabled,
        kustomization: kustomization_to_yaml(wire.kustomization.as_ref())
            .map_err(|e| Error::transform("cluster customization defaults", e))?,
        app_replication: wire.app_replication,
        redis_tunneling: wire.redis_tunneling,
    }))
}

fn cluster_customization_to_wire(
    spec: Option<&ClusterCustomization>,
) -> Result<Option<WireClusterCustomization>, Error> {
    let Some(spec) = spec else {
        return Ok(None);
    };

    Ok(Some(WireClusterCustomization {
        auto_upgrade_disabled: spec.auto_upgrade_disabled,
        kustomization: kustomization_to_json(spec.kustomization.as_deref())
            .map_err(|e| Error::transform("cluster customization defaults", e))?,
        app_replication: spec.app_replication,
        redis_tunneling: spec.redis_tunneling,
    }))
}
