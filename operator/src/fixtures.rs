//! Shared test fixtures.

use std::collections::BTreeMap;

use crate::crd::{
    AppsetPolicy, ArgoCD, ArgoCDInstanceSpec, ArgoCDSpec, ClusterCustomization, ClusterData,
    ClusterProperties, ClusterSize, ClusterSpec, ConfigManagementPlugin, ConfigMapData,
    CveScanConfig, InstanceSpec, IpAllowListEntry, KubeVisionConfig, NameRef, PluginSpec,
    SecretRef,
};

pub fn cluster_spec() -> ClusterSpec {
    ClusterSpec {
        instance_id: Some("inst-1".into()),
        instance_ref: Some(NameRef {
            name: "argocd".into(),
        }),
        name: "prod".into(),
        namespace: Some("akuity".into()),
        cluster_spec: ClusterProperties {
            description: Some("production".into()),
            namespace_scoped: Some(true),
            data: ClusterData {
                size: Some(ClusterSize::Large),
                auto_upgrade_disabled: Some(true),
                kustomization: Some(
                    "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\n".into(),
                ),
                app_replication: Some(false),
                target_version: Some("0.5.0".into()),
                redis_tunneling: Some(true),
                multi_cluster_k8s_dashboard_enabled: Some(true),
            },
        },
        labels: Some(BTreeMap::from([("env".into(), "prod".into())])),
        annotations: Some(BTreeMap::from([("team".into(), "platform".into())])),
        kubeconfig_secret_ref: Some(SecretRef {
            name: "prod-kubeconfig".into(),
            namespace: "infra".into(),
        }),
        enable_in_cluster_kubeconfig: false,
        remove_agent_resources_on_destroy: true,
    }
}

pub fn instance_spec() -> InstanceSpec {
    InstanceSpec {
        name: "argocd".into(),
        argocd: Some(ArgoCD {
            spec: ArgoCDSpec {
                description: Some("platform gitops".into()),
                version: "v2.13.1".into(),
                instance_spec: ArgoCDInstanceSpec {
                    ip_allow_list: vec![IpAllowListEntry {
                        ip: "10.0.0.0/8".into(),
                        description: Some("office".into()),
                    }],
                    subdomain: Some("acme".into()),
                    declarative_management_enabled: Some(true),
                    cluster_customization_defaults: Some(ClusterCustomization {
                        auto_upgrade_disabled: Some(true),
                        kustomization: Some("kind: Kustomization\n".into()),
                        ..Default::default()
                    }),
                    appset_policy: Some(AppsetPolicy {
                        policy: Some("create-only".into()),
                        override_policy: Some(true),
                    }),
                    multi_cluster_k8s_dashboard_enabled: Some(true),
                    kube_vision_config: Some(KubeVisionConfig {
                        cve_scan_config: Some(CveScanConfig {
                            scan_enabled: Some(true),
                            rescan_interval: Some("12h".into()),
                        }),
                        ai_config: None,
                    }),
                    ..Default::default()
                },
            },
        }),
        argocd_config_map: Some(ConfigMapData::from([
            ("admin.enabled".into(), "false".into()),
            ("accounts.ci".into(), "apiKey,login".into()),
        ])),
        argocd_rbac_config_map: Some(ConfigMapData::from([(
            "policy.default".into(),
            "role:readonly".into(),
        )])),
        config_management_plugins: Some(BTreeMap::from([(
            "tanka".to_string(),
            ConfigManagementPlugin {
                enabled: true,
                image: "grafana/tanka:0.25.0".into(),
                spec: PluginSpec {
                    version: Some("v1.0".into()),
                    ..Default::default()
                },
            },
        )])),
        ..Default::default()
    }
}
