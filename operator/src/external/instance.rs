use std::sync::Arc;

use kube::ResourceExt;
use tracing::info;

use crate::akuity::AkuityClient;
use crate::akuity::types::InstanceBundle;
use crate::bridge::{instance_observation, instance_to_canonical, instance_to_wire};
use crate::convergence::{Observation, is_up_to_date, readiness};
use crate::crd::{EXTERNAL_NAME_ANNOTATION, Instance, external_name, set_condition};
use crate::error::Error;
use crate::late_init::late_initialize_instance;
use crate::normalize::{NormalizeRules, normalize_instance};

pub struct InstanceClient {
    akuity: Arc<dyn AkuityClient>,
    rules: NormalizeRules,
}

impl InstanceClient {
    pub fn new(akuity: Arc<dyn AkuityClient>, rules: NormalizeRules) -> Self {
        Self { akuity, rules }
    }

    pub async fn observe(&self, cr: &mut Instance) -> Result<Observation, Error> {
        let Some(name) = external_name(cr) else {
            return Ok(Observation::absent());
        };

        let instance = match self.akuity.get_instance(&name).await {
            Ok(instance) => instance,
            Err(e) if e.is_not_found() => return Ok(Observation::absent()),
            Err(e) => return Err(e.into()),
        };
        let export = self.akuity.export_instance(&name).await?;
        let bundle = InstanceBundle { instance, export };

        let canonical = instance_to_canonical(&bundle)?;
        late_initialize_instance(&mut cr.spec, &canonical)?;

        let at_provider = instance_observation(&bundle)?;
        let ready = readiness(at_provider.health_status.code);
        let status = cr.status.get_or_insert_with(Default::default);
        status.at_provider = Some(at_provider);
        set_condition(status.conditions.get_or_insert_with(Vec::new), ready);

        let up_to_date = is_up_to_date(&cr.spec, &canonical, |d, o| {
            normalize_instance(d, o, &self.rules)
        })?;
        Ok(Observation::present(up_to_date))
    }

    pub async fn create(&self, cr: &mut Instance) -> Result<(), Error> {
        let request = instance_to_wire(&cr.spec)?;
        self.akuity.apply_instance(&request).await?;
        info!(instance = %request.id, "instance created");

        cr.annotations_mut()
            .insert(EXTERNAL_NAME_ANNOTATION.into(), request.id);
        Ok(())
    }

    pub async fn update(&self, cr: &Instance) -> Result<(), Error> {
        let request = instance_to_wire(&cr.spec)?;
        self.akuity.apply_instance(&request).await?;
        info!(instance = %request.id, "instance updated");
        Ok(())
    }

    pub async fn delete(&self, cr: &Instance) -> Result<(), Error> {
        let Some(name) = external_name(cr) else {
            return Ok(());
        };
        self.akuity.delete_instance(&name).await?;
        info!(instance = %name, "instance deleted");
        Ok(())
    }
}
