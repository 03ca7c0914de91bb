use serde::Serialize;
use tracing::debug;

use crate::akuity::types::HEALTH_HEALTHY;
use crate::compare::{diff, equivalent};
use crate::crd::Condition;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Observation {
    pub exists: bool,
    pub up_to_date: bool,
}

impl Observation {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(up_to_date: bool) -> Self {
        Self {
            exists: true,
            up_to_date,
        }
    }
}

/// Compares normalized copies of `desired` and `observed`. The inputs are
/// left as they are.
pub fn is_up_to_date<T>(
    desired: &T,
    observed: &T,
    normalize: impl FnOnce(&mut T, &mut T),
) -> Result<bool, Error>
where
    T: Serialize + Clone,
{
    let (mut d, mut o) = (desired.clone(), observed.clone());
    normalize(&mut d, &mut o);

    let same = equivalent(&d, &o)?;
    if !same {
        debug!(paths = ?diff(&d, &o)?, "desired and observed differ");
    }
    Ok(same)
}

pub fn readiness(health_code: i32) -> Condition {
    if health_code == HEALTH_HEALTHY {
        Condition::available()
    } else {
        Condition::unavailable()
    }
}
