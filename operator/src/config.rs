use std::time::Duration;

use crate::akuity::{Credentials, DEFAULT_SERVER_URL, PollPolicy};
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub credentials: Credentials,
    /// Requeue interval after a successful pass.
    pub poll_interval: Duration,
    pub reconcile_poll: PollPolicy,
}

impl Settings {
    /// Reads the process environment. Used by binaries that embed a
    /// transport and call `reconcile::run`.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{key} must be set")))
        };
        let number = |key: &str, default: u64| -> Result<u64, Error> {
            match lookup(key) {
                None => Ok(default),
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|e| Error::Config(format!("{key}={v}: {e}"))),
            }
        };

        let credentials = Credentials::new(
            required("AKUITY_ORGANIZATION_ID")?,
            required("AKUITY_API_KEY_ID")?,
            required("AKUITY_API_KEY_SECRET")?,
        )?;
        let attempts = u32::try_from(number("AKUITY_RECONCILE_ATTEMPTS", 5)?)
            .map_err(|e| Error::Config(format!("AKUITY_RECONCILE_ATTEMPTS: {e}")))?;

        Ok(Self {
            server_url: lookup("AKUITY_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.into()),
            credentials,
            poll_interval: Duration::from_secs(number("AKUITY_POLL_INTERVAL_SECS", 60)?),
            reconcile_poll: PollPolicy {
                attempts,
                initial_delay: Duration::from_millis(number("AKUITY_RECONCILE_DELAY_MS", 1000)?),
            },
        })
    }
}
