//! Configuration for the account lockout module.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccountLockoutConfig {
    /// Consecutive failures that trigger a lockout.
    pub max_failed_attempts: u32,

    /// Lock duration per lockout cycle; the last entry repeats.
    #[serde(with = "duration_list")]
    pub lockout_schedule: Vec<Duration>,
}

impl Default for AccountLockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_schedule: [5, 15, 30, 60]
                .into_iter()
                .map(|m| Duration::from_secs(m * 60))
                .collect(),
        }
    }
}

impl AccountLockoutConfig {
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_failed_attempts == 0 {
            anyhow::bail!("account_lockout.max_failed_attempts must be at least 1");
        }
        if self.lockout_schedule.is_empty() {
            anyhow::bail!("account_lockout.lockout_schedule must not be empty");
        }
        if self.lockout_schedule.iter().any(Duration::is_zero) {
            anyhow::bail!("account_lockout.lockout_schedule entries must be positive");
        }
        Ok(())
    }
}

/// `["5m", "15m"]` <-> `Vec<Duration>`.
mod duration_list {
    use std::time::Duration;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[Duration], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(value.iter().map(|d| humantime::format_duration(*d).to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Duration>, D::Error> {
        Vec::<String>::deserialize(d)?
            .iter()
            .map(|s| humantime::parse_duration(s).map_err(D::Error::custom))
            .collect()
    }
}
