//! Application configuration.

use std::path::Path;

use account_lockout::AccountLockoutConfig;
use platform_kit::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use tenant_resolver::TenantResolverConfig;

pub const ENV_PREFIX: &str = "DURJ__";

/// In-memory SQLite used by `--mock`.
pub const MOCK_DSN: &str = "sqlite::memory:";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    /// Without a database section the modules run on in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub tenant_resolver: TenantResolverConfig,
    pub account_lockout: AccountLockoutConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://durj.db?mode=rwc".to_owned(),
            max_connections: 10,
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file, then `DURJ__*` env vars.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer cannot be read or a module section is invalid.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let cfg: Self = platform_kit::config::load_layered(path, ENV_PREFIX)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    ///
    /// Returns the first invalid module section.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.tenant_resolver.validate()?;
        self.account_lockout.validate()?;
        if let Some(db) = &self.database
            && db.dsn.trim().is_empty()
        {
            anyhow::bail!("database.dsn must not be empty");
        }
        Ok(())
    }

    /// `-v` and `--mock` overrides.
    pub fn apply_cli_overrides(&mut self, verbose: u8, mock: bool) {
        self.logging.apply_verbosity(verbose);
        if mock {
            self.database = Some(DatabaseConfig {
                dsn: MOCK_DSN.to_owned(),
                max_connections: 1,
            });
        }
    }
}
