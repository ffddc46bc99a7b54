//! Layered configuration loading.
//!
//! Order of precedence (last wins):
//! 1. `T::default()`
//! 2. YAML file, when a path is given
//! 3. environment variables `<PREFIX>SECTION__KEY`

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Loads `T` from defaults, an optional YAML file and prefixed env vars.
///
/// # Errors
///
/// Returns an error if the file does not exist or any layer fails to
/// deserialize into `T`.
pub fn load_layered<T>(path: Option<&Path>, env_prefix: &str) -> anyhow::Result<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));

    if let Some(path) = path {
        if !path.is_file() {
            anyhow::bail!("config file does not exist: {}", path.display());
        }
        figment = figment.merge(Yaml::file(path));
    }

    figment
        .merge(Env::prefixed(env_prefix).split("__"))
        .extract()
        .context("failed to load configuration")
}
