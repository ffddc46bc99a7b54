//! TXT lookups through `hickory-resolver`.

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;

use crate::domain::verification::TxtResolver;

/// Async DNS resolver for TXT ownership checks.
pub struct HickoryTxtResolver {
    resolver: TokioResolver,
}

impl HickoryTxtResolver {
    /// Uses the host's resolver configuration (`/etc/resolv.conf` on Unix).
    ///
    /// # Errors
    ///
    /// Returns an error if the system configuration cannot be read.
    pub fn from_system_conf() -> anyhow::Result<Self> {
        let resolver = TokioResolver::builder_tokio()?.build();
        Ok(Self { resolver })
    }

    /// Uses the resolver's built-in public upstreams.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    /// Uses an explicit upstream configuration.
    #[must_use]
    pub fn with_config(config: ResolverConfig) -> Self {
        let resolver =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default()).build();
        Self { resolver }
    }
}

#[async_trait]
impl TxtResolver for HickoryTxtResolver {
    async fn lookup_txt(&self, name: &str) -> anyhow::Result<Vec<String>> {
        let lookup = self.resolver.txt_lookup(name).await?;
        Ok(lookup
            .iter()
            .map(|txt| {
                txt.txt_data()
                    .iter()
                    .map(|chunk| String::from_utf8_lossy(chunk))
                    .collect::<String>()
            })
            .collect())
    }
}
