//! Builds the module services from the application config.

use std::sync::Arc;

use account_lockout::AccountLockoutLocalClient;
use account_lockout::domain::repo::{AccountLockRepository, RevocationRepository};
use account_lockout::infra::storage::{
    InMemoryAccountLockRepository, InMemoryRevocationRepository, SeaOrmAccountLockRepository,
    SeaOrmRevocationRepository,
};
use platform_kit::{AuditDispatcher, Clock, SystemClock};
use account_lockout_sdk::AccountLockoutClient;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tenant_resolver::TenantResolverLocalClient;
use tenant_resolver::domain::repo::OrganizationRepository;
use tenant_resolver::domain::verification::TxtResolver;
use tenant_resolver::infra::dns::HickoryTxtResolver;
use tenant_resolver::infra::storage::{
    InMemoryOrganizationRepository, SeaOrmOrganizationRepository,
};
use tenant_resolver_sdk::TenantResolverClient;

use crate::config::{AppConfig, DatabaseConfig, MOCK_DSN};

/// Module clients, as request middleware would hold them.
pub struct Services {
    pub tenants: Arc<dyn TenantResolverClient>,
    pub lockout: Arc<dyn AccountLockoutClient>,
    pub accounts: Arc<dyn AccountLockRepository>,
}

/// # Errors
///
/// Returns an error if the database cannot be reached.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.dsn.clone());
    opts.max_connections(cfg.max_connections.max(1))
        .sqlx_logging(false);
    let db = Database::connect(opts).await?;
    tracing::debug!(dsn = %redact(&cfg.dsn), "database connected");
    Ok(db)
}

/// Applies pending migrations of both modules.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    tenant_resolver::infra::storage::Migrator::up(db, None).await?;
    account_lockout::infra::storage::Migrator::up(db, None).await?;
    tracing::info!("migrations applied");
    Ok(())
}

/// # Errors
///
/// Returns an error if the database cannot be reached or migrated.
pub async fn build(cfg: &AppConfig) -> anyhow::Result<Services> {
    let Stores {
        orgs,
        accounts,
        revocations,
    } = open_stores(cfg.database.as_ref()).await?;

    let dns: Arc<dyn TxtResolver> = match HickoryTxtResolver::from_system_conf() {
        Ok(resolver) => Arc::new(resolver),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "system resolver config unavailable; using public upstreams"
            );
            Arc::new(HickoryTxtResolver::with_defaults())
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let audit = AuditDispatcher::tracing();

    let tenants = tenant_resolver::Service::new(
        cfg.tenant_resolver.clone(),
        orgs,
        dns,
        Arc::clone(&clock),
        audit.clone(),
    );
    let lockout = account_lockout::Service::new(
        &cfg.account_lockout,
        Arc::clone(&accounts),
        revocations,
        clock,
        audit,
    );

    Ok(Services {
        tenants: Arc::new(TenantResolverLocalClient::new(Arc::new(tenants))),
        lockout: Arc::new(AccountLockoutLocalClient::new(Arc::new(lockout))),
        accounts,
    })
}

struct Stores {
    orgs: Arc<dyn OrganizationRepository>,
    accounts: Arc<dyn AccountLockRepository>,
    revocations: Arc<dyn RevocationRepository>,
}

async fn open_stores(db_cfg: Option<&DatabaseConfig>) -> anyhow::Result<Stores> {
    let Some(db_cfg) = db_cfg else {
        tracing::warn!("no database section; using in-memory stores");
        return Ok(Stores {
            orgs: Arc::new(InMemoryOrganizationRepository::new()),
            accounts: Arc::new(InMemoryAccountLockRepository::new()),
            revocations: Arc::new(InMemoryRevocationRepository::new()),
        });
    };

    let db = connect(db_cfg).await?;
    if db_cfg.dsn == MOCK_DSN {
        migrate(&db).await?;
    }
    Ok(Stores {
        orgs: Arc::new(SeaOrmOrganizationRepository::new(db.clone())),
        accounts: Arc::new(SeaOrmAccountLockRepository::new(db.clone())),
        revocations: Arc::new(SeaOrmRevocationRepository::new(db)),
    })
}

/// Strips credentials from a DSN for logging.
fn redact(dsn: &str) -> String {
    let Some((scheme, rest)) = dsn.split_once("://") else {
        return dsn.to_owned();
    };
    match rest.rsplit_once('@') {
        Some((_, host)) => format!("{scheme}://***@{host}"),
        None => dsn.to_owned(),
    }
}
