mod config;
mod wiring;

use std::path::PathBuf;

use account_lockout::domain::AccountLockState;
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tenant_resolver_sdk::SubscriptionTier;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::wiring::Services;

/// Durj Guard - operator tooling for tenant resolution and account lockout
#[derive(Parser)]
#[command(name = "durj-guard")]
#[command(about = "Durj Guard - operator tooling for tenant resolution and account lockout")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use a migrated in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and exit
    Check,
    /// Apply database migrations
    Migrate,
    /// Register an organization
    CreateOrg {
        slug: String,
        name: String,
        #[arg(long, value_enum, default_value_t = Tier::Free)]
        tier: Tier,
    },
    /// Resolve the tenant serving a host
    Resolve { host: String },
    /// Validate and normalize a custom domain
    ValidateDomain { domain: String },
    /// Generate a verification token for an organization
    Token { organization_id: Uuid },
    /// Claim a custom domain for an organization
    ClaimDomain {
        organization_id: Uuid,
        domain: String,
    },
    /// Remove an organization's custom domain
    RemoveDomain { organization_id: Uuid },
    /// Check DNS ownership of a domain, or of the organization's claim when
    /// `--domain` is omitted
    Verify {
        organization_id: Uuid,
        #[arg(long, requires = "token")]
        domain: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        actor: Option<Uuid>,
    },
    /// Register an account for lockout tracking
    CreateAccount { email: String },
    /// Record a failed login for an account id or email
    RecordFailure { account: String },
    /// Show the lock status of an account id or email
    LockStatus { account: String },
    /// Lift a lock as an operator
    Unlock {
        account_id: Uuid,
        #[arg(long)]
        actor: Uuid,
    },
    /// Revoke an impersonation token
    RevokeToken {
        token_id: String,
        /// RFC 3339 expiry of the token
        #[arg(long)]
        expires_at: DateTime<Utc>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Tier {
    Free,
    Starter,
    Professional,
    Enterprise,
}

impl From<Tier> for SubscriptionTier {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::Free => Self::Free,
            Tier::Starter => Self::Starter,
            Tier::Professional => Self::Professional,
            Tier::Enterprise => Self::Enterprise,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) defaults -> 2) YAML (if provided) -> 3) env (DURJ__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.verbose, cli.mock);
    platform_kit::logging::init_logging(&config.logging);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&config),
        Commands::Migrate => run_migrations(&config).await,
        command => {
            let services = wiring::build(&config).await?;
            run_command(&services, command).await
        }
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    println!("Configuration is valid");
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

async fn run_migrations(config: &AppConfig) -> Result<()> {
    let Some(db_cfg) = &config.database else {
        anyhow::bail!("no database section configured");
    };
    let db = wiring::connect(db_cfg).await?;
    wiring::migrate(&db).await?;
    println!("Migrations applied");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_command(services: &Services, command: Commands) -> Result<()> {
    let tenants = services.tenants.as_ref();
    let lockout = services.lockout.as_ref();

    match command {
        Commands::Check | Commands::Migrate => Ok(()),
        Commands::CreateOrg { slug, name, tier } => {
            let org = tenants.create_organization(&slug, &name, tier.into()).await?;
            print_json(&org)
        }
        Commands::Resolve { host } => print_json(&tenants.resolve_tenant(&host).await),
        Commands::ValidateDomain { domain } => match tenants.validate_custom_domain(&domain) {
            Ok(normalized) => print_json(&serde_json::json!({
                "valid": true,
                "domain": normalized,
            })),
            Err(reason) => print_json(&serde_json::json!({
                "valid": false,
                "reason": reason,
                "error": reason.to_string(),
            })),
        },
        Commands::Token { organization_id } => {
            println!("{}", tenants.generate_verification_token(organization_id));
            Ok(())
        }
        Commands::ClaimDomain {
            organization_id,
            domain,
        } => print_json(
            &tenants
                .claim_custom_domain(organization_id, &domain, None)
                .await?,
        ),
        Commands::RemoveDomain { organization_id } => {
            tenants.remove_custom_domain(organization_id, None).await?;
            println!("Custom domain removed");
            Ok(())
        }
        Commands::Verify {
            organization_id,
            domain,
            token,
            actor,
        } => {
            let outcome = match (domain, token) {
                (Some(domain), Some(token)) => {
                    tenants
                        .verify_domain_ownership(&domain, &token, organization_id, actor)
                        .await
                }
                _ => tenants.verify_organization_domain(organization_id, actor).await?,
            };
            print_json(&outcome)
        }
        Commands::CreateAccount { email } => {
            let state = AccountLockState::new(Uuid::new_v4(), email);
            services.accounts.create(state.clone()).await?;
            print_json(&serde_json::json!({ "id": state.id, "email": state.email }))
        }
        Commands::RecordFailure { account } => {
            print_json(&lockout.record_failed_login(&account).await)
        }
        Commands::LockStatus { account } => print_json(&lockout.is_account_locked(&account).await),
        Commands::Unlock { account_id, actor } => {
            print_json(&lockout.admin_unlock_account(account_id, actor).await?)
        }
        Commands::RevokeToken {
            token_id,
            expires_at,
        } => {
            lockout.revoke_token(&token_id, expires_at).await?;
            println!("Token revoked");
            Ok(())
        }
    }
}
