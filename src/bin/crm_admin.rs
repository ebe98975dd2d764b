//! Operator command line: migrations, superuser promotion and token minting.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use tenant_crm::db::{establish_connection_pool, run_pending_migrations};
use tenant_crm::domain::auth::AuthenticatedUser;
use tenant_crm::domain::types::UserEmail;
use tenant_crm::jwt;
use tenant_crm::load_server_config;
use tenant_crm::models::config::ServerConfig;
use tenant_crm::repository::{DieselRepository, UserReader, UserWriter};
use tenant_crm::services::access::issue_token;
use tenant_crm::services::context::resolve_access_context;

#[derive(Parser)]
#[command(name = "crm_admin")]
#[command(about = "Administrative tasks for the tenant CRM")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Applies pending database migrations
    Migrate,
    /// Grants (or with --revoke removes) superuser rights
    Promote {
        email: String,
        #[arg(long)]
        revoke: bool,
    },
    /// Prints a bearer token for an existing user
    IssueToken {
        email: String,
        /// Organization to embed in the token
        organization_id: Option<i32>,
    },
}

fn repository(config: &ServerConfig) -> Result<DieselRepository> {
    let pool = establish_connection_pool(&config.database_url)
        .with_context(|| format!("failed to open database `{}`", config.database_url))?;
    Ok(DieselRepository::new(pool))
}

fn migrate(config: &ServerConfig) -> Result<usize> {
    let pool = establish_connection_pool(&config.database_url)
        .with_context(|| format!("failed to open database `{}`", config.database_url))?;
    let applied = run_pending_migrations(&pool).context("failed to apply migrations")?;
    log::info!("Applied {applied} migration(s)");
    Ok(applied)
}

fn promote(config: &ServerConfig, email: &str, revoke: bool) -> Result<()> {
    let repo = repository(config)?;
    let email = UserEmail::new(email).context("invalid email")?;
    let user = repo
        .set_superuser(&email, !revoke)
        .with_context(|| format!("failed to update user {email}"))?;
    log::info!("User {} is_superuser = {}", user.email, user.is_superuser);
    Ok(())
}

fn mint_token(config: &ServerConfig, email: &str, organization_id: Option<i32>) -> Result<String> {
    let repo = repository(config)?;
    let email = UserEmail::new(email).context("invalid email")?;
    let user = repo
        .get_user_by_email(&email)
        .context("failed to look up user")?
        .ok_or_else(|| anyhow!("unknown user {email}"))?;

    let claims = AuthenticatedUser {
        sub: user.id.to_string(),
        email: user.email.to_string(),
        name: user.name.to_string(),
        is_superuser: user.is_superuser,
        is_staff: user.is_staff,
        organization_id: None,
        profile_type: None,
        permissions: Vec::new(),
        exp: jwt::expiration(config.token_ttl_seconds),
    };
    let requested = organization_id.map(|id| id.to_string());
    let ctx = resolve_access_context(&repo, &claims, requested.as_deref())
        .context("failed to resolve organization")?;
    let token = issue_token(&repo, &ctx, &config.auth()).context("failed to issue token")?;

    Ok(token.access_token)
}

fn main() -> Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let server_config = load_server_config().context("failed to load server config")?;

    match cli.command {
        Commands::Migrate => {
            migrate(&server_config)?;
        }
        Commands::Promote { email, revoke } => promote(&server_config, &email, revoke)?,
        Commands::IssueToken {
            email,
            organization_id,
        } => println!("{}", mint_token(&server_config, &email, organization_id)?),
    }

    Ok(())
}
