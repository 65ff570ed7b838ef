//! Maintenance CLI for the family core.
//!
//! Every command prints one JSON object on stdout; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use family_core::common::{FamilyId, UserId};
use family_core::config::Config;
use family_core::domains::families::actions::delete_family;
use family_core::domains::families::invite_code::resolve_code;
use family_core::domains::memberships::actions::expire_invitations;
use family_core::domains::users::actions::delete_account;
use family_core::kernel::{FamilyDeps, PgStore};

#[derive(Parser)]
#[command(name = "family_admin")]
#[command(about = "Administrative commands for family memberships")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,

    /// Delete a user account and everything it authored
    DeleteUser { user: UserId },

    /// Delete a family on behalf of its owner
    DeleteFamily { actor: UserId, family: FamilyId },

    /// Print the family an invite code belongs to
    ResolveCode { code: String },

    /// Turn stale pending invitations into declined ones
    ExpireInvitations,
}

#[derive(Serialize)]
struct Response {
    success: bool,
    command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn output(resp: &Response) -> Result<()> {
    println!("{}", serde_json::to_string(resp)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,family_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgStore::new(pool));
    let deps = FamilyDeps::with_store(store.clone(), config.engine);

    let name = cli.command.name();
    let outcome = run(cli.command, &store, &deps).await;

    let resp = match outcome {
        Ok(result) => Response {
            success: true,
            command: name,
            result: Some(result),
            error: None,
        },
        Err(e) => Response {
            success: false,
            command: name,
            result: None,
            error: Some(format!("{:#}", e)),
        },
    };
    output(&resp)?;

    if !resp.success {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Commands, store: &PgStore, deps: &FamilyDeps) -> Result<Value> {
    let value = match command {
        Commands::Migrate => {
            sqlx::migrate!("./migrations")
                .run(store.pool())
                .await
                .context("Failed to run migrations")?;
            json!({ "migrated": true })
        }
        Commands::DeleteUser { user } => {
            let report = delete_account(user, deps).await?;
            serde_json::to_value(report)?
        }
        Commands::DeleteFamily { actor, family } => {
            let report = delete_family(actor, family, deps).await?;
            serde_json::to_value(report)?
        }
        Commands::ResolveCode { code } => {
            let family_id = resolve_code(&code, deps).await?;
            json!({ "family_id": family_id })
        }
        Commands::ExpireInvitations => {
            let expired = expire_invitations(Utc::now(), deps).await?;
            json!({ "expired": expired })
        }
    };
    Ok(value)
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Migrate => "migrate",
            Self::DeleteUser { .. } => "delete-user",
            Self::DeleteFamily { .. } => "delete-family",
            Self::ResolveCode { .. } => "resolve-code",
            Self::ExpireInvitations => "expire-invitations",
        }
    }
}
