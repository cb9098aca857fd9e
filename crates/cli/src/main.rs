//! Halwa Delights CLI - Database migrations, seeding and role management.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! halwa-cli migrate
//!
//! # Load the bundled sample catalog (or a custom one)
//! halwa-cli seed
//! halwa-cli seed --file catalog.yaml
//!
//! # Grant or revoke admin console access
//! halwa-cli user grant-admin -e owner@halwadelights.in
//! halwa-cli user revoke-admin -e former@halwadelights.in
//! ```
//!
//! Reads `DATABASE_URL` (or `STOREFRONT_DATABASE_URL`), loading `.env` first.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use halwa_core::UserRole;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "halwa-cli")]
#[command(author, version, about = "Halwa Delights CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert sample products, offers and popular picks
    Seed {
        /// YAML catalog to load instead of the bundled sample
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Manage account roles
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Give an existing account access to the admin console
    GrantAdmin {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Return an admin account to a regular customer
    RevokeAdmin {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
        Commands::User { action } => match action {
            UserAction::GrantAdmin { email } => {
                commands::user::set_role(&email, UserRole::Admin).await?;
            }
            UserAction::RevokeAdmin { email } => {
                commands::user::set_role(&email, UserRole::Customer).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_grant_admin() {
        let cli = Cli::try_parse_from(["halwa-cli", "user", "grant-admin", "-e", "a@b.in"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::User {
                action: UserAction::GrantAdmin { .. }
            })
        ));
    }
}
