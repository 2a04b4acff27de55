//! User management CLI commands.

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use etmf_auth::{PasswordHasher, PasswordPolicy};
use etmf_core::config::AppConfig;
use etmf_database::TableStore;
use etmf_entity::user::{User, UserRole};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all users
    List,
    /// Create a user
    Create {
        /// Login e-mail
        email: String,
        /// Name shown in the UI
        #[arg(long)]
        display_name: String,
        /// Role: admin, manager, contributor, or viewer
        #[arg(long, default_value = "viewer")]
        role: String,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Allow a user to log in
    Enable {
        /// Login e-mail
        email: String,
    },
    /// Prevent a user from logging in
    Disable {
        /// Login e-mail
        email: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    id: String,
    email: String,
    display_name: String,
    role: String,
    active: bool,
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email.clone(),
            display_name: u.display_name.clone(),
            role: u.role.to_string(),
            active: u.is_active,
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(args: &UserArgs, config: &AppConfig, format: OutputFormat) -> anyhow::Result<()> {
    let store = super::open_store(config).await?;

    match &args.command {
        UserCommand::List => {
            let users = store.list::<User>().await?;
            let rows: Vec<UserRow> = users.iter().map(UserRow::from).collect();
            output::print_list(&rows, format)?;
        }
        UserCommand::Create {
            email,
            display_name,
            role,
            password,
        } => {
            let role: UserRole = role.parse()?;
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()
                    .context("Failed to read password")?,
            };
            PasswordPolicy::new(&config.auth).validate(&password)?;
            let hasher = PasswordHasher::new();

            let user = User {
                id: Uuid::new_v4(),
                email: email.trim().to_string(),
                display_name: display_name.clone(),
                role,
                is_active: true,
                password_hash: hasher.hash_password(&password)?,
                password: None,
                created_at: Utc::now(),
            };
            let user = store.insert(&user).await?;
            output::print_success(&format!("User '{}' created", user.email));
            output::print_kv("id", user.id);
            output::print_kv("role", user.role);
        }
        UserCommand::Enable { email } => {
            set_active(&store, email, true).await?;
            output::print_success(&format!("User '{email}' enabled"));
        }
        UserCommand::Disable { email } => {
            set_active(&store, email, false).await?;
            output::print_success(&format!("User '{email}' disabled"));
        }
    }

    Ok(())
}

async fn set_active(store: &TableStore, email: &str, active: bool) -> anyhow::Result<()> {
    let Some(mut user) = store.find_first_by::<User>("email", email.trim()).await? else {
        bail!("User '{email}' not found");
    };
    user.is_active = active;
    store.update(&user).await?;
    Ok(())
}
