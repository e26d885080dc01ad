//! Hans Institute CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! hans-cli migrate
//!
//! # Create a staff user
//! hans-cli user create -e owner@hanseducation.in -n "Institute Owner" -r super_admin
//!
//! # Change a role
//! hans-cli user set-role -e staff@hanseducation.in -r admin
//!
//! # Seed demo content
//! hans-cli seed
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hans-cli")]
#[command(author, version, about = "Hans Institute CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Seed an empty database with demo content
    Seed,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new staff user
    Create {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Role (`super_admin`, `admin`, `viewer`, `none`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Password (generated and printed if omitted)
        #[arg(short, long, env = "HANS_USER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Assign or revoke a user's role
    SetRole {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Role (`super_admin`, `admin`, `viewer`, `none`)
        #[arg(short, long)]
        role: String,
    },
    /// List staff users
    List,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => commands::user::create(&email, &name, &role, password).await?,
            UserAction::SetRole { email, role } => commands::user::set_role(&email, &role).await?,
            UserAction::List => commands::user::list().await?,
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}
