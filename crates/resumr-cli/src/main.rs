mod account;
mod address;

use clap::{Parser, Subcommand};
use resumr_core::{AppConfig, SessionStore};
use tracing_subscriber::EnvFilter;

use crate::account::{AdminCommands, ResumeCommands};
use crate::address::AddressCommands;

#[derive(Debug, Parser)]
#[command(name = "resumr")]
#[command(about = "Command line client for the resumr resume builder API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RESUMR_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in user's profile
    Whoami,
    /// Admin panel operations
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    /// Resume operations for the signed-in user
    Resumes {
        #[command(subcommand)]
        command: ResumeCommands,
    },
    /// Address suggestions and validation
    Address {
        #[command(subcommand)]
        command: AddressCommands,
    },
}

/// Opens the persisted session when a path is configured; otherwise the
/// session lives only for this invocation.
fn open_session(config: &AppConfig) -> anyhow::Result<SessionStore> {
    match &config.session_path {
        Some(path) => Ok(SessionStore::open(path)?),
        None => {
            tracing::debug!("RESUMR_SESSION_PATH not set, using in-memory session");
            Ok(SessionStore::in_memory())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = resumr_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("resumr: run with --help to list commands");
        return Ok(());
    };

    match command {
        Commands::Login { email, password } => {
            let session = open_session(&config)?;
            account::run_login(&config, session, &email, &password).await
        }
        Commands::Logout => account::run_logout(&config, open_session(&config)?).await,
        Commands::Whoami => account::run_whoami(&config, open_session(&config)?).await,
        Commands::Admin { command } => {
            account::run_admin(&config, open_session(&config)?, command).await
        }
        Commands::Resumes { command } => {
            account::run_resumes(&config, open_session(&config)?, command).await
        }
        Commands::Address { command } => address::run_address(&config, command).await,
    }
}
