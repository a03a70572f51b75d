//! Session, resume, and admin commands backed by the REST API.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use resumr_client::{
    AdminAuthService, AdminService, ApiClient, AuthService, RequestError, ResumeService,
};
use resumr_core::{AppConfig, Namespace, SessionStore};

#[derive(Debug, Subcommand)]
pub enum AdminCommands {
    /// Sign in to the admin panel
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RESUMR_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out of the admin panel
    Logout,
    /// Show dashboard counters
    Stats,
    /// List users, optionally filtered
    Users {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long, default_value = "20")]
        limit: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Export all users as CSV
    Export {
        /// Output file
        #[arg(long, default_value = "users.csv")]
        output: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum ResumeCommands {
    /// List saved resumes
    List,
    /// Download a resume as PDF
    Download {
        id: String,
        /// Template to render with (server default when omitted)
        #[arg(long)]
        template: Option<String>,
        /// Output file; defaults to `<id>.pdf`
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    println!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Turns a 401 into a hint to sign in again; the session is already cleared.
fn explain(err: RequestError) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::anyhow!("{err} Run `resumr login` to sign in again.")
    } else {
        err.into()
    }
}

pub(crate) async fn run_login(
    config: &AppConfig,
    session: SessionStore,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let auth = AuthService::new(ApiClient::from_config(config, session, Namespace::User)?);
    auth.login(email, password).await?;
    tracing::info!(email, "signed in");
    println!("signed in as {email}");
    Ok(())
}

pub(crate) async fn run_logout(config: &AppConfig, session: SessionStore) -> anyhow::Result<()> {
    let auth = AuthService::new(ApiClient::from_config(config, session, Namespace::User)?);
    auth.logout().await?;
    println!("signed out");
    Ok(())
}

pub(crate) async fn run_whoami(config: &AppConfig, session: SessionStore) -> anyhow::Result<()> {
    let auth = AuthService::new(ApiClient::from_config(config, session, Namespace::User)?);
    if !auth.is_authenticated() {
        anyhow::bail!("not signed in");
    }
    let profile = auth.current_user().await.map_err(explain)?;
    print_json(&profile)
}

pub(crate) async fn run_resumes(
    config: &AppConfig,
    session: SessionStore,
    command: ResumeCommands,
) -> anyhow::Result<()> {
    let resumes = ResumeService::new(ApiClient::from_config(config, session, Namespace::User)?);
    match command {
        ResumeCommands::List => {
            let list = resumes.list().await.map_err(explain)?;
            print_json(&list)
        }
        ResumeCommands::Download {
            id,
            template,
            output,
        } => {
            let bytes = resumes
                .download_pdf(&id, template.as_deref())
                .await
                .map_err(explain)?;
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{id}.pdf")));
            write_file(&output, &bytes)
        }
    }
}

pub(crate) async fn run_admin(
    config: &AppConfig,
    session: SessionStore,
    command: AdminCommands,
) -> anyhow::Result<()> {
    let client = ApiClient::from_config(config, session, Namespace::Admin)?;
    match command {
        AdminCommands::Login { email, password } => {
            let auth = AdminAuthService::new(client);
            auth.login(&email, &password).await?;
            let role = auth.role().unwrap_or_else(|| "unknown".to_owned());
            println!("signed in to admin panel as {email} (role: {role})");
            Ok(())
        }
        AdminCommands::Logout => {
            AdminAuthService::new(client).logout().await?;
            println!("signed out of admin panel");
            Ok(())
        }
        AdminCommands::Stats => {
            let stats = AdminService::new(client)
                .dashboard_stats()
                .await
                .map_err(explain)?;
            print_json(&stats)
        }
        AdminCommands::Users {
            page,
            limit,
            search,
        } => {
            let users = AdminService::new(client)
                .list_users(page, limit, search.as_deref())
                .await
                .map_err(explain)?;
            print_json(&users)
        }
        AdminCommands::Export { output } => {
            let csv = AdminService::new(client)
                .export_users_csv()
                .await
                .map_err(explain)?;
            write_file(&output, &csv)
        }
    }
}
