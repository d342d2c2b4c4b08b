mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use umc_client::SessionFlows;
use umc_shared::SortOrder;
use umc_shared::config::AppConfig;
use umc_store::{FileStorage, SessionStore};

#[derive(Parser)]
#[command(name = "umc-console")]
#[command(about = "Console for the user management backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file layered over the built-in defaults
    #[arg(short, long, env = "UMC_CONFIG")]
    config: Option<String>,

    /// Overrides `api.base_url`
    #[arg(long, env = "UMC_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "UMC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Exchange a Google ID token for a session
    GoogleLogin {
        #[arg(long)]
        id_token: String,
    },
    /// Finish an OAuth redirect with the tokens it carried
    OauthComplete {
        #[arg(long)]
        access_token: Option<String>,
        #[arg(long)]
        refresh_token: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "UMC_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Request a password reset email
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Set a new password with the emailed reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Confirm an email address
    VerifyEmail {
        #[arg(long)]
        token: String,
    },
    /// Show the current session
    Whoami,
    /// Edit your own profile
    Profile {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        /// Profile picture to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Change your password (ends the session)
    Password {
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// User administration (admin only)
    #[command(subcommand)]
    Users(UsersCommand),
    /// End the session
    Logout,
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List users
    List {
        #[arg(long, default_value_t = umc_shared::constants::DEFAULT_PAGE)]
        page: u32,
        #[arg(long, default_value_t = umc_shared::constants::DEFAULT_PAGE_SIZE)]
        limit: u32,
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long, default_value = umc_shared::constants::DEFAULT_SORT_BY)]
        sort_by: String,
        #[arg(long, default_value = "DESC")]
        sort_order: SortOrder,
    },
    /// Show one user
    Show { id: String },
    /// Edit a user's details and role
    Edit {
        id: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        role: String,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long)]
        designation: Option<String>,
    },
    /// Delete a user
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }

    // Initialize telemetry; the guard flushes the file writer on exit
    let _guard = umc_shared::telemetry::init_telemetry(&config.log);
    info!("Using API at {}", config.api.base_url);

    let storage = Arc::new(FileStorage::new(&config.storage.dir));
    let store = Arc::new(SessionStore::open(storage, config.storage.key.clone()));
    let flows = SessionFlows::from_config(&config, store)?;

    commands::run(cli.command, &flows).await
}
