use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use launchpad::gateway::{AuthGateway, Credentials};
use launchpad::http::ReqwestClient;
use launchpad::navigation::NavigationCoordinator;
use launchpad::notify::TracingNotifier;
use launchpad::router::{MemoryRouter, Router};
use launchpad::storage::FileStorage;
use launchpad::token_store::TokenStore;
use launchpad::{BearerToken, LaunchpadConfig, SessionContext, UserRecord};

#[derive(Parser, Debug)]
#[command(name = "launchpad", about = "Inspect and drive the founder dashboard session")]
struct Cli {
    /// Session file; overrides `LAUNCHPAD_STORE_PATH`.
    #[arg(long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved session.
    Status,
    /// Exchange credentials with the API and store the session.
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LAUNCHPAD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Store a token and user record directly.
    Login {
        #[arg(long)]
        token: String,
        /// User record as a JSON object.
        #[arg(long, default_value = "{}")]
        user: String,
    },
    /// Log out remotely if possible; always clears the local session.
    Logout,
    /// Open `path` and report where the route guard leaves you.
    Visit { path: String },
}

#[tokio::main]
async fn main() -> launchpad::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = LaunchpadConfig::from_env()?;
    if let Some(path) = cli.store {
        config.store_path = path;
    }

    let store = TokenStore::new(Arc::new(FileStorage::new(&config.store_path)));

    let http = Arc::new(ReqwestClient::new(&config.api_url, config.http_timeouts)?);
    let initial = match &cli.command {
        Command::Visit { path } => path.clone(),
        _ => "/".to_owned(),
    };
    let router = Arc::new(MemoryRouter::new(&initial));
    let navigation = NavigationCoordinator::new(router.clone(), config.navigation_timeout);
    let gateway = AuthGateway::new(store, http);
    let context = SessionContext::new(gateway, navigation, Arc::new(TracingNotifier), config.policy.clone());

    tracing::debug!(api_url = %config.api_url, store = %config.store_path.display(), "launchpad configured");

    match cli.command {
        Command::Status => {
            context.bootstrap();
            println!("{:#}", json!(context.session()));
        }
        Command::SignIn { email, password } => {
            context.bootstrap();
            context.sign_in(&Credentials::new(email, password)).await?;
            println!("{:#}", json!({ "session": context.session(), "path": router.current_path() }));
        }
        Command::Login { token, user } => {
            let user = UserRecord::new(serde_json::from_str(&user)?);
            context.bootstrap();
            if !context.login(&BearerToken::new(token), &user) {
                tracing::warn!(store = %config.store_path.display(), "token not stored");
            }
            println!("{:#}", json!(context.session()));
        }
        Command::Logout => {
            context.bootstrap();
            let outcome = context.logout().await;
            println!("{:#}", json!({ "remote_confirmed": outcome == launchpad::gateway::LogoutOutcome::Confirmed }));
        }
        Command::Visit { path } => {
            let action = context.bootstrap();
            println!(
                "{:#}",
                json!({
                    "requested": path,
                    "action": format!("{action:?}"),
                    "path": router.current_path(),
                    "session": context.session(),
                })
            );
        }
    }

    Ok(())
}
