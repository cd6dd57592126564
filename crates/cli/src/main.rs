//! SalesDesk CLI - command-line front-end for the SalesDesk backend.
//!
//! # Usage
//!
//! ```bash
//! # Point the client at a server (default 127.0.0.1:8080)
//! sd-cli endpoint set 192.168.1.20 8080
//!
//! # Sign in (password from --password or SALESDESK_PASSWORD)
//! sd-cli login -e cashier@shop.example
//!
//! # Browse and record
//! sd-cli products list --name beans --page 2
//! sd-cli sales create --product-id 3 --quantity 2
//!
//! # Ask the assistant
//! sd-cli chat "what sold best today?"
//! ```
//!
//! # Commands
//!
//! - `endpoint` - Show or change the server address
//! - `login` / `logout` / `whoami` - Session management
//! - `register` / `activate` - Account sign-up
//! - `products` / `sales` / `users` - Resource management
//! - `chat` - Forward a message to the server-side assistant
//!
//! # Environment Variables
//!
//! - `SALESDESK_STATE_FILE` - Where the session is stored
//! - `SALESDESK_TIMEOUT_SECS` - Request timeout
//! - `SALESDESK_LOG_JSON` - Emit JSON logs when set
//! - `RUST_LOG` - Log filter (default `salesdesk_client=info,salesdesk_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use salesdesk_client::{ClientConfig, DefaultAppState};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    CliError, chat::ChatArgs, endpoint::EndpointAction, products::ProductAction,
    sales::SaleAction, session::SessionCommand, users::UserAction,
};

const DEFAULT_LOG_FILTER: &str = "salesdesk_client=info,salesdesk_cli=info";

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(author, version, about = "SalesDesk command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the server address
    Endpoint {
        #[command(subcommand)]
        action: EndpointAction,
    },
    #[command(flatten)]
    Session(SessionCommand),
    /// Browse and manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Browse and record sales
    Sales {
        #[command(subcommand)]
        action: SaleAction,
    },
    /// Administer user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Send a message to the assistant
    Chat(ChatArgs),
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var_os("SALESDESK_LOG_JSON").is_some() {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(state_file = %config.state_file.display(), "Loaded configuration");
    let state = DefaultAppState::from_config(&config)?;

    match cli.command {
        Commands::Endpoint { action } => commands::endpoint::run(&state, action).await,
        Commands::Session(command) => commands::session::run(&state, command).await,
        Commands::Products { action } => commands::products::run(&state, action).await,
        Commands::Sales { action } => commands::sales::run(&state, action).await,
        Commands::Users { action } => commands::users::run(&state, action).await,
        Commands::Chat(args) => commands::chat::run(&state, args).await,
    }
}
