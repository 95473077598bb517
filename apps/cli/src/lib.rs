//! # Storefront CLI Library
//!
//! Argument parsing, startup and command dispatch for `shop`.
//!
//! ## Module Organization
//! ```text
//! storefront_cli/
//! ├── lib.rs          ◄─── You are here (parsing, startup, dispatch)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── catalog.rs  ◄─── products, product <ID>
//! │   ├── cart.rs     ◄─── cart show/add/remove/set/clear
//! │   ├── auth.rs     ◄─── login, register, logout, whoami
//! │   ├── checkout.rs ◄─── checkout
//! │   ├── orders.rs   ◄─── orders
//! │   └── config.rs   ◄─── config show/init
//! └── error.rs        ◄─── CLI error type and exit codes
//! ```

pub mod commands;
pub mod error;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use storefront_client::{ClientConfig, Storefront};
use storefront_core::DEFAULT_PAGE_LIMIT;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Browse the storefront, manage your cart and check out")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep the session and cart in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List products
    Products {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
    },
    /// Show one product
    Product { id: String },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Sign in
    Login {
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Place an order for the cart
    Checkout,
    /// Show your order history
    Orders,
    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

impl Command {
    /// Subcommand name, safe to log (never includes arguments).
    pub fn name(&self) -> &'static str {
        match self {
            Command::Products { .. } => "products",
            Command::Product { .. } => "product",
            Command::Cart { .. } => "cart",
            Command::Login { .. } => "login",
            Command::Register { .. } => "register",
            Command::Logout => "logout",
            Command::Whoami => "whoami",
            Command::Checkout => "checkout",
            Command::Orders => "orders",
            Command::Config { .. } => "config",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// List the cart lines and total
    Show,
    /// Add one unit of a product
    Add { id: String },
    /// Remove a product's line
    Remove { id: String },
    /// Set a line's quantity
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a config file with default settings
    Init {
        /// Backend base URL to store
        #[arg(long)]
        api_url: Option<String>,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parses arguments, runs one command and maps the result to an exit code.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging     tracing-subscriber, RUST_LOG, stderr        │
/// │  2. Load Configuration     defaults → config.toml → STOREFRONT_* env   │
/// │  3. Open Storefront        store → HttpApi → session.initialize()      │
/// │                            → cart hydration                            │
/// │  4. Dispatch Command       output on stdout, errors on stderr          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match execute(cli, &mut out).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

/// Loads configuration, opens the client and runs the command.
///
/// `config` commands run before anything is opened, so they work with a
/// missing or broken config file.
pub async fn execute(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let Cli {
        config: config_path,
        ephemeral,
        command,
    } = cli;

    let command = match command {
        Command::Config { action } => return commands::config::run(action, config_path, out),
        command => command,
    };

    let config = match config_path {
        Some(path) => ClientConfig::load(Some(path))?,
        None => ClientConfig::load_or_default(None),
    };
    info!(api = %config.base_url(), ephemeral, "Starting shop");

    let shop = Storefront::open(&config, ephemeral).await?;
    dispatch(&shop, command, out).await
}

/// Runs one command against an opened storefront.
pub async fn dispatch(shop: &Storefront, command: Command, out: &mut dyn Write) -> Result<(), CliError> {
    debug!(command = command.name(), "Dispatching command");

    match command {
        Command::Products { skip, limit } => commands::catalog::list(shop, skip, limit, out).await,
        Command::Product { id } => commands::catalog::show(shop, &id, out).await,
        Command::Cart { action } => match action {
            CartAction::Show => commands::cart::show(shop, out),
            CartAction::Add { id } => commands::cart::add(shop, &id, out).await,
            CartAction::Remove { id } => commands::cart::remove(shop, &id, out),
            CartAction::Set { id, quantity } => commands::cart::set_quantity(shop, &id, quantity, out),
            CartAction::Clear => commands::cart::clear(shop, out),
        },
        Command::Login { email, password } => {
            commands::auth::login(shop, &email, SecretString::from(password), out).await
        }
        Command::Register {
            email,
            password,
            confirm,
        } => {
            commands::auth::register(
                shop,
                &email,
                SecretString::from(password),
                SecretString::from(confirm),
                out,
            )
            .await
        }
        Command::Logout => commands::auth::logout(shop, out),
        Command::Whoami => commands::auth::whoami(shop, out),
        Command::Checkout => commands::checkout::checkout(shop, out).await,
        Command::Orders => commands::orders::show(shop, out).await,
        // Uses the default config location
        Command::Config { action } => commands::config::run(action, None, out),
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_client=trace` - Trace the client crate only
/// - Default: INFO, DEBUG for the storefront crates
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,storefront=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cart_set_with_negative_quantity() {
        let cli = Cli::try_parse_from(["shop", "cart", "set", "abc", "-1"]).unwrap();
        match cli.command {
            Command::Cart {
                action: CartAction::Set { id, quantity },
            } => {
                assert_eq!(id, "abc");
                assert_eq!(quantity, -1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_and_defaults() {
        let cli = Cli::try_parse_from(["shop", "products", "--ephemeral"]).unwrap();
        assert!(cli.ephemeral);
        assert!(matches!(
            cli.command,
            Command::Products { skip: 0, limit } if limit == DEFAULT_PAGE_LIMIT
        ));
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from([
            "shop",
            "--config",
            "/tmp/shop.toml",
            "config",
            "init",
            "--api-url",
            "https://shop.example.com",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/shop.toml")));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Init { api_url: Some(ref url), force: false },
            } if url == "https://shop.example.com"
        ));
    }

    #[tokio::test]
    async fn test_config_command_skips_storefront_startup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cli = Cli::try_parse_from(["shop", "config", "init", "--config", path.to_str().unwrap()]).unwrap();
        let mut out = Vec::new();

        execute(cli, &mut out).await.unwrap();

        assert!(path.exists());
        assert!(String::from_utf8(out).unwrap().starts_with("Wrote "));
    }

    #[test]
    fn test_register_requires_confirmation() {
        assert!(Cli::try_parse_from(["shop", "register", "a@b.c", "--password", "pw"]).is_err());
    }
}
