//! # VitalConnect Checkout Desk
//!
//! Terminal front end for a facility's point of sale: pick items from the
//! facility's inventory, build a cart, print a bill, record the sale.
//!
//! ## Module Organization
//! ```text
//! vital_cli/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap definitions
//! ├── shell.rs        ◄─── Interactive dispatch loop
//! ├── render.rs       ◄─── Plain-text tables
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── CartStore (watch channel)
//! │   └── config.rs   ◄─── AppConfig, BillingConfig
//! ├── commands/       ◄─── One function per operation
//! └── error.rs        ◄─── UserError for commands
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr)
//! 2. Load configuration from the environment, apply flag overrides
//! 3. Restore the stored session
//! 4. Run the one-shot subcommand, or:
//! 5. Resolve the facility and load its inventory, then start the shell
//!
//! Step 5 never fails the program: without a backend the shell starts
//! offline with an empty catalog.

pub mod cli;
pub mod commands;
pub mod error;
pub mod render;
pub mod shell;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use anyhow::Context;
use serde::Serialize;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vital_client::{ApiClient, AuthService, SessionStore};

use cli::{Cli, Command};
use commands::inventory::{load_catalog, Catalog};
use shell::Shell;
use state::{AppConfig, BillingConfig};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn,vital=info";

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so they never interleave with bills on stdout.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vital_client=trace` - Request tracing for the backend client
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs the program for parsed arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(url) = &cli.api_url {
        config.client = config.client.with_api_url(url)?;
    }
    if let Some(path) = &cli.session_file {
        config.client = config.client.with_session_path(path);
    }

    let store = SessionStore::from_config(&config.client)?;
    let mut auth = AuthService::restore(ApiClient::new(&config.client), store)?;
    info!(
        api_url = %config.client.api_url,
        logged_in = auth.is_logged_in(),
        "VitalConnect checkout desk starting"
    );

    let json = cli.json;
    match cli.command.unwrap_or(Command::Shell) {
        Command::Login { email, password } => {
            let facility = commands::auth::login(&mut auth, &email, &password).await?;
            emit(json, &facility, render::facility_card)?;
        }
        Command::Register(args) => {
            let (form, confirm) = args.into_form();
            let facility = commands::auth::register(&mut auth, &form, &confirm).await?;
            emit(json, &facility, render::facility_card)?;
        }
        Command::Logout => {
            commands::auth::logout(&mut auth)?;
            println!("Logged out.");
        }
        Command::Whoami => {
            let facility = commands::auth::whoami(&mut auth).await?;
            emit(json, &facility, render::facility_card)?;
        }
        Command::Nearby { lat, lon, limit } => {
            let from = commands::nearby::origin(lat, lon)?;
            let rows = commands::nearby::nearby(auth.api(), from, limit).await?;
            emit(json, &rows, |rows| render::nearby_table(rows))?;
        }
        Command::Inventory { query } => {
            let facility = commands::auth::resolve_facility(&mut auth).await?;
            let catalog = load_catalog(auth.api(), &facility.id).await?;
            let hits = catalog.search(query.as_deref().unwrap_or_default())?;
            emit(json, &hits, |hits| render::items_table(hits))?;
        }
        Command::Stats => {
            let facility = commands::auth::resolve_facility(&mut auth).await?;
            let stats = commands::inventory::facility_stats(auth.api(), &facility.id).await?;
            emit(json, &stats, render::stats_block)?;
        }
        Command::Shell => start_shell(&mut auth, &config.billing).await?,
    }
    Ok(())
}

/// Resolves the facility and its inventory, then hands stdin/stdout to the
/// shell.
async fn start_shell(auth: &mut AuthService, billing: &BillingConfig) -> anyhow::Result<()> {
    let (facility, catalog) = match commands::auth::resolve_facility(auth).await {
        Ok(facility) => match load_catalog(auth.api(), &facility.id).await {
            Ok(catalog) => (Some(facility), catalog),
            Err(e) => {
                warn!(code = ?e.code, "Inventory unavailable");
                eprintln!("warning: {e}");
                (Some(facility), Catalog::default())
            }
        },
        Err(e) => {
            warn!(code = ?e.code, "No facility; starting offline");
            eprintln!("warning: {e}; starting offline");
            (None, Catalog::default())
        }
    };

    let input = BufReader::new(tokio::io::stdin());
    let mut shell = Shell::new(input, tokio::io::stdout(), catalog, billing);
    if let Some(facility) = facility {
        shell = shell.with_backend(auth.api(), facility);
    }
    shell.run().await?;
    Ok(())
}

/// Prints `value` as pretty JSON or through its text renderer.
fn emit<T, F>(json: bool, value: &T, text: F) -> anyhow::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text(value));
    }
    Ok(())
}
