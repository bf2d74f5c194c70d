//! Ecwid Shop CLI - Browse an Ecwid catalog and manage a local cart.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shop categories
//! shop products --category 12345
//! shop product 692730761
//!
//! # Manage the cart (persisted between runs)
//! shop cart add 692730761 -q 2
//! shop cart show
//! shop cart update 692730761 5
//! shop cart remove 692730761
//! shop cart clear
//!
//! # Switch interface language
//! shop locale ru
//! ```
//!
//! Configuration is read from the environment (and `.env`); see
//! `ecwid_shop_storefront::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecwid_shop_core::{CategoryId, ProductId};
use ecwid_shop_storefront::catalog::DEFAULT_PRODUCT_LIMIT;
use ecwid_shop_storefront::config::StorefrontConfig;
use ecwid_shop_storefront::error::AppError;
use ecwid_shop_storefront::state::AppState;

mod commands;
mod views;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Ecwid storefront on the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List store categories
    Categories,
    /// List products
    Products {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Maximum number of products to list
        #[arg(short, long, default_value_t = DEFAULT_PRODUCT_LIMIT)]
        limit: u32,
    },
    /// Show one product
    Product {
        /// Product ID
        id: ProductId,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show or change the interface language
    Locale {
        /// Language code (`en`, `ru`)
        code: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        id: ProductId,

        /// Number of units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the quantity of a product in the cart (0 removes it)
    Update {
        /// Product ID
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove everything from the cart
    Clear,
}

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "ecwid_shop_storefront=info,ecwid_shop_cli=info";

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter` and Sentry integration.
///
/// Logs go to stderr so they never mix with command output.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Guard flushes queued events when main returns
    let _sentry_guard = init_sentry(&config);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_server_fault() {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Command failed");
            } else {
                tracing::error!("Command failed: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let mut state = AppState::new(config)?;

    match cli.command {
        Commands::Categories => commands::catalog::categories(&state).await?,
        Commands::Products { category, limit } => {
            commands::catalog::products(&state, category, limit).await?;
        }
        Commands::Product { id } => commands::catalog::product(&state, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state),
            CartAction::Add { id, quantity } => {
                commands::cart::add(&mut state, id, quantity).await?;
            }
            CartAction::Remove { id } => commands::cart::remove(&mut state, id),
            CartAction::Update { id, quantity } => {
                commands::cart::update(&mut state, id, quantity);
            }
            CartAction::Clear => commands::cart::clear(&mut state),
        },
        Commands::Locale { code } => commands::locale::run(&mut state, code.as_deref())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_update_negative() {
        let cli = Cli::try_parse_from(["shop", "cart", "update", "7", "-1"]).ok();
        assert!(matches!(
            cli.map(|c| c.command),
            Some(Commands::Cart {
                action: CartAction::Update { quantity: -1, .. }
            })
        ));
    }

    #[test]
    fn test_default_log_filter_parses() {
        assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        assert!(DEFAULT_LOG_FILTER.contains("ecwid_shop_storefront=info"));
    }

    #[test]
    fn test_parse_products_defaults() {
        let cli = Cli::try_parse_from(["shop", "products"]).ok();
        assert!(matches!(
            cli.map(|c| c.command),
            Some(Commands::Products {
                category: None,
                limit: DEFAULT_PRODUCT_LIMIT
            })
        ));
    }
}
