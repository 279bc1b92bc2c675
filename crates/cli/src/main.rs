//! Scentbox CLI - shop and manage the store from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password from SCENTBOX_PASSWORD or --password)
//! sb login -e asha@example.com
//!
//! # Browse and fill the cart
//! sb products list --search oud --sort price_asc
//! sb cart add 65f0c2a1 --qty 2
//!
//! # Check out with a saved address, cash on delivery
//! sb checkout --cod
//!
//! # Admin
//! sb admin orders --status pending
//! sb admin set-order-status 65f0d9e4 processing
//! ```
//!
//! # Environment Variables
//!
//! See `scentbox_storefront::config` for the full list; `SCENTBOX_API_URL`
//! is required.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use scentbox_storefront::{AppError, Storefront, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{
    AddressCommand, AdminCommand, CartCommand, CheckoutArgs, ContactArgs, OrderCommand,
    ProductCommand,
};

#[derive(Parser)]
#[command(name = "sb")]
#[command(author, version, about = "Scentbox storefront and admin CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(long, env = "SCENTBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(long, env = "SCENTBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the local cart
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductCommand,
    },
    /// List categories
    Categories,
    /// List brands
    Brands,
    /// View and change the cart
    Cart {
        #[command(subcommand)]
        action: CartCommand,
    },
    /// Manage saved addresses
    Addresses {
        #[command(subcommand)]
        action: AddressCommand,
    },
    /// Place an order for the cart
    Checkout(CheckoutArgs),
    /// View and cancel orders
    Orders {
        #[command(subcommand)]
        action: OrderCommand,
    },
    /// Send a message to the store
    Contact(ContactArgs),
    /// Store administration (admin accounts only)
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },
}

fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
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

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "scentbox_storefront=info,scentbox_admin=info,scentbox_cli=info".into()
    });

    // Logs go to stderr so command output can be piped.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            eprintln!("error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let mut storefront = Storefront::open(config).await?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(&mut storefront, &email, password).await
        }
        Commands::Register {
            name,
            email,
            password,
        } => commands::account::register(&mut storefront, &name, &email, password).await,
        Commands::Logout => commands::account::logout(&mut storefront).await,
        Commands::Whoami => commands::account::whoami(&storefront).await,
        Commands::Products { action } => commands::catalog::products(&storefront, action).await,
        Commands::Categories => commands::catalog::categories(&storefront).await,
        Commands::Brands => commands::catalog::brands(&storefront).await,
        Commands::Cart { action } => commands::cart::run(&mut storefront, action).await,
        Commands::Addresses { action } => commands::addresses::run(&storefront, action).await,
        Commands::Checkout(args) => commands::checkout::run(&mut storefront, args).await,
        Commands::Orders { action } => commands::orders::run(&storefront, action).await,
        Commands::Contact(args) => commands::contact::run(&storefront, args).await,
        Commands::Admin { action } => commands::admin::run(&storefront, action).await,
    }
}
