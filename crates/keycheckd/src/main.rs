use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use keycheck_server::{render, LicenseRequest, PresentationDefaults, ServerConfig};
use tracing_subscriber::EnvFilter;

// ── CLI definition ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "keycheckd",
    about = "Keycheckd — license validation server daemon",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level: error, warn, info, debug, verbose (default: $KEYCHECK_LOG_LEVEL or warn)
    #[arg(long, global = true, env = "KEYCHECK_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the validation HTTP server
    Serve {
        /// Port to listen on (default: $KEYCHECK_PORT or 3000)
        #[arg(long, env = "KEYCHECK_PORT", default_value = "3000")]
        port: u16,
        /// Host to bind (default: $KEYCHECK_HOST or 0.0.0.0)
        #[arg(long, env = "KEYCHECK_HOST", default_value = "0.0.0.0")]
        host: String,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Validate one key against the live catalog and print the response body
    Check {
        /// License key to validate
        #[arg(long)]
        key: String,
        /// Referer URL to present for the domain check
        #[arg(long)]
        referer: Option<String>,
        /// Origin URL to present when no referer is given
        #[arg(long)]
        origin: Option<String>,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

#[derive(clap::Args)]
struct CatalogArgs {
    /// URL of the JSON license catalog (default: $KEYCHECK_CATALOG_URL)
    #[arg(long, env = "KEYCHECK_CATALOG_URL")]
    catalog_url: Option<String>,
    /// Timeout for a single catalog fetch, e.g. "10s" (default: none)
    #[arg(long, env = "KEYCHECK_FETCH_TIMEOUT", value_parser = humantime::parse_duration)]
    fetch_timeout: Option<Duration>,
}

impl CatalogArgs {
    fn into_config(self, host: String, port: u16) -> ServerConfig {
        let base = ServerConfig::default();
        ServerConfig {
            host,
            port,
            catalog_url: self.catalog_url.unwrap_or(base.catalog_url),
            fetch_timeout: self.fetch_timeout.or(base.fetch_timeout),
            defaults: PresentationDefaults::default(),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables take precedence.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let raw = cli.log_level.unwrap_or_else(|| "warn".into());
    let effective_log_level = if raw.eq_ignore_ascii_case("verbose") {
        "debug".to_owned()
    } else {
        raw
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&effective_log_level))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            catalog,
        } => keycheck_server::run(catalog.into_config(host, port)).await,

        Commands::Check {
            key,
            referer,
            origin,
            catalog,
        } => cmd_check(key, referer, origin, catalog).await,
    }
}

// ── Command implementations ───────────────────────────────────────────────────

async fn cmd_check(
    key: String,
    referer: Option<String>,
    origin: Option<String>,
    catalog: CatalogArgs,
) -> Result<()> {
    let cfg = catalog.into_config(String::new(), 0);
    let state = cfg.app_state()?;
    tracing::debug!(catalog_url = state.validator.catalog_url(), "validating key against catalog");

    let req = LicenseRequest {
        key: Some(&key),
        referer: referer.as_deref(),
        origin: origin.as_deref(),
        now: Utc::now(),
    };
    let result = state.validator.validate(&req).await;
    let (status, body) = render(&result);

    println!(
        "{}",
        serde_json::to_string_pretty(&body).context("encode response body")?
    );

    if let Err(e) = result {
        anyhow::bail!("{} ({status}): {}", e.code(), e);
    }
    Ok(())
}
