//! Command-line entry points: the gateway server plus one-shot lookup and health commands.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::entities::label::LabelService;
use crate::error::LabelGateError;
use crate::sources::openfda::OpenFdaClient;

pub mod health;

#[derive(Debug, Parser)]
#[command(
    name = "labelgate",
    version,
    about = "Normalized openFDA drug label lookups behind a read-through cache"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway (`GET /drug/{name}`)
    Serve {
        #[arg(long, env = "LABELGATE_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "LABELGATE_PORT", default_value_t = 8000)]
        port: u16,
    },
    /// Look up one drug label through the same pipeline the server uses
    Get {
        /// Brand or generic drug name (case-insensitive)
        name: String,
        /// Print the normalized label as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Check connectivity to openFDA and the cache store
    Health {
        #[arg(long)]
        json: bool,
    },
}

/// Builds the label service from configuration.
///
/// The HTTP client and cache backend are created here and owned by the returned
/// service; nothing is kept in process-global state.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built or the cache URL is invalid.
pub fn build_service(config: &Config) -> Result<LabelService, LabelGateError> {
    let http = crate::sources::http_client(&config.http)?;
    let source = OpenFdaClient::new(http, config.openfda_base.clone(), config.api_key.clone());
    let cache = crate::cache::from_settings(&config.cache)?;
    Ok(LabelService::new(source, cache, config.cache.ttl))
}

fn bind_addr(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let addr = format!("{host}:{port}");
    addr.parse()
        .map_err(|err| anyhow::anyhow!("Invalid listen address {addr}: {err}"))
}

/// Runs the gateway until Ctrl-C.
///
/// # Errors
///
/// Returns an error for invalid configuration or when the server fails.
pub async fn serve(config: Config, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = bind_addr(host, port)?;
    let labels = Arc::new(build_service(&config)?);
    info!(
        openfda = %config.openfda_base,
        cache_ttl_secs = config.cache.ttl.as_secs(),
        strict_upstream = config.strict_upstream,
        "starting labelgate"
    );
    crate::server::serve(
        crate::server::AppState {
            labels,
            strict_upstream: config.strict_upstream,
        },
        addr,
    )
    .await
}

/// Runs a one-shot command and returns its rendered output.
///
/// # Errors
///
/// Returns an error when the lookup fails or the command is `serve`.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<String> {
    match cli.command {
        Commands::Get { name, json } => {
            let labels = build_service(&config)?;
            let label = labels.get(&name).await?;
            if json {
                Ok(crate::render::json::to_pretty(&label)?)
            } else {
                Ok(crate::render::markdown::label_markdown(&name, &label))
            }
        }
        Commands::Health { json } => {
            let labels = build_service(&config)?;
            let report = health::check(&labels).await;
            let rendered = if json {
                crate::render::json::to_pretty(&report)?
            } else {
                report.to_markdown()
            };
            if report.all_healthy() {
                Ok(rendered)
            } else {
                Err(anyhow::anyhow!(rendered))
            }
        }
        Commands::Serve { .. } => Err(anyhow::anyhow!(
            "serve is handled by the binary entry point"
        )),
    }
}
