//! ERW Site Scoring Service
//!
//! HTTP service and batch tooling for scoring Enhanced Rock Weathering
//! candidate sites.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP service (default subcommand)
//! erw-sitescore serve --addr 0.0.0.0:8080
//!
//! # Score a file of requests (one object or an array) and print assessments
//! erw-sitescore score --input sites.json
//!
//! # Seed the site store from a JSON array of sites
//! erw-sitescore --config erw_config.toml import --file seed.json
//! ```
//!
//! # Environment Variables
//!
//! - `ERW_CONFIG`: Path to the TOML config file
//! - `ERW_SERVER_ADDR`: Listen address for `serve`
//! - `ERW_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `ERW_LOG_FORMAT`: Set to `json` for JSON log lines
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use erw_sitescore::api::{create_app, ApiState};
use erw_sitescore::config::watcher::{run_config_watcher, ConfigEvent};
use erw_sitescore::config::{LoadedConfig, ServiceConfig};
use erw_sitescore::storage::{import_sites, open_repository};
use erw_sitescore::types::{NewSite, SiteAssessment};
use erw_sitescore::validation::SiteScoreRequest;
use erw_sitescore::SiteScorer;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "erw-sitescore")]
#[command(about = "ERW site suitability, carbon and cost scoring service")]
#[command(version)]
struct CliArgs {
    /// Path to the TOML config file (overrides ERW_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP service
    Serve {
        /// Override the listen address from the config file
        #[arg(short, long, env = "ERW_SERVER_ADDR", value_name = "HOST:PORT")]
        addr: Option<String>,
    },

    /// Score one request object or an array of them and print the assessments
    Score {
        /// JSON file with scoring request(s)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Seed the site store from a JSON array of sites
    Import {
        /// JSON file with `{name, region, latitude, longitude, score}` rows
        #[arg(short, long)]
        file: PathBuf,
    },
}

// ============================================================================
// Logging
// ============================================================================

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("ERW_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

// ============================================================================
// Serve
// ============================================================================

#[derive(Debug)]
enum TaskName {
    HttpServer,
    ConfigWatcher,
    ConfigEvents,
}

async fn run_serve(loaded: LoadedConfig, addr_override: Option<String>) -> Result<()> {
    let LoadedConfig { config, source } = loaded;

    let scorer = SiteScorer::new(config.scoring.clone()).context("Invalid scoring configuration")?;
    let store = open_repository(&config.storage)?;

    let mut state = ApiState::new(scorer, store);
    if let Some(path) = &source {
        state = state.with_config_path(path.clone());
    }

    let server_addr = addr_override.unwrap_or(config.server.addr);

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  ERW Site Scoring Service v{}", env!("CARGO_PKG_VERSION"));
    info!("  Scoring formula v{}", state.scorer.load().version());
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();

    if let Some(path) = source {
        spawn_config_watcher(&mut task_set, path, &state, cancel_token.clone());
    }

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!("HTTP server listening on {}", server_addr);

    let server_token = cancel_token.clone();
    task_set.spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                server_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await
            .context("HTTP server error")?;
        Ok(TaskName::HttpServer)
    });

    while let Some(joined) = task_set.join_next().await {
        match joined {
            Ok(Ok(task)) => info!(?task, "Task finished"),
            Ok(Err(e)) => {
                error!("Task failed: {:#}", e);
                cancel_token.cancel();
            }
            Err(e) => {
                error!("Task panicked: {}", e);
                cancel_token.cancel();
            }
        }
    }

    info!("Shutdown complete");
    Ok(())
}

fn spawn_config_watcher(
    task_set: &mut JoinSet<Result<TaskName>>,
    path: PathBuf,
    state: &ApiState,
    cancel_token: CancellationToken,
) {
    let (tx, mut rx) = mpsc::channel(8);

    task_set.spawn(run_config_watcher_task(path, Arc::clone(&state.scorer), tx, cancel_token));
    task_set.spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ConfigEvent::Reloaded(changes) if changes.is_empty() => {}
                ConfigEvent::Reloaded(changes) => info!(changed = changes.len(), "Scoring config hot-reloaded"),
                ConfigEvent::Error(e) => warn!(error = %e, "Scoring config reload rejected"),
            }
        }
        Ok(TaskName::ConfigEvents)
    });
}

async fn run_config_watcher_task(
    path: PathBuf,
    scorer: Arc<arc_swap::ArcSwap<SiteScorer>>,
    tx: mpsc::Sender<ConfigEvent>,
    cancel_token: CancellationToken,
) -> Result<TaskName> {
    run_config_watcher(path, scorer, tx, cancel_token).await;
    Ok(TaskName::ConfigWatcher)
}

// ============================================================================
// Batch scoring
// ============================================================================

fn read_requests(path: &Path) -> Result<Vec<SiteScoreRequest>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let requests = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(requests)
}

fn run_score(config: &ServiceConfig, input: &Path) -> Result<()> {
    let scorer = SiteScorer::new(config.scoring.clone()).context("Invalid scoring configuration")?;
    let requests = read_requests(input)?;
    info!(count = requests.len(), "Scoring requests");

    let assessments: Vec<SiteAssessment> = requests
        .into_par_iter()
        .enumerate()
        .map(|(i, request)| {
            request
                .into_parameters()
                .map(|params| scorer.score(&params))
                .with_context(|| format!("Request #{i} rejected"))
        })
        .collect::<Result<_>>()?;

    println!("{}", serde_json::to_string_pretty(&assessments)?);
    Ok(())
}

// ============================================================================
// Import
// ============================================================================

fn run_import(config: &ServiceConfig, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let sites: Vec<NewSite> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    let store = open_repository(&config.storage)?;
    let summary = import_sites(store.as_ref(), sites).context("Import aborted")?;

    info!(
        imported = summary.imported,
        skipped = summary.skipped,
        rejected = summary.rejected,
        total = store.count()?,
        "Import complete"
    );
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let loaded = ServiceConfig::load(args.config.as_deref());

    match args.command.unwrap_or(SubCommand::Serve { addr: None }) {
        SubCommand::Serve { addr } => run_serve(loaded, addr).await,
        SubCommand::Score { input } => run_score(&loaded.config, &input),
        SubCommand::Import { file } => run_import(&loaded.config, &file),
    }
}
