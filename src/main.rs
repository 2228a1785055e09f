// ABOUTME: Entry point for the conclave binary.
// ABOUTME: Parses CLI arguments, initializes tracing, then serves the web relay or runs one debate in-process.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conclave_agent::{
    DebateEngine, FanoutSink, HttpPushSink, MessageSink, ModelClient, ProviderRouter, TracingSink,
};
use conclave_core::{DebateOutcome, validate_batch};
use conclave_server::api::deck::DeckSubmission;
use conclave_server::{AppState, ConclaveConfig, ProviderStatus, create_router};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "conclave=debug,conclave_server=debug,conclave_agent=debug,tower_http=debug";

#[derive(Parser)]
#[command(name = "conclave", version)]
#[command(about = "Multi-model puzzle debates with a live web relay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server and web UI
    Serve {
        /// Socket address to bind (overrides CONCLAVE_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Directory holding the built frontend (overrides CONCLAVE_STATIC_DIR)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Run one debate in this process and print the outcome as JSON
    Run {
        /// The puzzle to debate
        #[arg(long)]
        puzzle: String,

        /// JSON file with the participant cards
        #[arg(long)]
        cards: PathBuf,

        /// Maximum rounds (overrides CONCLAVE_MAX_ROUNDS)
        #[arg(long)]
        max_rounds: Option<u32>,

        /// Also push every message to this server's /api/message
        #[arg(long)]
        push_url: Option<String>,

        /// Seed for the speaker shuffle
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ConclaveConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Command::Serve { bind, static_dir } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(static_dir) = static_dir {
                config.static_dir = static_dir;
            }
            serve(config).await
        }
        Command::Run {
            puzzle,
            cards,
            max_rounds,
            push_url,
            seed,
        } => {
            if let Some(max_rounds) = max_rounds {
                config.max_rounds = max_rounds;
            }
            if push_url.is_some() {
                config.push_url = push_url;
            }
            let outcome = run_once(&config, &puzzle, &cards, seed).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
    }
}

async fn serve(config: ConclaveConfig) -> Result<()> {
    let provider_status = ProviderStatus::detect();
    if !provider_status.any_available {
        tracing::warn!("no provider API keys found; every model turn will fail until one is set");
    }

    let client: Arc<dyn ModelClient> = Arc::new(ProviderRouter::from_env());
    let state = Arc::new(
        AppState::new(client, config.debate_config(), provider_status)
            .with_push_url(config.push_url.clone()),
    );
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(
        addr = %config.bind,
        static_dir = %config.static_dir.display(),
        max_rounds = config.max_rounds,
        "conclave listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("conclave shut down");
    Ok(())
}

async fn run_once(
    config: &ConclaveConfig,
    puzzle: &str,
    cards_path: &Path,
    seed: Option<u64>,
) -> Result<DebateOutcome> {
    let raw = std::fs::read_to_string(cards_path)
        .with_context(|| format!("failed to read {}", cards_path.display()))?;
    let submission: DeckSubmission = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON card list", cards_path.display()))?;
    let cards = validate_batch(submission.into_drafts())?;

    let mut debate_config = config.debate_config();
    if let Some(seed) = seed {
        debate_config = debate_config.with_shuffle_seed(seed);
    }

    let mut sink = FanoutSink::new().with(Arc::new(TracingSink));
    if let Some(url) = &config.push_url {
        sink = sink.with(Arc::new(HttpPushSink::new(url)));
    }
    let sink: Arc<dyn MessageSink> = Arc::new(sink);

    let engine = DebateEngine::new(Arc::new(ProviderRouter::from_env()), sink, debate_config);

    let cancel = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling after the current turn");
            cancel.cancel();
        }
    });

    let outcome = engine.run(puzzle, &cards).await?;
    Ok(outcome)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
