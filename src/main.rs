//! AgroSense - Crop Decision Support
//!
//! Advisory dashboard for farmers: crop prediction from soil/weather
//! inputs, fertilizer advice, weather forecasts, market prices, and a
//! farming chatbot relay.
//!
//! # Usage
//!
//! ```bash
//! # Serve the dashboard (expects a trained model artifact)
//! cargo run --release
//!
//! # Train the classifier from a labeled dataset
//! cargo run --release -- train --data Crop_recommendation.csv --out data/crop_model.json
//! ```
//!
//! # Environment Variables
//!
//! - `AGROSENSE_CONFIG`: Path to a TOML config file
//! - `OPENWEATHER_API_KEY`: Weather provider key (also read from `.env`)
//! - `CHAT_API_KEY`: Chat provider key (also read from `.env`)
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use agrosense::advisor::{AdvisoryEngine, CropInfoTable, MarketBoard};
use agrosense::api::{create_app, DashboardState};
use agrosense::chat::HttpChatBackend;
use agrosense::config::{defaults, AppConfig};
use agrosense::model::{self, Dataset, TrainOptions};
use agrosense::narration::Narrator;
use agrosense::weather::WeatherClient;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "agrosense")]
#[command(about = "AgroSense Crop Decision Support dashboard")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default: from config)
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to a TOML config file (overrides the loading order)
    #[arg(long)]
    config: Option<String>,

    /// Path to the model artifact (overrides config)
    #[arg(long)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Train the crop classifier from a labeled CSV dataset
    Train {
        /// Path to the dataset CSV (N,P,K,temperature,humidity,ph,rainfall,label)
        #[arg(long)]
        data: String,
        /// Output artifact path
        #[arg(long, default_value = defaults::DEFAULT_MODEL_PATH)]
        out: String,
        /// Number of trees in the forest
        #[arg(long, default_value = "100")]
        trees: usize,
        /// Maximum tree depth
        #[arg(long, default_value = "12")]
        max_depth: usize,
        /// Fraction of rows held back for accuracy evaluation
        #[arg(long, default_value = "0.2")]
        test_split: f64,
        /// Training seed (fixes the split, bootstraps, and feature subsampling)
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

// ============================================================================
// Offline Training
// ============================================================================

fn run_train(
    data: &str,
    out: &str,
    trees: usize,
    max_depth: usize,
    test_split: f64,
    seed: u64,
) -> Result<()> {
    info!(path = %data, "Loading dataset");
    let dataset = Dataset::from_csv(Path::new(data)).context("Failed to load dataset")?;
    info!(
        rows = dataset.len(),
        labels = dataset.label_names.len(),
        "Dataset loaded"
    );

    let opts = TrainOptions {
        trees,
        max_depth,
        test_split,
        seed,
        ..TrainOptions::default()
    };
    let (artifact, report) = model::train(&dataset, &opts).context("Training failed")?;

    info!(
        accuracy = format!("{:.3}", report.holdout_accuracy),
        holdout_rows = report.holdout_rows,
        "Holdout evaluation complete"
    );

    let out_path = Path::new(out);
    artifact
        .save_to_disk(out_path)
        .context("Failed to save model artifact")?;
    info!(path = %out_path.display(), "Model artifact saved");
    Ok(())
}

// ============================================================================
// Server
// ============================================================================

async fn run_server(config: AppConfig, addr_override: Option<String>, model_override: Option<String>) -> Result<()> {
    let artifact_path = model_override.unwrap_or_else(|| config.model.artifact_path.clone());
    let classifier = model::load_classifier(Path::new(&artifact_path))
        .with_context(|| format!("Failed to load model artifact from {artifact_path}"))?;
    info!(
        path = %artifact_path,
        crops = classifier.labels().len(),
        trees = classifier.num_trees(),
        "Crop classifier loaded"
    );

    let weather = WeatherClient::new(&config.weather);
    let chat = Arc::new(HttpChatBackend::new(&config.chat));
    let narrator = Narrator::new(config.narration.clone());
    if narrator.is_enabled() {
        info!(engine = %config.narration.engine, "Narration enabled");
    }

    let crop_info = Arc::new(CropInfoTable::builtin());
    let market = Arc::new(MarketBoard::builtin());
    let engine = Arc::new(AdvisoryEngine::new(
        Arc::new(classifier),
        weather.clone(),
        crop_info.clone(),
        narrator,
    ));

    let state = DashboardState {
        engine,
        weather,
        chat,
        market,
        crop_info,
    };
    let app = create_app(state);

    let server_addr = addr_override.unwrap_or_else(|| config.server.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind {server_addr}"))?;
    info!("Dashboard API listening on http://{server_addr}");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await;

    if let Err(e) = result {
        error!("Server error: {}", e);
        return Err(anyhow::anyhow!("HTTP server error: {}", e));
    }
    info!("AgroSense shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // API keys may live in .env, as the hosted deployments expect
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    if let Some(SubCommand::Train {
        data,
        out,
        trees,
        max_depth,
        test_split,
        seed,
    }) = &args.command
    {
        return run_train(data, out, *trees, *max_depth, *test_split, *seed);
    }

    // load_from_file validates; the default fallback is always valid
    let config = match &args.config {
        Some(path) => AppConfig::load_from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => AppConfig::load(),
    };

    info!("AgroSense - Crop Decision Support");
    run_server(config, args.addr, args.model).await
}
