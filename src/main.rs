use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swing_scanner::cli::{parse_symbol_list, resolve_symbols, Cli, Commands};
use swing_scanner::config::{Config, ProviderKind};
use swing_scanner::services::{BatchExecutor, RefreshScheduler, SqliteStore, WatchlistService};
use swing_scanner::sources::{FinnhubClient, MarketDataProvider, YahooFinanceClient};
use swing_scanner::{api, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swing_scanner=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Fetch {
            symbols,
            file,
            rate,
        } => fetch(config, symbols, file.as_deref(), rate).await,
    }
}

fn build_provider(config: &Config) -> anyhow::Result<Arc<dyn MarketDataProvider>> {
    match config.provider {
        ProviderKind::Finnhub => {
            let api_key = config
                .finnhub_api_key
                .clone()
                .context("FINNHUB_API_KEY is required when MARKET_DATA_PROVIDER=finnhub")?;
            info!("Using Finnhub market data");
            Ok(Arc::new(FinnhubClient::new(api_key)))
        }
        ProviderKind::Yahoo => {
            info!("Using Yahoo Finance market data");
            Ok(Arc::new(YahooFinanceClient::new()))
        }
    }
}

fn open_store(config: &Config) -> anyhow::Result<Arc<SqliteStore>> {
    if config.is_in_memory() {
        warn!("Using in-memory database; signals are lost on exit");
        return Ok(Arc::new(SqliteStore::new_in_memory()?));
    }

    if let Some(parent) = Path::new(&config.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let store = SqliteStore::new(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path))?;
    Ok(Arc::new(store))
}

fn build_executor(
    config: &Config,
    store: Arc<SqliteStore>,
    rate: Option<u32>,
) -> anyhow::Result<BatchExecutor> {
    Ok(BatchExecutor::new(build_provider(config)?, store)
        .with_heuristics(config.heuristics.clone())
        .with_rate(rate.unwrap_or(config.calls_per_minute))
        .with_history_days(config.history_days))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let config = Arc::new(config);
    info!("Starting Swing Scanner server on {}:{}", config.host, config.port);

    let store = open_store(&config)?;
    let executor = Arc::new(build_executor(&config, store.clone(), None)?);
    let watchlists = Arc::new(WatchlistService::new(
        store.clone(),
        store.clone(),
        executor.clone(),
    ));

    if let Some(secs) = config.refresh_interval_secs {
        info!("Scheduled refresh every {}s", secs);
        RefreshScheduler::new(executor.clone(), Duration::from_secs(secs)).spawn();
    }

    let state = AppState {
        config: config.clone(),
        executor,
        signals: store,
        watchlists,
    };

    let app = api::app(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn fetch(
    config: Config,
    symbols: Vec<String>,
    file: Option<&Path>,
    rate: Option<u32>,
) -> anyhow::Result<()> {
    let file_symbols = match file {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_symbol_list(&contents)
        }
        None => Vec::new(),
    };
    let symbols = resolve_symbols(&symbols, file_symbols);

    let store = open_store(&config)?;
    let executor = build_executor(&config, store, rate)?;

    info!("Starting to fetch {} stocks...", symbols.len());
    info!(
        "Estimated time: {} minutes",
        executor.estimated_duration(symbols.len()).as_secs().div_ceil(60)
    );

    let result = executor.compute_and_persist(&symbols).await?;

    info!("=== Fetch Complete ===");
    info!("Successfully fetched: {} stocks", result.succeeded.len());
    info!("Failed: {} stocks", result.failed.len());
    for failed in &result.failed {
        warn!("  - {} ({}): {}", failed.symbol, failed.stage, failed.reason);
    }

    Ok(())
}
