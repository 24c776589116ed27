//! TABLEWATCH — Bac Bo table monitor.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! loads the pattern catalog, and runs the poll → evaluate → notify loop
//! with graceful shutdown between ticks.

use anyhow::Result;
use tracing::{error, info};

use tablewatch::config::AppConfig;
use tablewatch::engine::monitor::{Monitor, MonitorTimeouts, TickOutcome};
use tablewatch::history::HistoryStore;
use tablewatch::notify::commands;
use tablewatch::notify::telegram::TelegramNotifier;
use tablewatch::source::casinoscores::CasinoScoresClient;
use tablewatch::storage;
use tablewatch::strategy::timing::TimingGate;
use tablewatch::strategy::SignalPlanner;

/// Config path, overridable through the environment.
const CONFIG_PATH_ENV: &str = "TABLEWATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = AppConfig::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = format!("{e:#}"), "Configuration rejected");
        e
    })?;

    info!(
        poll_interval_secs = cfg.monitor.poll_interval_secs,
        round_duration_secs = cfg.monitor.round_duration_secs,
        signal_deadline_secs = cfg.monitor.signal_deadline_secs,
        history_capacity = cfg.monitor.history_capacity,
        chat_id = %cfg.telegram.chat_id,
        "TABLEWATCH starting up"
    );

    // -- Initialise components -------------------------------------------

    let bot_token = AppConfig::resolve_env(&cfg.telegram.bot_token_env)?;
    let notifier = TelegramNotifier::new(bot_token, cfg.telegram.chat_id.clone(), cfg.notify_timeout())?;
    let listener = cfg
        .telegram
        .listen_commands
        .then(|| tokio::spawn(commands::listen(notifier.clone())));
    let source = CasinoScoresClient::new(cfg.source.api_url.clone(), cfg.source_timeout())?;
    info!(url = %source.url(), "Round source configured");

    let catalog = storage::load_catalog(Some(&cfg.catalog.path));
    let planner = SignalPlanner::new(
        catalog,
        TimingGate::new(cfg.monitor.round_duration_secs, cfg.monitor.signal_deadline_secs),
    );

    let mut monitor = Monitor::new(
        Box::new(source),
        Box::new(notifier),
        planner,
        HistoryStore::new(cfg.monitor.history_capacity),
        MonitorTimeouts {
            fetch: cfg.source_timeout(),
            notify: cfg.notify_timeout(),
        },
    );

    // -- Main loop -------------------------------------------------------

    let mut interval = tokio::time::interval(cfg.poll_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        interval_secs = cfg.monitor.poll_interval_secs,
        "Entering main loop. Press Ctrl+C to stop."
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let outcome = monitor.tick().await;
                log_tick(&outcome);
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received.");
                break;
            }
        }
    }

    if let Some(listener) = listener {
        listener.abort();
    }

    info!(
        streak = monitor.tracker().streak(),
        phase = %monitor.tracker().phase(),
        rounds = monitor.history().len(),
        "TABLEWATCH shut down cleanly."
    );

    Ok(())
}

/// Log the tick result at a level matching its significance.
fn log_tick(outcome: &TickOutcome) {
    match outcome {
        TickOutcome::Processed { .. } => info!(%outcome, "Tick complete"),
        _ => tracing::debug!(%outcome, "Tick complete"),
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tablewatch=info"));

    let json_logging = std::env::var("TABLEWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
