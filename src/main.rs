// src/main.rs
use anyhow::Context;
use dotenvy::dotenv;
use notify_autobuy::config::AppConfig;
use notify_autobuy::connectors::notifier::{ChannelNotifier, LogNotifier};
use notify_autobuy::connectors::paper::PaperBroker;
use notify_autobuy::connectors::traits::Notifier;
use notify_autobuy::core::engine::DecisionEngine;
use notify_autobuy::core::registry::TokenSelectionRegistry;
use notify_autobuy::core::scheduler::Scheduler;
use notify_autobuy::storage::selection::SelectionWatcher;
use notify_autobuy::strategies::breakout::NearHighBreakout;
use notify_autobuy::tui;
use notify_autobuy::utils::telemetry;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Load Configuration
    let config = AppConfig::new().context("loading Settings / APP_* configuration")?;
    let _log_guard = telemetry::init(&config.log_level, &config.log_dir, config.tui);

    if !config.tui {
        println!("========================================");
        println!("       NOTIFY + AUTO-BUY ENGINE");
        println!("========================================");
        println!("Tokens:  {}", config.tokens.len());
        println!("Cadence: {:?}", config.poll_interval());
        println!("Mode:    📝 PAPER TRADING");
        println!("========================================");
    }

    // 2. Initialize Components
    let broker = PaperBroker::new(config.paper.ticks.clone(), config.paper.margin());
    let registry = TokenSelectionRegistry::new(config.tokens.clone());
    let strategy = NearHighBreakout::from_config(&config.strategy);

    // 3. Create Channels
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let notifier: Box<dyn Notifier> = if config.tui {
        Box::new(ChannelNotifier::new(ui_tx.clone()))
    } else {
        Box::new(LogNotifier)
    };

    let engine = DecisionEngine::new(
        strategy,
        registry.clone(),
        Box::new(broker.clone()),
        Box::new(broker.clone()),
        notifier,
        Box::new(broker),
    );
    let strategy_name = engine.strategy_name();

    let mut scheduler = Scheduler::new(engine, config.poll_interval());
    if config.tui {
        scheduler = scheduler.with_ui(ui_tx);
    } else {
        drop(ui_tx);
    }

    // 4. Out-of-loop configuration updates
    if let Some(path) = config.selection_file.clone() {
        info!("Watching token selection file {}", path.display());
        let watcher = SelectionWatcher::new(path, registry.clone());
        tokio::spawn(watcher.run(config.selection_poll_interval(), shutdown_rx.clone()));
    }

    // 5. Run Engine
    let engine_task = tokio::spawn(async move {
        scheduler.run(shutdown_rx).await;
    });

    if config.tui {
        if let Err(e) = tui::run(ui_rx, strategy_name, config.log_tail).await {
            error!("Dashboard error: {}", e);
        }
    } else {
        tokio::signal::ctrl_c().await?;
        info!("Ctrl+C received, shutting down");
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = engine_task.await {
        eprintln!("Fatal Engine Error: {}", e);
    }

    Ok(())
}
