// src/config.rs

use crate::types::{MarginSnapshot, MarketTick, TokenAutoBuyConfig};
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    pub near_high_ratio: Decimal,
    pub score: f64,
}

/// Simulated account and market used by the bundled paper broker.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PaperConfig {
    pub available: Decimal,
    #[serde(default)]
    pub utilized: Decimal,
    #[serde(default)]
    pub ticks: Vec<MarketTick>,
}

impl PaperConfig {
    pub fn margin(&self) -> MarginSnapshot {
        MarginSnapshot {
            available: self.available,
            utilized: self.utilized,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub poll_interval_secs: u64,
    pub log_tail: usize,
    pub log_level: String,
    pub log_dir: String,
    pub tui: bool,
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub tokens: Vec<TokenAutoBuyConfig>,
    #[serde(default)]
    pub selection_file: Option<PathBuf>,
    pub selection_poll_secs: u64,
    #[serde(default)]
    pub paper: PaperConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(
            Config::builder()
                .add_source(File::with_name("Settings").required(false))
                .add_source(
                    Environment::with_prefix("APP")
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )
    }

    /// Defaults layered under whatever `builder` already carries.
    pub fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config = builder
            .set_default("poll_interval_secs", 5)?
            .set_default("log_tail", 50)?
            .set_default("log_level", "info")?
            .set_default("log_dir", "logs")?
            .set_default("tui", false)?
            .set_default("strategy.near_high_ratio", "0.995")?
            .set_default("strategy.score", 0.7)?
            .set_default("selection_poll_secs", 2)?
            .set_default("paper.available", "0")?
            .build()?;
        config.try_deserialize()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn selection_poll_interval(&self) -> Duration {
        Duration::from_secs(self.selection_poll_secs.max(1))
    }
}
