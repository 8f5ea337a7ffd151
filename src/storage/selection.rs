// src/storage/selection.rs
use crate::core::registry::TokenSelectionRegistry;
use crate::types::TokenAutoBuyConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tracing::{error, info};

/// Reads a JSON array of token selections.
pub async fn load_token_selection(path: &Path) -> Result<Vec<TokenAutoBuyConfig>> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading token selection {}", path.display()))?;
    let configs = serde_json::from_str(&data)
        .with_context(|| format!("parsing token selection {}", path.display()))?;
    Ok(configs)
}

async fn modified(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

/// Pushes the file into the registry whenever its mtime changes.
/// A bad file is logged and the current selection stays in force.
pub struct SelectionWatcher {
    path: PathBuf,
    registry: TokenSelectionRegistry,
    last_seen: Option<SystemTime>,
}

impl SelectionWatcher {
    pub fn new(path: PathBuf, registry: TokenSelectionRegistry) -> Self {
        Self {
            path,
            registry,
            last_seen: None,
        }
    }

    /// Returns true if a new selection was applied.
    pub async fn poll(&mut self) -> bool {
        let Some(stamp) = modified(&self.path).await else {
            return false;
        };
        if self.last_seen == Some(stamp) {
            return false;
        }
        self.last_seen = Some(stamp);

        match load_token_selection(&self.path).await {
            Ok(configs) => {
                info!(
                    "Applying {} token selections from {}",
                    configs.len(),
                    self.path.display()
                );
                self.registry.update(configs);
                true
            }
            Err(e) => {
                error!("Ignoring token selection file: {:#}", e);
                false
            }
        }
    }

    pub async fn run(mut self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.poll().await;
                }
            }
        }
    }
}
