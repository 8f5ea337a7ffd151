// src/core/registry.rs
use crate::types::TokenAutoBuyConfig;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// One complete token selection. Immutable once published.
#[derive(Debug, Default)]
pub struct Selection {
    generation: u64,
    tokens: HashMap<String, TokenAutoBuyConfig>,
}

impl Selection {
    fn build(generation: u64, configs: Vec<TokenAutoBuyConfig>) -> Self {
        // Later duplicates win.
        let tokens = configs
            .into_iter()
            .map(|c| (c.instrument.clone(), c))
            .collect();
        Self { generation, tokens }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn lookup(&self, instrument: &str) -> Option<&TokenAutoBuyConfig> {
        self.tokens.get(instrument)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut configs: Vec<_> = self.tokens.values().collect();
        configs.sort_by(|a, b| a.instrument.cmp(&b.instrument));

        let enabled = configs.iter().filter(|c| c.autobuy).count();
        let listing = configs
            .iter()
            .map(|c| {
                if c.autobuy {
                    format!("{}[auto x{}]", c.instrument, c.quantity)
                } else {
                    format!("{}[notify]", c.instrument)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{} tokens ({} auto-buy enabled): {}",
            configs.len(),
            enabled,
            listing
        )
    }
}

/// Shared instrument -> config mapping. `update` swaps in a whole new
/// selection, so readers see either the old or the new one, never a mix.
#[derive(Debug, Clone, Default)]
pub struct TokenSelectionRegistry {
    current: Arc<RwLock<Arc<Selection>>>,
}

impl TokenSelectionRegistry {
    pub fn new(configs: Vec<TokenAutoBuyConfig>) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(Selection::build(0, configs)))),
        }
    }

    /// Full replace: instruments missing from `configs` are disabled from now on.
    /// Returns the new generation.
    pub fn update(&self, configs: Vec<TokenAutoBuyConfig>) -> u64 {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let next = Selection::build(current.generation + 1, configs);
        info!("Token config updated: {}", next.summary());
        let generation = next.generation;
        *current = Arc::new(next);
        generation
    }

    pub fn snapshot(&self) -> Arc<Selection> {
        // The guarded value is a whole Arc, so a poisoned lock still holds a valid selection.
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn lookup(&self, instrument: &str) -> Option<TokenAutoBuyConfig> {
        self.snapshot().lookup(instrument).cloned()
    }
}
