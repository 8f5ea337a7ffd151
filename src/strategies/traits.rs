// src/strategies/traits.rs
use crate::error::StrategyError;
use crate::types::{MarketTick, StrategySignal};

/// Turns one tick into a verdict. Must not keep per-cycle state that changes
/// the outcome for other instruments.
pub trait StrategyEvaluator: Send + Sync {
    fn name(&self) -> String;

    fn evaluate(&self, tick: &MarketTick) -> Result<StrategySignal, StrategyError>;
}
