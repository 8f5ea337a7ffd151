// src/strategies/breakout.rs
use crate::config::StrategyConfig;
use crate::error::StrategyError;
use crate::strategies::traits::StrategyEvaluator;
use crate::types::{MarketTick, SignalKind, StrategySignal};
use rust_decimal::Decimal;

pub struct NearHighBreakout {
    near_high_ratio: Decimal,
    score: f64,
}

impl NearHighBreakout {
    /// Creates a new NearHighBreakout strategy.
    ///
    /// # Arguments
    /// * `near_high_ratio` - Fraction of the session high the last price must exceed (e.g., 0.995).
    /// * `score` - Confidence attached to every BUY this strategy emits.
    pub fn new(near_high_ratio: Decimal, score: f64) -> Self {
        Self {
            near_high_ratio,
            score,
        }
    }

    pub fn from_config(config: &StrategyConfig) -> Self {
        Self::new(config.near_high_ratio, config.score)
    }
}

impl StrategyEvaluator for NearHighBreakout {
    fn name(&self) -> String {
        "near_high_breakout".to_string()
    }

    fn evaluate(&self, tick: &MarketTick) -> Result<StrategySignal, StrategyError> {
        if tick.high <= Decimal::ZERO {
            return Err(StrategyError::InvalidTick {
                instrument: tick.instrument.clone(),
                reason: format!("session high {} is not positive", tick.high),
            });
        }

        let threshold = tick
            .high
            .checked_mul(self.near_high_ratio)
            .ok_or_else(|| StrategyError::InvalidTick {
                instrument: tick.instrument.clone(),
                reason: format!(
                    "session high {} x ratio {} overflows",
                    tick.high, self.near_high_ratio
                ),
            })?;
        if tick.last_price > threshold {
            return Ok(StrategySignal {
                instrument: tick.instrument.clone(),
                kind: SignalKind::Buy,
                score: self.score,
                reason: "Near session high breakout".to_string(),
            });
        }

        Ok(StrategySignal::none(&tick.instrument, "No breakout"))
    }
}
