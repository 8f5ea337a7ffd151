// src/core/engine.rs
use crate::connectors::traits::{MarginSource, Notifier, OrderGateway, TickSource};
use crate::core::log::ExecutionLog;
use crate::core::margin::{estimate_cost, has_sufficient_margin};
use crate::core::registry::{Selection, TokenSelectionRegistry};
use crate::strategies::traits::StrategyEvaluator;
use crate::types::{
    MarginSnapshot, MarketTick, Notification, OrderOutcome, SignalKind, StrategySignal,
    TokenAutoBuyConfig,
};
use tracing::{error, warn};

/// Runs the notify path for every signal and the gated auto-buy path for
/// enabled instruments, once per `step`.
pub struct DecisionEngine<S> {
    strategy: S,
    registry: TokenSelectionRegistry,
    tick_source: Box<dyn TickSource>,
    margin_source: Box<dyn MarginSource>,
    notifier: Box<dyn Notifier>,
    gateway: Box<dyn OrderGateway>,
    log: ExecutionLog,
    seen_generation: u64,
}

impl<S> DecisionEngine<S>
where
    S: StrategyEvaluator,
{
    pub fn new(
        strategy: S,
        registry: TokenSelectionRegistry,
        tick_source: Box<dyn TickSource>,
        margin_source: Box<dyn MarginSource>,
        notifier: Box<dyn Notifier>,
        gateway: Box<dyn OrderGateway>,
    ) -> Self {
        let seen_generation = registry.snapshot().generation();
        Self {
            strategy,
            registry,
            tick_source,
            margin_source,
            notifier,
            gateway,
            log: ExecutionLog::new(),
            seen_generation,
        }
    }

    pub fn registry(&self) -> &TokenSelectionRegistry {
        &self.registry
    }

    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    pub fn strategy_name(&self) -> String {
        self.strategy.name()
    }

    /// Full replace of the token selection; takes effect on the next `step`.
    pub fn update_token_config(&self, configs: Vec<TokenAutoBuyConfig>) {
        self.registry.update(configs);
    }

    /// One evaluation cycle over the whole tick batch.
    pub async fn step(&mut self) -> &ExecutionLog {
        // One selection for the whole cycle.
        let selection = self.registry.snapshot();
        if selection.generation() != self.seen_generation {
            self.seen_generation = selection.generation();
            self.log
                .add(format!("Token config updated: {}", selection.summary()));
        }

        let ticks = match self.tick_source.get_latest_ticks().await {
            Ok(ticks) => ticks,
            Err(e) => {
                error!("Tick fetch failed: {}", e);
                self.log.add(format!("Tick fetch failed: {}", e));
                return &self.log;
            }
        };

        let margin = match self.margin_source.get_margin().await {
            Ok(margin) => {
                self.log.add(format!(
                    "Fetched {} ticks; margin available={:.2}",
                    ticks.len(),
                    margin.available
                ));
                Some(margin)
            }
            Err(e) => {
                error!("Margin fetch failed: {}", e);
                self.log.add(format!(
                    "Fetched {} ticks; margin fetch failed: {}",
                    ticks.len(),
                    e
                ));
                None
            }
        };

        for tick in &ticks {
            let signal = match self.strategy.evaluate(tick) {
                Ok(signal) => signal,
                Err(e) => {
                    warn!("Strategy evaluation failed for {}: {}", tick.instrument, e);
                    self.log.add(format!(
                        "Strategy evaluation failed for {}: {}",
                        tick.instrument, e
                    ));
                    continue;
                }
            };

            if signal.kind != SignalKind::None {
                self.notify_signal(&signal, tick).await;
            }
            self.try_autobuy(&signal, tick, &selection, margin.as_ref())
                .await;
        }

        &self.log
    }

    async fn notify_signal(&mut self, signal: &StrategySignal, tick: &MarketTick) {
        let notification = Notification::SignalDetected {
            instrument: signal.instrument.clone(),
            signal: signal.kind,
            last_price: tick.last_price,
            reason: signal.reason.clone(),
            score: signal.score,
            timestamp: tick.timestamp,
        };
        if self.emit(&notification).await {
            self.log.add(format!(
                "Notification sent for {}: {}",
                signal.instrument,
                notification.payload()
            ));
        }
    }

    async fn try_autobuy(
        &mut self,
        signal: &StrategySignal,
        tick: &MarketTick,
        selection: &Selection,
        margin: Option<&MarginSnapshot>,
    ) {
        let instrument = &signal.instrument;

        let quantity = match selection.lookup(instrument) {
            Some(cfg) if cfg.autobuy => cfg.quantity,
            _ => {
                self.log
                    .add(format!("Auto-Buy skipped: {} not enabled.", instrument));
                return;
            }
        };

        if signal.kind != SignalKind::Buy {
            self.log.add(format!(
                "Auto-Buy skipped: signal is {} for {}.",
                signal.kind, instrument
            ));
            return;
        }

        let margin = match margin {
            Some(margin) => margin,
            None => {
                self.log.add(format!(
                    "Auto-Buy blocked: margin unavailable this cycle for {}.",
                    instrument
                ));
                return;
            }
        };

        let Some(cost) = estimate_cost(instrument, tick.last_price, quantity) else {
            warn!("Cost overflow for {} @ {} x{}", instrument, tick.last_price, quantity);
            self.log.add(format!(
                "Auto-Buy blocked: cost overflow for {}. Price={}, Qty={}",
                instrument, tick.last_price, quantity
            ));
            return;
        };
        if !has_sufficient_margin(margin, cost) {
            self.log.add(format!(
                "Auto-Buy blocked: insufficient margin for {}. Needed={:.2}, Available={:.2}",
                instrument, cost, margin.available
            ));
            self.emit(&Notification::InsufficientMargin {
                instrument: instrument.clone(),
                needed: cost,
                available: margin.available,
                quantity,
            })
            .await;
            return;
        }

        match self.gateway.place_buy_order(instrument, quantity).await {
            Ok(OrderOutcome::Placed { order_id }) => {
                self.log.add(format!(
                    "Auto-Buy executed for {}, qty={}, order_id={}",
                    instrument, quantity, order_id
                ));
                self.emit(&Notification::OrderPlaced {
                    instrument: instrument.clone(),
                    quantity,
                    order_id,
                })
                .await;
            }
            Ok(OrderOutcome::Rejected { reason }) => {
                self.log
                    .add(format!("Auto-Buy failed for {}: {}", instrument, reason));
                self.emit(&Notification::OrderFailed {
                    instrument: instrument.clone(),
                    error: reason,
                })
                .await;
            }
            Err(e) => {
                error!("⚠️ Order gateway fault for {}: {}", instrument, e);
                self.log
                    .add(format!("Auto-Buy error for {}: {}", instrument, e));
            }
        }
    }

    /// Delivery failures are logged and swallowed.
    async fn emit(&mut self, notification: &Notification) -> bool {
        match self.notifier.send_notification(notification).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Notification {} failed: {}", notification.kind(), e);
                self.log.add(format!(
                    "Notification {} for {} failed: {}",
                    notification.kind(),
                    notification.instrument(),
                    e
                ));
                false
            }
        }
    }
}
