#![allow(dead_code)]

use async_trait::async_trait;
use notify_autobuy::connectors::traits::{MarginSource, Notifier, OrderGateway, TickSource};
use notify_autobuy::core::engine::DecisionEngine;
use notify_autobuy::core::registry::TokenSelectionRegistry;
use notify_autobuy::error::{ConnectorError, StrategyError};
use notify_autobuy::strategies::traits::StrategyEvaluator;
use notify_autobuy::types::{
    MarginSnapshot, MarketTick, Notification, OrderOutcome, SignalKind, StrategySignal,
    TokenAutoBuyConfig,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn tick(instrument: &str, last_price: Decimal) -> MarketTick {
    MarketTick {
        instrument: instrument.to_string(),
        last_price,
        open: last_price,
        high: last_price,
        low: last_price,
        volume: 1_000,
        timestamp: 1_700_000_000_000,
    }
}

/// Returns a fixed signal per instrument; NONE for anything unlisted and an
/// error for instruments listed as failing.
#[derive(Default)]
pub struct ScriptedStrategy {
    signals: HashMap<String, SignalKind>,
    failing: Vec<String>,
}

impl ScriptedStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, instrument: &str, kind: SignalKind) -> Self {
        self.signals.insert(instrument.to_string(), kind);
        self
    }

    pub fn failing(mut self, instrument: &str) -> Self {
        self.failing.push(instrument.to_string());
        self
    }
}

impl StrategyEvaluator for ScriptedStrategy {
    fn name(&self) -> String {
        "scripted".to_string()
    }

    fn evaluate(&self, tick: &MarketTick) -> Result<StrategySignal, StrategyError> {
        if self.failing.contains(&tick.instrument) {
            return Err(StrategyError::Internal("boom".to_string()));
        }
        let kind = self
            .signals
            .get(&tick.instrument)
            .copied()
            .unwrap_or(SignalKind::None);
        Ok(StrategySignal {
            instrument: tick.instrument.clone(),
            kind,
            score: 0.5,
            reason: format!("scripted {}", kind),
        })
    }
}

pub struct StaticTicks {
    pub ticks: Option<Vec<MarketTick>>,
}

#[async_trait]
impl TickSource for StaticTicks {
    async fn get_latest_ticks(&self) -> Result<Vec<MarketTick>, ConnectorError> {
        self.ticks
            .clone()
            .ok_or_else(|| ConnectorError::TickSource("feed down".to_string()))
    }
}

pub struct FixedMargin {
    pub margin: Option<MarginSnapshot>,
}

#[async_trait]
impl MarginSource for FixedMargin {
    async fn get_margin(&self) -> Result<MarginSnapshot, ConnectorError> {
        self.margin
            .ok_or_else(|| ConnectorError::MarginSource("funds api down".to_string()))
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<Notification>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn of_kind(&self, kind: &str) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.kind() == kind)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_notification(&self, notification: &Notification) -> Result<(), ConnectorError> {
        if self.fail {
            return Err(ConnectorError::Notify("push service down".to_string()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub enum GatewayBehavior {
    Accept,
    Reject(String),
    Fault,
}

#[derive(Clone)]
pub struct RecordingGateway {
    pub calls: Arc<Mutex<Vec<(String, u32)>>>,
    pub behavior: GatewayBehavior,
}

impl RecordingGateway {
    pub fn new(behavior: GatewayBehavior) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            behavior,
        }
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderGateway for RecordingGateway {
    async fn place_buy_order(
        &self,
        instrument: &str,
        quantity: u32,
    ) -> Result<OrderOutcome, ConnectorError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((instrument.to_string(), quantity));
        match &self.behavior {
            GatewayBehavior::Accept => Ok(OrderOutcome::Placed {
                order_id: format!("SIM-{}", calls.len()),
            }),
            GatewayBehavior::Reject(reason) => Ok(OrderOutcome::Rejected {
                reason: reason.clone(),
            }),
            GatewayBehavior::Fault => Err(ConnectorError::Gateway("connection reset".to_string())),
        }
    }
}

pub struct Harness {
    pub engine: DecisionEngine<ScriptedStrategy>,
    pub registry: TokenSelectionRegistry,
    pub notifier: RecordingNotifier,
    pub gateway: RecordingGateway,
}

pub struct HarnessBuilder {
    strategy: ScriptedStrategy,
    tokens: Vec<TokenAutoBuyConfig>,
    ticks: Option<Vec<MarketTick>>,
    margin: Option<MarginSnapshot>,
    notifier: RecordingNotifier,
    behavior: GatewayBehavior,
}

impl HarnessBuilder {
    pub fn new(strategy: ScriptedStrategy) -> Self {
        Self {
            strategy,
            tokens: Vec::new(),
            ticks: Some(Vec::new()),
            margin: Some(MarginSnapshot::default()),
            notifier: RecordingNotifier::default(),
            behavior: GatewayBehavior::Accept,
        }
    }

    pub fn tokens(mut self, tokens: Vec<TokenAutoBuyConfig>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn ticks(mut self, ticks: Vec<MarketTick>) -> Self {
        self.ticks = Some(ticks);
        self
    }

    pub fn tick_feed_down(mut self) -> Self {
        self.ticks = None;
        self
    }

    pub fn available(mut self, available: Decimal) -> Self {
        self.margin = Some(MarginSnapshot {
            available,
            utilized: Decimal::ZERO,
        });
        self
    }

    pub fn margin_down(mut self) -> Self {
        self.margin = None;
        self
    }

    pub fn failing_notifier(mut self) -> Self {
        self.notifier.fail = true;
        self
    }

    pub fn gateway(mut self, behavior: GatewayBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn build(self) -> Harness {
        let registry = TokenSelectionRegistry::new(self.tokens);
        let gateway = RecordingGateway::new(self.behavior);
        let engine = DecisionEngine::new(
            self.strategy,
            registry.clone(),
            Box::new(StaticTicks { ticks: self.ticks }),
            Box::new(FixedMargin {
                margin: self.margin,
            }),
            Box::new(self.notifier.clone()),
            Box::new(gateway.clone()),
        );
        Harness {
            engine,
            registry,
            notifier: self.notifier,
            gateway,
        }
    }
}
