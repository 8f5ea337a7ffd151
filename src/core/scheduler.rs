// src/core/scheduler.rs
use crate::core::engine::DecisionEngine;
use crate::strategies::traits::StrategyEvaluator;
use crate::types::UiEvent;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

/// Owns the engine for the life of the process and drives it on a fixed cadence.
pub struct Scheduler<S> {
    engine: DecisionEngine<S>,
    period: Duration,
    ui_sender: Option<mpsc::Sender<UiEvent>>,
    forwarded: usize,
}

impl<S> Scheduler<S>
where
    S: StrategyEvaluator,
{
    pub fn new(engine: DecisionEngine<S>, period: Duration) -> Self {
        Self {
            engine,
            period,
            ui_sender: None,
            forwarded: 0,
        }
    }

    /// Mirror new Execution Log entries to the dashboard.
    pub fn with_ui(mut self, sender: mpsc::Sender<UiEvent>) -> Self {
        self.ui_sender = Some(sender);
        self
    }

    pub fn engine(&self) -> &DecisionEngine<S> {
        &self.engine
    }

    /// Runs a single cycle and forwards its log entries.
    pub async fn tick(&mut self) {
        self.engine.step().await;
        self.forward_new_entries();
    }

    /// Cycles until `shutdown` flips to true (or its sender is dropped).
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Scheduler running: strategy={}, every {:?}",
            self.engine.strategy_name(),
            self.period
        );

        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }

        info!(
            "Scheduler stopped after {} log entries",
            self.engine.log().len()
        );
    }

    fn forward_new_entries(&mut self) {
        let Some(sender) = &self.ui_sender else {
            return;
        };

        let mut closed = false;
        for entry in &self.engine.log().entries()[self.forwarded..] {
            match sender.try_send(UiEvent::Log(entry.to_string())) {
                Ok(_) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {}
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    error!("UI Channel closed! Interface is likely dead.");
                    closed = true;
                    break;
                }
            }
        }
        if closed {
            self.ui_sender = None;
        }
        self.forwarded = self.engine.log().len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::notifier::LogNotifier;
    use crate::connectors::paper::PaperBroker;
    use crate::core::registry::TokenSelectionRegistry;
    use crate::error::StrategyError;
    use crate::types::{MarginSnapshot, MarketTick, StrategySignal, TokenAutoBuyConfig};
    use rust_decimal_macros::dec;

    struct Flat;

    impl StrategyEvaluator for Flat {
        fn name(&self) -> String {
            "flat".to_string()
        }

        fn evaluate(&self, tick: &MarketTick) -> Result<StrategySignal, StrategyError> {
            Ok(StrategySignal::none(&tick.instrument, "flat"))
        }
    }

    fn scheduler() -> Scheduler<Flat> {
        let broker = PaperBroker::new(
            vec![MarketTick {
                instrument: "NSE:INFY".to_string(),
                last_price: dec!(1440),
                open: dec!(1430),
                high: dec!(1441),
                low: dec!(1420),
                volume: 1,
                timestamp: 0,
            }],
            MarginSnapshot::default(),
        );
        let engine = DecisionEngine::new(
            Flat,
            TokenSelectionRegistry::new(vec![TokenAutoBuyConfig::notify_only("NSE:INFY")]),
            Box::new(broker.clone()),
            Box::new(broker.clone()),
            Box::new(LogNotifier),
            Box::new(broker),
        );
        Scheduler::new(engine, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn forwards_each_entry_once() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut scheduler = scheduler().with_ui(tx);

        scheduler.tick().await;
        scheduler.tick().await;

        let mut forwarded = 0;
        while let Ok(event) = rx.try_recv() {
            assert!(matches!(event, UiEvent::Log(_)));
            forwarded += 1;
        }
        assert_eq!(forwarded, scheduler.engine().log().len());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let mut scheduler = scheduler();
        let (tx, rx) = watch::channel(false);

        let stopper = tokio::spawn(async move {
            time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        time::timeout(Duration::from_secs(5), scheduler.run(rx))
            .await
            .expect("scheduler did not stop");
        stopper.await.unwrap();

        assert!(scheduler.engine().log().contains("Fetched 1 ticks"));
    }
}
