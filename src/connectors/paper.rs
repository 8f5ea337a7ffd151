// src/connectors/paper.rs
use crate::connectors::traits::{MarginSource, OrderGateway, TickSource};
use crate::core::margin::estimate_cost;
use crate::error::ConnectorError;
use crate::types::{MarginSnapshot, MarketTick, OrderOutcome};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

#[derive(Debug)]
struct PaperBook {
    ticks: Vec<MarketTick>,
    margin: MarginSnapshot,
    orders: Vec<PaperFill>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperFill {
    pub order_id: String,
    pub instrument: String,
    pub quantity: u32,
    pub cost: rust_decimal::Decimal,
}

/// Simulated broker: serves configured ticks, tracks margin and fills buys
/// at the last known price. Clones share one book.
#[derive(Debug, Clone)]
pub struct PaperBroker {
    book: Arc<Mutex<PaperBook>>,
}

impl PaperBroker {
    pub fn new(ticks: Vec<MarketTick>, margin: MarginSnapshot) -> Self {
        Self {
            book: Arc::new(Mutex::new(PaperBook {
                ticks,
                margin,
                orders: Vec::new(),
            })),
        }
    }

    fn book(&self) -> MutexGuard<'_, PaperBook> {
        // The book is only ever replaced field-by-field, so a poisoned guard is still coherent.
        self.book.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn fills(&self) -> Vec<PaperFill> {
        self.book().orders.clone()
    }

    pub fn margin(&self) -> MarginSnapshot {
        self.book().margin
    }
}

#[async_trait]
impl TickSource for PaperBroker {
    async fn get_latest_ticks(&self) -> Result<Vec<MarketTick>, ConnectorError> {
        let now = Utc::now().timestamp_millis() as u64;
        Ok(self
            .book()
            .ticks
            .iter()
            .cloned()
            .map(|mut tick| {
                tick.timestamp = now;
                tick
            })
            .collect())
    }
}

#[async_trait]
impl MarginSource for PaperBroker {
    async fn get_margin(&self) -> Result<MarginSnapshot, ConnectorError> {
        Ok(self.book().margin)
    }
}

#[async_trait]
impl OrderGateway for PaperBroker {
    async fn place_buy_order(
        &self,
        instrument: &str,
        quantity: u32,
    ) -> Result<OrderOutcome, ConnectorError> {
        let mut book = self.book();

        let price = match book.ticks.iter().find(|t| t.instrument == instrument) {
            Some(tick) => tick.last_price,
            None => {
                return Ok(OrderOutcome::Rejected {
                    reason: format!("unknown instrument {}", instrument),
                })
            }
        };

        let Some(cost) = estimate_cost(instrument, price, quantity) else {
            return Ok(OrderOutcome::Rejected {
                reason: format!("notional overflow for {} x{}", instrument, quantity),
            });
        };
        let Some(utilized) = book.margin.utilized.checked_add(cost) else {
            return Ok(OrderOutcome::Rejected {
                reason: "paper utilized margin overflow".to_string(),
            });
        };
        if cost > book.margin.available {
            return Ok(OrderOutcome::Rejected {
                reason: format!(
                    "paper funds exhausted: need {:.2}, have {:.2}",
                    cost, book.margin.available
                ),
            });
        }

        book.margin.available -= cost;
        book.margin.utilized = utilized;

        let order_id = format!("PAPER-{}", Uuid::new_v4());
        info!(
            "Paper Buy: {} x{} @ {} (Notional: {:.2})",
            instrument, quantity, price, cost
        );
        book.orders.push(PaperFill {
            order_id: order_id.clone(),
            instrument: instrument.to_string(),
            quantity,
            cost,
        });

        Ok(OrderOutcome::Placed { order_id })
    }
}
