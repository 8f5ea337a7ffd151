use crate::error::ConnectorError;
use crate::types::{MarginSnapshot, MarketTick, Notification, OrderOutcome};
use async_trait::async_trait;

#[async_trait]
pub trait TickSource: Send + Sync {
    async fn get_latest_ticks(&self) -> Result<Vec<MarketTick>, ConnectorError>;
}

#[async_trait]
pub trait MarginSource: Send + Sync {
    async fn get_margin(&self) -> Result<MarginSnapshot, ConnectorError>;
}

/// Fire-and-forget sink. Never places trades.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_notification(&self, notification: &Notification) -> Result<(), ConnectorError>;
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    // Buy side only; there is no automated sell path.
    async fn place_buy_order(
        &self,
        instrument: &str,
        quantity: u32,
    ) -> Result<OrderOutcome, ConnectorError>;
}
