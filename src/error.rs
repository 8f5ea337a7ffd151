// src/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("tick source unavailable: {0}")]
    TickSource(String),

    #[error("margin source unavailable: {0}")]
    MarginSource(String),

    #[error("notification delivery failed: {0}")]
    Notify(String),

    #[error("notification channel closed")]
    ChannelClosed,

    #[error("order gateway fault: {0}")]
    Gateway(String),
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("invalid tick for {instrument}: {reason}")]
    InvalidTick { instrument: String, reason: String },

    #[error("strategy error: {0}")]
    Internal(String),
}
