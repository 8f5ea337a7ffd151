// src/connectors/notifier.rs
use crate::connectors::traits::Notifier;
use crate::error::ConnectorError;
use crate::types::{Notification, UiEvent};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Writes notifications to the diagnostic log.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_notification(&self, notification: &Notification) -> Result<(), ConnectorError> {
        info!(
            "🔔 NOTIFY[{}] {}",
            notification.kind(),
            notification.payload()
        );
        Ok(())
    }
}

/// Pushes notifications to the dashboard. Never blocks the engine.
#[derive(Clone)]
pub struct ChannelNotifier {
    sender: mpsc::Sender<UiEvent>,
}

impl ChannelNotifier {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send_notification(&self, notification: &Notification) -> Result<(), ConnectorError> {
        match self
            .sender
            .try_send(UiEvent::Notification(notification.clone()))
        {
            Ok(_) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    "UI channel full, dropped {} for {}",
                    notification.kind(),
                    notification.instrument()
                );
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(ConnectorError::ChannelClosed),
        }
    }
}
