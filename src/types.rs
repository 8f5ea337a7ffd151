// src/types.rs
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One instrument's market snapshot for the current evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    pub instrument: String,
    pub last_price: Decimal,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub timestamp: u64, // epoch millis
}

/// Per-instrument auto-buy selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAutoBuyConfig {
    pub instrument: String,
    #[serde(default)]
    pub autobuy: bool,
    #[serde(default = "default_quantity", deserialize_with = "positive_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

// Upstream may send 0 or negative quantities; anything below 1 becomes 1.
// Fractional quantities are rejected rather than truncated.
fn positive_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    match raw {
        Some(q) if !q.is_finite() || q.fract() != 0.0 => Err(D::Error::custom(format!(
            "quantity must be a whole number, got {}",
            q
        ))),
        Some(q) if q >= 1.0 => Ok(q.min(u32::MAX as f64) as u32),
        _ => Ok(1),
    }
}

impl TokenAutoBuyConfig {
    pub fn new(instrument: impl Into<String>, autobuy: bool, quantity: u32) -> Self {
        Self {
            instrument: instrument.into(),
            autobuy,
            quantity: quantity.max(1),
        }
    }

    pub fn notify_only(instrument: impl Into<String>) -> Self {
        Self::new(instrument, false, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    None,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
            SignalKind::None => "NONE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySignal {
    pub instrument: String,
    pub kind: SignalKind,
    pub score: f64,
    pub reason: String,
}

impl StrategySignal {
    pub fn none(instrument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            kind: SignalKind::None,
            score: 0.0,
            reason: reason.into(),
        }
    }
}

/// Point-in-time account margin, valid for a single evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginSnapshot {
    pub available: Decimal,
    #[serde(default)]
    pub utilized: Decimal,
}

/// What the broker said about a buy attempt. A gateway fault is a
/// `ConnectorError` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Placed { order_id: String },
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    SignalDetected {
        instrument: String,
        signal: SignalKind,
        last_price: Decimal,
        reason: String,
        score: f64,
        timestamp: u64,
    },
    InsufficientMargin {
        instrument: String,
        needed: Decimal,
        available: Decimal,
        quantity: u32,
    },
    OrderPlaced {
        instrument: String,
        quantity: u32,
        order_id: String,
    },
    OrderFailed {
        instrument: String,
        error: String,
    },
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::SignalDetected { .. } => "signal_detected",
            Notification::InsufficientMargin { .. } => "insufficient_margin",
            Notification::OrderPlaced { .. } => "order_placed",
            Notification::OrderFailed { .. } => "order_failed",
        }
    }

    pub fn instrument(&self) -> &str {
        match self {
            Notification::SignalDetected { instrument, .. }
            | Notification::InsufficientMargin { instrument, .. }
            | Notification::OrderPlaced { instrument, .. }
            | Notification::OrderFailed { instrument, .. } => instrument,
        }
    }

    /// Structured payload without the `kind` tag.
    pub fn payload(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(map) = value.as_object_mut() {
            map.remove("kind");
        }
        value
    }
}

// --- Dashboard events ---

#[derive(Debug, Clone)]
pub enum UiEvent {
    Notification(Notification),
    Log(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantity_below_one_is_clamped() {
        let raw = r#"[
            {"instrument": "NSE:INFY", "autobuy": true, "quantity": 10},
            {"instrument": "NSE:TCS", "autobuy": true, "quantity": 0},
            {"instrument": "NSE:SBIN", "quantity": -4},
            {"instrument": "NSE:ITC"}
        ]"#;
        let configs: Vec<TokenAutoBuyConfig> = serde_json::from_str(raw).unwrap();

        assert_eq!(configs[0].quantity, 10);
        assert_eq!(configs[1].quantity, 1);
        assert_eq!(configs[2].quantity, 1);
        assert!(!configs[2].autobuy);
        assert_eq!(configs[3], TokenAutoBuyConfig::notify_only("NSE:ITC"));
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let raw = r#"[{"instrument": "NSE:INFY", "autobuy": true, "quantity": 2.5}]"#;
        let err = serde_json::from_str::<Vec<TokenAutoBuyConfig>>(raw).unwrap_err();
        assert!(err.to_string().contains("whole number"));

        let whole = r#"[{"instrument": "NSE:INFY", "quantity": 3.0}]"#;
        let configs: Vec<TokenAutoBuyConfig> = serde_json::from_str(whole).unwrap();
        assert_eq!(configs[0].quantity, 3);
    }

    #[test]
    fn constructor_never_yields_zero_quantity() {
        assert_eq!(TokenAutoBuyConfig::new("X", true, 0).quantity, 1);
    }

    #[test]
    fn notification_payload_omits_kind_tag() {
        let n = Notification::InsufficientMargin {
            instrument: "NSE:INFY".into(),
            needed: dec!(14400),
            available: dec!(5),
            quantity: 10,
        };
        assert_eq!(n.kind(), "insufficient_margin");
        let payload = n.payload();
        assert!(payload.get("kind").is_none());
        assert_eq!(payload["instrument"], "NSE:INFY");
        assert_eq!(payload["quantity"], 10);
    }

    #[test]
    fn signal_kind_displays_uppercase() {
        assert_eq!(SignalKind::Sell.to_string(), "SELL");
        assert_eq!(
            serde_json::to_string(&SignalKind::Buy).unwrap(),
            "\"BUY\""
        );
    }
}
