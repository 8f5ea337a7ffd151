// src/core/margin.rs
use crate::types::MarginSnapshot;
use rust_decimal::Decimal;

/// Notional cost of buying `quantity` units at `last_price`.
///
/// Negative prices count as zero and quantities below one count as one.
/// Instrument-specific multipliers (lot size, span exposure) would be applied
/// here, keyed by `instrument`, without relaxing either floor.
/// `None` when the notional does not fit in a `Decimal`.
pub fn estimate_cost(_instrument: &str, last_price: Decimal, quantity: u32) -> Option<Decimal> {
    last_price
        .max(Decimal::ZERO)
        .checked_mul(Decimal::from(quantity.max(1)))
}

pub fn has_sufficient_margin(margin: &MarginSnapshot, cost: Decimal) -> bool {
    margin.available >= cost
}
