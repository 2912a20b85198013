//! Weighted average unit prices from inventory entries.
//!
//! The average price of a consumable is the quantity-weighted mean of the
//! unit costs paid on its entry movements:
//!
//! ```text
//! average = sum(quantity * unit_cost) / sum(quantity)
//! ```
//!
//! Exits never contribute. An entry without a unit cost counts as zero
//! cost, and a window with no entered quantity has an average of zero.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use safra_types::{ConsumableKind, MovementDirection, MovementRecord};

use crate::LedgerError;
use crate::filter::DateWindow;

/// Quantity-weighted average unit price of `kind` over entries in `window`.
pub fn average_price(
    movements: &[MovementRecord],
    kind: ConsumableKind,
    window: &DateWindow,
) -> Result<Decimal, LedgerError> {
    let mut weighted = Decimal::ZERO;
    let mut quantity = Decimal::ZERO;
    let mut entries = 0_u64;

    for movement in movements.iter().filter(|m| {
        m.consumable == kind && m.direction == MovementDirection::Entry && window.contains(m.date)
    }) {
        let cost = movement.unit_cost.unwrap_or(Decimal::ZERO);
        let line = movement
            .quantity
            .checked_mul(cost)
            .ok_or(LedgerError::ArithmeticOverflow("weighting entry cost"))?;
        weighted = weighted
            .checked_add(line)
            .ok_or(LedgerError::ArithmeticOverflow("summing entry costs"))?;
        quantity = quantity
            .checked_add(movement.quantity)
            .ok_or(LedgerError::ArithmeticOverflow("summing entry quantities"))?;
        entries = entries.saturating_add(1);
    }

    if quantity.is_zero() {
        debug!(consumable = ?kind, entries, "no entered quantity, average price is zero");
        return Ok(Decimal::ZERO);
    }

    weighted
        .checked_div(quantity)
        .ok_or(LedgerError::ArithmeticOverflow("dividing weighted cost"))
}

/// Average prices for every consumable kind, both always present.
pub fn average_prices(
    movements: &[MovementRecord],
    window: &DateWindow,
) -> Result<BTreeMap<ConsumableKind, Decimal>, LedgerError> {
    [ConsumableKind::Fuel, ConsumableKind::Input]
        .into_iter()
        .map(|kind| Ok((kind, average_price(movements, kind, window)?)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use safra_types::MovementId;

    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn entry(
        kind: ConsumableKind,
        quantity: Decimal,
        cost: Option<Decimal>,
        date: NaiveDate,
    ) -> MovementRecord {
        MovementRecord {
            id: MovementId::new(),
            consumable: kind,
            direction: MovementDirection::Entry,
            quantity,
            unit_cost: cost,
            date,
            reference: None,
        }
    }

    #[test]
    fn weighted_by_quantity() {
        let movements = [
            entry(ConsumableKind::Fuel, dec!(100), Some(dec!(5.00)), day(1, 10)),
            entry(ConsumableKind::Fuel, dec!(50), Some(dec!(6.20)), day(2, 10)),
        ];
        let price =
            average_price(&movements, ConsumableKind::Fuel, &DateWindow::unbounded()).unwrap();
        assert_eq!(price, dec!(5.40));
    }

    #[test]
    fn uniform_price_survives_zero_quantity_entries() {
        let movements = [
            entry(ConsumableKind::Input, dec!(10), Some(dec!(3.75)), day(1, 1)),
            entry(ConsumableKind::Input, dec!(0), Some(dec!(3.75)), day(1, 2)),
            entry(ConsumableKind::Input, dec!(25), Some(dec!(3.75)), day(1, 3)),
        ];
        let price =
            average_price(&movements, ConsumableKind::Input, &DateWindow::unbounded()).unwrap();
        assert_eq!(price, dec!(3.75));
    }

    #[test]
    fn no_entries_is_zero() {
        let prices = average_prices(&[], &DateWindow::unbounded()).unwrap();
        assert_eq!(prices.len(), 2);
        assert!(prices.values().all(|p| p.is_zero()));
    }

    #[test]
    fn missing_unit_cost_counts_as_zero() {
        let movements = [
            entry(ConsumableKind::Fuel, dec!(10), Some(dec!(6)), day(1, 1)),
            entry(ConsumableKind::Fuel, dec!(10), None, day(1, 2)),
        ];
        let price =
            average_price(&movements, ConsumableKind::Fuel, &DateWindow::unbounded()).unwrap();
        assert_eq!(price, dec!(3));
    }

    #[test]
    fn window_and_direction_filter_entries() {
        let mut exit = entry(ConsumableKind::Fuel, dec!(500), Some(dec!(99)), day(3, 5));
        exit.direction = MovementDirection::Exit;
        let movements = [
            entry(ConsumableKind::Fuel, dec!(100), Some(dec!(5)), day(3, 1)),
            entry(ConsumableKind::Fuel, dec!(100), Some(dec!(9)), day(6, 1)),
            entry(ConsumableKind::Input, dec!(100), Some(dec!(50)), day(3, 2)),
            exit,
        ];
        let march = DateWindow::between(day(3, 1), day(3, 31));
        let price = average_price(&movements, ConsumableKind::Fuel, &march).unwrap();
        assert_eq!(price, dec!(5));
    }
}
