//! Checked decimal arithmetic and output rounding.
//!
//! Every engine accumulates at full precision through these helpers and
//! only rounds when a report struct is built. Division by zero is never
//! an error here: a zero denominator yields zero.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::AnalyticsError;

/// One minor currency unit.
pub const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One hundred, for percentage scaling.
pub const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Decimal places kept on allocation weights' results.
///
/// Unbounded quotients such as `10000 / 3` carry 28 digits, and adding one
/// to a large amount silently drops its tail. Ten places keep every sum of
/// realistic farm amounts exact.
pub const SHARE_SCALE: u32 = 10;

/// Checked addition.
pub fn add(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal, AnalyticsError> {
    a.checked_add(b)
        .ok_or(AnalyticsError::ArithmeticOverflow(context))
}

/// Checked subtraction.
pub fn sub(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal, AnalyticsError> {
    a.checked_sub(b)
        .ok_or(AnalyticsError::ArithmeticOverflow(context))
}

/// Checked multiplication.
pub fn mul(a: Decimal, b: Decimal, context: &'static str) -> Result<Decimal, AnalyticsError> {
    a.checked_mul(b)
        .ok_or(AnalyticsError::ArithmeticOverflow(context))
}

/// Division that returns zero when the denominator is zero.
pub fn ratio(
    numerator: Decimal,
    denominator: Decimal,
    context: &'static str,
) -> Result<Decimal, AnalyticsError> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)
        .ok_or(AnalyticsError::ArithmeticOverflow(context))
}

/// `numerator / denominator * 100`, zero when the denominator is zero.
pub fn percent(
    numerator: Decimal,
    denominator: Decimal,
    context: &'static str,
) -> Result<Decimal, AnalyticsError> {
    mul(ratio(numerator, denominator, context)?, HUNDRED, context)
}

/// Sum an iterator of amounts.
pub fn sum<I>(values: I, context: &'static str) -> Result<Decimal, AnalyticsError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| add(acc, v, context))
}

/// Round to two decimal places, half away from zero.
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Bound a computed share to [`SHARE_SCALE`] places, half to even.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Round each part to cents so the rounded parts add up to the rounded
/// total (largest-remainder method).
///
/// `parts` must be non-negative and sum to `total`. Each part is first
/// truncated to cents; the cents still missing from the rounded total go,
/// one each, to the parts with the largest truncated remainders. Ties go
/// to the earlier part.
pub fn distribute(total: Decimal, parts: &[Decimal]) -> Result<Vec<Decimal>, AnalyticsError> {
    let mut floors: Vec<Decimal> = parts
        .iter()
        .map(|p| p.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity))
        .collect();
    let floored = sum(floors.iter().copied(), "distributing cents")?;
    let mut missing = sub(round(total), floored, "distributing cents")?;

    let mut order = parts
        .iter()
        .zip(&floors)
        .enumerate()
        .map(|(i, (p, f))| Ok((i, sub(*p, *f, "distributing cents")?)))
        .collect::<Result<Vec<(usize, Decimal)>, AnalyticsError>>()?;
    order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    for (i, _) in order.iter().cycle().take(parts.len().saturating_mul(2)) {
        if missing < CENT {
            break;
        }
        if let Some(part) = floors.get_mut(*i) {
            *part = add(*part, CENT, "distributing cents")?;
        }
        missing = sub(missing, CENT, "distributing cents")?;
    }
    Ok(floors)
}
