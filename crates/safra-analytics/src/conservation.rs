//! Balance verification for an allocation pass.
//!
//! Allocation only moves money between buckets; it never creates or
//! destroys it. Two balances must therefore hold to within one minor
//! currency unit:
//!
//! ```text
//! sum(season shared overhead) + unallocated shared == shared pool
//! sum(season cost) + unattributed + unassigned + unallocated shared == attributable
//! ```
//!
//! Both hold exactly by construction for a well-formed pass; the tolerance
//! only absorbs Decimal precision loss. A violation is an
//! [`AnalyticsError::AllocationImbalance`] and fails the computation.

use rust_decimal::Decimal;
use tracing::error;

use crate::AnalyticsError;
use crate::allocation::Allocation;
use crate::money::{CENT, add, sub, sum};

/// Verify both allocation balances.
pub fn verify_allocation(allocation: &Allocation) -> Result<(), AnalyticsError> {
    let diagnostics = &allocation.diagnostics;

    let shared = sum(
        allocation.seasons.iter().map(|s| s.shared_overhead),
        "summing shared slices",
    )?;
    let shared = add(shared, diagnostics.unallocated_shared, "summing shared slices")?;
    balance("shared pool", allocation.shared_pool, shared)?;

    let placed = sum(
        [
            allocation.total_cost()?,
            diagnostics.unattributed_expense_amount,
            diagnostics.unassigned_maintenance_amount,
            diagnostics.unallocated_shared,
        ],
        "summing placed amounts",
    )?;
    balance("attributable costs", allocation.attributable, placed)
}

fn balance(check: &'static str, expected: Decimal, actual: Decimal) -> Result<(), AnalyticsError> {
    if sub(expected, actual, "checking balance")?.abs() < CENT {
        return Ok(());
    }
    error!(check, %expected, %actual, "allocation imbalance");
    Err(AnalyticsError::AllocationImbalance {
        check,
        expected,
        actual,
    })
}
