//! Error types for the analytics engines.

use rust_decimal::Decimal;
use safra_ledger::LedgerError;

/// Failure of an analysis pass.
///
/// The engine either returns a complete, consistent report or exactly one
/// of these.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// The input records were malformed.
    #[error("invalid input: {0}")]
    Ledger(#[from] LedgerError),

    /// Decimal overflow while computing a figure.
    #[error("arithmetic overflow while {0}")]
    ArithmeticOverflow(&'static str),

    /// Allocated amounts do not add up to what went in.
    #[error("allocation imbalance in {check}: expected {expected}, got {actual}")]
    AllocationImbalance {
        /// Which balance failed.
        check: &'static str,
        /// The input total.
        expected: Decimal,
        /// The allocated total.
        actual: Decimal,
    },
}
