//! Validated record book for the Safra farm analytics engine.
//!
//! Everything the engine knows about a farm arrives as six flat record
//! collections. This crate turns them into a [`FarmBook`]: checked for
//! malformed input, indexed by id, and queryable through the leaf
//! components every analysis pass relies on.
//!
//! # Architecture
//!
//! - [`book`] -- The [`FarmBook`] struct: validated, indexed collections.
//! - [`validation`] -- Per-record input checks (non-negative amounts,
//!   required relations, unique ids).
//! - [`resolver`] -- [`ReferenceResolver`]: polymorphic expense/movement
//!   references to concrete operations.
//! - [`classifier`] -- [`CostClassifier`]: free-text expense tags to
//!   [`CostCategory`](safra_types::CostCategory).
//! - [`pricing`] -- Weighted average unit prices from inventory entries.
//! - [`filter`] -- [`OperationFilter`] for season/field/equipment/employee
//!   and date-range selections.
//!
//! # Failure policy
//!
//! Malformed input is fatal: [`FarmBook::from_records`] returns a single
//! [`LedgerError`] describing the first offending record. Loose data that
//! the back office legitimately produces (unknown tags, dangling
//! references, missing optional numbers) is recovered downstream and never
//! reaches this error type.
//!
//! # Usage
//!
//! ```
//! use safra_ledger::FarmBook;
//! use safra_types::RecordSet;
//!
//! let book = FarmBook::from_records(RecordSet::default());
//! assert!(book.is_ok());
//! ```

pub mod book;
pub mod classifier;
pub mod filter;
pub mod pricing;
pub mod resolver;
pub mod validation;

// Re-export primary types at crate root.
pub use book::FarmBook;
pub use classifier::{CostClassifier, UsageTarget};
pub use filter::{DateWindow, OperationFilter};
pub use pricing::{average_price, average_prices};
pub use resolver::{ReferenceResolver, Unresolved};

use rust_decimal::Decimal;
use uuid::Uuid;

use safra_types::{FieldId, OperationId, SeasonId};

// ---------------------------------------------------------------------------
// Record kinds
// ---------------------------------------------------------------------------

/// Which collection a record came from, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// An expense.
    Expense,
    /// An inventory movement.
    Movement,
    /// A maintenance charge.
    Maintenance,
    /// A planting or harvest operation.
    Operation,
    /// A field.
    Field,
    /// A season.
    Season,
}

impl core::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Expense => "expense",
            Self::Movement => "movement",
            Self::Maintenance => "maintenance",
            Self::Operation => "operation",
            Self::Field => "field",
            Self::Season => "season",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Malformed input detected while building a [`FarmBook`].
///
/// Any of these fails the whole computation: the engine never produces a
/// report from partially-valid input.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A quantity, amount, area, or duration was negative.
    #[error("{record} {id}: {field} must not be negative, got {value}")]
    NegativeValue {
        /// Collection the record came from.
        record: RecordKind,
        /// Record identifier.
        id: Uuid,
        /// Offending field name.
        field: &'static str,
        /// The invalid value.
        value: Decimal,
    },

    /// A relation the computation depends on was absent.
    #[error("{record} {id}: missing required field {field}")]
    MissingField {
        /// Collection the record came from.
        record: RecordKind,
        /// Record identifier.
        id: Uuid,
        /// Missing field name.
        field: &'static str,
    },

    /// Two records in the same collection share an id.
    #[error("duplicate {record} id {id}")]
    DuplicateId {
        /// Collection the records came from.
        record: RecordKind,
        /// The repeated identifier.
        id: Uuid,
    },

    /// An operation names a field absent from the field collection.
    #[error("operation {operation} references unknown field {field}")]
    UnknownField {
        /// The operation.
        operation: OperationId,
        /// The missing field.
        field: FieldId,
    },

    /// A season ends before it starts.
    #[error("season {season}: end date precedes start date")]
    InvertedSeasonDates {
        /// The season.
        season: SeasonId,
    },

    /// Decimal overflow while accumulating totals.
    #[error("arithmetic overflow while {0}")]
    ArithmeticOverflow(&'static str),
}
