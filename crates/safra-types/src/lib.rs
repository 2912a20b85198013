//! Shared type definitions for the Safra farm analytics engine.
//!
//! This crate is the single source of truth for the records the engine
//! reads and the reports it emits. Report types flow downstream to
//! `TypeScript` via `ts-rs` for the back-office dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all record identifiers
//! - [`enums`] -- Cost categories, consumables, movement directions, operation kinds
//! - [`records`] -- Input records and the polymorphic [`Reference`]
//! - [`reports`] -- Report payloads produced by an analysis pass

pub mod enums;
pub mod ids;
pub mod records;
pub mod reports;

// Re-export all public types at crate root for convenience.
pub use enums::{ConsumableKind, CostCategory, MovementDirection, OperationKind};
pub use ids::{
    EmployeeId, EquipmentId, ExpenseId, FieldId, MaintenanceId, MovementId, OperationId,
    SeasonId,
};
pub use records::{
    ExpenseRecord, Field, MaintenanceRecord, MovementRecord, OperationRecord, RawReference,
    RecordSet, Reference, Season,
};
pub use reports::{
    AllocationDiagnostics, BreakEvenReport, CategoryBreakdown, FarmReport, FarmTotals,
    FieldCostReport, ProductivityOverview, ProductivityReport, ProductivitySubject,
    SeasonCostLines, SeasonOutlook, SeasonReport, SensitivityRow, ValuedConsumption,
};
