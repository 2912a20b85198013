//! Cost allocation, financial metrics, and productivity analytics for Safra.
//!
//! This crate turns a validated [`FarmBook`](safra_ledger::FarmBook) into
//! the figures the back office reports: what each harvest season cost, how
//! profitable it was, where it breaks even, and how productive its
//! operations were.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `safra-config.yaml` into
//!   strongly-typed structs.
//! - [`allocation`] -- [`CostAllocator`]: usage, maintenance, and overhead
//!   per season and field, with diagnostics for what cannot be placed.
//! - [`conservation`] -- Balance checks run after every allocation.
//! - [`financial`] -- Profitability, break-even, and sensitivity.
//! - [`productivity`] -- [`ProductivityEngine`]: hours, consumption, and
//!   cost rates grouped by season, field, equipment, and employee.
//! - [`money`] -- Checked decimal arithmetic and cent rounding.
//! - [`report`] -- [`analyze`]: every engine in one call.
//!
//! The engines are pure functions of their inputs: no I/O, no shared
//! state, and identical input always yields identical output.

pub mod allocation;
pub mod config;
pub mod conservation;
pub mod error;
pub mod financial;
pub mod money;
pub mod productivity;
pub mod report;

pub use allocation::{Allocation, CostAllocator, SeasonAllocation};
pub use config::{AnalyticsConfig, ConfigError};
pub use error::AnalyticsError;
pub use productivity::ProductivityEngine;
pub use report::{analyze, analyze_records};
