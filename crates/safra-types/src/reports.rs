//! Report payloads emitted by the analytics engine.
//!
//! These are the transient output structures consumed by dashboards and
//! exports. Every currency and percentage figure is a [`Decimal`] already
//! rounded to two places; percentages are 0-100 scaled. Types flow to
//! `TypeScript` via `ts-rs`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ConsumableKind, CostCategory};
use crate::ids::{EmployeeId, EquipmentId, FieldId, SeasonId};

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

/// Expense totals per cost category.
///
/// All six categories are always present, zero when no expense fell into
/// them, so the totals always sum to `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CategoryBreakdown {
    /// Total per category.
    #[ts(as = "BTreeMap<CostCategory, String>")]
    pub totals: BTreeMap<CostCategory, Decimal>,
    /// Sum of every expense.
    #[ts(as = "String")]
    pub total: Decimal,
}

// ---------------------------------------------------------------------------
// Season profitability
// ---------------------------------------------------------------------------

/// Where a season's cost came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonCostLines {
    /// Fuel and input usage traced to the season's operations.
    #[ts(as = "String")]
    pub usage: Decimal,
    /// Maintenance charges tagged to the season.
    #[ts(as = "String")]
    pub maintenance: Decimal,
    /// Administrative expenses booked directly against the season.
    #[ts(as = "String")]
    pub direct_overhead: Decimal,
    /// The season's share of the shared overhead pool.
    #[ts(as = "String")]
    pub shared_overhead: Decimal,
}

/// Cost attributed to one field within a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FieldCostReport {
    /// The field.
    pub field_id: FieldId,
    /// Field area in hectares.
    #[ts(as = "String")]
    pub area_hectares: Decimal,
    /// Usage cost traced to operations on this field.
    #[ts(as = "String")]
    pub usage_cost: Decimal,
    /// Share of the season's overhead, by area.
    #[ts(as = "String")]
    pub overhead_cost: Decimal,
    /// `usage_cost + overhead_cost`.
    #[ts(as = "String")]
    pub total_cost: Decimal,
}

/// Physical consumption traced to a season, valued at average price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ValuedConsumption {
    /// The consumable.
    pub consumable: ConsumableKind,
    /// Quantity consumed by the season's operations.
    #[ts(as = "String")]
    pub quantity: Decimal,
    /// Weighted average unit price used for valuation.
    #[ts(as = "String")]
    pub average_price: Decimal,
    /// `quantity * average_price`. Informational; not part of `cost`.
    #[ts(as = "String")]
    pub value: Decimal,
}

/// Profitability of a single season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonReport {
    /// The season.
    pub season_id: SeasonId,
    /// Season display name.
    pub season_name: String,
    /// Whether the season is still running.
    pub in_progress: bool,
    /// Area of the fields the season's operations touched.
    #[ts(as = "String")]
    pub area_hectares: Decimal,
    /// Revenue booked.
    #[ts(as = "String")]
    pub revenue: Decimal,
    /// Total attributed cost.
    #[ts(as = "String")]
    pub cost: Decimal,
    /// `revenue - cost`.
    #[ts(as = "String")]
    pub profit: Decimal,
    /// `profit / revenue * 100`.
    #[ts(as = "String")]
    pub margin_pct: Decimal,
    /// `cost / area`.
    #[ts(as = "String")]
    pub cost_per_hectare: Decimal,
    /// `profit / cost * 100`.
    #[ts(as = "String")]
    pub roi_pct: Decimal,
    /// Cost composition.
    pub cost_lines: SeasonCostLines,
    /// Per-field cost split.
    pub fields: Vec<FieldCostReport>,
    /// Consumption traced through inventory exits.
    pub consumption: Vec<ValuedConsumption>,
}

/// Farm-wide profitability: every season summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FarmTotals {
    /// Number of seasons included.
    pub seasons: u64,
    /// Total area across seasons (a field worked in two seasons counts twice).
    #[ts(as = "String")]
    pub area_hectares: Decimal,
    /// Total revenue.
    #[ts(as = "String")]
    pub revenue: Decimal,
    /// Total attributed cost.
    #[ts(as = "String")]
    pub cost: Decimal,
    /// `revenue - cost`.
    #[ts(as = "String")]
    pub profit: Decimal,
    /// `profit / revenue * 100`.
    #[ts(as = "String")]
    pub margin_pct: Decimal,
    /// `cost / area`.
    #[ts(as = "String")]
    pub cost_per_hectare: Decimal,
    /// `profit / cost * 100`.
    #[ts(as = "String")]
    pub roi_pct: Decimal,
    /// Cost composition summed over seasons.
    pub cost_lines: SeasonCostLines,
}

// ---------------------------------------------------------------------------
// Break-even and sensitivity
// ---------------------------------------------------------------------------

/// Break-even analysis for a season or the whole farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BreakEvenReport {
    /// Revenue the analysis was run against.
    #[ts(as = "String")]
    pub revenue: Decimal,
    /// Revenue at which contribution margin covers fixed costs.
    #[ts(as = "String")]
    pub break_even_revenue: Decimal,
    /// `(revenue - break_even) / revenue * 100`.
    #[ts(as = "String")]
    pub margin_of_safety_pct: Decimal,
    /// `revenue - variable_costs`.
    #[ts(as = "String")]
    pub contribution_margin: Decimal,
    /// Fixed costs.
    #[ts(as = "String")]
    pub fixed_costs: Decimal,
    /// Variable costs.
    #[ts(as = "String")]
    pub variable_costs: Decimal,
}

/// One row of a revenue sensitivity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SensitivityRow {
    /// Revenue variation applied, in percent.
    #[ts(as = "String")]
    pub variation_pct: Decimal,
    /// Adjusted revenue.
    #[ts(as = "String")]
    pub revenue: Decimal,
    /// Adjusted profit.
    #[ts(as = "String")]
    pub profit: Decimal,
    /// Adjusted margin, in percent.
    #[ts(as = "String")]
    pub margin_pct: Decimal,
}

/// Break-even and sensitivity for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonOutlook {
    /// The season.
    pub season_id: SeasonId,
    /// Break-even figures.
    pub break_even: BreakEvenReport,
    /// Revenue sensitivity table.
    pub sensitivity: Vec<SensitivityRow>,
}

// ---------------------------------------------------------------------------
// Productivity
// ---------------------------------------------------------------------------

/// What a productivity report was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ProductivitySubject {
    /// Every operation in the pass.
    All,
    /// One season's operations.
    Season(SeasonId),
    /// One field's operations.
    Field(FieldId),
    /// One piece of equipment's operations.
    Equipment(EquipmentId),
    /// One employee's operations.
    Employee(EmployeeId),
}

/// Operational efficiency over a set of operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProductivityReport {
    /// What the figures cover.
    pub subject: ProductivitySubject,
    /// Number of operations.
    pub operations: u64,
    /// Total hours worked.
    #[ts(as = "String")]
    pub hours_worked: Decimal,
    /// Total consumable consumed (liters).
    #[ts(as = "String")]
    pub consumed: Decimal,
    /// `consumed / hours_worked`, volume per hour.
    #[ts(as = "String")]
    pub efficiency: Decimal,
    /// `operations / hours_worked`.
    #[ts(as = "String")]
    pub operations_per_hour: Decimal,
    /// Operational cost the rates below were derived from.
    #[ts(as = "String")]
    pub operational_cost: Decimal,
    /// `operational_cost / hours_worked`.
    #[ts(as = "String")]
    pub cost_per_hour: Decimal,
    /// Area the operations covered, when known.
    #[ts(as = "Option<String>")]
    pub area_hectares: Option<Decimal>,
    /// `hours_worked / area`.
    #[ts(as = "Option<String>")]
    pub hours_per_hectare: Option<Decimal>,
    /// `consumed / area`.
    #[ts(as = "Option<String>")]
    pub consumed_per_hectare: Option<Decimal>,
    /// `operational_cost / area`.
    #[ts(as = "Option<String>")]
    pub cost_per_hectare: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Diagnostics and the full report
// ---------------------------------------------------------------------------

/// Records that could not be attributed, with their totals.
///
/// Nothing the allocator skips disappears: it is counted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AllocationDiagnostics {
    /// Usage or season-tagged expenses that resolved to no known season.
    pub unattributed_expenses: u64,
    /// Amount of those expenses.
    #[ts(as = "String")]
    pub unattributed_expense_amount: Decimal,
    /// Exit movements whose reference did not resolve.
    pub unattributed_movements: u64,
    /// Quantity of those movements, per consumable.
    #[ts(as = "BTreeMap<ConsumableKind, String>")]
    pub unattributed_movement_quantity: BTreeMap<ConsumableKind, Decimal>,
    /// Maintenance charges with no (known) season.
    pub unassigned_maintenance: u64,
    /// Amount of those charges.
    #[ts(as = "String")]
    pub unassigned_maintenance_amount: Decimal,
    /// Shared overhead left unallocated because there were no seasons.
    #[ts(as = "String")]
    pub unallocated_shared: Decimal,
}

/// Productivity broken down along every grouping axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProductivityOverview {
    /// All operations together.
    pub overall: ProductivityReport,
    /// Per season.
    pub seasons: Vec<ProductivityReport>,
    /// Per field.
    pub fields: Vec<ProductivityReport>,
    /// Per equipment.
    pub equipment: Vec<ProductivityReport>,
    /// Per employee.
    pub employees: Vec<ProductivityReport>,
}

/// Everything one analysis pass produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FarmReport {
    /// Expense totals per category.
    pub categories: CategoryBreakdown,
    /// Weighted average price per consumable.
    #[ts(as = "BTreeMap<ConsumableKind, String>")]
    pub average_prices: BTreeMap<ConsumableKind, Decimal>,
    /// Per-season profitability, in season start order.
    pub seasons: Vec<SeasonReport>,
    /// Farm-wide profitability across all seasons.
    pub totals: FarmTotals,
    /// Farm-wide break-even.
    pub break_even: BreakEvenReport,
    /// Farm-wide revenue sensitivity.
    pub sensitivity: Vec<SensitivityRow>,
    /// Per-season break-even and sensitivity.
    pub outlooks: Vec<SeasonOutlook>,
    /// Operational efficiency.
    pub productivity: ProductivityOverview,
    /// Records the allocator could not attribute.
    pub diagnostics: AllocationDiagnostics,
}
