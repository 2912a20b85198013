//! Profitability, break-even, and revenue sensitivity.
//!
//! Given revenue `R`, cost `C`, and area `A`:
//!
//! ```text
//! profit           = R - C
//! margin %         = profit / R * 100          (0 when R = 0)
//! cost per hectare = C / A                     (0 when A = 0)
//! ROI %            = profit / C * 100          (0 when C = 0)
//! ```
//!
//! Break-even splits `C` into fixed `F` and variable `V` costs:
//!
//! ```text
//! contribution margin = R - V
//! break-even revenue  = F / (CM / R)           (0 unless CM > 0 and R > 0)
//! margin of safety %  = (R - BE) / R * 100     (0 when R = 0)
//! ```
//!
//! Which categories are fixed and which variable is configuration; see
//! [`BreakEvenConfig`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use safra_types::{BreakEvenReport, CostCategory, SensitivityRow};

use crate::AnalyticsError;
use crate::config::BreakEvenConfig;
use crate::money::{HUNDRED, add, mul, percent, ratio, round, sub, sum};

// ---------------------------------------------------------------------------
// Profitability
// ---------------------------------------------------------------------------

/// Full-precision profitability figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profitability {
    /// Revenue.
    pub revenue: Decimal,
    /// Total cost.
    pub cost: Decimal,
    /// Revenue minus cost.
    pub profit: Decimal,
    /// Profit as a percentage of revenue.
    pub margin_pct: Decimal,
    /// Cost per hectare.
    pub cost_per_hectare: Decimal,
    /// Profit as a percentage of cost.
    pub roi_pct: Decimal,
}

/// Profitability of a revenue/cost pair over an area.
pub fn profitability(
    revenue: Decimal,
    cost: Decimal,
    area: Decimal,
) -> Result<Profitability, AnalyticsError> {
    let profit = sub(revenue, cost, "computing profit")?;
    Ok(Profitability {
        revenue,
        cost,
        profit,
        margin_pct: percent(profit, revenue, "computing margin")?,
        cost_per_hectare: ratio(cost, area, "computing cost per hectare")?,
        roi_pct: percent(profit, cost, "computing ROI")?,
    })
}

// ---------------------------------------------------------------------------
// Break-even
// ---------------------------------------------------------------------------

/// Full-precision break-even analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakEven {
    /// Revenue analysed.
    pub revenue: Decimal,
    /// Fixed costs.
    pub fixed_costs: Decimal,
    /// Variable costs.
    pub variable_costs: Decimal,
    /// Revenue minus variable costs.
    pub contribution_margin: Decimal,
    /// Revenue at which profit is zero.
    pub break_even_revenue: Decimal,
    /// How far revenue can fall before reaching break-even, in percent.
    pub margin_of_safety_pct: Decimal,
}

impl BreakEven {
    /// Rounded report form.
    pub fn report(&self) -> BreakEvenReport {
        BreakEvenReport {
            revenue: round(self.revenue),
            break_even_revenue: round(self.break_even_revenue),
            margin_of_safety_pct: round(self.margin_of_safety_pct),
            contribution_margin: round(self.contribution_margin),
            fixed_costs: round(self.fixed_costs),
            variable_costs: round(self.variable_costs),
        }
    }
}

/// Break-even revenue and margin of safety.
///
/// A non-positive contribution margin means no revenue level breaks even;
/// the break-even revenue is then reported as zero.
pub fn break_even(
    revenue: Decimal,
    fixed_costs: Decimal,
    variable_costs: Decimal,
) -> Result<BreakEven, AnalyticsError> {
    let contribution_margin = sub(revenue, variable_costs, "computing contribution margin")?;

    let break_even_revenue =
        if contribution_margin > Decimal::ZERO && revenue > Decimal::ZERO {
            let cm_ratio = ratio(contribution_margin, revenue, "computing contribution ratio")?;
            ratio(fixed_costs, cm_ratio, "computing break-even")?
        } else {
            Decimal::ZERO
        };

    let margin_of_safety_pct = percent(
        sub(revenue, break_even_revenue, "computing margin of safety")?,
        revenue,
        "computing margin of safety",
    )?;

    Ok(BreakEven {
        revenue,
        fixed_costs,
        variable_costs,
        contribution_margin,
        break_even_revenue,
        margin_of_safety_pct,
    })
}

/// Split category costs into `(fixed, variable)` per the configuration.
///
/// A category listed as both fixed and variable counts as fixed only.
pub fn split_costs(
    costs: &BTreeMap<CostCategory, Decimal>,
    config: &BreakEvenConfig,
) -> Result<(Decimal, Decimal), AnalyticsError> {
    let variable_categories = config.variable();
    let fixed = sum(
        config
            .fixed_categories
            .iter()
            .filter_map(|c| costs.get(c).copied()),
        "summing fixed costs",
    )?;
    let variable = sum(
        variable_categories
            .iter()
            .filter(|c| !config.fixed_categories.contains(c))
            .filter_map(|c| costs.get(c).copied()),
        "summing variable costs",
    )?;
    Ok((fixed, variable))
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

/// One full-precision row of a sensitivity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensitivity {
    /// Revenue variation in percent.
    pub variation_pct: Decimal,
    /// Adjusted revenue.
    pub revenue: Decimal,
    /// Adjusted revenue minus the unchanged cost.
    pub profit: Decimal,
    /// Adjusted margin in percent.
    pub margin_pct: Decimal,
}

impl Sensitivity {
    /// Rounded report form.
    pub fn report(&self) -> SensitivityRow {
        SensitivityRow {
            variation_pct: round(self.variation_pct),
            revenue: round(self.revenue),
            profit: round(self.profit),
            margin_pct: round(self.margin_pct),
        }
    }
}

/// Profit and margin when revenue moves by each variation, cost held.
///
/// Rows follow the order of `variations`. A zero variation reproduces the
/// base profit and margin exactly.
pub fn sensitivity(
    revenue: Decimal,
    cost: Decimal,
    variations: &[Decimal],
) -> Result<Vec<Sensitivity>, AnalyticsError> {
    variations
        .iter()
        .map(|&variation_pct| {
            let factor = add(
                Decimal::ONE,
                ratio(variation_pct, HUNDRED, "scaling variation")?,
                "scaling variation",
            )?;
            let adjusted = mul(revenue, factor, "adjusting revenue")?;
            let profit = sub(adjusted, cost, "computing adjusted profit")?;
            Ok(Sensitivity {
                variation_pct,
                revenue: adjusted,
                profit,
                margin_pct: percent(profit, adjusted, "computing adjusted margin")?,
            })
        })
        .collect()
}
