//! The one-call façade: every engine run over a book, rounded for output.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use safra_ledger::{FarmBook, average_prices};
use safra_types::{
    AllocationDiagnostics, CategoryBreakdown, ConsumableKind, CostCategory, FarmReport,
    FarmTotals, FieldCostReport, RecordSet, Season, SeasonCostLines, SeasonOutlook,
    SeasonReport, ValuedConsumption,
};

use crate::AnalyticsError;
use crate::allocation::{Allocation, CostAllocator, SeasonAllocation};
use crate::config::AnalyticsConfig;
use crate::conservation::verify_allocation;
use crate::financial::{Sensitivity, break_even, profitability, sensitivity, split_costs};
use crate::money::{add, distribute, mul, round, sum};
use crate::productivity::ProductivityEngine;

/// Validate raw records and analyse them.
pub fn analyze_records(
    records: RecordSet,
    config: &AnalyticsConfig,
) -> Result<FarmReport, AnalyticsError> {
    let book = FarmBook::from_records(records)?;
    analyze(&book, config)
}

/// Run every engine over `book` and assemble the full report.
///
/// Fails with the first error any engine reports; a returned report is
/// always complete and its allocation balanced.
pub fn analyze(book: &FarmBook, config: &AnalyticsConfig) -> Result<FarmReport, AnalyticsError> {
    let classifier = config.classifier();

    let category_totals = classifier.breakdown(book.expenses())?;
    let prices = average_prices(book.movements(), &config.pricing.window())?;

    let allocation = CostAllocator::new(book, &classifier)
        .spread_untagged_maintenance(config.allocation.spread_untagged_maintenance)
        .allocate()?;
    verify_allocation(&allocation)?;

    let shared: Vec<Decimal> = allocation.seasons.iter().map(|s| s.shared_overhead).collect();
    let shared_total = sum(shared.iter().copied(), "summing shared slices")?;
    let shared_rounded = distribute(shared_total, &shared)?;

    let mut seasons = Vec::with_capacity(allocation.seasons.len());
    let mut outlooks = Vec::with_capacity(allocation.seasons.len());
    for (slot, shared_line) in allocation.seasons.iter().zip(shared_rounded) {
        let Some(season) = book.season(slot.season_id) else {
            continue;
        };
        let cost_lines = SeasonCostLines {
            usage: round(slot.usage_total()?),
            maintenance: round(slot.maintenance),
            direct_overhead: round(slot.direct_overhead),
            shared_overhead: shared_line,
        };
        let cost = lines_total(&cost_lines)?;

        let (fixed, variable) = split_costs(&slot.category_costs()?, &config.break_even)?;
        outlooks.push(SeasonOutlook {
            season_id: season.id,
            break_even: break_even(season.total_revenue, fixed, variable)?.report(),
            sensitivity: sensitivity(season.total_revenue, cost, &config.sensitivity.variations)?
                .iter()
                .map(Sensitivity::report)
                .collect(),
        });
        seasons.push(season_report(season, slot, cost_lines, cost, &prices)?);
    }

    let totals = farm_totals(book, &allocation, &seasons)?;
    let revenue = sum(
        book.seasons().iter().map(|s| s.total_revenue),
        "summing farm revenue",
    )?;
    let (fixed, variable) = split_costs(
        &break_even_costs(&category_totals, book)?,
        &config.break_even,
    )?;
    let farm_break_even = break_even(revenue, fixed, variable)?.report();
    let farm_sensitivity = sensitivity(revenue, totals.cost, &config.sensitivity.variations)?
        .iter()
        .map(Sensitivity::report)
        .collect();

    let fuel_price = prices
        .get(&ConsumableKind::Fuel)
        .copied()
        .unwrap_or_default();
    let productivity = ProductivityEngine::new(book, fuel_price).overview()?;

    debug!(
        seasons = seasons.len(),
        revenue = %totals.revenue,
        cost = %totals.cost,
        "farm report assembled"
    );

    Ok(FarmReport {
        categories: breakdown_report(&category_totals)?,
        average_prices: prices.into_iter().map(|(k, p)| (k, round(p))).collect(),
        seasons,
        totals,
        break_even: farm_break_even,
        sensitivity: farm_sensitivity,
        outlooks,
        productivity,
        diagnostics: diagnostics_report(&allocation.diagnostics),
    })
}

/// Category totals rounded so they still add up to the rounded total.
fn breakdown_report(
    totals: &BTreeMap<CostCategory, Decimal>,
) -> Result<CategoryBreakdown, AnalyticsError> {
    let total = sum(totals.values().copied(), "summing categories")?;
    let amounts: Vec<Decimal> = totals.values().copied().collect();
    let rounded = distribute(total, &amounts)?;
    Ok(CategoryBreakdown {
        totals: totals.keys().copied().zip(rounded).collect(),
        total: round(total),
    })
}

/// Expense category totals with the maintenance line taken from the
/// maintenance records, the source every season's maintenance comes from.
fn break_even_costs(
    category_totals: &BTreeMap<CostCategory, Decimal>,
    book: &FarmBook,
) -> Result<BTreeMap<CostCategory, Decimal>, AnalyticsError> {
    let maintenance = sum(
        book.maintenance().iter().map(|m| m.amount),
        "summing maintenance records",
    )?;
    let mut costs = category_totals.clone();
    costs.insert(CostCategory::Maintenance, maintenance);
    Ok(costs)
}

fn lines_total(lines: &SeasonCostLines) -> Result<Decimal, AnalyticsError> {
    sum(
        [
            lines.usage,
            lines.maintenance,
            lines.direct_overhead,
            lines.shared_overhead,
        ],
        "summing cost lines",
    )
}

/// One season's report. `cost` is the sum of the rounded `cost_lines`.
fn season_report(
    season: &Season,
    slot: &SeasonAllocation,
    cost_lines: SeasonCostLines,
    cost: Decimal,
    prices: &BTreeMap<ConsumableKind, Decimal>,
) -> Result<SeasonReport, AnalyticsError> {
    let area = slot.area()?;
    let metrics = profitability(season.total_revenue, cost, area)?;

    let fields = slot
        .field_areas
        .iter()
        .map(|(field, field_area)| {
            let usage = slot.field_usage.get(field).copied().unwrap_or_default();
            let overhead = slot.field_shared_overhead(*field)?;
            Ok(FieldCostReport {
                field_id: *field,
                area_hectares: round(*field_area),
                usage_cost: round(usage),
                overhead_cost: round(overhead),
                total_cost: round(add(usage, overhead, "summing field cost")?),
            })
        })
        .collect::<Result<Vec<_>, AnalyticsError>>()?;

    let consumption = slot
        .consumption
        .iter()
        .map(|(kind, quantity)| {
            let price = prices.get(kind).copied().unwrap_or_default();
            Ok(ValuedConsumption {
                consumable: *kind,
                quantity: round(*quantity),
                average_price: round(price),
                value: round(mul(*quantity, price, "valuing consumption")?),
            })
        })
        .collect::<Result<Vec<_>, AnalyticsError>>()?;

    Ok(SeasonReport {
        season_id: season.id,
        season_name: season.name.clone(),
        in_progress: season.in_progress,
        area_hectares: round(area),
        revenue: round(metrics.revenue),
        cost: metrics.cost,
        profit: round(metrics.profit),
        margin_pct: round(metrics.margin_pct),
        cost_per_hectare: round(metrics.cost_per_hectare),
        roi_pct: round(metrics.roi_pct),
        cost_lines,
        fields,
        consumption,
    })
}

/// Every season summed into one farm-wide profitability line.
///
/// Lines are summed from the rounded season lines, so the farm cost equals
/// the sum of the season costs.
fn farm_totals(
    book: &FarmBook,
    allocation: &Allocation,
    seasons: &[SeasonReport],
) -> Result<FarmTotals, AnalyticsError> {
    let revenue = sum(
        book.seasons().iter().map(|s| s.total_revenue),
        "summing farm revenue",
    )?;
    let area = allocation
        .seasons
        .iter()
        .try_fold(Decimal::ZERO, |acc, s| add(acc, s.area()?, "summing farm area"))?;
    let line = |pick: fn(&SeasonCostLines) -> Decimal| {
        sum(seasons.iter().map(|s| pick(&s.cost_lines)), "summing cost lines")
    };
    let cost_lines = SeasonCostLines {
        usage: line(|l| l.usage)?,
        maintenance: line(|l| l.maintenance)?,
        direct_overhead: line(|l| l.direct_overhead)?,
        shared_overhead: line(|l| l.shared_overhead)?,
    };

    let metrics = profitability(revenue, lines_total(&cost_lines)?, area)?;
    Ok(FarmTotals {
        seasons: u64::try_from(seasons.len()).unwrap_or(u64::MAX),
        area_hectares: round(area),
        revenue: round(metrics.revenue),
        cost: metrics.cost,
        profit: round(metrics.profit),
        margin_pct: round(metrics.margin_pct),
        cost_per_hectare: round(metrics.cost_per_hectare),
        roi_pct: round(metrics.roi_pct),
        cost_lines,
    })
}

fn diagnostics_report(diagnostics: &AllocationDiagnostics) -> AllocationDiagnostics {
    AllocationDiagnostics {
        unattributed_expenses: diagnostics.unattributed_expenses,
        unattributed_expense_amount: round(diagnostics.unattributed_expense_amount),
        unattributed_movements: diagnostics.unattributed_movements,
        unattributed_movement_quantity: diagnostics
            .unattributed_movement_quantity
            .iter()
            .map(|(k, q)| (*k, round(*q)))
            .collect(),
        unassigned_maintenance: diagnostics.unassigned_maintenance,
        unassigned_maintenance_amount: round(diagnostics.unassigned_maintenance_amount),
        unallocated_shared: round(diagnostics.unallocated_shared),
    }
}
