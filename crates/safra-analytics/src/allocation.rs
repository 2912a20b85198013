//! Cost allocation across harvest seasons.
//!
//! A season's cost has four lines:
//!
//! - **usage**: fuel-usage and input-usage expenses whose operation belongs
//!   to the season, or that name the season directly;
//! - **maintenance**: maintenance records tagged to the season;
//! - **direct overhead**: administrative expenses tagged to the season;
//! - **shared overhead**: the season's slice of the untagged administrative
//!   pool, weighted by the area of the fields its operations touched
//!   (equal slices when no season has area).
//!
//! Purchases are inventory acquisitions and reach seasons only through usage.
//! Maintenance-category expenses mirror the maintenance records and are not
//! allocated a second time. Anything that cannot be placed is counted in
//! [`AllocationDiagnostics`] and logged; nothing is dropped silently.
//!
//! All amounts here are full precision. Rounding happens in [`crate::report`].

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, warn};

use safra_ledger::{CostClassifier, FarmBook, ReferenceResolver, UsageTarget};
use safra_types::{
    AllocationDiagnostics, ConsumableKind, CostCategory, ExpenseRecord, FieldId,
    MovementDirection, SeasonId,
};

use crate::AnalyticsError;
use crate::money::{add, mul, quantize, ratio, sub, sum};

// ---------------------------------------------------------------------------
// Allocation results
// ---------------------------------------------------------------------------

/// Everything allocated to one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonAllocation {
    /// The season.
    pub season_id: SeasonId,
    /// Area of each distinct field the season's operations touched.
    pub field_areas: BTreeMap<FieldId, Decimal>,
    /// Usage cost per usage category.
    pub usage: BTreeMap<CostCategory, Decimal>,
    /// Maintenance records tagged to the season.
    pub maintenance: Decimal,
    /// Administrative expenses tagged to the season.
    pub direct_overhead: Decimal,
    /// Slice of the shared administrative pool.
    pub shared_overhead: Decimal,
    /// Usage cost per field, for usage resolved to an operation.
    pub field_usage: BTreeMap<FieldId, Decimal>,
    /// Physical quantity consumed by the season's operations.
    pub consumption: BTreeMap<ConsumableKind, Decimal>,
}

impl SeasonAllocation {
    fn new(season_id: SeasonId, field_areas: BTreeMap<FieldId, Decimal>) -> Self {
        Self {
            season_id,
            field_areas,
            usage: BTreeMap::new(),
            maintenance: Decimal::ZERO,
            direct_overhead: Decimal::ZERO,
            shared_overhead: Decimal::ZERO,
            field_usage: BTreeMap::new(),
            consumption: BTreeMap::new(),
        }
    }

    /// Total area in hectares.
    pub fn area(&self) -> Result<Decimal, AnalyticsError> {
        sum(self.field_areas.values().copied(), "summing season area")
    }

    /// Total usage cost.
    pub fn usage_total(&self) -> Result<Decimal, AnalyticsError> {
        sum(self.usage.values().copied(), "summing usage cost")
    }

    /// Direct plus shared overhead.
    pub fn overhead(&self) -> Result<Decimal, AnalyticsError> {
        add(self.direct_overhead, self.shared_overhead, "summing overhead")
    }

    /// Total season cost: usage, maintenance and both overheads.
    pub fn total(&self) -> Result<Decimal, AnalyticsError> {
        sum(
            [self.usage_total()?, self.maintenance, self.overhead()?],
            "summing season cost",
        )
    }

    /// A field's slice of the shared overhead, by its share of the
    /// season's area.
    pub fn field_shared_overhead(&self, field: FieldId) -> Result<Decimal, AnalyticsError> {
        let area = self.field_areas.get(&field).copied().unwrap_or_default();
        let weighted = mul(self.shared_overhead, area, "weighting field overhead")?;
        ratio(weighted, self.area()?, "weighting field overhead")
    }

    /// Season cost keyed by the category it stems from.
    ///
    /// Shared and direct overhead both count as administrative; purchase
    /// categories are always zero.
    pub fn category_costs(&self) -> Result<BTreeMap<CostCategory, Decimal>, AnalyticsError> {
        let mut costs: BTreeMap<CostCategory, Decimal> = CostCategory::ALL
            .iter()
            .map(|category| (*category, Decimal::ZERO))
            .collect();
        for (category, amount) in &self.usage {
            costs.insert(*category, *amount);
        }
        costs.insert(CostCategory::Maintenance, self.maintenance);
        costs.insert(CostCategory::AdministrativeOther, self.overhead()?);
        Ok(costs)
    }
}

/// Outcome of one allocation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// One entry per season, in the book's season order.
    pub seasons: Vec<SeasonAllocation>,
    /// Untagged overhead divided among seasons.
    pub shared_pool: Decimal,
    /// Every amount the pass was responsible for placing.
    pub attributable: Decimal,
    /// What could not be placed.
    pub diagnostics: AllocationDiagnostics,
}

impl Allocation {
    /// The allocation for one season.
    pub fn season(&self, id: SeasonId) -> Option<&SeasonAllocation> {
        self.seasons.iter().find(|s| s.season_id == id)
    }

    /// Sum of every season's total cost.
    pub fn total_cost(&self) -> Result<Decimal, AnalyticsError> {
        self.seasons
            .iter()
            .try_fold(Decimal::ZERO, |acc, s| add(acc, s.total()?, "summing farm cost"))
    }
}

// ---------------------------------------------------------------------------
// Allocator
// ---------------------------------------------------------------------------

/// Distributes expenses, maintenance, and consumption over seasons.
#[derive(Debug, Clone)]
pub struct CostAllocator<'a> {
    book: &'a FarmBook,
    classifier: &'a CostClassifier,
    spread_untagged_maintenance: bool,
}

/// Working state of one pass.
struct Pass<'a> {
    resolver: ReferenceResolver<'a>,
    seasons: BTreeMap<SeasonId, SeasonAllocation>,
    pool: Decimal,
    attributable: Decimal,
    diagnostics: AllocationDiagnostics,
}

impl Pass<'_> {
    fn unattributed(
        &mut self,
        expense: &ExpenseRecord,
        reason: &str,
    ) -> Result<(), AnalyticsError> {
        warn!(
            expense = %expense.id,
            amount = %expense.amount,
            reason,
            "expense left unattributed"
        );
        self.diagnostics.unattributed_expenses =
            self.diagnostics.unattributed_expenses.saturating_add(1);
        self.diagnostics.unattributed_expense_amount = add(
            self.diagnostics.unattributed_expense_amount,
            expense.amount,
            "summing unattributed expenses",
        )?;
        Ok(())
    }
}

impl<'a> CostAllocator<'a> {
    /// Create an allocator over a book, classifying with `classifier`.
    pub const fn new(book: &'a FarmBook, classifier: &'a CostClassifier) -> Self {
        Self {
            book,
            classifier,
            spread_untagged_maintenance: false,
        }
    }

    /// Spread maintenance without a season through the shared pool.
    #[must_use]
    pub const fn spread_untagged_maintenance(mut self, spread: bool) -> Self {
        self.spread_untagged_maintenance = spread;
        self
    }

    /// Run the allocation.
    pub fn allocate(&self) -> Result<Allocation, AnalyticsError> {
        let mut pass = Pass {
            resolver: self.book.resolver(),
            seasons: self.season_slots(),
            pool: Decimal::ZERO,
            attributable: Decimal::ZERO,
            diagnostics: AllocationDiagnostics::default(),
        };

        self.place_expenses(&mut pass)?;
        self.place_maintenance(&mut pass)?;
        self.place_consumption(&mut pass)?;
        self.share_pool(&mut pass)?;

        let seasons: Vec<SeasonAllocation> = self
            .book
            .seasons()
            .iter()
            .filter_map(|s| pass.seasons.remove(&s.id))
            .collect();

        debug!(
            seasons = seasons.len(),
            shared_pool = %pass.pool,
            attributable = %pass.attributable,
            unattributed = pass.diagnostics.unattributed_expenses,
            unassigned_maintenance = pass.diagnostics.unassigned_maintenance,
            "allocation pass complete"
        );

        Ok(Allocation {
            seasons,
            shared_pool: pass.pool,
            attributable: pass.attributable,
            diagnostics: pass.diagnostics,
        })
    }

    /// One empty slot per season, with the fields its operations touched.
    fn season_slots(&self) -> BTreeMap<SeasonId, SeasonAllocation> {
        let mut touched: BTreeMap<SeasonId, BTreeSet<FieldId>> = BTreeMap::new();
        for operation in self.book.operations() {
            if let (Some(season), Some(field)) = (operation.season_id, operation.field_id) {
                touched.entry(season).or_default().insert(field);
            }
        }

        self.book
            .seasons()
            .iter()
            .map(|season| {
                let field_areas = touched
                    .remove(&season.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|field| (field, self.book.field_area(field)))
                    .collect();
                (season.id, SeasonAllocation::new(season.id, field_areas))
            })
            .collect()
    }

    fn place_expenses(&self, pass: &mut Pass<'_>) -> Result<(), AnalyticsError> {
        for expense in self.book.expenses() {
            if let Some((category, target)) = self.classifier.usage_target(expense, &pass.resolver)
            {
                pass.attributable = add(pass.attributable, expense.amount, "summing inputs")?;
                Self::place_usage(pass, expense, category, target)?;
                continue;
            }
            if self.classifier.classify_expense(expense) != CostCategory::AdministrativeOther {
                continue;
            }

            pass.attributable = add(pass.attributable, expense.amount, "summing inputs")?;
            match expense.season_id {
                None => pass.pool = add(pass.pool, expense.amount, "summing shared pool")?,
                Some(id) => match pass.seasons.get_mut(&id) {
                    Some(slot) => {
                        slot.direct_overhead =
                            add(slot.direct_overhead, expense.amount, "summing overhead")?;
                    }
                    None => pass.unattributed(expense, "unknown season")?,
                },
            }
        }
        Ok(())
    }

    fn place_usage(
        pass: &mut Pass<'_>,
        expense: &ExpenseRecord,
        category: CostCategory,
        target: UsageTarget<'_>,
    ) -> Result<(), AnalyticsError> {
        let (season, field) = match target {
            UsageTarget::Operation(operation) => (operation.season_id, operation.field_id),
            UsageTarget::Unresolved(unresolved) => {
                return pass.unattributed(expense, &unresolved.to_string());
            }
            UsageTarget::Unreferenced => match expense.season_id {
                Some(season) => (Some(season), None),
                None => return pass.unattributed(expense, "no reference or season"),
            },
        };

        let Some(slot) = season.and_then(|id| pass.seasons.get_mut(&id)) else {
            return pass.unattributed(expense, "unknown season");
        };
        let line = slot.usage.entry(category).or_default();
        *line = add(*line, expense.amount, "summing usage cost")?;
        if let Some(field) = field {
            let line = slot.field_usage.entry(field).or_default();
            *line = add(*line, expense.amount, "summing field usage")?;
        }
        Ok(())
    }

    fn place_maintenance(&self, pass: &mut Pass<'_>) -> Result<(), AnalyticsError> {
        for record in self.book.maintenance() {
            pass.attributable = add(pass.attributable, record.amount, "summing inputs")?;
            if let Some(slot) = record.season_id.and_then(|id| pass.seasons.get_mut(&id)) {
                slot.maintenance = add(slot.maintenance, record.amount, "summing maintenance")?;
            } else if self.spread_untagged_maintenance {
                pass.pool = add(pass.pool, record.amount, "summing shared pool")?;
            } else {
                let reason = if record.season_id.is_some() {
                    "unknown season"
                } else {
                    "no season"
                };
                warn!(
                    maintenance = %record.id,
                    amount = %record.amount,
                    reason,
                    "maintenance left unassigned"
                );
                pass.diagnostics.unassigned_maintenance =
                    pass.diagnostics.unassigned_maintenance.saturating_add(1);
                pass.diagnostics.unassigned_maintenance_amount = add(
                    pass.diagnostics.unassigned_maintenance_amount,
                    record.amount,
                    "summing unassigned maintenance",
                )?;
            }
        }
        Ok(())
    }

    fn place_consumption(&self, pass: &mut Pass<'_>) -> Result<(), AnalyticsError> {
        for movement in self
            .book
            .movements()
            .iter()
            .filter(|m| m.direction == MovementDirection::Exit)
        {
            let operation = movement
                .reference
                .as_ref()
                .and_then(|r| pass.resolver.resolve(r));
            let slot = operation
                .and_then(|op| op.season_id)
                .and_then(|id| pass.seasons.get_mut(&id));

            if let Some(slot) = slot {
                let line = slot.consumption.entry(movement.consumable).or_default();
                *line = add(*line, movement.quantity, "summing consumption")?;
            } else {
                warn!(
                    movement = %movement.id,
                    quantity = %movement.quantity,
                    "exit movement left unattributed"
                );
                let diagnostics = &mut pass.diagnostics;
                diagnostics.unattributed_movements =
                    diagnostics.unattributed_movements.saturating_add(1);
                let line = diagnostics
                    .unattributed_movement_quantity
                    .entry(movement.consumable)
                    .or_default();
                *line = add(*line, movement.quantity, "summing unattributed quantity")?;
            }
        }
        Ok(())
    }

    /// Divide the pool by area weight; the last season absorbs the
    /// remainder so the slices add up to the pool exactly. Leading slices
    /// are quantized so later sums stay within Decimal precision.
    fn share_pool(&self, pass: &mut Pass<'_>) -> Result<(), AnalyticsError> {
        let order: Vec<SeasonId> = self.book.seasons().iter().map(|s| s.id).collect();
        let Some((last, leading)) = order.split_last() else {
            if !pass.pool.is_zero() {
                warn!(amount = %pass.pool, "no seasons to share overhead with");
            }
            pass.diagnostics.unallocated_shared = pass.pool;
            return Ok(());
        };

        let mut areas = BTreeMap::new();
        for (id, slot) in &pass.seasons {
            areas.insert(*id, slot.area()?);
        }
        let total_area = sum(areas.values().copied(), "summing farm area")?;
        let count = Decimal::from(order.len());

        let mut allocated = Decimal::ZERO;
        for id in leading {
            let share = quantize(if total_area.is_zero() {
                ratio(pass.pool, count, "splitting shared pool")?
            } else {
                let area = areas.get(id).copied().unwrap_or_default();
                let weighted = mul(pass.pool, area, "weighting shared pool")?;
                ratio(weighted, total_area, "weighting shared pool")?
            });
            if let Some(slot) = pass.seasons.get_mut(id) {
                slot.shared_overhead = share;
            }
            allocated = add(allocated, share, "summing shared slices")?;
        }
        if let Some(slot) = pass.seasons.get_mut(last) {
            slot.shared_overhead = sub(pass.pool, allocated, "closing shared pool")?;
        }
        Ok(())
    }
}
