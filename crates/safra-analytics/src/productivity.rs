//! Operational productivity of planting and harvest operations.
//!
//! For any selection of operations:
//!
//! ```text
//! hours worked        = sum(duration)
//! consumed            = sum(consumption)
//! efficiency          = consumed / hours worked
//! operations per hour = count / hours worked
//! cost per hour       = operational cost / hours worked
//! ```
//!
//! When the selection has an area, hours, consumption and cost are also
//! given per hectare. Every ratio is zero when its denominator is.
//!
//! Operational cost is the operations' fuel consumption valued at the
//! weighted average fuel price; equipment groups and the farm-wide figure
//! add maintenance charges on top.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::debug;

use safra_ledger::{FarmBook, OperationFilter};
use safra_types::{
    EmployeeId, EquipmentId, FieldId, OperationRecord, ProductivityOverview, ProductivityReport,
    ProductivitySubject,
};

use crate::AnalyticsError;
use crate::money::{add, mul, ratio, round, sum};

/// Full-precision productivity of a selection of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Productivity {
    /// What was measured.
    pub subject: ProductivitySubject,
    /// Number of operations.
    pub operations: u64,
    /// Total hours.
    pub hours_worked: Decimal,
    /// Total consumption.
    pub consumed: Decimal,
    /// Consumption per hour.
    pub efficiency: Decimal,
    /// Operations per hour.
    pub operations_per_hour: Decimal,
    /// Cost attributed to the operations.
    pub operational_cost: Decimal,
    /// Cost per hour.
    pub cost_per_hour: Decimal,
    /// Area worked, when meaningful for the subject.
    pub area_hectares: Option<Decimal>,
    /// Hours per hectare.
    pub hours_per_hectare: Option<Decimal>,
    /// Consumption per hectare.
    pub consumed_per_hectare: Option<Decimal>,
    /// Cost per hectare.
    pub cost_per_hectare: Option<Decimal>,
}

impl Productivity {
    /// Rounded report form.
    pub fn report(&self) -> ProductivityReport {
        ProductivityReport {
            subject: self.subject,
            operations: self.operations,
            hours_worked: round(self.hours_worked),
            consumed: round(self.consumed),
            efficiency: round(self.efficiency),
            operations_per_hour: round(self.operations_per_hour),
            operational_cost: round(self.operational_cost),
            cost_per_hour: round(self.cost_per_hour),
            area_hectares: self.area_hectares.map(round),
            hours_per_hectare: self.hours_per_hectare.map(round),
            consumed_per_hectare: self.consumed_per_hectare.map(round),
            cost_per_hectare: self.cost_per_hectare.map(round),
        }
    }
}

/// Measure a selection of operations.
pub fn measure<'a, I>(
    subject: ProductivitySubject,
    operations: I,
    operational_cost: Decimal,
    area: Option<Decimal>,
) -> Result<Productivity, AnalyticsError>
where
    I: IntoIterator<Item = &'a OperationRecord>,
{
    let mut count = 0_u64;
    let mut hours_worked = Decimal::ZERO;
    let mut consumed = Decimal::ZERO;
    for operation in operations {
        count = count.saturating_add(1);
        hours_worked = add(hours_worked, operation.duration_hours, "summing hours")?;
        consumed = add(consumed, operation.consumption, "summing consumption")?;
    }

    let per_hectare = |value: Decimal| -> Result<Option<Decimal>, AnalyticsError> {
        area.map(|a| ratio(value, a, "computing per-hectare figure"))
            .transpose()
    };

    Ok(Productivity {
        subject,
        operations: count,
        hours_worked,
        consumed,
        efficiency: ratio(consumed, hours_worked, "computing efficiency")?,
        operations_per_hour: ratio(Decimal::from(count), hours_worked, "computing pace")?,
        operational_cost,
        cost_per_hour: ratio(operational_cost, hours_worked, "computing cost per hour")?,
        area_hectares: area,
        hours_per_hectare: per_hectare(hours_worked)?,
        consumed_per_hectare: per_hectare(consumed)?,
        cost_per_hectare: per_hectare(operational_cost)?,
    })
}

/// Productivity queries and groupings over a [`FarmBook`].
#[derive(Debug, Clone, Copy)]
pub struct ProductivityEngine<'a> {
    book: &'a FarmBook,
    fuel_price: Decimal,
}

impl<'a> ProductivityEngine<'a> {
    /// Create an engine valuing consumption at `fuel_price`.
    pub const fn new(book: &'a FarmBook, fuel_price: Decimal) -> Self {
        Self { book, fuel_price }
    }

    /// Consumption of the given operations valued at the fuel price.
    pub fn valued_consumption(
        &self,
        operations: &[&OperationRecord],
    ) -> Result<Decimal, AnalyticsError> {
        let consumed = sum(
            operations.iter().map(|op| op.consumption),
            "summing consumption",
        )?;
        mul(consumed, self.fuel_price, "valuing consumption")
    }

    /// Area of the distinct fields the operations touched.
    pub fn worked_area(&self, operations: &[&OperationRecord]) -> Result<Decimal, AnalyticsError> {
        let fields: BTreeSet<FieldId> = operations.iter().filter_map(|op| op.field_id).collect();
        sum(
            fields.into_iter().map(|f| self.book.field_area(f)),
            "summing worked area",
        )
    }

    /// Productivity of the operations matching `filter`, costed by
    /// valued consumption.
    pub fn query(
        &self,
        subject: ProductivitySubject,
        filter: &OperationFilter,
        area: Option<Decimal>,
    ) -> Result<Productivity, AnalyticsError> {
        let operations = filter.apply(self.book.operations());
        let cost = self.valued_consumption(&operations)?;
        measure(subject, operations, cost, area)
    }

    /// Farm-wide productivity: every operation, all maintenance, and the
    /// area of every worked field.
    pub fn overall(&self) -> Result<Productivity, AnalyticsError> {
        let operations: Vec<&OperationRecord> = self.book.operations().iter().collect();
        let maintenance = sum(
            self.book.maintenance().iter().map(|m| m.amount),
            "summing maintenance",
        )?;
        let cost = add(
            self.valued_consumption(&operations)?,
            maintenance,
            "summing operational cost",
        )?;
        let area = self.worked_area(&operations)?;
        measure(ProductivitySubject::All, operations, cost, Some(area))
    }

    /// One entry per season, over the area its operations worked.
    pub fn by_season(&self) -> Result<Vec<Productivity>, AnalyticsError> {
        self.book
            .seasons()
            .iter()
            .map(|season| {
                let operations = OperationFilter::new()
                    .season(season.id)
                    .apply(self.book.operations());
                let cost = self.valued_consumption(&operations)?;
                let area = self.worked_area(&operations)?;
                measure(
                    ProductivitySubject::Season(season.id),
                    operations,
                    cost,
                    Some(area),
                )
            })
            .collect()
    }

    /// One entry per field, over the field's own area.
    pub fn by_field(&self) -> Result<Vec<Productivity>, AnalyticsError> {
        self.book
            .fields()
            .iter()
            .map(|field| {
                self.query(
                    ProductivitySubject::Field(field.id),
                    &OperationFilter::new().field(field.id),
                    Some(field.area_hectares),
                )
            })
            .collect()
    }

    /// One entry per piece of equipment that operated or was maintained,
    /// costed by valued consumption plus its maintenance.
    pub fn by_equipment(&self) -> Result<Vec<Productivity>, AnalyticsError> {
        let equipment: BTreeSet<EquipmentId> = self
            .book
            .operations()
            .iter()
            .filter_map(|op| op.equipment_id)
            .chain(self.book.maintenance().iter().filter_map(|m| m.equipment_id))
            .collect();

        equipment
            .into_iter()
            .map(|id| {
                let operations = OperationFilter::new()
                    .equipment(id)
                    .apply(self.book.operations());
                let maintenance = sum(
                    self.book
                        .maintenance()
                        .iter()
                        .filter(|m| m.equipment_id == Some(id))
                        .map(|m| m.amount),
                    "summing equipment maintenance",
                )?;
                let cost = add(
                    self.valued_consumption(&operations)?,
                    maintenance,
                    "summing equipment cost",
                )?;
                measure(ProductivitySubject::Equipment(id), operations, cost, None)
            })
            .collect()
    }

    /// One entry per employee who worked an operation.
    pub fn by_employee(&self) -> Result<Vec<Productivity>, AnalyticsError> {
        let employees: BTreeSet<EmployeeId> = self
            .book
            .operations()
            .iter()
            .filter_map(|op| op.employee_id)
            .collect();

        employees
            .into_iter()
            .map(|id| {
                self.query(
                    ProductivitySubject::Employee(id),
                    &OperationFilter::new().employee(id),
                    None,
                )
            })
            .collect()
    }

    /// Every grouping, rounded for output.
    pub fn overview(&self) -> Result<ProductivityOverview, AnalyticsError> {
        let overall = self.overall()?;
        let seasons = self.by_season()?;
        let fields = self.by_field()?;
        let equipment = self.by_equipment()?;
        let employees = self.by_employee()?;

        debug!(
            operations = overall.operations,
            seasons = seasons.len(),
            fields = fields.len(),
            equipment = equipment.len(),
            employees = employees.len(),
            "productivity pass complete"
        );

        let report = |group: &[Productivity]| -> Vec<ProductivityReport> {
            group.iter().map(Productivity::report).collect()
        };
        Ok(ProductivityOverview {
            overall: overall.report(),
            seasons: report(&seasons),
            fields: report(&fields),
            equipment: report(&equipment),
            employees: report(&employees),
        })
    }
}
