//! Record selection by date range and operation attributes.

use chrono::NaiveDate;
use serde::Deserialize;

use safra_types::{EmployeeId, EquipmentId, FieldId, OperationKind, OperationRecord, SeasonId};

/// An inclusive date range; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateWindow {
    /// First day included, if bounded.
    #[serde(default)]
    pub start: Option<NaiveDate>,
    /// Last day included, if bounded.
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// A window with no bounds.
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// A window between two inclusive dates.
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

/// Selects operations by season, field, equipment, employee, kind, and date.
///
/// Every criterion left unset matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationFilter {
    season_id: Option<SeasonId>,
    field_id: Option<FieldId>,
    equipment_id: Option<EquipmentId>,
    employee_id: Option<EmployeeId>,
    kind: Option<OperationKind>,
    window: DateWindow,
}

impl OperationFilter {
    /// A filter that matches every operation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one season.
    #[must_use]
    pub const fn season(mut self, id: SeasonId) -> Self {
        self.season_id = Some(id);
        self
    }

    /// Restrict to one field.
    #[must_use]
    pub const fn field(mut self, id: FieldId) -> Self {
        self.field_id = Some(id);
        self
    }

    /// Restrict to one piece of equipment.
    #[must_use]
    pub const fn equipment(mut self, id: EquipmentId) -> Self {
        self.equipment_id = Some(id);
        self
    }

    /// Restrict to one employee.
    #[must_use]
    pub const fn employee(mut self, id: EmployeeId) -> Self {
        self.employee_id = Some(id);
        self
    }

    /// Restrict to planting or harvest operations.
    #[must_use]
    pub const fn kind(mut self, kind: OperationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restrict to a date window.
    #[must_use]
    pub const fn within(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    /// Whether an operation satisfies every criterion.
    pub fn matches(&self, operation: &OperationRecord) -> bool {
        fn wanted<T: PartialEq>(criterion: Option<T>, value: Option<T>) -> bool {
            criterion.is_none_or(|c| value == Some(c))
        }

        wanted(self.season_id, operation.season_id)
            && wanted(self.field_id, operation.field_id)
            && wanted(self.equipment_id, operation.equipment_id)
            && wanted(self.employee_id, operation.employee_id)
            && self.kind.is_none_or(|k| k == operation.kind)
            && self.window.contains(operation.date)
    }

    /// Operations satisfying the filter, in input order.
    pub fn apply<'a>(&self, operations: &'a [OperationRecord]) -> Vec<&'a OperationRecord> {
        operations.iter().filter(|op| self.matches(op)).collect()
    }
}
