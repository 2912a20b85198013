//! The validated, indexed record book every analysis pass reads from.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use safra_types::{
    ExpenseRecord, Field, FieldId, MaintenanceRecord, MovementRecord, OperationRecord, RecordSet,
    Season, SeasonId,
};

use crate::resolver::ReferenceResolver;
use crate::validation::{
    validate_expense, validate_field, validate_maintenance, validate_movement,
    validate_operation, validate_season,
};
use crate::{LedgerError, RecordKind};

/// The farm's records after validation.
///
/// Built once per computation from a [`RecordSet`]. Construction either
/// accepts every record or fails with the first [`LedgerError`]; a
/// `FarmBook` therefore never holds malformed input.
#[derive(Debug, Clone)]
pub struct FarmBook {
    records: RecordSet,
    field_index: BTreeMap<FieldId, usize>,
    season_index: BTreeMap<SeasonId, usize>,
}

impl FarmBook {
    /// Validate and index a record set.
    ///
    /// Seasons are reordered by start date so that every report lists them
    /// chronologically.
    pub fn from_records(mut records: RecordSet) -> Result<Self, LedgerError> {
        records.expenses.iter().try_for_each(validate_expense)?;
        records.movements.iter().try_for_each(validate_movement)?;
        records.maintenance.iter().try_for_each(validate_maintenance)?;
        records.operations.iter().try_for_each(validate_operation)?;
        records.fields.iter().try_for_each(validate_field)?;
        records.seasons.iter().try_for_each(validate_season)?;

        unique(RecordKind::Expense, records.expenses.iter().map(|e| e.id.into_inner()))?;
        unique(RecordKind::Movement, records.movements.iter().map(|m| m.id.into_inner()))?;
        unique(
            RecordKind::Maintenance,
            records.maintenance.iter().map(|m| m.id.into_inner()),
        )?;
        unique(RecordKind::Field, records.fields.iter().map(|f| f.id.into_inner()))?;
        unique(RecordKind::Season, records.seasons.iter().map(|s| s.id.into_inner()))?;

        // Planting and harvest live in separate tables, so only (kind, id)
        // must be unique.
        let mut seen = BTreeSet::new();
        for operation in &records.operations {
            if !seen.insert((operation.kind, operation.id)) {
                return Err(LedgerError::DuplicateId {
                    record: RecordKind::Operation,
                    id: operation.id.into_inner(),
                });
            }
        }

        records.seasons.sort_by_key(|s| (s.start_date, s.id));

        let field_index: BTreeMap<FieldId, usize> = records
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id, i))
            .collect();
        let season_index = records
            .seasons
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();

        for operation in &records.operations {
            if let Some(field) = operation.field_id
                && !field_index.contains_key(&field)
            {
                return Err(LedgerError::UnknownField {
                    operation: operation.id,
                    field,
                });
            }
        }

        debug!(
            expenses = records.expenses.len(),
            movements = records.movements.len(),
            maintenance = records.maintenance.len(),
            operations = records.operations.len(),
            fields = records.fields.len(),
            seasons = records.seasons.len(),
            "farm book loaded"
        );

        Ok(Self {
            records,
            field_index,
            season_index,
        })
    }

    /// All expenses.
    pub fn expenses(&self) -> &[ExpenseRecord] {
        &self.records.expenses
    }

    /// All inventory movements.
    pub fn movements(&self) -> &[MovementRecord] {
        &self.records.movements
    }

    /// All maintenance charges.
    pub fn maintenance(&self) -> &[MaintenanceRecord] {
        &self.records.maintenance
    }

    /// All planting and harvest operations.
    pub fn operations(&self) -> &[OperationRecord] {
        &self.records.operations
    }

    /// All fields.
    pub fn fields(&self) -> &[Field] {
        &self.records.fields
    }

    /// All seasons, ordered by start date.
    pub fn seasons(&self) -> &[Season] {
        &self.records.seasons
    }

    /// Look up a field.
    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.field_index.get(&id).and_then(|&i| self.records.fields.get(i))
    }

    /// Look up a season.
    pub fn season(&self, id: SeasonId) -> Option<&Season> {
        self.season_index.get(&id).and_then(|&i| self.records.seasons.get(i))
    }

    /// Area of a field in hectares; zero for an unknown field.
    pub fn field_area(&self, id: FieldId) -> Decimal {
        self.field(id).map_or(Decimal::ZERO, |f| f.area_hectares)
    }

    /// A resolver over this book's operations.
    pub fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(&self.records.operations)
    }
}

/// Reject the first repeated id in a collection.
fn unique(record: RecordKind, ids: impl Iterator<Item = Uuid>) -> Result<(), LedgerError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(LedgerError::DuplicateId { record, id });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use safra_types::{OperationId, OperationKind, Reference};

    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn season(name: &str, start: NaiveDate) -> Season {
        Season {
            id: SeasonId::new(),
            name: name.to_owned(),
            start_date: start,
            end_date: None,
            in_progress: true,
            total_revenue: Decimal::ZERO,
            total_harvested: Decimal::ZERO,
        }
    }

    fn field(area: Decimal) -> Field {
        Field {
            id: FieldId::new(),
            name: "Talhão".to_owned(),
            area_hectares: area,
        }
    }

    fn operation(
        kind: OperationKind,
        id: OperationId,
        season: SeasonId,
        field: FieldId,
    ) -> OperationRecord {
        OperationRecord {
            id,
            kind,
            season_id: Some(season),
            field_id: Some(field),
            equipment_id: None,
            employee_id: None,
            duration_hours: dec!(3),
            consumption: dec!(12),
            date: day(9, 1),
        }
    }

    #[test]
    fn empty_record_set_is_valid() {
        let book = FarmBook::from_records(RecordSet::default()).unwrap();
        assert!(book.seasons().is_empty());
        assert!(book.resolver().is_empty());
    }

    #[test]
    fn seasons_are_ordered_by_start_date() {
        let records = RecordSet {
            seasons: vec![season("Soja", day(10, 1)), season("Milho", day(2, 1))],
            ..RecordSet::default()
        };
        let book = FarmBook::from_records(records).unwrap();
        let names: Vec<_> = book.seasons().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Milho", "Soja"]);
        let soja = book.seasons()[1].id;
        assert_eq!(book.season(soja).unwrap().name, "Soja");
    }

    #[test]
    fn field_lookup_and_area() {
        let north = field(dec!(60));
        let id = north.id;
        let records = RecordSet {
            fields: vec![north],
            ..RecordSet::default()
        };
        let book = FarmBook::from_records(records).unwrap();
        assert_eq!(book.field_area(id), dec!(60));
        assert_eq!(book.field_area(FieldId::new()), Decimal::ZERO);
    }

    #[test]
    fn duplicate_field_id_is_rejected() {
        let a = field(dec!(1));
        let mut b = field(dec!(2));
        b.id = a.id;
        let records = RecordSet {
            fields: vec![a, b],
            ..RecordSet::default()
        };
        assert!(matches!(
            FarmBook::from_records(records),
            Err(LedgerError::DuplicateId {
                record: RecordKind::Field,
                ..
            })
        ));
    }

    #[test]
    fn operations_may_share_an_id_across_kinds() {
        let s = season("Soja", day(1, 1));
        let f = field(dec!(10));
        let id = OperationId::new();
        let records = RecordSet {
            operations: vec![
                operation(OperationKind::Planting, id, s.id, f.id),
                operation(OperationKind::Harvest, id, s.id, f.id),
            ],
            fields: vec![f],
            seasons: vec![s],
            ..RecordSet::default()
        };
        let book = FarmBook::from_records(records).unwrap();
        assert!(book.resolver().resolve(&Reference::Harvest(id)).is_some());

        let mut twice = book.operations().to_vec();
        twice.push(twice[0].clone());
        let records = RecordSet {
            operations: twice,
            fields: book.fields().to_vec(),
            ..RecordSet::default()
        };
        assert!(matches!(
            FarmBook::from_records(records),
            Err(LedgerError::DuplicateId {
                record: RecordKind::Operation,
                ..
            })
        ));
    }

    #[test]
    fn operation_on_unknown_field_is_rejected() {
        let s = season("Soja", day(1, 1));
        let records = RecordSet {
            operations: vec![operation(
                OperationKind::Planting,
                OperationId::new(),
                s.id,
                FieldId::new(),
            )],
            seasons: vec![s],
            ..RecordSet::default()
        };
        assert!(matches!(
            FarmBook::from_records(records),
            Err(LedgerError::UnknownField { .. })
        ));
    }

    #[test]
    fn negative_expense_fails_the_whole_book() {
        let records = RecordSet {
            expenses: vec![ExpenseRecord {
                id: safra_types::ExpenseId::new(),
                category: "Manutenção".to_owned(),
                amount: dec!(-10),
                date: day(1, 1),
                reference: None,
                season_id: None,
            }],
            ..RecordSet::default()
        };
        assert!(matches!(
            FarmBook::from_records(records),
            Err(LedgerError::NegativeValue { .. })
        ));
    }
}
