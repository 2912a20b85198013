//! Input checks applied to every record before it enters a [`FarmBook`].
//!
//! Each check mirrors one malformed-input rule: numeric fields that are
//! physically non-negative must be, and relations the computation depends
//! on must be present. Optional numbers that were simply absent upstream
//! arrive here as zero and pass.
//!
//! [`FarmBook`]: crate::FarmBook

use rust_decimal::Decimal;
use uuid::Uuid;

use safra_types::{ExpenseRecord, Field, MaintenanceRecord, MovementRecord, OperationRecord, Season};

use crate::{LedgerError, RecordKind};

/// Reject a negative value for a physically non-negative field.
fn non_negative(
    record: RecordKind,
    id: Uuid,
    field: &'static str,
    value: Decimal,
) -> Result<(), LedgerError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(LedgerError::NegativeValue {
            record,
            id,
            field,
            value,
        });
    }
    Ok(())
}

/// Reject an absent relation.
fn required<T>(
    record: RecordKind,
    id: Uuid,
    field: &'static str,
    value: Option<T>,
) -> Result<T, LedgerError> {
    value.ok_or(LedgerError::MissingField { record, id, field })
}

/// Validate an expense: the amount must not be negative.
pub fn validate_expense(expense: &ExpenseRecord) -> Result<(), LedgerError> {
    non_negative(
        RecordKind::Expense,
        expense.id.into_inner(),
        "amount",
        expense.amount,
    )
}

/// Validate a movement: quantity and unit cost must not be negative.
pub fn validate_movement(movement: &MovementRecord) -> Result<(), LedgerError> {
    let id = movement.id.into_inner();
    non_negative(RecordKind::Movement, id, "quantity", movement.quantity)?;
    if let Some(unit_cost) = movement.unit_cost {
        non_negative(RecordKind::Movement, id, "unit_cost", unit_cost)?;
    }
    Ok(())
}

/// Validate a maintenance charge: equipment is required, amount must not
/// be negative.
pub fn validate_maintenance(maintenance: &MaintenanceRecord) -> Result<(), LedgerError> {
    let id = maintenance.id.into_inner();
    required(
        RecordKind::Maintenance,
        id,
        "equipment_id",
        maintenance.equipment_id,
    )?;
    non_negative(RecordKind::Maintenance, id, "amount", maintenance.amount)
}

/// Validate an operation: season and field are required, duration and
/// consumption must not be negative.
pub fn validate_operation(operation: &OperationRecord) -> Result<(), LedgerError> {
    let id = operation.id.into_inner();
    required(RecordKind::Operation, id, "season_id", operation.season_id)?;
    required(RecordKind::Operation, id, "field_id", operation.field_id)?;
    non_negative(
        RecordKind::Operation,
        id,
        "duration_hours",
        operation.duration_hours,
    )?;
    non_negative(
        RecordKind::Operation,
        id,
        "consumption",
        operation.consumption,
    )
}

/// Validate a field: area must not be negative.
pub fn validate_field(field: &Field) -> Result<(), LedgerError> {
    non_negative(
        RecordKind::Field,
        field.id.into_inner(),
        "area_hectares",
        field.area_hectares,
    )
}

/// Validate a season: harvested quantity must not be negative and a closed
/// season must not end before it starts.
pub fn validate_season(season: &Season) -> Result<(), LedgerError> {
    non_negative(
        RecordKind::Season,
        season.id.into_inner(),
        "total_harvested",
        season.total_harvested,
    )?;
    if season.end_date.is_some_and(|end| end < season.start_date) {
        return Err(LedgerError::InvertedSeasonDates { season: season.id });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use safra_types::{
        ConsumableKind, EquipmentId, FieldId, MaintenanceId, MovementDirection, MovementId,
        OperationId, OperationKind, SeasonId,
    };

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn operation() -> OperationRecord {
        OperationRecord {
            id: OperationId::new(),
            kind: OperationKind::Planting,
            season_id: Some(SeasonId::new()),
            field_id: Some(FieldId::new()),
            equipment_id: None,
            employee_id: None,
            duration_hours: dec!(4.5),
            consumption: dec!(30),
            date: day(1),
        }
    }

    #[test]
    fn valid_operation_passes() {
        assert!(validate_operation(&operation()).is_ok());
    }

    #[test]
    fn operation_without_season_is_rejected() {
        let mut op = operation();
        op.season_id = None;
        let err = validate_operation(&op).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::MissingField {
                field: "season_id",
                ..
            }
        ));
    }

    #[test]
    fn negative_consumption_is_rejected() {
        let mut op = operation();
        op.consumption = dec!(-1);
        let err = validate_operation(&op).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NegativeValue {
                field: "consumption",
                ..
            }
        ));
    }

    #[test]
    fn negative_zero_is_accepted() {
        let field = Field {
            id: FieldId::new(),
            name: String::new(),
            area_hectares: -Decimal::ZERO,
        };
        assert!(validate_field(&field).is_ok());
    }

    #[test]
    fn entry_without_unit_cost_is_accepted() {
        let movement = MovementRecord {
            id: MovementId::new(),
            consumable: ConsumableKind::Fuel,
            direction: MovementDirection::Entry,
            quantity: dec!(10),
            unit_cost: None,
            date: day(2),
            reference: None,
        };
        assert!(validate_movement(&movement).is_ok());
    }

    #[test]
    fn maintenance_requires_equipment() {
        let mut maintenance = MaintenanceRecord {
            id: MaintenanceId::new(),
            equipment_id: None,
            amount: dec!(100),
            date: day(3),
            season_id: None,
        };
        assert!(validate_maintenance(&maintenance).is_err());
        maintenance.equipment_id = Some(EquipmentId::new());
        assert!(validate_maintenance(&maintenance).is_ok());
    }

    #[test]
    fn inverted_season_dates_are_rejected() {
        let season = Season {
            id: SeasonId::new(),
            name: "Milho 2024".to_owned(),
            start_date: day(10),
            end_date: Some(day(5)),
            in_progress: false,
            total_revenue: dec!(0),
            total_harvested: dec!(0),
        };
        assert!(matches!(
            validate_season(&season),
            Err(LedgerError::InvertedSeasonDates { .. })
        ));
    }
}
