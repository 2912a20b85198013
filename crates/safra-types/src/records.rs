//! Input records handed to the engine by the back office's data layer.
//!
//! These mirror the rows of the expense, inventory movement, maintenance,
//! planting/harvest, field, and season tables. They are immutable once read:
//! the engine never mutates or persists them.
//!
//! Numeric fields the upstream store may leave empty deserialize to zero.
//! Relations the store allows to be NULL are `Option` here and checked for
//! presence by the ledger when they are required.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{ConsumableKind, MovementDirection, OperationKind};
use crate::ids::{
    EmployeeId, EquipmentId, ExpenseId, FieldId, MaintenanceId, MovementId, OperationId,
    SeasonId,
};

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

/// A pointer from an expense or movement to the operation it belongs to.
///
/// Upstream this is a loose `(reference_table, reference_id)` string pair.
/// It is parsed once, at deserialization, into this sum type; anything that
/// does not name a known operation table with a valid UUID becomes
/// [`Reference::Unknown`] and can never resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawReference", into = "RawReference")]
pub enum Reference {
    /// Points at a planting operation.
    Planting(OperationId),
    /// Points at a harvest operation.
    Harvest(OperationId),
    /// Unrecognized table or malformed id, kept verbatim for diagnostics.
    Unknown {
        /// The table tag as received.
        table: String,
        /// The id as received.
        id: String,
    },
}

impl Reference {
    /// Build a reference to an operation of the given kind.
    pub const fn to_operation(kind: OperationKind, id: OperationId) -> Self {
        match kind {
            OperationKind::Planting => Self::Planting(id),
            OperationKind::Harvest => Self::Harvest(id),
        }
    }

    /// The `(kind, id)` key this reference addresses, if it is well-formed.
    pub const fn operation_key(&self) -> Option<(OperationKind, OperationId)> {
        match self {
            Self::Planting(id) => Some((OperationKind::Planting, *id)),
            Self::Harvest(id) => Some((OperationKind::Harvest, *id)),
            Self::Unknown { .. } => None,
        }
    }
}

impl core::fmt::Display for Reference {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Planting(id) => write!(f, "planting:{id}"),
            Self::Harvest(id) => write!(f, "harvest:{id}"),
            Self::Unknown { table, id } => write!(f, "{table}:{id}"),
        }
    }
}

/// Wire form of a [`Reference`]: the loose table/id pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReference {
    /// Name of the referenced table.
    pub table: String,
    /// Identifier of the referenced row, as text.
    pub id: String,
}

impl From<RawReference> for Reference {
    fn from(raw: RawReference) -> Self {
        let kind = OperationKind::from_table(&raw.table);
        let id = Uuid::parse_str(raw.id.trim()).ok().map(OperationId);
        match (kind, id) {
            (Some(kind), Some(id)) => Self::to_operation(kind, id),
            _ => Self::Unknown {
                table: raw.table,
                id: raw.id,
            },
        }
    }
}

impl From<Reference> for RawReference {
    fn from(reference: Reference) -> Self {
        match reference {
            Reference::Planting(id) => Self {
                table: OperationKind::Planting.table().to_owned(),
                id: id.to_string(),
            },
            Reference::Harvest(id) => Self {
                table: OperationKind::Harvest.table().to_owned(),
                id: id.to_string(),
            },
            Reference::Unknown { table, id } => Self { table, id },
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger records
// ---------------------------------------------------------------------------

/// A general expense row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique expense identifier.
    pub id: ExpenseId,
    /// Free-text category tag (e.g. `"Uso de Combustível"`).
    #[serde(default)]
    pub category: String,
    /// Amount in currency.
    #[serde(default)]
    pub amount: Decimal,
    /// Date the expense was booked.
    pub date: NaiveDate,
    /// Operation this expense belongs to, if any.
    #[serde(default)]
    pub reference: Option<Reference>,
    /// Season the expense was booked against directly, if any.
    #[serde(default)]
    pub season_id: Option<SeasonId>,
}

/// An inventory movement row (fuel or input, entry or exit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    /// Unique movement identifier.
    pub id: MovementId,
    /// Which consumable moved.
    pub consumable: ConsumableKind,
    /// Entry (stock in) or exit (stock out).
    pub direction: MovementDirection,
    /// Physical quantity moved.
    #[serde(default)]
    pub quantity: Decimal,
    /// Unit cost, present on entries.
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    /// Date of the movement.
    pub date: NaiveDate,
    /// Operation this movement belongs to, if any.
    #[serde(default)]
    pub reference: Option<Reference>,
}

/// An equipment maintenance charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    /// Unique maintenance identifier.
    pub id: MaintenanceId,
    /// Equipment serviced. Required.
    #[serde(default)]
    pub equipment_id: Option<EquipmentId>,
    /// Amount charged.
    #[serde(default)]
    pub amount: Decimal,
    /// Date of the service.
    pub date: NaiveDate,
    /// Season the charge was booked against, if any.
    #[serde(default)]
    pub season_id: Option<SeasonId>,
}

/// A planting or harvest operation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Identifier, unique within its [`OperationKind`].
    pub id: OperationId,
    /// Planting or harvest.
    pub kind: OperationKind,
    /// Owning season. Required.
    #[serde(default)]
    pub season_id: Option<SeasonId>,
    /// Field worked. Required.
    #[serde(default)]
    pub field_id: Option<FieldId>,
    /// Equipment used, if any.
    #[serde(default)]
    pub equipment_id: Option<EquipmentId>,
    /// Operator, if recorded.
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    /// Hours the operation took.
    #[serde(default)]
    pub duration_hours: Decimal,
    /// Fuel consumed, in liters.
    #[serde(default)]
    pub consumption: Decimal,
    /// Date performed.
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A land parcel (talhão).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Unique field identifier.
    pub id: FieldId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Area in hectares. Must be non-negative.
    #[serde(default)]
    pub area_hectares: Decimal,
}

/// A harvest season (safra).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    /// Unique season identifier.
    pub id: SeasonId,
    /// Display name (e.g. `"Soja 2024/25"`).
    #[serde(default)]
    pub name: String,
    /// First day of the season.
    pub start_date: NaiveDate,
    /// Last day of the season, if closed.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Whether the season is still running.
    #[serde(default)]
    pub in_progress: bool,
    /// Revenue booked for the season.
    #[serde(default)]
    pub total_revenue: Decimal,
    /// Quantity harvested.
    #[serde(default)]
    pub total_harvested: Decimal,
}

// ---------------------------------------------------------------------------
// RecordSet
// ---------------------------------------------------------------------------

/// The six record collections for one computation pass.
///
/// Collections are supplied already fetched (and optionally pre-filtered)
/// by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    /// General expenses.
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    /// Inventory movements.
    #[serde(default)]
    pub movements: Vec<MovementRecord>,
    /// Maintenance charges.
    #[serde(default)]
    pub maintenance: Vec<MaintenanceRecord>,
    /// Planting and harvest operations.
    #[serde(default)]
    pub operations: Vec<OperationRecord>,
    /// Fields.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Seasons.
    #[serde(default)]
    pub seasons: Vec<Season>,
}
