//! Enumeration types shared by the ledger and analytics crates.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Cost categories
// ---------------------------------------------------------------------------

/// Semantic bucket an expense falls into after classification.
///
/// The free-text category tag on an expense is mapped onto exactly one of
/// these variants. Anything unrecognized is [`AdministrativeOther`].
///
/// [`AdministrativeOther`]: CostCategory::AdministrativeOther
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    /// Purchase of agricultural inputs (seed, fertilizer, pesticide).
    InputPurchase,
    /// Purchase of fuel into inventory.
    FuelPurchase,
    /// Consumption of purchased inputs by a specific operation.
    InputUsage,
    /// Consumption of fuel by a specific operation.
    FuelUsage,
    /// Equipment maintenance.
    Maintenance,
    /// Everything else: administrative and shared overhead.
    AdministrativeOther,
}

impl CostCategory {
    /// Every category, in report order.
    pub const ALL: [Self; 6] = [
        Self::InputPurchase,
        Self::FuelPurchase,
        Self::InputUsage,
        Self::FuelUsage,
        Self::Maintenance,
        Self::AdministrativeOther,
    ];

    /// Whether this category records consumption by an operation.
    pub const fn is_usage(self) -> bool {
        matches!(self, Self::InputUsage | Self::FuelUsage)
    }

    /// Whether this category records an inventory purchase.
    pub const fn is_purchase(self) -> bool {
        matches!(self, Self::InputPurchase | Self::FuelPurchase)
    }

    /// The consumable a purchase or usage category refers to, if any.
    pub const fn consumable(self) -> Option<ConsumableKind> {
        match self {
            Self::InputPurchase | Self::InputUsage => Some(ConsumableKind::Input),
            Self::FuelPurchase | Self::FuelUsage => Some(ConsumableKind::Fuel),
            Self::Maintenance | Self::AdministrativeOther => None,
        }
    }
}

impl core::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::InputPurchase => "input-purchase",
            Self::FuelPurchase => "fuel-purchase",
            Self::InputUsage => "input-usage",
            Self::FuelUsage => "fuel-usage",
            Self::Maintenance => "maintenance",
            Self::AdministrativeOther => "administrative-other",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A consumable tracked in inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ConsumableKind {
    /// Equipment fuel (combustível), measured in liters.
    Fuel,
    /// Agricultural supply (insumo).
    Input,
}

/// Direction of an inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Stock received (purchase). Carries a unit cost.
    Entry,
    /// Stock consumed or removed.
    Exit,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// The kind of field operation a log entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// A planting operation.
    Planting,
    /// A harvest operation.
    Harvest,
}

impl OperationKind {
    /// Parse the upstream table tag used on loose references.
    ///
    /// Accepts the singular/plural English names and the Portuguese table
    /// names used by the back office (`plantio`, `colheita`).
    pub fn from_table(table: &str) -> Option<Self> {
        match table.trim().to_ascii_lowercase().as_str() {
            "planting" | "plantings" | "plantio" | "plantios" => Some(Self::Planting),
            "harvest" | "harvests" | "colheita" | "colheitas" => Some(Self::Harvest),
            _ => None,
        }
    }

    /// Canonical table tag for this kind.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Planting => "planting",
            Self::Harvest => "harvest",
        }
    }
}
