//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record handed to the engine carries a strongly-typed ID so a
//! season id can never be passed where a field id is expected. Identifier
//! generation belongs to the back office's data store; the `new()`
//! constructors here exist for tests and seed data.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a harvest season (safra).
    SeasonId
}

define_id! {
    /// Unique identifier for a field (talhão).
    FieldId
}

define_id! {
    /// Unique identifier for a planting or harvest operation.
    ///
    /// Planting and harvest logs live in separate tables upstream, so an
    /// operation is only uniquely addressed by `(OperationKind, OperationId)`.
    OperationId
}

define_id! {
    /// Unique identifier for a piece of equipment.
    EquipmentId
}

define_id! {
    /// Unique identifier for an employee.
    EmployeeId
}

define_id! {
    /// Unique identifier for an expense record.
    ExpenseId
}

define_id! {
    /// Unique identifier for an inventory movement.
    MovementId
}

define_id! {
    /// Unique identifier for a maintenance charge.
    MaintenanceId
}
