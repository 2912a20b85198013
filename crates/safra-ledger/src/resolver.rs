//! Resolution of polymorphic references to concrete operations.
//!
//! Expenses and inventory movements may point at the planting or harvest
//! operation they were incurred for. The [`ReferenceResolver`] indexes the
//! operation collection once and answers those pointers by `(kind, id)`.
//! A reference that names no known operation is reported as [`Unresolved`];
//! it is never an error and never falls back to a "close" match.

use std::collections::BTreeMap;

use safra_types::{OperationId, OperationKind, OperationRecord, Reference};

/// Why a reference could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Unresolved {
    /// The reference names an unknown table or carries a malformed id.
    Malformed,
    /// The reference is well-formed but no such operation is in scope.
    NotFound,
}

impl core::fmt::Display for Unresolved {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => f.write_str("malformed reference"),
            Self::NotFound => f.write_str("operation not found"),
        }
    }
}

/// Index of operations by `(kind, id)`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceResolver<'a> {
    operations: BTreeMap<(OperationKind, OperationId), &'a OperationRecord>,
}

impl<'a> ReferenceResolver<'a> {
    /// Index the given operations.
    ///
    /// If two operations share a `(kind, id)` key the first one wins; the
    /// [`FarmBook`](crate::FarmBook) rejects such input before it gets here.
    pub fn new(operations: &'a [OperationRecord]) -> Self {
        let mut index = BTreeMap::new();
        for operation in operations {
            index
                .entry((operation.kind, operation.id))
                .or_insert(operation);
        }
        Self { operations: index }
    }

    /// Number of indexed operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operations are indexed.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Resolve a reference, explaining any failure.
    pub fn try_resolve(&self, reference: &Reference) -> Result<&'a OperationRecord, Unresolved> {
        let key = reference.operation_key().ok_or(Unresolved::Malformed)?;
        self.operations
            .get(&key)
            .copied()
            .ok_or(Unresolved::NotFound)
    }

    /// Resolve a reference to its operation, or `None` if unresolved.
    pub fn resolve(&self, reference: &Reference) -> Option<&'a OperationRecord> {
        self.try_resolve(reference).ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use safra_types::{FieldId, SeasonId};

    use super::*;

    fn op(kind: OperationKind, id: OperationId) -> OperationRecord {
        OperationRecord {
            id,
            kind,
            season_id: Some(SeasonId::new()),
            field_id: Some(FieldId::new()),
            equipment_id: None,
            employee_id: None,
            duration_hours: Decimal::ONE,
            consumption: Decimal::ZERO,
            date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        }
    }

    #[test]
    fn resolves_matching_kind_and_id() {
        let id = OperationId::new();
        let ops = [op(OperationKind::Planting, id)];
        let resolver = ReferenceResolver::new(&ops);

        let found = resolver.resolve(&Reference::Planting(id));
        assert_eq!(found.map(|o| o.id), Some(id));
    }

    #[test]
    fn same_id_different_kind_does_not_resolve() {
        let id = OperationId::new();
        let ops = [op(OperationKind::Planting, id)];
        let resolver = ReferenceResolver::new(&ops);

        assert_eq!(
            resolver.try_resolve(&Reference::Harvest(id)).unwrap_err(),
            Unresolved::NotFound
        );
    }

    #[test]
    fn shared_id_across_tables_resolves_each_kind() {
        let id = OperationId::new();
        let ops = [op(OperationKind::Planting, id), op(OperationKind::Harvest, id)];
        let resolver = ReferenceResolver::new(&ops);

        assert_eq!(resolver.len(), 2);
        assert_eq!(
            resolver.resolve(&Reference::Harvest(id)).map(|o| o.kind),
            Some(OperationKind::Harvest)
        );
    }

    #[test]
    fn unknown_reference_is_malformed() {
        let resolver = ReferenceResolver::new(&[]);
        let reference = Reference::Unknown {
            table: "irrigation".to_owned(),
            id: "42".to_owned(),
        };
        assert_eq!(
            resolver.try_resolve(&reference).unwrap_err(),
            Unresolved::Malformed
        );
        assert!(resolver.is_empty());
    }
}
