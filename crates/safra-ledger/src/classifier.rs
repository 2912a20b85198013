//! Classification of free-text expense tags into cost categories.
//!
//! The back office records an expense's nature as a free-text tag such as
//! `"Uso de Combustível"` or `"Compra de Insumo"`. The [`CostClassifier`]
//! is the only place those tags are interpreted: every downstream component
//! asks it, so purchase/usage/maintenance rules cannot drift between
//! reports.
//!
//! Matching is case-, accent-, and whitespace-insensitive, and treats `-`
//! and `_` as spaces. Tags absent from the table are administrative
//! overhead.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use safra_types::{CostCategory, ExpenseRecord, OperationRecord};

use crate::LedgerError;
use crate::resolver::{ReferenceResolver, Unresolved};

/// Built-in tag table: Portuguese back-office tags plus English aliases.
const DEFAULT_TAGS: &[(&str, CostCategory)] = &[
    ("compra de insumo", CostCategory::InputPurchase),
    ("compra de insumos", CostCategory::InputPurchase),
    ("input purchase", CostCategory::InputPurchase),
    ("compra de combustivel", CostCategory::FuelPurchase),
    ("fuel purchase", CostCategory::FuelPurchase),
    ("uso de insumo", CostCategory::InputUsage),
    ("uso de insumos", CostCategory::InputUsage),
    ("input usage", CostCategory::InputUsage),
    ("uso de combustivel", CostCategory::FuelUsage),
    ("fuel usage", CostCategory::FuelUsage),
    ("manutencao", CostCategory::Maintenance),
    ("manutencao de equipamento", CostCategory::Maintenance),
    ("maintenance", CostCategory::Maintenance),
];

/// Normalize a tag for lookup: fold accents, lowercase, collapse
/// separators and whitespace.
pub fn normalize_tag(tag: &str) -> String {
    let folded: String = tag
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
            'ç' | 'Ç' => 'c',
            '-' | '_' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Maps expense tags onto [`CostCategory`] values.
#[derive(Debug, Clone)]
pub struct CostClassifier {
    /// Normalized tag -> category.
    tags: BTreeMap<String, CostCategory>,
}

impl Default for CostClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CostClassifier {
    /// Create a classifier with the built-in tag table.
    pub fn new() -> Self {
        let tags = DEFAULT_TAGS
            .iter()
            .map(|(tag, category)| ((*tag).to_owned(), *category))
            .collect();
        Self { tags }
    }

    /// Add or override tag mappings. Tags are normalized before insertion.
    #[must_use]
    pub fn with_tags<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (S, CostCategory)>,
        S: AsRef<str>,
    {
        for (tag, category) in extra {
            self.tags.insert(normalize_tag(tag.as_ref()), category);
        }
        self
    }

    /// Classify a raw tag. Unknown tags are administrative overhead.
    pub fn classify(&self, tag: &str) -> CostCategory {
        self.tags
            .get(&normalize_tag(tag))
            .copied()
            .unwrap_or(CostCategory::AdministrativeOther)
    }

    /// Classify an expense by its tag.
    pub fn classify_expense(&self, expense: &ExpenseRecord) -> CostCategory {
        let category = self.classify(&expense.category);
        if category == CostCategory::AdministrativeOther {
            debug!(
                expense = %expense.id,
                tag = %expense.category,
                "tag classified as administrative overhead"
            );
        }
        category
    }

    /// Sum expense amounts per category.
    ///
    /// All six categories are present in the result, zero when empty, so
    /// the map's values always add up to the sum of every expense.
    pub fn breakdown(
        &self,
        expenses: &[ExpenseRecord],
    ) -> Result<BTreeMap<CostCategory, Decimal>, LedgerError> {
        let mut totals: BTreeMap<CostCategory, Decimal> = CostCategory::ALL
            .iter()
            .map(|category| (*category, Decimal::ZERO))
            .collect();

        for expense in expenses {
            let total = totals
                .entry(self.classify_expense(expense))
                .or_insert(Decimal::ZERO);
            *total = total
                .checked_add(expense.amount)
                .ok_or(LedgerError::ArithmeticOverflow("summing category totals"))?;
        }
        Ok(totals)
    }

    /// Classify a usage expense and resolve its reference in one step.
    ///
    /// Returns `None` for expenses outside the two usage categories, so
    /// callers never re-derive which tags count as usage.
    pub fn usage_target<'o>(
        &self,
        expense: &ExpenseRecord,
        resolver: &ReferenceResolver<'o>,
    ) -> Option<(CostCategory, UsageTarget<'o>)> {
        let category = self.classify(&expense.category);
        if !category.is_usage() {
            return None;
        }
        let target = match &expense.reference {
            Some(reference) => match resolver.try_resolve(reference) {
                Ok(operation) => UsageTarget::Operation(operation),
                Err(unresolved) => UsageTarget::Unresolved(unresolved),
            },
            None => UsageTarget::Unreferenced,
        };
        Some((category, target))
    }
}

/// What a usage expense's reference pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageTarget<'o> {
    /// The reference resolved to an operation.
    Operation(&'o OperationRecord),
    /// The reference named no operation in scope.
    Unresolved(Unresolved),
    /// The expense carries no reference.
    Unreferenced,
}
