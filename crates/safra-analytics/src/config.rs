//! Configuration loading and typed config structures for the analytics engine.
//!
//! The canonical configuration lives in `safra-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, and
//! provides a loader that reads the file. Every field has a default, so an
//! empty file (or no file at all) yields the standard behaviour.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use safra_ledger::{CostClassifier, DateWindow};
use safra_types::CostCategory;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level analytics configuration.
///
/// Mirrors the structure of `safra-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnalyticsConfig {
    /// Extra expense tag mappings.
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Fixed/variable cost split for break-even analysis.
    #[serde(default)]
    pub break_even: BreakEvenConfig,

    /// Revenue variations for the sensitivity table.
    #[serde(default)]
    pub sensitivity: SensitivityConfig,

    /// Cost allocation options.
    #[serde(default)]
    pub allocation: AllocationConfig,

    /// Weighted pricing window.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AnalyticsConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `SAFRA_LOG_LEVEL` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// The cost classifier described by `classification.tags`.
    pub fn classifier(&self) -> CostClassifier {
        CostClassifier::new().with_tags(
            self.classification
                .tags
                .iter()
                .map(|(tag, category)| (tag.as_str(), *category)),
        )
    }
}

/// Expense tag mappings merged over the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClassificationConfig {
    /// Raw tag -> category. Tags are normalized before lookup.
    #[serde(default)]
    pub tags: BTreeMap<String, CostCategory>,
}

/// Which cost categories count as fixed and which as variable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BreakEvenConfig {
    /// Categories treated as fixed costs.
    #[serde(default = "default_fixed_categories")]
    pub fixed_categories: BTreeSet<CostCategory>,

    /// Categories treated as variable costs.
    #[serde(default = "default_variable_categories")]
    pub variable_categories: BTreeSet<CostCategory>,

    /// Whether administrative overhead joins the variable costs.
    #[serde(default)]
    pub include_overhead_in_variable: bool,
}

impl BreakEvenConfig {
    /// The effective variable categories, overhead included when enabled.
    pub fn variable(&self) -> BTreeSet<CostCategory> {
        let mut variable = self.variable_categories.clone();
        if self.include_overhead_in_variable {
            variable.insert(CostCategory::AdministrativeOther);
        }
        variable
    }
}

impl Default for BreakEvenConfig {
    fn default() -> Self {
        Self {
            fixed_categories: default_fixed_categories(),
            variable_categories: default_variable_categories(),
            include_overhead_in_variable: false,
        }
    }
}

/// Sensitivity table settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SensitivityConfig {
    /// Revenue variations in percent, reported in this order.
    #[serde(default = "default_variations")]
    pub variations: Vec<Decimal>,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            variations: default_variations(),
        }
    }
}

/// Cost allocation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AllocationConfig {
    /// Spread maintenance without a season through the shared pool instead
    /// of reporting it as unassigned.
    #[serde(default)]
    pub spread_untagged_maintenance: bool,
}

/// Weighted pricing window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PricingConfig {
    /// First entry date considered.
    #[serde(default)]
    pub window_start: Option<NaiveDate>,

    /// Last entry date considered.
    #[serde(default)]
    pub window_end: Option<NaiveDate>,
}

impl PricingConfig {
    /// The configured window as a [`DateWindow`].
    pub const fn window(&self) -> DateWindow {
        DateWindow {
            start: self.window_start,
            end: self.window_end,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Override the level with `SAFRA_LOG_LEVEL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SAFRA_LOG_LEVEL") {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_fixed_categories() -> BTreeSet<CostCategory> {
    BTreeSet::from([CostCategory::Maintenance])
}

fn default_variable_categories() -> BTreeSet<CostCategory> {
    BTreeSet::from([
        CostCategory::InputPurchase,
        CostCategory::FuelPurchase,
        CostCategory::InputUsage,
        CostCategory::FuelUsage,
    ])
}

fn default_variations() -> Vec<Decimal> {
    [-20, -10, 0, 10, 20].into_iter().map(Decimal::from).collect()
}

fn default_log_level() -> String {
    "info".to_owned()
}
