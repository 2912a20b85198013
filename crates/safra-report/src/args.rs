//! Command-line arguments.
//!
//! Flags take precedence over environment variables, which take
//! precedence over defaults:
//!
//! - `--data <dir>` / `SAFRA_DATA_DIR` -- dataset directory (default `data`)
//! - `--config <path>` / `SAFRA_CONFIG` -- config file (default `safra-config.yaml`)
//! - `--timeout-ms <n>` / `SAFRA_TIMEOUT_MS` -- run deadline (default 30000)
//!
//! Any of `--season`, `--field`, `--equipment`, `--employee`, `--from`, or
//! `--to` switches the output from the full farm report to a single
//! productivity report over the matching operations.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser};
use uuid::Uuid;

use safra_ledger::{DateWindow, OperationFilter};
use safra_types::{EmployeeId, EquipmentId, FieldId, ProductivitySubject, SeasonId};

/// Farm cost allocation and financial analytics report
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(author, version, about, long_about = None)]
pub struct ReportArgs {
    /// Directory holding the six collection files
    #[arg(
        long = "data",
        env = "SAFRA_DATA_DIR",
        value_name = "DIR",
        default_value = "data"
    )]
    pub data_dir: PathBuf,

    /// YAML configuration file; a missing file means defaults
    #[arg(
        long = "config",
        env = "SAFRA_CONFIG",
        value_name = "PATH",
        default_value = "safra-config.yaml"
    )]
    pub config_path: PathBuf,

    /// Deadline for loading and analysis together, in milliseconds
    #[arg(long, env = "SAFRA_TIMEOUT_MS", value_name = "MS", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Productivity query replacing the full report
    #[command(flatten)]
    pub query: ProductivityQuery,
}

impl ReportArgs {
    /// The run deadline.
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The productivity query, if any of its flags were given.
    pub fn productivity_query(&self) -> Option<ProductivityQuery> {
        (self.query != ProductivityQuery::default()).then_some(self.query)
    }
}

/// Operation selection for a single productivity report.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductivityQuery {
    /// Only operations of this season
    #[arg(long, value_name = "ID", value_parser = parse_id::<SeasonId>)]
    pub season: Option<SeasonId>,

    /// Only operations on this field
    #[arg(long, value_name = "ID", value_parser = parse_id::<FieldId>)]
    pub field: Option<FieldId>,

    /// Only operations run with this equipment
    #[arg(long, value_name = "ID", value_parser = parse_id::<EquipmentId>)]
    pub equipment: Option<EquipmentId>,

    /// Only operations worked by this employee
    #[arg(long, value_name = "ID", value_parser = parse_id::<EmployeeId>)]
    pub employee: Option<EmployeeId>,

    /// First operation date included (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last operation date included (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,
}

impl ProductivityQuery {
    /// The date bounds as a window.
    pub const fn window(&self) -> DateWindow {
        DateWindow {
            start: self.from,
            end: self.to,
        }
    }

    /// The operation filter this query describes.
    pub fn filter(&self) -> OperationFilter {
        let mut filter = OperationFilter::new().within(self.window());
        if let Some(id) = self.season {
            filter = filter.season(id);
        }
        if let Some(id) = self.field {
            filter = filter.field(id);
        }
        if let Some(id) = self.equipment {
            filter = filter.equipment(id);
        }
        if let Some(id) = self.employee {
            filter = filter.employee(id);
        }
        filter
    }

    /// The narrowest subject the query names.
    pub fn subject(&self) -> ProductivitySubject {
        self.season
            .map(ProductivitySubject::Season)
            .or_else(|| self.field.map(ProductivitySubject::Field))
            .or_else(|| self.equipment.map(ProductivitySubject::Equipment))
            .or_else(|| self.employee.map(ProductivitySubject::Employee))
            .unwrap_or(ProductivitySubject::All)
    }
}

fn parse_id<T: From<Uuid>>(raw: &str) -> Result<T, uuid::Error> {
    raw.parse::<Uuid>().map(T::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_read() {
        let args = ReportArgs::try_parse_from([
            "safra-report",
            "--data",
            "/srv/farm",
            "--config",
            "farm.yaml",
            "--timeout-ms",
            "1200",
        ])
        .unwrap();
        assert_eq!(args.data_dir, PathBuf::from("/srv/farm"));
        assert_eq!(args.config_path, PathBuf::from("farm.yaml"));
        assert_eq!(args.timeout(), Duration::from_millis(1200));
        assert!(args.productivity_query().is_none());
    }

    #[test]
    fn query_flags_build_a_filter() {
        let season = SeasonId::new();
        let field = FieldId::new();
        let args = ReportArgs::try_parse_from([
            "safra-report".to_owned(),
            "--field".to_owned(),
            field.to_string(),
            "--season".to_owned(),
            season.to_string(),
            "--from".to_owned(),
            "2024-09-01".to_owned(),
        ])
        .unwrap();

        let query = args.productivity_query().unwrap();
        assert_eq!(query.season, Some(season));
        assert_eq!(query.field, Some(field));
        assert_eq!(query.window().start, NaiveDate::from_ymd_opt(2024, 9, 1));
        assert_eq!(query.window().end, None);
        assert_eq!(query.subject(), ProductivitySubject::Season(season));
        assert_eq!(
            query.filter(),
            OperationFilter::new()
                .within(query.window())
                .season(season)
                .field(field)
        );
    }

    #[test]
    fn date_only_query_covers_everything() {
        let args = ReportArgs::try_parse_from(["safra-report", "--to", "2025-03-31"]).unwrap();
        let query = args.productivity_query().unwrap();
        assert_eq!(query.subject(), ProductivitySubject::All);
        assert!(query.window().contains(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()));
    }

    #[test]
    fn bad_input_is_rejected() {
        for raw in [
            vec!["safra-report", "--data"],
            vec!["safra-report", "--timeout-ms", "soon"],
            vec!["safra-report", "--season", "42"],
            vec!["safra-report", "--from", "01/09/2024"],
            vec!["safra-report", "--verbose"],
        ] {
            assert!(ReportArgs::try_parse_from(raw).is_err());
        }
    }
}
