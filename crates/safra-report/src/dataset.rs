//! Dataset directory loading.
//!
//! A dataset is a directory holding one JSON array per collection:
//! `expenses.json`, `movements.json`, `maintenance.json`,
//! `operations.json`, `fields.json`, and `seasons.json`. The six files are
//! read concurrently. A missing file is an empty collection; a missing
//! directory is an error.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use safra_types::{
    ExpenseRecord, Field, MaintenanceRecord, MovementRecord, OperationRecord, RecordSet, Season,
};

use crate::error::ReportError;

/// Load every collection under `dir` into a [`RecordSet`].
pub async fn load_records(dir: &Path) -> Result<RecordSet, ReportError> {
    tokio::fs::metadata(dir)
        .await
        .map_err(|source| ReportError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

    let (expenses, movements, maintenance, operations, fields, seasons) = tokio::try_join!(
        read_collection::<ExpenseRecord>(dir, "expenses.json"),
        read_collection::<MovementRecord>(dir, "movements.json"),
        read_collection::<MaintenanceRecord>(dir, "maintenance.json"),
        read_collection::<OperationRecord>(dir, "operations.json"),
        read_collection::<Field>(dir, "fields.json"),
        read_collection::<Season>(dir, "seasons.json"),
    )?;

    info!(
        dir = %dir.display(),
        expenses = expenses.len(),
        movements = movements.len(),
        maintenance = maintenance.len(),
        operations = operations.len(),
        fields = fields.len(),
        seasons = seasons.len(),
        "Dataset loaded"
    );

    Ok(RecordSet {
        expenses,
        movements,
        maintenance,
        operations,
        fields,
        seasons,
    })
}

async fn read_collection<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
) -> Result<Vec<T>, ReportError> {
    let path = dir.join(file);
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(file, "collection file missing, treating as empty");
            return Ok(Vec::new());
        }
        Err(source) => return Err(ReportError::Read { path, source }),
    };

    serde_json::from_str(&contents).map_err(|source| ReportError::Parse { path, source })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use std::path::PathBuf;

    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;

    async fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("safra-dataset-{}", Uuid::now_v7()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        dir
    }

    #[tokio::test]
    async fn empty_directory_is_an_empty_record_set() {
        let dir = scratch_dir().await;
        let records = load_records(&dir).await.unwrap();
        assert_eq!(records, RecordSet::default());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn present_files_are_parsed() {
        let dir = scratch_dir().await;
        let season = Uuid::now_v7();
        let field = Uuid::now_v7();
        tokio::fs::write(
            dir.join("seasons.json"),
            format!(
                r#"[{{"id": "{season}", "name": "Soja 24/25", "start_date": "2024-09-01",
                     "total_revenue": "1500.50"}}]"#
            ),
        )
        .await
        .unwrap();
        tokio::fs::write(
            dir.join("fields.json"),
            format!(r#"[{{"id": "{field}", "name": "Sede", "area_hectares": 12.5}}]"#),
        )
        .await
        .unwrap();

        let records = load_records(&dir).await.unwrap();
        assert_eq!(records.seasons.len(), 1);
        assert_eq!(records.seasons[0].id.into_inner(), season);
        assert_eq!(records.seasons[0].total_revenue, Decimal::new(150_050, 2));
        assert_eq!(records.fields[0].area_hectares, Decimal::new(125, 1));
        assert!(records.expenses.is_empty());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_file_names_the_path() {
        let dir = scratch_dir().await;
        tokio::fs::write(dir.join("expenses.json"), "{not json")
            .await
            .unwrap();

        let err = load_records(&dir).await.unwrap_err();
        match err {
            ReportError::Parse { path, .. } => assert!(path.ends_with("expenses.json")),
            other => panic!("expected a parse error, got {other}"),
        }
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = std::env::temp_dir().join(format!("safra-missing-{}", Uuid::now_v7()));
        assert!(matches!(
            load_records(&dir).await,
            Err(ReportError::Read { .. })
        ));
    }
}
