//! Providers of raw lookup-table rows for the catalog builder.

use crate::catalog::RawEntityRecord;
use crate::catalog::naming::{NAMESPACE_MARKER, strip_prefix_ignore_case};
use crate::common::SourceError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Something that can list the emulator's raw entity rows.
///
/// Implementations must return only rows that belong to the emulated
/// namespace and must read fresh data on every call; the catalog is never
/// cached between requests.
///
/// # Examples
///
/// ```no_run
/// use server::catalog::RawEntityRecord;
/// use server::common::SourceError;
/// use server::source::EntityRecordSource;
/// use async_trait::async_trait;
///
/// struct Empty;
///
/// #[async_trait]
/// impl EntityRecordSource for Empty {
///     async fn fetch_records(&self) -> Result<Vec<RawEntityRecord>, SourceError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait EntityRecordSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<RawEntityRecord>, SourceError>;
}

/// Whether a raw name belongs to the emulated namespace.
pub fn is_namespace_record(record: &RawEntityRecord) -> bool {
    strip_prefix_ignore_case(record.raw_name.trim_start(), NAMESPACE_MARKER).is_some()
}

/// Reads rows from a JSON export of the lookup table.
///
/// The file holds an array of rows using either snake_case field names or
/// the table's column names (`EntityId`, `EntityName`, `EntityType`,
/// `MessageCount`, `EntityGroupId`).
#[derive(Debug, Clone)]
pub struct SnapshotFileSource {
    path: PathBuf,
}

impl SnapshotFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, contents: &str) -> Result<Vec<RawEntityRecord>, SourceError> {
        let records: Vec<RawEntityRecord> =
            serde_json::from_str(contents).map_err(|e| SourceError::InvalidFormat {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })?;

        let total = records.len();
        let records: Vec<RawEntityRecord> =
            records.into_iter().filter(is_namespace_record).collect();
        log::debug!(
            "Read {} namespace rows out of {} from {}",
            records.len(),
            total,
            self.path.display()
        );
        Ok(records)
    }
}

#[async_trait]
impl EntityRecordSource for SnapshotFileSource {
    async fn fetch_records(&self) -> Result<Vec<RawEntityRecord>, SourceError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::io(self.path.display().to_string(), &e))?;
        self.parse(&contents)
    }
}

/// Fixed in-memory rows.
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    records: Vec<RawEntityRecord>,
}

impl StaticRecordSource {
    pub fn new(records: Vec<RawEntityRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl EntityRecordSource for StaticRecordSource {
    async fn fetch_records(&self) -> Result<Vec<RawEntityRecord>, SourceError> {
        Ok(self
            .records
            .iter()
            .filter(|record| is_namespace_record(record))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_snapshot_source_reads_column_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"EntityId": 1, "EntityName": "SBEMULATORNS:QUEUE:orders", "EntityType": 0, "MessageCount": 5}},
                {{"EntityId": 2, "EntityName": "SBEMULATORNS:QUEUE:orders|$TRANSFER", "EntityType": 0, "MessageCount": 2, "EntityGroupId": "g1"}},
                {{"EntityId": 3, "EntityName": "OTHERNS:QUEUE:foreign", "EntityType": 0, "MessageCount": 9}}
            ]"#
        )
        .unwrap();

        let records = SnapshotFileSource::new(file.path()).fetch_records().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].raw_name, "SBEMULATORNS:QUEUE:orders");
        assert_eq!(records[1].group_id.as_deref(), Some("g1"));
        assert_eq!(records[1].message_count, 2);
    }

    #[tokio::test]
    async fn test_snapshot_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = SnapshotFileSource::new(dir.path().join("missing.json"));

        let error = source.fetch_records().await.unwrap_err();
        assert!(matches!(error, SourceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_source_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"rows": []}}"#).unwrap();

        let error = SnapshotFileSource::new(file.path())
            .fetch_records()
            .await
            .unwrap_err();
        assert!(matches!(error, SourceError::InvalidFormat { .. }));
    }

    #[tokio::test]
    async fn test_static_source_filters_namespace() {
        let source = StaticRecordSource::new(vec![
            RawEntityRecord::new(1, "sbemulatorns:queue:orders", 0, 1),
            RawEntityRecord::new(2, "orders", 0, 1),
        ]);

        let records = source.fetch_records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }
}
