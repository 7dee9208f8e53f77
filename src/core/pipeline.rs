use crate::core::aggregate::combine;
use crate::core::loader::load_tables;
use crate::core::{
    CombinedTable, ConfigProvider, ExtractResult, Pipeline, RowSink, Storage, Table,
    TransformResult,
};
use crate::domain::target_row::TargetRow;
use crate::utils::error::Result;

/// Export folder in, destination table out.
pub struct HistoryPipeline<S: Storage, K: RowSink, C: ConfigProvider> {
    storage: S,
    sink: K,
    config: C,
}

impl<S: Storage, K: RowSink, C: ConfigProvider> HistoryPipeline<S, K, C> {
    pub fn new(storage: S, sink: K, config: C) -> Self {
        Self {
            storage,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

fn log_dataset_summary(combined: &CombinedTable, preview_rows: usize) {
    tracing::info!(
        "✅ All JSON files loaded successfully! {} rows x {} columns from {} files",
        combined.len(),
        combined.columns.len(),
        combined.sources.len()
    );

    if preview_rows > 0 && !combined.is_empty() {
        tracing::info!(
            "First {} rows:\n{}",
            preview_rows.min(combined.len()),
            combined.render_preview(preview_rows)
        );
    }

    for column in combined.column_summary() {
        tracing::info!(
            "  {:<40} {:>8} non-null  {}",
            column.name,
            column.non_null,
            column.kinds.join("|")
        );
    }
}

#[async_trait::async_trait]
impl<S: Storage, K: RowSink, C: ConfigProvider> Pipeline for HistoryPipeline<S, K, C> {
    async fn extract(&self) -> Result<ExtractResult> {
        tracing::debug!(
            "Scanning {} for {}",
            self.config.input_dir(),
            self.config.file_pattern()
        );
        load_tables(&self.storage, self.config.file_pattern()).await
    }

    async fn transform(&self, tables: Vec<Table>) -> Result<Option<TransformResult>> {
        let Some(combined) = combine(tables) else {
            return Ok(None);
        };

        log_dataset_summary(&combined, self.config.preview_rows());

        let rows = combined.records.iter().map(TargetRow::from_record).collect();
        Ok(Some(TransformResult { combined, rows }))
    }

    async fn load(&self, result: TransformResult) -> Result<u64> {
        tracing::debug!(
            "Inserting {} rows into {}",
            result.rows.len(),
            self.config.target_table()
        );
        self.sink.insert_rows(&result.rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::config::database::DatabaseSettings;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct RecordingSink {
        batches: Arc<Mutex<Vec<Vec<TargetRow>>>>,
    }

    impl RowSink for RecordingSink {
        async fn insert_rows(&self, rows: &[TargetRow]) -> Result<u64> {
            self.batches.lock().unwrap().push(rows.to_vec());
            Ok(rows.len() as u64)
        }
    }

    struct MockConfig {
        input_dir: String,
        database: DatabaseSettings,
    }

    impl ConfigProvider for MockConfig {
        fn input_dir(&self) -> &str {
            &self.input_dir
        }

        fn file_pattern(&self) -> &str {
            "*.json"
        }

        fn target_table(&self) -> &str {
            "raw.spotify_events"
        }

        fn batch_rows(&self) -> usize {
            100
        }

        fn preview_rows(&self) -> usize {
            5
        }

        fn monitor(&self) -> bool {
            false
        }

        fn database(&self) -> &DatabaseSettings {
            &self.database
        }
    }

    fn pipeline(dir: &TempDir) -> (HistoryPipeline<LocalStorage, RecordingSink, MockConfig>, RecordingSink) {
        let path = dir.path().to_str().unwrap().to_string();
        let sink = RecordingSink::default();
        let config = MockConfig {
            input_dir: path.clone(),
            database: DatabaseSettings::default(),
        };
        (
            HistoryPipeline::new(LocalStorage::new(path), sink.clone(), config),
            sink,
        )
    }

    #[tokio::test]
    async fn test_extract_skips_malformed_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"[{"ts":"t1"}]"#).unwrap();
        std::fs::write(dir.path().join("b.json"), "{ not json").unwrap();
        let (pipeline, _) = pipeline(&dir);

        let extracted = pipeline.extract().await.unwrap();

        assert_eq!(extracted.files_matched, 2);
        assert_eq!(extracted.tables.len(), 1);
        assert_eq!(extracted.files_skipped.len(), 1);
        assert_eq!(extracted.files_skipped[0].path, "b.json");
    }

    #[tokio::test]
    async fn test_transform_without_tables_is_none() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(&dir);
        assert!(pipeline.transform(Vec::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transform_maps_every_row() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _) = pipeline(&dir);
        let table = crate::core::loader::parse_table(
            "a.json",
            json!([
                {"ts": "2024-01-01T00:00:00Z", "ms_played": 1},
                {"ts": "2024-01-02T00:00:00Z", "ms_played": 2}
            ])
            .to_string()
            .as_bytes(),
        )
        .unwrap();

        let result = pipeline.transform(vec![table]).await.unwrap().unwrap();

        assert_eq!(result.combined.len(), 2);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].ms_played, Some(2));
    }

    #[tokio::test]
    async fn test_load_hands_all_rows_to_sink_at_once() {
        let dir = TempDir::new().unwrap();
        let (pipeline, sink) = pipeline(&dir);
        let result = TransformResult {
            combined: CombinedTable::default(),
            rows: vec![TargetRow::default(), TargetRow::default()],
        };

        assert_eq!(pipeline.load(result).await.unwrap(), 2);
        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }
}
