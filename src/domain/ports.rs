use crate::config::database::DatabaseSettings;
use crate::domain::model::{ExtractResult, Table, TransformResult};
use crate::domain::target_row::TargetRow;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where export files come from.
pub trait Storage: Send + Sync {
    /// Paths matching `pattern`, in the order they are to be loaded.
    fn list_files(
        &self,
        pattern: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Destination of the mapped rows.
pub trait RowSink: Send + Sync {
    /// Writes every row or none of them. Returns the number of rows written.
    fn insert_rows(
        &self,
        rows: &[TargetRow],
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn file_pattern(&self) -> &str;
    fn target_table(&self) -> &str;
    fn batch_rows(&self) -> usize;
    fn preview_rows(&self) -> usize;
    fn monitor(&self) -> bool;
    fn database(&self) -> &DatabaseSettings;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Loads every matching file; files that fail are skipped.
    async fn extract(&self) -> Result<ExtractResult>;
    /// `None` when there is nothing to combine.
    async fn transform(&self, tables: Vec<Table>) -> Result<Option<TransformResult>>;
    async fn load(&self, result: TransformResult) -> Result<u64>;
}
