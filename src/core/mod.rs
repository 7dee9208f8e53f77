pub mod aggregate;
pub mod etl;
pub mod loader;
pub mod pipeline;

pub use crate::domain::model::{CombinedTable, ExtractResult, Record, Table, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RowSink, Storage};
pub use crate::utils::error::Result;
