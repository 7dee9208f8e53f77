pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{postgres::PostgresSink, storage::LocalStorage};
pub use config::toml_config::TomlConfig;
pub use core::{
    etl::{EtlEngine, LoadOutcome, RunReport},
    pipeline::HistoryPipeline,
};
pub use domain::target_row::TargetRow;
pub use utils::error::{EtlError, Result};
