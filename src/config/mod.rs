pub mod database;
pub mod toml_config;

use crate::adapters::postgres::{DEFAULT_BATCH_ROWS, DEFAULT_TABLE, MAX_BATCH_ROWS};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_glob_pattern, validate_path, validate_range, validate_table_name,
};
use database::DatabaseSettings;

pub const DEFAULT_INPUT_DIR: &str = "Spotify Extended Streaming History/";
pub const DEFAULT_PATTERN: &str = "*.json";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Settings shared by every front-end.
pub(crate) fn validate_common<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_path("input_dir", config.input_dir())?;
    validate_glob_pattern("pattern", config.file_pattern())?;
    validate_table_name("table", config.target_table())?;
    validate_range("batch_rows", config.batch_rows(), 1, MAX_BATCH_ROWS)?;
    config.database().resolve()?;
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "spotify-history-etl")]
#[command(about = "Load a Spotify extended streaming history export into PostgreSQL")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_INPUT_DIR, help = "Folder holding the export files")]
    pub input_dir: String,

    #[arg(long, default_value = DEFAULT_PATTERN, help = "Glob pattern for export files")]
    pub pattern: String,

    #[arg(long, default_value = DEFAULT_TABLE, help = "Destination table")]
    pub table: String,

    #[arg(long, default_value_t = DEFAULT_BATCH_ROWS, help = "Rows per INSERT statement")]
    pub batch_rows: usize,

    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS, help = "Rows shown in the dataset preview")]
    pub preview_rows: usize,

    #[arg(short, long, help = "Read settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[command(flatten)]
    pub database: DatabaseSettings,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn file_pattern(&self) -> &str {
        &self.pattern
    }

    fn target_table(&self) -> &str {
        &self.table
    }

    fn batch_rows(&self) -> usize {
        self.batch_rows
    }

    fn preview_rows(&self) -> usize {
        self.preview_rows
    }

    fn monitor(&self) -> bool {
        self.monitor
    }

    fn database(&self) -> &DatabaseSettings {
        &self.database
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_common(self)
    }
}
