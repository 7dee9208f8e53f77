use crate::adapters::postgres::{DEFAULT_BATCH_ROWS, DEFAULT_TABLE};
use crate::config::database::DatabaseSettings;
use crate::config::{validate_common, DEFAULT_INPUT_DIR, DEFAULT_PATTERN, DEFAULT_PREVIEW_ROWS};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: String,
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_batch_rows")]
    pub batch_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub preview_rows: Option<usize>,
}

fn default_input_dir() -> String {
    DEFAULT_INPUT_DIR.to_string()
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_batch_rows() -> usize {
    DEFAULT_BATCH_ROWS
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            pattern: default_pattern(),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            batch_rows: default_batch_rows(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left as
    /// written and rejected later by validation.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_dir(&self) -> &str {
        &self.source.input_dir
    }

    fn file_pattern(&self) -> &str {
        &self.source.pattern
    }

    fn target_table(&self) -> &str {
        &self.load.table
    }

    fn batch_rows(&self) -> usize {
        self.load.batch_rows
    }

    fn preview_rows(&self) -> usize {
        self.monitoring
            .as_ref()
            .and_then(|m| m.preview_rows)
            .unwrap_or(DEFAULT_PREVIEW_ROWS)
    }

    fn monitor(&self) -> bool {
        self.monitoring_enabled()
    }

    fn database(&self) -> &DatabaseSettings {
        &self.database
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_common(self)
    }
}
