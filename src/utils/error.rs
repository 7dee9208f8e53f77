use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Invalid file pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("Failed to read directory entry: {0}")]
    GlobError(#[from] glob::GlobError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Database,
    Configuration,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::IoError(_) | EtlError::GlobError(_) => ErrorCategory::Io,
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                ErrorCategory::Data
            }
            EtlError::DatabaseError(_) => ErrorCategory::Database,
            EtlError::PatternError(_)
            | EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EtlError::IoError(_) | EtlError::GlobError(_) => {
                "Check that the input folder exists and is readable".to_string()
            }
            EtlError::SerializationError(_) | EtlError::ProcessingError { .. } => {
                "Make sure the file holds a JSON array of objects".to_string()
            }
            EtlError::DatabaseError(_) => {
                "Check DB_HOST/DB_PORT/DB_NAME/DB_USER/DB_PASSWORD and that the destination table exists"
                    .to_string()
            }
            EtlError::PatternError(_) => "Use a valid glob pattern such as *.json".to_string(),
            EtlError::MissingConfigError { field } => {
                format!("Set '{}' on the command line, in .env or in the config file", field)
            }
            EtlError::InvalidConfigValueError { field, .. }
            | EtlError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}'", field)
            }
            EtlError::ConfigError { .. } => "Review the configuration file".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read input files: {}", self),
            ErrorCategory::Data => format!("Could not parse input data: {}", self),
            ErrorCategory::Database => format!("Database operation failed: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = EtlError::MissingConfigError {
            field: "db_host".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.recovery_suggestion().contains("db_host"));

        let err = EtlError::ProcessingError {
            message: "bad shape".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert!(err.user_friendly_message().contains("bad shape"));
    }

    #[test]
    fn test_database_error_category() {
        let err = EtlError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.category(), ErrorCategory::Database);
    }
}
