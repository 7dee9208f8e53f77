use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_required_field, validate_resolved, Validate,
};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::fmt;

/// Connection settings as they arrive from flags, the environment or a config
/// file. Every field is required; [`DatabaseSettings::resolve`] checks that.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct DatabaseSettings {
    #[cfg_attr(feature = "cli", arg(long = "db-host", env = "DB_HOST"))]
    pub host: Option<String>,

    // Text, so a config file can say `port = "${DB_PORT}"`.
    #[cfg_attr(feature = "cli", arg(long = "db-port", env = "DB_PORT"))]
    pub port: Option<String>,

    #[cfg_attr(feature = "cli", arg(long = "db-name", env = "DB_NAME"))]
    pub database: Option<String>,

    #[cfg_attr(feature = "cli", arg(long = "db-user", env = "DB_USER"))]
    pub user: Option<String>,

    #[serde(skip_serializing)]
    #[cfg_attr(
        feature = "cli",
        arg(long = "db-password", env = "DB_PASSWORD", hide_env_values = true)
    )]
    pub password: Option<String>,
}

impl DatabaseSettings {
    pub fn resolve(&self) -> Result<DatabaseConfig> {
        let host = validate_required_field("db_host", &self.host)?;
        let port = validate_required_field("db_port", &self.port)?;
        let database = validate_required_field("db_name", &self.database)?;
        let user = validate_required_field("db_user", &self.user)?;
        let password = validate_required_field("db_password", &self.password)?;

        validate_resolved("db_port", port)?;
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| EtlError::InvalidConfigValueError {
                field: "db_port".to_string(),
                value: port.clone(),
                reason: e.to_string(),
            })?;

        let config = DatabaseConfig {
            host: host.clone(),
            port,
            database: database.clone(),
            user: user.clone(),
            password: password.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"********")
            .finish()
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("db_host", &self.host)?;
        validate_non_empty_string("db_name", &self.database)?;
        validate_non_empty_string("db_user", &self.user)?;
        for (field, value) in [
            ("db_host", &self.host),
            ("db_name", &self.database),
            ("db_user", &self.user),
            ("db_password", &self.password),
        ] {
            validate_resolved(field, value)?;
        }
        if self.port == 0 {
            return Err(EtlError::InvalidConfigValueError {
                field: "db_port".to_string(),
                value: "0".to_string(),
                reason: "Port must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
