//! Supported dialects.

use crate::error::{MetadataError, MetadataResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Dialect tag used for driver lookup and UI labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum DriverType {
    /// Includes MariaDB
    #[value(name = "mysql", alias = "mariadb")]
    MySql,
    #[value(name = "postgresql", aliases = ["postgres", "pg"])]
    PostgreSql,
    #[value(name = "sqlite")]
    Sqlite,
}

impl DriverType {
    /// All supported dialects, in registration order.
    pub const ALL: [DriverType; 3] = [Self::MySql, Self::PostgreSql, Self::Sqlite];

    /// Stable value string for this dialect.
    pub fn value(&self) -> &'static str {
        match self {
            Self::MySql => "MySql",
            Self::PostgreSql => "PostgreSql",
            Self::Sqlite => "Sqlite",
        }
    }

    /// Parse dialect from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::PostgreSql)
        } else if lower.starts_with("mysql://") || lower.starts_with("mariadb://") {
            Some(Self::MySql)
        } else if lower.starts_with("sqlite://") || lower.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }

    /// Default port for this dialect.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::PostgreSql => Some(5432),
            Self::MySql => Some(3306),
            Self::Sqlite => None,
        }
    }
}

impl FromStr for DriverType {
    type Err = MetadataError;

    fn from_str(s: &str) -> MetadataResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgresql" | "postgres" | "pg" => Ok(Self::PostgreSql),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(MetadataError::unsupported_dialect(s)),
        }
    }
}

impl std::fmt::Display for DriverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}
