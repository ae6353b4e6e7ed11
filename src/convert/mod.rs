//! Dialect type normalization.
//!
//! Each dialect maps its native column type names onto [`ColumnType`], an engine-agnostic logical
//! type, which in turn knows how to render itself as a Flink SQL type.
//!
//! Conversion is total: metadata introspection must never abort on a vendor type we do not
//! recognize, so anything unmapped (including empty input) falls back to [`ColumnType::String`].

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::MySqlTypeConvert;
pub use postgres::PostgreSqlTypeConvert;
pub use sqlite::SqliteTypeConvert;

use crate::models::Column;
use serde::{Deserialize, Serialize};

/// Normalized logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    String,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    Date,
    Time,
    Timestamp,
    Bytes,
}

impl ColumnType {
    /// Render as a Flink SQL column type.
    pub fn flink_type(&self, precision: Option<u32>, scale: Option<u32>) -> String {
        match self {
            Self::String => "STRING".to_string(),
            Self::Boolean => "BOOLEAN".to_string(),
            Self::Integer => "INT".to_string(),
            Self::Long => "BIGINT".to_string(),
            Self::Float => "FLOAT".to_string(),
            Self::Double => "DOUBLE".to_string(),
            Self::Decimal => match precision {
                Some(p) if p > 0 => format!("DECIMAL({},{})", p, scale.unwrap_or(0)),
                _ => "DECIMAL".to_string(),
            },
            Self::Date => "DATE".to_string(),
            Self::Time => "TIME".to_string(),
            Self::Timestamp => "TIMESTAMP".to_string(),
            Self::Bytes => "BYTES".to_string(),
        }
    }

    /// Whether values of this type are written without quotes.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Long | Self::Float | Self::Double | Self::Decimal
        )
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Bytes => "BYTES",
        };
        write!(f, "{}", name)
    }
}

/// Per-dialect type converter.
pub trait TypeConvert: Send + Sync {
    /// Map a raw dialect type onto a normalized type. Never fails.
    fn convert_type(
        &self,
        raw_type: &str,
        precision: Option<u32>,
        scale: Option<u32>,
        length: Option<u32>,
    ) -> ColumnType;

    /// Map a normalized type back onto this dialect's type name.
    fn convert_to_db(&self, column_type: ColumnType) -> &'static str;

    /// Normalize a model column.
    fn convert(&self, column: &Column) -> ColumnType {
        self.convert_type(
            &column.column_type,
            column.precision,
            column.scale,
            column.length,
        )
    }
}

/// Lowercase, trimmed type name with any `(...)` size suffix removed from the first token.
pub(crate) fn base_type(raw_type: &str) -> String {
    let lower = raw_type.trim().to_lowercase();
    match lower.find('(') {
        Some(open) => {
            let rest = lower[open..]
                .find(')')
                .map(|close| &lower[open + close + 1..])
                .unwrap_or("");
            format!("{}{}", &lower[..open], rest).trim().to_string()
        }
        None => lower,
    }
}
