//! Normalized table/column model.
//!
//! Drivers consume these values read-only to render SQL text. They are filled either by the
//! introspection executor or deserialized from a table designer's JSON payload.

use crate::error::{MetadataError, MetadataResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Raw dialect type, e.g. `varchar`, `bigint unsigned`
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// `None` means no default; `Some("")` is an explicit empty string default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub key_flag: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// 1-based ordinal position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// MySQL only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Create a nullable column with no size information.
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
            ..Default::default()
        }
    }

    /// Set numeric precision and scale.
    pub fn with_precision(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Set the character/binary length.
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set nullability.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Mark the column as auto-increment.
    pub fn with_auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// Mark the column as part of the primary key.
    pub fn with_key(mut self, key_flag: bool) -> Self {
        self.key_flag = key_flag;
        self
    }

    /// Set the column comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the ordinal position.
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    /// Size suffix rendered after the type token: `(p,s)`, `(len)` or nothing.
    pub fn size_unit(&self) -> String {
        match (self.precision, self.scale) {
            (Some(precision), Some(scale)) if precision > 0 && scale > 0 => {
                format!("({},{})", precision, scale)
            }
            _ => match self.length {
                Some(length) => format!("({})", length),
                None => String::new(),
            },
        }
    }

    /// Comment text if present and non-blank.
    pub fn comment_text(&self) -> Option<&str> {
        non_blank(self.comment.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub name: String,
    /// e.g. `BASE TABLE`, `VIEW`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    /// MySQL only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Appended verbatim after the engine clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Estimated row count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Table {
    /// Create an empty table definition.
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Load a table definition from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Set the storage engine (MySQL only).
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Set the table options string.
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Set the table comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Add a column definition.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Columns flagged as primary key, in declaration order.
    pub fn key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.key_flag)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Comment text if present and non-blank.
    pub fn comment_text(&self) -> Option<&str> {
        non_blank(self.comment.as_deref())
    }

    /// Options text if present and non-blank.
    pub fn options_text(&self) -> Option<&str> {
        non_blank(self.options.as_deref())
    }

    /// Get the fully qualified table name (unquoted).
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Reject tables whose schema or name is missing.
    pub fn ensure_identified(&self) -> MetadataResult<()> {
        ensure_named("schema", &self.schema)?;
        ensure_named("table name", &self.name)
    }
}

/// A schema (database) and the tables it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
        }
    }
}

pub(crate) fn ensure_named(what: &str, value: &str) -> MetadataResult<()> {
    if value.trim().is_empty() {
        return Err(MetadataError::invalid_input(format!("{} is required", what)));
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
