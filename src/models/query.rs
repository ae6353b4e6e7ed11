//! Data preview request model.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT_START: u64 = 0;
pub const DEFAULT_LIMIT_END: u64 = 50;

/// Filter, sort and page options of a preview query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOption {
    /// Appended verbatim after `where`
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    /// Appended verbatim after `order by`
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default = "default_limit_start")]
    pub limit_start: u64,
    #[serde(default = "default_limit_end")]
    pub limit_end: u64,
}

fn default_limit_start() -> u64 {
    DEFAULT_LIMIT_START
}

fn default_limit_end() -> u64 {
    DEFAULT_LIMIT_END
}

impl Default for QueryOption {
    fn default() -> Self {
        Self {
            where_clause: None,
            order: None,
            limit_start: DEFAULT_LIMIT_START,
            limit_end: DEFAULT_LIMIT_END,
        }
    }
}

impl QueryOption {
    /// WHERE text if non-empty.
    pub fn where_text(&self) -> Option<&str> {
        self.where_clause.as_deref().filter(|s| !s.is_empty())
    }

    /// ORDER BY text if non-empty.
    pub fn order_text(&self) -> Option<&str> {
        self.order.as_deref().filter(|s| !s.is_empty())
    }
}

/// Parameters of a generated preview SELECT. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    #[serde(default)]
    pub schema_name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub option: QueryOption,
}

impl QueryData {
    /// Create a preview request with the default page (0, 50).
    pub fn new(schema_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            option: QueryOption::default(),
        }
    }

    /// Set the WHERE text.
    pub fn with_where(mut self, where_clause: impl Into<String>) -> Self {
        self.option.where_clause = Some(where_clause.into());
        self
    }

    /// Set the ORDER BY text.
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.option.order = Some(order.into());
        self
    }

    /// Set the page bounds.
    pub fn with_limit(mut self, start: u64, end: u64) -> Self {
        self.option.limit_start = start;
        self.option.limit_end = end;
        self
    }
}
