//! Introspection SQL templates.
//!
//! Every dialect aliases its result columns to the same vocabulary (see [`columns`]) so that the
//! executor in [`crate::db`] can parse rows from any engine with one decoder.
//!
//! Schema and table names are substituted into the templates as text. They are validated with
//! [`validate_identifier`] first; anything outside a conservative character set is rejected.

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::MySqlQuery;
pub use postgres::PostgreSqlQuery;
pub use sqlite::SqliteQuery;

use crate::error::{MetadataError, MetadataResult};

/// Maximum accepted identifier length.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Result column aliases shared by all templates.
pub mod columns {
    pub const SCHEMA_NAME: &str = "schema_name";
    pub const TABLE_NAME: &str = "table_name";
    pub const TABLE_TYPE: &str = "table_type";
    pub const ENGINE: &str = "engine";
    pub const OPTIONS: &str = "options";
    pub const COLLATION: &str = "collation";
    pub const ROW_COUNT: &str = "row_count";
    pub const TABLE_COMMENT: &str = "table_comment";
    pub const COLUMN_NAME: &str = "column_name";
    pub const COLUMN_TYPE: &str = "column_type";
    pub const DATA_TYPE: &str = "data_type";
    pub const IS_NULLABLE: &str = "is_nullable";
    pub const COLUMN_DEFAULT: &str = "column_default";
    /// `PRI` marks primary key columns
    pub const COLUMN_KEY: &str = "column_key";
    /// Contains `auto_increment` for generated keys
    pub const EXTRA: &str = "extra";
    pub const COLUMN_COMMENT: &str = "column_comment";
    pub const NUMERIC_PRECISION: &str = "numeric_precision";
    pub const NUMERIC_SCALE: &str = "numeric_scale";
    pub const CHAR_LENGTH: &str = "char_length";
    pub const CHARACTER_SET: &str = "character_set";
    pub const POSITION: &str = "position";
}

/// Per-dialect introspection query provider.
pub trait DbQuery: Send + Sync {
    /// List all schemas visible to the connection.
    fn schema_all_sql(&self) -> String;

    /// List the tables of one schema.
    fn tables_sql(&self, schema: &str) -> MetadataResult<String>;

    /// List the columns of one table in ordinal order.
    fn columns_sql(&self, schema: &str, table: &str) -> MetadataResult<String>;

    /// Native DDL query, if the engine can report the statement that created a table.
    fn create_table_sql(&self, schema: &str, table: &str) -> MetadataResult<Option<String>>;

    /// Result column carrying the DDL text of [`DbQuery::create_table_sql`].
    fn create_table_label(&self) -> &'static str;

    /// Quote an identifier for this dialect.
    fn quote_identifier(&self, identifier: &str) -> String;

    /// Schema assumed when the caller does not name one.
    fn default_schema(&self) -> &'static str;
}

/// Reject identifiers that cannot be safely substituted into a template.
pub fn validate_identifier(identifier: &str) -> MetadataResult<()> {
    if identifier.is_empty() {
        return Err(MetadataError::invalid_identifier(
            identifier,
            "identifier is empty",
        ));
    }
    if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(MetadataError::invalid_identifier(
            identifier,
            format!("identifier exceeds {} characters", MAX_IDENTIFIER_LENGTH),
        ));
    }
    if let Some(bad) = identifier
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '$' | '-')))
    {
        return Err(MetadataError::invalid_identifier(
            identifier,
            format!("character {:?} is not allowed", bad),
        ));
    }
    if identifier.contains("--") {
        return Err(MetadataError::invalid_identifier(
            identifier,
            "comment sequence \"--\" is not allowed",
        ));
    }
    Ok(())
}

/// Validate identifiers, then substitute `{schema}` and `{table}` placeholders.
pub(crate) fn render(
    template: &str,
    schema: &str,
    table: Option<&str>,
) -> MetadataResult<String> {
    validate_identifier(schema)?;
    let rendered = template.replace("{schema}", schema);
    match table {
        Some(table) => {
            validate_identifier(table)?;
            Ok(rendered.replace("{table}", table))
        }
        None => Ok(rendered),
    }
}

/// Wrap `identifier` in `quote`, doubling embedded quote characters.
pub(crate) fn quote_with(identifier: &str, quote: char) -> String {
    let escaped = identifier.replace(quote, &format!("{quote}{quote}"));
    format!("{quote}{escaped}{quote}")
}
