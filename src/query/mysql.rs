use super::{DbQuery, quote_with, render};
use crate::error::MetadataResult;

mod templates {
    pub const SCHEMA_ALL: &str = r#"
        SELECT CONVERT(SCHEMA_NAME USING utf8) AS schema_name
        FROM information_schema.SCHEMATA
        ORDER BY SCHEMA_NAME
        "#;

    pub const TABLES: &str = r#"
        SELECT
            CONVERT(TABLE_SCHEMA USING utf8) AS schema_name,
            CONVERT(TABLE_NAME USING utf8) AS table_name,
            CONVERT(TABLE_TYPE USING utf8) AS table_type,
            CONVERT(ENGINE USING utf8) AS engine,
            CONVERT(CREATE_OPTIONS USING utf8) AS options,
            CONVERT(TABLE_COLLATION USING utf8) AS collation,
            CAST(TABLE_ROWS AS SIGNED) AS row_count,
            CONVERT(TABLE_COMMENT USING utf8) AS table_comment
        FROM information_schema.TABLES
        WHERE TABLE_SCHEMA = '{schema}'
        ORDER BY TABLE_NAME
        "#;

    pub const COLUMNS: &str = r#"
        SELECT
            CONVERT(COLUMN_NAME USING utf8) AS column_name,
            CONVERT(COLUMN_TYPE USING utf8) AS column_type,
            CONVERT(DATA_TYPE USING utf8) AS data_type,
            CONVERT(IS_NULLABLE USING utf8) AS is_nullable,
            CONVERT(COLUMN_DEFAULT USING utf8) AS column_default,
            CONVERT(COLUMN_KEY USING utf8) AS column_key,
            CONVERT(EXTRA USING utf8) AS extra,
            CONVERT(COLUMN_COMMENT USING utf8) AS column_comment,
            CASE WHEN DATA_TYPE IN ('decimal', 'numeric')
                THEN CAST(NUMERIC_PRECISION AS SIGNED) END AS numeric_precision,
            CASE WHEN DATA_TYPE IN ('decimal', 'numeric')
                THEN CAST(NUMERIC_SCALE AS SIGNED) END AS numeric_scale,
            CASE WHEN DATA_TYPE IN ('char', 'varchar', 'binary', 'varbinary')
                THEN CAST(CHARACTER_MAXIMUM_LENGTH AS SIGNED) END AS char_length,
            CONVERT(CHARACTER_SET_NAME USING utf8) AS character_set,
            CONVERT(COLLATION_NAME USING utf8) AS collation,
            CAST(ORDINAL_POSITION AS SIGNED) AS position
        FROM information_schema.COLUMNS
        WHERE TABLE_SCHEMA = '{schema}' AND TABLE_NAME = '{table}'
        ORDER BY ORDINAL_POSITION
        "#;

    pub const CREATE_TABLE: &str = "SHOW CREATE TABLE `{schema}`.`{table}`";
}

/// MySQL introspection templates over `information_schema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlQuery;

impl DbQuery for MySqlQuery {
    fn schema_all_sql(&self) -> String {
        templates::SCHEMA_ALL.to_string()
    }

    fn tables_sql(&self, schema: &str) -> MetadataResult<String> {
        render(templates::TABLES, schema, None)
    }

    fn columns_sql(&self, schema: &str, table: &str) -> MetadataResult<String> {
        render(templates::COLUMNS, schema, Some(table))
    }

    fn create_table_sql(&self, schema: &str, table: &str) -> MetadataResult<Option<String>> {
        render(templates::CREATE_TABLE, schema, Some(table)).map(Some)
    }

    fn create_table_label(&self) -> &'static str {
        "Create Table"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        quote_with(identifier, '`')
    }

    fn default_schema(&self) -> &'static str {
        "mysql"
    }
}
