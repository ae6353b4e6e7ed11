use super::{DbQuery, quote_with, render};
use crate::error::MetadataResult;

mod templates {
    pub const SCHEMA_ALL: &str = "SELECT name AS schema_name FROM pragma_database_list ORDER BY seq";

    pub const TABLES: &str = r#"
        SELECT
            '{schema}' AS schema_name,
            name AS table_name,
            CASE type WHEN 'view' THEN 'VIEW' ELSE 'BASE TABLE' END AS table_type,
            NULL AS engine,
            NULL AS options,
            NULL AS collation,
            NULL AS row_count,
            NULL AS table_comment
        FROM "{schema}".sqlite_master
        WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
        ORDER BY name
        "#;

    pub const COLUMNS: &str = r#"
        SELECT
            name AS column_name,
            type AS column_type,
            type AS data_type,
            CASE WHEN "notnull" = 0 THEN 'YES' ELSE 'NO' END AS is_nullable,
            dflt_value AS column_default,
            CASE WHEN pk > 0 THEN 'PRI' ELSE '' END AS column_key,
            '' AS extra,
            NULL AS column_comment,
            NULL AS numeric_precision,
            NULL AS numeric_scale,
            NULL AS char_length,
            NULL AS character_set,
            NULL AS collation,
            cid + 1 AS position
        FROM pragma_table_info('{table}', '{schema}')
        ORDER BY cid
        "#;

    pub const CREATE_TABLE: &str = r#"
        SELECT sql AS ddl
        FROM "{schema}".sqlite_master
        WHERE type = 'table' AND name = '{table}'
        "#;
}

/// SQLite introspection templates over `sqlite_master` and table-valued pragmas.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteQuery;

impl DbQuery for SqliteQuery {
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
        "ddl"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn default_schema(&self) -> &'static str {
        "main"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_sql_uses_table_info_pragma() {
        let sql = SqliteQuery.columns_sql("main", "users").unwrap();
        assert!(sql.contains("pragma_table_info('users', 'main')"));
    }

    #[test]
    fn test_create_table_sql_reads_sqlite_master() {
        let sql = SqliteQuery.create_table_sql("main", "users").unwrap().unwrap();
        assert!(sql.contains("\"main\".sqlite_master"));
        assert!(sql.contains("name = 'users'"));
        assert_eq!(SqliteQuery.create_table_label(), "ddl");
    }

    #[test]
    fn test_default_schema() {
        assert_eq!(SqliteQuery.default_schema(), "main");
    }
}
