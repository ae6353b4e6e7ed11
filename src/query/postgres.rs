use super::{DbQuery, quote_with, render, validate_identifier};
use crate::error::MetadataResult;

mod templates {
    pub const SCHEMA_ALL: &str = r#"
        SELECT nspname::text AS schema_name
        FROM pg_namespace
        WHERE nspname NOT LIKE 'pg\_%' AND nspname <> 'information_schema'
        ORDER BY nspname
        "#;

    pub const TABLES: &str = r#"
        SELECT
            n.nspname::text AS schema_name,
            c.relname::text AS table_name,
            CASE c.relkind WHEN 'v' THEN 'VIEW' WHEN 'm' THEN 'MATERIALIZED VIEW'
                ELSE 'BASE TABLE' END AS table_type,
            NULL::text AS engine,
            array_to_string(c.reloptions, ',') AS options,
            NULL::text AS collation,
            c.reltuples::int8 AS row_count,
            obj_description(c.oid, 'pg_class') AS table_comment
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = '{schema}'
        AND c.relkind IN ('r', 'p', 'v', 'm')
        ORDER BY c.relname
        "#;

    pub const COLUMNS: &str = r#"
        SELECT
            c.column_name::text AS column_name,
            c.udt_name::text AS column_type,
            c.data_type::text AS data_type,
            c.is_nullable::text AS is_nullable,
            c.column_default::text AS column_default,
            CASE WHEN pk.column_name IS NOT NULL THEN 'PRI' ELSE '' END AS column_key,
            CASE WHEN c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%'
                THEN 'auto_increment' ELSE '' END AS extra,
            col_description(t.oid, a.attnum) AS column_comment,
            CASE WHEN c.data_type = 'numeric' THEN c.numeric_precision::int8 END AS numeric_precision,
            CASE WHEN c.data_type = 'numeric' THEN c.numeric_scale::int8 END AS numeric_scale,
            c.character_maximum_length::int8 AS char_length,
            c.character_set_name::text AS character_set,
            c.collation_name::text AS collation,
            c.ordinal_position::int8 AS position
        FROM information_schema.columns c
        JOIN pg_namespace n ON n.nspname = c.table_schema
        JOIN pg_class t ON t.relname = c.table_name AND t.relnamespace = n.oid
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attname = c.column_name
        LEFT JOIN (
            SELECT kcu.column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            WHERE tc.table_schema = '{schema}'
            AND tc.table_name = '{table}'
            AND tc.constraint_type = 'PRIMARY KEY'
        ) pk ON c.column_name = pk.column_name
        WHERE c.table_schema = '{schema}' AND c.table_name = '{table}'
        ORDER BY c.ordinal_position
        "#;
}

/// PostgreSQL introspection templates over `pg_catalog` and `information_schema`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSqlQuery;

impl DbQuery for PostgreSqlQuery {
    fn schema_all_sql(&self) -> String {
        templates::SCHEMA_ALL.to_string()
    }

    fn tables_sql(&self, schema: &str) -> MetadataResult<String> {
        render(templates::TABLES, schema, None)
    }

    fn columns_sql(&self, schema: &str, table: &str) -> MetadataResult<String> {
        render(templates::COLUMNS, schema, Some(table))
    }

    /// PostgreSQL has no statement returning a table's DDL; callers generate it from the model.
    fn create_table_sql(&self, schema: &str, table: &str) -> MetadataResult<Option<String>> {
        validate_identifier(schema)?;
        validate_identifier(table)?;
        Ok(None)
    }

    fn create_table_label(&self) -> &'static str {
        "ddl"
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn default_schema(&self) -> &'static str {
        "public"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_sql() {
        let sql = PostgreSqlQuery.tables_sql("public").unwrap();
        assert!(sql.contains("n.nspname = 'public'"));
        assert!(sql.contains("AS table_comment"));
    }

    #[test]
    fn test_columns_sql_marks_primary_key() {
        let sql = PostgreSqlQuery.columns_sql("public", "orders").unwrap();
        assert!(sql.contains("'PRI'"));
        assert!(sql.contains("c.table_name = 'orders'"));
        assert!(!sql.contains("{table}"));
    }

    #[test]
    fn test_no_native_ddl() {
        assert_eq!(PostgreSqlQuery.create_table_sql("public", "t").unwrap(), None);
        assert!(PostgreSqlQuery.create_table_sql("public", "t;").is_err());
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(PostgreSqlQuery.quote_identifier("Order"), "\"Order\"");
        assert_eq!(PostgreSqlQuery.default_schema(), "public");
    }
}
