//! Schema introspection through a driver's query templates.

use crate::db::pool::DbPool;
use crate::db::types::{JsonRow, value_text};
use crate::driver::Driver;
use crate::error::{MetadataError, MetadataResult};
use crate::models::{Column, QueryData, Schema, Table};
use crate::query::columns;
use std::sync::Arc;
use tracing::debug;

/// Runs introspection templates against a live database and parses the rows into the model.
#[derive(Clone)]
pub struct MetadataInspector {
    pool: DbPool,
    driver: Arc<dyn Driver>,
}

impl std::fmt::Debug for MetadataInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataInspector")
            .field("pool", &self.pool)
            .field("driver", &self.driver.name())
            .finish()
    }
}

impl MetadataInspector {
    /// Pair a pool with the driver of the same dialect.
    pub fn new(pool: DbPool, driver: Arc<dyn Driver>) -> MetadataResult<Self> {
        if pool.driver_type() != driver.driver_type() {
            return Err(MetadataError::invalid_input(format!(
                "Driver {} cannot inspect a {} connection",
                driver.driver_type(),
                pool.driver_type()
            )));
        }
        Ok(Self { pool, driver })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub async fn list_schemas(&self) -> MetadataResult<Vec<Schema>> {
        let sql = self.driver.db_query().schema_all_sql();
        let rows = self.pool.fetch_rows(&sql).await?;
        Ok(rows
            .iter()
            .filter_map(|row| text(row, columns::SCHEMA_NAME))
            .map(Schema::new)
            .collect())
    }

    /// Tables of `schema`, without their columns.
    pub async fn list_tables(&self, schema: &str) -> MetadataResult<Vec<Table>> {
        let sql = self.driver.db_query().tables_sql(schema)?;
        let rows = self.pool.fetch_rows(&sql).await?;
        debug!(schema = %schema, count = rows.len(), "Listed tables");
        Ok(rows.iter().map(|row| parse_table(row, schema)).collect())
    }

    /// Columns of `schema`.`table` in ordinal order.
    pub async fn list_columns(&self, schema: &str, table: &str) -> MetadataResult<Vec<Column>> {
        let sql = self.driver.db_query().columns_sql(schema, table)?;
        let rows = self.pool.fetch_rows(&sql).await?;
        debug!(schema = %schema, table = %table, count = rows.len(), "Listed columns");
        Ok(rows.iter().map(parse_column).collect())
    }

    /// Full table model, columns included.
    pub async fn get_table(&self, schema: &str, table: &str) -> MetadataResult<Table> {
        let mut found = self
            .list_tables(schema)
            .await?
            .into_iter()
            .find(|t| t.name == table)
            .ok_or_else(|| {
                MetadataError::schema(
                    format!("Table not found in schema {}", schema),
                    table.to_string(),
                )
            })?;
        found.columns = self.list_columns(schema, table).await?;
        Ok(found)
    }

    /// DDL reported by the database, or generated from the introspected model when the
    /// dialect has no native statement.
    pub async fn show_create_table(&self, schema: &str, table: &str) -> MetadataResult<String> {
        let query = self.driver.db_query();
        match query.create_table_sql(schema, table)? {
            Some(sql) => {
                let rows = self.pool.fetch_rows(&sql).await?;
                rows.first()
                    .and_then(|row| text(row, query.create_table_label()))
                    .ok_or_else(|| {
                        MetadataError::schema(
                            format!("No DDL reported for table in schema {}", schema),
                            table.to_string(),
                        )
                    })
            }
            None => {
                let model = self.get_table(schema, table).await?;
                self.driver.generate_create_table_sql(&model)
            }
        }
    }

    /// Rows of the driver's preview query.
    pub async fn preview(&self, query_data: &QueryData) -> MetadataResult<Vec<JsonRow>> {
        let sql = self.driver.query_option(query_data)?;
        self.pool.fetch_rows(&sql).await
    }

    /// Run generated SQL such as a `CREATE TABLE` statement.
    pub async fn execute(&self, sql: &str) -> MetadataResult<u64> {
        self.pool.execute(sql).await
    }
}

fn text(row: &JsonRow, key: &str) -> Option<String> {
    value_text(row.get(key))
}

fn non_empty(row: &JsonRow, key: &str) -> Option<String> {
    text(row, key).filter(|s| !s.trim().is_empty())
}

fn number(row: &JsonRow, key: &str) -> Option<u64> {
    text(row, key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn small_number(row: &JsonRow, key: &str) -> Option<u32> {
    number(row, key).and_then(|n| u32::try_from(n).ok())
}

fn parse_table(row: &JsonRow, schema: &str) -> Table {
    Table {
        schema: text(row, columns::SCHEMA_NAME).unwrap_or_else(|| schema.to_string()),
        name: text(row, columns::TABLE_NAME).unwrap_or_default(),
        table_type: non_empty(row, columns::TABLE_TYPE),
        engine: non_empty(row, columns::ENGINE),
        options: non_empty(row, columns::OPTIONS),
        comment: non_empty(row, columns::TABLE_COMMENT),
        collation: non_empty(row, columns::COLLATION),
        rows: number(row, columns::ROW_COUNT),
        columns: Vec::new(),
    }
}

fn parse_column(row: &JsonRow) -> Column {
    let raw_type = text(row, columns::COLUMN_TYPE).unwrap_or_default();
    let (column_type, size) = split_type(&raw_type);

    let mut precision = small_number(row, columns::NUMERIC_PRECISION);
    let mut scale = small_number(row, columns::NUMERIC_SCALE);
    let mut length = small_number(row, columns::CHAR_LENGTH);
    match size {
        TypeSize::PrecisionScale(p, s) if precision.is_none() => {
            precision = Some(p);
            scale = Some(s);
        }
        TypeSize::Length(l) if length.is_none() && precision.is_none() => length = Some(l),
        _ => {}
    }

    Column {
        name: text(row, columns::COLUMN_NAME).unwrap_or_default(),
        column_type,
        precision,
        scale,
        length,
        nullable: text(row, columns::IS_NULLABLE)
            .map(|v| v.eq_ignore_ascii_case("YES"))
            .unwrap_or(true),
        default_value: text(row, columns::COLUMN_DEFAULT).map(|d| unquote_default(&d)),
        auto_increment: text(row, columns::EXTRA)
            .map(|e| e.to_ascii_lowercase().contains("auto_increment"))
            .unwrap_or(false),
        key_flag: text(row, columns::COLUMN_KEY)
            .map(|k| k.eq_ignore_ascii_case("PRI"))
            .unwrap_or(false),
        comment: non_empty(row, columns::COLUMN_COMMENT),
        position: small_number(row, columns::POSITION),
        character_set: non_empty(row, columns::CHARACTER_SET),
        collation: non_empty(row, columns::COLLATION),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeSize {
    None,
    Length(u32),
    PrecisionScale(u32, u32),
}

/// Split `VARCHAR(64)` into `VARCHAR` and its bracketed size.
fn split_type(raw: &str) -> (String, TypeSize) {
    let raw = raw.trim();
    let (Some(open), Some(close)) = (raw.find('('), raw.find(')')) else {
        return (raw.to_string(), TypeSize::None);
    };
    if close < open {
        return (raw.to_string(), TypeSize::None);
    }

    let args: Vec<&str> = raw[open + 1..close].split(',').map(str::trim).collect();
    let size = match args.as_slice() {
        [len] => len.parse().map(TypeSize::Length).unwrap_or(TypeSize::None),
        [p, s] => match (p.parse(), s.parse()) {
            (Ok(p), Ok(s)) => TypeSize::PrecisionScale(p, s),
            _ => TypeSize::None,
        },
        _ => TypeSize::None,
    };
    if size == TypeSize::None {
        // Non-numeric arguments such as enum('a','b') stay part of the type
        return (raw.to_string(), size);
    }

    let base = format!("{} {}", raw[..open].trim(), raw[close + 1..].trim());
    (base.trim().to_string(), size)
}

/// `'abc'` becomes `abc` with doubled quotes collapsed; anything else is kept as reported.
fn unquote_default(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        let inner = &trimmed[1..trimmed.len() - 1];
        if !inner.replace("''", "").contains('\'') {
            return inner.replace("''", "'");
        }
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> JsonRow {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_split_type() {
        assert_eq!(split_type("VARCHAR(64)"), ("VARCHAR".to_string(), TypeSize::Length(64)));
        assert_eq!(
            split_type("NUMERIC(10, 2)"),
            ("NUMERIC".to_string(), TypeSize::PrecisionScale(10, 2))
        );
        assert_eq!(
            split_type("int(11) unsigned"),
            ("int unsigned".to_string(), TypeSize::Length(11))
        );
        assert_eq!(split_type("TEXT"), ("TEXT".to_string(), TypeSize::None));
        assert_eq!(
            split_type("enum('a','b')"),
            ("enum('a','b')".to_string(), TypeSize::None)
        );
    }

    #[test]
    fn test_unquote_default() {
        assert_eq!(unquote_default("'abc'"), "abc");
        assert_eq!(unquote_default("'it''s'"), "it's");
        assert_eq!(unquote_default("''"), "");
        assert_eq!(unquote_default("CURRENT_TIMESTAMP"), "CURRENT_TIMESTAMP");
        assert_eq!(
            unquote_default("'a'::character varying"),
            "'a'::character varying"
        );
        assert_eq!(unquote_default("'a' || 'b'"), "'a' || 'b'");
    }

    #[test]
    fn test_parse_mysql_column_row() {
        let column = parse_column(&row(json!({
            "column_name": "amount",
            "column_type": "decimal(12,2) unsigned",
            "is_nullable": "NO",
            "column_default": null,
            "column_key": "",
            "extra": "",
            "column_comment": "Order amount",
            "numeric_precision": 12,
            "numeric_scale": 2,
            "char_length": null,
            "position": 3
        })));
        assert_eq!(column.name, "amount");
        assert_eq!(column.column_type, "decimal unsigned");
        assert_eq!((column.precision, column.scale), (Some(12), Some(2)));
        assert_eq!(column.length, None);
        assert!(!column.nullable);
        assert_eq!(column.comment.as_deref(), Some("Order amount"));
        assert_eq!(column.position, Some(3));
    }

    #[test]
    fn test_parse_mysql_enum_and_display_width() {
        use crate::driver::{Driver, MySqlDriver};

        let status = parse_column(&row(json!({
            "column_name": "status",
            "column_type": "enum('draft','online')",
            "is_nullable": "NO",
            "column_default": "draft",
            "char_length": null
        })));
        assert_eq!(status.column_type, "enum('draft','online')");
        assert_eq!(status.length, None);

        let id = parse_column(&row(json!({
            "column_name": "id",
            "column_type": "int(11) unsigned",
            "is_nullable": "NO",
            "column_default": null,
            "numeric_precision": null
        })));
        assert_eq!(id.column_type, "int unsigned");
        assert_eq!(id.length, Some(11));

        let table = Table::new("dinky", "t").with_column(id).with_column(status);
        let sql = MySqlDriver::new().create_table_sql(&table).unwrap();
        assert!(sql.contains("  `id` int(11) unsigned NOT NULL,\n"), "{sql}");
        assert!(
            sql.contains("  `status` enum('draft','online') DEFAULT 'draft'\n"),
            "{sql}"
        );
    }

    #[test]
    fn test_parse_sqlite_column_row() {
        let column = parse_column(&row(json!({
            "column_name": "id",
            "column_type": "INTEGER",
            "is_nullable": "NO",
            "column_default": null,
            "column_key": "PRI",
            "extra": "",
            "position": 1
        })));
        assert!(column.key_flag);
        assert!(!column.auto_increment);

        let column = parse_column(&row(json!({
            "column_name": "name",
            "column_type": "VARCHAR(32)",
            "is_nullable": "YES",
            "column_default": "'x'",
            "column_key": "",
            "extra": ""
        })));
        assert_eq!(column.column_type, "VARCHAR");
        assert_eq!(column.length, Some(32));
        assert_eq!(column.default_value.as_deref(), Some("x"));
        assert!(column.nullable);
    }

    #[test]
    fn test_parse_auto_increment_and_table_row() {
        let column = parse_column(&row(json!({
            "column_name": "id",
            "column_type": "bigint",
            "extra": "auto_increment",
            "column_key": "PRI"
        })));
        assert!(column.auto_increment);

        let table = parse_table(
            &row(json!({
                "schema_name": "dinky",
                "table_name": "studio_task",
                "table_type": "BASE TABLE",
                "engine": "InnoDB",
                "options": "",
                "row_count": 42,
                "table_comment": "Task"
            })),
            "dinky",
        );
        assert_eq!(table.name, "studio_task");
        assert_eq!(table.engine.as_deref(), Some("InnoDB"));
        assert_eq!(table.options, None);
        assert_eq!(table.rows, Some(42));
        assert_eq!(table.comment.as_deref(), Some("Task"));
    }
}
