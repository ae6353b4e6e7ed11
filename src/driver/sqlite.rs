use super::{Driver, is_number, quote_literal};
use crate::convert::{SqliteTypeConvert, TypeConvert};
use crate::error::MetadataResult;
use crate::models::{Column, DriverType, Table};
use crate::query::{DbQuery, SqliteQuery};
use std::collections::HashMap;

const TIME_KEYWORDS: [&str; 3] = ["CURRENT_TIMESTAMP", "CURRENT_DATE", "CURRENT_TIME"];

/// SQLite driver.
#[derive(Debug, Clone, Default)]
pub struct SqliteDriver {
    query: SqliteQuery,
    convert: SqliteTypeConvert,
}

impl SqliteDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_unquoted_default(value: &str) -> bool {
        let trimmed = value.trim();
        is_number(trimmed)
            || TIME_KEYWORDS.iter().any(|k| trimmed.eq_ignore_ascii_case(k))
            || (trimmed.starts_with('(') && trimmed.ends_with(')'))
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut definition = format!(
            "  {} {}{}",
            self.query.quote_identifier(&column.name),
            column.column_type,
            column.size_unit()
        );

        match column.default_value.as_deref() {
            Some("") => definition.push_str(" DEFAULT ''"),
            Some(value) if Self::is_unquoted_default(value) => {
                definition.push_str(&format!(" DEFAULT {}", value));
            }
            Some(value) => definition.push_str(&format!(" DEFAULT {}", quote_literal(value))),
            None => {}
        }
        if !column.nullable {
            definition.push_str(" NOT NULL");
        }
        definition
    }
}

impl Driver for SqliteDriver {
    fn driver_type(&self) -> DriverType {
        DriverType::Sqlite
    }

    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn driver_class(&self) -> &'static str {
        "org.sqlite.JDBC"
    }

    fn db_query(&self) -> &dyn DbQuery {
        &self.query
    }

    fn type_convert(&self) -> &dyn TypeConvert {
        &self.convert
    }

    fn flink_column_type_conversion(&self) -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("TEXT", "STRING"),
            ("INTEGER", "BIGINT"),
            ("REAL", "DOUBLE"),
            ("BLOB", "BYTES"),
        ])
    }

    fn create_table_sql(&self, table: &Table) -> MetadataResult<String> {
        table.ensure_identified()?;

        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        let keys: Vec<String> = table
            .key_columns()
            .map(|c| self.query.quote_identifier(&c.name))
            .collect();
        if !keys.is_empty() {
            lines.push(format!("  PRIMARY KEY ({})", keys.join(",")));
        }

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {}.{} (\n{}\n)",
            self.query.quote_identifier(&table.schema),
            self.query.quote_identifier(&table.name),
            lines.join(",\n")
        );
        if let Some(options) = table.options_text() {
            sql.push(' ');
            sql.push_str(options);
        }
        sql.push(';');
        Ok(sql)
    }
}
