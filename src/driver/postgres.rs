use super::{Driver, is_number, quote_literal, starts_with_ignore_case};
use crate::convert::{PostgreSqlTypeConvert, TypeConvert};
use crate::error::MetadataResult;
use crate::models::{Column, DriverType, Table};
use crate::query::{DbQuery, PostgreSqlQuery};
use std::collections::HashMap;

/// PostgreSQL driver.
#[derive(Debug, Clone, Default)]
pub struct PostgreSqlDriver {
    query: PostgreSqlQuery,
    convert: PostgreSqlTypeConvert,
}

impl PostgreSqlDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_unquoted_default(value: &str) -> bool {
        is_number(value)
            || starts_with_ignore_case(value, "current_timestamp")
            || starts_with_ignore_case(value, "now(")
            || starts_with_ignore_case(value, "nextval(")
            || value.contains("::")
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut definition = format!(
            "  {} {}{}",
            self.query.quote_identifier(&column.name),
            column.column_type,
            column.size_unit()
        );

        let serial = column.column_type.to_lowercase().contains("serial");
        let identity = column.auto_increment && !serial;
        if identity {
            definition.push_str(" GENERATED BY DEFAULT AS IDENTITY");
        }

        match column.default_value.as_deref() {
            // identity and serial columns own their sequence
            Some(value) if (identity || serial) && starts_with_ignore_case(value, "nextval(") => {}
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

impl Driver for PostgreSqlDriver {
    fn driver_type(&self) -> DriverType {
        DriverType::PostgreSql
    }

    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn driver_class(&self) -> &'static str {
        "org.postgresql.Driver"
    }

    fn db_query(&self) -> &dyn DbQuery {
        &self.query
    }

    fn type_convert(&self) -> &dyn TypeConvert {
        &self.convert
    }

    fn flink_column_type_conversion(&self) -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("VARCHAR", "STRING"),
            ("TEXT", "STRING"),
            ("INT4", "INT"),
            ("INT8", "BIGINT"),
            ("TIMESTAMP", "TIMESTAMP"),
        ])
    }

    fn create_table_sql(&self, table: &Table) -> MetadataResult<String> {
        table.ensure_identified()?;
        let qualified = format!(
            "{}.{}",
            self.query.quote_identifier(&table.schema),
            self.query.quote_identifier(&table.name)
        );

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
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            qualified,
            lines.join(",\n")
        );
        if let Some(options) = table.options_text() {
            sql.push(' ');
            sql.push_str(options);
        }
        sql.push(';');

        if let Some(comment) = table.comment_text() {
            sql.push_str(&format!(
                "\nCOMMENT ON TABLE {} IS {};",
                qualified,
                quote_literal(comment)
            ));
        }
        for column in &table.columns {
            if let Some(comment) = column.comment_text() {
                sql.push_str(&format!(
                    "\nCOMMENT ON COLUMN {}.{} IS {};",
                    qualified,
                    self.query.quote_identifier(&column.name),
                    quote_literal(comment)
                ));
            }
        }
        Ok(sql)
    }
}
