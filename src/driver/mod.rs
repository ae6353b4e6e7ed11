//! Dialect drivers.
//!
//! A driver composes a [`TypeConvert`] and a [`DbQuery`] for one dialect and renders SQL text from
//! the normalized [`Table`] model:
//!
//! - `CREATE TABLE` DDL ([`Driver::create_table_sql`], [`Driver::generate_create_table_sql`])
//! - a formatted column-per-line `SELECT` ([`Driver::sql_select`])
//! - a paginated preview query ([`Driver::query_option`])
//! - Flink `CREATE TABLE` DDL ([`Driver::flink_create_table_sql`])
//!
//! Drivers hold no mutable state and are shared through the [`DriverRegistry`].

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::MySqlDriver;
pub use postgres::PostgreSqlDriver;
pub use sqlite::SqliteDriver;

use crate::convert::TypeConvert;
use crate::error::{MetadataError, MetadataResult};
use crate::models::table::ensure_named;
use crate::models::{Column, DriverType, QueryData, Table};
use crate::query::DbQuery;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

/// Per-dialect SQL generator.
pub trait Driver: Send + Sync {
    /// Registry key.
    fn driver_type(&self) -> DriverType;

    /// Human readable label.
    fn name(&self) -> &'static str;

    /// Connectivity driver class handed to the connection layer.
    fn driver_class(&self) -> &'static str;

    fn db_query(&self) -> &dyn DbQuery;

    fn type_convert(&self) -> &dyn TypeConvert;

    /// Uppercase dialect type to Flink type. Types missing from the map are left to the caller.
    fn flink_column_type_conversion(&self) -> HashMap<&'static str, &'static str>;

    /// Render the `CREATE TABLE` statement for `table`.
    fn create_table_sql(&self, table: &Table) -> MetadataResult<String>;

    /// Same output as [`Driver::create_table_sql`], logged as auto-generated.
    fn generate_create_table_sql(&self, table: &Table) -> MetadataResult<String> {
        let sql = self.create_table_sql(table)?;
        info!(
            driver = %self.driver_type(),
            table = %table.qualified_name(),
            sql = %sql,
            "Auto generated create table sql"
        );
        Ok(sql)
    }

    /// Limit clause of a preview query, without leading space.
    fn limit_clause(&self, start: u64, end: u64) -> String {
        format!("limit {} offset {}", end, start)
    }

    /// Multi-line `SELECT` listing every column, annotated with column and table comments.
    fn sql_select(&self, table: &Table) -> MetadataResult<String> {
        table.ensure_identified()?;
        let query = self.db_query();

        let mut sql = String::from("SELECT\n");
        for (i, column) in table.columns.iter().enumerate() {
            sql.push_str("    ");
            if i > 0 {
                sql.push(',');
            }
            sql.push_str(&query.quote_identifier(&column.name));
            if let Some(comment) = column.comment_text() {
                sql.push_str("  --  ");
                sql.push_str(&strip_comment(comment));
            }
            sql.push('\n');
        }

        sql.push_str(&format!(
            " FROM {}.{};",
            query.quote_identifier(&table.schema),
            query.quote_identifier(&table.name)
        ));
        if let Some(comment) = table.comment_text() {
            sql.push_str(" -- ");
            sql.push_str(&strip_comment(comment));
        }
        sql.push('\n');
        Ok(sql)
    }

    /// Paginated preview query. WHERE and ORDER BY text is appended verbatim.
    fn query_option(&self, query_data: &QueryData) -> MetadataResult<String> {
        ensure_named("schema", &query_data.schema_name)?;
        ensure_named("table name", &query_data.table_name)?;
        let query = self.db_query();
        let option = &query_data.option;

        let mut sql = format!(
            "select * from {}.{}",
            query.quote_identifier(&query_data.schema_name),
            query.quote_identifier(&query_data.table_name)
        );
        if let Some(where_clause) = option.where_text() {
            sql.push_str(" where ");
            sql.push_str(where_clause);
        }
        if let Some(order) = option.order_text() {
            sql.push_str(" order by ");
            sql.push_str(order);
        }
        sql.push(' ');
        sql.push_str(&self.limit_clause(option.limit_start, option.limit_end));
        Ok(sql)
    }

    /// Flink type of one column: the static conversion map first, the normalized type second.
    fn flink_column_type(&self, column: &Column) -> String {
        let conversion = self.flink_column_type_conversion();
        let head = column
            .column_type
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default()
            .to_uppercase();
        match conversion.get(head.as_str()) {
            Some(flink_type) => flink_type.to_string(),
            None => self
                .type_convert()
                .convert(column)
                .flink_type(column.precision, column.scale),
        }
    }

    /// Flink `CREATE TABLE` mirroring `table`, with a `WITH (...)` block built from `with_options`.
    fn flink_create_table_sql(
        &self,
        table: &Table,
        with_options: &BTreeMap<String, String>,
    ) -> MetadataResult<String> {
        table.ensure_identified()?;

        let mut lines: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                let mut line = format!(
                    "  `{}` {}",
                    column.name.replace('`', "``"),
                    self.flink_column_type(column)
                );
                if let Some(comment) = column.comment_text() {
                    line.push_str(&format!(" COMMENT {}", quote_literal(comment)));
                }
                line
            })
            .collect();

        let keys: Vec<String> = table
            .key_columns()
            .map(|c| format!("`{}`", c.name.replace('`', "``")))
            .collect();
        if !keys.is_empty() {
            lines.push(format!("  PRIMARY KEY ({}) NOT ENFORCED", keys.join(",")));
        }

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS `{}` (\n{}\n)",
            table.name.replace('`', "``"),
            lines.join(",\n")
        );
        if let Some(comment) = table.comment_text() {
            sql.push_str(&format!(" COMMENT {}", quote_literal(comment)));
        }
        if !with_options.is_empty() {
            let options: Vec<String> = with_options
                .iter()
                .map(|(k, v)| format!("  {} = {}", quote_literal(k), quote_literal(v)))
                .collect();
            sql.push_str(&format!(" WITH (\n{}\n)", options.join(",\n")));
        }
        sql.push(';');
        Ok(sql)
    }
}

/// Drivers keyed by dialect. Built once, then shared read-only.
#[derive(Clone, Default)]
pub struct DriverRegistry {
    drivers: HashMap<DriverType, Arc<dyn Driver>>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in driver.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(Arc::new(MySqlDriver::new()))
            .register(Arc::new(PostgreSqlDriver::new()))
            .register(Arc::new(SqliteDriver::new()))
    }

    /// Add a driver, replacing any previous one of the same type.
    pub fn register(mut self, driver: Arc<dyn Driver>) -> Self {
        self.drivers.insert(driver.driver_type(), driver);
        self
    }

    /// Resolve a driver by tag.
    pub fn get(&self, driver_type: DriverType) -> MetadataResult<Arc<dyn Driver>> {
        self.drivers
            .get(&driver_type)
            .cloned()
            .ok_or_else(|| MetadataError::unsupported_dialect(driver_type.value()))
    }

    /// Resolve a driver by its value string or an alias.
    pub fn get_by_name(&self, name: &str) -> MetadataResult<Arc<dyn Driver>> {
        self.get(name.parse()?)
    }

    /// Registered tags, in declaration order.
    pub fn driver_types(&self) -> Vec<DriverType> {
        DriverType::ALL
            .into_iter()
            .filter(|t| self.drivers.contains_key(t))
            .collect()
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.driver_types())
            .finish()
    }
}

/// Single-quote a literal, doubling embedded quotes.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Drop quote characters and line breaks so a comment fits a `--` annotation.
pub(crate) fn strip_comment(comment: &str) -> String {
    comment
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '\r' | '\n'))
        .collect()
}

/// Numeric literal check: optional sign, digits with an optional fraction and exponent, or a
/// `0x` hex literal.
pub(crate) fn is_number(value: &str) -> bool {
    let s = value.trim();
    if s.is_empty() {
        return false;
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }

    let s = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let mut digits = 0;
    let mut dots = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }

    match exponent {
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
        None => true,
    }
}

/// Case-insensitive prefix match on a trimmed default value.
pub(crate) fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .trim()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
