use super::{Driver, is_number, quote_literal, starts_with_ignore_case};
use crate::convert::{MySqlTypeConvert, TypeConvert};
use crate::error::MetadataResult;
use crate::models::{Column, DriverType, Table};
use crate::query::{DbQuery, MySqlQuery};
use std::collections::HashMap;

const DEFAULT_ENGINE: &str = "InnoDB";

/// MySQL/MariaDB driver.
#[derive(Debug, Clone, Default)]
pub struct MySqlDriver {
    query: MySqlQuery,
    convert: MySqlTypeConvert,
}

impl MySqlDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn column_definition(&self, column: &Column) -> String {
        let mut unit = column.size_unit();
        let mut column_type = column.column_type.clone();
        let lower = column_type.to_ascii_lowercase();

        // Modifiers follow the size: `int(10) unsigned`, not `int unsigned(10)`
        if !lower.contains('(') && (lower.contains("unsigned") || lower.contains("zerofill")) {
            let mut tokens: Vec<String> =
                column_type.split_whitespace().map(str::to_string).collect();
            if let Some(first) = tokens.first_mut() {
                first.push_str(&unit);
            }
            column_type = tokens.join(" ");
            unit.clear();
        }

        let mut definition = format!(
            "  {} {}{}",
            self.query.quote_identifier(&column.name),
            column_type,
            unit
        );

        match column.default_value.as_deref() {
            Some("") => definition.push_str(" DEFAULT ''"),
            Some(value)
                if is_number(value)
                    || lower.starts_with("bit")
                    || starts_with_ignore_case(value, "current_timestamp") =>
            {
                definition.push_str(&format!(" DEFAULT {}", value));
            }
            Some(value) => definition.push_str(&format!(" DEFAULT {}", quote_literal(value))),
            None if !column.nullable => definition.push_str(" NOT NULL"),
            None => {}
        }

        if column.auto_increment {
            definition.push_str(" AUTO_INCREMENT");
        }
        if let Some(comment) = column.comment_text() {
            definition.push_str(&format!(" COMMENT {}", quote_literal(comment)));
        }
        definition
    }
}

impl Driver for MySqlDriver {
    fn driver_type(&self) -> DriverType {
        DriverType::MySql
    }

    fn name(&self) -> &'static str {
        "MySQL"
    }

    fn driver_class(&self) -> &'static str {
        "com.mysql.cj.jdbc.Driver"
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
            ("INT", "INT"),
            ("DATETIME", "TIMESTAMP"),
        ])
    }

    fn create_table_sql(&self, table: &Table) -> MetadataResult<String> {
        table.ensure_identified()?;

        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {}.{} (\n{}",
            self.query.quote_identifier(&table.schema),
            self.query.quote_identifier(&table.name),
            columns.join(",\n")
        );

        let keys: Vec<String> = table
            .key_columns()
            .map(|c| self.query.quote_identifier(&c.name))
            .collect();
        if !keys.is_empty() {
            sql.push_str(&format!(",\n  PRIMARY KEY ({})", keys.join(",")));
        }

        let engine = table
            .engine
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(DEFAULT_ENGINE);
        sql.push_str(&format!("\n) ENGINE={}", engine));
        if let Some(options) = table.options_text() {
            sql.push(' ');
            sql.push_str(options);
        }
        if let Some(comment) = table.comment_text() {
            sql.push_str(&format!(" COMMENT={}", quote_literal(comment)));
        }
        sql.push(';');
        Ok(sql)
    }

    fn limit_clause(&self, start: u64, end: u64) -> String {
        format!("limit {},{}", start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryData;

    fn users() -> Table {
        Table::new("dinky", "users")
            .with_comment("user accounts")
            .with_column(
                Column::new("id", "bigint unsigned")
                    .with_length(20)
                    .with_nullable(false)
                    .with_auto_increment(true)
                    .with_key(true),
            )
            .with_column(
                Column::new("name", "varchar")
                    .with_length(64)
                    .with_default("anonymous")
                    .with_comment("display name"),
            )
            .with_column(
                Column::new("balance", "decimal")
                    .with_precision(10, 2)
                    .with_default("0.00"),
            )
            .with_column(Column::new("created_at", "datetime").with_default("CURRENT_TIMESTAMP"))
    }

    #[test]
    fn test_create_table_sql() {
        let sql = MySqlDriver::new().create_table_sql(&users()).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `dinky`.`users` (\n\
             \x20 `id` bigint(20) unsigned NOT NULL AUTO_INCREMENT,\n\
             \x20 `name` varchar(64) DEFAULT 'anonymous' COMMENT 'display name',\n\
             \x20 `balance` decimal(10,2) DEFAULT 0.00,\n\
             \x20 `created_at` datetime DEFAULT CURRENT_TIMESTAMP,\n\
             \x20 PRIMARY KEY (`id`)\n\
             ) ENGINE=InnoDB COMMENT='user accounts';"
        );
    }

    #[test]
    fn test_modifier_splice_ignores_case_and_value_lists() {
        let table = Table::new("s", "t")
            .with_column(Column::new("big", "BIGINT UNSIGNED").with_length(20))
            .with_column(Column::new("code", "INT ZEROFILL").with_length(5))
            .with_column(Column::new("kind", "enum('signed','unsigned')").with_default("signed"))
            .with_column(Column::new("flag", "BIT").with_length(1).with_default("b'0'"));
        let sql = MySqlDriver::new().create_table_sql(&table).unwrap();
        assert!(sql.contains("  `big` BIGINT(20) UNSIGNED,\n"), "{sql}");
        assert!(sql.contains("  `code` INT(5) ZEROFILL,\n"), "{sql}");
        assert!(
            sql.contains("  `kind` enum('signed','unsigned') DEFAULT 'signed',\n"),
            "{sql}"
        );
        assert!(sql.contains("  `flag` BIT(1) DEFAULT b'0'\n"), "{sql}");
    }

    #[test]
    fn test_create_table_sql_with_engine_and_options() {
        let table = Table::new("s", "t")
            .with_engine("MyISAM")
            .with_options("DEFAULT CHARSET=utf8mb4")
            .with_column(Column::new("memo", "varchar").with_length(8).with_default(""))
            .with_column(Column::new("flag", "bit").with_length(1).with_default("b'1'"));
        let sql = MySqlDriver::new().create_table_sql(&table).unwrap();
        assert!(sql.contains("  `memo` varchar(8) DEFAULT '',\n"));
        assert!(sql.contains("  `flag` bit(1) DEFAULT b'1'\n"));
        assert!(sql.ends_with(") ENGINE=MyISAM DEFAULT CHARSET=utf8mb4;"));
        assert!(!sql.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_default_with_quote_is_escaped() {
        let table =
            Table::new("s", "t").with_column(Column::new("c", "varchar").with_default("it's"));
        let sql = MySqlDriver::new().create_table_sql(&table).unwrap();
        assert!(sql.contains("DEFAULT 'it''s'"));
    }

    #[test]
    fn test_sql_select() {
        let sql = MySqlDriver::new().sql_select(&users()).unwrap();
        assert_eq!(
            sql,
            "SELECT\n    `id`\n    ,`name`  --  display name\n    ,`balance`\n    ,`created_at`\n \
             FROM `dinky`.`users`; -- user accounts\n"
        );
    }

    #[test]
    fn test_query_option() {
        let driver = MySqlDriver::new();
        let data = QueryData::new("s", "t")
            .with_where("id > 10")
            .with_order("id desc")
            .with_limit(100, 20);
        assert_eq!(
            driver.query_option(&data).unwrap(),
            "select * from `s`.`t` where id > 10 order by id desc limit 100,20"
        );
    }

    #[test]
    fn test_missing_names_are_rejected() {
        let driver = MySqlDriver::new();
        assert!(driver.create_table_sql(&Table::new("", "t")).is_err());
        assert!(driver.sql_select(&Table::new("s", "")).is_err());
        assert!(driver.query_option(&QueryData::new("s", "")).is_err());
    }

    #[test]
    fn test_identity() {
        let driver = MySqlDriver::new();
        assert_eq!(driver.driver_type().value(), "MySql");
        assert_eq!(driver.driver_class(), "com.mysql.cj.jdbc.Driver");
        assert_eq!(driver.flink_column_type_conversion().get("DATETIME"), Some(&"TIMESTAMP"));
        assert_eq!(driver.flink_column_type_conversion().get("BLOB"), None);
    }

    #[test]
    fn test_flink_create_table_sql() {
        let with = std::collections::BTreeMap::from([
            ("connector".to_string(), "jdbc".to_string()),
            ("table-name".to_string(), "users".to_string()),
        ]);
        let sql = MySqlDriver::new().flink_create_table_sql(&users(), &with).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS `users` (\n\
             \x20 `id` BIGINT,\n\
             \x20 `name` STRING COMMENT 'display name',\n\
             \x20 `balance` DECIMAL(10,2),\n\
             \x20 `created_at` TIMESTAMP,\n\
             \x20 PRIMARY KEY (`id`) NOT ENFORCED\n\
             ) COMMENT 'user accounts' WITH (\n\
             \x20 'connector' = 'jdbc',\n\
             \x20 'table-name' = 'users'\n\
             );"
        );
    }
}
