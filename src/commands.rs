//! Command execution for the CLI.
//!
//! Every command renders its result as text: SQL for the generators and rewriters, pretty JSON
//! for metadata.

use crate::config::{Command, Config, DatabaseConfig};
use crate::db::{DbPool, MetadataInspector};
use crate::driver::DriverRegistry;
use crate::error::MetadataResult;
use crate::models::{QueryData, Table};
use crate::rewrite::{TenantContext, TenantLineHandler, TenantRewriter, count_sql, paginate};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Run the configured command and return its output.
pub async fn run(config: &Config, registry: &DriverRegistry) -> MetadataResult<String> {
    match &config.command {
        Command::Ddl(args) => {
            let driver = registry.get(args.driver.driver)?;
            let table = Table::from_json_file(&args.table)?;
            driver.generate_create_table_sql(&table)
        }
        Command::Select(args) => {
            let driver = registry.get(args.driver.driver)?;
            let table = Table::from_json_file(&args.table)?;
            driver.sql_select(&table)
        }
        Command::Preview {
            driver,
            schema,
            table,
            where_clause,
            order,
            start,
            end,
        } => {
            let driver = registry.get(driver.driver)?;
            let mut data = QueryData::new(schema, table).with_limit(*start, *end);
            if let Some(where_clause) = where_clause {
                data = data.with_where(where_clause);
            }
            if let Some(order) = order {
                data = data.with_order(order);
            }
            driver.query_option(&data)
        }
        Command::FlinkDdl { table, with } => {
            let driver = registry.get(table.driver.driver)?;
            let model = Table::from_json_file(&table.table)?;
            let options: BTreeMap<String, String> = with.iter().cloned().collect();
            driver.flink_create_table_sql(&model, &options)
        }
        Command::Convert {
            driver,
            column_type,
            precision,
            scale,
            length,
        } => {
            let driver = registry.get(driver.driver)?;
            let convert = driver.type_convert();
            let normalized = convert.convert_type(column_type, *precision, *scale, *length);
            to_json(&serde_json::json!({
                "type": normalized,
                "flinkType": normalized.flink_type(*precision, *scale),
                "dbType": convert.convert_to_db(normalized),
            }))
        }
        Command::Rewrite {
            driver,
            sql,
            tenant_id,
            ignore_tenant,
        } => {
            let context = TenantContext {
                tenant_id: *tenant_id,
                ignore_tenant: *ignore_tenant,
            };
            let handler =
                TenantLineHandler::new(config.tenant_tables()).with_column(&config.tenant_column)?;
            let rewriter =
                TenantRewriter::new(handler, Arc::new(move || context), driver.driver);
            rewriter.rewrite(sql)
        }
        Command::Paginate {
            driver,
            sql,
            offset,
            limit,
            count,
        } => {
            if *count {
                count_sql(sql, driver.driver)
            } else {
                paginate(sql, driver.driver, *offset, *limit)
            }
        }
        Command::Inspect {
            database,
            schema,
            table,
            ddl,
            preview,
        } => {
            let db_config = DatabaseConfig::parse(database)?;
            let pool = DbPool::connect(&db_config).await?;
            let driver = registry.get(db_config.driver_type)?;
            let inspector = MetadataInspector::new(pool.clone(), driver)?;
            let target = InspectTarget {
                schema: schema.as_deref(),
                table: table.as_deref(),
                ddl: *ddl,
                preview: *preview,
            };
            let result = inspect(&inspector, &db_config, target).await;
            pool.close().await;
            result
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct InspectTarget<'a> {
    schema: Option<&'a str>,
    table: Option<&'a str>,
    ddl: bool,
    preview: bool,
}

async fn inspect(
    inspector: &MetadataInspector,
    db_config: &DatabaseConfig,
    target: InspectTarget<'_>,
) -> MetadataResult<String> {
    let schema = target
        .schema
        .or_else(|| db_config.default_schema())
        .unwrap_or_else(|| inspector.driver().db_query().default_schema());
    debug!(schema = %schema, table = ?target.table, "Inspecting database");

    match target.table {
        Some(table) if target.ddl => inspector.show_create_table(schema, table).await,
        Some(table) => {
            if target.preview {
                let rows = inspector.preview(&QueryData::new(schema, table)).await?;
                to_json(&rows)
            } else {
                to_json(&inspector.get_table(schema, table).await?)
            }
        }
        None if target.schema.is_some() => to_json(&inspector.list_tables(schema).await?),
        None => {
            let names: Vec<String> = inspector
                .list_schemas()
                .await?
                .into_iter()
                .map(|s| s.name)
                .collect();
            to_json(&names)
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> MetadataResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn run_args(args: &[&str]) -> MetadataResult<String> {
        let config = Config::try_parse_from(args).unwrap();
        let registry = DriverRegistry::with_defaults();
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(run(&config, &registry))
    }

    fn table_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "schema": "dinky",
                "name": "studio_task",
                "comment": "Task",
                "columns": [
                    {{"name": "id", "type": "bigint", "nullable": false, "autoIncrement": true, "keyFlag": true}},
                    {{"name": "name", "type": "varchar", "length": 255, "comment": "Task name"}}
                ]
            }}"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_ddl_command() {
        let file = table_file();
        let path = file.path().to_str().unwrap();
        let sql = run_args(&["datastudio-metadata", "ddl", "-D", "mysql", "-t", path]).unwrap();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `dinky`.`studio_task` ("));
        assert!(sql.contains("`id` bigint NOT NULL AUTO_INCREMENT"));
        assert!(sql.contains("PRIMARY KEY (`id`)"));
        assert!(sql.ends_with("ENGINE=InnoDB COMMENT='Task';"));
    }

    #[test]
    fn test_select_command() {
        let file = table_file();
        let path = file.path().to_str().unwrap();
        let sql =
            run_args(&["datastudio-metadata", "select", "-D", "postgres", "-t", path]).unwrap();
        assert_eq!(
            sql,
            "SELECT\n    \"id\"\n    ,\"name\"  --  Task name\n FROM \"dinky\".\"studio_task\"; -- Task\n"
        );
    }

    #[test]
    fn test_preview_command() {
        let sql = run_args(&[
            "datastudio-metadata", "preview", "-D", "mysql", "-s", "s", "-t", "t",
        ])
        .unwrap();
        assert_eq!(sql, "select * from `s`.`t` limit 0,50");
    }

    #[test]
    fn test_flink_ddl_command() {
        let file = table_file();
        let path = file.path().to_str().unwrap();
        let sql = run_args(&[
            "datastudio-metadata",
            "flink-ddl",
            "-D",
            "mysql",
            "-t",
            path,
            "--with",
            "connector=jdbc",
        ])
        .unwrap();
        assert!(sql.contains("`name` STRING COMMENT 'Task name'"));
        assert!(sql.contains("PRIMARY KEY (`id`) NOT ENFORCED"));
        assert!(sql.ends_with("WITH (\n  'connector' = 'jdbc'\n);"));
    }

    #[test]
    fn test_convert_command() {
        let out = run_args(&[
            "datastudio-metadata", "convert", "-D", "mysql", "decimal", "--precision", "10",
            "--scale", "2",
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["type"], "DECIMAL");
        assert_eq!(value["flinkType"], "DECIMAL(10,2)");
    }

    #[test]
    fn test_rewrite_command() {
        let sql = run_args(&[
            "datastudio-metadata",
            "rewrite",
            "-D",
            "mysql",
            "SELECT * FROM studio_task",
            "--tenant-id",
            "3",
        ])
        .unwrap();
        assert_eq!(sql, "SELECT * FROM studio_task WHERE tenant_id = 3");

        let sql = run_args(&[
            "datastudio-metadata",
            "rewrite",
            "-D",
            "mysql",
            "SELECT * FROM studio_task",
            "--tenant-ignore-tables",
            "studio_task",
            "--tenant-id",
            "3",
        ])
        .unwrap();
        assert_eq!(sql, "SELECT * FROM studio_task");
    }

    #[test]
    fn test_paginate_command() {
        let sql = run_args(&[
            "datastudio-metadata", "paginate", "-D", "sqlite", "SELECT id FROM t", "--offset",
            "10", "--limit", "5",
        ])
        .unwrap();
        assert_eq!(sql, "SELECT id FROM t LIMIT 5 OFFSET 10");

        let sql = run_args(&[
            "datastudio-metadata", "paginate", "-D", "sqlite", "SELECT id FROM t", "--count",
        ])
        .unwrap();
        assert_eq!(sql, "SELECT COUNT(*) AS total FROM (SELECT id FROM t) AS page_total");
    }

    #[test]
    fn test_inspect_lists_sqlite_schemas() {
        let out = run_args(&["datastudio-metadata", "inspect", "-d", "sqlite::memory:"]).unwrap();
        let names: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(names, vec!["main".to_string()]);
    }

    #[test]
    fn test_missing_table_file_is_io_error() {
        let err = run_args(&[
            "datastudio-metadata", "ddl", "-D", "mysql", "-t", "/nonexistent/table.json",
        ])
        .unwrap_err();
        assert!(matches!(err, crate::error::MetadataError::Io(_)));
    }
}
