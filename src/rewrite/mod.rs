//! AST-based SQL rewriting.
//!
//! Caller SQL is parsed with the sqlparser dialect matching the target database, rewritten on the
//! AST and printed back. Two rewriters exist:
//!
//! - [`tenant`]: injects a tenant-id predicate into every tenant-scoped table reference
//! - [`pagination`]: wraps a query with a page limit or derives its total-count query

pub mod pagination;
pub mod tenant;

pub use pagination::{count_sql, paginate};
pub use tenant::{TenantContext, TenantLineHandler, TenantResolver, TenantRewriter, TenantTables};

use crate::error::{MetadataError, MetadataResult};
use crate::models::DriverType;
use sqlparser::ast::{BinaryOperator, Expr, Statement};
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

/// sqlparser dialect for a driver type.
pub fn dialect_for(driver_type: DriverType) -> Box<dyn Dialect> {
    match driver_type {
        DriverType::MySql => Box::new(MySqlDialect {}),
        DriverType::PostgreSql => Box::new(PostgreSqlDialect {}),
        DriverType::Sqlite => Box::new(SQLiteDialect {}),
    }
}

/// Parse `sql` into one or more statements.
pub(crate) fn parse_statements(dialect: &dyn Dialect, sql: &str) -> MetadataResult<Vec<Statement>> {
    let statements = Parser::parse_sql(dialect, sql)?;
    if statements.is_empty() {
        return Err(MetadataError::invalid_input("Empty SQL statement"));
    }
    Ok(statements)
}

/// Parse a standalone expression.
pub(crate) fn parse_expr(dialect: &dyn Dialect, text: &str) -> MetadataResult<Expr> {
    Ok(Parser::new(dialect).try_with_sql(text)?.parse_expr()?)
}

/// AND `predicate` onto an optional condition, parenthesizing the existing one.
pub(crate) fn conjoin(existing: Option<Expr>, predicate: Expr) -> Expr {
    match existing {
        Some(existing) => Expr::BinaryOp {
            left: Box::new(Expr::Nested(Box::new(existing))),
            op: BinaryOperator::And,
            right: Box::new(predicate),
        },
        None => predicate,
    }
}

/// Print statements back as one SQL string.
pub(crate) fn render_statements(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(";\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conjoin_parenthesizes_existing_condition() {
        let dialect = MySqlDialect {};
        let existing = parse_expr(&dialect, "a = 1 OR b = 2").unwrap();
        let predicate = parse_expr(&dialect, "tenant_id = 7").unwrap();
        assert_eq!(
            conjoin(Some(existing), predicate).to_string(),
            "(a = 1 OR b = 2) AND tenant_id = 7"
        );
    }

    #[test]
    fn test_conjoin_without_existing_condition() {
        let dialect = PostgreSqlDialect {};
        let predicate = parse_expr(&dialect, "tenant_id = 7").unwrap();
        assert_eq!(conjoin(None, predicate).to_string(), "tenant_id = 7");
    }

    #[test]
    fn test_parse_statements_rejects_garbage() {
        let dialect = SQLiteDialect {};
        assert!(matches!(
            parse_statements(&dialect, "SELEC * FRM"),
            Err(MetadataError::SqlParse { .. })
        ));
        assert!(parse_statements(&dialect, "").is_err());
    }
}
