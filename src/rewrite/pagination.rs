//! Page limit injection and total-count queries.

use super::{dialect_for, parse_statements};
use crate::error::{MetadataError, MetadataResult};
use crate::models::DriverType;
use sqlparser::ast::{Query, Statement};
use tracing::debug;

/// Parse `sql` as exactly one query.
fn single_query(sql: &str, driver_type: DriverType) -> MetadataResult<Box<Query>> {
    let dialect = dialect_for(driver_type);
    let mut statements = parse_statements(dialect.as_ref(), sql)?;
    if statements.len() != 1 {
        return Err(MetadataError::invalid_input(format!(
            "Expected a single query, got {} statements",
            statements.len()
        )));
    }
    match statements.remove(0) {
        Statement::Query(query) => Ok(query),
        other => Err(MetadataError::invalid_input(format!(
            "Only queries can be paginated, got: {}",
            other
        ))),
    }
}

/// Append the dialect's page clause to a query that has none.
pub fn paginate(
    sql: &str,
    driver_type: DriverType,
    offset: u64,
    limit: u64,
) -> MetadataResult<String> {
    let query = single_query(sql, driver_type)?;
    if query.limit_clause.is_some() || query.fetch.is_some() {
        return Err(MetadataError::invalid_input(
            "Query already has a LIMIT or FETCH clause",
        ));
    }

    let page = match driver_type {
        DriverType::MySql => format!("LIMIT {}, {}", offset, limit),
        DriverType::PostgreSql | DriverType::Sqlite => {
            format!("LIMIT {} OFFSET {}", limit, offset)
        }
    };
    let paged = format!("{} {}", query, page);
    debug!(driver = %driver_type, offset, limit, sql = %paged, "Paginated query");
    Ok(paged)
}

/// Total row count of a query. ORDER BY is dropped unless a limit makes it significant.
pub fn count_sql(sql: &str, driver_type: DriverType) -> MetadataResult<String> {
    let mut query = single_query(sql, driver_type)?;
    if query.limit_clause.is_none() && query.fetch.is_none() {
        query.order_by = None;
    }
    Ok(format!(
        "SELECT COUNT(*) AS total FROM ({}) AS page_total",
        query
    ))
}
