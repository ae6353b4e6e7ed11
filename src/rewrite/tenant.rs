//! Tenant line isolation.
//!
//! [`TenantRewriter`] parses caller SQL and adds `tenant_id = <id>` to every reference of a
//! tenant-scoped table: SELECT (including CTEs, set operations, derived tables and subqueries),
//! UPDATE and DELETE get the predicate AND-ed onto their WHERE clause or onto the ON clause of an
//! inner/left join; `INSERT ... VALUES` gets the tenant column appended, and is refused when it
//! has no column list.
//!
//! Without a tenant id the predicate becomes `tenant_id = NULL`, which matches no row. The
//! original condition is always parenthesized so that an `OR` in it cannot widen the result.

use super::{conjoin, dialect_for, parse_expr, parse_statements, render_statements};
use crate::error::{MetadataError, MetadataResult};
use crate::models::DriverType;
use crate::query::validate_identifier;
use serde::{Deserialize, Serialize};
use sqlparser::ast::{
    Expr, FromTable, Ident, Insert, JoinConstraint, JoinOperator, ObjectName, Query, SetExpr,
    Statement, TableFactor, TableObject, TableWithJoins, VisitMut, VisitorMut, With,
};
use sqlparser::dialect::Dialect;
use std::collections::HashSet;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_TENANT_COLUMN: &str = "tenant_id";

/// Tables of the studio schema that carry a tenant column.
pub const STUDIO_TENANT_TABLES: [&str; 19] = [
    "studio_namespace",
    "studio_alert_group",
    "studio_alert_history",
    "studio_alert_instance",
    "studio_catalogue",
    "studio_cluster",
    "studio_cluster_configuration",
    "studio_database",
    "studio_fragment",
    "studio_history",
    "studio_jar",
    "studio_job_history",
    "studio_job_instance",
    "studio_role",
    "studio_savepoints",
    "studio_task",
    "studio_task_statement",
    "studio_git_project",
    "studio_task_version",
];

/// Request-scoped tenant state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    pub tenant_id: Option<i64>,
    /// Disables filtering for every table
    #[serde(default)]
    pub ignore_tenant: bool,
}

impl TenantContext {
    pub fn tenant(tenant_id: i64) -> Self {
        Self {
            tenant_id: Some(tenant_id),
            ignore_tenant: false,
        }
    }

    /// Context with no tenant resolved.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn ignored() -> Self {
        Self {
            tenant_id: None,
            ignore_tenant: true,
        }
    }
}

/// Supplies the tenant context of the current request.
pub trait TenantResolver: Send + Sync {
    fn resolve(&self) -> TenantContext;
}

impl<F> TenantResolver for F
where
    F: Fn() -> TenantContext + Send + Sync,
{
    fn resolve(&self) -> TenantContext {
        self()
    }
}

/// Which tables receive the tenant predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantTables {
    /// Every table except the listed ones
    Exempt(HashSet<String>),
    /// Only the listed tables
    Scoped(HashSet<String>),
}

impl Default for TenantTables {
    fn default() -> Self {
        Self::Exempt(HashSet::new())
    }
}

impl TenantTables {
    pub fn exempt<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Exempt(normalize_all(tables))
    }

    pub fn scoped<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Scoped(normalize_all(tables))
    }

    /// Scope filtering to [`STUDIO_TENANT_TABLES`].
    pub fn studio_tables() -> Self {
        Self::scoped(STUDIO_TENANT_TABLES)
    }

    /// Whether `table` (optionally qualified or quoted) is tenant-filtered.
    pub fn is_filtered(&self, table: &str) -> bool {
        let key = normalize_table_name(table);
        match self {
            Self::Exempt(tables) => !tables.contains(&key),
            Self::Scoped(tables) => tables.contains(&key),
        }
    }
}

fn normalize_all<I, S>(tables: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tables
        .into_iter()
        .map(|t| normalize_table_name(t.as_ref()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Last path segment, unquoted and lowercased.
fn normalize_table_name(table: &str) -> String {
    let last = table.rsplit('.').next().unwrap_or(table);
    last.trim()
        .trim_matches(|c| matches!(c, '`' | '"' | '[' | ']'))
        .to_lowercase()
}

/// Tenant column and table policy. Built once and shared.
#[derive(Debug, Clone)]
pub struct TenantLineHandler {
    column: String,
    tables: TenantTables,
}

impl TenantLineHandler {
    pub fn new(tables: TenantTables) -> Self {
        Self {
            column: DEFAULT_TENANT_COLUMN.to_string(),
            tables,
        }
    }

    /// Use a different tenant column.
    pub fn with_column(mut self, column: impl Into<String>) -> MetadataResult<Self> {
        let column = column.into();
        validate_identifier(&column)?;
        self.column = column;
        Ok(self)
    }

    pub fn tenant_column(&self) -> &str {
        &self.column
    }

    pub fn tables(&self) -> &TenantTables {
        &self.tables
    }

    /// Value compared against the tenant column: the id, or `NULL` when none is set.
    pub fn tenant_id_literal(&self, context: &TenantContext) -> String {
        match context.tenant_id {
            Some(id) => id.to_string(),
            None => "NULL".to_string(),
        }
    }

    /// Whether `table` is left unfiltered under `context`.
    pub fn ignore_table(&self, table: &str, context: &TenantContext) -> bool {
        context.ignore_tenant || !self.tables.is_filtered(table)
    }
}

impl Default for TenantLineHandler {
    fn default() -> Self {
        Self::new(TenantTables::default())
    }
}

/// Rewrites SQL for tenant isolation.
pub struct TenantRewriter {
    handler: TenantLineHandler,
    resolver: Arc<dyn TenantResolver>,
    driver_type: DriverType,
}

impl TenantRewriter {
    pub fn new(
        handler: TenantLineHandler,
        resolver: Arc<dyn TenantResolver>,
        driver_type: DriverType,
    ) -> Self {
        Self {
            handler,
            resolver,
            driver_type,
        }
    }

    pub fn handler(&self) -> &TenantLineHandler {
        &self.handler
    }

    /// Rewrite `sql` under the context reported by the resolver.
    pub fn rewrite(&self, sql: &str) -> MetadataResult<String> {
        let context = self.resolver.resolve();
        self.rewrite_with(sql, &context)
    }

    /// Rewrite `sql` under an explicit context.
    pub fn rewrite_with(&self, sql: &str, context: &TenantContext) -> MetadataResult<String> {
        if context.ignore_tenant {
            debug!(driver = %self.driver_type, "Tenant filtering ignored");
            return Ok(sql.to_string());
        }

        let dialect = dialect_for(self.driver_type);
        let mut statements = parse_statements(dialect.as_ref(), sql)?;
        let mut injector = TenantInjector {
            handler: &self.handler,
            context,
            dialect: dialect.as_ref(),
            cte_scopes: Vec::new(),
            detached_with: Vec::new(),
        };
        for statement in statements.iter_mut() {
            if let ControlFlow::Break(err) = statement.visit(&mut injector) {
                return Err(err);
            }
        }

        let rewritten = render_statements(&statements);
        debug!(
            driver = %self.driver_type,
            tenant_id = ?context.tenant_id,
            sql = %rewritten,
            "Rewrote SQL for tenant isolation"
        );
        Ok(rewritten)
    }
}

impl std::fmt::Debug for TenantRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantRewriter")
            .field("handler", &self.handler)
            .field("driver_type", &self.driver_type)
            .finish_non_exhaustive()
    }
}

struct TenantInjector<'a> {
    handler: &'a TenantLineHandler,
    context: &'a TenantContext,
    dialect: &'a dyn Dialect,
    /// CTE names visible at the current query depth, one frame per query
    cte_scopes: Vec<HashSet<String>>,
    /// WITH clauses taken off the queries being visited, restored on exit.
    detached_with: Vec<Option<With>>,
}

impl TenantInjector<'_> {
    fn is_cte(&self, name: &ObjectName) -> bool {
        if name.0.len() != 1 {
            return false;
        }
        let key = normalize_table_name(&table_name(name));
        self.cte_scopes.iter().any(|scope| scope.contains(&key))
    }

    fn predicate(&self, qualifier: Option<String>) -> MetadataResult<Expr> {
        let column = match qualifier {
            Some(qualifier) => format!("{}.{}", qualifier, self.handler.tenant_column()),
            None => self.handler.tenant_column().to_string(),
        };
        let literal = self.handler.tenant_id_literal(self.context);
        parse_expr(self.dialect, &format!("{} = {}", column, literal))
    }

    /// Predicate for one table reference, if that table is filtered.
    fn predicate_for(&self, factor: &TableFactor, qualify: bool) -> MetadataResult<Option<Expr>> {
        let TableFactor::Table { name, alias, .. } = factor else {
            return Ok(None);
        };
        if self.is_cte(name) || self.handler.ignore_table(&table_name(name), self.context) {
            return Ok(None);
        }
        let qualifier = match alias {
            Some(alias) => Some(alias.name.to_string()),
            None if qualify => Some(name.to_string()),
            None => None,
        };
        self.predicate(qualifier).map(Some)
    }

    fn filter_from(
        &self,
        from: &mut [TableWithJoins],
        selection: &mut Option<Expr>,
    ) -> MetadataResult<()> {
        let qualify = from.len() > 1 || from.iter().any(|t| !t.joins.is_empty());
        let mut predicates = Vec::new();

        for table in from.iter_mut() {
            if let TableFactor::NestedJoin {
                table_with_joins, ..
            } = &mut table.relation
            {
                self.filter_from(std::slice::from_mut(table_with_joins.as_mut()), selection)?;
            }
            predicates.extend(self.predicate_for(&table.relation, qualify)?);

            for join in table.joins.iter_mut() {
                let Some(predicate) = self.predicate_for(&join.relation, qualify)? else {
                    continue;
                };
                match on_condition(&mut join.join_operator) {
                    Some(on) => *on = conjoin(Some(on.clone()), predicate),
                    None => predicates.push(predicate),
                }
            }
        }

        let combined = predicates
            .into_iter()
            .reduce(|acc, predicate| conjoin_flat(acc, predicate));
        if let Some(combined) = combined {
            *selection = Some(conjoin(selection.take(), combined));
        }
        Ok(())
    }

    fn filter_set_expr(&self, body: &mut SetExpr) -> MetadataResult<()> {
        match body {
            SetExpr::Select(select) => {
                let select = &mut **select;
                self.filter_from(&mut select.from, &mut select.selection)
            }
            SetExpr::SetOperation { left, right, .. } => {
                self.filter_set_expr(left)?;
                self.filter_set_expr(right)
            }
            // nested queries are visited on their own
            _ => Ok(()),
        }
    }

    fn filter_statement(&self, statement: &mut Statement) -> MetadataResult<()> {
        match statement {
            Statement::Update(update) => self.filter_from(
                std::slice::from_mut(&mut update.table),
                &mut update.selection,
            ),
            Statement::Delete(delete) => {
                let tables = match &mut delete.from {
                    FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => {
                        tables
                    }
                };
                self.filter_from(tables, &mut delete.selection)
            }
            Statement::Insert(insert) => self.fill_insert(insert),
            _ => Ok(()),
        }
    }

    /// Append the tenant column to `INSERT ... (cols) VALUES ...` when it is missing.
    /// Without a column list the tenant value has no position, so the statement is refused.
    fn fill_insert(&self, insert: &mut Insert) -> MetadataResult<()> {
        let TableObject::TableName(name) = &insert.table else {
            return Ok(());
        };
        let table = table_name(name);
        if self.handler.ignore_table(&table, self.context) {
            return Ok(());
        }
        if insert.columns.is_empty() {
            if matches!(
                insert.source.as_deref().map(|q| q.body.as_ref()),
                Some(SetExpr::Values(_))
            ) {
                return Err(MetadataError::invalid_input(format!(
                    "INSERT into tenant table {} must list its columns",
                    table
                )));
            }
            return Ok(());
        }

        let column = self.handler.tenant_column();
        if insert
            .columns
            .iter()
            .any(|c| c.value.eq_ignore_ascii_case(column))
        {
            return Ok(());
        }
        let Some(source) = insert.source.as_mut() else {
            return Ok(());
        };
        let SetExpr::Values(values) = source.body.as_mut() else {
            return Ok(());
        };

        let value = parse_expr(self.dialect, &self.handler.tenant_id_literal(self.context))?;
        for row in values.rows.iter_mut() {
            row.push(value.clone());
        }
        insert.columns.push(Ident::new(column));
        Ok(())
    }
}

impl VisitorMut for TenantInjector<'_> {
    type Break = MetadataError;

    fn pre_visit_query(&mut self, query: &mut Query) -> ControlFlow<Self::Break> {
        // A CTE body sees only the CTEs declared before it, and itself when recursive.
        let mut with = query.with.take();
        let mut visible = HashSet::new();
        if let Some(with) = with.as_mut() {
            let recursive = with.recursive;
            for cte in with.cte_tables.iter_mut() {
                let name = cte.alias.name.value.to_lowercase();
                if recursive {
                    visible.insert(name.clone());
                }
                self.cte_scopes.push(visible.clone());
                let flow = cte.query.visit(self);
                self.cte_scopes.pop();
                flow?;
                visible.insert(name);
            }
        }
        self.cte_scopes.push(visible);
        self.detached_with.push(with);
        into_flow(self.filter_set_expr(&mut query.body))
    }

    fn post_visit_query(&mut self, query: &mut Query) -> ControlFlow<Self::Break> {
        self.cte_scopes.pop();
        query.with = self.detached_with.pop().flatten();
        ControlFlow::Continue(())
    }

    fn pre_visit_statement(&mut self, statement: &mut Statement) -> ControlFlow<Self::Break> {
        into_flow(self.filter_statement(statement))
    }
}

fn into_flow(result: MetadataResult<()>) -> ControlFlow<MetadataError> {
    match result {
        Ok(()) => ControlFlow::Continue(()),
        Err(err) => ControlFlow::Break(err),
    }
}

/// ON condition of joins where the predicate belongs in the join itself.
fn on_condition(operator: &mut JoinOperator) -> Option<&mut Expr> {
    match operator {
        JoinOperator::Join(JoinConstraint::On(expr))
        | JoinOperator::Inner(JoinConstraint::On(expr))
        | JoinOperator::Left(JoinConstraint::On(expr))
        | JoinOperator::LeftOuter(JoinConstraint::On(expr)) => Some(expr),
        _ => None,
    }
}

fn conjoin_flat(left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        left: Box::new(left),
        op: sqlparser::ast::BinaryOperator::And,
        right: Box::new(right),
    }
}

fn table_name(name: &ObjectName) -> String {
    name.0.last().map(|part| part.to_string()).unwrap_or_default()
}
