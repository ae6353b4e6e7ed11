//! Integration tests for tenant line rewriting across statement shapes.

use datastudio_metadata::error::MetadataError;
use datastudio_metadata::models::DriverType;
use datastudio_metadata::rewrite::{
    TenantContext, TenantLineHandler, TenantRewriter, TenantTables,
};
use std::sync::Arc;

fn rewriter_for(tables: TenantTables, driver_type: DriverType) -> TenantRewriter {
    TenantRewriter::new(
        TenantLineHandler::new(tables),
        Arc::new(|| TenantContext::tenant(7)),
        driver_type,
    )
}

fn rewrite(sql: &str) -> String {
    rewriter_for(TenantTables::default(), DriverType::MySql)
        .rewrite(sql)
        .unwrap()
}

#[test]
fn test_select_without_where() {
    assert_eq!(
        rewrite("SELECT id, name FROM studio_task"),
        "SELECT id, name FROM studio_task WHERE tenant_id = 7"
    );
}

#[test]
fn test_or_condition_is_parenthesized() {
    assert_eq!(
        rewrite("SELECT * FROM studio_task WHERE id = 1 OR id = 2"),
        "SELECT * FROM studio_task WHERE (id = 1 OR id = 2) AND tenant_id = 7"
    );
}

#[test]
fn test_alias_qualifies_column() {
    assert_eq!(
        rewrite("SELECT t.id FROM studio_task AS t WHERE t.id > 5"),
        "SELECT t.id FROM studio_task AS t WHERE (t.id > 5) AND t.tenant_id = 7"
    );
}

#[test]
fn test_inner_join_gets_predicate_in_on_clause() {
    assert_eq!(
        rewrite("SELECT a.id FROM studio_task AS a JOIN studio_history AS h ON a.id = h.task_id"),
        "SELECT a.id FROM studio_task AS a JOIN studio_history AS h \
         ON (a.id = h.task_id) AND h.tenant_id = 7 WHERE a.tenant_id = 7"
    );
}

#[test]
fn test_left_join_gets_predicate_in_on_clause() {
    let sql = rewrite(
        "SELECT a.id FROM studio_task AS a LEFT JOIN studio_history AS h ON a.id = h.task_id",
    );
    assert!(sql.contains("ON (a.id = h.task_id) AND h.tenant_id = 7"), "{sql}");
    assert!(sql.ends_with("WHERE a.tenant_id = 7"), "{sql}");
}

#[test]
fn test_right_join_predicates_go_to_where() {
    let sql = rewrite(
        "SELECT a.id FROM studio_task AS a RIGHT JOIN studio_history AS h ON a.id = h.task_id",
    );
    assert!(sql.contains("ON a.id = h.task_id"), "{sql}");
    assert!(
        sql.ends_with("WHERE a.tenant_id = 7 AND h.tenant_id = 7"),
        "{sql}"
    );
}

#[test]
fn test_comma_join_qualifies_with_table_names() {
    assert_eq!(
        rewrite("SELECT * FROM studio_task, studio_history"),
        "SELECT * FROM studio_task, studio_history \
         WHERE studio_task.tenant_id = 7 AND studio_history.tenant_id = 7"
    );
}

#[test]
fn test_subquery_in_where_is_filtered() {
    assert_eq!(
        rewrite("SELECT * FROM studio_task WHERE id IN (SELECT task_id FROM studio_history)"),
        "SELECT * FROM studio_task WHERE (id IN (SELECT task_id FROM studio_history \
         WHERE tenant_id = 7)) AND tenant_id = 7"
    );
}

#[test]
fn test_derived_table_is_filtered_inside() {
    assert_eq!(
        rewrite("SELECT * FROM (SELECT * FROM studio_task) AS t"),
        "SELECT * FROM (SELECT * FROM studio_task WHERE tenant_id = 7) AS t"
    );
}

#[test]
fn test_union_filters_both_sides() {
    assert_eq!(
        rewrite("SELECT id FROM studio_task UNION ALL SELECT id FROM studio_history"),
        "SELECT id FROM studio_task WHERE tenant_id = 7 \
         UNION ALL SELECT id FROM studio_history WHERE tenant_id = 7"
    );
}

#[test]
fn test_cte_reference_is_not_filtered() {
    assert_eq!(
        rewrite("WITH t AS (SELECT id FROM studio_task) SELECT * FROM t"),
        "WITH t AS (SELECT id FROM studio_task WHERE tenant_id = 7) SELECT * FROM t"
    );
}

#[test]
fn test_cte_named_after_its_table_is_filtered() {
    assert_eq!(
        rewrite("WITH studio_task AS (SELECT * FROM studio_task) SELECT * FROM studio_task"),
        "WITH studio_task AS (SELECT * FROM studio_task WHERE tenant_id = 7) \
         SELECT * FROM studio_task"
    );
}

#[test]
fn test_later_cte_may_reference_earlier_one() {
    assert_eq!(
        rewrite(
            "WITH a AS (SELECT id FROM studio_task), b AS (SELECT id FROM a) SELECT * FROM b"
        ),
        "WITH a AS (SELECT id FROM studio_task WHERE tenant_id = 7), \
         b AS (SELECT id FROM a) SELECT * FROM b"
    );
}

#[test]
fn test_recursive_cte_sees_itself() {
    assert_eq!(
        rewrite(
            "WITH RECURSIVE r AS (SELECT id FROM studio_task UNION ALL SELECT id FROM r) \
             SELECT * FROM r"
        ),
        "WITH RECURSIVE r AS (SELECT id FROM studio_task WHERE tenant_id = 7 \
         UNION ALL SELECT id FROM r) SELECT * FROM r"
    );
}

#[test]
fn test_update_and_delete() {
    assert_eq!(
        rewrite("UPDATE studio_task SET name = 'x' WHERE id = 1"),
        "UPDATE studio_task SET name = 'x' WHERE (id = 1) AND tenant_id = 7"
    );
    assert_eq!(
        rewrite("DELETE FROM studio_task WHERE id = 1"),
        "DELETE FROM studio_task WHERE (id = 1) AND tenant_id = 7"
    );
    assert_eq!(
        rewrite("DELETE FROM studio_task"),
        "DELETE FROM studio_task WHERE tenant_id = 7"
    );
}

#[test]
fn test_insert_appends_tenant_column() {
    assert_eq!(
        rewrite("INSERT INTO studio_task (id, name) VALUES (1, 'a'), (2, 'b')"),
        "INSERT INTO studio_task (id, name, tenant_id) VALUES (1, 'a', 7), (2, 'b', 7)"
    );
    let explicit = "INSERT INTO studio_task (id, tenant_id) VALUES (1, 3)";
    assert_eq!(rewrite(explicit), explicit);
}

#[test]
fn test_insert_without_column_list_is_refused() {
    let rewriter = rewriter_for(TenantTables::exempt(["sys_user"]), DriverType::MySql);
    let err = rewriter
        .rewrite("INSERT INTO studio_task VALUES (1, 'x')")
        .unwrap_err();
    assert!(matches!(err, MetadataError::InvalidInput { .. }), "{err:?}");

    let exempt = "INSERT INTO sys_user VALUES (1, 'x')";
    assert_eq!(rewriter.rewrite(exempt).unwrap(), exempt);
    assert_eq!(
        rewriter
            .rewrite_with(
                "INSERT INTO studio_task VALUES (1, 'x')",
                &TenantContext::ignored()
            )
            .unwrap(),
        "INSERT INTO studio_task VALUES (1, 'x')"
    );
}

#[test]
fn test_exempt_and_scoped_policies() {
    let exempt = rewriter_for(TenantTables::exempt(["sys_user"]), DriverType::MySql);
    assert_eq!(
        exempt.rewrite("SELECT * FROM sys_user").unwrap(),
        "SELECT * FROM sys_user"
    );

    let scoped = rewriter_for(TenantTables::studio_tables(), DriverType::MySql);
    assert_eq!(
        scoped.rewrite("SELECT * FROM sys_user").unwrap(),
        "SELECT * FROM sys_user"
    );
    assert_eq!(
        scoped.rewrite("SELECT * FROM dinky.studio_task").unwrap(),
        "SELECT * FROM dinky.studio_task WHERE tenant_id = 7"
    );
}

#[test]
fn test_absent_tenant_matches_nothing() {
    let rewriter = rewriter_for(TenantTables::default(), DriverType::PostgreSql);
    let sql = rewriter
        .rewrite_with(
            "SELECT * FROM studio_task WHERE id = 1 OR 1 = 1",
            &TenantContext::anonymous(),
        )
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM studio_task WHERE (id = 1 OR 1 = 1) AND tenant_id = NULL"
    );
}

#[test]
fn test_ignore_flag_leaves_sql_untouched() {
    let rewriter = rewriter_for(TenantTables::default(), DriverType::Sqlite);
    let sql = "DELETE FROM studio_task";
    assert_eq!(
        rewriter.rewrite_with(sql, &TenantContext::ignored()).unwrap(),
        sql
    );
}

#[test]
fn test_custom_tenant_column() {
    let handler = TenantLineHandler::new(TenantTables::default())
        .with_column("org_id")
        .unwrap();
    let rewriter = TenantRewriter::new(
        handler,
        Arc::new(|| TenantContext::tenant(11)),
        DriverType::PostgreSql,
    );
    assert_eq!(
        rewriter.rewrite("SELECT * FROM studio_task").unwrap(),
        "SELECT * FROM studio_task WHERE org_id = 11"
    );
}

#[test]
fn test_multiple_statements() {
    assert_eq!(
        rewrite("SELECT * FROM studio_task; DELETE FROM studio_history"),
        "SELECT * FROM studio_task WHERE tenant_id = 7;\nDELETE FROM studio_history WHERE tenant_id = 7"
    );
}
