// Integration tests for the SQL statement analyzer
use pretty_assertions::assert_eq;
use sqlsift_core::analyzer::{Analyzer, ParseContext, StatementOutcome};
use sqlsift_core::inventory::Inventory;

fn analyze_all(statements: &[&str]) -> (Analyzer, ParseContext) {
    let mut analyzer = Analyzer::new();
    let mut ctx = ParseContext::new();
    for sql in statements {
        analyzer.process_query(&mut ctx, sql);
    }
    (analyzer, ctx)
}

fn columns(inventory: &Inventory, schema: &str, table: &str) -> Vec<String> {
    let mut cols: Vec<String> = inventory
        .columns(schema, table)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default();
    cols.sort();
    cols
}

#[test]
fn test_select_with_where_clause() {
    let (analyzer, _) = analyze_all(&["select col1, col2 from sales.orders where status = 'x'"]);
    assert_eq!(
        columns(analyzer.inventory(), "sales", "orders"),
        vec!["col1", "col2", "status"]
    );
}

#[test]
fn test_uppercase_select() {
    let (analyzer, _) = analyze_all(&["SELECT ID, Name FROM Sales.Customers WHERE Region = 'EU'"]);
    assert_eq!(
        columns(analyzer.inventory(), "sales", "customers"),
        vec!["id", "name", "region"]
    );
}

#[test]
fn test_insert() {
    let (analyzer, _) = analyze_all(&["insert into hr.employees (id, name) values (1,'a')"]);
    assert_eq!(
        columns(analyzer.inventory(), "hr", "employees"),
        vec!["id", "name"]
    );
}

#[test]
fn test_update_with_where_clause() {
    let (analyzer, ctx) =
        analyze_all(&["update hr.employees set name = 'a', age = 30 where id = 1"]);
    assert_eq!(
        columns(analyzer.inventory(), "hr", "employees"),
        vec!["age", "id", "name"]
    );
    assert_eq!(ctx.last_used_schema(), Some("hr"));
}

#[test]
fn test_join_records_outer_table() {
    let (analyzer, _) = analyze_all(&[
        "select o.id, o.total, c.name from sales.orders o inner join sales.customers c \
         on o.customer_id = c.id where o.total > 100",
    ]);
    let inventory = analyzer.inventory();
    assert!(inventory.contains("sales", "orders", "id"));
    assert!(inventory.contains("sales", "orders", "total"));
    assert!(inventory.contains("sales", "orders", "name"));
}

#[test]
fn test_aggregate_select_records_table() {
    let (analyzer, _) = analyze_all(&["select count(*) from sales.orders"]);
    assert!(analyzer.inventory().contains_table("sales", "orders"));
    assert!(columns(analyzer.inventory(), "sales", "orders").is_empty());
}

#[test]
fn test_failed_statements_never_reach_inventory() {
    let (analyzer, _) = analyze_all(&[
        "delete from sales.orders where id = 1",
        "select id from orders",
        "insert into sales.orders (id) select 1",
        "update sales.orders id = 1",
        "select max(total from sales.orders",
    ]);
    assert!(analyzer.inventory().is_empty());
    assert_eq!(analyzer.failures().len(), 5);
    assert_eq!(
        analyzer.failures().last_failed(),
        Some("select max(total from sales.orders")
    );
}

#[test]
fn test_failure_keeps_original_text() {
    let mut analyzer = Analyzer::new();
    let mut ctx = ParseContext::new();
    let outcome = analyzer.analyze(&mut ctx, "  CALL Refresh_All()  ");
    assert_eq!(
        outcome,
        StatementOutcome::Failed {
            raw_text: "  CALL Refresh_All()  ".to_string()
        }
    );
    assert_eq!(analyzer.failures().all_failed(), ["  CALL Refresh_All()  "]);
}

#[test]
fn test_reprocessing_is_idempotent() {
    let sql = "select a, b from s.t where c = 1";
    let (once, _) = analyze_all(&[sql]);
    let (twice, _) = analyze_all(&[sql, sql]);
    assert_eq!(once.inventory(), twice.inventory());
}

#[test]
fn test_timing_ratchet() {
    let (analyzer, _) = analyze_all(&[
        "select a from s.t; 12 ms.",
        "select b from s.t; 45 ms.",
        "select c from s.t; 3 ms.",
    ]);
    let timing = analyzer.timing();
    assert_eq!(timing.max_duration_ms(), 45);
    assert_eq!(timing.statements_at_max().len(), 2);
    assert_eq!(timing.statements_at_max()[1], "select b from s.t; 45 ms.");
    assert_eq!(timing.average_duration_ms(), Some((12.0 + 45.0 + 3.0) / 3.0));
}

#[test]
fn test_failed_statement_has_no_timing() {
    let (analyzer, _) = analyze_all(&["delete from s.t; 99 ms."]);
    assert!(analyzer.timing().is_empty());
    assert_eq!(analyzer.timing().max_duration_ms(), 0);
}

#[test]
fn test_where_columns_follow_context() {
    let mut analyzer = Analyzer::new();
    let mut ctx = ParseContext::new();

    analyzer.process_query(&mut ctx, "select a from s.first");
    analyzer.process_query(
        &mut ctx,
        "select b from s.orders where flag in (select c from s.flags where d = 1)",
    );

    // the subquery is the last table seen, so it receives the outer WHERE columns
    assert_eq!(ctx.last_used_table(), Some("flags"));
    assert!(analyzer.inventory().contains("s", "flags", "flag"));
    assert!(analyzer.inventory().contains("s", "flags", "c"));
    assert!(analyzer.inventory().contains("s", "orders", "b"));
    assert!(!analyzer.inventory().contains("s", "first", "flag"));
}

#[test]
fn test_noise_tokens_are_clipped_inside_words() {
    // "his " contains "is "
    let (analyzer, _) = analyze_all(&["select his total from s.t"]);
    assert_eq!(columns(analyzer.inventory(), "s", "t"), vec!["htotal"]);
}

#[test]
fn test_inventory_round_trip() {
    let (analyzer, _) = analyze_all(&[
        "select a, b from sales.orders",
        "insert into hr.employees (id, name) values (1, 'x')",
        "update hr.teams set lead = 'y' where id = 2",
    ]);
    let json = serde_json::to_string(analyzer.inventory()).unwrap();
    let restored: Inventory = serde_json::from_str(&json).unwrap();
    assert_eq!(&restored, analyzer.inventory());
    assert!(restored.contains("hr", "teams", "lead"));
    assert!(restored.contains("hr", "teams", "id"));
}
