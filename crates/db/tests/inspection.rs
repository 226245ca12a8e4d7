use assert_matches::assert_matches;
use orderscope_core::report::LookupOutcome;
use orderscope_core::CoreError;
use orderscope_db::{inspect_order, DbError, InspectOptions};
use sqlx::PgPool;

fn options(identifier: &str) -> InspectOptions {
    InspectOptions {
        identifier: identifier.to_string(),
        orders_table: None,
    }
}

#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_finds_order_by_external_id(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let report = inspect_order(&mut conn, &options("VP-90b713fd"))
        .await
        .into_result()
        .unwrap();

    assert_eq!(report.orders_table.as_deref(), Some("Order"));
    assert!(report.order_tables.iter().any(|t| t == "order_notes"));

    let Some(LookupOutcome::Found { order, .. }) = &report.outcome else {
        panic!("order should be found, got {:?}", report.outcome);
    };
    let names: Vec<&str> = order.fields().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![
            "id",
            "external_id",
            "status",
            "amount",
            "metadata",
            "customer_id",
            "processed_at"
        ]
    );
    assert_eq!(order.get("id"), Some(Some("1")));
    assert_eq!(order.get("amount"), Some(Some("19.90")));
    assert_eq!(order.get("metadata"), Some(Some("{\"source\": \"web\"}")));
    assert_eq!(order.get("processed_at"), Some(None));
}

#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_finds_order_by_numeric_id(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let report = inspect_order(&mut conn, &options("2"))
        .await
        .into_result()
        .unwrap();

    let Some(LookupOutcome::Found { order, .. }) = &report.outcome else {
        panic!("order should be found by id");
    };
    assert_eq!(order.get("external_id"), Some(Some("VP-00000002")));
}

#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_missing_order_skips_related_sweep(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let report = inspect_order(&mut conn, &options("VP-missing"))
        .await
        .into_result()
        .unwrap();

    assert_eq!(report.outcome, Some(LookupOutcome::NotFound));

    let mut out = Vec::new();
    report.render(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Order VP-missing not found!"));
    assert!(!text.contains("Checking table:"));
}

#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_related_sweep_covers_only_marked_tables(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let report = inspect_order(&mut conn, &options("VP-90b713fd"))
        .await
        .into_result()
        .unwrap();

    let Some(LookupOutcome::Found { related, .. }) = report.outcome else {
        panic!("order should be found");
    };
    let tables: Vec<&str> = related.iter().map(|s| s.table.as_str()).collect();
    assert_eq!(
        tables,
        vec!["order_errors_archive", "order_logs", "order_status_history"]
    );

    // No column references an order.
    assert_eq!(related[0].reference_column, None);

    // Matched on the order's id, newest first.
    let logs = &related[1];
    assert_eq!(logs.reference_column.as_deref(), Some("order_id"));
    let messages: Vec<&str> = logs
        .records
        .iter()
        .filter_map(|r| r.get("message").flatten())
        .collect();
    assert_eq!(messages, vec!["cancelled", "sent", "created"]);

    // The reference column holds external ids, which never equal the numeric id.
    let history = &related[2];
    assert_eq!(
        history.reference_column.as_deref(),
        Some("order_external_id")
    );
    assert!(history.records.is_empty());
}

#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_explicit_orders_table(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let opts = InspectOptions {
        identifier: "1".into(),
        orders_table: Some("order_notes".into()),
    };
    let report = inspect_order(&mut conn, &opts).await.into_result().unwrap();

    assert_eq!(report.orders_table.as_deref(), Some("order_notes"));
    let Some(LookupOutcome::Found { order, .. }) = &report.outcome else {
        panic!("note should be found");
    };
    assert_eq!(order.get("note"), Some(Some("customer asked for refund")));
}

#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_explicit_table_without_keys_is_rejected(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let opts = InspectOptions {
        identifier: "1".into(),
        orders_table: Some("order_errors_archive".into()),
    };

    assert_matches!(
        inspect_order(&mut conn, &opts).await.into_result(),
        Err(DbError::Core(CoreError::MissingKeyColumns { table })) if table == "order_errors_archive"
    );
}

#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_unknown_explicit_table_is_rejected(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let opts = InspectOptions {
        identifier: "1".into(),
        orders_table: Some("purchases".into()),
    };

    assert_matches!(
        inspect_order(&mut conn, &opts).await.into_result(),
        Err(DbError::Core(CoreError::UnknownTable(_)))
    );
}

#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_failed_key_check_keeps_discovered_columns(pool: PgPool) {
    let mut conn = pool.acquire().await.unwrap();
    let opts = InspectOptions {
        identifier: "1".into(),
        orders_table: Some("order_errors_archive".into()),
    };
    let inspection = inspect_order(&mut conn, &opts).await;

    assert_matches!(inspection.error, Some(DbError::Core(_)));
    let columns: Vec<&str> = inspection
        .report
        .columns
        .iter()
        .flatten()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(columns, vec!["archived_at", "payload"]);
    assert_eq!(inspection.report.outcome, None);
}

#[sqlx::test(migrations = false)]
async fn test_empty_schema_reports_tables_before_failing(pool: PgPool) {
    sqlx::query("CREATE TABLE customers (id BIGINT PRIMARY KEY)")
        .execute(&pool)
        .await
        .unwrap();
    let mut conn = pool.acquire().await.unwrap();

    let inspection = inspect_order(&mut conn, &options("VP-1")).await;
    assert_matches!(
        inspection.error,
        Some(DbError::Core(CoreError::NoOrdersTable))
    );

    let mut out = Vec::new();
    inspection.report.render(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Tables in database: customers\n"), "got:\n{text}");
    assert!(text.ends_with("No order-related tables found!\n"));
}

/// A role that sees `order_logs` (INSERT only) but cannot read it.
#[sqlx::test(migrations = "tests/fixtures/migrations")]
async fn test_unreadable_related_table_keeps_order(pool: PgPool) {
    let (db,): (String,) = sqlx::query_as("SELECT current_database()::text")
        .fetch_one(&pool)
        .await
        .unwrap();
    let role = orderscope_core::discovery::quote_ident(&format!("{db}_reader"));

    for stmt in [
        format!("CREATE ROLE {role} NOLOGIN"),
        format!("GRANT USAGE ON SCHEMA public TO {role}"),
        format!("GRANT SELECT ON \"Order\", order_status_history TO {role}"),
        format!("GRANT INSERT ON order_logs TO {role}"),
    ] {
        sqlx::query(&stmt).execute(&pool).await.unwrap();
    }

    let mut conn = pool.acquire().await.unwrap();
    sqlx::query(&format!("SET ROLE {role}"))
        .execute(&mut *conn)
        .await
        .unwrap();
    let inspection = inspect_order(&mut conn, &options("VP-90b713fd")).await;
    sqlx::query("RESET ROLE").execute(&mut *conn).await.unwrap();
    drop(conn);

    for stmt in [format!("DROP OWNED BY {role}"), format!("DROP ROLE {role}")] {
        sqlx::query(&stmt).execute(&pool).await.unwrap();
    }

    assert!(inspection.error.is_none(), "{:?}", inspection.error);
    let report = inspection.report;
    let failed: Vec<&str> = report.failed_sections().map(|s| s.table.as_str()).collect();
    assert_eq!(failed, vec!["order_logs"]);

    let Some(LookupOutcome::Found { order, related }) = &report.outcome else {
        panic!("order should be found, got {:?}", report.outcome);
    };
    assert_eq!(order.get("id"), Some(Some("1")));
    let logs = related.iter().find(|s| s.table == "order_logs").unwrap();
    assert!(logs
        .error
        .as_deref()
        .is_some_and(|e| e.contains("permission denied")));
    let history = related
        .iter()
        .find(|s| s.table == "order_status_history")
        .unwrap();
    assert_eq!(history.error, None);

    let mut out = Vec::new();
    report.render(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("===== ORDER DETAILS =====\nid: 1\n"), "got:\n{text}");
    assert!(text.contains("Checking table: order_logs\nFailed to read related records:"));
}
