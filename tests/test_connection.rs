//! Connection integration tests: loading the sales table and raw SQL execution.

mod common;

use sales_dashboard::{Connection, RecordCollection};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

#[test]
fn load_creates_one_row_per_record() {
    let conn = Connection::load(&common::sample_records()).unwrap();
    assert_eq!(conn.loaded_rows(), 10);

    let count = conn.execute_scalar("SELECT COUNT(*) FROM sales").unwrap();
    assert_eq!(count, Some(serde_json::json!(10)));
}

#[test]
fn row_ids_follow_collection_order() {
    let conn = Connection::load(&common::sample_records()).unwrap();

    let rows = conn
        .execute("SELECT row_id, product FROM sales ORDER BY row_id")
        .unwrap();
    assert_eq!(rows[0]["row_id"], 0);
    assert_eq!(rows[0]["product"], "Modelagem preditiva");
    assert_eq!(rows[9]["row_id"], 9);
    assert_eq!(rows[9]["product"], "Celular ABXY");
}

#[test]
fn dates_are_stored_as_dates() {
    let conn = Connection::load(&common::sample_records()).unwrap();

    let last = conn
        .execute_scalar("SELECT strftime(MAX(purchase_date), '%Y-%m-%d') FROM sales")
        .unwrap();
    assert_eq!(last, Some(serde_json::json!("2021-04-30")));
}

#[test]
fn reload_replaces_previous_contents() {
    let mut conn = Connection::load(&common::sample_records()).unwrap();
    let one = RecordCollection::new(vec![common::sale(
        "Livro", "livros", 10.0, (2022, 6, 1), "Alice", "SP",
    )]);

    conn.load_records(&one).unwrap();
    assert_eq!(conn.loaded_rows(), 1);
    let count = conn.execute_scalar("SELECT COUNT(*) FROM sales").unwrap();
    assert_eq!(count, Some(serde_json::json!(1)));
}

#[test]
fn empty_collection_loads_empty_table() {
    let conn = Connection::load(&RecordCollection::new(Vec::new())).unwrap();
    assert_eq!(conn.loaded_rows(), 0);
    assert!(conn.execute("SELECT * FROM sales").unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// execute / execute_into / execute_scalar
// ---------------------------------------------------------------------------

#[test]
fn execute_returns_empty_for_no_matches() {
    let conn = Connection::load(&common::sample_records()).unwrap();
    let rows = conn
        .execute("SELECT * FROM sales WHERE seller = 'Nobody'")
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn execute_into_deserializes_rows() {
    #[derive(Deserialize)]
    struct Row {
        seller: String,
        sales: i64,
    }

    let conn = Connection::load(&common::sample_records()).unwrap();
    let rows: Vec<Row> = conn
        .execute_into("SELECT seller, COUNT(*) AS sales FROM sales GROUP BY seller ORDER BY seller")
        .unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].seller, "Alice");
    assert_eq!(rows[0].sales, 3);
}

#[test]
fn execute_scalar_returns_none_for_empty_result() {
    let conn = Connection::load(&common::sample_records()).unwrap();
    let value = conn
        .execute_scalar("SELECT price FROM sales WHERE price < 0")
        .unwrap();
    assert!(value.is_none());
}

#[test]
fn invalid_sql_is_an_error() {
    let conn = Connection::load(&common::sample_records()).unwrap();
    assert!(conn.execute("SELECT nonexistent FROM sales").is_err());
}
