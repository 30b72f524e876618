//! DuckDB connection wrapper: loads a record collection into an in-memory
//! `sales` table and runs queries against it.
//!
//! Each record keeps its position in the collection as `row_id`, so queries
//! can break ties by first appearance.

use crate::config;
use crate::error::{DashboardError, Result};
use crate::models::{Field, FieldKind, RecordCollection};
use duckdb::{types::ValueRef, Connection as DuckDbConnection, ToSql};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Wraps an in-memory DuckDB database holding one collection.
pub struct Connection {
    conn: DuckDbConnection,
    loaded_rows: usize,
}

impl Connection {
    /// Open an in-memory database and load `records` into the `sales` table.
    pub fn load(records: &RecordCollection) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        let mut this = Self {
            conn,
            loaded_rows: 0,
        };
        this.load_records(records)?;
        Ok(this)
    }

    /// Replace the contents of the `sales` table with `records`.
    ///
    /// Inserts run inside one transaction; a failed load rolls back and
    /// leaves no partial table contents behind.
    pub fn load_records(&mut self, records: &RecordCollection) -> Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} ({})",
            config::SALES_TABLE,
            table_columns_ddl()
        ))?;

        let placeholders: Vec<&str> = Field::ALL
            .iter()
            .map(|f| match f.kind() {
                FieldKind::Date => "CAST(? AS DATE)",
                _ => "?",
            })
            .collect();
        let insert_sql = format!(
            "INSERT INTO {} VALUES (?, {})",
            config::SALES_TABLE,
            placeholders.join(", ")
        );

        self.conn.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<()> {
            let mut stmt = self.conn.prepare(&insert_sql)?;
            for (position, r) in records.iter().enumerate() {
                let row_id = position as i64;
                let purchase_date = r
                    .purchase_date
                    .format(config::EXPORT_DATE_FORMAT)
                    .to_string();
                // Same order as `Field::ALL`, behind the leading row_id.
                let params: [&dyn ToSql; 13] = [
                    &row_id,
                    &r.product,
                    &r.category,
                    &r.price,
                    &r.freight,
                    &purchase_date,
                    &r.seller,
                    &r.location,
                    &r.rating,
                    &r.payment_type,
                    &r.installments,
                    &r.latitude,
                    &r.longitude,
                ];
                stmt.execute(params.as_slice())?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT")?;
                self.loaded_rows = records.len();
                tracing::debug!(rows = self.loaded_rows, "loaded sales table");
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    /// Number of records in the `sales` table.
    pub fn loaded_rows(&self) -> usize {
        self.loaded_rows
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// Automatically converts DuckDB types to `serde_json::Value`.
    pub fn execute(&self, sql: &str) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        tracing::debug!(%sql, "executing query");
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows_result = stmt.query([])?;

        // Column metadata is only available once the query has run
        let executed = rows_result.as_ref().ok_or_else(|| {
            DashboardError::InvalidArgument(format!("statement produced no result set: {}", sql))
        })?;
        let column_names: Vec<String> = executed
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let column_count = executed.column_count();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_count);
            for (i, col_name) in column_names.iter().enumerate().take(column_count) {
                let value = convert_value_ref(row.get_ref(i)?);
                map.insert(col_name.clone(), value);
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str) -> Result<Vec<T>> {
        let rows = self.execute(sql)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(
                row.into_iter().collect::<serde_json::Map<String, serde_json::Value>>(),
            );
            let item: T = serde_json::from_value(value)?;
            results.push(item);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;

        if let Some(row) = rows.next()? {
            let value = convert_value_ref(row.get_ref(0)?);
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }
}

fn table_columns_ddl() -> String {
    let mut cols = vec!["row_id BIGINT".to_string()];
    cols.extend(Field::ALL.iter().map(|f| {
        let sql_type = match f.kind() {
            FieldKind::Text => "VARCHAR",
            FieldKind::Number => "DOUBLE",
            FieldKind::Integer => "BIGINT",
            FieldKind::Date => "DATE",
        };
        format!("{} {}", f.sql_column(), sql_type)
    }));
    cols.join(", ")
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; try i64, fallback to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => serde_json::Value::String(String::from_utf8_lossy(bytes).to_string()),
        // Dates and other temporal types are formatted in SQL before they
        // reach this point.
        _ => serde_json::Value::Null,
    }
}
