//! Aggregations over the DuckDB `sales` table.

use chrono::{Datelike, Month, NaiveDate};
use serde::Deserialize;

use crate::config;
use crate::connection::Connection;
use crate::error::{DashboardError, Result};
use crate::models::{
    CategoryRevenue, Field, FieldKind, LocationRevenue, MonthlyRevenue, SalesTotals,
    SellerRanking, SellerStat,
};
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// SalesQuery
// ---------------------------------------------------------------------------

/// Query interface for the summary tables behind the dashboard charts.
///
/// Every method is a pure function of the collection loaded into the
/// connection. An empty table yields empty results and zero totals.
pub struct SalesQuery<'a> {
    conn: &'a Connection,
}

impl<'a> SalesQuery<'a> {
    /// Create a new `SalesQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Revenue per purchase location, highest first.
    ///
    /// Coordinates are taken from the first record seen for the location,
    /// and equal revenues keep first-appearance order.
    pub fn revenue_by_location(&self) -> Result<Vec<LocationRevenue>> {
        let sql = SqlBuilder::new(config::SALES_TABLE)
            .select(&[
                "location",
                "arg_min(lat, row_id) AS latitude",
                "arg_min(lon, row_id) AS longitude",
                "SUM(price) AS revenue",
                "MIN(row_id) AS first_seen",
            ])
            .group_by(&["location"])
            .order_by(&["revenue DESC", "first_seen ASC"])
            .build();

        self.conn.execute_into(&sql)
    }

    /// Revenue per calendar month, oldest first.
    ///
    /// Months inside the covered span that had no sales are included with
    /// zero revenue so the series has no holes.
    pub fn revenue_by_month(&self) -> Result<Vec<MonthlyRevenue>> {
        let sql = SqlBuilder::new(config::SALES_TABLE)
            .select(&[
                "strftime(last_day(purchase_date), '%Y-%m-%d') AS month_end",
                "year(purchase_date) AS year",
                "month(purchase_date) AS month",
                "monthname(purchase_date) AS month_name",
                "SUM(price) AS revenue",
            ])
            .group_by(&["month_end", "year", "month", "month_name"])
            .order_by(&["year ASC", "month ASC"])
            .build();

        let rows: Vec<MonthlyRevenue> = self.conn.execute_into(&sql)?;
        Ok(fill_month_gaps(rows))
    }

    /// Revenue per product category, highest first.
    pub fn revenue_by_category(&self) -> Result<Vec<CategoryRevenue>> {
        let sql = SqlBuilder::new(config::SALES_TABLE)
            .select(&[
                "category",
                "SUM(price) AS revenue",
                "MIN(row_id) AS first_seen",
            ])
            .group_by(&["category"])
            .order_by(&["revenue DESC", "first_seen ASC"])
            .build();

        self.conn.execute_into(&sql)
    }

    /// Revenue and number of sales per seller, in first-appearance order.
    ///
    /// Use [`rank_sellers`] to order and truncate for a chart.
    pub fn seller_stats(&self) -> Result<Vec<SellerStat>> {
        let sql = SqlBuilder::new(config::SALES_TABLE)
            .select(&[
                "seller",
                "SUM(price) AS revenue",
                "COUNT(*) AS sales",
                "MIN(row_id) AS first_seen",
            ])
            .group_by(&["seller"])
            .order_by(&["first_seen ASC"])
            .build();

        self.conn.execute_into(&sql)
    }

    /// Total revenue and number of sales.
    pub fn totals(&self) -> Result<SalesTotals> {
        let sql = SqlBuilder::new(config::SALES_TABLE)
            .select(&[
                "CAST(COALESCE(SUM(price), 0) AS DOUBLE) AS revenue",
                "COUNT(*) AS sales",
            ])
            .build();

        let rows: Vec<SalesTotals> = self.conn.execute_into(&sql)?;
        Ok(rows.into_iter().next().unwrap_or(SalesTotals {
            revenue: 0.0,
            sales: 0,
        }))
    }

    /// Sorted distinct values of a text field, as offered by a multiselect.
    pub fn distinct_values(&self, field: Field) -> Result<Vec<String>> {
        if field.kind() != FieldKind::Text {
            return Err(DashboardError::InvalidArgument(format!(
                "{} is not a text field",
                field
            )));
        }

        let expr = format!("{} AS value", field.sql_column());
        let sql = SqlBuilder::new(config::SALES_TABLE)
            .select(&[expr.as_str()])
            .distinct()
            .order_by(&["value ASC"])
            .build();

        #[derive(Deserialize)]
        struct Distinct {
            value: String,
        }

        let rows: Vec<Distinct> = self.conn.execute_into(&sql)?;
        Ok(rows.into_iter().map(|d| d.value).collect())
    }
}

// ---------------------------------------------------------------------------
// Seller ranking
// ---------------------------------------------------------------------------

/// The `k` best sellers by `ranking`, highest first.
///
/// The sort is stable: sellers with equal metrics keep their order in
/// `stats`. `k` must lie in the top-K range (2 to 10).
pub fn rank_sellers(
    stats: &[SellerStat],
    ranking: SellerRanking,
    k: usize,
) -> Result<Vec<SellerStat>> {
    if !config::TOP_K_RANGE.contains(&k) {
        return Err(DashboardError::InvalidArgument(format!(
            "top-K must be between {} and {}, got {}",
            config::TOP_K_RANGE.start(),
            config::TOP_K_RANGE.end(),
            k
        )));
    }

    let mut ranked = stats.to_vec();
    match ranking {
        SellerRanking::Revenue => {
            ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        }
        SellerRanking::SalesCount => {
            ranked.sort_by(|a, b| b.sales.cmp(&a.sales));
        }
    }
    ranked.truncate(k);
    Ok(ranked)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

/// Insert zero-revenue rows for every month missing between the first and
/// last bucket. `rows` must be in chronological order.
fn fill_month_gaps(rows: Vec<MonthlyRevenue>) -> Vec<MonthlyRevenue> {
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(first), Some(last)) => (first.month_end, last.month_end),
        _ => return rows,
    };

    let mut filled = Vec::with_capacity(rows.len());
    let mut present = rows.into_iter().peekable();
    let (mut year, mut month) = (first.year(), first.month());

    while let Some(end) = month_end(year, month) {
        if end > last {
            break;
        }
        match present.peek() {
            Some(row) if row.year == year && row.month == month => {
                if let Some(row) = present.next() {
                    filled.push(row);
                }
            }
            _ => filled.push(MonthlyRevenue {
                month_end: end,
                year,
                month,
                month_name: month_name(month),
                revenue: 0.0,
            }),
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    filled
}
