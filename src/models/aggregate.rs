use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LocationRevenue — revenue per purchase location, with map coordinates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRevenue {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub revenue: f64,
}

// ---------------------------------------------------------------------------
// MonthlyRevenue — revenue per calendar month
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// Last day of the month the bucket covers.
    pub month_end: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub revenue: f64,
}

// ---------------------------------------------------------------------------
// CategoryRevenue — revenue per product category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

// ---------------------------------------------------------------------------
// SellerStat — revenue and number of sales per seller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerStat {
    pub seller: String,
    pub revenue: f64,
    pub sales: i64,
}

/// Metric a seller ranking is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellerRanking {
    Revenue,
    SalesCount,
}

// ---------------------------------------------------------------------------
// SalesTotals — headline metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesTotals {
    pub revenue: f64,
    pub sales: i64,
}
