//! Display formatting and chart packaging for the overview page.

use serde::Serialize;

use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{
    CategoryRevenue, LocationRevenue, MonthlyRevenue, RecordCollection, SalesTotals,
    SellerRanking, SellerStat,
};
use crate::queries::{rank_sellers, SalesQuery};

/// Human-readable magnitude: `1500000` with prefix `R$` is `"R$ 1.50mi"`.
///
/// The value is divided by 1000 while it is at least 1000, at most twice;
/// the suffix is nothing, ` mil` or `mi` accordingly.
pub fn format_magnitude(value: f64, prefix: &str) -> String {
    let mut value = value;
    for unit in ["", "mil"] {
        if value < 1000.0 {
            return if unit.is_empty() {
                format!("{} {:.2}", prefix, value)
            } else {
                format!("{} {:.2} {}", prefix, value, unit)
            };
        }
        value /= 1000.0;
    }
    format!("{} {:.2}mi", prefix, value)
}

// ---------------------------------------------------------------------------
// Chart payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Points on a map, sized by value.
    ScatterGeo,
    /// One line per series over categorical x labels.
    Line,
    Bar,
}

/// One plotted point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<(f64, f64)>,
}

impl ChartPoint {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
            series: None,
            coordinates: None,
        }
    }
}

/// An already-aggregated table ready for a chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub kind: ChartKind,
    pub value_label: String,
    pub points: Vec<ChartPoint>,
}

/// A headline number and its formatted text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: f64,
    pub display: String,
}

// ---------------------------------------------------------------------------
// DashboardView
// ---------------------------------------------------------------------------

/// Everything the overview page renders for one set of filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub revenue: Metric,
    pub sales: Metric,
    pub revenue_map: Chart,
    pub top_locations: Chart,
    pub monthly_revenue: Chart,
    pub category_revenue: Chart,
    pub top_sellers_by_revenue: Chart,
    pub top_sellers_by_sales: Chart,
}

/// Aggregate `records` and package the overview page.
///
/// `top_k` is the number of sellers in the ranking charts (2 to 10).
pub fn build_overview(records: &RecordCollection, top_k: usize) -> Result<DashboardView> {
    let conn = Connection::load(records)?;
    let query = SalesQuery::new(&conn);

    let totals = query.totals()?;
    let locations = query.revenue_by_location()?;
    let months = query.revenue_by_month()?;
    let categories = query.revenue_by_category()?;
    let sellers = query.seller_stats()?;
    let by_revenue = rank_sellers(&sellers, SellerRanking::Revenue, top_k)?;
    let by_sales = rank_sellers(&sellers, SellerRanking::SalesCount, top_k)?;

    Ok(DashboardView {
        revenue: revenue_metric(&totals),
        sales: sales_metric(&totals),
        revenue_map: revenue_map(&locations),
        top_locations: top_locations(&locations),
        monthly_revenue: monthly_revenue(&months),
        category_revenue: category_revenue(&categories),
        top_sellers_by_revenue: seller_chart(&by_revenue, SellerRanking::Revenue, top_k),
        top_sellers_by_sales: seller_chart(&by_sales, SellerRanking::SalesCount, top_k),
    })
}

fn revenue_metric(totals: &SalesTotals) -> Metric {
    Metric {
        label: "Revenue".to_string(),
        value: totals.revenue,
        display: format_magnitude(totals.revenue, config::CURRENCY_PREFIX),
    }
}

fn sales_metric(totals: &SalesTotals) -> Metric {
    let count = totals.sales as f64;
    Metric {
        label: "Sales".to_string(),
        value: count,
        display: format_magnitude(count, ""),
    }
}

fn revenue_map(locations: &[LocationRevenue]) -> Chart {
    Chart {
        title: "Revenue by location".to_string(),
        kind: ChartKind::ScatterGeo,
        value_label: "Revenue".to_string(),
        points: locations
            .iter()
            .map(|l| ChartPoint {
                coordinates: Some((l.latitude, l.longitude)),
                ..ChartPoint::new(&l.location, l.revenue)
            })
            .collect(),
    }
}

fn top_locations(locations: &[LocationRevenue]) -> Chart {
    Chart {
        title: "Top locations (revenue)".to_string(),
        kind: ChartKind::Bar,
        value_label: "Revenue".to_string(),
        points: locations
            .iter()
            .take(config::TOP_LOCATIONS)
            .map(|l| ChartPoint::new(&l.location, l.revenue))
            .collect(),
    }
}

fn monthly_revenue(months: &[MonthlyRevenue]) -> Chart {
    Chart {
        title: "Monthly revenue".to_string(),
        kind: ChartKind::Line,
        value_label: "Revenue".to_string(),
        points: months
            .iter()
            .map(|m| ChartPoint {
                series: Some(m.year.to_string()),
                ..ChartPoint::new(&m.month_name, m.revenue)
            })
            .collect(),
    }
}

fn category_revenue(categories: &[CategoryRevenue]) -> Chart {
    Chart {
        title: "Revenue by category".to_string(),
        kind: ChartKind::Bar,
        value_label: "Revenue".to_string(),
        points: categories
            .iter()
            .map(|c| ChartPoint::new(&c.category, c.revenue))
            .collect(),
    }
}

fn seller_chart(ranked: &[SellerStat], ranking: SellerRanking, top_k: usize) -> Chart {
    let (title, value_label) = match ranking {
        SellerRanking::Revenue => (format!("Top {} sellers (revenue)", top_k), "Revenue"),
        SellerRanking::SalesCount => (format!("Top {} sellers (quantity)", top_k), "Sales"),
    };
    Chart {
        title,
        kind: ChartKind::Bar,
        value_label: value_label.to_string(),
        points: ranked
            .iter()
            .map(|s| {
                let value = match ranking {
                    SellerRanking::Revenue => s.revenue,
                    SellerRanking::SalesCount => s.sales as f64,
                };
                ChartPoint::new(&s.seller, value)
            })
            .collect(),
    }
}
