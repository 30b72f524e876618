//! Sales dashboard pipeline.
//!
//! Sales records are fetched as JSON from a remote API, filtered in memory,
//! aggregated in-process via DuckDB and packaged for charts or exported as
//! CSV. Each user action runs the pipeline from scratch:
//! fetch → filter → aggregate → present/export.
//!
//! # Quick start
//!
//! ```no_run
//! use sales_dashboard::{OverviewRequest, Region, SalesDashboard};
//!
//! let dashboard = SalesDashboard::builder().build();
//!
//! let request = OverviewRequest::new(Region::Sudeste, Some(2022)).unwrap();
//! let view = dashboard.overview(&request).unwrap();
//! println!("{}", view.revenue.display);
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod present;
pub mod queries;
pub mod source;
pub mod sql_builder;

pub use connection::Connection;
pub use error::{DashboardError, Result};
pub use export::{CsvCache, CsvDownload};
pub use filter::{Constraint, FilterCriteria};
pub use models::{Field, Record, RecordCollection, Region, SourceQuery};
pub use present::{format_magnitude, DashboardView};
pub use source::RecordSource;
pub use sql_builder::SqlBuilder;

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// OverviewRequest
// ---------------------------------------------------------------------------

/// The overview page's widget state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewRequest {
    pub source: SourceQuery,
    /// Sellers to restrict to; empty means every seller.
    pub sellers: Vec<String>,
    /// Number of sellers in the ranking charts.
    pub top_k: usize,
}

impl OverviewRequest {
    pub fn new(region: Region, year: Option<i32>) -> Result<Self> {
        Ok(Self {
            source: SourceQuery::new(region, year)?,
            sellers: Vec::new(),
            top_k: config::DEFAULT_TOP_K,
        })
    }

    pub fn sellers<I, S>(mut self, sellers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sellers = sellers.into_iter().map(Into::into).collect();
        self
    }

    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// The seller multiselect as criteria: no constraint when nothing is
    /// selected.
    pub fn criteria(&self) -> Result<FilterCriteria> {
        if self.sellers.is_empty() {
            return Ok(FilterCriteria::new());
        }
        FilterCriteria::new().with(Field::Seller, Constraint::one_of(self.sellers.iter().cloned()))
    }
}

// ---------------------------------------------------------------------------
// SalesDashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`SalesDashboard`].
///
/// Use [`SalesDashboard::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](SalesDashboardBuilder::build).
pub struct SalesDashboardBuilder {
    endpoint: String,
    timeout: Duration,
}

impl Default for SalesDashboardBuilder {
    fn default() -> Self {
        Self {
            endpoint: config::DEFAULT_ENDPOINT.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl SalesDashboardBuilder {
    /// Set the URL records are fetched from.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the HTTP request timeout.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the dashboard. No request is made until the first fetch.
    pub fn build(self) -> SalesDashboard {
        SalesDashboard {
            source: RefCell::new(RecordSource::new(self.endpoint, self.timeout)),
            csv_cache: RefCell::new(CsvCache::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// SalesDashboard
// ---------------------------------------------------------------------------

/// The main entry point: one method per user action.
///
/// Nothing fetched or aggregated is kept between calls; only the last CSV
/// encoding is memoized.
pub struct SalesDashboard {
    source: RefCell<RecordSource>,
    csv_cache: RefCell<CsvCache>,
}

impl SalesDashboard {
    /// Create a new builder for configuring the dashboard.
    pub fn builder() -> SalesDashboardBuilder {
        SalesDashboardBuilder::default()
    }

    /// Fetch the records matching `query` from the API.
    pub fn fetch(&self, query: &SourceQuery) -> Result<RecordCollection> {
        self.source.borrow_mut().fetch(query)
    }

    /// Overview page: fetch by region and year, restrict to the selected
    /// sellers, aggregate and package every chart.
    pub fn overview(&self, request: &OverviewRequest) -> Result<DashboardView> {
        let criteria = request.criteria()?;
        let records = self.fetch(&request.source)?;
        let records = filter::apply(&records, &criteria, &filter::all_columns())?;
        present::build_overview(&records, request.top_k)
    }

    /// Sorted distinct values of a text field among the records `query`
    /// fetches, i.e. the options a multiselect for that field offers.
    ///
    /// Pass the overview's [`SourceQuery`] so the seller options follow the
    /// selected region and year, or [`SourceQuery::all`] for the raw table.
    pub fn options(&self, query: &SourceQuery, field: Field) -> Result<Vec<String>> {
        let records = self.fetch(query)?;
        let conn = Connection::load(&records)?;
        queries::SalesQuery::new(&conn).distinct_values(field)
    }

    /// Raw data page: every record, filtered by `criteria` and projected onto
    /// `columns`.
    pub fn raw_table(
        &self,
        criteria: &FilterCriteria,
        columns: &BTreeSet<Field>,
    ) -> Result<RecordCollection> {
        let records = self.fetch(&SourceQuery::all())?;
        filter::apply(&records, criteria, columns)
    }

    /// Package `table` as a CSV download named after `base_name`.
    ///
    /// The encoding is reused while `table` stays the same.
    pub fn download(&self, table: &RecordCollection, base_name: &str) -> Result<CsvDownload> {
        let bytes = self.csv_cache.borrow_mut().get_or_encode(table)?;
        Ok(CsvDownload {
            file_name: export::download_file_name(base_name),
            mime: config::CSV_MIME,
            bytes,
        })
    }

    /// Return the configured endpoint.
    pub fn endpoint(&self) -> String {
        self.source.borrow().endpoint.clone()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for SalesDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.csv_cache.borrow();
        write!(
            f,
            "SalesDashboard(endpoint={}, cached_csv={})",
            self.endpoint(),
            cache.cached_key().unwrap_or("none")
        )
    }
}
