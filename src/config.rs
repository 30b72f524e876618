use std::ops::RangeInclusive;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://labdados.com/produtos";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Years the API holds data for; the year slider is bounded by these.
pub const YEAR_RANGE: RangeInclusive<i32> = 2020..=2023;

/// Bounds of the "how many sellers" input on the sellers tab.
pub const TOP_K_RANGE: RangeInclusive<usize> = 2..=10;
pub const DEFAULT_TOP_K: usize = 5;

/// Number of locations shown in the "top locations" bar chart.
pub const TOP_LOCATIONS: usize = 5;

/// Currency token prepended to revenue metrics.
pub const CURRENCY_PREFIX: &str = "R$";

pub const CSV_MIME: &str = "text/csv";
pub const DEFAULT_EXPORT_NAME: &str = "dados";

/// Wire format of `Data da Compra`.
pub const WIRE_DATE_FORMAT: &str = "%d/%m/%Y";
/// Format dates are written in when exported.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Name of the in-memory DuckDB table records are loaded into.
pub const SALES_TABLE: &str = "sales";
