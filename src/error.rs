#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Endpoint unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed response body: {0}")]
    MalformedResponse(String),

    #[error("Could not parse {field} value {value:?}: {message}")]
    DataParse {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DashboardError {
    /// Sort a transport failure into `Unreachable` (nothing answered) or
    /// `Http` (something answered, but not usefully).
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            DashboardError::Unreachable(err)
        } else {
            DashboardError::Http(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
