use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Region — server-side region filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Region {
    /// The whole country; sends an empty `regiao`.
    #[default]
    Brasil,
    CentroOeste,
    Nordeste,
    Norte,
    Sudeste,
    Sul,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::Brasil,
        Region::CentroOeste,
        Region::Nordeste,
        Region::Norte,
        Region::Sudeste,
        Region::Sul,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Region::Brasil => "Brasil",
            Region::CentroOeste => "Centro-Oeste",
            Region::Nordeste => "Nordeste",
            Region::Norte => "Norte",
            Region::Sudeste => "Sudeste",
            Region::Sul => "Sul",
        }
    }

    /// Value of the `regiao` query parameter.
    pub fn query_value(self) -> String {
        match self {
            Region::Brasil => String::new(),
            other => other.label().to_lowercase(),
        }
    }
}

impl FromStr for Region {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::InvalidArgument(format!("unknown region: {}", s)))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SourceQuery — what to ask the API for
// ---------------------------------------------------------------------------

/// Server-side constraints of one fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceQuery {
    pub region: Region,
    /// `None` means every period.
    pub year: Option<i32>,
}

impl SourceQuery {
    /// Every record, unconstrained.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(region: Region, year: Option<i32>) -> Result<Self> {
        if let Some(y) = year {
            if !config::YEAR_RANGE.contains(&y) {
                return Err(DashboardError::InvalidArgument(format!(
                    "year {} outside {}..={}",
                    y,
                    config::YEAR_RANGE.start(),
                    config::YEAR_RANGE.end()
                )));
            }
        }
        Ok(Self { region, year })
    }

    /// The `(name, value)` query pairs sent to the endpoint.
    pub fn params(&self) -> [(&'static str, String); 2] {
        [
            ("regiao", self.region.query_value()),
            (
                "ano",
                self.year.map(|y| y.to_string()).unwrap_or_default(),
            ),
        ]
    }
}
