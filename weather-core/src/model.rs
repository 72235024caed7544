use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Location learned for a postal code. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Weather reading for a postal code on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub postal_code: String,
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    /// `true` when the row was written after a provider fetch, `false` for pre-seeded rows.
    pub fetched: bool,
}

/// Where a [`ResolutionResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Cache,
    Api,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Cache => "cache",
            Provenance::Api => "api",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub postal_code: String,
    pub date: String,
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
    pub source: Provenance,
}

impl ResolutionResult {
    pub fn from_observation(record: &ObservationRecord, source: Provenance) -> Self {
        Self {
            postal_code: record.postal_code.clone(),
            date: record.date.to_string(),
            temperature: record.temperature,
            humidity: record.humidity,
            description: record.description.clone(),
            source,
        }
    }
}
