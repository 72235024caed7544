use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::OpenWeatherClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The two provider calls the resolver makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Geocoding,
    Weather,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Geocoding => "geocoding",
            Endpoint::Weather => "weather",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One geocoding candidate.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

/// Failure of a single provider request, before any semantic interpretation.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Connection, DNS or timeout failure; the provider was never heard from.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The provider answered with a non-success HTTP status.
    #[error("provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be decoded into the expected shape.
    #[error("malformed provider response: {0}")]
    Decode(#[source] BoxError),
}

impl ProviderError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProviderError::Status { status, .. } if (400..500).contains(status))
    }
}

/// External weather/geocoding provider. Each call is a single request with no retry.
#[async_trait]
pub trait ProviderClient: Send + Sync + Debug {
    /// Candidate locations for a postal code, in provider order.
    async fn geocode(&self, postal_code: &str) -> Result<Vec<GeoPoint>, ProviderError>;

    /// Raw weather payload for a coordinate pair. No semantic validation is done here.
    async fn lookup_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<serde_json::Value, ProviderError>;
}
