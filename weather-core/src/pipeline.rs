//! Cache-aside resolution of weather for a (postal code, date) pair.
//!
//! Lookup order is observation store, then coordinate store, then provider.
//! Whatever is fetched from the provider is persisted before it is returned.
//! Concurrent misses on the same key are not coordinated here; the stores keep
//! the first committed row and the resolver reports whatever they return.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::error::{ResolveError, Result};
use crate::model::{CoordinateRecord, ObservationRecord, Provenance, ResolutionResult};
use crate::payload;
use crate::provider::{Endpoint, ProviderClient, ProviderError};
use crate::store::{CoordinateStore, ObservationStore};

#[derive(Debug, Clone)]
pub struct Resolver {
    coordinates: Arc<dyn CoordinateStore>,
    observations: Arc<dyn ObservationStore>,
    provider: Arc<dyn ProviderClient>,
}

impl Resolver {
    pub fn new(
        coordinates: Arc<dyn CoordinateStore>,
        observations: Arc<dyn ObservationStore>,
        provider: Arc<dyn ProviderClient>,
    ) -> Self {
        Self { coordinates, observations, provider }
    }

    /// Weather for `postal_code` on `date`, from storage when known, otherwise fetched and stored.
    pub async fn resolve(&self, postal_code: &str, date: NaiveDate) -> Result<ResolutionResult> {
        let cached = self
            .observations
            .find_by_postal_code_and_date(postal_code, date)
            .await
            .map_err(|e| storage_failure("reading weather data", e.into()))?;

        if let Some(record) = cached {
            tracing::info!(postal_code, %date, "Weather data served from cache");
            return Ok(ResolutionResult::from_observation(&record, Provenance::Cache));
        }

        let location = self.coordinates_for(postal_code).await?;
        let record = self.fetch_observation(&location, date).await?;

        Ok(ResolutionResult::from_observation(&record, Provenance::Api))
    }

    async fn coordinates_for(&self, postal_code: &str) -> Result<CoordinateRecord> {
        let known = self
            .coordinates
            .find_by_postal_code(postal_code)
            .await
            .map_err(|e| storage_failure("reading coordinates", e.into()))?;

        if let Some(record) = known {
            tracing::info!(postal_code, "Coordinates served from cache");
            return Ok(record);
        }

        let candidates = self
            .provider
            .geocode(postal_code)
            .await
            .map_err(|e| provider_failure(Endpoint::Geocoding, e))?;

        let Some(first) = candidates.first() else {
            tracing::error!(postal_code, "Geocoding returned no candidates");
            return Err(ResolveError::NotFound { postal_code: postal_code.to_string() });
        };

        let record = CoordinateRecord {
            postal_code: postal_code.to_string(),
            latitude: first.latitude,
            longitude: first.longitude,
        };

        let committed = self
            .coordinates
            .save_coordinates(&record)
            .await
            .map_err(|e| storage_failure("saving coordinates", e.into()))?;

        tracing::info!(postal_code, "Coordinates fetched from provider");
        Ok(committed)
    }

    async fn fetch_observation(
        &self,
        location: &CoordinateRecord,
        date: NaiveDate,
    ) -> Result<ObservationRecord> {
        let raw = self
            .provider
            .lookup_weather(location.latitude, location.longitude)
            .await
            .map_err(|e| provider_failure(Endpoint::Weather, e))?;

        tracing::debug!(payload = %raw, "Weather payload received");

        let reading = payload::parse_reading(&raw).inspect_err(|e| {
            tracing::error!(postal_code = %location.postal_code, error = %e, "Rejected weather payload");
        })?;

        let record = ObservationRecord {
            postal_code: location.postal_code.clone(),
            date,
            temperature: reading.temperature,
            humidity: reading.humidity,
            description: reading.description,
            fetched: true,
        };

        let committed = self
            .observations
            .save_observation(&record)
            .await
            .map_err(|e| storage_failure("saving weather data", e.into()))?;

        tracing::info!(postal_code = %location.postal_code, %date, "Weather data fetched from provider");
        Ok(committed)
    }
}

fn provider_failure(endpoint: Endpoint, err: ProviderError) -> ResolveError {
    let err = ResolveError::from_provider(endpoint, err);
    tracing::error!(%endpoint, status = err.status_code(), error = ?err, "Provider call failed");
    err
}

fn storage_failure(action: &str, err: ResolveError) -> ResolveError {
    tracing::error!(error = ?err, "Database access error while {action}");
    err
}
