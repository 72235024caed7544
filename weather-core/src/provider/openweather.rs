use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ProviderConfig;

use super::{Endpoint, GeoPoint, ProviderClient, ProviderError};

/// OpenWeatherMap client for the geocoding and current-weather endpoints.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    config: ProviderConfig,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn geocoding_url(&self, postal_code: &str) -> String {
        self.config
            .geocoding_url
            .replace("{postal_code}", &urlencoding::encode(postal_code))
            .replace("{api_key}", &urlencoding::encode(&self.config.api_key))
    }

    async fn fetch_json(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<Value, ProviderError> {
        let res = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(Box::new(e)))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| ProviderError::Transport(Box::new(e)))?;

        if !status.is_success() {
            tracing::debug!(%endpoint, status = status.as_u16(), "OpenWeather request rejected");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(Box::new(e)))
    }
}

/// The direct endpoint answers with an array, the zip endpoint with a single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeocodeBody {
    Many(Vec<GeoPoint>),
    One(GeoPoint),
}

impl From<GeocodeBody> for Vec<GeoPoint> {
    fn from(body: GeocodeBody) -> Self {
        match body {
            GeocodeBody::Many(points) => points,
            GeocodeBody::One(point) => vec![point],
        }
    }
}

#[async_trait]
impl ProviderClient for OpenWeatherClient {
    async fn geocode(&self, postal_code: &str) -> Result<Vec<GeoPoint>, ProviderError> {
        tracing::debug!(postal_code, "Requesting OpenWeather geocoding");

        let request = self.http.get(self.geocoding_url(postal_code));
        let value = self.fetch_json(Endpoint::Geocoding, request).await?;

        let body: GeocodeBody =
            serde_json::from_value(value).map_err(|e| ProviderError::Decode(Box::new(e)))?;

        Ok(body.into())
    }

    async fn lookup_weather(&self, latitude: f64, longitude: f64) -> Result<Value, ProviderError> {
        tracing::debug!(latitude, longitude, url = %self.config.weather_url, "Requesting OpenWeather current weather");

        let request = self.http.get(&self.config.weather_url).query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("appid", self.config.api_key.clone()),
            ("units", "metric".to_string()),
        ]);

        self.fetch_json(Endpoint::Weather, request).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}
