//! Interpretation of raw weather payloads.
//!
//! Validation runs in phases. The provider status is checked first, then the
//! required substructure (`main` object, non-empty `weather` array). Both
//! fail the request. Leaf values are extracted last with per-field fallbacks
//! and never fail.

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::provider::Endpoint;

pub const UNKNOWN_PROVIDER_ERROR: &str = "unknown error from weather service";
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

const SUCCESS: f64 = 200.0;
const FALLBACK_CLASSIFICATION: u16 = 500;

/// Provider-reported status, normalized from its integer, float or string form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderStatus {
    /// The code exactly as received, for diagnostics.
    pub raw: String,
    numeric: Option<f64>,
}

impl ProviderStatus {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self { raw: n.to_string(), numeric: n.as_f64() },
            Value::String(s) => Self {
                raw: s.clone(),
                numeric: s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            },
            other => Self { raw: other.to_string(), numeric: None },
        }
    }

    pub fn is_success(&self) -> bool {
        self.numeric == Some(SUCCESS)
    }

    /// The provider's own code truncated to an integer, or a generic server
    /// error when the code is not a number.
    pub fn classification(&self) -> u16 {
        self.numeric
            .map(f64::trunc)
            .filter(|n| (0.0..=f64::from(u16::MAX)).contains(n))
            .map(|n| n as u16)
            .unwrap_or(FALLBACK_CLASSIFICATION)
    }
}

/// The leaf values of a weather reading, after fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: f64,
    pub description: String,
}

/// Validate a raw weather payload and extract its reading.
pub fn parse_reading(payload: &Value) -> Result<Reading, ResolveError> {
    check_status(payload)?;
    let (main, condition) = require_structure(payload)?;
    Ok(extract_reading(main, condition))
}

fn check_status(payload: &Value) -> Result<(), ResolveError> {
    let Some(code) = payload.get("cod") else {
        return Ok(());
    };

    let status = ProviderStatus::from_value(code);
    if status.is_success() {
        return Ok(());
    }

    let message = match payload.get("message") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => UNKNOWN_PROVIDER_ERROR.to_string(),
        Some(other) => other.to_string(),
    };

    if status.numeric.is_none() {
        tracing::warn!(code = %status.raw, "Could not parse provider status code, defaulting to {FALLBACK_CLASSIFICATION}");
    }

    Err(ResolveError::UpstreamReported {
        status: status.classification(),
        raw_code: status.raw,
        message,
    })
}

fn require_structure(payload: &Value) -> Result<(&Map<String, Value>, &Value), ResolveError> {
    let main = payload.get("main").and_then(Value::as_object);
    let condition = payload
        .get("weather")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first());

    match (main, condition) {
        (Some(main), Some(condition)) => Ok((main, condition)),
        (None, _) => Err(bad_payload("missing \"main\" object")),
        (_, None) => Err(bad_payload("missing or empty \"weather\" array")),
    }
}

fn bad_payload(reason: &str) -> ResolveError {
    ResolveError::BadUpstreamPayload {
        endpoint: Endpoint::Weather,
        reason: reason.to_string(),
    }
}

fn extract_reading(main: &Map<String, Value>, condition: &Value) -> Reading {
    let temperature = number_field(main, "temp").unwrap_or_else(|| {
        tracing::warn!("Temperature data missing from weather payload");
        0.0
    });

    let humidity = number_field(main, "humidity").unwrap_or_else(|| {
        tracing::warn!("Humidity data missing from weather payload");
        0.0
    });

    let description = match condition.get("description") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => {
            tracing::warn!("Description missing from weather payload");
            UNKNOWN_DESCRIPTION.to_string()
        }
    };

    Reading { temperature, humidity, description }
}

fn number_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "cod": 200,
            "main": { "temp": 28.0, "humidity": 70 },
            "weather": [{ "description": "clear sky" }],
        })
    }

    #[test]
    fn status_forms_equivalent_to_200_are_success() {
        for code in [json!(200), json!("200"), json!("200.0"), json!(200.0)] {
            assert!(ProviderStatus::from_value(&code).is_success(), "{code} should be success");
        }
    }

    #[test]
    fn other_statuses_are_not_success() {
        for code in [json!(404), json!("401"), json!("abc"), json!(null), json!(201)] {
            assert!(!ProviderStatus::from_value(&code).is_success(), "{code} should fail");
        }
    }

    #[test]
    fn classification_uses_provider_code_or_falls_back() {
        assert_eq!(ProviderStatus::from_value(&json!("404")).classification(), 404);
        assert_eq!(ProviderStatus::from_value(&json!("429.0")).classification(), 429);
        assert_eq!(ProviderStatus::from_value(&json!(401)).classification(), 401);
        assert_eq!(ProviderStatus::from_value(&json!("oops")).classification(), 500);
        assert_eq!(ProviderStatus::from_value(&json!(200.5)).classification(), 200);
    }

    #[test]
    fn reported_non_error_codes_keep_their_value() {
        let moved = parse_reading(&json!({ "cod": "301", "message": "moved" })).unwrap_err();
        let created = parse_reading(&json!({ "cod": 201 })).unwrap_err();

        assert_eq!(moved.kind(), ErrorKind::UpstreamReported);
        assert_eq!(moved.status_code(), 301);
        assert_eq!(created.status_code(), 201);
    }

    #[test]
    fn full_payload_parses() {
        let reading = parse_reading(&full_payload()).unwrap();
        assert_eq!(
            reading,
            Reading { temperature: 28.0, humidity: 70.0, description: "clear sky".into() }
        );
    }

    #[test]
    fn string_status_200_is_accepted() {
        let mut payload = full_payload();
        payload["cod"] = json!("200.0");
        assert!(parse_reading(&payload).is_ok());
    }

    #[test]
    fn missing_status_is_accepted() {
        let mut payload = full_payload();
        payload.as_object_mut().unwrap().remove("cod");
        assert!(parse_reading(&payload).is_ok());
    }

    #[test]
    fn reported_error_uses_message_and_code() {
        let payload = json!({ "cod": "404", "message": "city not found" });
        let err = parse_reading(&payload).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamReported);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "OpenWeather API error: city not found");
    }

    #[test]
    fn reported_error_without_message_uses_generic_text() {
        let payload = json!({ "cod": "bad" });
        let err = parse_reading(&payload).unwrap_err();

        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), format!("OpenWeather API error: {UNKNOWN_PROVIDER_ERROR}"));
    }

    #[test]
    fn missing_leaves_degrade_to_defaults() {
        let payload = json!({ "cod": 200, "main": {}, "weather": [{}] });
        let reading = parse_reading(&payload).unwrap();

        assert_eq!(reading.temperature, 0.0);
        assert_eq!(reading.humidity, 0.0);
        assert_eq!(reading.description, UNKNOWN_DESCRIPTION);
    }

    #[test]
    fn numeric_strings_are_read_as_numbers() {
        let payload = json!({ "main": { "temp": "21.5", "humidity": "40" }, "weather": [{ "description": "haze" }] });
        let reading = parse_reading(&payload).unwrap();

        assert_eq!(reading.temperature, 21.5);
        assert_eq!(reading.humidity, 40.0);
    }

    #[test]
    fn missing_main_is_bad_payload() {
        let payload = json!({ "cod": 200, "weather": [{ "description": "rain" }] });
        let err = parse_reading(&payload).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadUpstreamPayload);
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn empty_weather_array_is_bad_payload() {
        let payload = json!({ "cod": 200, "main": { "temp": 1.0 }, "weather": [] });
        assert_eq!(parse_reading(&payload).unwrap_err().kind(), ErrorKind::BadUpstreamPayload);
    }

    #[test]
    fn non_object_main_is_bad_payload() {
        let payload = json!({ "main": 12, "weather": [{}] });
        assert_eq!(parse_reading(&payload).unwrap_err().kind(), ErrorKind::BadUpstreamPayload);
    }
}
