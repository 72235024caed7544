//! Caller-facing error taxonomy for the resolver.

use crate::provider::{Endpoint, ProviderError};
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Discriminant of [`ResolveError`], for callers that only need to branch on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Upstream,
    UpstreamClientError,
    UpstreamReported,
    BadUpstreamPayload,
    Storage,
    Unexpected,
}

/// Every failure `Resolver::resolve` can produce. The `Display` text is safe to show to callers.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Could not find coordinates for postal code: {postal_code}")]
    NotFound { postal_code: String },

    #[error("Unable to connect to {endpoint} service. Please check your network connection.")]
    Upstream {
        endpoint: Endpoint,
        #[source]
        source: ProviderError,
    },

    #[error("{}", client_error_message(.endpoint))]
    UpstreamClientError {
        endpoint: Endpoint,
        status: u16,
        #[source]
        source: ProviderError,
    },

    #[error("OpenWeather API error: {message}")]
    UpstreamReported {
        status: u16,
        raw_code: String,
        message: String,
    },

    #[error("Unable to process {endpoint} data. Please try again later.")]
    BadUpstreamPayload { endpoint: Endpoint, reason: String },

    #[error("Error accessing the database. Please try again later.")]
    Storage(#[from] StoreError),

    #[error("An unexpected error occurred while fetching {endpoint} data. Please try again later.")]
    Unexpected {
        endpoint: Endpoint,
        #[source]
        source: ProviderError,
    },
}

fn client_error_message(endpoint: &Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Geocoding => "Invalid postal code provided.",
        Endpoint::Weather => "Invalid request to weather service. Please check your input.",
    }
}

impl ResolveError {
    /// Classify a failed provider call made against `endpoint`.
    pub fn from_provider(endpoint: Endpoint, err: ProviderError) -> Self {
        match err {
            ProviderError::Transport(_) => ResolveError::Upstream { endpoint, source: err },
            ProviderError::Status { status, .. } => {
                if err.is_client_error() {
                    ResolveError::UpstreamClientError { endpoint, status, source: err }
                } else {
                    ResolveError::Unexpected { endpoint, source: err }
                }
            }
            ProviderError::Decode(ref reason) => ResolveError::BadUpstreamPayload {
                endpoint,
                reason: reason.to_string(),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::NotFound { .. } => ErrorKind::NotFound,
            ResolveError::Upstream { .. } => ErrorKind::Upstream,
            ResolveError::UpstreamClientError { .. } => ErrorKind::UpstreamClientError,
            ResolveError::UpstreamReported { .. } => ErrorKind::UpstreamReported,
            ResolveError::BadUpstreamPayload { .. } => ErrorKind::BadUpstreamPayload,
            ResolveError::Storage(_) => ErrorKind::Storage,
            ResolveError::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// HTTP-style classification of the failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ResolveError::NotFound { .. } => 404,
            ResolveError::Upstream { .. } => 503,
            ResolveError::UpstreamClientError { status, .. } => *status,
            ResolveError::UpstreamReported { status, .. } => *status,
            ResolveError::BadUpstreamPayload { .. } => 502,
            ResolveError::Storage(_) => 500,
            ResolveError::Unexpected { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_unavailable() {
        let err = ResolveError::from_provider(
            Endpoint::Weather,
            ProviderError::Transport("connection refused".into()),
        );

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.status_code(), 503);
        assert!(err.to_string().contains("weather service"));
    }

    #[test]
    fn client_status_is_mirrored() {
        let err = ResolveError::from_provider(
            Endpoint::Geocoding,
            ProviderError::Status { status: 401, body: "Invalid API key".into() },
        );

        assert_eq!(err.kind(), ErrorKind::UpstreamClientError);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.to_string(), "Invalid postal code provided.");
    }

    #[test]
    fn server_status_is_unexpected() {
        let err = ResolveError::from_provider(
            Endpoint::Weather,
            ProviderError::Status { status: 502, body: String::new() },
        );

        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn client_range_ends_at_499() {
        let status = |status| ProviderError::Status { status, body: String::new() };

        let last_client = ResolveError::from_provider(Endpoint::Weather, status(499));
        let first_server = ResolveError::from_provider(Endpoint::Weather, status(500));

        assert_eq!(last_client.kind(), ErrorKind::UpstreamClientError);
        assert_eq!(first_server.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn undecodable_body_is_bad_payload() {
        let err = ResolveError::from_provider(
            Endpoint::Geocoding,
            ProviderError::Decode("expected value at line 1".into()),
        );

        assert_eq!(err.kind(), ErrorKind::BadUpstreamPayload);
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn reported_error_carries_provider_status() {
        let err = ResolveError::UpstreamReported {
            status: 404,
            raw_code: "404".into(),
            message: "city not found".into(),
        };

        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "OpenWeather API error: city not found");
    }
}
