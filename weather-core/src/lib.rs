//! Core library for postal-code weather lookups.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider client behind the [`ProviderClient`] trait
//! - Coordinate and observation stores (SQLite)
//! - The cache-aside [`Resolver`] and its error taxonomy
//!
//! It is used by `weather-cli` and `weather-server`.

pub mod config;
pub mod error;
pub mod model;
pub mod payload;
pub mod pipeline;
pub mod provider;
pub mod store;

use std::sync::Arc;

pub use config::{Config, ProviderConfig};
pub use error::{ErrorKind, ResolveError};
pub use model::{CoordinateRecord, ObservationRecord, Provenance, ResolutionResult};
pub use pipeline::Resolver;
pub use provider::{OpenWeatherClient, ProviderClient};
pub use store::{CoordinateStore, ObservationStore, SqliteStore};

/// Wire the SQLite store and OpenWeather client into a resolver.
pub fn resolver_from_parts(store: SqliteStore, provider: ProviderConfig) -> Resolver {
    let store = Arc::new(store);
    Resolver::new(store.clone(), store, Arc::new(OpenWeatherClient::new(provider)))
}
