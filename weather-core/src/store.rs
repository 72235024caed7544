//! Persistence seams for coordinates and observations.
//!
//! Both stores are append-only from the resolver's point of view: records are
//! written once and read many times. A `save` that races another writer on the
//! same key keeps the first committed row and returns it.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::model::{CoordinateRecord, ObservationRecord};

pub mod sqlite;

pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row that was just written could not be read back.
    #[error("record missing after write: {0}")]
    Missing(String),
}

#[async_trait]
pub trait CoordinateStore: Send + Sync + Debug {
    async fn find_by_postal_code(
        &self,
        postal_code: &str,
    ) -> Result<Option<CoordinateRecord>, StoreError>;

    /// Persist `record`, returning the committed row for its postal code.
    async fn save_coordinates(&self, record: &CoordinateRecord) -> Result<CoordinateRecord, StoreError>;
}

#[async_trait]
pub trait ObservationStore: Send + Sync + Debug {
    async fn find_by_postal_code_and_date(
        &self,
        postal_code: &str,
        date: NaiveDate,
    ) -> Result<Option<ObservationRecord>, StoreError>;

    /// Persist `record`, returning the committed row for its (postal code, date).
    async fn save_observation(&self, record: &ObservationRecord) -> Result<ObservationRecord, StoreError>;
}
