use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;

use crate::model::{CoordinateRecord, ObservationRecord};
use crate::payload::UNKNOWN_DESCRIPTION;

use super::{CoordinateStore, ObservationStore, StoreError};

/// SQLite-backed implementation of both stores.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub async fn connect(path: &Path) -> Result<Self, StoreError> {
        let newly_created = !path.exists();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(sqlx::Error::Io(e)))?;
        }

        let url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = SqlitePoolOptions::new().max_connections(5).connect(&url).await?;

        if newly_created {
            tracing::info!("Initialized new database: {}", path.display());
        } else {
            tracing::info!("Opened existing database: {}", path.display());
        }

        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database. A single connection keeps every query on the same database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS pincodes (
                id INTEGER PRIMARY KEY,
                postal_code TEXT NOT NULL UNIQUE,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS weather_data (
                id INTEGER PRIMARY KEY,
                postal_code TEXT NOT NULL,
                date TEXT NOT NULL,
                temperature REAL,
                humidity REAL,
                description TEXT,
                fetched INTEGER NOT NULL DEFAULT 0,
                UNIQUE (postal_code, date)
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn coordinate_from_row(row: &SqliteRow) -> Result<CoordinateRecord, sqlx::Error> {
    Ok(CoordinateRecord {
        postal_code: row.try_get("postal_code")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}

fn observation_from_row(row: &SqliteRow) -> Result<ObservationRecord, sqlx::Error> {
    let temperature: Option<f64> = row.try_get("temperature")?;
    let humidity: Option<f64> = row.try_get("humidity")?;
    let description: Option<String> = row.try_get("description")?;

    Ok(ObservationRecord {
        postal_code: row.try_get("postal_code")?,
        date: row.try_get("date")?,
        temperature: temperature.unwrap_or_default(),
        humidity: humidity.unwrap_or_default(),
        description: description.unwrap_or_else(|| UNKNOWN_DESCRIPTION.to_string()),
        fetched: row.try_get("fetched")?,
    })
}

#[async_trait]
impl CoordinateStore for SqliteStore {
    async fn find_by_postal_code(
        &self,
        postal_code: &str,
    ) -> Result<Option<CoordinateRecord>, StoreError> {
        let row = sqlx::query("SELECT postal_code, latitude, longitude FROM pincodes WHERE postal_code = ?")
            .bind(postal_code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(coordinate_from_row).transpose()?)
    }

    async fn save_coordinates(&self, record: &CoordinateRecord) -> Result<CoordinateRecord, StoreError> {
        let result = sqlx::query(
            "INSERT INTO pincodes (postal_code, latitude, longitude) VALUES (?, ?, ?)
             ON CONFLICT (postal_code) DO NOTHING",
        )
        .bind(&record.postal_code)
        .bind(record.latitude)
        .bind(record.longitude)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(postal_code = %record.postal_code, "Coordinates already stored, keeping existing row");
        }

        self.find_by_postal_code(&record.postal_code)
            .await?
            .ok_or_else(|| StoreError::Missing(format!("pincodes/{}", record.postal_code)))
    }
}

#[async_trait]
impl ObservationStore for SqliteStore {
    async fn find_by_postal_code_and_date(
        &self,
        postal_code: &str,
        date: NaiveDate,
    ) -> Result<Option<ObservationRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT postal_code, date, temperature, humidity, description, fetched
             FROM weather_data WHERE postal_code = ? AND date = ?",
        )
        .bind(postal_code)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(observation_from_row).transpose()?)
    }

    async fn save_observation(&self, record: &ObservationRecord) -> Result<ObservationRecord, StoreError> {
        let result = sqlx::query(
            "INSERT INTO weather_data (postal_code, date, temperature, humidity, description, fetched)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (postal_code, date) DO NOTHING",
        )
        .bind(&record.postal_code)
        .bind(record.date)
        .bind(record.temperature)
        .bind(record.humidity)
        .bind(&record.description)
        .bind(record.fetched)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(
                postal_code = %record.postal_code,
                date = %record.date,
                "Observation already stored, keeping existing row"
            );
        }

        self.find_by_postal_code_and_date(&record.postal_code, record.date)
            .await?
            .ok_or_else(|| StoreError::Missing(format!("weather_data/{}/{}", record.postal_code, record.date)))
    }
}
