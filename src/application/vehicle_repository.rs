// Data source trait for vehicle telemetry access
use crate::domain::manufacturer::Manufacturer;
use crate::domain::sample::Sample;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no telemetry rows for {manufacturer} vehicle {vehicle_id}")]
    DataUnavailable {
        manufacturer: Manufacturer,
        vehicle_id: String,
    },

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

#[async_trait]
pub trait VehicleDataSource: Send + Sync {
    /// Fetch every sample recorded for a vehicle between `start` and `end`,
    /// with timestamps normalised to naive local time.
    async fn fetch(
        &self,
        manufacturer: Manufacturer,
        vehicle_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Sample>, FetchError>;
}
