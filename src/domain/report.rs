// Vehicle report domain model
use super::daily::{DailyBucket, UtilizationPoint};
use super::fce::{FceDay, FceSegment};
use super::insight::{InsightOutcome, ParkedCharging};
use super::manufacturer::Manufacturer;
use super::sample::{CleanedSample, ObservedRange};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Everything one analysis run produces for a single vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleReport {
    pub manufacturer: Manufacturer,
    pub vehicle_id: String,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub observed_range: ObservedRange,
    pub samples: Vec<CleanedSample>,
    pub daily: Vec<DailyBucket>,
    pub average_daily_distance: f64,
    pub utilization: Vec<UtilizationPoint>,
    pub fce_days: Vec<FceDay>,
    pub fce_segments: Vec<FceSegment>,
    pub parked_charging: ParkedCharging,
    pub insights: InsightOutcome,
}

impl VehicleReport {
    pub fn title(&self) -> String {
        format!(
            "{} {} ({} until {})",
            self.manufacturer,
            self.vehicle_id,
            self.window_start,
            self.window_end
        )
    }
}
