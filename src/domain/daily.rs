// Per-day aggregation domain models
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// Sum of intra-day `distance_covered`.
    pub distance_km: f64,
    /// Sum of positive `soc_diff` values, in SOC percentage points.
    pub charging_amount: f64,
    pub charging_events: u32,
    /// Absent when the vehicle never had its key on that day.
    pub running: Option<RunningHours>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunningHours {
    pub daytime_hours: f64,
    pub nighttime_hours: f64,
    pub first_on: NaiveDateTime,
    pub last_on: NaiveDateTime,
    pub time_range: String,
}

impl RunningHours {
    pub fn new(
        daytime_minutes: u32,
        nighttime_minutes: u32,
        first_on: NaiveDateTime,
        last_on: NaiveDateTime,
    ) -> Self {
        let time_range = format!(
            "{}–{}",
            first_on.format("%H:%M"),
            last_on.format("%H:%M")
        );
        Self {
            // one sample per minute
            daytime_hours: daytime_minutes as f64 / 60.0,
            nighttime_hours: nighttime_minutes as f64 / 60.0,
            first_on,
            last_on,
            time_range,
        }
    }
}

/// Day-over-day utilisation derived from the maximum odometer of each day,
/// with trailing simple moving averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtilizationPoint {
    pub date: NaiveDate,
    pub utilization_km: f64,
    pub short_average: Option<f64>,
    pub long_average: Option<f64>,
}
