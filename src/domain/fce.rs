// Full-cycle-equivalent domain models
use chrono::NaiveDate;
use serde::Serialize;

/// Display colours cycled through by consecutive 0-100% cycles.
pub const CYCLE_PALETTE: [&str; 5] = ["skyblue", "salmon", "lightgreen", "orange", "purple"];

/// Discharge and distance of one day, expressed in cycle units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FceDay {
    pub date: NaiveDate,
    pub fce: f64,
    pub distance_km: f64,
}

/// A slice of one day's discharge that belongs to a single cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FceSegment {
    pub date: NaiveDate,
    /// In `(0, 1]`.
    pub amount: f64,
    pub cycle: usize,
    pub color: &'static str,
}

impl FceSegment {
    pub fn new(date: NaiveDate, amount: f64, cycle: usize) -> Self {
        Self {
            date,
            amount,
            cycle,
            color: CYCLE_PALETTE[cycle % CYCLE_PALETTE.len()],
        }
    }
}
