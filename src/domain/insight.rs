// Insight domain models
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSummary {
    pub avg_daily_distance: f64,
    pub total_distance: f64,
    pub max_distance_day: NaiveDate,
    pub min_distance_day: NaiveDate,
    pub high_util_days: Vec<NaiveDate>,
    pub low_util_days: Vec<NaiveDate>,
    pub deep_discharge_count: usize,
    pub avg_charging_per_day: f64,
    pub long_idle_days: usize,
    pub narrative: Vec<String>,
}

/// Result of the insight stage as handed to the presentation layer.
///
/// Failures here never hide the numeric series of the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsightOutcome {
    Complete(InsightSummary),
    NarrativeFailed {
        summary: InsightSummary,
        message: String,
    },
    Failed {
        message: String,
    },
}

impl InsightOutcome {
    pub fn summary(&self) -> Option<&InsightSummary> {
        match self {
            InsightOutcome::Complete(summary) => Some(summary),
            InsightOutcome::NarrativeFailed { summary, .. } => Some(summary),
            InsightOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocChange {
    pub recorded_at: NaiveDateTime,
    pub change: f64,
}

/// SOC gained while the ignition was off: either charging while parked or
/// a sensor anomaly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkedCharging {
    pub total_positive_soc_change: f64,
    pub events: Vec<SocChange>,
}
