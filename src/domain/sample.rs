// Telemetry sample domain models
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One telemetry reading as delivered by the data source.
///
/// `recorded_at` is naive local wall-clock time; any offset has already been
/// dropped by the source adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub recorded_at: NaiveDateTime,
    pub odometer: f64,
    pub soc: f64,
    pub key_on: bool,
}

impl Sample {
    pub fn new(recorded_at: NaiveDateTime, odometer: f64, soc: f64, key_on: bool) -> Self {
        Self {
            recorded_at,
            odometer,
            soc,
            key_on,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.recorded_at.date()
    }

    /// SOC is a finite percentage in `[SOC_MIN, SOC_MAX]`.
    pub fn has_valid_soc(&self) -> bool {
        is_valid_soc(self.soc)
    }
}

pub const SOC_MIN: f64 = 0.0;
pub const SOC_MAX: f64 = 100.0;

pub fn is_valid_soc(soc: f64) -> bool {
    (SOC_MIN..=SOC_MAX).contains(&soc)
}

/// A sample that survived outlier removal, with its deltas to the previous
/// retained sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedSample {
    #[serde(flatten)]
    pub sample: Sample,
    /// Never negative. Zero for the first sample of the series.
    pub distance_covered: f64,
    /// Signed. Zero for the first sample of the series.
    pub soc_diff: f64,
}

impl CleanedSample {
    pub fn date(&self) -> NaiveDate {
        self.sample.date()
    }
}

/// First and last timestamp seen for a vehicle, before window filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservedRange {
    pub first: NaiveDateTime,
    pub last: NaiveDateTime,
}

impl ObservedRange {
    pub fn of(samples: &[Sample]) -> Option<Self> {
        let first = samples.iter().map(|s| s.recorded_at).min()?;
        let last = samples.iter().map(|s| s.recorded_at).max()?;
        Some(Self { first, last })
    }

    pub fn label(&self) -> String {
        format!("{} to {}", self.first.date(), self.last.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_observed_range_ignores_input_order() {
        let samples = vec![
            Sample::new(at("2024-03-02 10:00:00"), 10.0, 50.0, true),
            Sample::new(at("2024-03-01 08:00:00"), 5.0, 60.0, false),
            Sample::new(at("2024-03-05 23:59:00"), 20.0, 40.0, true),
        ];

        let range = ObservedRange::of(&samples).unwrap();
        assert_eq!(range.first, at("2024-03-01 08:00:00"));
        assert_eq!(range.last, at("2024-03-05 23:59:00"));
        assert_eq!(range.label(), "2024-03-01 to 2024-03-05");
    }

    #[test]
    fn test_soc_range() {
        assert!(is_valid_soc(0.0));
        assert!(is_valid_soc(100.0));
        assert!(!is_valid_soc(-0.5));
        assert!(!is_valid_soc(100.5));
        assert!(!is_valid_soc(f64::NAN));
        assert!(!is_valid_soc(f64::INFINITY));
    }

    #[test]
    fn test_observed_range_empty() {
        assert!(ObservedRange::of(&[]).is_none());
    }
}
