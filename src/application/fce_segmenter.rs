// Full-cycle-equivalent segmentation
//
// Daily SOC discharge is converted into cycle units (100 percentage points of
// discharge = 1 FCE) and allocated to consecutive 0-100% cycles. A day whose
// discharge completes a cycle is split across the cycle boundary.
use crate::domain::fce::{FceDay, FceSegment};
use crate::domain::sample::CleanedSample;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Per-day discharge in cycle units and floored odometer distance.
///
/// Only consecutive samples within the same day contribute.
pub fn fce_per_day(series: &[CleanedSample]) -> Vec<FceDay> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&CleanedSample>> = BTreeMap::new();
    for sample in series {
        by_day.entry(sample.date()).or_default().push(sample);
    }

    by_day
        .into_iter()
        .map(|(date, samples)| {
            let mut discharge = 0.0;
            let mut distance_km = 0.0;
            for pair in samples.windows(2) {
                let (prev, curr) = (&pair[0].sample, &pair[1].sample);
                discharge += (prev.soc - curr.soc).max(0.0);
                distance_km += (curr.odometer - prev.odometer).max(0.0);
            }

            FceDay {
                date,
                fce: discharge / 100.0,
                distance_km,
            }
        })
        .collect()
}

/// Position inside the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleState {
    /// In `[0, 1)`.
    pub cumulative_fraction: f64,
    pub cycle_index: usize,
}

impl CycleState {
    /// Allocate one day's discharge, returning the advanced state and the
    /// segments emitted for that day.
    pub fn allocate(self, date: NaiveDate, fce: f64, epsilon: f64) -> (Self, Vec<FceSegment>) {
        let mut state = self;
        let mut remaining = fce;
        let mut segments = Vec::new();

        while remaining > epsilon {
            let needed = 1.0 - state.cumulative_fraction;

            if remaining < needed - epsilon {
                segments.push(FceSegment::new(date, remaining, state.cycle_index));
                state.cumulative_fraction += remaining;
                break;
            }

            let part = needed.min(remaining);
            segments.push(FceSegment::new(date, part, state.cycle_index));
            remaining -= part;
            state = CycleState {
                cumulative_fraction: 0.0,
                cycle_index: state.cycle_index + 1,
            };
        }

        (state, segments)
    }
}

/// Walk the days in order and split their discharge into cycle segments.
pub fn segment_cycles(days: &[FceDay], epsilon: f64) -> Vec<FceSegment> {
    let (state, segments) = days.iter().fold(
        (CycleState::default(), Vec::new()),
        |(state, mut segments), day| {
            let (next, emitted) = state.allocate(day.date, day.fce, epsilon);
            segments.extend(emitted);
            (next, segments)
        },
    );

    tracing::debug!(
        "Segmented {} days into {} FCE segments ending in cycle {} at {:.3}",
        days.len(),
        segments.len(),
        state.cycle_index,
        state.cumulative_fraction
    );

    segments
}
