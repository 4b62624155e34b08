// Sample cleaning - window filtering, odometer outlier removal and per-sample deltas
use crate::domain::sample::{CleanedSample, Sample};
use chrono::NaiveDateTime;

/// Tukey fence multiplier applied to the odometer IQR.
pub const IQR_FENCE: f64 = 1.5;

/// Sort samples by time and keep those inside the half-open `[start, end)` window.
pub fn restrict_to_window(
    mut samples: Vec<Sample>,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Sample> {
    samples.sort_by_key(|s| s.recorded_at);
    samples.retain(|s| s.recorded_at >= start && s.recorded_at < end);
    samples
}

/// Quantile of an ascending slice using linear interpolation between the
/// two nearest ranks.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let weight = pos - lo as f64;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * weight)
}

/// Lower and upper odometer fences over the whole series.
pub fn odometer_bounds(samples: &[Sample]) -> Option<(f64, f64)> {
    let mut readings: Vec<f64> = samples
        .iter()
        .map(|s| s.odometer)
        .filter(|v| v.is_finite())
        .collect();
    readings.sort_by(|a, b| a.total_cmp(b));

    let q1 = quantile(&readings, 0.25)?;
    let q3 = quantile(&readings, 0.75)?;
    let iqr = q3 - q1;

    Some((q1 - IQR_FENCE * iqr, q3 + IQR_FENCE * iqr))
}

/// Drop samples whose odometer falls outside the IQR fences, preserving order.
pub fn remove_odometer_outliers(samples: &[Sample]) -> Vec<Sample> {
    let Some((lower, upper)) = odometer_bounds(samples) else {
        return Vec::new();
    };

    let kept: Vec<Sample> = samples
        .iter()
        .filter(|s| s.odometer >= lower && s.odometer <= upper)
        .cloned()
        .collect();

    tracing::debug!(
        "Odometer fences [{:.2}, {:.2}] kept {} of {} samples",
        lower,
        upper,
        kept.len(),
        samples.len()
    );

    kept
}

/// Attach distance and SOC deltas relative to the previous sample.
pub fn derive_deltas(samples: Vec<Sample>) -> Vec<CleanedSample> {
    let mut previous: Option<(f64, f64)> = None;

    samples
        .into_iter()
        .map(|sample| {
            let (distance_covered, soc_diff) = match previous {
                Some((odometer, soc)) => ((sample.odometer - odometer).max(0.0), sample.soc - soc),
                None => (0.0, 0.0),
            };
            previous = Some((sample.odometer, sample.soc));

            CleanedSample {
                sample,
                distance_covered,
                soc_diff,
            }
        })
        .collect()
}

/// Full cleaning stage: SOC range check, odometer outlier removal, then
/// delta derivation.
pub fn clean(samples: &[Sample]) -> Vec<CleanedSample> {
    let plausible: Vec<Sample> = samples
        .iter()
        .filter(|s| s.has_valid_soc())
        .cloned()
        .collect();
    if plausible.len() < samples.len() {
        tracing::warn!(
            "Dropped {} samples with SOC outside 0-100%",
            samples.len() - plausible.len()
        );
    }

    derive_deltas(remove_odometer_outliers(&plausible))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn series(odometers: &[f64]) -> Vec<Sample> {
        odometers
            .iter()
            .enumerate()
            .map(|(i, &odo)| Sample::new(base() + Duration::minutes(i as i64), odo, 80.0, true))
            .collect()
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.75), Some(3.25));
        assert_eq!(quantile(&[5.0], 0.75), Some(5.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_removes_single_spike_and_keeps_order() {
        let mut odometers: Vec<f64> = (0..10).map(|i| 1000.0 + i as f64).collect();
        odometers.insert(6, 10_050.0);
        let samples = series(&odometers);

        let kept = remove_odometer_outliers(&samples);

        assert_eq!(kept.len(), 10);
        assert!(kept.iter().all(|s| s.odometer < 2000.0));
        assert!(kept.windows(2).all(|w| w[0].recorded_at < w[1].recorded_at));
        let expected: Vec<f64> = (0..10).map(|i| 1000.0 + i as f64).collect();
        let actual: Vec<f64> = kept.iter().map(|s| s.odometer).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_non_finite_odometer_is_dropped() {
        let samples = series(&[10.0, f64::NAN, 11.0, 12.0]);
        let kept = remove_odometer_outliers(&samples);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(clean(&[]).is_empty());
    }

    #[test]
    fn test_distance_is_never_negative() {
        let cleaned = clean(&series(&[100.0, 101.0, 100.5, 102.0, 102.0]));

        let distances: Vec<f64> = cleaned.iter().map(|c| c.distance_covered).collect();
        assert_eq!(distances, vec![0.0, 1.0, 0.0, 1.5, 0.0]);
        assert!(distances.iter().all(|d| *d >= 0.0));
    }

    #[test]
    fn test_soc_diff_is_signed() {
        let samples = vec![
            Sample::new(base(), 10.0, 50.0, true),
            Sample::new(base() + Duration::minutes(1), 10.5, 48.0, true),
            Sample::new(base() + Duration::minutes(2), 10.5, 53.0, false),
        ];

        let cleaned = clean(&samples);
        let diffs: Vec<f64> = cleaned.iter().map(|c| c.soc_diff).collect();
        assert_eq!(diffs, vec![0.0, -2.0, 5.0]);
    }

    #[test]
    fn test_corrupt_soc_does_not_reach_cycle_segmentation() {
        use crate::application::fce_segmenter::{fce_per_day, segment_cycles};

        let samples = vec![
            Sample::new(base(), 10.0, 60.0, true),
            Sample::new(base() + Duration::minutes(1), 10.1, 1e7, true),
            Sample::new(base() + Duration::minutes(2), 10.2, f64::NAN, true),
            Sample::new(base() + Duration::minutes(3), 10.3, 59.0, true),
        ];

        let cleaned = clean(&samples);
        let socs: Vec<f64> = cleaned.iter().map(|c| c.sample.soc).collect();
        assert_eq!(socs, vec![60.0, 59.0]);
        assert_eq!(cleaned[1].soc_diff, -1.0);

        let segments = segment_cycles(&fce_per_day(&cleaned), 1e-9);
        assert_eq!(segments.len(), 1);
        assert!((segments[0].amount - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_restrict_to_window_sorts_and_filters() {
        let samples = vec![
            Sample::new(base() + Duration::days(3), 3.0, 50.0, true),
            Sample::new(base(), 1.0, 50.0, true),
            Sample::new(base() + Duration::days(1), 2.0, 50.0, true),
        ];

        let kept = restrict_to_window(samples, base(), base() + Duration::days(2));
        let odometers: Vec<f64> = kept.iter().map(|s| s.odometer).collect();
        assert_eq!(odometers, vec![1.0, 2.0]);
    }

    #[test]
    fn test_window_keeps_last_second_of_end_day() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let samples = vec![
            Sample::new(day.and_hms_milli_opt(23, 59, 59, 500).unwrap(), 1.0, 50.0, true),
            Sample::new(next.and_hms_opt(0, 0, 0).unwrap(), 2.0, 50.0, true),
            Sample::new(day.and_hms_opt(0, 0, 0).unwrap(), 0.0, 50.0, true),
        ];

        let kept = restrict_to_window(
            samples,
            day.and_hms_opt(0, 0, 0).unwrap(),
            next.and_hms_opt(0, 0, 0).unwrap(),
        );
        let odometers: Vec<f64> = kept.iter().map(|s| s.odometer).collect();
        assert_eq!(odometers, vec![0.0, 1.0]);
    }
}
