// Daily aggregation - distance, charging, running hours and utilisation trends
use crate::domain::daily::{DailyBucket, RunningHours, UtilizationPoint};
use crate::domain::sample::CleanedSample;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

/// Hours `[DAYTIME_START_HOUR, 24)` count as daytime, the rest as nighttime.
pub const DAYTIME_START_HOUR: u32 = 12;

#[derive(Default)]
struct DayAccumulator {
    distance_km: f64,
    charging_amount: f64,
    charging_events: u32,
    daytime_minutes: u32,
    nighttime_minutes: u32,
    first_on: Option<NaiveDateTime>,
    last_on: Option<NaiveDateTime>,
}

impl DayAccumulator {
    fn add(&mut self, sample: &CleanedSample) {
        self.distance_km += sample.distance_covered;

        if sample.soc_diff > 0.0 {
            self.charging_amount += sample.soc_diff;
            self.charging_events += 1;
        }

        if sample.sample.key_on {
            let at = sample.sample.recorded_at;
            if at.hour() >= DAYTIME_START_HOUR {
                self.daytime_minutes += 1;
            } else {
                self.nighttime_minutes += 1;
            }
            self.first_on = Some(self.first_on.map_or(at, |t| t.min(at)));
            self.last_on = Some(self.last_on.map_or(at, |t| t.max(at)));
        }
    }

    fn finish(self, date: NaiveDate) -> DailyBucket {
        let running = match (self.first_on, self.last_on) {
            (Some(first), Some(last)) => Some(RunningHours::new(
                self.daytime_minutes,
                self.nighttime_minutes,
                first,
                last,
            )),
            _ => None,
        };

        DailyBucket {
            date,
            distance_km: self.distance_km,
            charging_amount: self.charging_amount,
            charging_events: self.charging_events,
            running,
        }
    }
}

/// Bucket the cleaned series by calendar date, in date order.
pub fn aggregate_daily(series: &[CleanedSample]) -> Vec<DailyBucket> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for sample in series {
        days.entry(sample.date()).or_default().add(sample);
    }

    days.into_iter()
        .map(|(date, acc)| acc.finish(date))
        .collect()
}

/// Mean of the daily distances, `None` for an empty slice.
pub fn average_daily_distance(daily: &[DailyBucket]) -> Option<f64> {
    if daily.is_empty() {
        return None;
    }
    Some(daily.iter().map(|d| d.distance_km).sum::<f64>() / daily.len() as f64)
}

/// Trailing simple moving average; positions before the first full window
/// have no value.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut averages = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            averages.push(Some(sum / window as f64));
        } else {
            averages.push(None);
        }
    }
    averages
}

/// Day-over-day difference of each day's maximum odometer, with trailing
/// averages over `short_window` and `long_window` days.
pub fn daily_utilization(
    series: &[CleanedSample],
    short_window: usize,
    long_window: usize,
) -> Vec<UtilizationPoint> {
    let mut max_odometer: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for sample in series {
        let entry = max_odometer
            .entry(sample.date())
            .or_insert(sample.sample.odometer);
        *entry = entry.max(sample.sample.odometer);
    }

    let dates: Vec<NaiveDate> = max_odometer.keys().copied().collect();
    let maxima: Vec<f64> = max_odometer.into_values().collect();
    let utilization: Vec<f64> = maxima
        .iter()
        .enumerate()
        .map(|(i, max)| if i == 0 { 0.0 } else { max - maxima[i - 1] })
        .collect();

    let short = moving_average(&utilization, short_window);
    let long = moving_average(&utilization, long_window);

    dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| UtilizationPoint {
            date,
            utilization_km: utilization[i],
            short_average: short[i],
            long_average: long[i],
        })
        .collect()
}

/// Net SOC change per day (sum of signed diffs).
pub fn daily_net_soc_change(series: &[CleanedSample]) -> BTreeMap<NaiveDate, f64> {
    let mut net = BTreeMap::new();
    for sample in series {
        *net.entry(sample.date()).or_insert(0.0) += sample.soc_diff;
    }
    net
}

/// Key-off sample count per day; days without any key-off sample are absent.
pub fn daily_idle_minutes(series: &[CleanedSample]) -> BTreeMap<NaiveDate, usize> {
    let mut idle = BTreeMap::new();
    for sample in series.iter().filter(|s| !s.sample.key_on) {
        *idle.entry(sample.date()).or_insert(0) += 1;
    }
    idle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cleaner::derive_deltas;
    use crate::domain::sample::Sample;
    use chrono::Duration;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_distance_and_charging_per_day() {
        let series = derive_deltas(vec![
            Sample::new(at(1, 9, 0), 100.0, 60.0, true),
            Sample::new(at(1, 9, 1), 102.0, 58.0, true),
            Sample::new(at(1, 9, 2), 103.5, 61.0, false),
            Sample::new(at(1, 9, 3), 103.5, 64.0, false),
            Sample::new(at(2, 7, 0), 110.0, 64.0, true),
            Sample::new(at(2, 7, 1), 112.0, 50.0, true),
        ]);

        let daily = aggregate_daily(&series);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, day(1));
        assert_eq!(daily[0].distance_km, 3.5);
        assert_eq!(daily[0].charging_amount, 6.0);
        assert_eq!(daily[0].charging_events, 2);
        // the overnight gap counts towards the first sample of day 2
        assert_eq!(daily[1].distance_km, 8.5);
        assert_eq!(daily[1].charging_amount, 0.0);
        assert_eq!(daily[1].charging_events, 0);
    }

    #[test]
    fn test_day_night_split_covers_running_time() {
        let start = at(3, 8, 0);
        let samples: Vec<Sample> = (0..=720)
            .map(|m| Sample::new(start + Duration::minutes(m), 500.0, 70.0, true))
            .collect();

        let daily = aggregate_daily(&derive_deltas(samples));
        let running = daily[0].running.as_ref().unwrap();

        assert_eq!(running.nighttime_hours, 4.0);
        assert_eq!(running.daytime_hours, 481.0 / 60.0);
        let total = running.daytime_hours + running.nighttime_hours;
        assert!((total - 12.0).abs() <= 1.0 / 60.0 + 1e-12);
        assert_eq!(running.time_range, "08:00–20:00");
    }

    #[test]
    fn test_day_without_key_on_has_no_running_hours() {
        let series = derive_deltas(vec![
            Sample::new(at(4, 1, 0), 10.0, 40.0, false),
            Sample::new(at(4, 1, 1), 10.0, 41.0, false),
        ]);

        let daily = aggregate_daily(&series);
        assert!(daily[0].running.is_none());
    }

    #[test]
    fn test_moving_average_windows() {
        let values: Vec<f64> = (0..35).map(|i| i as f64).collect();

        let short = moving_average(&values, 7);
        let long = moving_average(&values, 30);

        assert!(short[..6].iter().all(Option::is_none));
        assert_eq!(short[6], Some(3.0));
        assert_eq!(short[34], Some(31.0));
        assert!(long[..29].iter().all(Option::is_none));
        assert_eq!(long[29], Some(14.5));
        assert_eq!(long[34], Some(19.5));
    }

    #[test]
    fn test_moving_average_zero_window() {
        assert_eq!(moving_average(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_daily_utilization_uses_max_odometer() {
        let series = derive_deltas(vec![
            Sample::new(at(1, 10, 0), 100.0, 60.0, true),
            Sample::new(at(1, 18, 0), 130.0, 60.0, true),
            Sample::new(at(2, 10, 0), 131.0, 60.0, true),
            Sample::new(at(2, 18, 0), 175.0, 60.0, true),
            Sample::new(at(3, 18, 0), 180.0, 60.0, true),
        ]);

        let points = daily_utilization(&series, 2, 3);
        let utilization: Vec<f64> = points.iter().map(|p| p.utilization_km).collect();

        assert_eq!(utilization, vec![0.0, 45.0, 5.0]);
        assert_eq!(points[0].short_average, None);
        assert_eq!(points[1].short_average, Some(22.5));
        assert_eq!(points[2].long_average, Some(50.0 / 3.0));
    }

    #[test]
    fn test_idle_minutes_and_net_soc() {
        let series = derive_deltas(vec![
            Sample::new(at(1, 0, 0), 1.0, 50.0, false),
            Sample::new(at(1, 0, 1), 1.0, 55.0, false),
            Sample::new(at(1, 9, 0), 1.0, 52.0, true),
            Sample::new(at(2, 9, 0), 2.0, 40.0, true),
        ]);

        let idle = daily_idle_minutes(&series);
        assert_eq!(idle.get(&day(1)), Some(&2));
        assert_eq!(idle.get(&day(2)), None);

        let net = daily_net_soc_change(&series);
        assert_eq!(net[&day(1)], 2.0);
        assert_eq!(net[&day(2)], -12.0);
    }

    #[test]
    fn test_average_daily_distance() {
        assert_eq!(average_daily_distance(&[]), None);
    }
}
