// Insight generation - scalar summaries, narrative sentences and parked-charging detection
use crate::domain::daily::DailyBucket;
use crate::domain::error::AnalyticsError;
use crate::domain::fce::FceDay;
use crate::domain::insight::{InsightSummary, ParkedCharging, SocChange};
use crate::domain::sample::CleanedSample;
use crate::infrastructure::config::{AnalysisSettings, UtilizationPolicy};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Per-day series the narrative is written from.
#[derive(Debug, Clone, Default)]
pub struct NarrativeInputs {
    pub daily_distance: BTreeMap<NaiveDate, f64>,
    pub net_soc_change: BTreeMap<NaiveDate, f64>,
    pub idle_minutes: BTreeMap<NaiveDate, usize>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn classify_utilization(
    daily: &[DailyBucket],
    policy: &UtilizationPolicy,
) -> (Vec<NaiveDate>, Vec<NaiveDate>) {
    let distances: Vec<f64> = daily.iter().map(|d| d.distance_km).collect();
    let (high_cut, low_cut) = match policy {
        UtilizationPolicy::StdDev { k } => {
            let m = mean(&distances);
            let spread = k * std_dev(&distances);
            (m + spread, m - spread)
        }
        UtilizationPolicy::Fixed { high_km, low_km } => (*high_km, *low_km),
    };

    let high = daily
        .iter()
        .filter(|d| d.distance_km > high_cut)
        .map(|d| d.date)
        .collect();
    let low = daily
        .iter()
        .filter(|d| d.distance_km < low_cut)
        .map(|d| d.date)
        .collect();
    (high, low)
}

/// Compute the numeric insight set. The narrative is left empty.
pub fn compute_summary(
    daily: &[DailyBucket],
    fce_days: &[FceDay],
    idle_minutes: &BTreeMap<NaiveDate, usize>,
    settings: &AnalysisSettings,
) -> Result<InsightSummary, AnalyticsError> {
    let (first, rest) = daily
        .split_first()
        .ok_or_else(|| AnalyticsError::InsightComputation("no daily distance data".into()))?;

    let total_distance: f64 = daily.iter().map(|d| d.distance_km).sum();
    let avg_daily_distance = total_distance / daily.len() as f64;
    if !avg_daily_distance.is_finite() {
        return Err(AnalyticsError::InsightComputation(
            "daily distance is not a finite number".into(),
        ));
    }

    // ties resolve to the earliest date
    let (mut max_day, mut min_day) = (first, first);
    for bucket in rest {
        if bucket.distance_km > max_day.distance_km {
            max_day = bucket;
        }
        if bucket.distance_km < min_day.distance_km {
            min_day = bucket;
        }
    }

    let (high_util_days, low_util_days) = classify_utilization(daily, &settings.utilization);

    let deep_discharge_count = fce_days
        .iter()
        .filter(|d| d.fce * 100.0 > settings.deep_discharge_pct)
        .count();

    let avg_charging_per_day =
        daily.iter().map(|d| d.charging_amount).sum::<f64>() / daily.len() as f64;

    let long_idle_days = idle_minutes
        .values()
        .filter(|&&minutes| minutes > settings.long_idle_minutes)
        .count();

    Ok(InsightSummary {
        avg_daily_distance,
        total_distance,
        max_distance_day: max_day.date,
        min_distance_day: min_day.date,
        high_util_days,
        low_util_days,
        deep_discharge_count,
        avg_charging_per_day,
        long_idle_days,
        narrative: Vec::new(),
    })
}

fn join_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn distance_on(inputs: &NarrativeInputs, date: NaiveDate) -> Result<f64, AnalyticsError> {
    inputs.daily_distance.get(&date).copied().ok_or_else(|| {
        AnalyticsError::InsightComputation(format!("no distance recorded for {}", date))
    })
}

/// Human-readable sentences describing the summary.
pub fn generate_narrative(
    summary: &InsightSummary,
    inputs: &NarrativeInputs,
    settings: &AnalysisSettings,
) -> Result<Vec<String>, AnalyticsError> {
    if inputs.daily_distance.is_empty() {
        return Err(AnalyticsError::InsightComputation(
            "daily distance series is empty".into(),
        ));
    }

    let mut sentences = Vec::new();

    sentences.push(format!(
        "Highest utilization was on {} with {:.2} km covered.",
        summary.max_distance_day,
        distance_on(inputs, summary.max_distance_day)?
    ));
    sentences.push(format!(
        "Lowest utilization was on {} with {:.2} km covered.",
        summary.min_distance_day,
        distance_on(inputs, summary.min_distance_day)?
    ));

    if !summary.high_util_days.is_empty() {
        sentences.push(format!(
            "{} high-utilization day(s) ran well above the {:.2} km daily average: {}.",
            summary.high_util_days.len(),
            summary.avg_daily_distance,
            join_dates(&summary.high_util_days)
        ));
    }
    if !summary.low_util_days.is_empty() {
        sentences.push(format!(
            "{} low-utilization day(s) fell well below the daily average: {}.",
            summary.low_util_days.len(),
            join_dates(&summary.low_util_days)
        ));
    }

    let abnormal: Vec<(&NaiveDate, &f64)> = inputs
        .net_soc_change
        .iter()
        .filter(|(_, net)| **net > settings.abnormal_net_charge_pct)
        .collect();
    if abnormal.is_empty() {
        sentences.push(format!(
            "Charging averaged {:.2}% per day with no abnormal charging days.",
            summary.avg_charging_per_day
        ));
    } else {
        for (date, net) in abnormal {
            sentences.push(format!(
                "Net charge gain of {:.1}% on {} points to an unusual charging pattern.",
                net, date
            ));
        }
    }

    if summary.deep_discharge_count > 0 {
        sentences.push(format!(
            "Battery discharged more than {:.0}% in a single day on {} day(s); frequent deep discharges accelerate battery wear.",
            settings.deep_discharge_pct, summary.deep_discharge_count
        ));
    }

    // first maximum wins
    let longest_idle = inputs
        .idle_minutes
        .iter()
        .fold(None, |best: Option<(&NaiveDate, &usize)>, entry| match best {
            Some(b) if b.1 >= entry.1 => Some(b),
            _ => Some(entry),
        });
    if let Some((date, minutes)) = longest_idle {
        sentences.push(format!(
            "Longest idle period was on {}: {:.1} h with the ignition off.",
            date,
            *minutes as f64 / 60.0
        ));
    }
    if summary.long_idle_days > 0 {
        sentences.push(format!(
            "{} day(s) exceeded {:.1} h of idle time.",
            summary.long_idle_days,
            settings.long_idle_minutes as f64 / 60.0
        ));
    }

    Ok(sentences)
}

/// Positive SOC changes between consecutive key-off samples.
pub fn parked_charging(series: &[CleanedSample]) -> ParkedCharging {
    let parked: Vec<&CleanedSample> = series.iter().filter(|s| !s.sample.key_on).collect();

    let events: Vec<SocChange> = parked
        .windows(2)
        .filter_map(|pair| {
            let change = pair[1].sample.soc - pair[0].sample.soc;
            (change > 0.0).then(|| SocChange {
                recorded_at: pair[1].sample.recorded_at,
                change,
            })
        })
        .collect();

    ParkedCharging {
        total_positive_soc_change: events.iter().map(|e| e.change).sum(),
        events,
    }
}
