// Analytics service - Use case for building a vehicle report
use crate::application::aggregator;
use crate::application::cleaner;
use crate::application::fce_segmenter;
use crate::application::insights::{self, NarrativeInputs};
use crate::application::vehicle_repository::{FetchError, VehicleDataSource};
use crate::domain::daily::DailyBucket;
use crate::domain::error::{AnalyticsError, Stage};
use crate::domain::fce::FceDay;
use crate::domain::insight::{InsightOutcome, InsightSummary};
use crate::domain::manufacturer::Manufacturer;
use crate::domain::report::VehicleReport;
use crate::domain::sample::{CleanedSample, ObservedRange};
use crate::infrastructure::config::AnalysisSettings;
use chrono::NaiveDateTime;
use std::sync::Arc;

#[derive(Clone)]
pub struct AnalyticsService {
    source: Arc<dyn VehicleDataSource>,
    settings: AnalysisSettings,
}

impl AnalyticsService {
    pub fn new(source: Arc<dyn VehicleDataSource>, settings: AnalysisSettings) -> Self {
        Self { source, settings }
    }

    pub async fn analyze(
        &self,
        manufacturer: Manufacturer,
        vehicle_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<VehicleReport, AnalyticsError> {
        let raw = match self.source.fetch(manufacturer, vehicle_id, start, end).await {
            Ok(rows) => rows,
            Err(FetchError::DataUnavailable { .. }) => {
                return Err(AnalyticsError::no_data(Stage::Fetch));
            }
            Err(FetchError::Upstream(e)) => {
                tracing::error!("Fetch failed for {} {}: {:#}", manufacturer, vehicle_id, e);
                return Err(AnalyticsError::UpstreamFetch(e));
            }
        };

        let observed_range =
            ObservedRange::of(&raw).ok_or(AnalyticsError::no_data(Stage::Fetch))?;
        tracing::debug!(
            "Fetched {} samples for {} {} ({})",
            raw.len(),
            manufacturer,
            vehicle_id,
            observed_range.label()
        );

        let windowed = cleaner::restrict_to_window(raw, start, end);
        if windowed.is_empty() {
            return Err(AnalyticsError::no_data(Stage::Window));
        }

        let series = cleaner::clean(&windowed);
        if series.is_empty() {
            return Err(AnalyticsError::no_data(Stage::Cleaning));
        }

        let daily = aggregator::aggregate_daily(&series);
        let average_daily_distance = aggregator::average_daily_distance(&daily).unwrap_or_default();
        let utilization = aggregator::daily_utilization(
            &series,
            self.settings.short_window,
            self.settings.long_window,
        );

        let fce_days = fce_segmenter::fce_per_day(&series);
        let fce_segments = fce_segmenter::segment_cycles(&fce_days, self.settings.cycle_epsilon);

        let parked_charging = insights::parked_charging(&series);
        let insights = self.generate_insights(&series, &daily, &fce_days);

        tracing::info!(
            "Analyzed {} {}: {} samples over {} days, {} FCE segments",
            manufacturer,
            vehicle_id,
            series.len(),
            daily.len(),
            fce_segments.len()
        );

        Ok(VehicleReport {
            manufacturer,
            vehicle_id: vehicle_id.to_string(),
            window_start: start,
            window_end: end,
            observed_range,
            samples: series,
            daily,
            average_daily_distance,
            utilization,
            fce_days,
            fce_segments,
            parked_charging,
            insights,
        })
    }

    fn generate_insights(
        &self,
        series: &[CleanedSample],
        daily: &[DailyBucket],
        fce_days: &[FceDay],
    ) -> InsightOutcome {
        let inputs = NarrativeInputs {
            daily_distance: daily.iter().map(|d| (d.date, d.distance_km)).collect(),
            net_soc_change: aggregator::daily_net_soc_change(series),
            idle_minutes: aggregator::daily_idle_minutes(series),
        };

        Self::resolve_insights(daily, fce_days, &inputs, &self.settings)
    }

    /// Summary then narrative. A failed summary fails the whole insight
    /// stage; a failed narrative keeps the summary.
    fn resolve_insights(
        daily: &[DailyBucket],
        fce_days: &[FceDay],
        inputs: &NarrativeInputs,
        settings: &AnalysisSettings,
    ) -> InsightOutcome {
        let summary =
            match insights::compute_summary(daily, fce_days, &inputs.idle_minutes, settings) {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::warn!("{}", e);
                    return InsightOutcome::Failed {
                        message: e.to_string(),
                    };
                }
            };

        match insights::generate_narrative(&summary, inputs, settings) {
            Ok(narrative) => InsightOutcome::Complete(InsightSummary { narrative, ..summary }),
            Err(e) => {
                tracing::warn!("{}", e);
                InsightOutcome::NarrativeFailed {
                    summary,
                    message: e.to_string(),
                }
            }
        }
    }
}
