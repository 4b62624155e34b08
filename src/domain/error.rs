// Analytics error taxonomy
use std::fmt;
use thiserror::Error;

/// Pipeline checkpoint at which a collection was found empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Window,
    Cleaning,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch",
            Stage::Window => "time-range filtering",
            Stage::Cleaning => "outlier removal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("no data available after {stage}")]
    NoData { stage: Stage },

    #[error("failed to generate insights: {0}")]
    InsightComputation(String),

    #[error("failed to fetch telemetry: {0:#}")]
    UpstreamFetch(anyhow::Error),
}

impl AnalyticsError {
    pub fn no_data(stage: Stage) -> Self {
        Self::NoData { stage }
    }
}
