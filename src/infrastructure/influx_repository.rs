// InfluxDB data source implementation
use crate::application::vehicle_repository::{FetchError, VehicleDataSource};
use crate::domain::manufacturer::Manufacturer;
use crate::domain::sample::{Sample, is_valid_soc};
use crate::infrastructure::config::{SourceSettings, prepare_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    host: String,
    token: String,
    database: String,
    retention_policy: String,
    query_template: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    columns: Vec<String>,
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    /// Build the repository from explicit settings. A configured
    /// `credentials_path` is read here and wins over an inline token.
    pub fn from_settings(settings: &SourceSettings) -> Result<Self> {
        let token = match &settings.credentials_path {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read credentials from {}", path.display()))?
                .trim()
                .to_string(),
            None => settings
                .token
                .clone()
                .context("source.token or source.credentials_path must be set")?,
        };

        Ok(Self {
            host: settings.host.trim_end_matches('/').to_string(),
            token,
            database: settings.database.clone(),
            retention_policy: settings.retention_policy.clone(),
            query_template: settings.query.clone(),
            client: reqwest::Client::new(),
        })
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    fn build_query(
        &self,
        manufacturer: Manufacturer,
        vehicle_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> String {
        let mut vars = HashMap::new();
        vars.insert("manufacturer".to_string(), manufacturer.slug());
        vars.insert("vehicle_id".to_string(), vehicle_id.replace('\\', "\\\\").replace('\'', "\\'"));
        vars.insert("start".to_string(), start.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        vars.insert("end".to_string(), end.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        prepare_query(&self.query_template, &vars)
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }

    /// Convert query rows into samples. Rows missing a usable time, odometer,
    /// SOC or key state are skipped, as are rows whose SOC is not a percentage.
    fn parse_samples(response: &InfluxQLResponse) -> Vec<Sample> {
        let mut samples = Vec::new();
        let mut skipped = 0usize;
        let mut out_of_range = 0usize;

        let series = response
            .results
            .iter()
            .filter_map(|r| r.series.as_ref())
            .flatten();

        for s in series {
            let column = |name: &str| s.columns.iter().position(|c| c == name);
            let (Some(time_idx), Some(odo_idx), Some(soc_idx), Some(key_idx)) =
                (column("time"), column("odometer"), column("soc"), column("key_on"))
            else {
                tracing::warn!("InfluxDB series is missing columns: {:?}", s.columns);
                continue;
            };

            for row in &s.values {
                let parsed = (
                    row.get(time_idx).and_then(parse_time),
                    row.get(odo_idx).and_then(|v| v.as_f64()),
                    row.get(soc_idx).and_then(|v| v.as_f64()),
                    row.get(key_idx).and_then(parse_key_state),
                );
                match parsed {
                    (Some(_), Some(_), Some(soc), Some(_)) if !is_valid_soc(soc) => {
                        out_of_range += 1;
                    }
                    (Some(recorded_at), Some(odometer), Some(soc), Some(key_on)) => {
                        samples.push(Sample::new(recorded_at, odometer, soc, key_on));
                    }
                    _ => skipped += 1,
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} incomplete telemetry rows", skipped);
        }
        if out_of_range > 0 {
            tracing::warn!("Skipped {} telemetry rows with SOC outside 0-100%", out_of_range);
        }
        samples
    }
}

/// RFC 3339 timestamp reduced to its local wall-clock time.
fn parse_time(value: &serde_json::Value) -> Option<NaiveDateTime> {
    let raw = value.as_str()?;
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.naive_local())
}

fn parse_key_state(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        _ => None,
    }
}

#[async_trait]
impl VehicleDataSource for InfluxRepository {
    async fn fetch(
        &self,
        manufacturer: Manufacturer,
        vehicle_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Sample>, FetchError> {
        let query = self.build_query(manufacturer, vehicle_id, start, end);
        tracing::debug!("Executing telemetry query: {}", query);

        let response = self.execute_query(&query).await?;
        let samples = Self::parse_samples(&response);

        if samples.is_empty() {
            return Err(FetchError::DataUnavailable {
                manufacturer,
                vehicle_id: vehicle_id.to_string(),
            });
        }

        tracing::debug!("Fetched {} samples for {} {}", samples.len(), manufacturer, vehicle_id);
        Ok(samples)
    }
}
