use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    pub source: SourceSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub host: String,
    pub database: String,
    pub retention_policy: String,
    #[serde(default)]
    pub token: Option<String>,
    /// File holding the API token. Takes precedence over `token`.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    #[serde(default = "default_query")]
    pub query: String,
}

fn default_query() -> String {
    "SELECT odometer, soc, key_on FROM \"${manufacturer}_telemetry\" \
     WHERE chassis_number = '${vehicle_id}' AND time >= '${start}' AND time < '${end}' \
     ORDER BY time ASC"
        .to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum UtilizationPolicy {
    /// High above `mean + k·σ`, low below `mean - k·σ`.
    StdDev { k: f64 },
    Fixed { high_km: f64, low_km: f64 },
}

impl Default for UtilizationPolicy {
    fn default() -> Self {
        UtilizationPolicy::StdDev { k: 1.0 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisSettings {
    pub short_window: usize,
    pub long_window: usize,
    pub deep_discharge_pct: f64,
    pub long_idle_minutes: usize,
    pub abnormal_net_charge_pct: f64,
    pub cycle_epsilon: f64,
    pub utilization: UtilizationPolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            short_window: 7,
            long_window: 30,
            deep_discharge_pct: 80.0,
            long_idle_minutes: 720,
            abnormal_net_charge_pct: 50.0,
            cycle_epsilon: 1e-9,
            utilization: UtilizationPolicy::default(),
        }
    }
}

pub fn load_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/analytics"))
        .add_source(
            config::Environment::with_prefix("VEHICLE_ANALYTICS")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_query() {
        let mut vars = HashMap::new();
        vars.insert("manufacturer".to_string(), "euler".to_string());
        vars.insert("vehicle_id".to_string(), "MD9X123".to_string());

        let query = "SELECT * FROM \"${manufacturer}_telemetry\" WHERE chassis_number = '${vehicle_id}'";
        let result = prepare_query(query, &vars);

        assert_eq!(
            result,
            "SELECT * FROM \"euler_telemetry\" WHERE chassis_number = 'MD9X123'"
        );
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let raw = r#"
            [source]
            host = "http://localhost:8086"
            database = "fleet"
            retention_policy = "autogen"
            token = "secret"
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.analysis, AnalysisSettings::default());
        assert!(config.source.query.contains("${vehicle_id}"));
        assert!(config.source.credentials_path.is_none());
    }

    #[test]
    fn test_fixed_utilization_policy() {
        let raw = r#"
            [source]
            host = "http://localhost:8086"
            database = "fleet"
            retention_policy = "autogen"

            [analysis]
            long_idle_minutes = 600
            utilization = { policy = "fixed", high_km = 120.0, low_km = 20.0 }
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.analysis.long_idle_minutes, 600);
        assert_eq!(config.analysis.short_window, 7);
        assert_eq!(
            config.analysis.utilization,
            UtilizationPolicy::Fixed {
                high_km: 120.0,
                low_km: 20.0
            }
        );
    }
}
