use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use energy_client::analytics::{SegmentFilter, DEFAULT_FLAT_RATE_PER_KWH};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct InputsConfig {
    pub usage_csv: PathBuf,
    pub prices_json: PathBuf,
    pub events_json: PathBuf,
    #[serde(default = "default_segment_column")]
    pub segment_column: String,
    /// Single-byte field delimiter for the usage file (`|` for .dat exports).
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TariffConfig {
    #[serde(default = "default_flat_rate")]
    pub flat_rate_per_kwh: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Segments selected when a request does not name any. `None` selects all.
    pub segments: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub inputs: InputsConfig,
    #[serde(default)]
    pub tariff: TariffConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub metrics: Option<MetricsConfig>,
}

fn default_segment_column() -> String {
    "household_type".to_string()
}

fn default_delimiter() -> char {
    ','
}

fn default_flat_rate() -> f64 {
    DEFAULT_FLAT_RATE_PER_KWH
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            flat_rate_per_kwh: default_flat_rate(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl InputsConfig {
    pub fn delimiter_byte(&self) -> anyhow::Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| anyhow::anyhow!("inputs.delimiter must be a single ASCII character"))
    }
}

impl ReportConfig {
    pub fn segment_filter(&self) -> SegmentFilter {
        match &self.segments {
            Some(segments) => SegmentFilter::only(segments.iter().cloned()),
            None => SegmentFilter::All,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| "dashboard-config.toml".to_string());
        Self::from_path(path)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        cfg.inputs.delimiter_byte()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_takes_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [inputs]
            usage_csv = "household_usage_cleaned.csv"
            prices_json = "agile_price_example.json"
            events_json = "flexibility_opportunity.json"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.inputs.segment_column, "household_type");
        assert_eq!(cfg.inputs.delimiter_byte().unwrap(), b',');
        assert_eq!(cfg.tariff.flat_rate_per_kwh, 0.20);
        assert_eq!(cfg.report.segment_filter(), SegmentFilter::All);
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:8080");
        assert!(cfg.metrics.is_none());
    }

    #[test]
    fn explicit_empty_segment_list_selects_nothing() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [inputs]
            usage_csv = "usage.dat"
            prices_json = "prices.json"
            events_json = "events.json"
            delimiter = "|"

            [tariff]
            flat_rate_per_kwh = 0.25

            [report]
            segments = []

            [metrics]
            bind_addr = "0.0.0.0:9100"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.inputs.delimiter_byte().unwrap(), b'|');
        assert_eq!(cfg.tariff.flat_rate_per_kwh, 0.25);
        assert_eq!(cfg.report.segment_filter(), SegmentFilter::only(Vec::<String>::new()));
        assert_eq!(cfg.metrics.unwrap().bind_addr, "0.0.0.0:9100");
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [inputs]
            usage_csv = "u.csv"
            prices_json = "p.json"
            events_json = "e.json"
            delimiter = "§"
            "#,
        )
        .unwrap();
        assert!(cfg.inputs.delimiter_byte().is_err());
    }
}
