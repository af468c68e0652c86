pub mod report;

pub use report::TextReport;

use crate::api::DEFAULT_MAX_UPLOAD_MB;
use crate::types::{parse_quality_min, DecisionThresholds, TriageConfig};
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

/// Command-line arguments for the triage server
///
/// Every flag falls back to its environment variable. Threshold values
/// are read as text so that invalid settings fall back to defaults
/// instead of aborting startup.
#[derive(Parser, Debug)]
#[command(name = "fractriage-server")]
#[command(about = "Hand and wrist radiograph triage service")]
#[command(version)]
pub struct ServerCli {
    /// Address to listen on
    #[arg(long, env = "FRACTRIAGE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Calibrated confidence at or above which the tier is YES
    #[arg(long, env = "DECISION_THRESHOLD_YES")]
    pub yes_threshold: Option<String>,

    /// Calibrated confidence at or above which the tier is Likely
    #[arg(long, env = "DECISION_THRESHOLD_LIKELY")]
    pub likely_threshold: Option<String>,

    /// Minimum overall quality score accepted
    #[arg(long, env = "QUALITY_MIN")]
    pub quality_min: Option<String>,

    /// URL of the vision assessment service
    #[arg(long, env = "VISION_ENDPOINT")]
    pub vision_endpoint: String,

    /// Bearer token for the vision assessment service
    #[arg(long, env = "VISION_API_KEY", hide_env_values = true)]
    pub vision_api_key: Option<String>,

    /// Timeout for the vision call in seconds
    #[arg(long, env = "VISION_TIMEOUT_SECS", default_value_t = 30)]
    pub vision_timeout_secs: u64,

    /// Maximum multipart body size in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB", default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    pub max_upload_mb: usize,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerCli {
    pub fn triage_config(&self) -> TriageConfig {
        TriageConfig::default()
            .with_thresholds(DecisionThresholds::from_values(
                self.yes_threshold.as_deref(),
                self.likely_threshold.as_deref(),
            ))
            .with_quality_min(parse_quality_min(self.quality_min.as_deref()))
            .with_vision_timeout(self.vision_timeout())
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision_timeout_secs.max(1))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

/// Initialises `env_logger`; `verbose` raises the level to Debug
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_QUALITY_MIN;

    fn parse(args: &[&str]) -> ServerCli {
        let mut argv = vec!["fractriage-server", "--vision-endpoint", "http://vision.test/assess"];
        argv.extend_from_slice(args);
        ServerCli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_build_config() {
        let cli = parse(&[
            "--yes-threshold",
            "0.8",
            "--likely-threshold",
            "0.5",
            "--quality-min",
            "0.3",
            "--vision-timeout-secs",
            "12",
        ]);
        let config = cli.triage_config();
        assert_eq!(config.thresholds.yes(), 0.8);
        assert_eq!(config.thresholds.likely(), 0.5);
        assert_eq!(config.quality_min, 0.3);
        assert_eq!(config.vision_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cli = parse(&["--yes-threshold", "high", "--quality-min", "2"]);
        let config = cli.triage_config();
        assert_eq!(config.thresholds, DecisionThresholds::default());
        assert_eq!(config.quality_min, DEFAULT_QUALITY_MIN);
    }

    #[test]
    fn test_upload_limit_in_bytes() {
        let cli = parse(&["--max-upload-mb", "2"]);
        assert_eq!(cli.max_upload_bytes(), 2 * 1024 * 1024);
    }
}
