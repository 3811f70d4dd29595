//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::engine::baseline::BaselineMode;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Directory report documents are written into
    pub report_dir: PathBuf,

    /// Baseline strategy: empirical (default) or calibrated
    pub baseline_mode: BaselineMode,

    /// Optional modulus-list override, applied at engine construction only
    pub moduli: Option<Vec<u64>>,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            report_dir: env::var("REPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./reports")),

            baseline_mode: match env::var("BASELINE_MODE").as_deref() {
                Ok("calibrated") => BaselineMode::Calibrated,
                _ => BaselineMode::Empirical,
            },

            moduli: env::var("MODULI").ok().and_then(|raw| parse_moduli(&raw)),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Parse a comma-separated modulus list; None if any entry is malformed.
fn parse_moduli(raw: &str) -> Option<Vec<u64>> {
    let parsed: Result<Vec<u64>, _> = raw
        .split(',')
        .map(|s| s.trim().parse::<u64>())
        .collect();
    parsed.ok().filter(|v| !v.is_empty())
}
