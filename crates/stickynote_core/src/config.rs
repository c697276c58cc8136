//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe the canvas viewport used for note spawn positions.
//! - Describe simulated remote latency/failure injection.
//! - Name the local snapshot key.
//!
//! # Invariants
//! - Missing fields fall back to defaults; unknown fields are rejected.
//! - `failure_rate` is always read through `RemoteSimulation::failure_rate()`,
//!   which clamps it to `[0, 1]`.

use crate::repo::snapshot_repo::DEFAULT_SNAPSHOT_KEY;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Configuration parse failure.
#[derive(Debug)]
pub struct ConfigError(serde_json::Error);

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid core config: {}", self.0)
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

/// Visible canvas size in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Artificial latency and failure injection for the simulated remote.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteSimulation {
    /// Delay applied before every remote call resolves.
    pub latency_ms: u64,
    /// Probability in `[0, 1]` that a call fails with status 500.
    #[serde(rename = "failure_rate")]
    raw_failure_rate: f64,
}

impl RemoteSimulation {
    pub fn new(latency_ms: u64, failure_rate: f64) -> Self {
        Self {
            latency_ms,
            raw_failure_rate: failure_rate,
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Failure probability clamped to `[0, 1]`; NaN reads as `0`.
    pub fn failure_rate(&self) -> f64 {
        if self.raw_failure_rate.is_nan() {
            return 0.0;
        }
        self.raw_failure_rate.clamp(0.0, 1.0)
    }
}

/// Top-level core configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub viewport: Viewport,
    /// Margin kept between spawned notes and the viewport edge.
    pub spawn_padding: f64,
    pub remote: RemoteSimulation,
    pub snapshot_key: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            spawn_padding: 20.0,
            remote: RemoteSimulation::default(),
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses a JSON config document. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError)
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, RemoteSimulation};

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.snapshot_key, "sticky-notes");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = CoreConfig::from_json_str(
            r#"{"viewport":{"width":640},"remote":{"latency_ms":250,"failure_rate":0.25}}"#,
        )
        .expect("partial config should parse");
        assert_eq!(config.viewport.width, 640.0);
        assert_eq!(config.viewport.height, 800.0);
        assert_eq!(config.remote.latency_ms, 250);
        assert_eq!(config.remote.failure_rate(), 0.25);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = CoreConfig::from_json_str(r#"{"offline_mode":true}"#)
            .expect_err("unknown fields should fail");
        assert!(err.to_string().contains("invalid core config"));
    }

    #[test]
    fn failure_rate_is_clamped() {
        assert_eq!(RemoteSimulation::new(0, 3.0).failure_rate(), 1.0);
        assert_eq!(RemoteSimulation::new(0, -1.0).failure_rate(), 0.0);
        assert_eq!(RemoteSimulation::new(0, f64::NAN).failure_rate(), 0.0);
    }
}
