use serde::{Deserialize, Serialize};

/// Estimator tunables.
///
/// Every threshold is a trade-off between responsiveness and robustness,
/// and the right values depend on the timer resolution and scheduler
/// jitter of the platform feeding the timestamps. The defaults are tuned
/// for fractional-millisecond presentation timestamps on desktop OSes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Minimum span of admitted raw time (ms) between line-fit/validation
    /// passes. Clocked by admitted timestamps, not wall time.
    pub validate_interval_ms: f64,

    /// Maximum spread (max - min, ms) of the four most recent
    /// inter-arrival deltas for a window to count as a clean run.
    pub tight_group_ms: f64,

    /// Deviation (ms) of a window's mean delta from the running mean that
    /// counts as a candidate refresh-rate change rather than jitter.
    pub change_threshold_ms: f64,

    /// Sample store capacity. On reaching it, both sequences keep every
    /// second element and the admission skip stride doubles-plus-one.
    pub max_stored_samples: usize,

    /// Rate floor (Hz). Slower inter-arrival times are treated as
    /// inactive-tab / sleep noise and never admitted.
    pub lowest_valid_hz: f64,

    /// One-time number of tight windows consumed silently after
    /// construction or reset, to let upstream timing settle.
    pub startup_skip: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            validate_interval_ms: 100.0,
            tight_group_ms: 1.0,
            change_threshold_ms: 1.0,
            max_stored_samples: 5_000_000,
            lowest_valid_hz: 35.0,
            startup_skip: 60,
        }
    }
}

impl EstimatorConfig {
    /// Inter-arrival time (ms) at the rate floor; windows averaging at or
    /// above this are rejected.
    pub fn slowest_valid_ms(&self) -> f64 {
        1000.0 / self.lowest_valid_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EstimatorConfig::default();
        assert_eq!(config.validate_interval_ms, 100.0);
        assert_eq!(config.tight_group_ms, 1.0);
        assert_eq!(config.change_threshold_ms, 1.0);
        assert_eq!(config.max_stored_samples, 5_000_000);
        assert_eq!(config.lowest_valid_hz, 35.0);
        assert_eq!(config.startup_skip, 60);
    }

    #[test]
    fn test_slowest_valid_ms() {
        let config = EstimatorConfig::default();
        // 35 Hz floor -> ~28.57ms
        assert!((config.slowest_valid_ms() - 1000.0 / 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = EstimatorConfig::default();
        config.max_stored_samples = 1024;
        config.startup_skip = 10;

        let json = serde_json::to_string(&config).expect("serialize failed");
        let restored: EstimatorConfig = serde_json::from_str(&json).expect("deserialize failed");

        assert_eq!(restored.max_stored_samples, 1024);
        assert_eq!(restored.startup_skip, 10);
        assert_eq!(restored.lowest_valid_hz, config.lowest_valid_hz);
    }
}
