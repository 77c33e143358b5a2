use serde::{Deserialize, Serialize};

/// Estimator snapshot for logging and diagnostics.
///
/// Everything a caller needs to display or record estimator health:
/// the current estimate, how much evidence backs it, and how often the
/// statistics have been restarted.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EstimatorStatus {
    /// Current best refresh rate (Hz); 0.0 until the interval is primed.
    pub frequency_hz: f64,

    /// Current cycle period estimate (ms); 0.0 until primed.
    pub interval_ms: f64,

    /// Dejittered timebase aligned with a refresh boundary, once a
    /// validation pass has succeeded.
    pub timebase: Option<f64>,

    /// Cumulative observed cycles (every timestamp that advanced the
    /// recent window).
    pub cycles_seen: u64,

    /// Samples currently held by the bounded store.
    pub stored_samples: usize,

    /// Internal statistic restarts (rate change confirmed or the fit
    /// stopped explaining history).
    pub resets: u64,

    /// True once a line fit has passed the residual drift check.
    pub validated: bool,
}

impl Default for EstimatorStatus {
    fn default() -> Self {
        EstimatorStatus {
            frequency_hz: 0.0,
            interval_ms: 0.0,
            timebase: None,
            cycles_seen: 0,
            stored_samples: 0,
            resets: 0,
            validated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_default() {
        let status = EstimatorStatus::default();
        assert_eq!(status.frequency_hz, 0.0);
        assert!(status.timebase.is_none());
        assert!(!status.validated);
        assert_eq!(status.resets, 0);
    }

    #[test]
    fn test_status_serde_roundtrip() {
        let mut status = EstimatorStatus::default();
        status.frequency_hz = 59.94;
        status.interval_ms = 1000.0 / 59.94;
        status.timebase = Some(123456.789);
        status.cycles_seen = 4200;
        status.validated = true;

        let json = serde_json::to_string(&status).expect("serialize failed");
        let restored: EstimatorStatus = serde_json::from_str(&json).expect("deserialize failed");

        assert!((restored.frequency_hz - 59.94).abs() < f64::EPSILON);
        assert_eq!(restored.timebase, Some(123456.789));
        assert_eq!(restored.cycles_seen, 4200);
        assert!(restored.validated);
    }
}
