//! Least-squares line fit over the sample store
//!
//! The stored raw timestamps of a fixed-rate display lie on a line
//! `t = timebase + cycle * interval`. The cycle index of each sample is
//! not known directly because frames get dropped and admissions get
//! skipped, so it is inferred: the rounded ratio of consecutive smoothed
//! timestamps to the current interval estimate gives the number of true
//! cycles elapsed between admissions, robust to any pattern of gaps.
//! Ordinary least squares over (cycle, elapsed) then refines the
//! interval, and a modular residual check decides whether the fitted
//! line still explains the whole stored history.

use log::debug;

/// Accepted outcome of a refit pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    /// Refined cycle period (ms).
    pub interval_ms: f64,
    /// Absolute instant aligned with a refresh boundary.
    pub timebase: f64,
}

/// Fit a line through the stored samples and validate it against them.
///
/// `interval_ms` is the current period estimate used to infer cycle
/// counts. Returns `None` when the residual spread reaches half the
/// fitted interval (the line no longer explains history) or when the
/// system is degenerate; the caller resets in both cases.
pub fn refit(raw: &[f64], smoothed: &[f64], interval_ms: f64) -> Option<FitResult> {
    debug_assert_eq!(raw.len(), smoothed.len());
    let n = raw.len();
    if n < 2 || interval_ms <= 0.0 {
        return None;
    }

    let base = raw[0];
    let mut x = 0.0f64;
    let mut sx = 0.0f64;
    let mut sy = 0.0f64;
    let mut sxx = 0.0f64;
    let mut sxy = 0.0f64;
    for i in 0..n {
        if i > 0 {
            x += ((smoothed[i] - smoothed[i - 1]) / interval_ms).round();
        }
        let y = raw[i] - base;
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
    }

    let nf = n as f64;
    let denom = nf * sxx - sx * sx;
    if denom == 0.0 {
        return None;
    }
    let slope = (nf * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / nf;
    if slope <= 0.0 {
        return None;
    }

    // Map every residual into [-half, half) and bound the spread.
    let tb = base + intercept;
    let half = slope / 2.0;
    let mut min_off = f64::MAX;
    let mut max_off = f64::MIN;
    for &r in raw {
        let off = (r - tb + half).rem_euclid(slope) - half;
        if off < min_off {
            min_off = off;
        }
        if off > max_off {
            max_off = off;
        }
    }
    if max_off - min_off >= half {
        debug!(
            "[Fit] Residual spread {:.4}ms >= half interval {:.4}ms over {} samples",
            max_off - min_off,
            half,
            n
        );
        return None;
    }

    Some(FitResult {
        interval_ms: slope,
        timebase: tb + min_off,
    })
}
