//! Refresh-rate estimator core
//!
//! This is the state machine tying the pieces together. Each raw
//! presentation timestamp flows strictly forward:
//!
//! 1. **Grouping filter** - the 5-slot window admits only clean runs
//!    (four consecutive deltas with sub-threshold spread).
//! 2. **Change/settle tracker** - skip gates, the low-rate floor, and a
//!    consecutive-change counter that tells a sustained refresh-rate
//!    switch apart from jitter. Counting consecutive admissions rather
//!    than wall time keeps the detector immune to dropped-frame gaps.
//! 3. **Bounded sample store** - admitted windows are archived for the
//!    line fit, with lockstep downsampling once capacity is hit.
//! 4. **Periodic validator** - every `validate_interval_ms` of admitted
//!    raw time, an iterative least-squares fit refines the interval and
//!    the timebase, and a modular residual check confirms the fit still
//!    explains the stored history. Excessive drift or a confirmed rate
//!    change resets all statistics; a reset is how the estimator adapts,
//!    not a failure.
//!
//! Anomalies never produce errors: implausible samples are silently
//! dropped and everything else is handled by reset. Accessors return
//! explicit no-estimate sentinels (0 Hz, `None`) until enough consistent
//! data has been observed.

use log::debug;

use crate::config::EstimatorConfig;
use crate::fit;
use crate::status::EstimatorStatus;
use crate::store::SampleStore;
use crate::window::RecentWindow;

/// Running-mean samples required before change detection engages.
const CHANGE_MIN_SAMPLES: u32 = 11;

/// Consecutive deviating admissions that confirm a refresh-rate change.
const CHANGE_CONFIRM_COUNT: u32 = 21;

/// Minimum tight windows folded into the running mean before the
/// interval is seeded; scales up with observed grouping spread.
const SEED_MIN_SAMPLES: f64 = 30.0;

/// A dejittered refresh-cycle timestamp: an absolute instant aligned
/// with a refresh boundary plus the fitted cycle period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleTimestamp {
    pub timebase: f64,
    pub interval_ms: f64,
}

/// Online estimator of a display's true fixed refresh rate.
///
/// Feed one monotonic presentation timestamp (fractional milliseconds)
/// per observed frame via [`count_cycle`](Self::count_cycle); read the
/// estimate back through the accessors. All state is owned by the
/// instance; [`restart_measuring`](Self::restart_measuring) is the only
/// external reset.
///
/// Not thread-safe: no internal synchronization is provided, and callers
/// driving it from more than one thread must serialize access
/// externally. Variable-refresh-rate sources are unsupported; the
/// algorithm assumes a fixed underlying period and resets when that
/// assumption stops holding.
#[derive(Debug)]
pub struct RefreshEstimator {
    config: EstimatorConfig,

    window: RecentWindow,
    store: SampleStore,

    // Pre-fit running mean of admitted window periods
    sum_ms: f64,
    count_ms: u32,

    // Sustained-change detection
    consecutive_changes: u32,

    // Skip gates
    startup_remaining: u32,
    skip_pending: u32,

    // Current best estimate
    interval_ms: f64,
    timebase: f64,
    validated: bool,
    last_validate: Option<f64>,

    // Lifetime counters
    cycles: u64,
    resets: u64,
}

impl Default for RefreshEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}

impl RefreshEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        let store = SampleStore::new(config.max_stored_samples);
        let startup_remaining = config.startup_skip;
        RefreshEstimator {
            config,
            window: RecentWindow::new(),
            store,
            sum_ms: 0.0,
            count_ms: 0,
            consecutive_changes: 0,
            startup_remaining,
            skip_pending: 0,
            interval_ms: 0.0,
            timebase: 0.0,
            validated: false,
            last_validate: None,
            cycles: 0,
            resets: 0,
        }
    }

    /// Feed one raw presentation timestamp (fractional ms, monotonic).
    pub fn count_cycle(&mut self, ts: f64) {
        self.cycles += 1;

        if !self.window.push(ts) {
            return;
        }
        let grouping = self.window.grouping();
        if grouping >= self.config.tight_group_ms {
            // Dropped frame, resume, or outlier in the window.
            return;
        }

        // Skip gates consume tight windows without recording them.
        if self.startup_remaining > 0 {
            self.startup_remaining -= 1;
            return;
        }
        if self.skip_pending > 0 {
            self.skip_pending -= 1;
            return;
        }

        let avg_ms = self.window.mean_delta();
        if avg_ms >= self.config.slowest_valid_ms() {
            // Inactive tab / system sleep pacing, not a real refresh.
            debug!("[Track] Rejected slow window: {:.3}ms", avg_ms);
            return;
        }

        if self.count_ms >= CHANGE_MIN_SAMPLES
            && (avg_ms - self.sum_ms / f64::from(self.count_ms)).abs()
                > self.config.change_threshold_ms
        {
            self.consecutive_changes += 1;
            if self.consecutive_changes >= CHANGE_CONFIRM_COUNT {
                debug!(
                    "[Track] Refresh rate change confirmed after {} windows ({:.3}ms vs mean {:.3}ms)",
                    self.consecutive_changes,
                    avg_ms,
                    self.sum_ms / f64::from(self.count_ms)
                );
                self.reset_internal();
            }
            return;
        }
        self.consecutive_changes = 0;
        self.sum_ms += avg_ms;
        self.count_ms += 1;

        if self.interval_ms == 0.0 {
            // Noisier grouping demands more evidence before seeding.
            let needed = SEED_MIN_SAMPLES.max(grouping * 60.0);
            if f64::from(self.count_ms) > needed {
                self.interval_ms = self.sum_ms / f64::from(self.count_ms);
                debug!(
                    "[Track] Seeded interval {:.4}ms from {} tight windows",
                    self.interval_ms, self.count_ms
                );
            }
        }

        let raw_mid = self.window.middle();
        self.store.push(raw_mid, self.window.mean());
        if self.store.stride() > 0 {
            self.skip_pending = self.store.stride();
        }

        self.maybe_validate(raw_mid);
    }

    /// Refit and validate once enough admitted raw time has elapsed.
    /// Clocked by admitted timestamps so it only fires on genuine
    /// admissions, never on wall time alone.
    fn maybe_validate(&mut self, raw_now: f64) {
        if self.interval_ms == 0.0 {
            return;
        }
        let last = match self.last_validate {
            Some(last) => last,
            None => {
                self.last_validate = Some(raw_now);
                return;
            }
        };
        if raw_now - last < self.config.validate_interval_ms {
            return;
        }
        self.last_validate = Some(raw_now);

        match fit::refit(self.store.raw(), self.store.smoothed(), self.interval_ms) {
            Some(result) => {
                debug!(
                    "[Fit] Validated: interval {:.5}ms ({:.3}Hz) over {} samples",
                    result.interval_ms,
                    1000.0 / result.interval_ms,
                    self.store.len()
                );
                self.interval_ms = result.interval_ms;
                self.timebase = result.timebase;
                self.validated = true;
            }
            None => {
                debug!("[Fit] Stored history no longer consistent, restarting statistics");
                self.reset_internal();
            }
        }
    }

    /// Discard the next `n` admissions before re-engaging the tracker.
    /// For moments the caller knows timing is unreliable, e.g. resume
    /// from sleep.
    pub fn ignore_next_cycles(&mut self, n: u32) {
        self.skip_pending = self.skip_pending.max(n);
    }

    /// Current best refresh rate in Hz; 0.0 until primed.
    pub fn current_frequency(&self) -> f64 {
        if self.interval_ms > 0.0 {
            1000.0 / self.interval_ms
        } else {
            0.0
        }
    }

    /// Dejittered cycle timestamp and interval, once a validation pass
    /// has succeeded.
    pub fn filtered_cycle_timestamp(&self) -> Option<CycleTimestamp> {
        if self.validated {
            Some(CycleTimestamp {
                timebase: self.timebase,
                interval_ms: self.interval_ms,
            })
        } else {
            None
        }
    }

    /// Cumulative count of observed cycles (calls that advanced the
    /// window), not merely admitted samples. Survives internal resets.
    pub fn cycle_count(&self) -> u64 {
        self.cycles
    }

    /// Clear all state atomically; measurement rebuilds from the
    /// startup-skip state.
    pub fn restart_measuring(&mut self) {
        self.reset_internal();
        self.cycles = 0;
        self.resets = 0;
    }

    /// Snapshot for logging / diagnostics.
    pub fn status(&self) -> EstimatorStatus {
        EstimatorStatus {
            frequency_hz: self.current_frequency(),
            interval_ms: self.interval_ms,
            timebase: self.validated.then_some(self.timebase),
            cycles_seen: self.cycles,
            stored_samples: self.store.len(),
            resets: self.resets,
            validated: self.validated,
        }
    }

    // Full statistics reset: refresh-rate change confirmed or the fit
    // stopped explaining history. Keeps the lifetime cycle counter.
    fn reset_internal(&mut self) {
        self.resets += 1;
        self.window.clear();
        self.store.clear();
        self.sum_ms = 0.0;
        self.count_ms = 0;
        self.consecutive_changes = 0;
        self.startup_remaining = self.config.startup_skip;
        self.skip_pending = 0;
        self.interval_ms = 0.0;
        self.timebase = 0.0;
        self.validated = false;
        self.last_validate = None;
    }
}
