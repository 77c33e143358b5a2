//! Recent-timestamp window and tight-grouping metric
//!
//! Presentation timestamps carry scheduler jitter, and frames get
//! dropped outright. A single delta tells you nothing; four consecutive
//! deltas with a small spread are strong evidence of a clean, undropped
//! run at the true period. The window keeps the last five timestamps and
//! exposes the spread of the four deltas between them as the admission
//! metric.

/// Number of timestamps the window holds; one fewer deltas.
pub const WINDOW_SLOTS: usize = 5;

/// Rolling window of the most recent raw timestamps, oldest first.
#[derive(Debug, Default)]
pub struct RecentWindow {
    slots: [f64; WINDOW_SLOTS],
    filled: usize,
}

impl RecentWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift a timestamp in, dropping the oldest. Returns true once the
    /// window is full and its metrics are meaningful.
    pub fn push(&mut self, ts: f64) -> bool {
        if self.filled < WINDOW_SLOTS {
            self.slots[self.filled] = ts;
            self.filled += 1;
        } else {
            self.slots.copy_within(1.., 0);
            self.slots[WINDOW_SLOTS - 1] = ts;
        }
        self.filled == WINDOW_SLOTS
    }

    pub fn is_full(&self) -> bool {
        self.filled == WINDOW_SLOTS
    }

    /// The four consecutive inter-arrival deltas. Window must be full.
    pub fn deltas(&self) -> [f64; WINDOW_SLOTS - 1] {
        debug_assert!(self.is_full());
        let mut d = [0.0; WINDOW_SLOTS - 1];
        for i in 0..WINDOW_SLOTS - 1 {
            d[i] = self.slots[i + 1] - self.slots[i];
        }
        d
    }

    /// Spread of the deltas (max - min). Small values mean a clean run;
    /// a dropped frame or outlier inflates one delta and blows this up.
    pub fn grouping(&self) -> f64 {
        let d = self.deltas();
        let mut min = d[0];
        let mut max = d[0];
        for &v in &d[1..] {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        max - min
    }

    /// Mean of the four deltas, i.e. the window's period estimate.
    pub fn mean_delta(&self) -> f64 {
        debug_assert!(self.is_full());
        (self.slots[WINDOW_SLOTS - 1] - self.slots[0]) / (WINDOW_SLOTS - 1) as f64
    }

    /// Middle (3rd of 5) raw timestamp; the x-axis ground truth a window
    /// contributes when admitted.
    pub fn middle(&self) -> f64 {
        debug_assert!(self.is_full());
        self.slots[WINDOW_SLOTS / 2]
    }

    /// Arithmetic mean of the five timestamps; robust to single-sample
    /// jitter, used only to infer elapsed cycle counts between admissions.
    pub fn mean(&self) -> f64 {
        debug_assert!(self.is_full());
        self.slots.iter().sum::<f64>() / WINDOW_SLOTS as f64
    }

    pub fn clear(&mut self) {
        self.filled = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_full_until_five_pushes() {
        let mut w = RecentWindow::new();
        for i in 0..4 {
            assert!(!w.push(i as f64), "window full after only {} pushes", i + 1);
        }
        assert!(w.push(4.0));
        assert!(w.is_full());
    }

    #[test]
    fn test_push_shifts_oldest_out() {
        let mut w = RecentWindow::new();
        for i in 0..6 {
            w.push(i as f64 * 10.0);
        }
        // Window now holds 10..=50; first delta is 20-10.
        let d = w.deltas();
        assert_eq!(d, [10.0, 10.0, 10.0, 10.0]);
        assert_eq!(w.middle(), 30.0);
    }

    #[test]
    fn test_grouping_of_uniform_run_is_zero() {
        let mut w = RecentWindow::new();
        for i in 0..5 {
            w.push(100.0 + i as f64 * 16.0);
        }
        assert!(w.grouping().abs() < 1e-12);
        assert!((w.mean_delta() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_grouping_reflects_outlier_gap() {
        let mut w = RecentWindow::new();
        // One doubled gap (dropped frame): deltas 16, 16, 32, 16.
        for &ts in &[0.0, 16.0, 32.0, 64.0, 80.0] {
            w.push(ts);
        }
        assert!((w.grouping() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_is_window_average() {
        let mut w = RecentWindow::new();
        for &ts in &[1.0, 2.0, 3.0, 4.0, 5.0] {
            w.push(ts);
        }
        assert!((w.mean() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_clear_empties_window() {
        let mut w = RecentWindow::new();
        for i in 0..5 {
            w.push(i as f64);
        }
        w.clear();
        assert!(!w.is_full());
        assert!(!w.push(9.0));
    }
}
