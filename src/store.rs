//! Bounded sample store with lockstep downsampling
//!
//! Two parallel, index-aligned sequences: the middle raw timestamp of
//! each admitted window (x-axis ground truth for the line fit) and the
//! window mean (used to infer elapsed cycle counts between admissions).
//! When the store reaches capacity, both sequences keep every second
//! element and the skip stride doubles-plus-one; subsequent admissions
//! absorb `stride` tight windows before the next one is stored. Retained
//! samples stay evenly spaced, so compaction never biases the fit.

use log::debug;

#[derive(Debug)]
pub struct SampleStore {
    raw: Vec<f64>,
    smoothed: Vec<f64>,
    capacity: usize,
    stride: u32,
}

impl SampleStore {
    pub fn new(capacity: usize) -> Self {
        SampleStore {
            raw: Vec::new(),
            smoothed: Vec::new(),
            capacity: capacity.max(2),
            stride: 0,
        }
    }

    /// Append one admitted sample pair, compacting if capacity is hit.
    pub fn push(&mut self, raw_mid: f64, window_mean: f64) {
        self.raw.push(raw_mid);
        self.smoothed.push(window_mean);
        if self.raw.len() >= self.capacity {
            self.compact();
        }
    }

    /// Keep every second element of both sequences (indices 0, 2, 4, ...)
    /// and widen the skip stride.
    fn compact(&mut self) {
        let mut keep = 0;
        for i in (0..self.raw.len()).step_by(2) {
            self.raw[keep] = self.raw[i];
            self.smoothed[keep] = self.smoothed[i];
            keep += 1;
        }
        self.raw.truncate(keep);
        self.smoothed.truncate(keep);
        // Saturates after ~31 compactions; a pinned stride still bounds
        // the store, it just stops widening.
        self.stride = self.stride.saturating_mul(2).saturating_add(1);
        debug!(
            "[Store] Compacted to {} samples, skip stride now {}",
            keep, self.stride
        );
    }

    /// Admissions to silently absorb after each stored sample. Zero until
    /// the first compaction.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    pub fn smoothed(&self) -> &[f64] {
        &self.smoothed
    }

    /// Drop all samples and re-arm the stride.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.smoothed.clear();
        self.stride = 0;
    }
}
