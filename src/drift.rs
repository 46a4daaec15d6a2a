use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::drift::{DriftMetric, DriftScope};

pub const DEFAULT_ACCURACY_WINDOW_LEN: usize = 64;

/// Bounded ring of recent calibration-accuracy observations for one scope.
///
/// Owned by the caller (the pipeline) and handed to the tracker; the
/// tracker itself never fetches history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl AccuracyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record one accuracy observation in [0, 1], evicting the oldest once
    /// the window is full.
    pub fn push(&mut self, accuracy: f64) {
        if !accuracy.is_finite() {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(accuracy.clamp(0.0, 1.0));
    }

    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for AccuracyWindow {
    fn default() -> Self {
        Self::new(DEFAULT_ACCURACY_WINDOW_LEN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftTrackerConfig {
    /// |raw drift| beyond this is treated as an outlier and capped (default
    /// 10 percentage points).
    pub outlier_bound: f64,
    /// Clamp applied to any drift value surfaced downstream (default 5
    /// percentage points).
    pub display_bound: f64,
}

impl Default for DriftTrackerConfig {
    fn default() -> Self {
        Self {
            outlier_bound: 0.10,
            display_bound: 0.05,
        }
    }
}

/// Computes bounded, outlier-resistant drift readings. Stateless: every
/// call works only on the window and baseline it is given.
#[derive(Debug, Clone, Default)]
pub struct DriftTracker {
    cfg: DriftTrackerConfig,
}

impl DriftTracker {
    pub fn new(cfg: DriftTrackerConfig) -> Self {
        Self { cfg }
    }

    /// Measure drift of the window's current accuracy from `baseline`.
    ///
    /// Returns `None` when the window holds no observations; the caller
    /// decides the fallback (typically: no drift row for that scope yet).
    pub fn measure(
        &self,
        scope: DriftScope,
        window: &AccuracyWindow,
        baseline: f64,
        now: DateTime<Utc>,
    ) -> Option<DriftMetric> {
        let current = window.mean()?;
        let raw_drift = current - baseline.clamp(0.0, 1.0);

        let is_outlier = raw_drift.abs() > self.cfg.outlier_bound;
        if is_outlier {
            warn!(
                scope = scope.label(),
                raw_drift, "Drift outlier capped at bound"
            );
        }
        let capped = raw_drift.clamp(-self.cfg.outlier_bound, self.cfg.outlier_bound);
        let normalized = capped.clamp(-self.cfg.display_bound, self.cfg.display_bound);

        Some(DriftMetric {
            scope,
            raw_drift,
            normalized_drift: normalized,
            is_outlier,
            measured_at: now,
        })
    }
}
