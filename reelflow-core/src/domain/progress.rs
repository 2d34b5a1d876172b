//! Job progress reporting

use serde::{Deserialize, Serialize};

/// Best-effort progress of a remote job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Percentage in `0..=100`
    pub percent: u8,
    /// Free-form phase label reported by the backend (e.g. "rendering")
    pub phase: Option<String>,
}

/// Keeps the surfaced percent from going backwards
///
/// The backend does not guarantee monotonic progress values. The tracker clamps
/// each raw value to `[0, 100]` and never reports less than it already has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTracker {
    highest: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a raw percent and returns the value to surface
    pub fn observe(&mut self, raw: f64) -> u8 {
        let clamped = if raw.is_nan() {
            0
        } else {
            raw.clamp(0.0, 100.0).round() as u8
        };
        self.highest = self.highest.max(clamped);
        self.highest
    }

    /// Marks the job as done
    pub fn complete(&mut self) -> u8 {
        self.highest = 100;
        self.highest
    }

    /// Highest percent surfaced so far
    pub fn current(&self) -> u8 {
        self.highest
    }
}
