//! Fever countdown math
//!
//! Shared by every surface that shows the fever timer, so a reattached
//! surface renders the same clock and audio position as the one it replaced.

use serde::{Deserialize, Serialize};

/// Fever audio fades out over this final stretch
pub const FADE_OUT_DURATION_MS: u64 = 5_000;

/// Snapshot of a running fever countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeverCountdown {
    /// Time left (ms)
    pub remaining_ms: u64,
    /// Full fever length (ms)
    pub total_ms: u64,
}

impl FeverCountdown {
    pub fn new(remaining_ms: u64, total_ms: u64) -> Self {
        Self {
            remaining_ms: remaining_ms.min(total_ms),
            total_ms,
        }
    }

    /// Countdown reached zero
    pub fn is_finished(&self) -> bool {
        self.remaining_ms == 0
    }

    /// `MM:SS:cc` (minutes, seconds, centiseconds)
    pub fn display(&self) -> String {
        let minutes = self.remaining_ms / 60_000;
        let seconds = (self.remaining_ms % 60_000) / 1_000;
        let centis = (self.remaining_ms % 1_000) / 10;
        format!("{:02}:{:02}:{:02}", minutes, seconds, centis)
    }

    /// Fever track volume in [0, 1], ramping down over the last [`FADE_OUT_DURATION_MS`]
    pub fn volume(&self) -> f64 {
        if self.remaining_ms >= FADE_OUT_DURATION_MS {
            1.0
        } else {
            self.remaining_ms as f64 / FADE_OUT_DURATION_MS as f64
        }
    }

    /// How far into the fever track a resumed surface should seek (ms)
    pub fn playback_offset_ms(&self) -> u64 {
        self.total_ms - self.remaining_ms
    }
}
