//! Gamble configuration
//!
//! Mirrors the host editor's settings block:
//! - Win probability for a roll
//! - Whether successful builds/tests trigger a roll
//! - Presentation-only flags (flashing lights, dancer panel position)
//! - Timing profile for the roll → reveal → fever timeline

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IgError, IgResult};

/// Default win probability
pub const DEFAULT_JACKPOT_CHANCE: f64 = 0.8;

/// Fever length: 4 min 11 s
pub const FEVER_DURATION_MS: u64 = 251_000;

/// Longest fever a configuration may ask for: 24 h
pub const MAX_FEVER_DURATION_MS: u64 = 24 * 60 * 60 * 1_000;

/// Minimum interval between automatic triggers
pub const TRIGGER_COOLDOWN_MS: u64 = 5_000;

/// Where the dancer panel opens relative to the active editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PanelPosition {
    /// Split beside the active editor
    #[default]
    Beside,
    /// Replace the active editor column
    Active,
}

/// Timing profile for the gamble timeline (all values in ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimingConfig {
    /// Roll animation playback before the outcome is revealed
    pub roll_buildup_ms: u64,

    /// Extra pause between the reveal and fever entry on a win
    pub win_reveal_delay_ms: u64,

    /// How long fever lasts once entered
    pub fever_duration_ms: u64,

    /// Minimum gap between automatic triggers
    pub trigger_cooldown_ms: u64,

    /// Settle time for a freshly attached surface before resuming fever
    pub resume_settle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

impl TimingConfig {
    /// Normal timing
    pub fn normal() -> Self {
        Self {
            roll_buildup_ms: 2_000,
            win_reveal_delay_ms: 1_000,
            fever_duration_ms: FEVER_DURATION_MS,
            trigger_cooldown_ms: TRIGGER_COOLDOWN_MS,
            resume_settle_ms: 500,
        }
    }

    /// Instant presentation timing (fever and cooldown keep their real length)
    pub fn instant() -> Self {
        Self {
            roll_buildup_ms: 0,
            win_reveal_delay_ms: 0,
            resume_settle_ms: 0,
            ..Self::normal()
        }
    }

    /// Time from roll start until fever entry on a win
    pub fn time_to_fever_ms(&self) -> u64 {
        self.roll_buildup_ms.saturating_add(self.win_reveal_delay_ms)
    }

    /// Effective fever length, capped at [`MAX_FEVER_DURATION_MS`]
    pub fn fever_ms(&self) -> u64 {
        if self.fever_duration_ms > MAX_FEVER_DURATION_MS {
            log::warn!(
                "[Config] feverDurationMs {} too long, capped to {}",
                self.fever_duration_ms,
                MAX_FEVER_DURATION_MS
            );
            return MAX_FEVER_DURATION_MS;
        }
        self.fever_duration_ms
    }
}

/// Complete gamble configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GambleConfig {
    /// Win probability in [0, 1]; read through [`GambleConfig::chance`]
    pub jackpot_chance: f64,

    /// Roll automatically after a successful task or test run
    pub trigger_on_test_success: bool,

    /// Reduced-motion flag, consumed only by the presentation layer
    pub disable_flashing_lights: bool,

    /// Dancer panel placement, consumed only by the presentation layer
    pub gif_position: PanelPosition,

    /// Timeline timing
    pub timing: TimingConfig,
}

impl Default for GambleConfig {
    fn default() -> Self {
        Self {
            jackpot_chance: DEFAULT_JACKPOT_CHANCE,
            trigger_on_test_success: true,
            disable_flashing_lights: false,
            gif_position: PanelPosition::default(),
            timing: TimingConfig::normal(),
        }
    }
}

impl GambleConfig {
    /// Load from a JSON file; a missing file yields defaults
    pub fn load(path: &Path) -> IgResult<Self> {
        if !path.exists() {
            log::info!("[Config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse from a JSON document
    pub fn from_json_str(json: &str) -> IgResult<Self> {
        serde_json::from_str(json).map_err(|e| IgError::Config(format!("invalid config: {}", e)))
    }

    /// Save as pretty JSON
    pub fn save(&self, path: &Path) -> IgResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Effective win probability, clamped to [0, 1]
    ///
    /// A bad value degrades to something usable instead of failing the roll.
    pub fn chance(&self) -> f64 {
        clamp_chance(self.jackpot_chance)
    }
}

/// Clamp a configured probability into [0, 1]; non-finite values fall back to the default
pub fn clamp_chance(raw: f64) -> f64 {
    if !raw.is_finite() {
        log::warn!(
            "[Config] jackpotChance {} is not a number, using {}",
            raw,
            DEFAULT_JACKPOT_CHANCE
        );
        return DEFAULT_JACKPOT_CHANCE;
    }

    let clamped = raw.clamp(0.0, 1.0);
    if clamped != raw {
        log::warn!("[Config] jackpotChance {} out of range, clamped to {}", raw, clamped);
    }
    clamped
}
