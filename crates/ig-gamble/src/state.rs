//! Gamble phase and public state snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exactly one phase holds at any instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamblePhase {
    #[default]
    Idle,
    /// A roll sequence is in flight
    Rolling,
    /// Celebration running until its deadline
    Fever,
}

impl GamblePhase {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Rolling => "Rolling",
            Self::Fever => "Fever",
        }
    }
}

/// Read-only view of the machine state
///
/// `fever_expires_at` is `Some` iff `phase == Fever`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GambleSnapshot {
    pub phase: GamblePhase,
    pub fever_expires_at: Option<DateTime<Utc>>,
}

impl GambleSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn rolling() -> Self {
        Self {
            phase: GamblePhase::Rolling,
            fever_expires_at: None,
        }
    }

    pub fn fever(expires_at: DateTime<Utc>) -> Self {
        Self {
            phase: GamblePhase::Fever,
            fever_expires_at: Some(expires_at),
        }
    }

    pub fn is_fever(&self) -> bool {
        self.phase == GamblePhase::Fever
    }

    pub fn is_rolling(&self) -> bool {
        self.phase == GamblePhase::Rolling
    }
}
