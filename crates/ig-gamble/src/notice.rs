//! User-visible notices (the host's information/warning/error popups)

use serde::{Deserialize, Serialize};

pub const NOTICE_ALREADY_ROLLING: &str = "Idle Death Gamble is already in progress!";
pub const NOTICE_JACKPOT: &str = "JACKPOT! FEVER TIME!";
pub const NOTICE_MISSED: &str = "Tch... Missed.";
pub const NOTICE_FEVER_ENDED: &str = "Fever mode ended.";

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    /// Shown when a manual roll died on a presentation failure
    pub fn gamble_failed(reason: impl std::fmt::Display) -> Self {
        Self::error(format!("Idle Death Gamble failed: {}", reason))
    }
}

/// Sink for user-visible notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Routes notices to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => log::info!("{}", notice.text),
            NoticeLevel::Warning => log::warn!("{}", notice.text),
            NoticeLevel::Error => log::error!("{}", notice.text),
        }
    }
}
