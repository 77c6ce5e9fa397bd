//! Presentation channel: one-way notifications to the rendering surface
//!
//! The machine never waits on the surface. Notifications are fire-and-forget;
//! the only thing the machine cares about is whether the call itself failed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// Failure to deliver a notification to the surface
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentationError {
    #[error("Presentation surface disconnected")]
    Disconnected,

    #[error("Presentation failed: {0}")]
    Failed(String),
}

/// Rendering surface for the roll and fever timeline
pub trait PresentationChannel: Send + Sync {
    /// Roll animation starts; the outcome is already decided
    fn play_roll(&self, is_win: bool, buildup_ms: u64) -> Result<(), PresentationError>;

    /// The roll was a loss
    fn play_loss(&self) -> Result<(), PresentationError>;

    /// Fever starts; `resume_ms` is the remaining time when resuming, `None` for a fresh fever
    fn start_fever(&self, resume_ms: Option<u64>) -> Result<(), PresentationError>;

    /// Stop all audio and animation
    fn stop(&self) -> Result<(), PresentationError>;

    /// Greeting played just before an automatic roll
    fn play_welcome(&self) -> Result<(), PresentationError> {
        Ok(())
    }

    /// Reduced-motion setting changed
    fn update_config(&self, _disable_flashing_lights: bool) -> Result<(), PresentationError> {
        Ok(())
    }
}

/// Outbound message to a surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PresentationMessage {
    #[serde(rename_all = "camelCase")]
    PlayRoll { is_win: bool, duration: u64 },
    PlayLoss,
    StartFever {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<u64>,
    },
    Stop,
    PlayWelcome,
    #[serde(rename_all = "camelCase")]
    UpdateConfig { disable_flashing_lights: bool },
}

impl PresentationMessage {
    pub fn to_json(&self) -> String {
        // Plain enum of scalars; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Inbound message from a surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceMessage {
    /// The user pressed the roll button
    Roll,
}

impl SurfaceMessage {
    pub fn from_json(json: &str) -> Result<Self, PresentationError> {
        serde_json::from_str(json).map_err(|e| PresentationError::Failed(e.to_string()))
    }
}

/// Presentation backed by a message queue (webview-style `postMessage`)
#[derive(Debug, Clone)]
pub struct MessagePresentation {
    tx: mpsc::UnboundedSender<PresentationMessage>,
}

impl MessagePresentation {
    /// Create a presentation and the receiving end of its queue
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PresentationMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn post(&self, message: PresentationMessage) -> Result<(), PresentationError> {
        self.tx
            .send(message)
            .map_err(|_| PresentationError::Disconnected)
    }
}

impl PresentationChannel for MessagePresentation {
    fn play_roll(&self, is_win: bool, buildup_ms: u64) -> Result<(), PresentationError> {
        self.post(PresentationMessage::PlayRoll {
            is_win,
            duration: buildup_ms,
        })
    }

    fn play_loss(&self) -> Result<(), PresentationError> {
        self.post(PresentationMessage::PlayLoss)
    }

    fn start_fever(&self, resume_ms: Option<u64>) -> Result<(), PresentationError> {
        self.post(PresentationMessage::StartFever {
            duration: resume_ms,
        })
    }

    fn stop(&self) -> Result<(), PresentationError> {
        self.post(PresentationMessage::Stop)
    }

    fn play_welcome(&self) -> Result<(), PresentationError> {
        self.post(PresentationMessage::PlayWelcome)
    }

    fn update_config(&self, disable_flashing_lights: bool) -> Result<(), PresentationError> {
        self.post(PresentationMessage::UpdateConfig {
            disable_flashing_lights,
        })
    }
}
