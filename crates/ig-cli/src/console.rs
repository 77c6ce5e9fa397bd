//! Terminal surface: renders presentation messages and notices

use ig_core::FeverCountdown;
use ig_gamble::{Notice, NoticeLevel, Notifier, PresentationMessage};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Human-readable line for a presentation message; `fever_total_ms` is the configured fever length
pub fn render(message: &PresentationMessage, fever_total_ms: u64) -> String {
    match message {
        // The outcome is already decided; the terminal does not spoil it
        PresentationMessage::PlayRoll { duration, .. } => {
            format!("🎰 rolling... ({:.1} s)", *duration as f64 / 1000.0)
        }
        PresentationMessage::PlayLoss => "💨 aw, dang it".to_string(),
        PresentationMessage::StartFever { duration: None } => "🔥 JACKPOT! FEVER TIME!".to_string(),
        PresentationMessage::StartFever {
            duration: Some(remaining),
        } => format!(
            "🔥 FEVER resumed, {} left",
            FeverCountdown::new(*remaining, fever_total_ms).display()
        ),
        PresentationMessage::Stop => "⏹  stopped".to_string(),
        PresentationMessage::PlayWelcome => "👋 build passed, let's gamble".to_string(),
        PresentationMessage::UpdateConfig {
            disable_flashing_lights,
        } => format!(
            "⚙  flashing lights {}",
            if *disable_flashing_lights { "off" } else { "on" }
        ),
    }
}

/// Print every message arriving on `rx` until the presentation is dropped
pub fn spawn_renderer(
    mut rx: UnboundedReceiver<PresentationMessage>,
    json: bool,
    fever_total_ms: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if json {
                println!("{}", message.to_json());
            } else {
                println!("{}", render(&message, fever_total_ms));
            }
        }
    })
}

/// Notices go to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{}] {}", tag, notice.text);
    }
}
