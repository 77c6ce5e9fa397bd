//! Shared test doubles for the gamble integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use ig_core::{Clock, GambleConfig, TimingConfig};
use ig_gamble::{
    FixedDraw, GambleStateMachine, Notice, NoticeLevel, Notifier, PresentationChannel,
    PresentationError,
};

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK
// ═══════════════════════════════════════════════════════════════════════════════

/// Wall clock that follows tokio's (paused) virtual time, plus a manual skew
/// to simulate the host being suspended while timers could not run
pub struct TestClock {
    base: DateTime<Utc>,
    origin: tokio::time::Instant,
    skew_ms: AtomicI64,
}

impl TestClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Utc::now(),
            origin: tokio::time::Instant::now(),
            skew_ms: AtomicI64::new(0),
        })
    }

    /// Jump wall-clock time forward without advancing any timer
    pub fn skew_ms(&self, ms: i64) {
        self.skew_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = tokio::time::Instant::now() - self.origin;
        self.base
            + chrono::Duration::milliseconds(elapsed.as_millis() as i64)
            + chrono::Duration::milliseconds(self.skew_ms.load(Ordering::SeqCst))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRESENTATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    PlayRoll { is_win: bool, buildup_ms: u64 },
    PlayLoss,
    StartFever(Option<u64>),
    Stop,
    PlayWelcome,
    UpdateConfig(bool),
}

#[derive(Default)]
pub struct RecordingPresentation {
    calls: Mutex<Vec<Call>>,
    fail_roll: AtomicBool,
    fail_fever: AtomicBool,
    fail_loss: AtomicBool,
}

impl RecordingPresentation {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_roll() -> Arc<Self> {
        let presentation = Self::default();
        presentation.fail_roll.store(true, Ordering::SeqCst);
        Arc::new(presentation)
    }

    pub fn failing_fever() -> Arc<Self> {
        let presentation = Self::default();
        presentation.fail_fever.store(true, Ordering::SeqCst);
        Arc::new(presentation)
    }

    pub fn failing_loss() -> Arc<Self> {
        let presentation = Self::default();
        presentation.fail_loss.store(true, Ordering::SeqCst);
        Arc::new(presentation)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    pub fn roll_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, Call::PlayRoll { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl PresentationChannel for RecordingPresentation {
    fn play_roll(&self, is_win: bool, buildup_ms: u64) -> Result<(), PresentationError> {
        self.record(Call::PlayRoll { is_win, buildup_ms });
        if self.fail_roll.load(Ordering::SeqCst) {
            return Err(PresentationError::Failed("roll view crashed".into()));
        }
        Ok(())
    }

    fn play_loss(&self) -> Result<(), PresentationError> {
        self.record(Call::PlayLoss);
        if self.fail_loss.load(Ordering::SeqCst) {
            return Err(PresentationError::Failed("loss view crashed".into()));
        }
        Ok(())
    }

    fn start_fever(&self, resume_ms: Option<u64>) -> Result<(), PresentationError> {
        self.record(Call::StartFever(resume_ms));
        if self.fail_fever.load(Ordering::SeqCst) {
            return Err(PresentationError::Disconnected);
        }
        Ok(())
    }

    fn stop(&self) -> Result<(), PresentationError> {
        self.record(Call::Stop);
        Ok(())
    }

    fn play_welcome(&self) -> Result<(), PresentationError> {
        self.record(Call::PlayWelcome);
        Ok(())
    }

    fn update_config(&self, disable_flashing_lights: bool) -> Result<(), PresentationError> {
        self.record(Call::UpdateConfig(disable_flashing_lights));
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NOTIFIER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.notices.lock().iter().map(|n| n.text.clone()).collect()
    }

    pub fn count_level(&self, level: NoticeLevel) -> usize {
        self.notices.lock().iter().filter(|n| n.level == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HARNESS
// ═══════════════════════════════════════════════════════════════════════════════

pub const BUILDUP_MS: u64 = 2_000;
pub const REVEAL_MS: u64 = 1_000;
pub const FEVER_MS: u64 = 251_000;

pub struct Harness {
    pub machine: GambleStateMachine,
    pub presentation: Arc<RecordingPresentation>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<TestClock>,
}

pub fn config(chance: f64) -> GambleConfig {
    GambleConfig {
        jackpot_chance: chance,
        timing: TimingConfig::normal(),
        ..GambleConfig::default()
    }
}

/// Machine whose every draw is `draw`
pub fn harness(draw: f64, config: GambleConfig) -> Harness {
    harness_with(draw, config, RecordingPresentation::new())
}

pub fn harness_with(
    draw: f64,
    config: GambleConfig,
    presentation: Arc<RecordingPresentation>,
) -> Harness {
    let notifier = RecordingNotifier::new();
    let clock = TestClock::new();
    let machine = GambleStateMachine::builder(config)
        .outcome_source(Arc::new(FixedDraw(draw)))
        .clock(clock.clone())
        .presentation(presentation.clone())
        .notifier(notifier.clone())
        .build();

    Harness {
        machine,
        presentation,
        notifier,
        clock,
    }
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
