//! Gamble State Machine: roll, reveal, fever, expiry
//!
//! ```text
//! Idle ──attempt──> Rolling ──buildup──┬── loss ──> Idle
//!                                      └── win ──reveal──> Fever ──fever_duration──> Idle
//! ```
//!
//! Every transition bumps a generation counter. Delayed continuations (the
//! roll buildup, the reveal delay, the fever expiry timer) remember the
//! generation they were scheduled under and go quiet once it is stale, so a
//! reset mid-sequence can never be undone by a late wakeup.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use ig_core::{Clock, FeverCountdown, GambleConfig, SystemClock, TimingConfig, millis_until};

use crate::notice::{
    NOTICE_ALREADY_ROLLING, NOTICE_FEVER_ENDED, NOTICE_JACKPOT, NOTICE_MISSED, Notice, Notifier,
};
use crate::outcome::{OutcomeSource, ThreadRngSource, is_win};
use crate::presentation::{PresentationChannel, PresentationError, SurfaceMessage};
use crate::resume::{ResumeDecision, plan_resume};
use crate::state::{GamblePhase, GambleSnapshot};

/// Why an attempt did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// A roll is already in flight
    AlreadyRolling,
    /// Automatic attempt during fever
    FeverActive,
    /// Machine was disposed
    Disposed,
}

/// How an attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GambleOutcome {
    /// Guard rejected the attempt; nothing changed
    Ignored(IgnoreReason),
    /// Roll won and fever started
    Won,
    /// Roll lost, back to Idle
    Lost,
    /// A reset or dispose overtook the sequence
    Superseded,
    /// A presentation call failed; state was forced back to Idle
    Failed,
}

// ═══════════════════════════════════════════════════════════════════════════════
// INTERNAL STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Fever carries its deadline and timer, so neither can exist outside it
enum Phase {
    Idle,
    Rolling,
    Fever {
        expires_at: DateTime<Utc>,
        timer: JoinHandle<()>,
    },
}

struct GambleState {
    phase: Phase,
    generation: u64,
    disposed: bool,
}

impl GambleState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            disposed: false,
        }
    }

    fn phase(&self) -> GamblePhase {
        match self.phase {
            Phase::Idle => GamblePhase::Idle,
            Phase::Rolling => GamblePhase::Rolling,
            Phase::Fever { .. } => GamblePhase::Fever,
        }
    }

    fn snapshot(&self) -> GambleSnapshot {
        match &self.phase {
            Phase::Idle => GambleSnapshot::idle(),
            Phase::Rolling => GambleSnapshot::rolling(),
            Phase::Fever { expires_at, .. } => GambleSnapshot::fever(*expires_at),
        }
    }

    /// Swap in `next` and bump the generation, handing back any armed timer
    fn replace_phase(&mut self, next: Phase) -> Option<JoinHandle<()>> {
        self.generation += 1;
        match std::mem::replace(&mut self.phase, next) {
            Phase::Fever { timer, .. } => Some(timer),
            _ => None,
        }
    }

    /// Transition to `next`, cancelling any armed timer
    fn enter(&mut self, next: Phase) -> u64 {
        if let Some(timer) = self.replace_phase(next) {
            timer.abort();
        }
        self.generation
    }
}

struct Inner {
    state: Mutex<GambleState>,
    config: RwLock<GambleConfig>,
    outcome: Arc<dyn OutcomeSource>,
    clock: Arc<dyn Clock>,
    presentation: RwLock<Option<Arc<dyn PresentationChannel>>>,
    notifier: RwLock<Option<Arc<dyn Notifier>>>,
}

impl Inner {
    /// Call the presentation if one is attached; absent means no-op
    fn present<F>(&self, f: F) -> Result<(), PresentationError>
    where
        F: FnOnce(&dyn PresentationChannel) -> Result<(), PresentationError>,
    {
        let channel = self.presentation.read().clone();
        match channel {
            Some(channel) => f(channel.as_ref()),
            None => Ok(()),
        }
    }

    /// Like `present`, but a failure is only logged
    fn present_quiet<F>(&self, what: &str, f: F)
    where
        F: FnOnce(&dyn PresentationChannel) -> Result<(), PresentationError>,
    {
        if let Err(e) = self.present(f) {
            log::warn!("[Gamble] {} notification failed: {}", what, e);
        }
    }

    fn notify(&self, notice: Notice) {
        let notifier = self.notifier.read().clone();
        if let Some(notifier) = notifier {
            notifier.notify(notice);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().generation == generation
    }

    /// Rolling → Fever, arming the expiry timer; `None` if the roll was overtaken
    fn enter_fever(self: &Arc<Self>, generation: u64, duration_ms: u64) -> Option<u64> {
        let mut state = self.state.lock();
        if state.generation != generation || !matches!(state.phase, Phase::Rolling) {
            return None;
        }

        let now = self.clock.now();
        let expires_at = i64::try_from(duration_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let fever_generation = state.generation + 1;
        let timer = self.arm_expiry(fever_generation, duration_ms);

        Some(state.enter(Phase::Fever { expires_at, timer }))
    }

    fn arm_expiry(self: &Arc<Self>, generation: u64, duration_ms: u64) -> JoinHandle<()> {
        let inner: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
            if let Some(inner) = inner.upgrade() {
                inner.expire_fever(generation);
            }
        })
    }

    /// Timer callback: Fever → Idle
    fn expire_fever(&self, generation: u64) -> bool {
        {
            let mut state = self.state.lock();
            if state.generation != generation || !matches!(state.phase, Phase::Fever { .. }) {
                log::debug!("[Gamble] stale fever expiry ignored");
                return false;
            }
            // The handle belongs to the task running this callback
            drop(state.replace_phase(Phase::Idle));
        }

        log::info!("[Gamble] fever ended");
        self.present_quiet("stop", |p| p.stop());
        self.notify(Notice::info(NOTICE_FEVER_ENDED));
        true
    }

    /// Rolling → Idle after a loss; false if the roll was overtaken
    fn finish_loss(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation || !matches!(state.phase, Phase::Rolling) {
            return false;
        }
        state.enter(Phase::Idle);
        true
    }

    /// Safe fallback after a failure: Idle, no timer, if nobody else moved the state on
    fn force_idle(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation || matches!(state.phase, Phase::Idle) {
            return false;
        }
        state.enter(Phase::Idle);
        true
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Phase::Fever { timer, .. } = &self.state.get_mut().phase {
            timer.abort();
        }
    }
}

/// Forces Idle when a roll sequence ends without reaching a settled phase,
/// whether by error, panic, or the future being dropped mid-suspension
struct RollGuard<'a> {
    inner: &'a Inner,
    generation: u64,
    armed: bool,
}

impl<'a> RollGuard<'a> {
    fn new(inner: &'a Inner, generation: u64) -> Self {
        Self {
            inner,
            generation,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RollGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.inner.force_idle(self.generation) {
            log::warn!("[Gamble] roll sequence aborted, state reset to Idle");
        }
    }
}

/// Everything a roll needs, fixed when it starts
struct RollStart {
    generation: u64,
    is_win: bool,
    interrupted_fever: bool,
    timing: TimingConfig,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE MACHINE
// ═══════════════════════════════════════════════════════════════════════════════

/// The gamble state machine
///
/// A cheap-to-clone handle; every clone drives the same state. Create one per
/// host and pass it to each collaborator that needs it.
#[derive(Clone)]
pub struct GambleStateMachine {
    inner: Arc<Inner>,
}

impl GambleStateMachine {
    /// Machine with thread RNG and system clock
    pub fn new(config: GambleConfig) -> Self {
        GambleMachineBuilder::new(config).build()
    }

    pub fn builder(config: GambleConfig) -> GambleMachineBuilder {
        GambleMachineBuilder::new(config)
    }

    /// Read-only snapshot of phase and fever deadline
    pub fn get_state(&self) -> GambleSnapshot {
        self.inner.state.lock().snapshot()
    }

    pub fn phase(&self) -> GamblePhase {
        self.inner.state.lock().phase()
    }

    pub fn config(&self) -> GambleConfig {
        self.inner.config.read().clone()
    }

    /// Swap configuration; takes effect from the next roll
    pub fn update_config(&self, config: GambleConfig) {
        let flag = config.disable_flashing_lights;
        *self.inner.config.write() = config;
        self.inner
            .present_quiet("updateConfig", |p| p.update_config(flag));
    }

    pub fn set_notifier(&self, notifier: Option<Arc<dyn Notifier>>) {
        *self.inner.notifier.write() = notifier;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ROLL
    // ═══════════════════════════════════════════════════════════════════════════

    /// Try to roll
    ///
    /// Ignored while a roll is in flight. During fever a manual attempt resets
    /// and re-rolls, an automatic one is dropped. Resolves once the roll has
    /// settled into Fever or Idle; fever itself runs on in the background.
    pub async fn attempt_gamble(&self, manual: bool) -> GambleOutcome {
        let roll = match self.begin_roll(manual) {
            Ok(roll) => roll,
            Err(reason) => {
                log::debug!("[Gamble] attempt ignored: {:?} (manual: {})", reason, manual);
                if manual && reason == IgnoreReason::AlreadyRolling {
                    self.inner.notify(Notice::warning(NOTICE_ALREADY_ROLLING));
                }
                return GambleOutcome::Ignored(reason);
            }
        };

        if roll.interrupted_fever {
            log::info!("[Gamble] manual roll interrupts fever");
            self.inner.present_quiet("stop", |p| p.stop());
        }

        let mut guard = RollGuard::new(&self.inner, roll.generation);
        match self.roll_sequence(&roll, &mut guard).await {
            Ok(outcome) => outcome,
            Err(e) => {
                drop(guard);
                log::error!("[Gamble] roll failed: {}", e);
                if manual {
                    self.inner.notify(Notice::gamble_failed(&e));
                }
                GambleOutcome::Failed
            }
        }
    }

    /// Run `attempt_gamble` on the runtime without waiting for it
    pub fn spawn_attempt(&self, manual: bool) -> JoinHandle<GambleOutcome> {
        let machine = self.clone();
        tokio::spawn(async move { machine.attempt_gamble(manual).await })
    }

    /// Dispatch an inbound surface message
    pub fn handle_surface_message(&self, message: SurfaceMessage) -> JoinHandle<GambleOutcome> {
        match message {
            SurfaceMessage::Roll => self.spawn_attempt(true),
        }
    }

    /// Guard checks and the Rolling assignment happen under one lock
    fn begin_roll(&self, manual: bool) -> Result<RollStart, IgnoreReason> {
        let config = self.inner.config.read().clone();

        let (generation, interrupted_fever) = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return Err(IgnoreReason::Disposed);
            }
            let interrupted_fever = match state.phase {
                Phase::Rolling => return Err(IgnoreReason::AlreadyRolling),
                Phase::Fever { .. } if !manual => return Err(IgnoreReason::FeverActive),
                Phase::Fever { .. } => true,
                Phase::Idle => false,
            };
            (state.enter(Phase::Rolling), interrupted_fever)
        };

        let draw = self.inner.outcome.draw();
        let chance = config.chance();
        let is_win = is_win(draw, chance);
        log::info!(
            "[Gamble] rolling: draw {:.3} vs chance {:.3} → {}",
            draw,
            chance,
            if is_win { "win" } else { "loss" }
        );

        Ok(RollStart {
            generation,
            is_win,
            interrupted_fever,
            timing: config.timing,
        })
    }

    async fn roll_sequence(
        &self,
        roll: &RollStart,
        guard: &mut RollGuard<'_>,
    ) -> Result<GambleOutcome, PresentationError> {
        let timing = roll.timing;

        self.inner
            .present(|p| p.play_roll(roll.is_win, timing.roll_buildup_ms))?;

        tokio::time::sleep(Duration::from_millis(timing.roll_buildup_ms)).await;
        if !self.inner.is_current(guard.generation) {
            guard.disarm();
            return Ok(GambleOutcome::Superseded);
        }

        if !roll.is_win {
            guard.disarm();
            if !self.inner.finish_loss(guard.generation) {
                return Ok(GambleOutcome::Superseded);
            }
            self.inner.notify(Notice::info(NOTICE_MISSED));
            self.inner.present(|p| p.play_loss())?;
            return Ok(GambleOutcome::Lost);
        }

        tokio::time::sleep(Duration::from_millis(timing.win_reveal_delay_ms)).await;
        let fever_ms = timing.fever_ms();
        match self.inner.enter_fever(guard.generation, fever_ms) {
            Some(fever_generation) => guard.generation = fever_generation,
            None => {
                guard.disarm();
                return Ok(GambleOutcome::Superseded);
            }
        }

        log::info!("[Gamble] jackpot, fever for {} ms", fever_ms);
        self.inner.notify(Notice::info(NOTICE_JACKPOT));
        self.inner.present(|p| p.start_fever(None))?;
        guard.disarm();
        Ok(GambleOutcome::Won)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESET / DISPOSE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Force Idle from any phase, cancelling the fever timer and any in-flight roll
    pub fn reset_state(&self) {
        let from = {
            let mut state = self.inner.state.lock();
            let from = state.phase();
            state.enter(Phase::Idle);
            from
        };

        if from != GamblePhase::Idle {
            log::info!("[Gamble] reset from {}", from.display_name());
        }
        self.inner.present_quiet("stop", |p| p.stop());
    }

    /// Cancel the fever timer and refuse further rolls; the phase is left as is
    pub fn dispose(&self) {
        let mut state = self.inner.state.lock();
        if let Phase::Fever { timer, .. } = &state.phase {
            timer.abort();
        }
        state.generation += 1;
        state.disposed = true;
        log::debug!("[Gamble] disposed in {}", state.phase().display_name());
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PRESENTATION SURFACE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Install a (new) surface, let it settle, then resume any running fever on it
    pub async fn attach_presentation(
        &self,
        channel: Arc<dyn PresentationChannel>,
    ) -> ResumeDecision {
        *self.inner.presentation.write() = Some(channel);

        let (flag, settle_ms) = {
            let config = self.inner.config.read();
            (config.disable_flashing_lights, config.timing.resume_settle_ms)
        };
        self.inner
            .present_quiet("updateConfig", |p| p.update_config(flag));

        if settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(settle_ms)).await;
        }
        self.resume_presentation()
    }

    /// Drop the surface; later notifications become no-ops
    pub fn detach_presentation(&self) {
        *self.inner.presentation.write() = None;
    }

    /// Re-issue `start_fever` with the remaining time, or correct a fever that
    /// expired while nobody was watching
    pub fn resume_presentation(&self) -> ResumeDecision {
        let decision = {
            let mut state = self.inner.state.lock();
            let decision = plan_resume(&state.snapshot(), self.inner.clock.now());
            if decision == ResumeDecision::Expired {
                state.enter(Phase::Idle);
            }
            decision
        };

        match decision {
            ResumeDecision::Resumed { remaining_ms } => {
                log::info!("[Gamble] resuming fever, {} ms left", remaining_ms);
                self.inner
                    .present_quiet("startFever", |p| p.start_fever(Some(remaining_ms)));
            }
            ResumeDecision::Expired => {
                log::warn!("[Gamble] fever expired while detached, back to Idle");
                self.inner.present_quiet("stop", |p| p.stop());
                self.inner.notify(Notice::info(NOTICE_FEVER_ENDED));
            }
            ResumeDecision::Inactive => {}
        }
        decision
    }

    /// Greeting before an automatic roll
    pub fn play_welcome(&self) {
        self.inner.present_quiet("playWelcome", |p| p.play_welcome());
    }

    /// Countdown for the running fever, if any
    pub fn fever_countdown(&self) -> Option<FeverCountdown> {
        let expires_at = self.get_state().fever_expires_at?;
        let remaining = millis_until(expires_at, self.inner.clock.now()).max(0) as u64;
        let total = self.inner.config.read().timing.fever_ms();
        Some(FeverCountdown::new(remaining, total))
    }
}

impl std::fmt::Debug for GambleStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GambleStateMachine")
            .field("state", &self.get_state())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for [`GambleStateMachine`]
pub struct GambleMachineBuilder {
    config: GambleConfig,
    outcome: Arc<dyn OutcomeSource>,
    clock: Arc<dyn Clock>,
    presentation: Option<Arc<dyn PresentationChannel>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl GambleMachineBuilder {
    pub fn new(config: GambleConfig) -> Self {
        Self {
            config,
            outcome: Arc::new(ThreadRngSource),
            clock: Arc::new(SystemClock),
            presentation: None,
            notifier: None,
        }
    }

    /// Substitute the draw source
    pub fn outcome_source(mut self, outcome: Arc<dyn OutcomeSource>) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn presentation(mut self, presentation: Arc<dyn PresentationChannel>) -> Self {
        self.presentation = Some(presentation);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> GambleStateMachine {
        GambleStateMachine {
            inner: Arc::new(Inner {
                state: Mutex::new(GambleState::new()),
                config: RwLock::new(self.config),
                outcome: self.outcome,
                clock: self.clock,
                presentation: RwLock::new(self.presentation),
                notifier: RwLock::new(self.notifier),
            }),
        }
    }
}
