//! Trigger source: success signals in, gamble requests out

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use ig_core::{Clock, GambleConfig, SystemClock, millis_until};

use crate::signal::{TestRunSummary, TriggerSignal};
use crate::target::GambleTarget;

/// What happened to a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerDecision {
    /// A roll was requested
    Triggered,
    /// The signal did not report a success
    NotSuccessful,
    /// Automatic triggering is switched off
    Disabled,
    /// Fever is running
    FeverActive,
    /// Too soon after the previous automatic trigger
    CoolingDown { remaining_ms: u64 },
}

impl TriggerDecision {
    pub fn is_triggered(&self) -> bool {
        matches!(self, Self::Triggered)
    }
}

#[derive(Debug, Clone, Copy)]
struct TriggerSettings {
    enabled: bool,
    cooldown_ms: u64,
}

impl From<&GambleConfig> for TriggerSettings {
    fn from(config: &GambleConfig) -> Self {
        Self {
            enabled: config.trigger_on_test_success,
            cooldown_ms: config.timing.trigger_cooldown_ms,
        }
    }
}

/// Decides when host signals become gamble requests
pub struct TriggerSource {
    target: Arc<dyn GambleTarget>,
    clock: Arc<dyn Clock>,
    settings: RwLock<TriggerSettings>,
    last_trigger: Mutex<Option<DateTime<Utc>>>,
}

impl TriggerSource {
    pub fn new(target: Arc<dyn GambleTarget>, config: &GambleConfig) -> Self {
        Self::with_clock(target, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        target: Arc<dyn GambleTarget>,
        config: &GambleConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            target,
            clock,
            settings: RwLock::new(TriggerSettings::from(config)),
            last_trigger: Mutex::new(None),
        }
    }

    /// Pick up changed settings
    pub fn update_config(&self, config: &GambleConfig) {
        *self.settings.write() = TriggerSettings::from(config);
    }

    /// Route any host signal
    pub fn handle(&self, signal: &TriggerSignal) -> TriggerDecision {
        match signal {
            TriggerSignal::Manual => {
                self.manual();
                TriggerDecision::Triggered
            }
            _ if !signal.is_success() => TriggerDecision::NotSuccessful,
            _ => self.try_trigger(),
        }
    }

    /// A task process ended
    pub fn on_task_end(&self, exit_code: Option<i32>) -> TriggerDecision {
        self.handle(&TriggerSignal::TaskEnded { exit_code })
    }

    /// Test results changed; most recent run first
    pub fn on_test_results(&self, runs: &[TestRunSummary]) -> TriggerDecision {
        self.handle(&TriggerSignal::TestResults {
            runs: runs.to_vec(),
        })
    }

    /// The gamble command: bypasses cooldown and fever suppression
    pub fn manual(&self) {
        log::debug!("[Trigger] manual gamble");
        self.target.request_gamble(true);
    }

    /// Check enabled, fever, and cooldown, then fire
    fn try_trigger(&self) -> TriggerDecision {
        let settings = *self.settings.read();
        if !settings.enabled {
            return TriggerDecision::Disabled;
        }
        if self.target.is_fever() {
            log::debug!("[Trigger] fever active, skipping");
            return TriggerDecision::FeverActive;
        }

        let now = self.clock.now();
        {
            let mut last = self.last_trigger.lock();
            if let Some(previous) = *last {
                let since = -millis_until(previous, now);
                if since < settings.cooldown_ms as i64 {
                    let remaining_ms = (settings.cooldown_ms as i64 - since) as u64;
                    log::debug!("[Trigger] cooling down, {} ms left", remaining_ms);
                    return TriggerDecision::CoolingDown { remaining_ms };
                }
            }
            *last = Some(now);
        }

        log::info!("[Trigger] success signal, rolling");
        self.target.play_welcome();
        self.target.request_gamble(false);
        TriggerDecision::Triggered
    }
}
