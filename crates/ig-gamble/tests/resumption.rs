//! Surface reattachment and fever resumption

mod common;

use common::*;
use ig_core::{GambleConfig, TimingConfig};
use ig_gamble::{GambleOutcome, GamblePhase, NOTICE_FEVER_ENDED, ResumeDecision};

fn resumed_ms(decision: ResumeDecision) -> u64 {
    decision
        .remaining_ms()
        .unwrap_or_else(|| panic!("expected a resumed fever, got {:?}", decision))
}

fn fever_start_calls(presentation: &RecordingPresentation) -> Vec<Option<u64>> {
    presentation
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::StartFever(resume) => Some(resume),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_resume_reissues_remaining_not_full_duration() {
    let h = harness(0.0, config(0.8));
    assert_eq!(h.machine.attempt_gamble(true).await, GambleOutcome::Won);

    sleep_ms(FEVER_MS - 10_000).await;
    let remaining = resumed_ms(h.machine.resume_presentation());
    assert!(remaining.abs_diff(10_000) <= 1, "remaining {}", remaining);

    let starts = fever_start_calls(&h.presentation);
    assert_eq!(starts.len(), 2);
    assert_eq!(starts[0], None);
    assert_eq!(starts[1], Some(remaining));
    assert_ne!(starts[1], Some(FEVER_MS));
}

#[tokio::test(start_paused = true)]
async fn test_attach_new_surface_waits_settle_then_resumes() {
    let h = harness(0.0, config(0.8));
    h.machine.attempt_gamble(true).await;
    sleep_ms(60_000).await;

    let reloaded = RecordingPresentation::new();
    let decision = h.machine.attach_presentation(reloaded.clone()).await;

    // 60 s elapsed before attach, plus the 500 ms settle
    let remaining = resumed_ms(decision);
    assert!(remaining.abs_diff(FEVER_MS - 60_500) <= 1, "remaining {}", remaining);
    assert_eq!(
        reloaded.calls(),
        vec![Call::UpdateConfig(false), Call::StartFever(Some(remaining))]
    );

    // Old surface hears nothing further; expiry goes to the new one
    let old_calls = h.presentation.calls().len();
    sleep_ms(remaining + 1).await;
    assert_eq!(h.machine.phase(), GamblePhase::Idle);
    assert_eq!(h.presentation.calls().len(), old_calls);
    assert_eq!(reloaded.count(Call::Stop), 1);
}

#[tokio::test(start_paused = true)]
async fn test_attach_while_idle_is_inactive() {
    let h = harness(0.0, config(0.8));
    let surface = RecordingPresentation::new();

    let decision = h.machine.attach_presentation(surface.clone()).await;

    assert_eq!(decision, ResumeDecision::Inactive);
    assert_eq!(surface.calls(), vec![Call::UpdateConfig(false)]);
}

#[tokio::test(start_paused = true)]
async fn test_attach_forwards_reduced_motion_flag() {
    let config = GambleConfig {
        disable_flashing_lights: true,
        timing: TimingConfig::instant(),
        ..GambleConfig::default()
    };
    let h = harness(0.0, config);
    let surface = RecordingPresentation::new();

    h.machine.attach_presentation(surface.clone()).await;
    assert_eq!(surface.calls(), vec![Call::UpdateConfig(true)]);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_passed_while_suspended_is_corrected() {
    let h = harness(0.0, config(0.8));
    h.machine.attempt_gamble(true).await;

    // Host suspended: wall clock jumps past the deadline, the timer never ran
    h.clock.skew_ms((FEVER_MS + 5_000) as i64);
    assert_eq!(h.machine.phase(), GamblePhase::Fever);

    let decision = h.machine.resume_presentation();
    assert_eq!(decision, ResumeDecision::Expired);

    let state = h.machine.get_state();
    assert_eq!(state.phase, GamblePhase::Idle);
    assert!(state.fever_expires_at.is_none());
    assert_eq!(fever_start_calls(&h.presentation), vec![None]);
    assert_eq!(h.presentation.count(Call::Stop), 1);
    assert!(h.notifier.texts().contains(&NOTICE_FEVER_ENDED.to_string()));

    // The first timer is stale now and must stay quiet
    sleep_ms(FEVER_MS + 1).await;
    assert_eq!(h.presentation.count(Call::Stop), 1);
}

#[tokio::test(start_paused = true)]
async fn test_detached_machine_keeps_running() {
    let h = harness(0.0, config(0.8));
    h.machine.detach_presentation();

    assert_eq!(h.machine.attempt_gamble(true).await, GambleOutcome::Won);
    assert!(h.presentation.calls().is_empty());

    let surface = RecordingPresentation::new();
    let decision = h.machine.attach_presentation(surface.clone()).await;
    assert!(decision.remaining_ms().is_some());
    assert_eq!(fever_start_calls(&surface).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_tracks_remaining_time() {
    let h = harness(0.0, config(0.8));
    assert!(h.machine.fever_countdown().is_none());

    h.machine.attempt_gamble(true).await;
    sleep_ms(FEVER_MS - 2_500).await;

    let countdown = h.machine.fever_countdown().unwrap();
    assert!(countdown.remaining_ms.abs_diff(2_500) <= 1);
    assert!(countdown.volume() < 0.51);
    assert!(countdown.playback_offset_ms().abs_diff(FEVER_MS - 2_500) <= 1);
}
