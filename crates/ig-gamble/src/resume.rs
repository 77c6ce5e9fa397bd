//! Resumption: recompute remaining fever time for a reattached surface

use chrono::{DateTime, Utc};
use ig_core::millis_until;
use serde::{Deserialize, Serialize};

use crate::state::GambleSnapshot;

/// What a freshly attached surface should do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResumeDecision {
    /// No fever in progress
    Inactive,
    /// Fever still running; restart the countdown at `remaining_ms`
    Resumed { remaining_ms: u64 },
    /// Fever deadline passed while detached; the state is stale and must become Idle
    Expired,
}

impl ResumeDecision {
    pub fn remaining_ms(&self) -> Option<u64> {
        match self {
            Self::Resumed { remaining_ms } => Some(*remaining_ms),
            _ => None,
        }
    }
}

/// Decide how to resume from a snapshot taken at `now`
pub fn plan_resume(snapshot: &GambleSnapshot, now: DateTime<Utc>) -> ResumeDecision {
    let Some(expires_at) = snapshot.fever_expires_at.filter(|_| snapshot.is_fever()) else {
        return ResumeDecision::Inactive;
    };

    let remaining = millis_until(expires_at, now);
    if remaining > 0 {
        ResumeDecision::Resumed {
            remaining_ms: remaining as u64,
        }
    } else {
        ResumeDecision::Expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_idle_and_rolling_are_inactive() {
        let now = Utc::now();
        assert_eq!(plan_resume(&GambleSnapshot::idle(), now), ResumeDecision::Inactive);
        assert_eq!(plan_resume(&GambleSnapshot::rolling(), now), ResumeDecision::Inactive);
    }

    #[test]
    fn test_running_fever_resumes_with_remaining_time() {
        let now = Utc::now();
        let snapshot = GambleSnapshot::fever(now + Duration::milliseconds(10_000));
        let decision = plan_resume(&snapshot, now);
        assert_eq!(decision, ResumeDecision::Resumed { remaining_ms: 10_000 });
        assert_eq!(decision.remaining_ms(), Some(10_000));
    }

    #[test]
    fn test_passed_deadline_is_expired() {
        let now = Utc::now();
        let at_deadline = GambleSnapshot::fever(now);
        let past_deadline = GambleSnapshot::fever(now - Duration::seconds(3));
        assert_eq!(plan_resume(&at_deadline, now), ResumeDecision::Expired);
        assert_eq!(plan_resume(&past_deadline, now), ResumeDecision::Expired);
        assert_eq!(ResumeDecision::Expired.remaining_ms(), None);
    }
}
