//! The machine as seen by a trigger

use ig_gamble::GambleStateMachine;

/// What a trigger needs from the gamble machine
pub trait GambleTarget: Send + Sync {
    /// Fever is running; automatic rolls must wait
    fn is_fever(&self) -> bool;

    /// Greeting before an automatic roll
    fn play_welcome(&self);

    /// Start a roll without waiting for it
    fn request_gamble(&self, manual: bool);
}

impl GambleTarget for GambleStateMachine {
    fn is_fever(&self) -> bool {
        self.get_state().is_fever()
    }

    fn play_welcome(&self) {
        GambleStateMachine::play_welcome(self);
    }

    fn request_gamble(&self, manual: bool) {
        // Outcome is reported through presentation and notices
        drop(self.spawn_attempt(manual));
    }
}
