//! # ig-gamble: Idle Gamble state machine
//!
//! A cosmetic jackpot for the editor: a trigger rolls a random chance and a
//! win plays a timed "fever" celebration with a visible countdown.
//!
//! ## Architecture
//!
//! ```text
//! TriggerSource / surface "roll"
//!     │
//!     v
//! GambleStateMachine ── OutcomeSource (draw in [0, 1))
//!     │
//!     ├── Idle ──attempt──> Rolling ──win (buildup + reveal)──> Fever ──expiry──> Idle
//!     │                        └──loss (buildup)──> Idle
//!     │
//!     ├── PresentationChannel (playRoll / playLoss / startFever / stop)
//!     └── Notifier (user-visible notices)
//! ```
//!
//! Fever expiry is anchored to an absolute wall-clock deadline so a surface
//! that reattaches mid-fever resumes the countdown instead of restarting it.

pub mod machine;
pub mod notice;
pub mod outcome;
pub mod presentation;
pub mod resume;
pub mod state;

pub use machine::*;
pub use notice::*;
pub use outcome::*;
pub use presentation::*;
pub use resume::*;
pub use state::*;
