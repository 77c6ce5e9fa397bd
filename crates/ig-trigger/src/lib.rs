//! # ig-trigger: when to roll
//!
//! Turns host signals (a task process exiting, a test run finishing, the
//! manual command) into gamble requests, with a cooldown against event storms
//! and no automatic rolls while fever is running.

pub mod signal;
pub mod source;
pub mod target;

pub use signal::*;
pub use source::*;
pub use target::*;
