//! ig-core: Shared types, traits, and utilities for Idle Gamble
//!
//! This crate provides the foundational types used across all Idle Gamble crates:
//! the error type, the wall-clock abstraction, configuration, and countdown math.

mod clock;
mod config;
mod countdown;
mod error;

pub use clock::*;
pub use config::*;
pub use countdown::*;
pub use error::*;
