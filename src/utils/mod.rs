//! Utility functions and helpers
//!
//! This module contains the clock abstraction, actor lookup and atomic file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write, atomic_write_with};
pub use time::{current_actor, Clock, ManualClock, SystemClock};
