//! Clock and actor helpers

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Duration, Local, NaiveDateTime};

use crate::types::Actor;

/// Source of "now" for revision allocation and retention
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Block for `duration`
    fn sleep(&self, duration: std::time::Duration) {
        std::thread::sleep(duration);
    }
}

/// Local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    start: NaiveDateTime,
    offset_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            offset_ms: AtomicI64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, to: NaiveDateTime) {
        let offset = (to - self.start).num_milliseconds();
        self.offset_ms.store(offset, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.start + Duration::milliseconds(self.offset_ms.load(Ordering::SeqCst))
    }

    /// Advances the clock instead of blocking
    fn sleep(&self, duration: std::time::Duration) {
        self.offset_ms
            .fetch_add(duration.as_millis() as i64, Ordering::SeqCst);
    }
}

/// Get current actor from git config or OS environment
pub fn current_actor() -> Actor {
    use std::env;
    use std::process::Command;

    // 1. Try Git Config (preferred for project context)
    if let Ok(output) = Command::new("git").args(["config", "user.name"]).output() {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                let id = env::var("USER")
                    .or_else(|_| env::var("USERNAME"))
                    .unwrap_or_else(|_| name.clone());
                return Actor::new(name, id);
            }
        }
    }

    // 2. Try OS Environment Variable
    env::var("USER") // Linux/Mac
        .or_else(|_| env::var("USERNAME")) // Windows
        .map(|user| Actor::new(user.clone(), user))
        .unwrap_or_else(|_| Actor::unknown())
}
