//! Brute-force throttling for unlock attempts.
//!
//! The guard bounds how many ring attempts may count as unlockable inside
//! a rolling window. It never blocks the decoder's state transitions; a
//! denial only prevents a timing match from being treated as successful.

use ringlock_core::constants::{LOCKOUT_MAX_ATTEMPTS, LOCKOUT_WINDOW_MS};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Attempt counter with full amnesty after an idle window.
///
/// Every call counts as an attempt. Once the count exceeds
/// [`LOCKOUT_MAX_ATTEMPTS`], calls are denied, but each denial also
/// decrements the counter back by one. That pins the denial threshold in
/// place instead of letting the counter grow without bound, so a single
/// 30 s gap is always enough to recover.
///
/// # Examples
///
/// ```
/// use ringlock_engine::lockout::LockoutGuard;
/// use std::time::Instant;
///
/// let mut guard = LockoutGuard::new();
/// let now = Instant::now();
///
/// assert!(guard.allow(now));
/// assert!(guard.allow(now));
/// assert!(guard.allow(now));
/// // Fourth rapid attempt is denied.
/// assert!(!guard.allow(now));
/// ```
#[derive(Debug)]
pub struct LockoutGuard {
    count: u32,
    last_check: Option<Instant>,
}

impl LockoutGuard {
    pub fn new() -> Self {
        Self {
            count: 0,
            last_check: None,
        }
    }

    /// Register an attempt at `now` and report whether unlocking is
    /// currently allowed.
    pub fn allow(&mut self, now: Instant) -> bool {
        let window = Duration::from_millis(LOCKOUT_WINDOW_MS);
        if let Some(prev) = self.last_check
            && now.duration_since(prev) > window
        {
            info!("lockout window elapsed; unlocking re-allowed");
            self.count = 0;
        }
        self.last_check = Some(now);

        self.count += 1;
        if self.count > LOCKOUT_MAX_ATTEMPTS {
            // Step back down so the counter cannot grow without bound.
            self.count -= 1;
            info!(attempts = self.count, "unlocking disallowed");
            return false;
        }

        debug!(attempts = self.count, "attempt counted");
        true
    }

    /// Attempts counted inside the current window.
    pub fn attempts(&self) -> u32 {
        self.count
    }
}

impl Default for LockoutGuard {
    fn default() -> Self {
        Self::new()
    }
}
