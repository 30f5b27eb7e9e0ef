//! Ring-code pattern decoder.
//!
//! The decoder is a state machine over a single integer cursor `s` in
//! `[0, L]`, where `L` is the configured code length. Even cursor values
//! expect a press, odd values expect a release; each event is classified by
//! the time elapsed since the previous logical edge against the duration
//! window its step designates.
//!
//! # Transitions
//!
//! - `s = 0` (idle), press: advance to 1 unconditionally. No timing is
//!   evaluated at the opening press, but it counts against the brute-force
//!   budget, and this is also where an elapsed lockout window is noticed.
//! - `s = 1`, release: classify against step 1. Match while allowed
//!   advances; anything else resets to 0 and rings the bell (trigger heard,
//!   not a valid attempt).
//! - `1 < s < L`: match while allowed advances. A failed press step resets
//!   to 1 (the opening press is kept, allowing an immediate retry) and
//!   rings the bell; a failed release step resets to 0, since a release
//!   failure means the press before it was itself invalid context.
//! - `s = L` (final release): match while allowed fires the solved action
//!   and resets to 0; a mismatch resets silently.
//!
//! A cursor outside `[0, L]` is unreachable if the transitions above are
//! correct; it is still checked on every event and force-reset with a loud
//! log line rather than allowed to index out of range.
//!
//! The decoder performs no I/O and never blocks: it returns a
//! [`DecodeOutcome`] and the runtime dispatches the side effects.

use crate::edge::EdgeKind;
use crate::lockout::LockoutGuard;
use ringlock_core::{ClassWindows, CodeConfig, CodeSequence, DurationClass};
use std::time::Instant;
use tracing::{debug, error, trace};

/// What the runtime must do after one decoded edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Event consumed; no feedback required.
    Quiet,

    /// Trigger heard but not part of a valid attempt: ring the bell.
    Bell,

    /// The full code matched while unlocking was allowed.
    Solved,
}

/// Ring-code state machine.
///
/// Owns the cursor, the previous-edge timestamp, and the lockout guard.
/// All state lives in this struct and is mutated only through
/// [`handle_edge`](PatternDecoder::handle_edge).
#[derive(Debug)]
pub struct PatternDecoder {
    windows: ClassWindows,
    code: CodeSequence,
    cursor: usize,
    last_edge: Option<Instant>,
    allowed: bool,
    lockout: LockoutGuard,
}

impl PatternDecoder {
    /// Create a decoder for a validated configuration.
    ///
    /// An empty code sequence is accepted: the decoder then only feeds the
    /// lockout budget and can never reach a terminal state.
    pub fn new(config: CodeConfig) -> Self {
        Self {
            windows: config.windows,
            code: config.code,
            cursor: 0,
            last_edge: None,
            allowed: true,
            lockout: LockoutGuard::new(),
        }
    }

    /// Current cursor position (0 is idle, `L` is the terminal step).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Feed one classified edge, timestamped at capture.
    pub fn handle_edge(&mut self, kind: EdgeKind, at: Instant) -> DecodeOutcome {
        let elapsed_ms = self
            .last_edge
            .map(|prev| at.duration_since(prev).as_millis() as u64)
            .unwrap_or(u64::MAX);
        self.last_edge = Some(at);

        let len = self.code.len();
        if len == 0 {
            // No code installed. Presses still count toward the brute-force
            // budget so an attacker cannot probe for free while a bad
            // configuration is being fixed.
            if kind == EdgeKind::Press {
                self.allowed = self.lockout.allow(at);
            }
            return DecodeOutcome::Quiet;
        }

        if self.cursor > len {
            error!(cursor = self.cursor, len, "cursor out of range; resetting");
            self.cursor = 0;
            return DecodeOutcome::Quiet;
        }

        let outcome = if self.cursor % 2 == 0 {
            self.on_press_step(kind, elapsed_ms, at)
        } else {
            self.on_release_step(kind, elapsed_ms)
        };

        trace!(
            cursor = self.cursor,
            allowed = self.allowed,
            elapsed_ms,
            ?outcome,
            "edge decoded"
        );
        outcome
    }

    /// Even cursor: a press terminates this step.
    fn on_press_step(&mut self, kind: EdgeKind, elapsed_ms: u64, at: Instant) -> DecodeOutcome {
        if self.cursor == 0 {
            // Idle: nothing to check for the opening press.
            if kind == EdgeKind::Press {
                self.cursor = 1;
                self.allowed = self.lockout.allow(at);
            }
            return DecodeOutcome::Quiet;
        }

        let class = self.step_class();
        if kind == EdgeKind::Press && self.matches(class, elapsed_ms) && self.allowed {
            self.cursor += 1;
            DecodeOutcome::Quiet
        } else {
            // Keep the opening press: retry continues from cursor 1, but
            // only within the brute-force budget.
            self.cursor = 1;
            self.allowed = self.lockout.allow(at);
            DecodeOutcome::Bell
        }
    }

    /// Odd cursor: a release terminates this step.
    fn on_release_step(&mut self, kind: EdgeKind, elapsed_ms: u64) -> DecodeOutcome {
        let class = self.step_class();
        let matched = kind == EdgeKind::Release && self.matches(class, elapsed_ms) && self.allowed;

        if self.cursor == self.code.len() {
            // Terminal step.
            self.cursor = 0;
            if matched {
                debug!("ring code solved");
                return DecodeOutcome::Solved;
            }
            return DecodeOutcome::Quiet;
        }

        if self.cursor == 1 {
            if matched {
                self.cursor = 2;
                DecodeOutcome::Quiet
            } else {
                self.cursor = 0;
                DecodeOutcome::Bell
            }
        } else if matched {
            self.cursor += 1;
            DecodeOutcome::Quiet
        } else {
            self.cursor = 0;
            DecodeOutcome::Quiet
        }
    }

    /// Class designated for the step the cursor is on.
    fn step_class(&self) -> DurationClass {
        // The cursor is validated against `[0, len]` before dispatch, so
        // the lookup cannot miss.
        self.code
            .class_at(self.cursor)
            .unwrap_or(DurationClass::Any)
    }

    fn matches(&self, class: DurationClass, elapsed_ms: u64) -> bool {
        self.windows.window_for(class).contains(elapsed_ms)
    }

    #[cfg(test)]
    fn force_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }
}
