//! Core constants for the ring-code access control engine.
//!
//! This module centralizes the timing and capacity limits shared between the
//! decoder, the lockout guard, the relock scheduler, and the audio feedback
//! path. These values were chosen to match the behavior of a physical door
//! installation; changing them changes the observable unlock protocol.
//!
//! # Usage
//!
//! ```
//! use ringlock_core::constants::*;
//! use std::time::Duration;
//!
//! let window = Duration::from_millis(LOCKOUT_WINDOW_MS);
//! assert_eq!(window.as_secs(), 30);
//! assert!(MAX_CODE_LENGTH >= 1);
//! ```

// ============================================================================
// Ring-code sequence
// ============================================================================

/// Maximum number of duration classes a configured code may contain.
///
/// A code of length `L` requires `L + 1` edge transitions to complete
/// (a press opens the sequence, a release closes it), so this bounds the
/// decoder cursor range to `[0, 21]`.
pub const MAX_CODE_LENGTH: usize = 21;

// ============================================================================
// Brute-force lockout
// ============================================================================

/// Idle gap after which the lockout guard grants full amnesty, in milliseconds.
///
/// If no attempt is seen for this long, the attempt counter resets to zero
/// and unlocking is re-allowed.
pub const LOCKOUT_WINDOW_MS: u64 = 30_000;

/// Number of attempts allowed inside one lockout window.
///
/// The guard denies once the running count exceeds this value, i.e. the
/// fourth and subsequent rapid attempts are disallowed.
pub const LOCKOUT_MAX_ATTEMPTS: u32 = 3;

// ============================================================================
// Lock actuation and relock scheduling
// ============================================================================

/// Settle delay before re-reading physical lock state, in milliseconds.
///
/// The actuator is a dumb output with no instantaneous feedback guarantee;
/// state confirmation waits this long before reading back.
pub const RELOCK_CONFIRM_DELAY_MS: u64 = 500;

/// Safety relock deadline after a momentary pulse, in milliseconds.
///
/// Used when the auto-security timeout is the pulse sentinel (`1`): the
/// physical pulse mechanism relocks on its own, and this deadline forces the
/// target state back to secured as a safety net.
pub const PULSE_SAFETY_RELOCK_MS: u64 = 2_000;

/// Auto-security timeout value meaning "hold open until told otherwise".
pub const AUTO_SECURITY_HOLD_OPEN: u32 = 0;

/// Auto-security timeout value meaning "momentary pulse only".
pub const AUTO_SECURITY_PULSE: u32 = 1;

// ============================================================================
// Audio feedback
// ============================================================================

/// Step gain applied to the first cue after an idle period.
pub const AUDIO_LOW_GAIN: f32 = 0.5;

/// Ceiling for the escalating step gain.
pub const AUDIO_MAX_GAIN: f32 = 1.0;

/// Idle gap after which the step gain falls back to [`AUDIO_LOW_GAIN`],
/// in milliseconds.
pub const AUDIO_IDLE_RESET_MS: u64 = 10_000;

/// Coalescing window for outward bell notifications, in milliseconds.
///
/// Rings closer together than this raise a single outward notification;
/// every ring is still written to the event log.
pub const BELL_COALESCE_MS: u64 = 10_000;

// ============================================================================
// Event log and settings
// ============================================================================

/// Fixed capacity of the diagnostic event log ring buffer.
pub const EVENT_LOG_CAPACITY: usize = 10;

/// Maximum accepted bell volume.
pub const MAX_VOLUME: u8 = 100;

/// Volume used when no explicit value has been configured.
pub const DEFAULT_VOLUME: u8 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_range_fits_code_length() {
        // The decoder cursor is `[0, L]`; the terminal step must be reachable
        // for the longest supported code.
        assert!(MAX_CODE_LENGTH < u8::MAX as usize);
    }

    #[test]
    fn test_gain_ladder_bounds() {
        assert!(AUDIO_LOW_GAIN < AUDIO_MAX_GAIN);
        assert!(AUDIO_MAX_GAIN <= 1.0);
    }

    #[test]
    fn test_sentinels_are_distinct() {
        assert_ne!(AUTO_SECURITY_HOLD_OPEN, AUTO_SECURITY_PULSE);
    }
}
