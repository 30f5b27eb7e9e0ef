//! Hardware boundary trait definitions.
//!
//! These traits establish the contract between the access-control engine and
//! the physical door hardware: the trigger input (doorbell button), the lock
//! actuator output, and the audio sink. They enable substitution between
//! mock implementations and real GPIO/audio backends.
//!
//! All traits are synchronous. The trigger is consumed from a
//! dedicated capture thread that is allowed to block; actuator writes are
//! short pin operations issued from the single dispatcher task; audio
//! playback runs on a detached worker thread for the duration of the cue.

use crate::error::Result;
use ringlock_core::{AudioCue, Level, LockPhysicalState};

/// Trigger input abstraction (the doorbell button pin).
///
/// Implementations block until the input level changes and return the level
/// sampled at interrupt time. Note that on real hardware the sampled level
/// can lag the edge that raised the interrupt; the engine's edge classifier
/// discards the resulting duplicate same-level reports.
///
/// # Examples
///
/// ```no_run
/// use ringlock_hardware::traits::TriggerInput;
/// use ringlock_hardware::error::Result;
///
/// fn capture_loop<T: TriggerInput>(trigger: &mut T) -> Result<()> {
///     loop {
///         let level = trigger.wait_for_edge()?;
///         println!("trigger level: {:?}", level);
///     }
/// }
/// ```
pub trait TriggerInput: Send {
    /// Block until a level-change interrupt fires, returning the sampled
    /// level.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::Disconnected`](crate::HardwareError::Disconnected)
    /// when the input source is torn down; the capture loop treats this as
    /// an orderly stop.
    fn wait_for_edge(&mut self) -> Result<Level>;
}

/// Lock actuator abstraction (the opener output pin).
///
/// The actuator is a dumb output: writes have no feedback guarantee, so the
/// authoritative physical state is always obtained through
/// [`read_state`](LockActuator::read_state), never assumed from a prior
/// write.
pub trait LockActuator: Send {
    /// Drive the output to the unlocked level and hold it.
    fn unlock(&mut self) -> Result<()>;

    /// Drive the output to the locked level.
    fn lock(&mut self) -> Result<()>;

    /// Issue a single momentary unlock pulse.
    ///
    /// The pulse width is a property of the physical mechanism, not of the
    /// caller; the output is back at the locked level when this returns.
    fn pulse(&mut self) -> Result<()>;

    /// Read the authoritative physical lock state back from the hardware.
    fn read_state(&mut self) -> Result<LockPhysicalState>;
}

/// Audio output abstraction.
///
/// `play` is synchronous and returns when the cue has finished (or failed);
/// the engine invokes it from a detached worker thread and guarantees at
/// most one logically active playback through its own overlap gate.
pub trait AudioSink: Send + Sync {
    /// Play `cue` at `gain` in `[0.0, 1.0]`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::PlaybackFailed`](crate::HardwareError::PlaybackFailed)
    /// on device or file errors. A failed playback is abandoned, never
    /// retried.
    fn play(&self, cue: AudioCue, gain: f32) -> Result<()>;
}
