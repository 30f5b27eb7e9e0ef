//! Hardware abstraction layer for the Ringlock door access controller.
//!
//! This crate provides trait-based abstractions for the three pieces of
//! physical hardware the engine touches: the trigger input (doorbell
//! button), the lock actuator (opener relay/pin), and the audio sink used
//! for feedback cues. The traits enable substitution between mock
//! implementations (for development and testing) and real GPIO/audio
//! backends.
//!
//! # Design Philosophy
//!
//! - **Blocking at the edge**: the trigger is consumed from a dedicated
//!   capture thread, so [`TriggerInput::wait_for_edge`] blocks like the
//!   interrupt source it models. Actuator writes are short pin operations;
//!   audio playback blocks a detached worker for the length of the cue.
//! - **Read-back over assumption**: the actuator exposes
//!   [`LockActuator::read_state`] because writes carry no feedback
//!   guarantee; the engine never assumes physical state from a command.
//! - **Error-aware**: all operations return [`Result<T>`][error::Result]
//!   with device-level context.
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides channel-driven simulations of all three
//! devices, each returned together with a controller handle:
//!
//! ```
//! use ringlock_hardware::mock::{MockActuator, MockTrigger};
//! use ringlock_hardware::traits::{LockActuator, TriggerInput};
//! use ringlock_core::{Level, LockPhysicalState};
//!
//! let (mut trigger, trigger_handle) = MockTrigger::new();
//! let (mut actuator, _actuator_handle) = MockActuator::new();
//!
//! trigger_handle.press().unwrap();
//! assert_eq!(trigger.wait_for_edge().unwrap(), Level::Low);
//!
//! actuator.unlock().unwrap();
//! assert_eq!(actuator.read_state().unwrap(), LockPhysicalState::Unlocked);
//! ```
//!
//! # Real Hardware
//!
//! Real backends live behind the `hardware-gpio` and `hardware-alsa`
//! feature flags (not yet implemented); the mock set is sufficient for the
//! engine's full test surface.

pub mod error;
pub mod mock;
pub mod traits;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{AudioSink, LockActuator, TriggerInput};
