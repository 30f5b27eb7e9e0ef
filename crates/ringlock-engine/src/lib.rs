//! Ring-code access-control engine.
//!
//! This crate turns raw edge transitions on a door trigger input into lock
//! actuation: edges are debounced and classified ([`edge`]), decoded
//! against a configured timed ring code ([`decoder`]), throttled against
//! brute force ([`lockout`]), and on a full match drive the lock actuator.
//! Externally commanded unlocks go through the lock controller and its
//! deferred auto-relock policy ([`relock`]). Feedback is an audio cue
//! ([`audio`]) plus an entry in a small diagnostic log ([`events`]).
//!
//! # Architecture
//!
//! ```text
//! trigger ISR thread          dispatcher task              workers
//! ┌────────────────┐   Edge   ┌──────────────────┐
//! │ TriggerInput   │─────────►│ PatternDecoder   │     ┌───────────┐
//! │ EdgeClassifier │  (mpsc)  │ LockoutGuard     │────►│ audio     │
//! └────────────────┘          │ LockController ◄─┼──┐  │ worker    │
//!                             │ AudioDispatcher  │  │  └───────────┘
//!      accessory layer        │ EventLog         │  │ Relock/Confirm
//!     ───────────────────────►└──────────────────┘  │ deadlines
//!      SetTarget, SetVolume…       │ notifications  │ (OneShotTimer)
//!                                  ▼                │
//!                      TargetStateChanged, Persist… ┘
//! ```
//!
//! All state mutation is serialized on the dispatcher task; the capture
//! thread only classifies and posts, and timer deadlines post commands
//! back into the same channel instead of running callbacks of their own.

pub mod audio;
pub mod decoder;
pub mod edge;
pub mod error;
pub mod events;
pub mod lockout;
pub mod relock;
pub mod runtime;
pub mod settings;
pub mod timer;

pub use audio::AudioDispatcher;
pub use decoder::{DecodeOutcome, PatternDecoder};
pub use edge::{EdgeClassifier, EdgeKind};
pub use error::{EngineError, Result};
pub use events::{EventLog, EventRecord};
pub use lockout::LockoutGuard;
pub use relock::LockController;
pub use runtime::{EdgeEvent, Engine, EngineCommand, EngineHandle, Notification, spawn_capture};
pub use settings::HardwareSettings;
pub use timer::OneShotTimer;
