use ringlock_hardware::HardwareError;
use thiserror::Error;

/// Errors that stop the engine run loop.
///
/// Audio failures and lockout denials are absent: both are ordinary,
/// recoverable outcomes handled in place.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A trigger, actuator, or audio device fault the engine cannot work
    /// around. Actuator faults are fatal: a controller that cannot relock
    /// the door must not keep running as if it could.
    #[error("hardware fault: {0}")]
    Hardware(#[from] HardwareError),

    /// Configuration was rejected during engine construction.
    #[error("configuration rejected: {0}")]
    Config(#[from] ringlock_core::Error),

    /// The dispatcher channel is gone, so commands and scheduled deadlines
    /// can no longer be delivered. Without working deadlines the safety
    /// relock cannot be guaranteed.
    #[error("engine dispatcher is gone")]
    DispatcherGone,
}

pub type Result<T> = std::result::Result<T, EngineError>;
