//! Error types for hardware operations.
//!
//! This module defines error types specific to the door hardware boundary:
//! the trigger input, the lock actuator output, and the audio sink.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been torn down.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// GPIO read or write failed.
    #[error("GPIO error: {message}")]
    Gpio { message: String },

    /// Audio playback failed on the output device or the cue file.
    #[error("Playback failed: {message}")]
    PlaybackFailed { message: String },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new GPIO error.
    pub fn gpio(message: impl Into<String>) -> Self {
        Self::Gpio {
            message: message.into(),
        }
    }

    /// Create a new playback error.
    pub fn playback(message: impl Into<String>) -> Self {
        Self::PlaybackFailed {
            message: message.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
