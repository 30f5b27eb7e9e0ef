use thiserror::Error;

use crate::constants::{MAX_CODE_LENGTH, MAX_VOLUME};

/// Errors raised while validating configuration or shared state values.
#[derive(Error, Debug)]
pub enum Error {
    /// Configured code exceeds the supported cursor range.
    ///
    /// The decoder cannot represent a cursor past [`MAX_CODE_LENGTH`], so an
    /// over-long code can never complete. Surfaced loudly instead of being
    /// silently truncated.
    #[error("ring code has {len} steps, supported maximum is {MAX_CODE_LENGTH}")]
    CodeTooLong { len: usize },

    /// Configured code has an even number of steps.
    ///
    /// A valid sequence opens with a press and closes with a release, which
    /// requires an odd step count.
    #[error("ring code has even length {len}; a code must end on a release")]
    CodeEvenLength { len: usize },

    /// A duration class window has `min > max`.
    #[error("window for {class} is inverted: {min_ms}ms > {max_ms}ms")]
    InvalidWindow {
        class: String,
        min_ms: u64,
        max_ms: u64,
    },

    /// A duration class integer outside the known range was supplied.
    #[error("unknown duration class code: {0}")]
    UnknownDurationClass(u8),

    /// Volume outside `[0, 100]`.
    #[error("volume must be 0-{MAX_VOLUME}, got {0}")]
    InvalidVolume(u8),

    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
