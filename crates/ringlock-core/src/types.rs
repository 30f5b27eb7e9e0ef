use crate::{
    Result,
    constants::{MAX_CODE_LENGTH, MAX_VOLUME},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timing bucket a decoded press/release interval is classified into.
///
/// Each class has a configured inclusive window (see [`ClassWindows`]).
/// Windows are independent and may overlap; classification only ever tests
/// the class designated for the current decode step.
///
/// Configuration files encode classes as the integers `0..=3`, matching the
/// wire layout of the original installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DurationClass {
    /// Any interval inside the broad catch-all window.
    Any,

    /// A short press or pause, typically under half a second.
    Short,

    /// A deliberate press or pause of roughly one second.
    Long,

    /// An extended press or pause of roughly two seconds.
    VeryLong,
}

impl DurationClass {
    /// All classes in wire order.
    pub const ALL: [DurationClass; 4] = [
        DurationClass::Any,
        DurationClass::Short,
        DurationClass::Long,
        DurationClass::VeryLong,
    ];
}

impl TryFrom<u8> for DurationClass {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(DurationClass::Any),
            1 => Ok(DurationClass::Short),
            2 => Ok(DurationClass::Long),
            3 => Ok(DurationClass::VeryLong),
            other => Err(Error::UnknownDurationClass(other)),
        }
    }
}

impl From<DurationClass> for u8 {
    fn from(class: DurationClass) -> Self {
        match class {
            DurationClass::Any => 0,
            DurationClass::Short => 1,
            DurationClass::Long => 2,
            DurationClass::VeryLong => 3,
        }
    }
}

impl fmt::Display for DurationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DurationClass::Any => "any",
            DurationClass::Short => "short",
            DurationClass::Long => "long",
            DurationClass::VeryLong => "very long",
        };
        write!(f, "{}", name)
    }
}

/// Inclusive acceptance window for one duration class, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationWindow {
    /// Lower bound, inclusive.
    pub min_ms: u64,

    /// Upper bound, inclusive.
    pub max_ms: u64,
}

impl DurationWindow {
    /// Create a window, rejecting inverted bounds.
    pub fn new(class: DurationClass, min_ms: u64, max_ms: u64) -> Result<Self> {
        if min_ms > max_ms {
            return Err(Error::InvalidWindow {
                class: class.to_string(),
                min_ms,
                max_ms,
            });
        }
        Ok(Self { min_ms, max_ms })
    }

    /// Inclusive membership test.
    pub fn contains(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.min_ms && elapsed_ms <= self.max_ms
    }
}

/// The configured window for each duration class.
///
/// Overlapping windows are accepted by construction: the decoder only ever
/// consults the window of the class its current step designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassWindows {
    pub any: DurationWindow,
    pub short: DurationWindow,
    pub long: DurationWindow,
    pub very_long: DurationWindow,
}

impl ClassWindows {
    /// Look up the window designated for `class`.
    pub fn window_for(&self, class: DurationClass) -> DurationWindow {
        match class {
            DurationClass::Any => self.any,
            DurationClass::Short => self.short,
            DurationClass::Long => self.long,
            DurationClass::VeryLong => self.very_long,
        }
    }
}

impl Default for ClassWindows {
    /// Windows matching a typical doorbell installation.
    ///
    /// `any` is bounded above so no decode step can wait forever.
    fn default() -> Self {
        Self {
            any: DurationWindow {
                min_ms: 0,
                max_ms: 10_000,
            },
            short: DurationWindow {
                min_ms: 100,
                max_ms: 500,
            },
            long: DurationWindow {
                min_ms: 800,
                max_ms: 1_500,
            },
            very_long: DurationWindow {
                min_ms: 1_500,
                max_ms: 3_000,
            },
        }
    }
}

/// Ordered ring-code sequence of duration classes.
///
/// Odd positions (1st, 3rd, ...) are press-terminated intervals, even
/// positions are release-terminated. A press opens the sequence and a
/// release closes it, so a non-empty code must have odd length. The empty
/// sequence is valid and means "no code installed": the decoder can never
/// reach a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeSequence(Vec<DurationClass>);

impl CodeSequence {
    /// Create a sequence with validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CodeTooLong`] for sequences past [`MAX_CODE_LENGTH`]
    /// and [`Error::CodeEvenLength`] for non-empty even-length sequences.
    pub fn new(classes: Vec<DurationClass>) -> Result<Self> {
        let len = classes.len();
        if len > MAX_CODE_LENGTH {
            return Err(Error::CodeTooLong { len });
        }
        if len > 0 && len % 2 == 0 {
            return Err(Error::CodeEvenLength { len });
        }
        Ok(Self(classes))
    }

    /// Sequence with no steps; the decoder stays disarmed.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Number of steps `L`; the decoder cursor ranges over `[0, L]`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no code is installed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Class designated for decode step `step` (1-based cursor position).
    pub fn class_at(&self, step: usize) -> Option<DurationClass> {
        step.checked_sub(1).and_then(|i| self.0.get(i).copied())
    }

    /// Iterate the steps in order.
    pub fn iter(&self) -> impl Iterator<Item = DurationClass> + '_ {
        self.0.iter().copied()
    }
}

/// Flat on-disk layout of the code configuration.
///
/// Field names follow the original installation's JSON file so existing
/// config files keep working unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCodeConfig {
    any_min: u64,
    any_max: u64,
    short_min: u64,
    short_max: u64,
    long_min: u64,
    long_max: u64,
    very_long_min: u64,
    very_long_max: u64,
    code: Vec<u8>,
}

/// Validated decoder configuration: per-class windows plus the code sequence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCodeConfig")]
pub struct CodeConfig {
    pub windows: ClassWindows,
    pub code: CodeSequence,
}

impl CodeConfig {
    /// Build a config from already-validated parts.
    pub fn new(windows: ClassWindows, code: CodeSequence) -> Self {
        Self { windows, code }
    }

    /// Config with default windows and no code installed.
    ///
    /// Used as the fallback when a loaded configuration is rejected: the
    /// engine keeps running (bells, lockout accounting) but the terminal
    /// unlock step is unreachable.
    pub fn disarmed() -> Self {
        Self {
            windows: ClassWindows::default(),
            code: CodeSequence::empty(),
        }
    }
}

impl TryFrom<RawCodeConfig> for CodeConfig {
    type Error = Error;

    fn try_from(raw: RawCodeConfig) -> Result<Self> {
        let windows = ClassWindows {
            any: DurationWindow::new(DurationClass::Any, raw.any_min, raw.any_max)?,
            short: DurationWindow::new(DurationClass::Short, raw.short_min, raw.short_max)?,
            long: DurationWindow::new(DurationClass::Long, raw.long_min, raw.long_max)?,
            very_long: DurationWindow::new(
                DurationClass::VeryLong,
                raw.very_long_min,
                raw.very_long_max,
            )?,
        };

        let classes = raw
            .code
            .into_iter()
            .map(DurationClass::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            windows,
            code: CodeSequence::new(classes)?,
        })
    }
}

/// Authoritative physical lock state, read back from the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPhysicalState {
    Locked,
    Unlocked,
}

impl fmt::Display for LockPhysicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockPhysicalState::Locked => write!(f, "locked"),
            LockPhysicalState::Unlocked => write!(f, "unlocked"),
        }
    }
}

/// Last commanded target state.
///
/// Target and physical state can transiently disagree while a relock is
/// pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockTargetState {
    Secured,
    Unsecured,
}

impl fmt::Display for LockTargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockTargetState::Secured => write!(f, "secured"),
            LockTargetState::Unsecured => write!(f, "unsecured"),
        }
    }
}

/// Diagnostic event kinds recorded in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The trigger was heard but did not complete a valid attempt.
    Bell,

    /// A full code match actuated the lock.
    Unlocked,

    /// A full code match was blocked by the ringcode-enabled switch.
    Locked,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Bell => write!(f, "bell"),
            EventKind::Unlocked => write!(f, "unlocked"),
            EventKind::Locked => write!(f, "locked"),
        }
    }
}

/// Audio cue requested from the feedback dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Bell,
    Unlocked,
    Locked,
}

impl AudioCue {
    /// Lock-outcome cues always play at full step gain.
    pub fn forces_full_gain(&self) -> bool {
        matches!(self, AudioCue::Unlocked | AudioCue::Locked)
    }

    /// Conventional media file name for this cue.
    pub fn file_name(&self) -> &'static str {
        match self {
            AudioCue::Bell => "doorbell.wav",
            AudioCue::Unlocked => "unlocked.wav",
            AudioCue::Locked => "locked.wav",
        }
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Sampled logic level on the trigger input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Which logic level counts as "pressed" on the trigger input.
///
/// The reference wiring pulls the trigger up and the bell button shorts it
/// to ground, so the default is active-low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePolarity {
    #[default]
    Low,
    High,
}

impl ActivePolarity {
    /// True when `level` is the pressed polarity.
    pub fn is_active(&self, level: Level) -> bool {
        matches!(
            (self, level),
            (ActivePolarity::Low, Level::Low) | (ActivePolarity::High, Level::High)
        )
    }
}

/// Snapshot of the lock state handed to the persistence collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub target: LockTargetState,
    pub current: LockPhysicalState,
    pub auto_security_timeout: u32,
    pub volume: u8,
}

/// Validate a bell volume value.
pub fn validate_volume(volume: u8) -> Result<u8> {
    if volume > MAX_VOLUME {
        return Err(Error::InvalidVolume(volume));
    }
    Ok(volume)
}
