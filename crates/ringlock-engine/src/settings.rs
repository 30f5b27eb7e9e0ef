//! Mutex-guarded shared hardware settings.
//!
//! Volume and the ringcode-enabled switch are written by the accessory
//! side while the audio worker thread reads them, so both live behind one
//! mutex in a cloneable handle instead of ad hoc globals.

use ringlock_core::{
    Result,
    constants::DEFAULT_VOLUME,
    types::validate_volume,
};
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Debug)]
struct SharedHardwareConfig {
    volume: u8,
    ringcode_enabled: bool,
}

/// Cloneable handle to the shared hardware settings.
///
/// All clones observe the same values; the critical sections are a single
/// field read or write each.
///
/// # Examples
///
/// ```
/// use ringlock_engine::settings::HardwareSettings;
///
/// let settings = HardwareSettings::new();
/// let reader = settings.clone();
///
/// settings.set_volume(40).unwrap();
/// assert_eq!(reader.volume(), 40);
/// ```
#[derive(Debug, Clone)]
pub struct HardwareSettings {
    inner: Arc<Mutex<SharedHardwareConfig>>,
}

impl HardwareSettings {
    /// Settings with the default volume and the ring code enabled.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SharedHardwareConfig {
                volume: DEFAULT_VOLUME,
                ringcode_enabled: true,
            })),
        }
    }

    /// Settings with explicit initial values.
    pub fn with_values(volume: u8, ringcode_enabled: bool) -> Result<Self> {
        let volume = validate_volume(volume)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(SharedHardwareConfig {
                volume,
                ringcode_enabled,
            })),
        })
    }

    /// Current bell volume in `[0, 100]`.
    pub fn volume(&self) -> u8 {
        self.inner.lock().expect("settings poisoned").volume
    }

    /// Set the bell volume.
    pub fn set_volume(&self, volume: u8) -> Result<()> {
        let volume = validate_volume(volume)?;
        info!(volume, "bell volume set");
        self.inner.lock().expect("settings poisoned").volume = volume;
        Ok(())
    }

    /// Whether a solved ring code may actuate the lock.
    pub fn ringcode_enabled(&self) -> bool {
        self.inner.lock().expect("settings poisoned").ringcode_enabled
    }

    /// Enable or disable unlocking by ring code.
    ///
    /// Disabling does not pause decoding: a solved code while disabled
    /// produces the "locked" feedback instead of actuation.
    pub fn set_ringcode_enabled(&self, enabled: bool) {
        info!(enabled, "ringcode switch set");
        self.inner.lock().expect("settings poisoned").ringcode_enabled = enabled;
    }
}

impl Default for HardwareSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = HardwareSettings::new();
        assert_eq!(settings.volume(), DEFAULT_VOLUME);
        assert!(settings.ringcode_enabled());
    }

    #[test]
    fn test_clones_share_state() {
        let settings = HardwareSettings::new();
        let clone = settings.clone();

        settings.set_volume(25).unwrap();
        settings.set_ringcode_enabled(false);

        assert_eq!(clone.volume(), 25);
        assert!(!clone.ringcode_enabled());
    }

    #[test]
    fn test_volume_is_validated() {
        let settings = HardwareSettings::new();
        assert!(settings.set_volume(101).is_err());
        // A rejected write leaves the previous value in place.
        assert_eq!(settings.volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn test_with_values_validates_volume() {
        assert!(HardwareSettings::with_values(101, true).is_err());
        let settings = HardwareSettings::with_values(60, false).unwrap();
        assert_eq!(settings.volume(), 60);
        assert!(!settings.ringcode_enabled());
    }

    #[test]
    fn test_cross_thread_reads() {
        let settings = HardwareSettings::new();
        settings.set_volume(70).unwrap();

        let reader = settings.clone();
        let observed = std::thread::spawn(move || reader.volume()).join().unwrap();
        assert_eq!(observed, 70);
    }
}
