//! Mock audio sink for testing and development.
//!
//! Records every accepted playback with its effective gain. An optional
//! playback latency simulates a cue that takes real time to finish, which
//! is what the engine's overlap gate is exercised against.

use crate::{Result, error::HardwareError, traits::AudioSink};
use ringlock_core::AudioCue;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct Inner {
    plays: Vec<(AudioCue, f32)>,
    fail_next: bool,
}

/// Mock audio sink.
///
/// # Examples
///
/// ```
/// use ringlock_hardware::mock::MockAudio;
/// use ringlock_hardware::traits::AudioSink;
/// use ringlock_core::AudioCue;
///
/// let (audio, handle) = MockAudio::new();
///
/// audio.play(AudioCue::Bell, 0.5).unwrap();
/// assert_eq!(handle.plays(), vec![(AudioCue::Bell, 0.5)]);
/// ```
#[derive(Debug)]
pub struct MockAudio {
    inner: Arc<Mutex<Inner>>,
    latency: Duration,
}

impl MockAudio {
    /// Create a mock sink whose playbacks finish immediately.
    pub fn new() -> (Self, MockAudioHandle) {
        Self::with_latency(Duration::ZERO)
    }

    /// Create a mock sink whose playbacks block for `latency`.
    pub fn with_latency(latency: Duration) -> (Self, MockAudioHandle) {
        let inner = Arc::new(Mutex::new(Inner::default()));
        (
            Self {
                inner: Arc::clone(&inner),
                latency,
            },
            MockAudioHandle { inner },
        )
    }
}

impl AudioSink for MockAudio {
    fn play(&self, cue: AudioCue, gain: f32) -> Result<()> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let mut inner = self.inner.lock().expect("audio state poisoned");
        if std::mem::take(&mut inner.fail_next) {
            return Err(HardwareError::playback(format!("device error on {cue}")));
        }
        inner.plays.push((cue, gain));
        Ok(())
    }
}

/// Handle for observing and steering a [`MockAudio`].
///
/// Can be cloned and shared across threads.
#[derive(Debug, Clone)]
pub struct MockAudioHandle {
    inner: Arc<Mutex<Inner>>,
}

impl MockAudioHandle {
    /// All accepted playbacks so far, in order, with their effective gains.
    pub fn plays(&self) -> Vec<(AudioCue, f32)> {
        self.inner
            .lock()
            .expect("audio state poisoned")
            .plays
            .clone()
    }

    /// Make the next playback fail with a device error.
    pub fn fail_next(&self) {
        self.inner.lock().expect("audio state poisoned").fail_next = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_audio_records_plays() {
        let (audio, handle) = MockAudio::new();

        audio.play(AudioCue::Bell, 0.25).unwrap();
        audio.play(AudioCue::Unlocked, 1.0).unwrap();

        assert_eq!(
            handle.plays(),
            vec![(AudioCue::Bell, 0.25), (AudioCue::Unlocked, 1.0)]
        );
    }

    #[test]
    fn test_mock_audio_scripted_failure() {
        let (audio, handle) = MockAudio::new();

        handle.fail_next();
        let result = audio.play(AudioCue::Bell, 0.5);
        assert!(matches!(result, Err(HardwareError::PlaybackFailed { .. })));

        // The failure is one-shot; the next play succeeds.
        audio.play(AudioCue::Bell, 0.5).unwrap();
        assert_eq!(handle.plays().len(), 1);
    }

    #[test]
    fn test_mock_audio_latency_blocks_playback() {
        let (audio, handle) = MockAudio::with_latency(Duration::from_millis(30));

        let started = std::time::Instant::now();
        audio.play(AudioCue::Bell, 0.5).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(handle.plays().len(), 1);
    }
}
