//! Audio feedback dispatch.
//!
//! Cues play on short-lived detached worker threads so the dispatcher task
//! never waits on the audio device. At most one playback is logically
//! active: overlapping requests are dropped, not queued. The `playing`
//! flag is an atomic rather than a critical section, so a completion and a
//! new request interleaving exactly at the boundary can slip through; this
//! is a known limitation, not a contract.
//!
//! Gain handling: every play is attenuated by `step_gain * volume/100`.
//! The step gain starts low, doubles on each accepted cue up to a ceiling,
//! falls back to low after more than ten seconds of silence, and is forced
//! to the ceiling for the unlocked/locked outcome cues (which then restart
//! the ladder from low).

use crate::settings::HardwareSettings;
use ringlock_core::{
    AudioCue,
    constants::{AUDIO_IDLE_RESET_MS, AUDIO_LOW_GAIN, AUDIO_MAX_GAIN},
};
use ringlock_hardware::AudioSink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Dispatches feedback cues to the audio sink.
///
/// Owned by the engine's dispatcher task; the ladder state is therefore
/// single-threaded while the sink itself is shared with the workers.
pub struct AudioDispatcher<S: AudioSink + 'static> {
    sink: Arc<S>,
    settings: HardwareSettings,
    playing: Arc<AtomicBool>,
    step_gain: f32,
    last_dispatch: Option<Instant>,
}

impl<S: AudioSink + 'static> AudioDispatcher<S> {
    pub fn new(sink: S, settings: HardwareSettings) -> Self {
        Self {
            sink: Arc::new(sink),
            settings,
            playing: Arc::new(AtomicBool::new(false)),
            step_gain: AUDIO_LOW_GAIN,
            last_dispatch: None,
        }
    }

    /// Request a cue. Returns immediately; playback happens on a detached
    /// worker. Dropped silently (with a log line) when a playback is
    /// already in progress.
    pub fn dispatch(&mut self, cue: AudioCue) {
        self.dispatch_at(cue, Instant::now());
    }

    fn dispatch_at(&mut self, cue: AudioCue, now: Instant) {
        let idle = Duration::from_millis(AUDIO_IDLE_RESET_MS);
        if let Some(prev) = self.last_dispatch
            && now.duration_since(prev) > idle
        {
            self.step_gain = AUDIO_LOW_GAIN;
        }
        // The idle clock restarts on every request, accepted or dropped.
        self.last_dispatch = Some(now);

        if self.playing.load(Ordering::Relaxed) {
            warn!(%cue, "audio still playing; request dropped");
            return;
        }
        self.playing.store(true, Ordering::Relaxed);

        let step = if cue.forces_full_gain() {
            AUDIO_MAX_GAIN
        } else {
            self.step_gain
        };
        let gain = step * f32::from(self.settings.volume()) / 100.0;

        // Advance the ladder for the next accepted cue.
        self.step_gain = if cue.forces_full_gain() {
            AUDIO_LOW_GAIN
        } else {
            (self.step_gain * 2.0).min(AUDIO_MAX_GAIN)
        };

        let sink = Arc::clone(&self.sink);
        let playing = Arc::clone(&self.playing);
        let worker = std::thread::Builder::new()
            .name("ringlock-audio".into())
            .spawn(move || {
                debug!(%cue, gain, "playback starting");
                if let Err(error) = sink.play(cue, gain) {
                    warn!(%cue, %error, "playback failed; abandoned");
                }
                playing.store(false, Ordering::Relaxed);
            });

        if let Err(error) = worker {
            warn!(%error, "could not spawn audio worker");
            self.playing.store(false, Ordering::Relaxed);
        }
    }
}
