//! Engine runtime: capture thread, dispatcher task, and the command and
//! notification channels between them.
//!
//! # Scheduling model
//!
//! One `std::thread` blocks on the trigger input, classifies edges, and
//! posts timestamped events into a bounded channel. Nothing else happens
//! on that thread: it must never block behind decoding or actuation, since
//! it gates real-time edge capture.
//!
//! A single dispatcher task consumes the channel and serializes everything
//! that mutates state: decoding, solved actions, target-state writes,
//! settings writes, and timer firings (which post commands back into the
//! same channel). There is no other mutation path.
//!
//! Outward notifications for the accessory layer flow through an unbounded
//! channel; the accessory side relays target/current state changes and
//! persistence requests.

use crate::audio::AudioDispatcher;
use crate::decoder::{DecodeOutcome, PatternDecoder};
use crate::edge::{EdgeClassifier, EdgeKind};
use crate::error::{EngineError, Result};
use crate::events::EventLog;
use crate::relock::LockController;
use crate::settings::HardwareSettings;
use ringlock_core::{
    ActivePolarity, AudioCue, CodeConfig, EventKind, LockPhysicalState, LockTargetState,
    StateSnapshot, constants::BELL_COALESCE_MS,
};
use ringlock_hardware::{AudioSink, HardwareError, LockActuator, TriggerInput};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Depth of the dispatcher command channel.
///
/// Edge bursts are short (a human pressing a doorbell); the queue only
/// needs to absorb the classifier output while the dispatcher is busy with
/// a timer firing.
const COMMAND_QUEUE_DEPTH: usize = 64;

/// A classified trigger edge, timestamped at capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub kind: EdgeKind,
    pub at: Instant,
}

/// Everything the dispatcher task can be asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// Classified edge from the capture thread.
    Edge(EdgeEvent),

    /// External target-state write from the accessory layer.
    SetTarget(LockTargetState),

    /// External auto-security timeout write, in seconds.
    SetAutoSecurityTimeout(u32),

    /// External bell volume write.
    SetVolume(u8),

    /// Enable or disable unlocking by ring code.
    SetRingcodeEnabled(bool),

    /// The relock deadline fired.
    RelockElapsed,

    /// The settle confirmation deadline fired.
    ConfirmElapsed,

    /// Stop the dispatcher loop.
    Shutdown,
}

/// Outward notifications for the accessory layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The commanded target state changed.
    TargetStateChanged(LockTargetState),

    /// The confirmed physical state changed (or was re-confirmed).
    CurrentStateChanged(LockPhysicalState),

    /// The doorbell rang. Rings within the coalescing window raise only
    /// one notification; every ring is still written to the event log.
    BellRang,

    /// Persist this snapshot of the lock state.
    PersistRequested(StateSnapshot),
}

/// Cloneable handle for posting commands to the dispatcher.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    /// Post an external target-state write.
    pub async fn set_target(&self, target: LockTargetState) -> Result<()> {
        self.send(EngineCommand::SetTarget(target)).await
    }

    /// Post an auto-security timeout write.
    pub async fn set_auto_security_timeout(&self, seconds: u32) -> Result<()> {
        self.send(EngineCommand::SetAutoSecurityTimeout(seconds))
            .await
    }

    /// Post a bell volume write.
    pub async fn set_volume(&self, volume: u8) -> Result<()> {
        self.send(EngineCommand::SetVolume(volume)).await
    }

    /// Post a ringcode-enabled switch write.
    pub async fn set_ringcode_enabled(&self, enabled: bool) -> Result<()> {
        self.send(EngineCommand::SetRingcodeEnabled(enabled)).await
    }

    /// Post a classified edge, as the capture thread would.
    pub async fn inject_edge(&self, event: EdgeEvent) -> Result<()> {
        self.send(EngineCommand::Edge(event)).await
    }

    /// Ask the dispatcher to stop.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(EngineCommand::Shutdown).await
    }

    async fn send(&self, cmd: EngineCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| EngineError::DispatcherGone)
    }

    /// Blocking edge post for the capture thread.
    fn post_edge_blocking(&self, event: EdgeEvent) -> Result<()> {
        self.cmd_tx
            .blocking_send(EngineCommand::Edge(event))
            .map_err(|_| EngineError::DispatcherGone)
    }
}

/// The access-control engine: decoder, lock controller, audio feedback,
/// and event log behind one dispatcher loop.
pub struct Engine<A: LockActuator, S: AudioSink + 'static> {
    decoder: PatternDecoder,
    lock: LockController<A>,
    audio: AudioDispatcher<S>,
    settings: HardwareSettings,
    log: EventLog,
    last_bell: Option<Instant>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    notify_tx: mpsc::UnboundedSender<Notification>,
}

impl<A: LockActuator, S: AudioSink + 'static> Engine<A, S> {
    /// Wire up an engine around validated configuration and hardware.
    ///
    /// Returns the engine (to be driven with [`run`](Engine::run)), the
    /// command handle, and the notification stream for the accessory
    /// layer. The actuator is driven to the locked level immediately.
    pub fn new(
        config: CodeConfig,
        actuator: A,
        sink: S,
        settings: HardwareSettings,
        auto_security_timeout: u32,
    ) -> Result<(Self, EngineHandle, mpsc::UnboundedReceiver<Notification>)> {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();

        let lock = LockController::new(
            actuator,
            settings.clone(),
            auto_security_timeout,
            cmd_tx.clone(),
            notify_tx.clone(),
        )?;
        let audio = AudioDispatcher::new(sink, settings.clone());

        let engine = Self {
            decoder: PatternDecoder::new(config),
            lock,
            audio,
            settings,
            log: EventLog::new(),
            last_bell: None,
            cmd_rx,
            notify_tx,
        };
        Ok((engine, EngineHandle { cmd_tx }, notify_rx))
    }

    /// Run the dispatcher loop until shutdown or a fatal hardware fault.
    pub async fn run(mut self) -> Result<()> {
        info!("engine dispatcher running");
        while let Some(cmd) = self.cmd_rx.recv().await {
            match cmd {
                EngineCommand::Edge(event) => self.handle_edge(event)?,
                EngineCommand::SetTarget(target) => self.lock.set_target(target)?,
                EngineCommand::SetAutoSecurityTimeout(seconds) => {
                    self.lock.set_auto_security_timeout(seconds);
                }
                EngineCommand::SetVolume(volume) => {
                    // A bad external write is rejected, not fatal.
                    if let Err(error) = self.settings.set_volume(volume) {
                        warn!(%error, "volume write rejected");
                    }
                }
                EngineCommand::SetRingcodeEnabled(enabled) => {
                    self.settings.set_ringcode_enabled(enabled);
                }
                EngineCommand::RelockElapsed => self.lock.handle_relock_elapsed()?,
                EngineCommand::ConfirmElapsed => self.lock.handle_confirm_elapsed()?,
                EngineCommand::Shutdown => {
                    info!("engine dispatcher stopping");
                    break;
                }
            }
        }
        Ok(())
    }

    fn handle_edge(&mut self, event: EdgeEvent) -> Result<()> {
        match self.decoder.handle_edge(event.kind, event.at) {
            DecodeOutcome::Quiet => Ok(()),
            DecodeOutcome::Bell => {
                self.on_bell(event.at);
                Ok(())
            }
            DecodeOutcome::Solved => self.on_solved(),
        }
    }

    fn on_bell(&mut self, now: Instant) {
        self.log.record(EventKind::Bell);
        self.audio.dispatch(AudioCue::Bell);

        // Coalesce the outward push: rings in quick succession are one
        // event to the accessory, but all of them are logged.
        let coalesce = Duration::from_millis(BELL_COALESCE_MS);
        let push = self
            .last_bell
            .is_none_or(|prev| now.duration_since(prev) > coalesce);
        self.last_bell = Some(now);
        if push {
            self.notify(Notification::BellRang);
        }
    }

    fn on_solved(&mut self) -> Result<()> {
        if self.settings.ringcode_enabled() {
            info!("ring code solved; opening");
            self.lock.pulse_unlock()?;
            self.audio.dispatch(AudioCue::Unlocked);
            self.log.record(EventKind::Unlocked);
        } else {
            info!("ring code solved, but unlocking is disabled");
            self.audio.dispatch(AudioCue::Locked);
            self.log.record(EventKind::Locked);
        }
        Ok(())
    }

    fn notify(&self, notification: Notification) {
        if self.notify_tx.send(notification).is_err() {
            warn!("accessory side gone; notification dropped");
        }
    }

    #[cfg(test)]
    fn event_kinds(&self) -> Vec<EventKind> {
        self.log.iter().map(|entry| entry.kind).collect()
    }
}

/// Spawn the edge-capture thread.
///
/// The thread blocks on the trigger, classifies levels into logical edges,
/// and posts them to the dispatcher. It exits cleanly when the trigger
/// reports disconnection or the dispatcher goes away; join the returned
/// handle during shutdown.
pub fn spawn_capture<T: TriggerInput + 'static>(
    mut trigger: T,
    polarity: ActivePolarity,
    handle: EngineHandle,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("ringlock-capture".into())
        .spawn(move || {
            let mut classifier = EdgeClassifier::new(polarity);
            loop {
                let level = match trigger.wait_for_edge() {
                    Ok(level) => level,
                    Err(HardwareError::Disconnected { .. }) => {
                        info!("trigger disconnected; capture thread stopping");
                        break;
                    }
                    Err(error) => {
                        error!(%error, "trigger read failed; capture thread stopping");
                        break;
                    }
                };
                let at = Instant::now();
                if let Some(kind) = classifier.classify(level)
                    && handle.post_edge_blocking(EdgeEvent { kind, at }).is_err()
                {
                    info!("dispatcher gone; capture thread stopping");
                    break;
                }
            }
        })
        .expect("failed to spawn capture thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringlock_core::{ClassWindows, CodeSequence, DurationClass, DurationWindow};
    use ringlock_hardware::mock::{ActuatorOp, MockActuator, MockActuatorHandle, MockAudio, MockAudioHandle};

    fn test_config() -> CodeConfig {
        let windows = ClassWindows {
            any: DurationWindow {
                min_ms: 0,
                max_ms: 10_000,
            },
            short: DurationWindow {
                min_ms: 100,
                max_ms: 400,
            },
            long: DurationWindow {
                min_ms: 800,
                max_ms: 1_200,
            },
            very_long: DurationWindow {
                min_ms: 1_500,
                max_ms: 3_000,
            },
        };
        let code = CodeSequence::new(vec![
            DurationClass::Short,
            DurationClass::Long,
            DurationClass::Short,
        ])
        .unwrap();
        CodeConfig::new(windows, code)
    }

    #[allow(clippy::type_complexity)]
    fn engine() -> (
        Engine<MockActuator, MockAudio>,
        EngineHandle,
        mpsc::UnboundedReceiver<Notification>,
        MockActuatorHandle,
        MockAudioHandle,
    ) {
        let (actuator, actuator_handle) = MockActuator::new();
        let (sink, audio_handle) = MockAudio::new();
        let (engine, handle, notify_rx) =
            Engine::new(test_config(), actuator, sink, HardwareSettings::new(), 1).unwrap();
        (engine, handle, notify_rx, actuator_handle, audio_handle)
    }

    fn edge(kind: EdgeKind, base: Instant, offset_ms: u64) -> EdgeEvent {
        EdgeEvent {
            kind,
            at: base + Duration::from_millis(offset_ms),
        }
    }

    #[test]
    fn test_solved_code_pulses_and_logs_unlocked() {
        let (mut engine, _handle, _notify, actuator, _audio) = engine();
        let base = Instant::now();

        engine.handle_edge(edge(EdgeKind::Press, base, 0)).unwrap();
        engine
            .handle_edge(edge(EdgeKind::Release, base, 150))
            .unwrap();
        engine
            .handle_edge(edge(EdgeKind::Press, base, 1_150))
            .unwrap();
        engine
            .handle_edge(edge(EdgeKind::Release, base, 1_350))
            .unwrap();

        assert!(actuator.operations().contains(&ActuatorOp::Pulse));
        assert_eq!(engine.event_kinds(), vec![EventKind::Unlocked]);
    }

    #[test]
    fn test_solved_code_while_disabled_logs_locked_without_actuation() {
        let (mut engine, _handle, _notify, actuator, _audio) = engine();
        engine.settings.set_ringcode_enabled(false);
        let base = Instant::now();

        engine.handle_edge(edge(EdgeKind::Press, base, 0)).unwrap();
        engine
            .handle_edge(edge(EdgeKind::Release, base, 150))
            .unwrap();
        engine
            .handle_edge(edge(EdgeKind::Press, base, 1_150))
            .unwrap();
        engine
            .handle_edge(edge(EdgeKind::Release, base, 1_350))
            .unwrap();

        assert!(!actuator.operations().contains(&ActuatorOp::Pulse));
        assert_eq!(engine.event_kinds(), vec![EventKind::Locked]);
    }

    #[test]
    fn test_failed_attempt_rings_and_notifies_once() {
        let (mut engine, _handle, mut notify_rx, _actuator, _audio) = engine();
        let base = Instant::now();

        // Two failed attempts close together: two log entries, one push.
        for offset in [0u64, 1_000] {
            engine
                .handle_edge(edge(EdgeKind::Press, base, offset))
                .unwrap();
            engine
                .handle_edge(edge(EdgeKind::Release, base, offset + 600))
                .unwrap();
        }

        assert_eq!(engine.event_kinds(), vec![EventKind::Bell, EventKind::Bell]);
        assert_eq!(notify_rx.try_recv(), Ok(Notification::BellRang));
        assert!(notify_rx.try_recv().is_err());
    }

    #[test]
    fn test_bell_push_resumes_after_coalesce_window() {
        let (mut engine, _handle, mut notify_rx, _actuator, _audio) = engine();
        let base = Instant::now();

        engine.handle_edge(edge(EdgeKind::Press, base, 0)).unwrap();
        engine
            .handle_edge(edge(EdgeKind::Release, base, 600))
            .unwrap();

        let later = BELL_COALESCE_MS + 700;
        engine
            .handle_edge(edge(EdgeKind::Press, base, later))
            .unwrap();
        engine
            .handle_edge(edge(EdgeKind::Release, base, later + 600))
            .unwrap();

        assert_eq!(notify_rx.try_recv(), Ok(Notification::BellRang));
        assert_eq!(notify_rx.try_recv(), Ok(Notification::BellRang));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_processes_commands_until_shutdown() {
        let (engine, handle, mut notify_rx, actuator, _audio) = engine();
        let runner = tokio::spawn(engine.run());

        handle.set_target(LockTargetState::Unsecured).await.unwrap();
        assert_eq!(
            notify_rx.recv().await,
            Some(Notification::TargetStateChanged(LockTargetState::Unsecured))
        );
        // Pulse sentinel: the settle confirmation reports the pin already
        // back at locked, then the 2 s safety net forces the target back.
        assert_eq!(
            notify_rx.recv().await,
            Some(Notification::CurrentStateChanged(LockPhysicalState::Locked))
        );
        assert!(matches!(
            notify_rx.recv().await,
            Some(Notification::PersistRequested(_))
        ));
        assert_eq!(
            notify_rx.recv().await,
            Some(Notification::TargetStateChanged(LockTargetState::Secured))
        );

        handle.shutdown().await.unwrap();
        runner.await.unwrap().unwrap();
        assert!(actuator.operations().contains(&ActuatorOp::Pulse));
    }

    #[test]
    fn test_capture_thread_feeds_dispatcher_and_stops_on_disconnect() {
        use ringlock_hardware::mock::MockTrigger;

        let (engine, handle, _notify_rx, _actuator, _audio) = engine();
        let (trigger, trigger_handle) = MockTrigger::new();
        let capture = spawn_capture(trigger, ActivePolarity::Low, handle.clone());

        trigger_handle.press().unwrap();
        trigger_handle.release().unwrap();
        drop(trigger_handle);
        capture.join().unwrap();

        // Both edges are waiting in the dispatcher queue.
        let mut engine = engine;
        let mut edges = 0;
        while let Ok(cmd) = engine.cmd_rx.try_recv() {
            if let EngineCommand::Edge(event) = cmd {
                engine.handle_edge(event).unwrap();
                edges += 1;
            }
        }
        assert_eq!(edges, 2);
    }
}
