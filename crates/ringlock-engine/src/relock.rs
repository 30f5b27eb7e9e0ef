//! Lock actuation and the deferred auto-relock policy.
//!
//! Target state and physical state are tracked separately: a write can
//! command "unsecured" while the door is still physically locked, and the
//! two are reconciled through a two-step "set target, then confirm after a
//! settle delay" pattern. The actuator is a dumb output with no
//! instantaneous feedback, so the confirmation read waits out a settle
//! delay before trusting the pin.
//!
//! The auto-security timeout steers what "unsecured" means:
//! `0` holds the door open until told otherwise, `1` issues a momentary
//! pulse (the physical mechanism relocks by itself, with a 2 s deadline
//! forcing the target back to secured as a safety net), and any larger
//! value holds the door open and relocks after that many seconds.

use crate::error::Result;
use crate::runtime::{EngineCommand, Notification};
use crate::settings::HardwareSettings;
use crate::timer::OneShotTimer;
use ringlock_core::{
    LockPhysicalState, LockTargetState, StateSnapshot,
    constants::{
        AUTO_SECURITY_HOLD_OPEN, AUTO_SECURITY_PULSE, PULSE_SAFETY_RELOCK_MS,
        RELOCK_CONFIRM_DELAY_MS,
    },
};
use ringlock_hardware::LockActuator;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Drives the lock actuator and owns the relock/confirmation deadlines.
///
/// Lives on the dispatcher task; deadlines fire by posting
/// [`EngineCommand::RelockElapsed`] and [`EngineCommand::ConfirmElapsed`]
/// back into the dispatcher channel, so every mutation stays
/// single-threaded.
pub struct LockController<A: LockActuator> {
    actuator: A,
    settings: HardwareSettings,
    target: LockTargetState,
    current: LockPhysicalState,
    auto_security_timeout: u32,
    relock_timer: Option<OneShotTimer>,
    confirm_timer: Option<OneShotTimer>,
    cmd_tx: mpsc::Sender<EngineCommand>,
    notify_tx: mpsc::UnboundedSender<Notification>,
}

impl<A: LockActuator> LockController<A> {
    /// Create a controller and drive the actuator to the locked level, so
    /// the door starts secured regardless of what state the pin was left
    /// in.
    pub fn new(
        mut actuator: A,
        settings: HardwareSettings,
        auto_security_timeout: u32,
        cmd_tx: mpsc::Sender<EngineCommand>,
        notify_tx: mpsc::UnboundedSender<Notification>,
    ) -> Result<Self> {
        actuator.lock()?;
        let current = actuator.read_state()?;
        Ok(Self {
            actuator,
            settings,
            target: LockTargetState::Secured,
            current,
            auto_security_timeout,
            relock_timer: None,
            confirm_timer: None,
            cmd_tx,
            notify_tx,
        })
    }

    /// Last commanded target state.
    pub fn target(&self) -> LockTargetState {
        self.target
    }

    /// Last confirmed physical state.
    pub fn current(&self) -> LockPhysicalState {
        self.current
    }

    /// Whether a relock deadline is outstanding.
    pub fn relock_pending(&self) -> bool {
        self.relock_timer.is_some()
    }

    /// Handle an external target-state write.
    ///
    /// A write of the already-commanded target is a no-op. An accepted
    /// change raises a target-state-changed notification, actuates, manages
    /// the relock deadline, and schedules the settle confirmation.
    pub fn set_target(&mut self, target: LockTargetState) -> Result<()> {
        if self.target == target {
            debug!(%target, "target unchanged; ignoring");
            return Ok(());
        }
        info!(%target, "target state set");
        self.target = target;
        self.notify(Notification::TargetStateChanged(target));

        match target {
            LockTargetState::Secured => {
                if let Some(timer) = self.relock_timer.take() {
                    timer.cancel();
                }
                self.actuator.lock()?;
            }
            LockTargetState::Unsecured => match self.auto_security_timeout {
                AUTO_SECURITY_HOLD_OPEN => {
                    self.actuator.unlock()?;
                }
                AUTO_SECURITY_PULSE => {
                    // The physical mechanism handles the relock; the
                    // deadline only forces the target back as a safety net.
                    self.actuator.pulse()?;
                    self.schedule_relock(Duration::from_millis(PULSE_SAFETY_RELOCK_MS));
                }
                seconds => {
                    self.actuator.unlock()?;
                    self.schedule_relock(Duration::from_secs(u64::from(seconds)));
                }
            },
        }

        self.schedule_confirm();
        Ok(())
    }

    /// The relock deadline fired: force the target back to secured.
    ///
    /// The actuator is driven only if the door is observed still unlocked,
    /// avoiding a redundant double-lock when it was already secured by
    /// other means.
    pub fn handle_relock_elapsed(&mut self) -> Result<()> {
        self.relock_timer = None;
        info!("auto-security timeout elapsed; securing");
        self.target = LockTargetState::Secured;
        self.notify(Notification::TargetStateChanged(LockTargetState::Secured));

        if self.actuator.read_state()? == LockPhysicalState::Unlocked {
            self.actuator.lock()?;
        }
        self.schedule_confirm();
        Ok(())
    }

    /// The settle delay elapsed: trust the pin and report it.
    pub fn handle_confirm_elapsed(&mut self) -> Result<()> {
        self.confirm_timer = None;
        let observed = self.actuator.read_state()?;
        debug!(%observed, "physical state confirmed");
        self.current = observed;
        self.notify(Notification::CurrentStateChanged(observed));
        self.notify(Notification::PersistRequested(self.snapshot()));
        Ok(())
    }

    /// Update the auto-security timeout; persisted on change.
    pub fn set_auto_security_timeout(&mut self, seconds: u32) {
        if self.auto_security_timeout == seconds {
            return;
        }
        info!(seconds, "auto-security timeout set");
        self.auto_security_timeout = seconds;
        self.notify(Notification::PersistRequested(self.snapshot()));
    }

    /// Momentary pulse for a solved ring code; does not touch the target
    /// state machinery.
    pub fn pulse_unlock(&mut self) -> Result<()> {
        self.actuator.pulse()?;
        Ok(())
    }

    /// Snapshot handed to the persistence collaborator.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            target: self.target,
            current: self.current,
            auto_security_timeout: self.auto_security_timeout,
            volume: self.settings.volume(),
        }
    }

    fn schedule_relock(&mut self, delay: Duration) {
        // Explicitly supersede: at most one relock deadline is live.
        if let Some(timer) = self.relock_timer.take() {
            timer.cancel();
        }
        self.relock_timer = Some(OneShotTimer::schedule(
            "relock",
            delay,
            self.cmd_tx.clone(),
            EngineCommand::RelockElapsed,
        ));
    }

    fn schedule_confirm(&mut self) {
        if let Some(timer) = self.confirm_timer.take() {
            timer.cancel();
        }
        self.confirm_timer = Some(OneShotTimer::schedule(
            "confirm",
            Duration::from_millis(RELOCK_CONFIRM_DELAY_MS),
            self.cmd_tx.clone(),
            EngineCommand::ConfirmElapsed,
        ));
    }

    fn notify(&self, notification: Notification) {
        if self.notify_tx.send(notification).is_err() {
            warn!("accessory side gone; notification dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringlock_hardware::mock::{ActuatorOp, MockActuator, MockActuatorHandle};
    use tokio::time::advance;

    fn controller(
        timeout_secs: u32,
    ) -> (
        LockController<MockActuator>,
        MockActuatorHandle,
        mpsc::Receiver<EngineCommand>,
        mpsc::UnboundedReceiver<Notification>,
    ) {
        let (actuator, handle) = MockActuator::new();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let controller = LockController::new(
            actuator,
            HardwareSettings::new(),
            timeout_secs,
            cmd_tx,
            notify_tx,
        )
        .unwrap();
        (controller, handle, cmd_rx, notify_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_secured() {
        let (controller, handle, _cmd, _notify) = controller(3);
        assert_eq!(controller.target(), LockTargetState::Secured);
        assert_eq!(handle.operations(), vec![ActuatorOp::Lock]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_open_schedules_no_relock() {
        let (mut controller, handle, _cmd, _notify) = controller(AUTO_SECURITY_HOLD_OPEN);

        controller.set_target(LockTargetState::Unsecured).unwrap();

        assert!(!controller.relock_pending());
        assert!(handle.operations().contains(&ActuatorOp::Unlock));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_sentinel_pulses_and_schedules_safety_relock() {
        let (mut controller, handle, mut cmd_rx, _notify) = controller(AUTO_SECURITY_PULSE);

        controller.set_target(LockTargetState::Unsecured).unwrap();
        assert!(handle.operations().contains(&ActuatorOp::Pulse));
        assert!(controller.relock_pending());

        advance(Duration::from_millis(PULSE_SAFETY_RELOCK_MS)).await;
        // Confirm (500 ms) fires first, then the safety relock at 2 s.
        assert_eq!(cmd_rx.recv().await, Some(EngineCommand::ConfirmElapsed));
        assert_eq!(cmd_rx.recv().await, Some(EngineCommand::RelockElapsed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_unlock_schedules_single_relock_deadline() {
        let (mut controller, handle, mut cmd_rx, _notify) = controller(3);

        controller.set_target(LockTargetState::Unsecured).unwrap();
        assert!(handle.operations().contains(&ActuatorOp::Unlock));

        advance(Duration::from_secs(3)).await;
        assert_eq!(cmd_rx.recv().await, Some(EngineCommand::ConfirmElapsed));
        assert_eq!(cmd_rx.recv().await, Some(EngineCommand::RelockElapsed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_securing_cancels_pending_relock() {
        let (mut controller, _handle, mut cmd_rx, _notify) = controller(3);

        controller.set_target(LockTargetState::Unsecured).unwrap();
        assert!(controller.relock_pending());
        controller.set_target(LockTargetState::Secured).unwrap();
        assert!(!controller.relock_pending());

        advance(Duration::from_secs(10)).await;
        // Only confirmation deadlines remain; the relock never fires.
        while let Ok(cmd) = cmd_rx.try_recv() {
            assert_ne!(cmd, EngineCommand::RelockElapsed);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_relock_elapsed_secures_and_notifies() {
        let (mut controller, handle, _cmd_rx, mut notify_rx) = controller(3);

        controller.set_target(LockTargetState::Unsecured).unwrap();
        assert_eq!(
            notify_rx.recv().await,
            Some(Notification::TargetStateChanged(LockTargetState::Unsecured))
        );

        controller.handle_relock_elapsed().unwrap();

        assert_eq!(controller.target(), LockTargetState::Secured);
        assert_eq!(
            notify_rx.recv().await,
            Some(Notification::TargetStateChanged(LockTargetState::Secured))
        );
        assert_eq!(handle.physical_state(), LockPhysicalState::Locked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relock_skips_actuation_when_already_locked() {
        let (mut controller, handle, _cmd_rx, _notify) = controller(3);

        controller.set_target(LockTargetState::Unsecured).unwrap();
        // Secured by other means while the deadline was pending.
        handle.set_physical_state(LockPhysicalState::Locked);
        let ops_before = handle.operations().len();

        controller.handle_relock_elapsed().unwrap();

        // No redundant lock actuation was issued.
        assert_eq!(handle.operations().len(), ops_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_reports_observed_state_and_persists() {
        let (mut controller, handle, _cmd_rx, mut notify_rx) = controller(AUTO_SECURITY_HOLD_OPEN);

        controller.set_target(LockTargetState::Unsecured).unwrap();
        let _ = notify_rx.recv().await; // target change

        controller.handle_confirm_elapsed().unwrap();

        assert_eq!(
            notify_rx.recv().await,
            Some(Notification::CurrentStateChanged(
                LockPhysicalState::Unlocked
            ))
        );
        match notify_rx.recv().await {
            Some(Notification::PersistRequested(snapshot)) => {
                assert_eq!(snapshot.target, LockTargetState::Unsecured);
                assert_eq!(snapshot.current, LockPhysicalState::Unlocked);
            }
            other => panic!("expected persistence request, got {:?}", other),
        }
        assert_eq!(handle.physical_state(), LockPhysicalState::Unlocked);
        assert_eq!(controller.current(), LockPhysicalState::Unlocked);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_target_write_is_ignored() {
        let (mut controller, handle, _cmd_rx, _notify) = controller(3);

        controller.set_target(LockTargetState::Secured).unwrap();
        // Only the constructor's initial lock is recorded.
        assert_eq!(handle.operations(), vec![ActuatorOp::Lock]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_security_timeout_change_persists() {
        let (mut controller, _handle, _cmd_rx, mut notify_rx) = controller(1);

        controller.set_auto_security_timeout(5);
        match notify_rx.recv().await {
            Some(Notification::PersistRequested(snapshot)) => {
                assert_eq!(snapshot.auto_security_timeout, 5);
            }
            other => panic!("expected persistence request, got {:?}", other),
        }

        // Setting the same value again is silent.
        controller.set_auto_security_timeout(5);
        assert!(notify_rx.try_recv().is_err());
    }
}
