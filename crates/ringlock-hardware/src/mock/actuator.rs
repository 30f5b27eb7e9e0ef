//! Mock lock actuator for testing and development.
//!
//! Records every actuation and mirrors the output level as the physical
//! read-back, the way the reference wiring reads the opener pin itself.

use crate::{Result, traits::LockActuator};
use ringlock_core::LockPhysicalState;
use std::sync::{Arc, Mutex};

/// A single recorded actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorOp {
    Unlock,
    Lock,
    Pulse,
}

#[derive(Debug)]
struct Inner {
    state: LockPhysicalState,
    ops: Vec<ActuatorOp>,
}

/// Mock lock actuator.
///
/// `unlock` and `lock` move the simulated physical state; `pulse` records
/// the actuation but leaves the output at the locked level, matching a
/// momentary pulse mechanism. The [`MockActuatorHandle`] can override the
/// physical state to simulate the door being secured by other means.
///
/// # Examples
///
/// ```
/// use ringlock_hardware::mock::{ActuatorOp, MockActuator};
/// use ringlock_hardware::traits::LockActuator;
/// use ringlock_core::LockPhysicalState;
///
/// let (mut actuator, handle) = MockActuator::new();
///
/// actuator.unlock().unwrap();
/// assert_eq!(actuator.read_state().unwrap(), LockPhysicalState::Unlocked);
/// assert_eq!(handle.operations(), vec![ActuatorOp::Unlock]);
/// ```
#[derive(Debug)]
pub struct MockActuator {
    inner: Arc<Mutex<Inner>>,
}

impl MockActuator {
    /// Create a new mock actuator, initially locked.
    ///
    /// Returns a `(MockActuator, MockActuatorHandle)` pair; the handle
    /// observes recorded operations and can override the physical state.
    pub fn new() -> (Self, MockActuatorHandle) {
        let inner = Arc::new(Mutex::new(Inner {
            state: LockPhysicalState::Locked,
            ops: Vec::new(),
        }));
        (
            Self {
                inner: Arc::clone(&inner),
            },
            MockActuatorHandle { inner },
        )
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock().expect("actuator state poisoned");
        f(&mut inner)
    }
}

impl LockActuator for MockActuator {
    fn unlock(&mut self) -> Result<()> {
        self.with_inner(|inner| {
            inner.state = LockPhysicalState::Unlocked;
            inner.ops.push(ActuatorOp::Unlock);
        });
        Ok(())
    }

    fn lock(&mut self) -> Result<()> {
        self.with_inner(|inner| {
            inner.state = LockPhysicalState::Locked;
            inner.ops.push(ActuatorOp::Lock);
        });
        Ok(())
    }

    fn pulse(&mut self) -> Result<()> {
        self.with_inner(|inner| {
            // The physical mechanism relocks on its own after the pulse.
            inner.state = LockPhysicalState::Locked;
            inner.ops.push(ActuatorOp::Pulse);
        });
        Ok(())
    }

    fn read_state(&mut self) -> Result<LockPhysicalState> {
        Ok(self.with_inner(|inner| inner.state))
    }
}

/// Handle for observing and steering a [`MockActuator`].
///
/// Can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockActuatorHandle {
    inner: Arc<Mutex<Inner>>,
}

impl MockActuatorHandle {
    /// Current simulated physical state.
    pub fn physical_state(&self) -> LockPhysicalState {
        self.inner.lock().expect("actuator state poisoned").state
    }

    /// Override the physical state, simulating the door being locked or
    /// unlocked by other means.
    pub fn set_physical_state(&self, state: LockPhysicalState) {
        self.inner.lock().expect("actuator state poisoned").state = state;
    }

    /// All actuations recorded so far, in order.
    pub fn operations(&self) -> Vec<ActuatorOp> {
        self.inner
            .lock()
            .expect("actuator state poisoned")
            .ops
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuator_starts_locked() {
        let (mut actuator, _handle) = MockActuator::new();
        assert_eq!(actuator.read_state().unwrap(), LockPhysicalState::Locked);
    }

    #[test]
    fn test_unlock_and_lock_move_physical_state() {
        let (mut actuator, handle) = MockActuator::new();

        actuator.unlock().unwrap();
        assert_eq!(handle.physical_state(), LockPhysicalState::Unlocked);

        actuator.lock().unwrap();
        assert_eq!(handle.physical_state(), LockPhysicalState::Locked);
    }

    #[test]
    fn test_pulse_leaves_output_locked() {
        let (mut actuator, handle) = MockActuator::new();

        actuator.pulse().unwrap();

        assert_eq!(handle.physical_state(), LockPhysicalState::Locked);
        assert_eq!(handle.operations(), vec![ActuatorOp::Pulse]);
    }

    #[test]
    fn test_handle_can_override_physical_state() {
        let (mut actuator, handle) = MockActuator::new();

        actuator.unlock().unwrap();
        handle.set_physical_state(LockPhysicalState::Locked);

        assert_eq!(actuator.read_state().unwrap(), LockPhysicalState::Locked);
    }

    #[test]
    fn test_operations_are_recorded_in_order() {
        let (mut actuator, handle) = MockActuator::new();

        actuator.unlock().unwrap();
        actuator.lock().unwrap();
        actuator.pulse().unwrap();

        assert_eq!(
            handle.operations(),
            vec![ActuatorOp::Unlock, ActuatorOp::Lock, ActuatorOp::Pulse]
        );
    }
}
