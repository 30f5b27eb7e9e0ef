//! Mock trigger input for testing and development.
//!
//! Simulates the doorbell button pin by feeding level samples through an
//! internal channel. The consuming side blocks exactly like a real
//! interrupt-driven input.

use crate::{Result, error::HardwareError, traits::TriggerInput};
use ringlock_core::Level;
use std::sync::mpsc;

/// Mock trigger input.
///
/// Level samples injected through the [`MockTriggerHandle`] are returned one
/// at a time from [`wait_for_edge`](TriggerInput::wait_for_edge), blocking
/// in between exactly like a real interrupt source. Dropping the handle
/// disconnects the trigger, which ends the engine's capture loop.
///
/// # Examples
///
/// ```
/// use ringlock_hardware::mock::MockTrigger;
/// use ringlock_hardware::traits::TriggerInput;
/// use ringlock_core::Level;
///
/// let (mut trigger, handle) = MockTrigger::new();
/// handle.send_level(Level::Low).unwrap();
///
/// assert_eq!(trigger.wait_for_edge().unwrap(), Level::Low);
/// ```
#[derive(Debug)]
pub struct MockTrigger {
    level_rx: mpsc::Receiver<Level>,
}

impl MockTrigger {
    /// Create a new mock trigger.
    ///
    /// Returns a `(MockTrigger, MockTriggerHandle)` pair; the handle is used
    /// to inject level samples.
    pub fn new() -> (Self, MockTriggerHandle) {
        let (level_tx, level_rx) = mpsc::channel();
        (Self { level_rx }, MockTriggerHandle { level_tx })
    }
}

impl TriggerInput for MockTrigger {
    fn wait_for_edge(&mut self) -> Result<Level> {
        self.level_rx
            .recv()
            .map_err(|_| HardwareError::disconnected("trigger"))
    }
}

/// Handle for injecting level samples into a [`MockTrigger`].
///
/// Can be cloned and shared across threads.
#[derive(Debug, Clone)]
pub struct MockTriggerHandle {
    level_tx: mpsc::Sender<Level>,
}

impl MockTriggerHandle {
    /// Inject a sampled level, as if a level-change interrupt fired.
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger has been dropped.
    pub fn send_level(&self, level: Level) -> Result<()> {
        self.level_tx
            .send(level)
            .map_err(|_| HardwareError::disconnected("trigger"))
    }

    /// Inject a press with the default active-low wiring.
    pub fn press(&self) -> Result<()> {
        self.send_level(Level::Low)
    }

    /// Inject a release with the default active-low wiring.
    pub fn release(&self) -> Result<()> {
        self.send_level(Level::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_trigger_delivers_levels_in_order() {
        let (mut trigger, handle) = MockTrigger::new();

        handle.press().unwrap();
        handle.release().unwrap();

        assert_eq!(trigger.wait_for_edge().unwrap(), Level::Low);
        assert_eq!(trigger.wait_for_edge().unwrap(), Level::High);
    }

    #[test]
    fn test_mock_trigger_disconnects_when_handle_dropped() {
        let (mut trigger, handle) = MockTrigger::new();
        drop(handle);

        let result = trigger.wait_for_edge();
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }

    #[test]
    fn test_mock_trigger_blocks_across_threads() {
        let (mut trigger, handle) = MockTrigger::new();

        let worker = std::thread::spawn(move || trigger.wait_for_edge());
        handle.send_level(Level::High).unwrap();

        assert_eq!(worker.join().unwrap().unwrap(), Level::High);
    }
}
