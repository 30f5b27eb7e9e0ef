//! Single-shot cancellable deadlines.
//!
//! Timer callbacks in this system never run arbitrary code: a deadline
//! fires by posting a message into the dispatcher channel, keeping all
//! state mutation on the single dispatcher task. Superseding a pending
//! deadline is an explicit cancel-then-schedule operation on the stored
//! handle, never an implicit overwrite.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, trace};

/// Handle to one scheduled deadline.
///
/// Dropping the handle cancels the deadline, so a stored
/// `Option<OneShotTimer>` can only ever represent at most one live
/// deadline.
///
/// # Examples
///
/// ```
/// use ringlock_engine::timer::OneShotTimer;
/// use std::time::Duration;
/// use tokio::sync::mpsc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (tx, mut rx) = mpsc::channel(8);
/// let _timer = OneShotTimer::schedule("demo", Duration::from_millis(1), tx, 42u32);
///
/// assert_eq!(rx.recv().await, Some(42));
/// # }
/// ```
#[derive(Debug)]
pub struct OneShotTimer {
    handle: JoinHandle<()>,
    label: &'static str,
}

impl OneShotTimer {
    /// Schedule `message` to be posted on `tx` after `delay`.
    ///
    /// Must be called from within a tokio runtime. If the receiving side is
    /// gone when the deadline fires, the failure is logged loudly: an
    /// undeliverable deadline means the dispatcher has died and relock
    /// safety can no longer be guaranteed.
    pub fn schedule<T: Send + 'static>(
        label: &'static str,
        delay: Duration,
        tx: mpsc::Sender<T>,
        message: T,
    ) -> Self {
        trace!(timer = label, ?delay, "deadline scheduled");
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(message).await.is_err() {
                error!(timer = label, "dispatcher gone; deadline undeliverable");
            }
        });
        Self { handle, label }
    }

    /// Explicitly cancel the deadline.
    pub fn cancel(self) {
        trace!(timer = self.label, "deadline cancelled");
        // Drop aborts the task.
    }
}

impl Drop for OneShotTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
