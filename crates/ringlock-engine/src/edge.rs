//! Edge classification and debouncing for the trigger input.
//!
//! Raw level-change interrupts arrive as sampled levels. The classifier
//! turns them into logical press/release events and discards duplicate
//! same-level reports, which show up when intermediate edges are missed
//! (two consecutive falling or two consecutive rising interrupts).
//!
//! This is not a timed debounce: two genuine opposite edges microseconds
//! apart both pass through. The reference installation relies on an RC
//! filter in front of the input for that class of noise.

use ringlock_core::{ActivePolarity, Level};
use tracing::trace;

/// Logical trigger event after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// The trigger moved to the active polarity (button pressed).
    Press,

    /// The trigger left the active polarity (button released).
    Release,
}

/// Stateful edge classifier for one trigger input.
///
/// Owns `last_level` and the initialization flag; the first sample is
/// always accepted regardless of level.
///
/// # Examples
///
/// ```
/// use ringlock_engine::edge::{EdgeClassifier, EdgeKind};
/// use ringlock_core::{ActivePolarity, Level};
///
/// let mut classifier = EdgeClassifier::new(ActivePolarity::Low);
///
/// assert_eq!(classifier.classify(Level::Low), Some(EdgeKind::Press));
/// // Duplicate level report from a missed edge: discarded.
/// assert_eq!(classifier.classify(Level::Low), None);
/// assert_eq!(classifier.classify(Level::High), Some(EdgeKind::Release));
/// ```
#[derive(Debug)]
pub struct EdgeClassifier {
    polarity: ActivePolarity,
    last_level: Level,
    initialized: bool,
}

impl EdgeClassifier {
    /// Create a classifier for the given active polarity.
    pub fn new(polarity: ActivePolarity) -> Self {
        Self {
            polarity,
            last_level: Level::Low,
            initialized: false,
        }
    }

    /// Classify one sampled level.
    ///
    /// Returns `None` for duplicate same-level samples after the initial
    /// call; otherwise the logical edge event.
    pub fn classify(&mut self, level: Level) -> Option<EdgeKind> {
        if self.initialized && level == self.last_level {
            trace!(?level, "duplicate edge discarded");
            return None;
        }

        self.last_level = level;
        self.initialized = true;

        let kind = if self.polarity.is_active(level) {
            EdgeKind::Press
        } else {
            EdgeKind::Release
        };
        trace!(?level, ?kind, "edge classified");
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_always_accepted() {
        // `last_level` starts at Low; an initial Low sample must still
        // produce an event.
        let mut classifier = EdgeClassifier::new(ActivePolarity::Low);
        assert_eq!(classifier.classify(Level::Low), Some(EdgeKind::Press));
    }

    #[test]
    fn test_alternating_levels_alternate_events() {
        let mut classifier = EdgeClassifier::new(ActivePolarity::Low);

        assert_eq!(classifier.classify(Level::Low), Some(EdgeKind::Press));
        assert_eq!(classifier.classify(Level::High), Some(EdgeKind::Release));
        assert_eq!(classifier.classify(Level::Low), Some(EdgeKind::Press));
        assert_eq!(classifier.classify(Level::High), Some(EdgeKind::Release));
    }

    #[test]
    fn test_duplicate_levels_are_discarded() {
        let mut classifier = EdgeClassifier::new(ActivePolarity::Low);

        assert_eq!(classifier.classify(Level::Low), Some(EdgeKind::Press));
        assert_eq!(classifier.classify(Level::Low), None);
        assert_eq!(classifier.classify(Level::Low), None);
        // The next genuine transition still gets through.
        assert_eq!(classifier.classify(Level::High), Some(EdgeKind::Release));
        assert_eq!(classifier.classify(Level::High), None);
    }

    #[test]
    fn test_active_high_polarity_inverts_events() {
        let mut classifier = EdgeClassifier::new(ActivePolarity::High);

        assert_eq!(classifier.classify(Level::High), Some(EdgeKind::Press));
        assert_eq!(classifier.classify(Level::Low), Some(EdgeKind::Release));
    }
}
