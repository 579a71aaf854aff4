//! One-shot "animate once" visibility tracking.
//!
//! A section is *revealed* the first time the fraction of it inside the
//! viewport reaches a threshold.  It never goes back, no matter where the
//! page scrolls afterwards.

use std::ops::Range;

/// Threshold used by most sections.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// Fraction of `section` (a row range) that lies inside `viewport`.
pub fn visible_fraction(section: &Range<usize>, viewport: &Range<usize>) -> f32 {
    let len = section.end.saturating_sub(section.start);
    if len == 0 {
        return 0.0;
    }
    let start = section.start.max(viewport.start);
    let end = section.end.min(viewport.end);
    end.saturating_sub(start) as f32 / len as f32
}

/// Latched visibility flag for one section.
#[derive(Debug, Clone, Copy)]
pub struct RevealLatch {
    threshold: f32,
    revealed: bool,
}

impl RevealLatch {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            revealed: false,
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Feed the current geometry.  Returns `true` only on the observation
    /// that flips the latch.
    pub fn observe(&mut self, section: &Range<usize>, viewport: &Range<usize>) -> bool {
        if self.revealed {
            return false;
        }
        let fraction = visible_fraction(section, viewport);
        // Any overlap counts when the threshold is zero.
        if fraction > 0.0 && fraction >= self.threshold {
            self.revealed = true;
            return true;
        }
        false
    }
}

impl Default for RevealLatch {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
