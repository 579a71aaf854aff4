//! Row-level smooth scroll with exponential ease-out.
//!
//! When the scroll target jumps, a row displacement equal to the jump is
//! injected.  Each frame the displacement decays toward zero, so the page
//! slides a few rows per frame with visible deceleration.

/// Row-offset smooth scroll animator.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    /// Rows between what is shown and the target.  Positive = the view is
    /// still above its target (scrolling down); negative = below it.
    row_offset: f64,
    prev_target: usize,
    /// Damping: `offset *= (1 - speed)` each frame.
    speed: f64,
}

impl Default for SmoothScroll {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl SmoothScroll {
    pub fn new(speed: f64) -> Self {
        Self {
            row_offset: 0.0,
            prev_target: 0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    /// Feed the current target; a change injects displacement.
    pub fn set_target(&mut self, target: usize) {
        if target != self.prev_target {
            self.row_offset += target as f64 - self.prev_target as f64;
            self.prev_target = target;
        }
    }

    /// Move to `target` without animating.
    pub fn jump(&mut self, target: usize) {
        self.prev_target = target;
        self.row_offset = 0.0;
    }

    /// Decay the offset toward zero.  Call once per frame.
    pub fn tick(&mut self) {
        self.row_offset *= 1.0 - self.speed;
        if self.row_offset.abs() < 0.4 {
            self.row_offset = 0.0;
        }
    }

    /// First page row currently shown.
    pub fn displayed(&self) -> usize {
        (self.prev_target as f64 - self.row_offset).round().max(0.0) as usize
    }

    pub fn target(&self) -> usize {
        self.prev_target
    }

    pub fn is_animating(&self) -> bool {
        self.row_offset != 0.0
    }
}
