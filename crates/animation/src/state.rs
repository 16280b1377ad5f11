use std::time::Duration;

/// Lifecycle of one animation run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl AnimationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AnimationPhase::Completed | AnimationPhase::Cancelled | AnimationPhase::Failed
        )
    }
}

/// Progress through a route.
///
/// `cursor` only grows, by `step` per tick. The growing line shows the
/// coordinates strictly before `cursor`; the camera sits on `route[cursor]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnimationState {
    cursor: usize,
    step: usize,
    tick_interval: Duration,
}

impl AnimationState {
    /// `step` of 0 is clamped to 1 so the cursor always makes progress.
    pub fn new(step: usize, tick_interval: Duration) -> Self {
        Self {
            cursor: 0,
            step: step.max(1),
            tick_interval,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Whether a route of `len` coordinates has been fully walked.
    pub fn is_done(&self, len: usize) -> bool {
        self.cursor >= len
    }

    /// Moves the cursor forward and returns the new value.
    pub fn advance(&mut self) -> usize {
        self.cursor = self.cursor.saturating_add(self.step);
        self.cursor
    }
}

/// Ticks needed to walk `len` coordinates with `step` per tick.
pub fn ticks_for(len: usize, step: usize) -> usize {
    len.div_ceil(step.max(1))
}
