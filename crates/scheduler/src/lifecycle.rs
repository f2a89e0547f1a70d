use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("render loop already started (phase: {0})")]
    AlreadyStarted(LoopPhase),
    #[error("render loop has been disposed")]
    Disposed,
}

/// Phase of a render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopPhase {
    /// Constructed but not mounted yet.
    Idle,
    /// Ticking and drawing.
    Running,
    /// Ticking, but each tick skips its work.
    Suspended,
    /// Terminal; the loop is cancelled and resources are gone.
    Disposed,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopPhase::Idle => f.write_str("idle"),
            LoopPhase::Running => f.write_str("running"),
            LoopPhase::Suspended => f.write_str("suspended"),
            LoopPhase::Disposed => f.write_str("disposed"),
        }
    }
}

/// Phase machine for a single render loop.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: LoopPhase,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == LoopPhase::Disposed
    }

    /// Moves `Idle` into `Running`, or straight into `Suspended` when the
    /// render gate is already closed.
    pub fn start(&mut self, should_render: bool) -> Result<LoopPhase, LifecycleError> {
        match self.phase {
            LoopPhase::Idle => {
                self.phase = if should_render {
                    LoopPhase::Running
                } else {
                    LoopPhase::Suspended
                };
                Ok(self.phase)
            }
            LoopPhase::Disposed => Err(LifecycleError::Disposed),
            other => Err(LifecycleError::AlreadyStarted(other)),
        }
    }

    /// Re-evaluates `Running`/`Suspended` against the render gate.
    ///
    /// Returns the new phase when a transition happened. `Idle` and
    /// `Disposed` never change here.
    pub fn apply_gate(&mut self, should_render: bool) -> Option<LoopPhase> {
        let next = match (self.phase, should_render) {
            (LoopPhase::Running, false) => LoopPhase::Suspended,
            (LoopPhase::Suspended, true) => LoopPhase::Running,
            _ => return None,
        };
        self.phase = next;
        Some(next)
    }

    /// Marks the loop disposed. Returns `false` if it already was.
    pub fn dispose(&mut self) -> bool {
        if self.phase == LoopPhase::Disposed {
            return false;
        }
        self.phase = LoopPhase::Disposed;
        true
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            phase: LoopPhase::Idle,
        }
    }
}
