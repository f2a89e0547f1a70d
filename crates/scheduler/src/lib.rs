//! Timing primitives behind the orb frame loop.
//!
//! Nothing in here knows about GPUs. The render session composes these pieces:
//! - `lifecycle` tracks the `Idle → Running ⇄ Suspended → Disposed` phases.
//! - `visibility` folds the viewport and page signals into one render gate.
//! - `debounce` coalesces bursts of resize signals into a single action.
//! - `clock` measures per-tick wall-clock deltas with an upper bound.
//! - `smoothing` provides the exponential follower used for hover easing.
//!
//! Everything is driven by caller-supplied `Instant`s so tests can run on a
//! synthetic clock.

mod clock;
mod debounce;
mod lifecycle;
mod smoothing;
mod visibility;

pub use clock::FrameClock;
pub use debounce::Debouncer;
pub use lifecycle::{Lifecycle, LifecycleError, LoopPhase};
pub use smoothing::ExponentialFollower;
pub use visibility::VisibilityGate;
