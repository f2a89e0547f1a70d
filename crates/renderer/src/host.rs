//! Seams to the embedding host: the container the surface lives in and the
//! per-frame callback facility.

use std::cell::RefCell;
use std::rc::Rc;

use winit::dpi::LogicalSize;

use crate::types::SurfaceId;

/// The element a session renders into.
pub trait SurfaceContainer {
    /// Displayed size in logical (CSS) pixels.
    fn logical_size(&self) -> LogicalSize<f64>;

    /// Whether the container is part of a live, visible tree.
    fn is_attached(&self) -> bool;

    fn append_surface(&mut self, surface: SurfaceId);

    /// Removes `surface` if it is still a child; returns whether it was.
    fn remove_surface(&mut self, surface: SurfaceId) -> bool;

    fn contains(&self, surface: SurfaceId) -> bool;

    /// Starts or stops delivery of size/visibility observations for this
    /// container.
    fn set_observed(&mut self, observed: bool);
}

/// In-memory container with a settable size.
#[derive(Debug, Clone)]
pub struct StaticContainer {
    size: LogicalSize<f64>,
    attached: bool,
    observed: bool,
    children: Vec<SurfaceId>,
}

impl StaticContainer {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: LogicalSize::new(width, height),
            attached: true,
            observed: false,
            children: Vec::new(),
        }
    }

    /// A container that is not part of any tree.
    pub fn detached(width: f64, height: f64) -> Self {
        Self {
            attached: false,
            ..Self::new(width, height)
        }
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = LogicalSize::new(width, height);
    }

    pub fn is_observed(&self) -> bool {
        self.observed
    }

    pub fn children(&self) -> &[SurfaceId] {
        &self.children
    }
}

impl SurfaceContainer for StaticContainer {
    fn logical_size(&self) -> LogicalSize<f64> {
        self.size
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn append_surface(&mut self, surface: SurfaceId) {
        if !self.children.contains(&surface) {
            self.children.push(surface);
        }
    }

    fn remove_surface(&mut self, surface: SurfaceId) -> bool {
        let before = self.children.len();
        self.children.retain(|child| *child != surface);
        self.children.len() != before
    }

    fn contains(&self, surface: SurfaceId) -> bool {
        self.children.contains(&surface)
    }

    fn set_observed(&mut self, observed: bool) {
        self.observed = observed;
    }
}

/// Handle for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// The host's "call me before the next repaint" facility.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameToken;

    /// Cancels a pending request. Unknown or already delivered tokens are
    /// ignored.
    fn cancel_frame(&mut self, token: FrameToken);
}

#[derive(Debug, Default)]
struct QueueState {
    next: u64,
    pending: Option<FrameToken>,
    requested: u64,
    cancelled: u64,
}

/// Single-slot frame scheduler shared between a session and its host.
///
/// The session requests frames through its clone; the host drains the
/// pending token with [`FrameQueue::take_pending`] and hands it back to
/// `RenderSession::on_frame`.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    state: Rc<RefCell<QueueState>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_pending(&self) -> Option<FrameToken> {
        self.state.borrow_mut().pending.take()
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.state.borrow().pending
    }

    pub fn requested(&self) -> u64 {
        self.state.borrow().requested
    }

    pub fn cancelled(&self) -> u64 {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameToken {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        state.requested += 1;
        let token = FrameToken(state.next);
        state.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(token) {
            state.pending = None;
            state.cancelled += 1;
        }
    }
}
