use std::time::{Duration, Instant};

use orb_scheduler::{
    Debouncer, ExponentialFollower, FrameClock, Lifecycle, LoopPhase, VisibilityGate,
};
use winit::dpi::{LogicalPosition, PhysicalSize};

use crate::backend::RenderBackend;
use crate::bridge::{ParameterBridge, ParameterHandle};
use crate::capability::{CapabilityConfig, HostEnvironment};
use crate::color::BackgroundColor;
use crate::error::OrbError;
use crate::host::{FrameScheduler, FrameToken, SurfaceContainer};
use crate::pointer::PointerTracker;
use crate::types::{OrbParameters, SessionSettings, SurfaceId};
use crate::uniforms::{UniformName, UniformValue};

/// Effective hover above which the orb counts as hovered for rotation.
const ROTATION_HOVER_THRESHOLD: f32 = 0.5;

/// What a single frame callback ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The token was cancelled, superseded, or the session is disposed.
    Stale,
    /// The loop is suspended; the next frame was still requested.
    Suspended,
    Drawn,
    /// Something failed this frame; the error was logged and the loop goes on.
    Failed,
}

/// One mounted orb: the capability snapshot, the rendering context, the
/// parameter cell and the frame loop that ties them together.
///
/// Field order matters for `Drop`: the backend is released before the
/// container goes away.
pub struct RenderSession<B: RenderBackend, C: SurfaceContainer> {
    backend: B,
    container: C,
    frames: Box<dyn FrameScheduler>,
    capabilities: CapabilityConfig,
    settings: SessionSettings,
    surface: SurfaceId,
    bridge: ParameterBridge,
    background: BackgroundColor,
    lifecycle: Lifecycle,
    visibility: VisibilityGate,
    resize: Debouncer<()>,
    clock: FrameClock,
    pointer: PointerTracker,
    hover: ExponentialFollower,
    time: f64,
    rotation: f64,
    pending_frame: Option<FrameToken>,
    frames_drawn: u64,
}

impl<B: RenderBackend, C: SurfaceContainer> RenderSession<B, C> {
    /// Mounts an orb into `container`.
    ///
    /// Probes `environment` once, asks `allocate` for a context sized to the
    /// container, appends the context's surface to the container, starts
    /// observing it and schedules the first frame. Allocation errors are
    /// returned as-is and leave the container untouched.
    pub fn create<F>(
        mut container: C,
        frames: Box<dyn FrameScheduler>,
        environment: &dyn HostEnvironment,
        parameters: OrbParameters,
        settings: SessionSettings,
        allocate: F,
    ) -> Result<Self, OrbError>
    where
        F: FnOnce(&CapabilityConfig, PhysicalSize<u32>) -> Result<B, OrbError>,
    {
        if !container.is_attached() {
            return Err(OrbError::ContainerDetached);
        }

        let capabilities = CapabilityConfig::probe(environment);
        let initial_size = capabilities.framebuffer_size(container.logical_size());
        let backend = allocate(&capabilities, initial_size)?;
        let surface = backend.surface_id();

        container.append_surface(surface);
        container.set_observed(true);

        let mut session = Self {
            backend,
            container,
            frames,
            capabilities,
            surface,
            bridge: ParameterBridge::new(parameters),
            background: BackgroundColor::new(),
            lifecycle: Lifecycle::new(),
            visibility: VisibilityGate::default(),
            resize: Debouncer::new(settings.resize_debounce),
            clock: FrameClock::new(settings.max_frame_delta),
            pointer: PointerTracker::new(settings.hover_radius),
            hover: ExponentialFollower::new(0.0, settings.hover_smoothing),
            settings,
            time: 0.0,
            rotation: 0.0,
            pending_frame: None,
            frames_drawn: 0,
        };

        let phase = session.lifecycle.start(session.visibility.should_render())?;
        session.pending_frame = Some(session.frames.request_frame());
        tracing::info!(
            %surface,
            width = initial_size.width,
            height = initial_size.height,
            touch = capabilities.is_touch_primary,
            reduced_motion = capabilities.reduced_motion,
            %phase,
            "orb session created"
        );
        Ok(session)
    }

    /// Runs one frame. `token` must be the one most recently requested by
    /// this session; anything else is ignored.
    pub fn on_frame(&mut self, token: FrameToken, now: Instant) -> TickOutcome {
        if self.lifecycle.is_disposed() || self.pending_frame != Some(token) {
            tracing::trace!(surface = %self.surface, token = token.get(), "ignoring stale frame");
            return TickOutcome::Stale;
        }
        self.pending_frame = Some(self.frames.request_frame());

        if self.resize.poll(now).is_some() {
            self.apply_resize();
        }

        let delta = self.clock.advance(now);
        if self.lifecycle.phase() != LoopPhase::Running {
            return TickOutcome::Suspended;
        }

        match self.render(delta) {
            Ok(()) => {
                self.frames_drawn += 1;
                TickOutcome::Drawn
            }
            Err(err) => {
                tracing::warn!(surface = %self.surface, error = %err, "frame failed; continuing");
                TickOutcome::Failed
            }
        }
    }

    fn render(&mut self, delta: Duration) -> Result<(), OrbError> {
        let params = self.bridge.current();

        let effective_hover = if params.force_hover_state {
            1.0
        } else {
            self.pointer.target()
        };
        let hover = self.hover.follow(effective_hover);

        if !self.capabilities.reduced_motion {
            let seconds = delta.as_secs_f64();
            self.time += seconds;
            if params.rotate_on_hover && effective_hover > ROTATION_HOVER_THRESHOLD {
                self.rotation += seconds * f64::from(self.settings.rotation_speed);
            }
        }

        let background = self.background.resolve(&params.background_color);

        let writes = [
            (UniformName::Time, UniformValue::Scalar(self.time as f32)),
            (UniformName::Hue, UniformValue::Scalar(params.hue)),
            (UniformName::Hover, UniformValue::Scalar(hover)),
            (
                UniformName::HoverIntensity,
                UniformValue::Scalar(params.hover_intensity),
            ),
            (UniformName::Rotation, UniformValue::Scalar(self.rotation as f32)),
            (UniformName::BackgroundColor, UniformValue::Vec3(background)),
        ];
        drop(params);

        for (name, value) in writes {
            self.backend.set_uniform(name, value)?;
        }
        tracing::trace!(
            surface = %self.surface,
            time = self.time,
            hover,
            rotation = self.rotation,
            "drawing frame"
        );
        self.backend.draw()
    }

    fn apply_resize(&mut self) {
        let size = self
            .capabilities
            .framebuffer_size(self.container.logical_size());
        match self.backend.resize(size) {
            Ok(()) => tracing::debug!(
                surface = %self.surface,
                width = size.width,
                height = size.height,
                "applied debounced resize"
            ),
            Err(err) => tracing::warn!(surface = %self.surface, error = %err, "resize failed"),
        }
    }

    /// Host visibility (tab/app foreground) changed.
    pub fn set_page_visible(&mut self, visible: bool) {
        if self.lifecycle.is_disposed() {
            return;
        }
        if self.visibility.set_page_visible(visible) {
            self.apply_gate();
        }
    }

    /// The container scrolled into or out of the viewport.
    pub fn set_in_viewport(&mut self, in_viewport: bool) {
        if self.lifecycle.is_disposed() {
            return;
        }
        if self.visibility.set_in_viewport(in_viewport) {
            self.apply_gate();
        }
    }

    fn apply_gate(&mut self) {
        if let Some(phase) = self.lifecycle.apply_gate(self.visibility.should_render()) {
            tracing::debug!(
                surface = %self.surface,
                %phase,
                in_viewport = self.visibility.in_viewport(),
                page_visible = self.visibility.page_visible(),
                "render loop phase changed"
            );
        }
    }

    /// The container's size changed. The reallocation happens on the first
    /// tick after the debounce window has been quiet.
    pub fn notify_resize(&mut self, now: Instant) {
        if self.lifecycle.is_disposed() {
            return;
        }
        self.resize.signal((), now);
    }

    /// Pointer moved; `position` is relative to the container.
    pub fn pointer_moved(&mut self, position: LogicalPosition<f64>) {
        if self.lifecycle.is_disposed() || !self.capabilities.pointer_listeners {
            return;
        }
        self.pointer.moved(position, self.container.logical_size());
    }

    pub fn pointer_left(&mut self) {
        if self.lifecycle.is_disposed() || !self.capabilities.pointer_listeners {
            return;
        }
        self.pointer.left();
    }

    pub fn parameters(&self) -> ParameterHandle {
        self.bridge.handle()
    }

    /// Tears the session down: cancel the frame, cancel the pending resize,
    /// stop observing, release the context, detach the surface. Calling it
    /// again does nothing.
    pub fn dispose(&mut self) {
        if !self.lifecycle.dispose() {
            return;
        }
        if let Some(token) = self.pending_frame.take() {
            self.frames.cancel_frame(token);
        }
        self.resize.cancel();
        self.container.set_observed(false);
        self.backend.release();
        let removed = self.container.remove_surface(self.surface);
        tracing::info!(
            surface = %self.surface,
            frames = self.frames_drawn,
            removed,
            "orb session disposed"
        );
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Mutable access for hosts whose container state lives in the session.
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    pub fn capabilities(&self) -> &CapabilityConfig {
        &self.capabilities
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface
    }

    pub fn phase(&self) -> LoopPhase {
        self.lifecycle.phase()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.pending_frame
    }

    /// When the pending resize becomes due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.resize.next_deadline()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn hover(&self) -> f32 {
        self.hover.value()
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[cfg(test)]
    pub(crate) fn background_parses(&self) -> u64 {
        self.background.parses()
    }
}

impl<B: RenderBackend, C: SurfaceContainer> Drop for RenderSession<B, C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{PointerKind, StaticEnvironment};
    use crate::headless::{ContextBudget, HeadlessBackend};
    use crate::host::{FrameQueue, StaticContainer};

    type Session = RenderSession<HeadlessBackend, StaticContainer>;

    const FRAME: Duration = Duration::from_millis(16);

    struct Harness {
        session: Session,
        queue: FrameQueue,
        budget: ContextBudget,
        now: Instant,
    }

    impl Harness {
        fn new(env: StaticEnvironment, params: OrbParameters) -> Self {
            let budget = ContextBudget::default();
            let queue = FrameQueue::new();
            let allocator = budget.clone();
            let session = Session::create(
                StaticContainer::new(300.0, 300.0),
                Box::new(queue.clone()),
                &env,
                params,
                SessionSettings::default(),
                move |_, size| HeadlessBackend::allocate(&allocator, size),
            )
            .unwrap();
            Self {
                session,
                queue,
                budget,
                now: Instant::now(),
            }
        }

        fn desktop() -> Self {
            Self::new(StaticEnvironment::default(), OrbParameters::default())
        }

        fn tick(&mut self) -> TickOutcome {
            self.now += FRAME;
            let token = self.queue.take_pending().expect("a frame is always pending");
            self.session.on_frame(token, self.now)
        }
    }

    #[test]
    fn create_mounts_surface_and_schedules_a_frame() {
        let harness = Harness::desktop();
        let session = &harness.session;
        assert_eq!(session.phase(), LoopPhase::Running);
        assert!(session.container().contains(session.surface_id()));
        assert!(session.container().is_observed());
        assert_eq!(harness.queue.pending(), session.pending_frame());
        assert_eq!(session.backend().size(), PhysicalSize::new(300, 300));
        assert_eq!(harness.budget.live(), 1);
    }

    #[test]
    fn detached_container_is_refused_before_allocation() {
        let budget = ContextBudget::default();
        let allocator = budget.clone();
        let result = Session::create(
            StaticContainer::detached(10.0, 10.0),
            Box::new(FrameQueue::new()),
            &StaticEnvironment::default(),
            OrbParameters::default(),
            SessionSettings::default(),
            move |_, size| HeadlessBackend::allocate(&allocator, size),
        );
        assert!(matches!(result, Err(OrbError::ContainerDetached)));
        assert_eq!(budget.live(), 0);
    }

    #[test]
    fn allocation_failure_propagates() {
        let result = Session::create(
            StaticContainer::new(10.0, 10.0),
            Box::new(FrameQueue::new()),
            &StaticEnvironment::default(),
            OrbParameters::default(),
            SessionSettings::default(),
            |_, _| Err(OrbError::ContextLimit { limit: 0 }),
        );
        assert!(matches!(result, Err(OrbError::ContextLimit { limit: 0 })));
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut harness = Harness::desktop();
        harness.tick();
        harness.session.dispose();
        harness.session.dispose();
        assert_eq!(harness.session.backend().release_count(), 1);
        assert_eq!(harness.budget.live(), 0);
        assert_eq!(harness.session.phase(), LoopPhase::Disposed);
        assert!(!harness.session.container().is_observed());
        assert!(harness.queue.pending().is_none());
        assert_eq!(harness.queue.cancelled(), 1);
    }

    #[test]
    fn no_draw_while_suspended_for_any_signal_sequence() {
        let mut harness = Harness::desktop();
        // Small LCG so the sequence is reproducible.
        let mut seed: u32 = 0x2545_f491;
        let mut next = move || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            seed >> 16
        };
        for _ in 0..500 {
            match next() % 3 {
                0 => harness.session.set_in_viewport(next() % 2 == 0),
                1 => harness.session.set_page_visible(next() % 2 == 0),
                _ => {}
            }
            let before = harness.session.backend().draw_count();
            let suspended = harness.session.phase() == LoopPhase::Suspended;
            let outcome = harness.tick();
            let drew = harness.session.backend().draw_count() > before;
            if suspended {
                assert_eq!(outcome, TickOutcome::Suspended);
                assert!(!drew);
            } else {
                assert!(drew);
            }
        }
    }

    #[test]
    fn either_signal_suspends_and_both_must_clear() {
        let mut harness = Harness::desktop();
        harness.session.set_in_viewport(false);
        harness.session.set_page_visible(false);
        assert_eq!(harness.session.phase(), LoopPhase::Suspended);
        harness.session.set_in_viewport(true);
        assert_eq!(harness.session.phase(), LoopPhase::Suspended);
        assert_eq!(harness.tick(), TickOutcome::Suspended);
        harness.session.set_page_visible(true);
        assert_eq!(harness.session.phase(), LoopPhase::Running);
        assert_eq!(harness.tick(), TickOutcome::Drawn);
    }

    #[test]
    fn hover_converges_monotonically_without_overshoot() {
        let mut harness = Harness::desktop();
        harness
            .session
            .pointer_moved(LogicalPosition::new(150.0, 150.0));
        let mut previous = harness.session.hover();
        for _ in 0..200 {
            harness.tick();
            let hover = harness.session.hover();
            assert!(hover >= previous);
            assert!(hover <= 1.0);
            previous = hover;
        }
        assert!(previous > 0.99);

        harness.session.pointer_left();
        for _ in 0..200 {
            harness.tick();
            let hover = harness.session.hover();
            assert!(hover <= previous);
            assert!(hover >= 0.0);
            previous = hover;
        }
        assert!(previous < 0.01);
    }

    #[test]
    fn first_hover_step_is_a_tenth_of_the_gap() {
        let mut harness = Harness::desktop();
        harness.session.parameters().set_force_hover_state(true);
        harness.tick();
        assert!((harness.session.hover() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn reduced_motion_freezes_time() {
        let env = StaticEnvironment {
            reduced_motion: Some(true),
            ..StaticEnvironment::default()
        };
        let mut harness = Harness::new(env, OrbParameters::default().with_force_hover_state(true));
        harness.tick();
        let first = harness.session.backend().uniforms().time;
        for _ in 0..99 {
            harness.tick();
        }
        assert_eq!(harness.session.backend().uniforms().time, first);
        assert_eq!(harness.session.rotation(), 0.0);
        assert!(harness.session.hover() > 0.9);
    }

    #[test]
    fn time_advances_by_capped_delta() {
        let mut harness = Harness::desktop();
        harness.tick();
        let start = harness.session.time();
        harness.now += Duration::from_secs(10);
        harness.tick();
        let advanced = harness.session.time() - start;
        assert!((advanced - 0.05).abs() < 1e-9);
    }

    #[test]
    fn resize_burst_reallocates_once() {
        let mut harness = Harness::desktop();
        let start = harness.now;
        for step in 0..50u32 {
            harness
                .session
                .container_mut()
                .set_size(300.0 + f64::from(step), 200.0);
            harness.session.notify_resize(start + Duration::from_millis(u64::from(step) * 3));
        }
        harness.now = start + Duration::from_millis(150);
        for _ in 0..30 {
            harness.tick();
        }
        assert_eq!(harness.session.backend().resize_count(), 1);
        assert_eq!(harness.session.backend().size(), PhysicalSize::new(349, 200));
        assert!(harness.session.next_deadline().is_none());
    }

    #[test]
    fn due_resize_applies_while_suspended() {
        let mut harness = Harness::desktop();
        harness.session.set_page_visible(false);
        harness.session.container_mut().set_size(100.0, 100.0);
        harness.session.notify_resize(harness.now);
        harness.now += Duration::from_millis(200);
        assert_eq!(harness.tick(), TickOutcome::Suspended);
        assert_eq!(harness.session.backend().size(), PhysicalSize::new(100, 100));
        assert_eq!(harness.session.backend().draw_count(), 0);
    }

    #[test]
    fn background_is_parsed_only_on_change() {
        let mut harness = Harness::desktop();
        for _ in 0..20 {
            harness.tick();
        }
        assert_eq!(harness.session.background_parses(), 1);
        harness.session.parameters().set_background_color("#ffffff");
        for _ in 0..20 {
            harness.tick();
        }
        assert_eq!(harness.session.background_parses(), 2);
        assert_eq!(
            harness.session.backend().uniforms().background_color,
            [1.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn forced_hover_overrides_pointer() {
        let mut harness = Harness::desktop();
        harness.session.pointer_moved(LogicalPosition::new(0.0, 0.0));
        harness.session.parameters().set_force_hover_state(true);
        for _ in 0..100 {
            harness.tick();
        }
        assert!(harness.session.hover() > 0.99);
        assert!(harness.session.rotation() > 0.0);
    }

    #[test]
    fn rotation_needs_hover_and_the_flag() {
        let mut harness = Harness::new(
            StaticEnvironment::default(),
            OrbParameters::default().with_rotate_on_hover(false),
        );
        harness.session.parameters().set_force_hover_state(true);
        for _ in 0..10 {
            harness.tick();
        }
        assert_eq!(harness.session.rotation(), 0.0);

        harness.session.parameters().set_rotate_on_hover(true);
        harness.tick();
        let expected = FRAME.as_secs_f64() * 0.3;
        assert!((harness.session.rotation() - expected).abs() < 1e-6);
    }

    #[test]
    fn touch_sessions_ignore_pointer() {
        let env = StaticEnvironment {
            pointer: Some(PointerKind::Coarse),
            ..StaticEnvironment::default()
        };
        let mut harness = Harness::new(env, OrbParameters::default());
        assert_eq!(harness.session.backend().size(), PhysicalSize::new(150, 150));
        harness
            .session
            .pointer_moved(LogicalPosition::new(150.0, 150.0));
        for _ in 0..10 {
            harness.tick();
        }
        assert_eq!(harness.session.hover(), 0.0);
    }

    #[test]
    fn parameter_changes_reach_the_next_draw() {
        let mut harness = Harness::desktop();
        harness.tick();
        let handle = harness.session.parameters();
        handle.set_hue(90.0);
        handle.set_hover_intensity(0.5);
        assert_eq!(harness.session.backend().uniforms().hue, 0.0);
        harness.tick();
        let uniforms = harness.session.backend().uniforms();
        assert_eq!(uniforms.hue, 90.0);
        assert_eq!(uniforms.hover_intensity, 0.5);
        assert_eq!(harness.budget.live(), 1);
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let mut harness = Harness::desktop();
        let token = harness.queue.take_pending().unwrap();
        harness.now += FRAME;
        assert_eq!(harness.session.on_frame(token, harness.now), TickOutcome::Drawn);
        assert_eq!(harness.session.on_frame(token, harness.now), TickOutcome::Stale);
        assert_eq!(harness.session.frames_drawn(), 1);
    }
}
