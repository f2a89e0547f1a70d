use std::time::{Duration, Instant};

use orb_renderer::{
    ContextBudget, FrameQueue, HeadlessBackend, LoopPhase, OrbError, OrbParameters,
    RenderBackend, RenderSession, SessionSettings, StaticContainer, StaticEnvironment,
    SurfaceContainer, TickOutcome,
};

type Session = RenderSession<HeadlessBackend, StaticContainer>;

fn mount(budget: &ContextBudget, queue: &FrameQueue) -> Result<Session, OrbError> {
    let allocator = budget.clone();
    Session::create(
        StaticContainer::new(640.0, 480.0),
        Box::new(queue.clone()),
        &StaticEnvironment::default(),
        OrbParameters::default(),
        SessionSettings::default(),
        move |_, size| HeadlessBackend::allocate(&allocator, size),
    )
}

#[test]
fn mount_then_unmount_leaves_nothing_behind() {
    let budget = ContextBudget::default();
    let queue = FrameQueue::new();
    let mut session = mount(&budget, &queue).unwrap();
    let surface = session.surface_id();
    assert!(session.container().contains(surface));

    let mut now = Instant::now();
    for _ in 0..5 {
        now += Duration::from_millis(16);
        let token = queue.take_pending().unwrap();
        assert_eq!(session.on_frame(token, now), TickOutcome::Drawn);
    }
    let stale = queue.pending().unwrap();

    session.dispose();
    assert_eq!(session.phase(), LoopPhase::Disposed);
    assert!(!session.container().contains(surface));
    assert!(session.container().children().is_empty());
    assert!(!session.container().is_observed());
    assert!(session.backend().is_released());
    assert_eq!(budget.live(), 0);

    // A callback that was already in flight when the session went away.
    now += Duration::from_millis(16);
    assert_eq!(session.on_frame(stale, now), TickOutcome::Stale);
    assert_eq!(session.backend().draw_count(), 5);
    assert!(queue.pending().is_none());
}

#[test]
fn signals_after_dispose_are_ignored() {
    let budget = ContextBudget::default();
    let queue = FrameQueue::new();
    let mut session = mount(&budget, &queue).unwrap();
    session.dispose();

    session.set_page_visible(false);
    session.set_in_viewport(false);
    session.notify_resize(Instant::now());
    session.pointer_left();
    assert_eq!(session.phase(), LoopPhase::Disposed);
    assert!(session.next_deadline().is_none());
}

#[test]
fn dropping_a_session_releases_its_context() {
    let budget = ContextBudget::new(1);
    let queue = FrameQueue::new();
    {
        let _session = mount(&budget, &queue).unwrap();
        assert_eq!(budget.live(), 1);
        assert!(matches!(
            mount(&budget, &queue),
            Err(OrbError::ContextLimit { limit: 1 })
        ));
    }
    assert_eq!(budget.live(), 0);
    assert!(mount(&budget, &queue).is_ok());
}

#[test]
fn sessions_do_not_share_contexts() {
    let budget = ContextBudget::default();
    let first_queue = FrameQueue::new();
    let second_queue = FrameQueue::new();
    let mut first = mount(&budget, &first_queue).unwrap();
    let second = mount(&budget, &second_queue).unwrap();
    assert_ne!(first.surface_id(), second.surface_id());
    assert_eq!(budget.live(), 2);

    first.dispose();
    assert_eq!(budget.live(), 1);
    assert!(!second.backend().is_released());
}

#[test]
fn parameter_handle_outlives_session() {
    let budget = ContextBudget::default();
    let queue = FrameQueue::new();
    let mut session = mount(&budget, &queue).unwrap();
    let handle = session.parameters();
    session.dispose();
    drop(session);

    handle.set_hue(180.0);
    assert_eq!(handle.snapshot().hue, 180.0);
}
