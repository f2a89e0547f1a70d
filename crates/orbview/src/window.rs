use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use orb_config::OrbConfig;
use orb_renderer::{
    FrameQueue, LoopPhase, RenderSession, SurfaceContainer, SurfaceId, WgpuBackend,
};
use winit::dpi::LogicalSize;
use winit::event::{Event, StartCause, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::window::{Window, WindowBuilder};

use crate::bindings;
use crate::commands::{spawn_stdin_reader, OrbCommand};

/// How often a suspended loop is still ticked.
const SUSPENDED_POLL: Duration = Duration::from_millis(250);

/// A desktop window acting as the orb's container.
struct WindowContainer {
    window: Arc<Window>,
    surfaces: Vec<SurfaceId>,
    observed: bool,
}

impl WindowContainer {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            surfaces: Vec::new(),
            observed: false,
        }
    }
}

impl SurfaceContainer for WindowContainer {
    fn logical_size(&self) -> LogicalSize<f64> {
        self.window
            .inner_size()
            .to_logical(self.window.scale_factor())
    }

    fn is_attached(&self) -> bool {
        true
    }

    fn append_surface(&mut self, surface: SurfaceId) {
        if !self.surfaces.contains(&surface) {
            self.surfaces.push(surface);
        }
    }

    fn remove_surface(&mut self, surface: SurfaceId) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|existing| *existing != surface);
        self.surfaces.len() != before
    }

    fn contains(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains(&surface)
    }

    fn set_observed(&mut self, observed: bool) {
        if self.observed != observed {
            tracing::debug!(observed, "window observation changed");
        }
        self.observed = observed;
    }
}

type WindowSession = RenderSession<WgpuBackend<Window>, WindowContainer>;

pub fn run_window(config: &OrbConfig) -> Result<()> {
    let event_loop = EventLoopBuilder::<OrbCommand>::with_user_event()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let proxy = event_loop.create_proxy();

    let window = WindowBuilder::new()
        .with_title(config.window.title.as_str())
        .with_inner_size(LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
        .with_transparent(config.window.transparent)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create orb window: {err}"))?;
    let window = Arc::new(window);

    let environment = bindings::environment(config, Some(window.scale_factor()));
    let queue = FrameQueue::new();
    let surface_target = Arc::clone(&window);
    let mut session: WindowSession = RenderSession::create(
        WindowContainer::new(Arc::clone(&window)),
        Box::new(queue.clone()),
        &environment,
        bindings::parameters(config),
        bindings::session_settings(config),
        move |_, size| WgpuBackend::allocate(surface_target, size),
    )
    .context("failed to mount orb into window")?;
    let parameters = session.parameters();

    spawn_stdin_reader(proxy)?;
    tracing::info!("orb window ready; reading commands from stdin");

    event_loop
        .run(move |event, elwt| match event {
            Event::UserEvent(command) => {
                tracing::debug!(?command, "applying command");
                if !command.apply(&parameters) {
                    session.dispose();
                    elwt.exit();
                }
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    session.dispose();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => {
                    session.set_in_viewport(size.width > 0 && size.height > 0);
                    session.notify_resize(Instant::now());
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    session.notify_resize(Instant::now());
                }
                WindowEvent::Occluded(occluded) => session.set_page_visible(!occluded),
                WindowEvent::CursorMoved { position, .. } => {
                    session.pointer_moved(position.to_logical(window.scale_factor()));
                }
                WindowEvent::CursorLeft { .. } => session.pointer_left(),
                WindowEvent::RedrawRequested => deliver_frame(&mut session, &queue),
                _ => {}
            },
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                deliver_frame(&mut session, &queue);
            }
            Event::AboutToWait => {
                if session.is_disposed() || queue.pending().is_none() {
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if session.phase() == LoopPhase::Running {
                    window.request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else {
                    let mut wake = Instant::now() + SUSPENDED_POLL;
                    if let Some(deadline) = session.next_deadline() {
                        wake = wake.min(deadline);
                    }
                    tracing::trace!("loop suspended; polling");
                    elwt.set_control_flow(ControlFlow::WaitUntil(wake));
                }
            }
            Event::LoopExiting => session.dispose(),
            _ => {}
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))
}

fn deliver_frame(session: &mut WindowSession, queue: &FrameQueue) {
    if let Some(token) = queue.take_pending() {
        session.on_frame(token, Instant::now());
    }
}
