use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use orb_config::OrbConfig;
use orb_renderer::{
    ContextBudget, FrameQueue, HeadlessBackend, RenderBackend, RenderSession, StaticContainer,
    TickOutcome,
};
use serde::Serialize;

use crate::bindings;

/// Summary printed after a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessReport {
    pub frames_delivered: u32,
    pub draws: u64,
    pub suspended_frames: u32,
    pub failed_frames: u32,
    pub resizes: u64,
    pub time: f64,
    pub hover: f32,
    pub rotation: f64,
    pub resolution: [f32; 3],
    pub background_color: [f32; 3],
    pub released: bool,
    pub live_contexts: usize,
}

/// Mounts an orb into an in-memory container and delivers `frames` frame
/// callbacks `interval` apart on a synthetic clock.
pub fn run_headless(config: &OrbConfig, frames: u32, interval: Duration) -> Result<HeadlessReport> {
    let budget = ContextBudget::default();
    let queue = FrameQueue::new();
    let environment = bindings::environment(config, None);
    let allocator = budget.clone();
    let mut session = RenderSession::create(
        StaticContainer::new(f64::from(config.window.width), f64::from(config.window.height)),
        Box::new(queue.clone()),
        &environment,
        bindings::parameters(config),
        bindings::session_settings(config),
        move |_, size| HeadlessBackend::allocate(&allocator, size),
    )
    .context("failed to mount headless orb")?;
    tracing::info!(
        surface = %session.surface_id(),
        frames,
        interval_ms = interval.as_millis() as u64,
        "running headless session"
    );

    let mut now = Instant::now();
    let mut frames_delivered = 0;
    let mut suspended_frames = 0;
    let mut failed_frames = 0;
    for _ in 0..frames {
        let token = queue
            .take_pending()
            .context("session stopped requesting frames")?;
        now += interval;
        match session.on_frame(token, now) {
            TickOutcome::Drawn => {}
            TickOutcome::Suspended => suspended_frames += 1,
            TickOutcome::Failed => failed_frames += 1,
            TickOutcome::Stale => continue,
        }
        frames_delivered += 1;
    }

    let uniforms = *session.backend().uniforms();
    let [width, height, aspect, _] = uniforms.resolution;
    let [r, g, b, _] = uniforms.background_color;
    let time = session.time();
    let hover = session.hover();
    let rotation = session.rotation();

    session.dispose();
    let backend = session.backend();

    Ok(HeadlessReport {
        frames_delivered,
        draws: backend.draw_count(),
        suspended_frames,
        failed_frames,
        resizes: backend.resize_count(),
        time,
        hover,
        rotation,
        resolution: [width, height, aspect],
        background_color: [r, g, b],
        released: backend.is_released(),
        live_contexts: budget.live(),
    })
}
