//! Managed render surface for the animated orb.
//!
//! A [`RenderSession`] owns one rendering context and drives it from the
//! host's frame callbacks. The overall flow is:
//!
//! ```text
//!   HostEnvironment ──▶ CapabilityConfig::probe (once)
//!                              │ framebuffer size
//!                              ▼
//!   RenderSession::create ──▶ allocate ──▶ RenderBackend (wgpu or headless)
//!          │                                     ▲
//!          │ FrameScheduler::request_frame       │ set_uniform × 6, draw()
//!          ▼                                     │
//!   on_frame(token, now) ──▶ resize? ──▶ gate ──▶ smooth hover, advance time
//!          ▲                                     ▲
//!   visibility / resize / pointer signals   ParameterHandle (latest value)
//! ```
//!
//! Host seams are traits (`SurfaceContainer`, `FrameScheduler`,
//! `HostEnvironment`, `RenderBackend`) so the whole lifecycle runs headless
//! with `StaticContainer`, `FrameQueue` and `HeadlessBackend`. The fragment
//! shader source is built once per process; each context compiles its own
//! module from it.

mod backend;
mod bridge;
mod capability;
mod color;
mod compile;
mod error;
mod gpu;
mod headless;
mod host;
mod pointer;
mod session;
mod types;
mod uniforms;

pub use backend::RenderBackend;
pub use bridge::ParameterHandle;
pub use capability::{
    CapabilityConfig, FrameRate, HostEnvironment, PointerKind, StaticEnvironment,
};
pub use color::parse_color;
pub use compile::fragment_source;
pub use error::OrbError;
pub use gpu::WgpuBackend;
pub use headless::{ContextBudget, HeadlessBackend, DEFAULT_CONTEXT_LIMIT};
pub use host::{FrameQueue, FrameScheduler, FrameToken, StaticContainer, SurfaceContainer};
pub use orb_scheduler::{LifecycleError, LoopPhase};
pub use pointer::PointerTracker;
pub use session::{RenderSession, TickOutcome};
pub use types::{OrbParameters, SessionSettings, SurfaceId};
pub use uniforms::{OrbUniforms, UniformName, UniformValue};
