use orb_scheduler::LifecycleError;

use crate::uniforms::UniformName;

/// Errors surfaced by the render surface.
///
/// Only construction-time failures (`ContainerDetached`, `ContextAllocation`,
/// `ContextLimit`) ever reach the embedder from `RenderSession::create`. The
/// per-frame variants are logged and absorbed by the frame loop.
#[derive(Debug, thiserror::Error)]
pub enum OrbError {
    #[error("container is not attached to a visible tree")]
    ContainerDetached,
    #[error("failed to allocate rendering context: {reason:#}")]
    ContextAllocation { reason: anyhow::Error },
    #[error("rendering context limit reached ({limit} live contexts)")]
    ContextLimit { limit: usize },
    #[error("uniform `{name}` expects a {expected} value")]
    UniformType {
        name: UniformName,
        expected: &'static str,
    },
    #[error("rendering context has been released")]
    Released,
    #[error("failed to acquire frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl OrbError {
    pub(crate) fn allocation(reason: anyhow::Error) -> Self {
        Self::ContextAllocation { reason }
    }
}
