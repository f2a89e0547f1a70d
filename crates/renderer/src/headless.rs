//! GPU-free backend that records what it was asked to do.
//!
//! Used by the `--headless` host mode and by every lifecycle test: it honours
//! the same contract as the wgpu backend, including a global cap on live
//! contexts.

use std::cell::Cell;
use std::rc::Rc;

use winit::dpi::PhysicalSize;

use crate::backend::RenderBackend;
use crate::error::OrbError;
use crate::types::SurfaceId;
use crate::uniforms::{OrbUniforms, UniformName, UniformValue};

/// Hosts typically refuse to hand out more live contexts than this.
pub const DEFAULT_CONTEXT_LIMIT: usize = 16;

/// Shared count of live headless contexts.
///
/// Clones share the same counter, so a budget handed to several sessions
/// models one host-wide limit.
#[derive(Debug, Clone)]
pub struct ContextBudget {
    live: Rc<Cell<usize>>,
    limit: usize,
}

impl ContextBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            live: Rc::new(Cell::new(0)),
            limit,
        }
    }

    pub fn live(&self) -> usize {
        self.live.get()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn acquire(&self) -> Result<(), OrbError> {
        let live = self.live.get();
        if live >= self.limit {
            return Err(OrbError::ContextLimit { limit: self.limit });
        }
        self.live.set(live + 1);
        Ok(())
    }

    fn give_back(&self) {
        self.live.set(self.live.get().saturating_sub(1));
    }
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LIMIT)
    }
}

#[derive(Debug)]
pub struct HeadlessBackend {
    surface: SurfaceId,
    budget: ContextBudget,
    size: PhysicalSize<u32>,
    uniforms: OrbUniforms,
    released: bool,
    draw_count: u64,
    resize_count: u64,
    release_count: u64,
}

impl HeadlessBackend {
    /// Takes one slot from `budget`, failing with [`OrbError::ContextLimit`]
    /// when none is left.
    pub fn allocate(budget: &ContextBudget, size: PhysicalSize<u32>) -> Result<Self, OrbError> {
        budget.acquire()?;
        let surface = SurfaceId::next();
        tracing::debug!(
            %surface,
            width = size.width,
            height = size.height,
            live = budget.live(),
            "allocated headless context"
        );
        Ok(Self {
            surface,
            budget: budget.clone(),
            size,
            uniforms: OrbUniforms::new(size),
            released: false,
            draw_count: 0,
            resize_count: 0,
            release_count: 0,
        })
    }

    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    /// Number of real reallocations; same-size resizes are not counted.
    pub fn resize_count(&self) -> u64 {
        self.resize_count
    }

    /// Number of times the context slot was actually returned.
    pub fn release_count(&self) -> u64 {
        self.release_count
    }
}

impl RenderBackend for HeadlessBackend {
    fn surface_id(&self) -> SurfaceId {
        self.surface
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), OrbError> {
        if self.released {
            return Err(OrbError::Released);
        }
        if size == self.size {
            return Ok(());
        }
        self.size = size;
        self.uniforms.set_resolution(size);
        self.resize_count += 1;
        Ok(())
    }

    fn set_uniform(&mut self, name: UniformName, value: UniformValue) -> Result<(), OrbError> {
        if self.released {
            return Err(OrbError::Released);
        }
        self.uniforms.set(name, value)
    }

    fn uniforms(&self) -> &OrbUniforms {
        &self.uniforms
    }

    fn draw(&mut self) -> Result<(), OrbError> {
        if self.released {
            return Err(OrbError::Released);
        }
        self.draw_count += 1;
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.release_count += 1;
        self.budget.give_back();
        tracing::debug!(
            surface = %self.surface,
            live = self.budget.live(),
            "released headless context"
        );
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for HeadlessBackend {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_enforced_and_returned() {
        let budget = ContextBudget::new(2);
        let mut first = HeadlessBackend::allocate(&budget, PhysicalSize::new(4, 4)).unwrap();
        let _second = HeadlessBackend::allocate(&budget, PhysicalSize::new(4, 4)).unwrap();
        assert_eq!(budget.live(), 2);

        let err = HeadlessBackend::allocate(&budget, PhysicalSize::new(4, 4)).unwrap_err();
        assert!(matches!(err, OrbError::ContextLimit { limit: 2 }));

        first.release();
        first.release();
        assert_eq!(first.release_count(), 1);
        assert_eq!(budget.live(), 1);
        assert!(HeadlessBackend::allocate(&budget, PhysicalSize::new(4, 4)).is_ok());
    }

    #[test]
    fn same_size_resize_is_free() {
        let budget = ContextBudget::default();
        let mut backend = HeadlessBackend::allocate(&budget, PhysicalSize::new(10, 20)).unwrap();
        backend.resize(PhysicalSize::new(10, 20)).unwrap();
        assert_eq!(backend.resize_count(), 0);
        backend.resize(PhysicalSize::new(30, 20)).unwrap();
        assert_eq!(backend.resize_count(), 1);
        assert_eq!(backend.uniforms().resolution, [30.0, 20.0, 1.5, 0.0]);
    }

    #[test]
    fn released_backend_refuses_work() {
        let budget = ContextBudget::default();
        let mut backend = HeadlessBackend::allocate(&budget, PhysicalSize::new(1, 1)).unwrap();
        backend.release();
        assert!(backend.is_released());
        assert!(matches!(backend.draw(), Err(OrbError::Released)));
        assert!(matches!(
            backend.set_uniform(UniformName::Hue, UniformValue::Scalar(1.0)),
            Err(OrbError::Released)
        ));
        assert_eq!(backend.draw_count(), 0);
    }

    #[test]
    fn dropping_returns_the_slot() {
        let budget = ContextBudget::new(1);
        {
            let _backend = HeadlessBackend::allocate(&budget, PhysicalSize::new(1, 1)).unwrap();
            assert_eq!(budget.live(), 1);
        }
        assert_eq!(budget.live(), 0);
    }
}
