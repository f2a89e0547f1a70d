use winit::dpi::PhysicalSize;

use crate::error::OrbError;
use crate::types::SurfaceId;
use crate::uniforms::{OrbUniforms, UniformName, UniformValue};

/// A rendering context with exactly one pipeline and one uniform block.
///
/// A backend is allocated once per session and never recreated; parameter
/// changes go through [`RenderBackend::set_uniform`]. After
/// [`RenderBackend::release`] every fallible call returns
/// [`OrbError::Released`].
pub trait RenderBackend {
    /// Identity of the drawing surface this context renders into.
    fn surface_id(&self) -> SurfaceId;

    /// Current framebuffer size in physical pixels.
    fn size(&self) -> PhysicalSize<u32>;

    /// Reallocates the framebuffer and updates the `resolution` uniform.
    /// Resizing to the current size does nothing.
    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), OrbError>;

    /// Writes one uniform into the CPU mirror. Takes effect on the next draw.
    fn set_uniform(&mut self, name: UniformName, value: UniformValue) -> Result<(), OrbError>;

    fn uniforms(&self) -> &OrbUniforms;

    /// Uploads the uniform mirror and issues exactly one draw.
    fn draw(&mut self) -> Result<(), OrbError>;

    /// Gives the context back to the host. Safe to call more than once.
    fn release(&mut self);

    fn is_released(&self) -> bool;
}
