//! wgpu implementation of [`RenderBackend`].
//!
//! - `context` owns instance/surface/device wiring and swapchain
//!   reconfiguration.
//! - `pipeline` compiles the GLSL pair into the single render pipeline and
//!   records the one-triangle pass.

mod context;
mod pipeline;

use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::backend::RenderBackend;
use crate::error::OrbError;
use crate::types::SurfaceId;
use crate::uniforms::{OrbUniforms, UniformName, UniformValue};

use context::GpuContext;
use pipeline::OrbPipeline;

struct GpuResources<T> {
    pipeline: OrbPipeline,
    context: GpuContext<T>,
}

/// GPU-backed rendering context drawing into a window surface.
pub struct WgpuBackend<T> {
    surface_id: SurfaceId,
    size: PhysicalSize<u32>,
    uniforms: OrbUniforms,
    resources: Option<GpuResources<T>>,
}

impl<T> WgpuBackend<T>
where
    T: HasDisplayHandle + HasWindowHandle,
{
    /// Creates the device, surface and pipeline for `target`.
    ///
    /// Fails with [`OrbError::ContextAllocation`]; nothing is retried.
    pub fn allocate(target: Arc<T>, size: PhysicalSize<u32>) -> Result<Self, OrbError> {
        let context = GpuContext::new(target, size).map_err(OrbError::allocation)?;
        let pipeline = OrbPipeline::new(&context.device, context.config.format);
        let size = PhysicalSize::new(context.config.width, context.config.height);
        let surface_id = SurfaceId::next();
        tracing::debug!(
            surface = %surface_id,
            width = size.width,
            height = size.height,
            "allocated GPU context"
        );
        Ok(Self {
            surface_id,
            size,
            uniforms: OrbUniforms::new(size),
            resources: Some(GpuResources { pipeline, context }),
        })
    }
}

impl<T> WgpuBackend<T> {
    fn resources(&self) -> Result<&GpuResources<T>, OrbError> {
        self.resources.as_ref().ok_or(OrbError::Released)
    }

    fn handle_surface_error(&self, error: wgpu::SurfaceError) -> Result<(), OrbError> {
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                tracing::debug!(surface = %self.surface_id, ?error, "surface lost; reconfiguring");
                self.resources()?.context.reconfigure();
                Ok(())
            }
            wgpu::SurfaceError::Timeout => {
                tracing::debug!(surface = %self.surface_id, "surface timeout; skipping frame");
                Ok(())
            }
            other => Err(OrbError::Surface(other)),
        }
    }
}

impl<T> RenderBackend for WgpuBackend<T> {
    fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<(), OrbError> {
        let resources = self.resources.as_mut().ok_or(OrbError::Released)?;
        if size == self.size {
            return Ok(());
        }
        if resources.context.resize(size) {
            self.size = PhysicalSize::new(
                resources.context.config.width,
                resources.context.config.height,
            );
            self.uniforms.set_resolution(self.size);
        }
        Ok(())
    }

    fn set_uniform(&mut self, name: UniformName, value: UniformValue) -> Result<(), OrbError> {
        if self.resources.is_none() {
            return Err(OrbError::Released);
        }
        self.uniforms.set(name, value)
    }

    fn uniforms(&self) -> &OrbUniforms {
        &self.uniforms
    }

    fn draw(&mut self) -> Result<(), OrbError> {
        let resources = self.resources()?;
        let frame = match resources.context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(error) => return self.handle_surface_error(error),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let context = &resources.context;
        context.queue.write_buffer(
            &resources.pipeline.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("orb encoder"),
            });
        resources.pipeline.encode(&mut encoder, &view);
        context.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(resources) = self.resources.take() {
            resources.context.device.destroy();
            drop(resources);
            tracing::debug!(surface = %self.surface_id, "released GPU context");
        }
    }

    fn is_released(&self) -> bool {
        self.resources.is_none()
    }
}

impl<T> Drop for WgpuBackend<T> {
    fn drop(&mut self) {
        self.release();
    }
}
