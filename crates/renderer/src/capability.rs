//! One-shot probe of the host environment.
//!
//! The probe runs once per session, before any GPU resource exists, and its
//! result never changes for the life of that session.

use winit::dpi::{LogicalSize, PhysicalSize};

/// Primary pointing device reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Mouse, trackpad, stylus: precise hover is available.
    Fine,
    /// Touch screen: no hover, coarse input.
    Coarse,
}

/// What the host can tell us about itself. Every query is optional; `None`
/// means the host does not support it and the probe falls back to a default.
pub trait HostEnvironment {
    fn primary_pointer(&self) -> Option<PointerKind>;
    fn device_pixel_ratio(&self) -> Option<f64>;
    fn prefers_reduced_motion(&self) -> Option<bool>;
}

/// Environment with fixed answers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticEnvironment {
    pub pointer: Option<PointerKind>,
    pub device_pixel_ratio: Option<f64>,
    pub reduced_motion: Option<bool>,
}

impl HostEnvironment for StaticEnvironment {
    fn primary_pointer(&self) -> Option<PointerKind> {
        self.pointer
    }

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.device_pixel_ratio
    }

    fn prefers_reduced_motion(&self) -> Option<bool> {
        self.reduced_motion
    }
}

/// How the `time` uniform behaves for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRate {
    /// Time advances with the wall clock.
    Animated,
    /// Time is frozen; the orb still reacts to hover.
    Frozen,
}

/// Immutable snapshot produced by [`CapabilityConfig::probe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapabilityConfig {
    pub is_touch_primary: bool,
    /// Hard ceiling applied to the reported device pixel ratio.
    pub device_pixel_ratio_cap: f64,
    /// Reported ratio after the ceiling is applied.
    pub device_pixel_ratio: f64,
    /// Framebuffer scale relative to the displayed size.
    pub render_scale: f64,
    pub reduced_motion: bool,
    /// Whether pointer movement should feed the hover target at all.
    pub pointer_listeners: bool,
    pub frame_rate: FrameRate,
}

const TOUCH_PIXEL_RATIO_CAP: f64 = 1.0;
const POINTER_PIXEL_RATIO_CAP: f64 = 1.5;
const TOUCH_RENDER_SCALE: f64 = 0.5;
const POINTER_RENDER_SCALE: f64 = 1.0;

impl CapabilityConfig {
    pub fn probe(env: &dyn HostEnvironment) -> Self {
        let is_touch_primary = matches!(env.primary_pointer(), Some(PointerKind::Coarse));
        let reduced_motion = env.prefers_reduced_motion().unwrap_or(false);
        let reported_ratio = env
            .device_pixel_ratio()
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
            .unwrap_or(1.0);

        let (device_pixel_ratio_cap, render_scale) = if is_touch_primary {
            (TOUCH_PIXEL_RATIO_CAP, TOUCH_RENDER_SCALE)
        } else {
            (POINTER_PIXEL_RATIO_CAP, POINTER_RENDER_SCALE)
        };

        let config = Self {
            is_touch_primary,
            device_pixel_ratio_cap,
            device_pixel_ratio: reported_ratio.min(device_pixel_ratio_cap),
            render_scale,
            reduced_motion,
            pointer_listeners: !is_touch_primary,
            frame_rate: if reduced_motion {
                FrameRate::Frozen
            } else {
                FrameRate::Animated
            },
        };
        tracing::debug!(
            touch = config.is_touch_primary,
            reported_ratio,
            device_pixel_ratio = config.device_pixel_ratio,
            render_scale = config.render_scale,
            reduced_motion = config.reduced_motion,
            "probed host capabilities"
        );
        config
    }

    /// Physical framebuffer size for a container of the given CSS size.
    pub fn framebuffer_size(&self, container: LogicalSize<f64>) -> PhysicalSize<u32> {
        let scale = self.render_scale * self.device_pixel_ratio;
        let dimension = |logical: f64| -> u32 {
            let scaled = (logical.max(0.0) * scale).round();
            if scaled >= u32::MAX as f64 {
                u32::MAX
            } else {
                (scaled as u32).max(1)
            }
        };
        PhysicalSize::new(dimension(container.width), dimension(container.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pointer: Option<PointerKind>, ratio: Option<f64>, reduced: Option<bool>) -> StaticEnvironment {
        StaticEnvironment {
            pointer,
            device_pixel_ratio: ratio,
            reduced_motion: reduced,
        }
    }

    #[test]
    fn unsupported_queries_fall_back_to_desktop_defaults() {
        let config = CapabilityConfig::probe(&StaticEnvironment::default());
        assert!(!config.is_touch_primary);
        assert!(!config.reduced_motion);
        assert!(config.pointer_listeners);
        assert_eq!(config.device_pixel_ratio, 1.0);
        assert_eq!(config.device_pixel_ratio_cap, 1.5);
        assert_eq!(config.render_scale, 1.0);
        assert_eq!(config.frame_rate, FrameRate::Animated);
    }

    #[test]
    fn touch_devices_render_small() {
        let config = CapabilityConfig::probe(&env(Some(PointerKind::Coarse), Some(3.0), None));
        assert!(config.is_touch_primary);
        assert!(!config.pointer_listeners);
        assert_eq!(config.device_pixel_ratio_cap, 1.0);
        assert_eq!(config.device_pixel_ratio, 1.0);
        assert_eq!(config.render_scale, 0.5);
        assert_eq!(
            config.framebuffer_size(LogicalSize::new(400.0, 300.0)),
            PhysicalSize::new(200, 150)
        );
    }

    #[test]
    fn pointer_devices_cap_pixel_ratio() {
        let retina = CapabilityConfig::probe(&env(Some(PointerKind::Fine), Some(2.0), None));
        assert_eq!(retina.device_pixel_ratio, 1.5);
        assert_eq!(
            retina.framebuffer_size(LogicalSize::new(400.0, 300.0)),
            PhysicalSize::new(600, 450)
        );

        let low = CapabilityConfig::probe(&env(Some(PointerKind::Fine), Some(1.25), None));
        assert_eq!(low.device_pixel_ratio, 1.25);
    }

    #[test]
    fn bogus_pixel_ratio_is_ignored() {
        let config = CapabilityConfig::probe(&env(None, Some(f64::NAN), None));
        assert_eq!(config.device_pixel_ratio, 1.0);
        let config = CapabilityConfig::probe(&env(None, Some(-2.0), None));
        assert_eq!(config.device_pixel_ratio, 1.0);
    }

    #[test]
    fn reduced_motion_freezes_time() {
        let config = CapabilityConfig::probe(&env(None, None, Some(true)));
        assert!(config.reduced_motion);
        assert_eq!(config.frame_rate, FrameRate::Frozen);
    }

    #[test]
    fn framebuffer_never_collapses_to_zero() {
        let config = CapabilityConfig::probe(&StaticEnvironment::default());
        assert_eq!(
            config.framebuffer_size(LogicalSize::new(0.0, 0.0)),
            PhysicalSize::new(1, 1)
        );
    }
}
