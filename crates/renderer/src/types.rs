use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Identity of a drawing surface managed by a session.
///
/// A container holds surfaces by id so it can tell its own children apart
/// from the one the session appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Allocates a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "orb-surface-{}", self.0)
    }
}

/// Visual parameters the embedder may change at any time.
///
/// Defaults match the construction contract: hue `0`, hover intensity `0.2`,
/// rotate on hover, no forced hover, black background.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbParameters {
    /// Hue rotation in degrees applied to the base palette.
    pub hue: f32,
    /// Strength of the hover distortion.
    pub hover_intensity: f32,
    /// Rotate the orb while it is hovered.
    pub rotate_on_hover: bool,
    /// Treat the orb as hovered regardless of pointer position.
    pub force_hover_state: bool,
    /// CSS-style color string for the backdrop the orb blends against.
    pub background_color: String,
}

impl OrbParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hue(mut self, hue: f32) -> Self {
        self.hue = hue;
        self
    }

    pub fn with_hover_intensity(mut self, hover_intensity: f32) -> Self {
        self.hover_intensity = hover_intensity;
        self
    }

    pub fn with_rotate_on_hover(mut self, rotate_on_hover: bool) -> Self {
        self.rotate_on_hover = rotate_on_hover;
        self
    }

    pub fn with_force_hover_state(mut self, force_hover_state: bool) -> Self {
        self.force_hover_state = force_hover_state;
        self
    }

    pub fn with_background_color(mut self, background_color: impl Into<String>) -> Self {
        self.background_color = background_color.into();
        self
    }
}

impl Default for OrbParameters {
    fn default() -> Self {
        Self {
            hue: 0.0,
            hover_intensity: 0.2,
            rotate_on_hover: true,
            force_hover_state: false,
            background_color: "#000000".into(),
        }
    }
}

/// Tuning knobs for the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Quiet period before a burst of resize signals reallocates the surface.
    pub resize_debounce: Duration,
    /// Upper bound on the per-tick time advance.
    pub max_frame_delta: Duration,
    /// Fraction of the remaining hover gap closed each tick.
    pub hover_smoothing: f32,
    /// Rotation speed in radians per second while hovered.
    pub rotation_speed: f32,
    /// Radius (in normalized orb units) inside which the pointer counts as hovering.
    pub hover_radius: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            resize_debounce: Duration::from_millis(150),
            max_frame_delta: Duration::from_millis(50),
            hover_smoothing: 0.1,
            rotation_speed: 0.3,
            hover_radius: 0.8,
        }
    }
}
