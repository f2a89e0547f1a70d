use orb_config::OrbConfig;
use orb_renderer::{OrbParameters, PointerKind, SessionSettings, StaticEnvironment};

use crate::cli::RunArgs;

/// Folds command-line flags over the loaded configuration.
pub fn apply_overrides(config: &mut OrbConfig, args: &RunArgs) {
    if let Some(hue) = args.hue {
        config.orb.hue = hue;
    }
    if let Some(intensity) = args.hover_intensity {
        config.orb.hover_intensity = intensity;
    }
    if let Some(background) = &args.background {
        config.orb.background_color = background.clone();
    }
    if args.force_hover {
        config.orb.force_hover_state = true;
    }
    if args.no_rotate_on_hover {
        config.orb.rotate_on_hover = false;
    }
    if args.touch {
        config.environment.touch = Some(true);
    }
    if args.reduced_motion {
        config.environment.reduced_motion = Some(true);
    }
    if let Some(ratio) = args.device_pixel_ratio {
        config.environment.device_pixel_ratio = Some(ratio);
    }
    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }
}

pub fn parameters(config: &OrbConfig) -> OrbParameters {
    OrbParameters::new()
        .with_hue(config.orb.hue)
        .with_hover_intensity(config.orb.hover_intensity)
        .with_rotate_on_hover(config.orb.rotate_on_hover)
        .with_force_hover_state(config.orb.force_hover_state)
        .with_background_color(config.orb.background_color.clone())
}

pub fn session_settings(config: &OrbConfig) -> SessionSettings {
    SessionSettings {
        resize_debounce: config.timing.resize_debounce,
        max_frame_delta: config.timing.max_frame_delta,
        hover_smoothing: config.timing.hover_smoothing,
        rotation_speed: config.timing.rotation_speed,
        ..SessionSettings::default()
    }
}

/// Host environment from config overrides; `display_ratio` fills in the
/// pixel ratio when the config leaves it unset.
pub fn environment(config: &OrbConfig, display_ratio: Option<f64>) -> StaticEnvironment {
    StaticEnvironment {
        pointer: config.environment.touch.map(|touch| {
            if touch {
                PointerKind::Coarse
            } else {
                PointerKind::Fine
            }
        }),
        device_pixel_ratio: config.environment.device_pixel_ratio.or(display_ratio),
        reduced_motion: config.environment.reduced_motion,
    }
}
