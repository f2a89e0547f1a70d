use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrbConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub orb: OrbSection,
    #[serde(default)]
    pub timing: TimingSection,
    #[serde(default)]
    pub environment: EnvironmentSection,
    #[serde(default)]
    pub window: WindowSection,
}

/// Visual parameters pushed through the parameter bridge.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrbSection {
    pub hue: f32,
    pub hover_intensity: f32,
    pub rotate_on_hover: bool,
    pub force_hover_state: bool,
    pub background_color: String,
}

impl Default for OrbSection {
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

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimingSection {
    #[serde(
        default = "default_resize_debounce",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub resize_debounce: Duration,
    #[serde(
        default = "default_max_frame_delta",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub max_frame_delta: Duration,
    #[serde(default = "default_hover_smoothing")]
    pub hover_smoothing: f32,
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            resize_debounce: default_resize_debounce(),
            max_frame_delta: default_max_frame_delta(),
            hover_smoothing: default_hover_smoothing(),
            rotation_speed: default_rotation_speed(),
        }
    }
}

/// Optional overrides for what the host environment reports.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EnvironmentSection {
    pub touch: Option<bool>,
    pub device_pixel_ratio: Option<f64>,
    pub reduced_motion: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub transparent: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            title: "Orb".into(),
            transparent: true,
        }
    }
}

fn default_version() -> u32 {
    1
}

fn default_resize_debounce() -> Duration {
    Duration::from_millis(150)
}

fn default_max_frame_delta() -> Duration {
    Duration::from_millis(50)
}

fn default_hover_smoothing() -> f32 {
    0.1
}

fn default_rotation_speed() -> f32 {
    0.3
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            orb: OrbSection::default(),
            timing: TimingSection::default(),
            environment: EnvironmentSection::default(),
            window: WindowSection::default(),
        }
    }
}

impl OrbConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: OrbConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if !self.orb.hue.is_finite() {
            return Err(ConfigError::Invalid("orb.hue must be finite".into()));
        }

        if !self.orb.hover_intensity.is_finite() || self.orb.hover_intensity < 0.0 {
            return Err(ConfigError::Invalid(
                "orb.hover_intensity must be >= 0".into(),
            ));
        }

        if self.orb.background_color.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "orb.background_color may not be empty".into(),
            ));
        }

        let smoothing = self.timing.hover_smoothing;
        if smoothing.is_nan() || smoothing <= 0.0 || smoothing > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "timing.hover_smoothing must be in (0, 1]; got {smoothing}"
            )));
        }

        if self.timing.max_frame_delta.is_zero() {
            return Err(ConfigError::Invalid(
                "timing.max_frame_delta must be greater than zero".into(),
            ));
        }

        if !self.timing.rotation_speed.is_finite() {
            return Err(ConfigError::Invalid(
                "timing.rotation_speed must be finite".into(),
            ));
        }

        if let Some(ratio) = self.environment.device_pixel_ratio {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "environment.device_pixel_ratio must be > 0; got {ratio}"
                )));
            }
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero; got {}x{}",
                self.window.width, self.window.height
            )));
        }

        Ok(())
    }
}
