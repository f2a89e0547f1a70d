use std::fmt;

use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

use crate::error::OrbError;

/// CPU mirror of the `OrbParams` uniform block declared in the shader header.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbUniforms {
    /// Framebuffer width, height and aspect ratio; `w` is unused.
    pub resolution: [f32; 4],
    /// Background RGB; `w` is unused.
    pub background_color: [f32; 4],
    pub time: f32,
    pub hue: f32,
    /// Smoothed hover amount.
    pub hover: f32,
    pub rotation: f32,
    pub hover_intensity: f32,
    _padding: [f32; 3],
}

unsafe impl Zeroable for OrbUniforms {}
unsafe impl Pod for OrbUniforms {}

impl OrbUniforms {
    pub fn new(size: PhysicalSize<u32>) -> Self {
        let mut uniforms = Self {
            resolution: [0.0; 4],
            background_color: [0.0, 0.0, 0.0, 1.0],
            time: 0.0,
            hue: 0.0,
            hover: 0.0,
            rotation: 0.0,
            hover_intensity: 0.0,
            _padding: [0.0; 3],
        };
        uniforms.set_resolution(size);
        uniforms
    }

    pub fn set_resolution(&mut self, size: PhysicalSize<u32>) {
        let width = size.width.max(1) as f32;
        let height = size.height.max(1) as f32;
        self.resolution = [width, height, width / height, 0.0];
    }

    /// Writes one named uniform. Only the value type is checked.
    pub fn set(&mut self, name: UniformName, value: UniformValue) -> Result<(), OrbError> {
        match (name, value) {
            (UniformName::Time, UniformValue::Scalar(v)) => self.time = v,
            (UniformName::Hue, UniformValue::Scalar(v)) => self.hue = v,
            (UniformName::Hover, UniformValue::Scalar(v)) => self.hover = v,
            (UniformName::HoverIntensity, UniformValue::Scalar(v)) => self.hover_intensity = v,
            (UniformName::Rotation, UniformValue::Scalar(v)) => self.rotation = v,
            (UniformName::Resolution, UniformValue::Vec3([w, h, aspect])) => {
                self.resolution = [w, h, aspect, 0.0];
            }
            (UniformName::BackgroundColor, UniformValue::Vec3([r, g, b])) => {
                self.background_color = [r, g, b, 1.0];
            }
            (name, _) => {
                return Err(OrbError::UniformType {
                    name,
                    expected: name.expected_type(),
                })
            }
        }
        Ok(())
    }

    pub fn get(&self, name: UniformName) -> UniformValue {
        match name {
            UniformName::Time => UniformValue::Scalar(self.time),
            UniformName::Hue => UniformValue::Scalar(self.hue),
            UniformName::Hover => UniformValue::Scalar(self.hover),
            UniformName::HoverIntensity => UniformValue::Scalar(self.hover_intensity),
            UniformName::Rotation => UniformValue::Scalar(self.rotation),
            UniformName::Resolution => {
                let [w, h, aspect, _] = self.resolution;
                UniformValue::Vec3([w, h, aspect])
            }
            UniformName::BackgroundColor => {
                let [r, g, b, _] = self.background_color;
                UniformValue::Vec3([r, g, b])
            }
        }
    }
}

/// Named slots of the uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformName {
    Time,
    Resolution,
    Hue,
    Hover,
    HoverIntensity,
    Rotation,
    BackgroundColor,
}

impl UniformName {
    fn expected_type(self) -> &'static str {
        match self {
            UniformName::Resolution | UniformName::BackgroundColor => "vec3",
            _ => "scalar",
        }
    }
}

impl fmt::Display for UniformName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniformName::Time => "iTime",
            UniformName::Resolution => "iResolution",
            UniformName::Hue => "hue",
            UniformName::Hover => "hover",
            UniformName::HoverIntensity => "hoverIntensity",
            UniformName::Rotation => "rot",
            UniformName::BackgroundColor => "backgroundColor",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Scalar(f32),
    Vec3([f32; 3]),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    /// The GLSL header declares the block as two vec4s followed by five floats.
    #[test]
    fn orb_uniforms_follow_std140_layout() {
        let uniforms = OrbUniforms::new(PhysicalSize::new(1920, 1080));
        let base = &uniforms as *const _ as usize;

        assert_eq!(align_of::<OrbUniforms>(), 16);
        assert_eq!(size_of::<OrbUniforms>(), 64);
        assert_eq!((&uniforms.resolution as *const _ as usize) - base, 0);
        assert_eq!((&uniforms.background_color as *const _ as usize) - base, 16);
        assert_eq!((&uniforms.time as *const _ as usize) - base, 32);
        assert_eq!((&uniforms.hue as *const _ as usize) - base, 36);
        assert_eq!((&uniforms.hover as *const _ as usize) - base, 40);
        assert_eq!((&uniforms.rotation as *const _ as usize) - base, 44);
        assert_eq!((&uniforms.hover_intensity as *const _ as usize) - base, 48);
    }

    #[test]
    fn resolution_carries_aspect_ratio() {
        let uniforms = OrbUniforms::new(PhysicalSize::new(800, 400));
        assert_eq!(uniforms.resolution, [800.0, 400.0, 2.0, 0.0]);
    }

    #[test]
    fn set_rejects_wrong_type() {
        let mut uniforms = OrbUniforms::new(PhysicalSize::new(1, 1));
        let err = uniforms
            .set(UniformName::Hue, UniformValue::Vec3([1.0, 2.0, 3.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            OrbError::UniformType {
                name: UniformName::Hue,
                expected: "scalar"
            }
        ));
        assert!(uniforms
            .set(UniformName::BackgroundColor, UniformValue::Scalar(1.0))
            .is_err());
    }

    #[test]
    fn set_then_get_by_name() {
        let mut uniforms = OrbUniforms::new(PhysicalSize::new(1, 1));
        uniforms
            .set(UniformName::BackgroundColor, UniformValue::Vec3([0.1, 0.2, 0.3]))
            .unwrap();
        uniforms
            .set(UniformName::Rotation, UniformValue::Scalar(1.5))
            .unwrap();
        assert_eq!(
            uniforms.get(UniformName::BackgroundColor),
            UniformValue::Vec3([0.1, 0.2, 0.3])
        );
        assert_eq!(uniforms.background_color[3], 1.0);
        assert_eq!(uniforms.get(UniformName::Rotation), UniformValue::Scalar(1.5));
    }
}
