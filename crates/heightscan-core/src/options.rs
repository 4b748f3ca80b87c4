//! Configuration options for heightscan.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::occlusion::DEFAULT_DEPTH_EPSILON;

/// Ambient occlusion bake configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeOptions {
    /// Depth target width in pixels.
    pub width: u32,
    /// Depth target height in pixels.
    pub height: u32,
    /// Tolerance when comparing reprojected depth to a baked buffer.
    pub depth_epsilon: f32,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            depth_epsilon: DEFAULT_DEPTH_EPSILON,
        }
    }
}

/// Blinn-Phong surface shading parameters handed to the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingOptions {
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
    /// Vertical exaggeration applied in the model matrix.
    pub z_scale: f32,
    /// Directional light position relative to the origin.
    pub light_dir: Vec3,
}

impl Default for ShadingOptions {
    fn default() -> Self {
        Self {
            ambient_strength: 0.15,
            diffuse_strength: 0.7,
            specular_strength: 0.3,
            shininess: 64.0,
            z_scale: 1.0,
            light_dir: Vec3::ONE,
        }
    }
}

impl ShadingOptions {
    /// Light direction as a unit vector, or zero if unset.
    pub fn normalized_light_dir(&self) -> Vec3 {
        self.light_dir.normalize_or_zero()
    }
}

/// Top-level options, loadable from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightscanOptions {
    pub bake: BakeOptions,
    pub shading: ShadingOptions,
}

impl HeightscanOptions {
    /// Parses options from a JSON string; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = HeightscanOptions::default();
        assert_eq!(opts.bake.width, 512);
        assert_eq!(opts.bake.height, 512);
        assert_eq!(opts.bake.depth_epsilon, 0.001);
        assert_eq!(opts.shading.shininess, 64.0);
        assert_eq!(opts.shading.z_scale, 1.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let opts = HeightscanOptions::from_json_str(r#"{ "bake": { "width": 1024 } }"#).unwrap();
        assert_eq!(opts.bake.width, 1024);
        assert_eq!(opts.bake.height, 512);
        assert_eq!(opts.shading, ShadingOptions::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut opts = HeightscanOptions::default();
        opts.shading.light_dir = Vec3::new(0.0, 0.0, 2.0);
        let json = opts.to_json_string().unwrap();
        assert_eq!(HeightscanOptions::from_json_str(&json).unwrap(), opts);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(HeightscanOptions::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_normalized_light_dir() {
        let opts = ShadingOptions::default();
        assert!((opts.normalized_light_dir().length() - 1.0).abs() < 1e-6);

        let dark = ShadingOptions {
            light_dir: Vec3::ZERO,
            ..Default::default()
        };
        assert_eq!(dark.normalized_light_dir(), Vec3::ZERO);
    }
}
