//! Loading [`LightingSettings`] from a JSON file.
//!
//! Every field is optional; missing ones fall back to the defaults.
//!
//! ```json
//! {
//!     "intensity": 0.3,
//!     "color": [1.0, 0.9, 0.8, 1.0],
//!     "max_lights": 20,
//!     "point_light_radius": 12.0,
//!     "point_light_vertical_offset": 4.0,
//!     "shadows_enabled": true
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::planner::LightingSettings;

/// Environment variable pointing the demo at a settings file.
pub const CONFIG_ENV_VAR: &str = "AUTO_LIGHTING_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk form of [`LightingSettings`].
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub intensity: Option<f32>,
    /// Linear RGBA.
    pub color: Option<[f32; 4]>,
    pub max_lights: Option<i64>,
    pub point_light_radius: Option<f32>,
    pub point_light_vertical_offset: Option<f32>,
    pub shadows_enabled: Option<bool>,
}

impl SettingsFile {
    pub fn into_settings(self) -> LightingSettings {
        let defaults = LightingSettings::default();

        let max_lights = match self.max_lights {
            Some(n) if n < 0 => {
                warn!("max_lights was {n}; using 0");
                0
            }
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
            None => defaults.max_lights,
        };

        LightingSettings {
            intensity: self.intensity.unwrap_or(defaults.intensity),
            color: self
                .color
                .map(|[r, g, b, a]| Color::rgba_linear(r, g, b, a))
                .unwrap_or(defaults.color),
            max_lights,
            point_light_radius: self
                .point_light_radius
                .unwrap_or(defaults.point_light_radius),
            point_light_vertical_offset: self
                .point_light_vertical_offset
                .unwrap_or(defaults.point_light_vertical_offset),
            shadows_enabled: self.shadows_enabled.unwrap_or(defaults.shadows_enabled),
        }
    }
}

pub fn parse_settings(json: &str) -> Result<LightingSettings, ConfigError> {
    let file: SettingsFile = serde_json::from_str(json)?;
    Ok(file.into_settings())
}

pub fn load_settings(path: impl AsRef<Path>) -> Result<LightingSettings, ConfigError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = parse_settings("{}").unwrap();
        assert_eq!(settings, LightingSettings::default());
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let settings = parse_settings(
            r#"{ "max_lights": 8, "point_light_vertical_offset": -1.5, "shadows_enabled": true }"#,
        )
        .unwrap();

        assert_eq!(settings.max_lights, 8);
        assert_eq!(settings.point_light_vertical_offset, -1.5);
        assert!(settings.shadows_enabled);
        assert_eq!(settings.intensity, 0.16);
        assert_eq!(settings.point_light_radius, 10.0);
    }

    #[test]
    fn test_color_is_linear_rgba() {
        let settings = parse_settings(r#"{ "color": [1.0, 0.5, 0.0, 1.0] }"#).unwrap();
        assert_eq!(settings.color, Color::rgba_linear(1.0, 0.5, 0.0, 1.0));
    }

    #[test]
    fn test_negative_max_lights_clamps_to_zero() {
        let settings = parse_settings(r#"{ "max_lights": -3 }"#).unwrap();
        assert_eq!(settings.max_lights, 0);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = parse_settings(r#"{ "max_light": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_settings("/nonexistent/auto_lighting.json").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/auto_lighting.json"))
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
