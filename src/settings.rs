use crate::control::{ControlTuning, SpinMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Startup-only overrides loaded from a TOML file.
///
/// ```toml
/// [control]
/// smoothing_rate = 4.0
/// morph = { low = 0.06, high = 0.28 }
///
/// [control.spin]
/// mode = "pulse"
/// close_below = 0.08
///
/// [render]
/// point_size = 1
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub control: ControlTuning,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSettings {
    pub point_size: Option<u32>,
    pub overlay: Option<bool>,
    pub fps: Option<u32>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let c = &self.control;
        for (field, map) in [("control.morph", c.morph), ("control.rotation", c.rotation)] {
            if !(map.low >= 0.0 && map.high > map.low) {
                return Err(SettingsError::Invalid {
                    field,
                    message: format!("need 0 <= low < high (got low={}, high={})", map.low, map.high),
                });
            }
        }
        if !(c.smoothing_rate > 0.0) {
            return Err(SettingsError::Invalid {
                field: "control.smoothing_rate",
                message: format!("must be positive (got {})", c.smoothing_rate),
            });
        }
        if !(c.max_spin_deg_per_s >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "control.max_spin_deg_per_s",
                message: format!("must not be negative (got {})", c.max_spin_deg_per_s),
            });
        }
        if let SpinMode::Pulse(p) = c.spin {
            let rates = [
                ("control.spin.gain_deg_per_s", p.gain_deg_per_s),
                ("control.spin.decay_rate", p.decay_rate),
                ("control.spin.release_rate", p.release_rate),
                ("control.spin.morph_friction_rate", p.morph_friction_rate),
            ];
            for (field, value) in rates {
                if !(value >= 0.0) {
                    return Err(SettingsError::Invalid {
                        field,
                        message: format!("must not be negative (got {value})"),
                    });
                }
            }
        }
        if self.render.point_size == Some(0) {
            return Err(SettingsError::Invalid {
                field: "render.point_size",
                message: "must be at least 1".to_string(),
            });
        }
        if self.render.fps == Some(0) {
            return Err(SettingsError::Invalid {
                field: "render.fps",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
