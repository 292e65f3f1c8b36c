use std::f32::consts::TAU;
use std::path::Path;

use glam::Vec3;
use promenad_animation::GaitConfig;
use promenad_core::{PromenadError, Result};
use serde::{Deserialize, Serialize};

/// Simulation tuning. Every field has a default, so a JSON file only needs
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed simulation step, in seconds.
    pub step_time: f32,
    /// Longest frame fed to the accumulator; longer frames are clamped.
    pub max_frame_time: f32,
    /// Population snapshots kept for rewinding.
    pub history_frames: usize,
    pub gravity: Vec3,
    pub actor_hover_height: f32,
    /// Forward speed of a walking actor.
    pub actor_walking_speed: f32,
    /// Radians per second.
    pub actor_turn_speed: f32,
    pub gait: GaitConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            step_time: 1.0 / 60.0,
            max_frame_time: 1.0 / 30.0,
            history_frames: 1024,
            gravity: Vec3::new(0.0, -9.82, 0.0),
            actor_hover_height: 1.2,
            actor_walking_speed: 0.5,
            actor_turn_speed: TAU / 4.0,
            gait: GaitConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)
            .map_err(|e| PromenadError::InvalidConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loaded config from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PromenadError::InvalidConfiguration(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PromenadError::InvalidConfiguration(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        };
        positive("step_time", self.step_time)?;
        positive("max_frame_time", self.max_frame_time)?;

        if self.history_frames < 2 {
            return Err(PromenadError::InvalidConfiguration(format!(
                "history_frames must be at least 2, got {}",
                self.history_frames
            )));
        }
        if !self.gravity.is_finite() {
            return Err(PromenadError::InvalidConfiguration(
                "gravity must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        config.validate().unwrap();
        assert_eq!(config.history_frames, 1024);
        assert_eq!(config.gait.contact_x, 1.5);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config =
            SimConfig::from_json_str(r#"{ "step_time": 0.01, "gait": { "step_height": 0.3 } }"#)
                .unwrap();
        assert_eq!(config.step_time, 0.01);
        assert_eq!(config.gait.step_height, 0.3);
        assert_eq!(config.gait.lift_x, 0.75);
        assert_eq!(config.max_frame_time, 1.0 / 30.0);
    }

    #[test]
    fn json_round_trips() {
        let config = SimConfig {
            actor_walking_speed: 1.25,
            ..SimConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(SimConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn bad_values_are_rejected() {
        for json in [
            r#"{ "step_time": 0.0 }"#,
            r#"{ "max_frame_time": -1.0 }"#,
            r#"{ "history_frames": 1 }"#,
            r#"{ "step_time": "fast" }"#,
            "not json",
        ] {
            assert!(
                matches!(
                    SimConfig::from_json_str(json),
                    Err(PromenadError::InvalidConfiguration(_))
                ),
                "accepted {json}"
            );
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            SimConfig::load("/nonexistent/promenad.json"),
            Err(PromenadError::IoError(_))
        ));
    }
}
