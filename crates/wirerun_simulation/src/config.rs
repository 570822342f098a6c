//! Gameplay tuning (grapple, reel, rope, locomotion, camera)
//!
//! Один `GameplayConfig` resource на весь App. Грузится из JSON,
//! любое отсутствующее поле берётся из Default (`#[serde(default)]`).

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grapple::{ReelMode, TargetMask};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Параметры выстрела и пружины
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrappleConfig {
    /// Дальность raycast (m)
    pub max_range: f32,
    /// Жёсткость пружины (N/m)
    pub spring: f32,
    /// Демпфер (N·s/m)
    pub damper: f32,
    pub target_mask: TargetMask,
    /// Пол для max_length при reel (m)
    pub min_distance: f32,
    /// Точка крепления левой руки в local space тела
    pub left_origin: [f32; 3],
    pub right_origin: [f32; 3],
    /// Верхняя граница max_length (None = без ограничения)
    pub max_length_cap: Option<f32>,
}

impl Default for GrappleConfig {
    fn default() -> Self {
        Self {
            max_range: 50.0,
            spring: 500.0,
            damper: 50.0,
            target_mask: TargetMask::ALL,
            min_distance: 2.0,
            left_origin: [-0.3, 1.2, 0.2],
            right_origin: [0.3, 1.2, 0.2],
            max_length_cap: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Manual reel скорость (m/s)
    pub manual_rate: f32,
    /// Базовая скорость auto reel (m/s), к ней добавляется скорость к якорю
    pub auto_base_force: f32,
    /// Политика когда reel кнопка не зажата
    pub default_mode: ReelMode,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            manual_rate: 5.0,
            auto_base_force: 3.0,
            default_mode: ReelMode::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RopeConfig {
    pub line_segments: usize,
    pub sag_amount: f32,
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            line_segments: 20,
            sag_amount: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Скорость бега по земле (m/s)
    pub speed: f32,
    /// Сила air control
    pub air_speed: f32,
    /// Импульс прыжка
    pub jump_speed: f32,
    /// Множитель силы gas (на сумму векторов к якорям)
    pub gas_force: f32,
    /// Половина высоты тела: от центра до ступней
    pub body_half_height: f32,
    /// Зазор под ступнями, который ещё считается "на земле"
    pub ground_skin: f32,
    pub probe_radius: f32,
    pub turn_rate_moving: f32,
    pub turn_rate_idle: f32,
    /// Скорость когда не жмём вперёд (доля от speed)
    pub idle_speed_factor: f32,
    /// Lerp текущей velocity к input direction за тик
    pub velocity_blend: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            speed: 13.0,
            air_speed: 9.0,
            jump_speed: 10.0,
            gas_force: 10.0,
            body_half_height: 0.9,
            ground_skin: 0.1,
            probe_radius: 0.3,
            turn_rate_moving: 10.0,
            turn_rate_idle: 5.0,
            idle_speed_factor: 0.85,
            velocity_blend: 0.2,
        }
    }
}

impl LocomotionConfig {
    /// Sphere sweep от центра: сфера опускается до ступней + skin
    pub fn ground_probe_distance(&self) -> f32 {
        (self.body_half_height - self.probe_radius + self.ground_skin).max(0.0)
    }
}

/// Chase camera (углы в градусах)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub height: f32,
    pub base_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub sensitivity: f32,
    pub min_vertical_angle: f32,
    pub max_vertical_angle: f32,
    pub collision_radius: f32,
    pub max_speed_distance: f32,
    pub speed_for_max_distance: f32,
    pub distance_smooth_time: f32,
    pub base_fov: f32,
    pub max_speed_fov: f32,
    pub fov_smooth_time: f32,
    pub vertical_velocity_pitch_factor: f32,
    pub max_pitch_offset: f32,
    pub pitch_offset_smooth_time: f32,
    pub position_smooth_time: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            height: 1.5,
            base_distance: 4.0,
            min_distance: 1.0,
            max_distance: 10.0,
            sensitivity: 2.0,
            min_vertical_angle: -40.0,
            max_vertical_angle: 70.0,
            collision_radius: 0.3,
            max_speed_distance: 8.0,
            speed_for_max_distance: 30.0,
            distance_smooth_time: 0.3,
            base_fov: 60.0,
            max_speed_fov: 80.0,
            fov_smooth_time: 0.2,
            vertical_velocity_pitch_factor: 0.5,
            max_pitch_offset: 10.0,
            pitch_offset_smooth_time: 0.2,
            position_smooth_time: 0.05,
        }
    }
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    pub grapple: GrappleConfig,
    pub reel: ReelConfig,
    pub rope: RopeConfig,
    pub locomotion: LocomotionConfig,
    pub camera: CameraConfig,
}

impl GameplayConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Ошибка загрузки → defaults + warning (игра должна запуститься)
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                crate::logger::log_info(&format!("Config loaded from {}", path.display()));
                config
            }
            Err(err) => {
                crate::logger::log_warning(&format!("Config {}: {}, using defaults", path.display(), err));
                Self::default()
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grapple;
        non_negative("grapple.max_range", g.max_range)?;
        non_negative("grapple.spring", g.spring)?;
        non_negative("grapple.damper", g.damper)?;
        non_negative("grapple.min_distance", g.min_distance)?;
        if let Some(cap) = g.max_length_cap {
            if cap < g.min_distance {
                return Err(invalid(
                    "grapple.max_length_cap",
                    format!("{} is below min_distance {}", cap, g.min_distance),
                ));
            }
        }

        non_negative("reel.manual_rate", self.reel.manual_rate)?;

        if self.rope.line_segments < 2 {
            return Err(invalid(
                "rope.line_segments",
                format!("need at least 2 points, got {}", self.rope.line_segments),
            ));
        }

        let l = &self.locomotion;
        positive("locomotion.speed", l.speed)?;
        positive("locomotion.body_half_height", l.body_half_height)?;
        non_negative("locomotion.ground_skin", l.ground_skin)?;
        non_negative("locomotion.probe_radius", l.probe_radius)?;
        if l.probe_radius > l.body_half_height {
            return Err(invalid(
                "locomotion.probe_radius",
                format!("{} exceeds body_half_height {}", l.probe_radius, l.body_half_height),
            ));
        }

        let c = &self.camera;
        positive("camera.speed_for_max_distance", c.speed_for_max_distance)?;
        positive("camera.distance_smooth_time", c.distance_smooth_time)?;
        positive("camera.fov_smooth_time", c.fov_smooth_time)?;
        positive("camera.pitch_offset_smooth_time", c.pitch_offset_smooth_time)?;
        positive("camera.position_smooth_time", c.position_smooth_time)?;
        if c.min_vertical_angle > c.max_vertical_angle {
            return Err(invalid(
                "camera.min_vertical_angle",
                "greater than max_vertical_angle".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be >= 0, got {}", value)))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be > 0, got {}", value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameplayConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "grapple": { "max_range": 80.0 }, "rope": { "sag_amount": 1.25 } }"#;
        let config = GameplayConfig::from_json_str(json).unwrap();

        assert_eq!(config.grapple.max_range, 80.0);
        assert_eq!(config.grapple.min_distance, 2.0);
        assert_eq!(config.rope.sag_amount, 1.25);
        assert_eq!(config.rope.line_segments, 20);
        assert_eq!(config.reel.default_mode, ReelMode::Auto);
    }

    #[test]
    fn test_reel_mode_from_json() {
        let json = r#"{ "reel": { "default_mode": "Manual" } }"#;
        let config = GameplayConfig::from_json_str(json).unwrap();
        assert_eq!(config.reel.default_mode, ReelMode::Manual);
    }

    #[test]
    fn test_rejects_single_segment_rope() {
        let json = r#"{ "rope": { "line_segments": 1 } }"#;
        let err = GameplayConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "rope.line_segments", .. }));
    }

    #[test]
    fn test_rejects_cap_below_floor() {
        let mut config = GameplayConfig::default();
        config.grapple.max_length_cap = Some(1.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "grapple.max_length_cap", .. }));
    }

    #[test]
    fn test_ground_probe_reaches_just_below_feet() {
        let locomotion = LocomotionConfig::default();
        // 0.9 - 0.3 + 0.1: низ сферы доходит до 0.1m под ступнями
        assert!((locomotion.ground_probe_distance() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_probe_wider_than_body() {
        let mut config = GameplayConfig::default();
        config.locomotion.probe_radius = 1.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "locomotion.probe_radius", .. })
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = GameplayConfig::load_or_default("/nonexistent/wirerun/gameplay.json");
        assert_eq!(config, GameplayConfig::default());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let config = GameplayConfig::from_json_str(include_str!("../../../assets/gameplay.json")).unwrap();
        assert_eq!(config, GameplayConfig::default());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = GameplayConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip_of_tuned_config() {
        let mut config = GameplayConfig::default();
        config.grapple.max_length_cap = Some(60.0);
        config.locomotion.gas_force = 14.0;

        let json = config.to_json_pretty().unwrap();
        let parsed = GameplayConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
