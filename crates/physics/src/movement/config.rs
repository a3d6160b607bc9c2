//! Movement configuration.
//!
//! A [`CharacterConfig`] is the whole tuning asset for one character: capsule
//! dimensions, the ground module's per-stance profiles and the air module.
//! It is loaded once (usually from JSON) and validated before anything is
//! built from it. All values use metric units and degrees for angles.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::capsule::{CapsuleConfig, CapsuleShape};
use crate::collision::{Layer, LayerMask};
use crate::error::ConfigError;

/// Speed and acceleration for one gait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitProfile {
    /// Target horizontal speed (meters/second).
    pub speed: f32,
    /// Rate the horizontal velocity approaches the target (meters/second²).
    ///
    /// This is a velocity change per second. Assets that express it as a
    /// per-tick displacement step must be divided by the tick length.
    pub acceleration: f32,
}

impl GaitProfile {
    pub const fn new(speed: f32, acceleration: f32) -> Self {
        Self {
            speed,
            acceleration,
        }
    }
}

/// Tuning for one stance (standing, crouching, proning).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceProfile {
    // ========================================================================
    // Gaits
    // ========================================================================
    /// Deceleration toward rest when idle (meters/second²).
    pub idle_deceleration: f32,

    pub walk: GaitProfile,

    pub run: GaitProfile,

    /// Sprint gait. Stances without one sprint at their run gait.
    #[serde(default)]
    pub sprint: Option<GaitProfile>,

    /// Widest input angle to the left of forward that still sprints (degrees).
    #[serde(default = "default_sprint_angle")]
    pub sprint_left_angle_max: f32,

    /// Widest input angle to the right of forward that still sprints (degrees).
    #[serde(default = "default_sprint_angle")]
    pub sprint_right_angle_max: f32,

    /// Upward speed added while jumping (meters/second).
    #[serde(default)]
    pub jump_force: f32,

    // ========================================================================
    // Steps and Slopes
    // ========================================================================
    /// Step-up height as a percentage of the stance's capsule height.
    pub step_up_percent: f32,

    /// Step-down depth as a percentage of the stance's capsule height.
    pub step_down_percent: f32,

    /// Steepest standable slope (degrees, clamped to 89.9).
    pub slope_up_angle: f32,

    /// Steepest slope the character walks down (degrees).
    pub slope_down_angle: f32,

    /// Keep full horizontal progress when redirected along a walkable slope.
    /// When off, the redirected move keeps the original move's length.
    pub maintain_velocity_on_surface: bool,

    /// Keep speed when deflected along a wall.
    pub maintain_velocity_along_surface: bool,

    // ========================================================================
    // Capsule
    // ========================================================================
    pub capsule_center: Vec3,

    pub capsule_height: f32,

    pub capsule_radius: f32,

    /// Interpolation rate toward this stance's capsule (1/second).
    pub transition_speed: f32,
}

fn default_sprint_angle() -> f32 {
    45.0
}

impl StanceProfile {
    /// Default standing profile for a 2m tall, 0.5m radius character.
    pub fn standing() -> Self {
        Self {
            idle_deceleration: 20.0,
            walk: GaitProfile::new(2.0, 12.0),
            run: GaitProfile::new(4.5, 16.0),
            sprint: Some(GaitProfile::new(6.5, 20.0)),
            sprint_left_angle_max: 45.0,
            sprint_right_angle_max: 45.0,
            jump_force: 5.0,
            step_up_percent: 20.0,   // 40cm
            step_down_percent: 15.0, // 30cm
            slope_up_angle: 45.0,
            slope_down_angle: 55.0,
            maintain_velocity_on_surface: true,
            maintain_velocity_along_surface: true,
            capsule_center: Vec3::new(0.0, 1.0, 0.0),
            capsule_height: 2.0,
            capsule_radius: 0.5,
            transition_speed: 8.0,
        }
    }

    /// Default crouching profile.
    pub fn crouching() -> Self {
        Self {
            idle_deceleration: 20.0,
            walk: GaitProfile::new(1.2, 10.0),
            run: GaitProfile::new(2.2, 12.0),
            sprint: None,
            jump_force: 0.0,
            step_up_percent: 20.0,
            step_down_percent: 20.0,
            slope_up_angle: 40.0,
            slope_down_angle: 45.0,
            capsule_center: Vec3::new(0.0, 0.6, 0.0),
            capsule_height: 1.2,
            transition_speed: 10.0,
            ..Self::standing()
        }
    }

    /// Default prone profile.
    pub fn proning() -> Self {
        Self {
            idle_deceleration: 30.0,
            walk: GaitProfile::new(0.5, 6.0),
            run: GaitProfile::new(0.8, 6.0),
            sprint: None,
            jump_force: 0.0,
            step_up_percent: 25.0,
            step_down_percent: 25.0,
            slope_up_angle: 30.0,
            slope_down_angle: 30.0,
            capsule_center: Vec3::new(0.0, 0.4, 0.0),
            capsule_height: 0.8,
            capsule_radius: 0.4,
            transition_speed: 4.0,
            ..Self::standing()
        }
    }

    fn validate(&self, stance: &str) -> Result<(), ConfigError> {
        let non_negative = [
            ("idle_deceleration", self.idle_deceleration),
            ("walk.speed", self.walk.speed),
            ("walk.acceleration", self.walk.acceleration),
            ("run.speed", self.run.speed),
            ("run.acceleration", self.run.acceleration),
            ("sprint_left_angle_max", self.sprint_left_angle_max),
            ("sprint_right_angle_max", self.sprint_right_angle_max),
            ("jump_force", self.jump_force),
            ("slope_up_angle", self.slope_up_angle),
            ("slope_down_angle", self.slope_down_angle),
            ("capsule_height", self.capsule_height),
            ("transition_speed", self.transition_speed),
        ];
        for (field, value) in non_negative {
            check_non_negative(&format!("ground.{stance}.{field}"), value)?;
        }

        if let Some(sprint) = self.sprint {
            check_non_negative(&format!("ground.{stance}.sprint.speed"), sprint.speed)?;
            check_non_negative(
                &format!("ground.{stance}.sprint.acceleration"),
                sprint.acceleration,
            )?;
        }

        for (field, value) in [
            ("step_up_percent", self.step_up_percent),
            ("step_down_percent", self.step_down_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::invalid(
                    format!("ground.{stance}.{field}"),
                    format!("{value} is outside 0..=100"),
                ));
            }
        }

        if !(self.capsule_radius > 0.0 && self.capsule_radius.is_finite()) {
            return Err(ConfigError::invalid(
                format!("ground.{stance}.capsule_radius"),
                "must be positive",
            ));
        }

        if !self.capsule_center.is_finite() {
            return Err(ConfigError::invalid(
                format!("ground.{stance}.capsule_center"),
                "must be finite",
            ));
        }

        Ok(())
    }
}

fn check_non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be finite and >= 0")))
    }
}

/// Ground module tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundConfig {
    /// How far below the base sphere ground is searched for (meters).
    pub check_depth: f32,

    /// Layers the character can stand on.
    pub ground_layers: LayerMask,

    /// Horizontal moves shorter than this are skipped (meters).
    pub min_move_distance: f32,

    pub stand: StanceProfile,

    pub crouch: StanceProfile,

    /// Prone profile. Falls back to `crouch` when absent.
    #[serde(default)]
    pub prone: Option<StanceProfile>,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            check_depth: 0.1,
            ground_layers: LayerMask::ALL,
            min_move_distance: 0.0001,
            stand: StanceProfile::standing(),
            crouch: StanceProfile::crouching(),
            prone: Some(StanceProfile::proning()),
        }
    }
}

impl GroundConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.check_depth > 0.0 && self.check_depth.is_finite()) {
            return Err(ConfigError::invalid("ground.check_depth", "must be positive"));
        }
        check_non_negative("ground.min_move_distance", self.min_move_distance)?;
        if self.ground_layers.is_empty() {
            return Err(ConfigError::invalid("ground.ground_layers", "selects no layer"));
        }

        self.stand.validate("stand")?;
        self.crouch.validate("crouch")?;
        if let Some(prone) = &self.prone {
            prone.validate("prone")?;
        }
        Ok(())
    }
}

/// Air module tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirConfig {
    /// Gravity acceleration (meters/second²).
    pub gravity: f32,

    /// Fastest fall speed (meters/second).
    pub terminal_speed: f32,

    /// Horizontal speed reachable through air control (meters/second).
    pub air_speed: f32,

    /// Horizontal acceleration while airborne (meters/second²).
    pub air_acceleration: f32,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            gravity: 15.0,
            terminal_speed: 40.0,
            air_speed: 2.0,
            air_acceleration: 4.0,
        }
    }
}

impl AirConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("air.gravity", self.gravity)?;
        check_non_negative("air.terminal_speed", self.terminal_speed)?;
        check_non_negative("air.air_speed", self.air_speed)?;
        check_non_negative("air.air_acceleration", self.air_acceleration)
    }
}

/// Complete tuning asset for one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub capsule: CapsuleConfig,

    pub ground: GroundConfig,

    #[serde(default)]
    pub air: AirConfig,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            capsule: CapsuleConfig::default(),
            ground: GroundConfig::default(),
            air: AirConfig::default(),
        }
    }
}

impl CharacterConfig {
    /// Faster, snappier tuning with generous steps.
    pub fn arcade() -> Self {
        let mut config = Self::default();
        let stand = &mut config.ground.stand;
        stand.walk = GaitProfile::new(3.0, 20.0);
        stand.run = GaitProfile::new(6.0, 30.0);
        stand.sprint = Some(GaitProfile::new(9.0, 35.0));
        stand.jump_force = 6.5;
        stand.step_up_percent = 25.0;
        config.air.air_speed = 4.0;
        config.air.air_acceleration = 10.0;
        config
    }

    /// Slower, heavier tuning with stricter slopes.
    pub fn tactical() -> Self {
        let mut config = Self::default();
        let stand = &mut config.ground.stand;
        stand.walk = GaitProfile::new(1.6, 8.0);
        stand.run = GaitProfile::new(3.5, 10.0);
        stand.sprint = Some(GaitProfile::new(5.5, 12.0));
        stand.jump_force = 4.5;
        stand.slope_up_angle = 38.0;
        config.ground.crouch.slope_up_angle = 35.0;
        config.air.air_speed = 1.0;
        config
    }

    /// Config whose capsule and ground check only see `ground` and `solid`.
    pub fn with_layers(mut self, ground: LayerMask, solid: LayerMask) -> Self {
        self.ground.ground_layers = ground;
        self.capsule.layer_mask = solid | ground;
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_capsule(&self.capsule.shape)?;
        if self.capsule.layer_mask.is_empty() {
            return Err(ConfigError::invalid("capsule.layer_mask", "selects no layer"));
        }
        self.ground.validate()?;
        self.air.validate()
    }
}

fn validate_capsule(shape: &CapsuleShape) -> Result<(), ConfigError> {
    check_non_negative("capsule.shape.height", shape.height)?;
    check_non_negative("capsule.shape.skin_width", shape.skin_width)?;
    if !(shape.radius > 0.0 && shape.radius.is_finite()) {
        return Err(ConfigError::invalid("capsule.shape.radius", "must be positive"));
    }
    Ok(())
}

/// Layers used by [`CharacterConfig::default`] levels: walkable ground plus
/// blocking props.
pub fn default_layers() -> (LayerMask, LayerMask) {
    (
        Layer::GROUND.mask(),
        Layer::DEFAULT.mask() | Layer::PROPS,
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        CharacterConfig::default().validate().unwrap();
        CharacterConfig::arcade().validate().unwrap();
        CharacterConfig::tactical().validate().unwrap();
    }

    #[test]
    fn test_json_round_trip() {
        let config = CharacterConfig::tactical();
        let json = config.to_json_string().unwrap();
        let parsed = CharacterConfig::from_json_str(&json).unwrap();

        assert_eq!(parsed.ground, config.ground);
        assert_eq!(parsed.air, config.air);
        assert_eq!(parsed.capsule.shape, config.capsule.shape);
    }

    #[test]
    fn test_missing_section_is_rejected() {
        let json = r#"{ "capsule": { "shape": { "center": [0.0, 1.0, 0.0], "axis": "Y",
            "height": 2.0, "radius": 0.5, "skin_width": 0.01 }, "layer_mask": 4294967295 } }"#;

        let err = CharacterConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn test_optional_sections_default() {
        let mut value: serde_json::Value =
            serde_json::from_str(&CharacterConfig::default().to_json_string().unwrap()).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("air");
        object["ground"].as_object_mut().unwrap().remove("prone");

        let parsed = CharacterConfig::from_json_str(&value.to_string()).unwrap();
        assert_eq!(parsed.air, AirConfig::default());
        assert!(parsed.ground.prone.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = CharacterConfig::default();
        config.ground.stand.step_up_percent = 150.0;
        let err = config.validate().unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid { field, .. } if field == "ground.stand.step_up_percent"),
            "{err}"
        );

        let mut config = CharacterConfig::default();
        config.ground.crouch.walk.speed = -1.0;
        assert!(config.validate().is_err());

        let mut config = CharacterConfig::default();
        config.capsule.shape.radius = 0.0;
        assert!(config.validate().is_err());

        let mut config = CharacterConfig::default();
        config.ground.ground_layers = LayerMask::NONE;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = CharacterConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_with_layers() {
        let (ground, solid) = default_layers();
        let config = CharacterConfig::default().with_layers(ground, solid);

        assert!(config.ground.ground_layers.contains(Layer::GROUND));
        assert!(!config.ground.ground_layers.contains(Layer::PROPS));
        assert!(config.capsule.layer_mask.contains(Layer::PROPS));
        assert!(config.capsule.layer_mask.contains(Layer::GROUND));
    }
}
