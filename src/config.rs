//! Background configuration.
//!
//! Every section has serde defaults, so a TOML file only needs the keys it
//! wants to change:
//!
//! ```toml
//! object_count = 729
//! theme = "light"
//!
//! [blend]
//! strategy = "radial"
//!
//! [opacity]
//! rule = "join-progress"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::blend::{BlendParams, BlendStrategy};
use crate::error::ConfigError;
use crate::field::{FieldParams, SpawnOrigin};
use crate::shapes::{ShapeParams, SpiralParams};
use crate::theme::Theme;
use crate::update::{ColorParams, MotionParams, OpacityParams, OpacityRule, UpdateParams};

/// Top-level configuration for one background instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub object_count: u32,
    pub theme: Theme,
    /// Fixed RNG seed; `None` seeds from the clock.
    pub seed: Option<u64>,
    /// Animation time added per frame.
    pub time_step: f32,
    /// Per-frame pointer smoothing factor.
    pub pointer_smoothing: f32,
    pub shapes: ShapesConfig,
    pub blend: BlendConfig,
    pub motion: MotionConfig,
    pub opacity: OpacityConfig,
    pub color: ColorConfig,
    pub window: WindowConfig,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            object_count: 512,
            theme: Theme::Dark,
            seed: None,
            time_step: 0.018,
            pointer_smoothing: 0.08,
            shapes: ShapesConfig::default(),
            blend: BlendConfig::default(),
            motion: MotionConfig::default(),
            opacity: OpacityConfig::default(),
            color: ColorConfig::default(),
            window: WindowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapesConfig {
    pub sphere_radius_min: f32,
    pub sphere_radius_max: f32,
    pub cube_size: f32,
    pub spiral_radius: f32,
    pub spiral_height: f32,
    pub spiral_turns: f32,
    pub spiral_modulation: f32,
    pub object_size_min: f32,
    pub object_size_max: f32,
}

impl Default for ShapesConfig {
    fn default() -> Self {
        let spiral = SpiralParams::default();
        Self {
            sphere_radius_min: 22.0,
            sphere_radius_max: 34.0,
            cube_size: 32.0,
            spiral_radius: spiral.radius,
            spiral_height: spiral.height,
            spiral_turns: spiral.turns,
            spiral_modulation: spiral.modulation,
            object_size_min: 1.9,
            object_size_max: 2.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    pub strategy: BlendStrategy,
    pub morph_rate: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub spiral_threshold: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        let p = BlendParams::default();
        Self {
            strategy: p.strategy,
            morph_rate: p.morph_rate,
            inner_radius: p.inner_radius,
            outer_radius: p.outer_radius,
            spiral_threshold: p.spiral_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub definiteness_threshold: f32,
    pub attraction_strength: f32,
    pub min_indefinite_scale: f32,
    pub bounce_amplitude: f32,
    pub wobble_amplitude: f32,
    pub join_step: f32,
    pub initial_progress_max: f32,
    pub join_scale_boost: f32,
    pub spawn_origin: SpawnOrigin,
}

impl Default for MotionConfig {
    fn default() -> Self {
        let m = MotionParams::default();
        Self {
            definiteness_threshold: m.definiteness_threshold,
            attraction_strength: m.attraction_strength,
            min_indefinite_scale: m.min_indefinite_scale,
            bounce_amplitude: m.bounce_amplitude,
            wobble_amplitude: m.wobble_amplitude,
            join_step: m.join_step,
            initial_progress_max: FieldParams::default().initial_progress_max,
            join_scale_boost: m.join_scale_boost,
            spawn_origin: m.spawn_origin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityConfig {
    pub rule: OpacityRule,
    pub floor: f32,
    pub fade_near: f32,
    pub fade_far: f32,
}

impl Default for OpacityConfig {
    fn default() -> Self {
        let o = OpacityParams::default();
        Self {
            rule: o.rule,
            floor: o.floor,
            fade_near: o.fade_near,
            fade_far: o.fade_far,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub hue_drift: f32,
    pub hue_drift_speed: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        let c = ColorParams::default();
        Self {
            hue_drift: c.hue_drift,
            hue_drift_speed: c.hue_drift_speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Borderless window pinned below other windows.
    pub background: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "morphfield".to_string(),
            width: 1280,
            height: 720,
            background: false,
        }
    }
}

impl BackgroundConfig {
    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the simulation depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.object_count == 0 {
            return Err(ConfigError::invalid("object_count", "must be at least 1"));
        }
        positive("time_step", self.time_step)?;
        rate("pointer_smoothing", self.pointer_smoothing)?;

        let s = &self.shapes;
        positive("shapes.sphere_radius_min", s.sphere_radius_min)?;
        ordered("shapes.sphere_radius_max", s.sphere_radius_min, s.sphere_radius_max)?;
        positive("shapes.cube_size", s.cube_size)?;
        positive("shapes.spiral_radius", s.spiral_radius)?;
        finite("shapes.spiral_height", s.spiral_height)?;
        finite("shapes.spiral_turns", s.spiral_turns)?;
        unit("shapes.spiral_modulation", s.spiral_modulation)?;
        positive("shapes.object_size_min", s.object_size_min)?;
        ordered("shapes.object_size_max", s.object_size_min, s.object_size_max)?;

        let b = &self.blend;
        rate("blend.morph_rate", b.morph_rate)?;
        unit("blend.inner_radius", b.inner_radius)?;
        finite("blend.outer_radius", b.outer_radius)?;
        if b.inner_radius >= b.outer_radius {
            return Err(ConfigError::invalid(
                "blend.outer_radius",
                "must be greater than blend.inner_radius",
            ));
        }
        unit("blend.spiral_threshold", b.spiral_threshold)?;

        let m = &self.motion;
        unit("motion.definiteness_threshold", m.definiteness_threshold)?;
        unit("motion.attraction_strength", m.attraction_strength)?;
        unit("motion.min_indefinite_scale", m.min_indefinite_scale)?;
        unit("motion.bounce_amplitude", m.bounce_amplitude)?;
        finite("motion.wobble_amplitude", m.wobble_amplitude)?;
        positive("motion.join_step", m.join_step)?;
        unit("motion.initial_progress_max", m.initial_progress_max)?;
        if !(m.join_scale_boost >= 0.0) {
            return Err(ConfigError::invalid("motion.join_scale_boost", "must be >= 0"));
        }

        let o = &self.opacity;
        unit("opacity.floor", o.floor)?;
        finite("opacity.fade_near", o.fade_near)?;
        finite("opacity.fade_far", o.fade_far)?;
        if o.fade_near >= o.fade_far {
            return Err(ConfigError::invalid(
                "opacity.fade_far",
                "must be greater than opacity.fade_near",
            ));
        }

        finite("color.hue_drift", self.color.hue_drift)?;
        finite("color.hue_drift_speed", self.color.hue_drift_speed)?;

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::invalid("window", "width and height must be non-zero"));
        }
        Ok(())
    }

    pub fn field_params(&self) -> FieldParams {
        FieldParams {
            count: self.object_count,
            sphere_radius_min: self.shapes.sphere_radius_min,
            sphere_radius_max: self.shapes.sphere_radius_max,
            size_min: self.shapes.object_size_min,
            size_max: self.shapes.object_size_max,
            initial_progress_max: self.motion.initial_progress_max,
            ..Default::default()
        }
    }

    pub fn shape_params(&self) -> ShapeParams {
        ShapeParams {
            cube_size: self.shapes.cube_size,
            spiral: SpiralParams {
                radius: self.shapes.spiral_radius,
                height: self.shapes.spiral_height,
                turns: self.shapes.spiral_turns,
                modulation: self.shapes.spiral_modulation,
            },
        }
    }

    pub fn blend_params(&self) -> BlendParams {
        BlendParams {
            strategy: self.blend.strategy,
            morph_rate: self.blend.morph_rate,
            inner_radius: self.blend.inner_radius,
            outer_radius: self.blend.outer_radius,
            spiral_threshold: self.blend.spiral_threshold,
        }
    }

    pub fn update_params(&self) -> UpdateParams {
        let m = &self.motion;
        UpdateParams {
            motion: MotionParams {
                definiteness_threshold: m.definiteness_threshold,
                attraction_strength: m.attraction_strength,
                min_indefinite_scale: m.min_indefinite_scale,
                bounce_amplitude: m.bounce_amplitude,
                wobble_amplitude: m.wobble_amplitude,
                join_step: m.join_step,
                join_scale_boost: m.join_scale_boost,
                spawn_origin: m.spawn_origin,
                ..Default::default()
            },
            opacity: OpacityParams {
                rule: self.opacity.rule,
                floor: self.opacity.floor,
                fade_near: self.opacity.fade_near,
                fade_far: self.opacity.fade_far,
            },
            color: ColorParams {
                hue_drift: self.color.hue_drift,
                hue_drift_speed: self.color.hue_drift_speed,
            },
        }
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be a finite number"))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0 (got {value})")))
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be within [0, 1] (got {value})")))
    }
}

/// Smoothing factors: (0, 1].
fn rate(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be within (0, 1] (got {value})")))
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    finite(field, max)?;
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= the minimum ({min})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BackgroundConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = BackgroundConfig::from_toml("").unwrap();
        assert_eq!(config, BackgroundConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = BackgroundConfig::from_toml(
            r#"
            object_count = 27
            theme = "light"
            seed = 5

            [blend]
            strategy = "radial"

            [motion]
            spawn_origin = "jitter"

            [opacity]
            rule = "join-progress"
            "#,
        )
        .unwrap();

        assert_eq!(config.object_count, 27);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.blend.strategy, BlendStrategy::Radial);
        assert_eq!(config.blend.morph_rate, 0.02);
        assert_eq!(config.motion.spawn_origin, SpawnOrigin::Jitter);
        assert_eq!(config.opacity.rule, OpacityRule::JoinProgress);
        assert_eq!(config.field_params().count, 27);
    }

    #[test]
    fn test_rejects_zero_objects() {
        let err = BackgroundConfig::from_toml("object_count = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "object_count", .. }));
    }

    #[test]
    fn test_rejects_inverted_ranges() {
        let mut config = BackgroundConfig::default();
        config.shapes.sphere_radius_min = 40.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "shapes.sphere_radius_max", .. })
        ));

        let mut config = BackgroundConfig::default();
        config.blend.inner_radius = 0.8;
        assert!(config.validate().is_err());

        let mut config = BackgroundConfig::default();
        config.opacity.fade_far = 10.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_rates() {
        let mut config = BackgroundConfig::default();
        config.blend.morph_rate = 0.0;
        assert!(config.validate().is_err());

        let mut config = BackgroundConfig::default();
        config.pointer_smoothing = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = BackgroundConfig::default();
        config.opacity.floor = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_strategy() {
        let err = BackgroundConfig::from_toml("[blend]\nstrategy = \"zigzag\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_params_follow_config() {
        let mut config = BackgroundConfig::default();
        config.shapes.cube_size = 10.0;
        config.motion.join_step = 0.5;
        config.opacity.floor = 0.3;
        assert_eq!(config.shape_params().cube_size, 10.0);
        assert_eq!(config.update_params().motion.join_step, 0.5);
        assert_eq!(config.update_params().opacity.floor, 0.3);
    }

    #[test]
    fn test_missing_file() {
        let err = BackgroundConfig::load(Path::new("/nonexistent/morphfield.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
