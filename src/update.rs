//! Per-object update step.
//!
//! Runs once per object per frame, in this order:
//!
//! 1. Blend the shape targets with the current weights.
//! 2. While no shape dominates, pull toward the pointer and shrink/bounce.
//! 3. Add a wobble that fades out as the field becomes a cube.
//! 4. Advance join progress and interpolate from the spawn point.
//! 5. Pick the scale (join scale while joining, formation scale after).
//! 6. Derive opacity.
//! 7. Derive color and emissive from the theme.
//!
//! Objects never interact, so the pass is a plain loop over the field.
//! [`pose_field`] runs the same stages without advancing progress.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::blend::BlendWeights;
use crate::field::{Field, FieldParams, FieldRng, SimulationObject, SpawnOrigin};
use crate::shapes::{ShapeParams, ShapeTargets};
use crate::theme::ThemeStyle;

const MIN_SCALE: f32 = 1e-3;

/// How object opacity is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpacityRule {
    /// Closer to the camera is more transparent, down to a floor.
    #[default]
    CameraDistance,
    /// Fade in with join progress.
    JoinProgress,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpacityParams {
    pub rule: OpacityRule,
    /// Lowest opacity of the camera-distance rule.
    pub floor: f32,
    /// Distance at or below which opacity is `floor`.
    pub fade_near: f32,
    /// Distance at or beyond which opacity is 1.
    pub fade_far: f32,
}

impl Default for OpacityParams {
    fn default() -> Self {
        Self {
            rule: OpacityRule::CameraDistance,
            floor: 0.22,
            fade_near: 30.0,
            fade_far: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    /// Below this definiteness objects drift toward the pointer.
    pub definiteness_threshold: f32,
    /// Pointer pull at zero definiteness.
    pub attraction_strength: f32,
    /// Formation scale at zero definiteness.
    pub min_indefinite_scale: f32,
    pub bounce_amplitude: f32,
    pub squash_amplitude: f32,
    /// Wobble displacement when the cube weight is 0.
    pub wobble_amplitude: f32,
    /// Join progress added per frame.
    pub join_step: f32,
    /// Extra scale of a freshly spawned object.
    pub join_scale_boost: f32,
    pub spawn_origin: SpawnOrigin,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            definiteness_threshold: 0.85,
            attraction_strength: 0.45,
            min_indefinite_scale: 0.4,
            bounce_amplitude: 0.07,
            squash_amplitude: 0.04,
            wobble_amplitude: 1.7,
            join_step: 0.012,
            join_scale_boost: 2.5,
            spawn_origin: SpawnOrigin::Fixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorParams {
    /// Peak hue offset of the drift, in turns. 0 disables drift.
    pub hue_drift: f32,
    pub hue_drift_speed: f32,
}

impl Default for ColorParams {
    fn default() -> Self {
        Self {
            hue_drift: 0.02,
            hue_drift_speed: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UpdateParams {
    pub motion: MotionParams,
    pub opacity: OpacityParams,
    pub color: ColorParams,
}

/// Inputs shared by every object in one frame.
pub struct FrameContext<'a> {
    /// Animation time.
    pub time: f32,
    pub weights: BlendWeights,
    /// World-space point under the smoothed pointer.
    pub pointer_world: Vec3,
    pub camera_position: Vec3,
    pub object_count: u32,
    pub shapes: &'a ShapeParams,
    pub field: &'a FieldParams,
    pub style: &'a ThemeStyle,
}

/// Update every object in the field for one frame.
pub fn update_field(field: &mut Field, ctx: &FrameContext<'_>, params: &UpdateParams) {
    let (objects, rng) = field.split_mut();
    for obj in objects {
        update_object(obj, ctx, params, rng);
    }
}

/// Recompute every object's render state without advancing join progress.
pub fn pose_field(field: &mut Field, ctx: &FrameContext<'_>, params: &UpdateParams) {
    let (objects, _) = field.split_mut();
    for obj in objects {
        pose_object(obj, ctx, params);
    }
}

/// Advance one object's join progress, then update its position, scale,
/// opacity and color.
pub fn update_object(
    obj: &mut SimulationObject,
    ctx: &FrameContext<'_>,
    params: &UpdateParams,
    rng: &mut FieldRng,
) {
    if params.motion.spawn_origin == SpawnOrigin::Jitter && !obj.is_joined() {
        obj.spawn = rng.spawn_point(ctx.field, ctx.camera_position.z);
    }
    obj.advance_progress(params.motion.join_step);
    pose_object(obj, ctx, params);
}

/// Derive an object's render state from its current join progress.
pub fn pose_object(obj: &mut SimulationObject, ctx: &FrameContext<'_>, params: &UpdateParams) {
    let motion = &params.motion;
    let t = ctx.time;
    let phase = obj.index as f32;

    // Formation target
    let targets = ShapeTargets::compute(obj.index, ctx.object_count, &obj.seed, ctx.shapes);
    let mut target = ctx.weights.blend(&targets);

    // Indefiniteness
    let definiteness = ctx.weights.definiteness();
    let formation_scale = if definiteness < motion.definiteness_threshold {
        let looseness = 1.0 - definiteness;
        target = target.lerp(ctx.pointer_world, looseness * motion.attraction_strength);

        let shrink = 1.0 - (1.0 - motion.min_indefinite_scale) * looseness;
        let bounce = 1.0 + (t * 2.0 + phase).sin() * motion.bounce_amplitude * looseness;
        let squash = 1.0 - motion.squash_amplitude * looseness * (t * 2.2 + phase).sin();
        Vec3::new(shrink * bounce, shrink * squash, shrink * bounce)
    } else {
        Vec3::ONE
    };

    // Wobble
    let wobble = motion.wobble_amplitude * (1.0 - ctx.weights.cube);
    target += Vec3::new(
        (t * 0.7 + phase).sin(),
        (t * 0.6 + phase * 1.1).cos(),
        (t * 0.5 + phase * 0.7).sin(),
    ) * wobble;

    // Join
    let progress = obj.progress();
    let position = obj.spawn.lerp(target, progress);

    let scale = if obj.is_joined() {
        formation_scale
    } else {
        Vec3::splat(1.0 + (1.0 - progress) * motion.join_scale_boost)
    };

    let opacity = opacity_for(&params.opacity, progress, position.distance(ctx.camera_position));

    let color = if obj.is_joined() {
        let drift = (t * params.color.hue_drift_speed + phase).sin() * params.color.hue_drift;
        ctx.style.joined_color(obj.index, drift)
    } else {
        ctx.style.base_color(obj.index)
    };

    obj.render.target = target;
    obj.render.position = position;
    obj.render.scale = sanitize_scale(scale);
    obj.render.opacity = opacity;
    obj.render.color = color;
    obj.render.emissive = color * ctx.style.emissive_intensity;
}

/// Opacity in [0, 1] for an object at `distance` from the camera.
pub fn opacity_for(params: &OpacityParams, progress: f32, distance: f32) -> f32 {
    let opacity = match params.rule {
        OpacityRule::CameraDistance => {
            let span = params.fade_far - params.fade_near;
            let t = if span > 0.0 {
                ((distance - params.fade_near) / span).clamp(0.0, 1.0)
            } else if distance >= params.fade_far {
                1.0
            } else {
                0.0
            };
            params.floor + (1.0 - params.floor) * t
        }
        OpacityRule::JoinProgress => {
            if progress < 0.5 {
                (progress * 1.2).max(0.05)
            } else {
                (0.2 + (progress - 0.5) * 1.6).min(1.0)
            }
        }
    };

    if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

fn sanitize_scale(scale: Vec3) -> Vec3 {
    let fix = |s: f32| if s.is_finite() { s.max(MIN_SCALE) } else { 1.0 };
    Vec3::new(fix(scale.x), fix(scale.y), fix(scale.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    struct Env {
        shapes: ShapeParams,
        field_params: FieldParams,
        style: ThemeStyle,
    }

    fn setup(count: u32) -> (Env, Field) {
        let field_params = FieldParams {
            count,
            ..Default::default()
        };
        let field = Field::spawn(&field_params, Some(11), 60.0);
        let env = Env {
            shapes: ShapeParams::default(),
            field_params,
            style: ThemeStyle::for_theme(Theme::Dark),
        };
        (env, field)
    }

    fn ctx(env: &Env, time: f32, weights: BlendWeights) -> FrameContext<'_> {
        FrameContext {
            time,
            weights,
            pointer_world: Vec3::new(0.0, 40.0, 59.6),
            camera_position: Vec3::new(0.0, 40.0, 60.0),
            object_count: env.field_params.count,
            shapes: &env.shapes,
            field: &env.field_params,
            style: &env.style,
        }
    }

    #[test]
    fn test_joined_cube_sits_on_grid() {
        let (env, mut field) = setup(27);
        let params = UpdateParams::default();
        for frame in 0..100 {
            let c = ctx(&env, frame as f32 * 0.018, BlendWeights::CUBE);
            update_field(&mut field, &c, &params);
        }

        for obj in field.objects() {
            assert!(obj.is_joined());
            let expected = crate::shapes::cube_target(obj.index, 27, env.shapes.cube_size);
            assert!((obj.render.position - expected).length() < 1e-4);
            assert_eq!(obj.render.scale, Vec3::ONE);
        }
    }

    #[test]
    fn test_indefinite_blend_shrinks_joined_objects() {
        let (env, mut field) = setup(8);
        let params = UpdateParams::default();
        let half = BlendWeights {
            sphere: 0.5,
            cube: 0.5,
            spiral: 0.0,
        };
        for frame in 0..100 {
            let c = ctx(&env, frame as f32 * 0.018, half);
            update_field(&mut field, &c, &params);
        }
        for obj in field.objects() {
            // shrink = 1 - 0.6 * 0.5 = 0.7, bounce within ±3.5%
            assert!(obj.render.scale.x < 0.75 && obj.render.scale.x > 0.65);
            assert!(obj.render.scale.y < 0.72 && obj.render.scale.y > 0.68);
        }
    }

    #[test]
    fn test_join_scale_while_joining() {
        let (env, mut field) = setup(8);
        let params = UpdateParams::default();
        let c = ctx(&env, 0.0, BlendWeights::SPHERE);
        let (objects, rng) = field.split_mut();
        let obj = &mut objects[0];
        update_object(obj, &c, &params, rng);

        let expected = 1.0 + (1.0 - obj.progress()) * 2.5;
        assert!((obj.render.scale.x - expected).abs() < 1e-5);
        assert!(obj.render.scale.x > 1.0);
    }

    #[test]
    fn test_wobble_only_off_cube() {
        let (env, mut field) = setup(8);
        let params = UpdateParams::default();
        for frame in 0..100 {
            let c = ctx(&env, frame as f32 * 0.018, BlendWeights::SPHERE);
            update_field(&mut field, &c, &params);
        }
        let obj = &field.objects()[1];
        let shell = crate::shapes::sphere_target(&obj.seed);
        let offset = obj.render.position - shell;
        assert!(offset.length() > 0.0);
        assert!(offset.abs().max_element() <= 1.7 + 1e-4);
    }

    #[test]
    fn test_color_recolors_after_join() {
        let (mut env, mut field) = setup(8);
        env.style = ThemeStyle::for_theme(Theme::Light);
        let style = env.style.clone();
        let params = UpdateParams::default();
        let c = ctx(&env, 0.0, BlendWeights::CUBE);
        let (objects, rng) = field.split_mut();
        let obj = &mut objects[4];
        update_object(obj, &c, &params, rng);
        assert_eq!(obj.render.color, style.base_color(4));

        for _ in 0..100 {
            update_object(obj, &c, &params, rng);
        }
        assert_eq!(obj.render.color, style.joined_color(4, 4.0_f32.sin() * 0.02));
        assert_eq!(obj.render.emissive, obj.render.color * style.emissive_intensity);
    }

    #[test]
    fn test_jitter_rerolls_spawn_until_joined() {
        let (env, mut field) = setup(4);
        let params = UpdateParams {
            motion: MotionParams {
                spawn_origin: SpawnOrigin::Jitter,
                ..Default::default()
            },
            ..Default::default()
        };
        let c = ctx(&env, 0.0, BlendWeights::CUBE);
        let (objects, rng) = field.split_mut();
        let obj = &mut objects[0];
        let first = obj.spawn;
        update_object(obj, &c, &params, rng);
        assert_ne!(obj.spawn, first);

        for _ in 0..100 {
            update_object(obj, &c, &params, rng);
        }
        let settled = obj.spawn;
        update_object(obj, &c, &params, rng);
        assert_eq!(obj.spawn, settled);
    }

    #[test]
    fn test_pose_keeps_progress() {
        let (env, mut field) = setup(8);
        let params = UpdateParams::default();
        let before: Vec<f32> = field.objects().iter().map(|o| o.progress()).collect();

        let c = ctx(&env, 0.0, BlendWeights::SPHERE);
        pose_field(&mut field, &c, &params);

        for (obj, p) in field.objects().iter().zip(before) {
            assert_eq!(obj.progress(), p);
            let expected = obj.spawn.lerp(obj.render.target, p);
            assert!((obj.render.position - expected).length() < 1e-4);
            assert!((obj.render.scale.x - (1.0 + (1.0 - p) * 2.5)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_distance_opacity() {
        let params = OpacityParams::default();
        assert_eq!(opacity_for(&params, 1.0, 0.0), 0.22);
        assert!((opacity_for(&params, 1.0, 500.0) - 1.0).abs() < 1e-6);
        let mid = opacity_for(&params, 1.0, 55.0);
        assert!((mid - (0.22 + 0.78 * 0.5)).abs() < 1e-5);
        assert_eq!(opacity_for(&params, 1.0, f32::NAN), 1.0);
    }

    #[test]
    fn test_progress_opacity() {
        let params = OpacityParams {
            rule: OpacityRule::JoinProgress,
            ..Default::default()
        };
        assert_eq!(opacity_for(&params, 0.0, 0.0), 0.05);
        assert!((opacity_for(&params, 0.25, 0.0) - 0.3).abs() < 1e-6);
        assert!((opacity_for(&params, 0.75, 0.0) - 0.6).abs() < 1e-6);
        assert!((opacity_for(&params, 1.0, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sanitize_scale() {
        let s = sanitize_scale(Vec3::new(-2.0, f32::INFINITY, 0.5));
        assert_eq!(s, Vec3::new(MIN_SCALE, 1.0, 0.5));
    }
}
