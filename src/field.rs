//! The particle field: one [`SimulationObject`] per cube.
//!
//! Objects are allocated once when a simulation starts. Their shape seeds,
//! size and spawn point are fixed at creation; only the join progress and
//! the per-frame [`RenderState`] change afterwards.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::shapes::ShapeSeed;

/// Where an object flies in from while joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpawnOrigin {
    /// Rolled once at creation.
    #[default]
    Fixed,
    /// Re-rolled every frame until the object has joined.
    Jitter,
}

/// Parameters used when allocating a field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParams {
    pub count: u32,
    pub sphere_radius_min: f32,
    pub sphere_radius_max: f32,
    /// Cube edge length range.
    pub size_min: f32,
    pub size_max: f32,
    /// Join progress is drawn from `[0, initial_progress_max)` to stagger arrivals.
    pub initial_progress_max: f32,
    /// Width of the spawn box in X and Y.
    pub spawn_spread: f32,
    /// Spawn depth range, measured from the camera toward the scene.
    pub spawn_depth: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            count: 512,
            sphere_radius_min: 22.0,
            sphere_radius_max: 34.0,
            size_min: 1.9,
            size_max: 2.6,
            initial_progress_max: 0.3,
            spawn_spread: 40.0,
            spawn_depth: 40.0,
        }
    }
}

/// Values the renderer reads for one object each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub position: Vec3,
    /// Formation target for this frame, before the join interpolation.
    pub target: Vec3,
    pub scale: Vec3,
    pub opacity: f32,
    /// sRGB base color.
    pub color: Vec3,
    /// sRGB emissive color, already multiplied by the intensity.
    pub emissive: Vec3,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            scale: Vec3::ONE,
            opacity: 1.0,
            color: Vec3::ONE,
            emissive: Vec3::ZERO,
        }
    }
}

/// One cube in the field.
#[derive(Debug, Clone)]
pub struct SimulationObject {
    pub index: u32,
    pub seed: ShapeSeed,
    /// Edge length of the cube mesh.
    pub size: f32,
    /// Point the object flies in from.
    pub spawn: Vec3,
    progress: f32,
    pub render: RenderState,
}

impl SimulationObject {
    /// Join progress in [0, 1].
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_joined(&self) -> bool {
        self.progress >= 1.0
    }

    /// Advance join progress by `step`, saturating at 1.
    ///
    /// Progress never decreases: negative or NaN steps are ignored.
    pub fn advance_progress(&mut self, step: f32) {
        if step > 0.0 {
            self.progress = (self.progress + step).min(1.0);
        }
    }
}

/// Random source for field allocation and spawn jitter.
pub struct FieldRng {
    rng: SmallRng,
}

impl FieldRng {
    /// Seeded RNG, or one seeded from the clock when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Random f32 in `[min, max)`; returns `min` for an empty range.
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Angles `(phi, theta)` uniformly distributed over the sphere surface.
    pub fn sphere_angles(&mut self) -> (f32, f32) {
        let phi = (2.0 * self.rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
        let theta = TAU * self.rng.gen::<f32>();
        (phi, theta)
    }

    /// Random point in the spawn box in front of a camera at `camera_depth`.
    pub fn spawn_point(&mut self, params: &FieldParams, camera_depth: f32) -> Vec3 {
        Vec3::new(
            (self.rng.gen::<f32>() - 0.5) * params.spawn_spread,
            (self.rng.gen::<f32>() - 0.5) * params.spawn_spread,
            camera_depth - params.spawn_depth - self.rng.gen::<f32>() * params.spawn_depth,
        )
    }
}

/// All objects of one simulation plus the RNG that created them.
pub struct Field {
    objects: Vec<SimulationObject>,
    rng: FieldRng,
}

impl Field {
    /// Allocate `params.count` objects with staggered join progress.
    pub fn spawn(params: &FieldParams, seed: Option<u64>, camera_depth: f32) -> Self {
        let mut rng = FieldRng::new(seed);
        let objects = (0..params.count)
            .map(|index| {
                let (phi, theta) = rng.sphere_angles();
                let radius = rng.random_range(params.sphere_radius_min, params.sphere_radius_max);
                let size = rng.random_range(params.size_min, params.size_max);
                let progress = rng.random_range(0.0, params.initial_progress_max);
                let spawn = rng.spawn_point(params, camera_depth);
                SimulationObject {
                    index,
                    seed: ShapeSeed { radius, phi, theta },
                    size,
                    spawn,
                    progress,
                    render: RenderState {
                        position: spawn,
                        target: spawn,
                        ..Default::default()
                    },
                }
            })
            .collect();

        Self { objects, rng }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[SimulationObject] {
        &self.objects
    }

    /// Mutable objects together with the RNG, for the per-frame pass.
    pub fn split_mut(&mut self) -> (&mut [SimulationObject], &mut FieldRng) {
        (&mut self.objects, &mut self.rng)
    }
}
