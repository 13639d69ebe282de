//! Shape-target generators.
//!
//! Each generator maps an object's fixed identity (index, field size) and
//! its creation-time random seed to a point of a formation. Generators are
//! pure: the same inputs always give bit-identical output, so targets are
//! recomputed every frame instead of being cached.

use glam::Vec3;
use std::f32::consts::TAU;

/// Formations the field can interpolate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Sphere,
    Cube,
    Spiral,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Sphere, Shape::Cube, Shape::Spiral];
}

/// Per-object random parameters drawn once at creation.
///
/// `phi` is the inclination (0..π) and `theta` the azimuth (0..2π) of the
/// object's slot on the sphere shell; `radius` is its shell radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSeed {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

/// Helix parameters for the spiral formation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpiralParams {
    /// Mean distance from the helix axis.
    pub radius: f32,
    /// Total extent along the Y axis.
    pub height: f32,
    /// Number of full revolutions over the whole field.
    pub turns: f32,
    /// Relative amplitude of the sinusoidal radius modulation.
    pub modulation: f32,
}

impl Default for SpiralParams {
    fn default() -> Self {
        Self {
            radius: 18.0,
            height: 40.0,
            turns: 4.0,
            modulation: 0.25,
        }
    }
}

/// Fixed geometry shared by every object in a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    /// Edge length of the cube formation.
    pub cube_size: f32,
    pub spiral: SpiralParams,
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self {
            cube_size: 32.0,
            spiral: SpiralParams::default(),
        }
    }
}

/// Targets of one object for every formation, computed together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeTargets {
    pub sphere: Vec3,
    pub cube: Vec3,
    pub spiral: Vec3,
}

impl ShapeTargets {
    /// Evaluate all generators for the object at `index` in a field of `count`.
    pub fn compute(index: u32, count: u32, seed: &ShapeSeed, params: &ShapeParams) -> Self {
        Self {
            sphere: sphere_target(seed),
            cube: cube_target(index, count, params.cube_size),
            spiral: spiral_target(index, count, &params.spiral),
        }
    }

    pub fn get(&self, shape: Shape) -> Vec3 {
        match shape {
            Shape::Sphere => self.sphere,
            Shape::Cube => self.cube,
            Shape::Spiral => self.spiral,
        }
    }
}

/// Point on the sphere shell at the seed's radius and angles.
pub fn sphere_target(seed: &ShapeSeed) -> Vec3 {
    let (sin_phi, cos_phi) = seed.phi.sin_cos();
    let (sin_theta, cos_theta) = seed.theta.sin_cos();
    Vec3::new(
        seed.radius * sin_phi * cos_theta,
        seed.radius * sin_phi * sin_theta,
        seed.radius * cos_phi,
    )
}

/// Side length of the smallest integer grid holding `count` slots.
///
/// Computed with integers so perfect cubes never round up (`cbrt(512)` can
/// come out as 8.000001 in floating point).
pub fn grid_side(count: u32) -> u32 {
    let count = count.max(1) as u64;
    let mut n = (count as f64).cbrt().floor() as u64;
    while n * n * n < count {
        n += 1;
    }
    while n > 1 && (n - 1) * (n - 1) * (n - 1) >= count {
        n -= 1;
    }
    n.max(1) as u32
}

/// Slot of `index` in a regular grid spanning `[-size/2, size/2]` per axis.
///
/// A single-slot grid collapses to the origin.
pub fn cube_target(index: u32, count: u32, size: f32) -> Vec3 {
    let n = grid_side(count);
    let i = index % n;
    let j = (index / n) % n;
    let k = index / (n * n);

    let axis = |c: u32| {
        if n > 1 {
            (c as f32 / (n - 1) as f32 - 0.5) * size
        } else {
            0.0
        }
    };

    Vec3::new(axis(i), axis(j), axis(k))
}

/// Point on a helix around the Y axis with a sinusoidally modulated radius.
pub fn spiral_target(index: u32, count: u32, params: &SpiralParams) -> Vec3 {
    let t = if count > 1 {
        index as f32 / (count - 1) as f32
    } else {
        0.0
    };
    let angle = t * params.turns * TAU;
    let radius = params.radius * (1.0 + params.modulation * (t * TAU * 3.0).sin());

    Vec3::new(
        radius * angle.cos(),
        (t - 0.5) * params.height,
        radius * angle.sin(),
    )
}
