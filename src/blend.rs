//! Blend controller.
//!
//! Turns the smoothed pointer position into per-shape weights. The weights
//! are low-pass filtered every frame (`w += (target - w) * rate`) so a
//! sudden pointer jump settles over one to two seconds instead of popping.
//!
//! The state is owned by one [`Simulation`](crate::Simulation) and threaded
//! through its frame step; nothing here is process-global.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::shapes::{Shape, ShapeTargets};

const WEIGHT_EPSILON: f32 = 1e-6;

/// How pointer position maps to shape weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendStrategy {
    /// Cube weight is `1 - |x|`; sphere takes the rest. Spiral is unused.
    #[default]
    Distance,
    /// Cube near the center, spiral past a high X threshold, sphere elsewhere.
    Radial,
}

/// Tuning for the blend controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendParams {
    pub strategy: BlendStrategy,
    /// Per-frame smoothing factor in (0, 1].
    pub morph_rate: f32,
    /// Radial strategy: pointer distance where the cube starts fading out.
    pub inner_radius: f32,
    /// Radial strategy: pointer distance where the cube has fully faded.
    pub outer_radius: f32,
    /// Radial strategy: pointer X where the spiral starts fading in.
    pub spiral_threshold: f32,
}

impl Default for BlendParams {
    fn default() -> Self {
        Self {
            strategy: BlendStrategy::Distance,
            morph_rate: 0.02,
            inner_radius: 0.15,
            outer_radius: 0.65,
            spiral_threshold: 0.7,
        }
    }
}

/// Convex weights over the supported formations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub sphere: f32,
    pub cube: f32,
    pub spiral: f32,
}

impl BlendWeights {
    pub const SPHERE: Self = Self {
        sphere: 1.0,
        cube: 0.0,
        spiral: 0.0,
    };

    pub const CUBE: Self = Self {
        sphere: 0.0,
        cube: 1.0,
        spiral: 0.0,
    };

    pub const EQUAL: Self = Self {
        sphere: 1.0 / 3.0,
        cube: 1.0 / 3.0,
        spiral: 1.0 / 3.0,
    };

    pub fn sum(&self) -> f32 {
        self.sphere + self.cube + self.spiral
    }

    /// The largest weight: how firmly the field has committed to one shape.
    pub fn definiteness(&self) -> f32 {
        self.sphere.max(self.cube).max(self.spiral)
    }

    /// Clamp every weight to [0, 1] and rescale so they sum to 1.
    ///
    /// Returns `fallback` when nothing is left to normalize.
    pub fn normalized(self, fallback: BlendWeights) -> BlendWeights {
        let clamp = |w: f32| if w.is_finite() { w.clamp(0.0, 1.0) } else { 0.0 };
        let w = BlendWeights {
            sphere: clamp(self.sphere),
            cube: clamp(self.cube),
            spiral: clamp(self.spiral),
        };
        let sum = w.sum();
        if sum <= WEIGHT_EPSILON {
            return fallback;
        }
        BlendWeights {
            sphere: w.sphere / sum,
            cube: w.cube / sum,
            spiral: w.spiral / sum,
        }
    }

    pub fn weight(&self, shape: Shape) -> f32 {
        match shape {
            Shape::Sphere => self.sphere,
            Shape::Cube => self.cube,
            Shape::Spiral => self.spiral,
        }
    }

    /// Weighted sum of an object's shape targets.
    pub fn blend(&self, targets: &ShapeTargets) -> Vec3 {
        Shape::ALL
            .iter()
            .map(|&shape| targets.get(shape) * self.weight(shape))
            .sum()
    }

    fn lerp_toward(&self, target: &BlendWeights, rate: f32) -> BlendWeights {
        BlendWeights {
            sphere: self.sphere + (target.sphere - self.sphere) * rate,
            cube: self.cube + (target.cube - self.cube) * rate,
            spiral: self.spiral + (target.spiral - self.spiral) * rate,
        }
    }
}

/// Cubic Hermite step: 0 below `edge0`, 1 above `edge1`, `3t² - 2t³` between.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Unsmoothed weights for a pointer position in normalized device coordinates.
pub fn target_weights(params: &BlendParams, pointer: Vec2) -> BlendWeights {
    match params.strategy {
        BlendStrategy::Distance => {
            let cube = (1.0 - pointer.x.abs()).clamp(0.0, 1.0);
            BlendWeights {
                sphere: 1.0 - cube,
                cube,
                spiral: 0.0,
            }
        }
        BlendStrategy::Radial => {
            let distance = pointer.length();
            let cube = 1.0 - smoothstep(params.inner_radius, params.outer_radius, distance);
            let spiral = smoothstep(params.spiral_threshold, 1.0, pointer.x);
            let sphere = (1.0 - cube - spiral).max(0.0);
            BlendWeights {
                sphere,
                cube,
                spiral,
            }
            .normalized(BlendWeights::EQUAL)
        }
    }
}

/// Smoothed blend weights carried across frames.
#[derive(Debug, Clone)]
pub struct BlendState {
    weights: BlendWeights,
    initialized: bool,
}

impl BlendState {
    pub fn new() -> Self {
        Self {
            weights: BlendWeights::EQUAL,
            initialized: false,
        }
    }

    /// Weights produced by the most recent [`update`](Self::update).
    pub fn weights(&self) -> BlendWeights {
        self.weights
    }

    /// Advance the filter one frame toward the pointer's target weights.
    ///
    /// The first call snaps to the target so the field does not sweep in
    /// from an arbitrary starting mix.
    pub fn update(&mut self, params: &BlendParams, pointer: Vec2) -> BlendWeights {
        let target = target_weights(params, pointer);
        let next = if self.initialized {
            self.weights.lerp_toward(&target, params.morph_rate)
        } else {
            self.initialized = true;
            target
        };
        self.weights = next.normalized(self.weights);
        self.weights
    }
}

impl Default for BlendState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_convex(w: &BlendWeights) {
        assert!(w.sphere >= 0.0 && w.cube >= 0.0 && w.spiral >= 0.0, "{w:?}");
        assert!((w.sum() - 1.0).abs() < 1e-5, "{w:?}");
    }

    #[test]
    fn test_blend_weights_each_shape() {
        let targets = ShapeTargets {
            sphere: Vec3::X,
            cube: Vec3::Y * 2.0,
            spiral: Vec3::Z * 4.0,
        };
        let w = BlendWeights {
            sphere: 0.5,
            cube: 0.25,
            spiral: 0.25,
        };
        assert_eq!(w.weight(Shape::Cube), 0.25);
        assert!((w.blend(&targets) - Vec3::new(0.5, 0.5, 1.0)).length() < 1e-6);

        for shape in Shape::ALL {
            let only = BlendWeights {
                sphere: 0.0,
                cube: 0.0,
                spiral: 0.0,
            };
            let only = match shape {
                Shape::Sphere => BlendWeights { sphere: 1.0, ..only },
                Shape::Cube => BlendWeights { cube: 1.0, ..only },
                Shape::Spiral => BlendWeights { spiral: 1.0, ..only },
            };
            assert_eq!(only.weight(shape), 1.0);
            assert_eq!(only.blend(&targets), targets.get(shape));
        }
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.2, 0.6, 0.0), 0.0);
        assert_eq!(smoothstep(0.2, 0.6, 1.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smoothstep(0.5, 0.5, 0.4), 0.0);
        assert_eq!(smoothstep(0.5, 0.5, 0.6), 1.0);
    }

    #[test]
    fn test_distance_targets() {
        let params = BlendParams::default();
        let center = target_weights(&params, Vec2::ZERO);
        assert_eq!(center, BlendWeights::CUBE);

        let edge = target_weights(&params, Vec2::new(-1.0, 0.3));
        assert_eq!(edge.cube, 0.0);
        assert_eq!(edge.sphere, 1.0);

        let beyond = target_weights(&params, Vec2::new(1.7, 0.0));
        assert_convex(&beyond);
    }

    #[test]
    fn test_radial_targets() {
        let params = BlendParams {
            strategy: BlendStrategy::Radial,
            ..Default::default()
        };
        let center = target_weights(&params, Vec2::ZERO);
        assert!(center.cube > 0.99);

        let right = target_weights(&params, Vec2::new(1.0, 0.0));
        assert!(right.spiral > 0.99);

        let left = target_weights(&params, Vec2::new(-1.0, 0.0));
        assert!(left.sphere > 0.99);

        for x in -10..=10 {
            for y in -10..=10 {
                let p = Vec2::new(x as f32 / 10.0, y as f32 / 10.0);
                assert_convex(&target_weights(&params, p));
            }
        }
    }

    #[test]
    fn test_normalized_falls_back_on_zero() {
        let zero = BlendWeights {
            sphere: 0.0,
            cube: 0.0,
            spiral: 0.0,
        };
        assert_eq!(zero.normalized(BlendWeights::SPHERE), BlendWeights::SPHERE);

        let nan = BlendWeights {
            sphere: f32::NAN,
            cube: 2.0,
            spiral: -1.0,
        };
        assert_eq!(nan.normalized(BlendWeights::SPHERE), BlendWeights::CUBE);
    }

    #[test]
    fn test_first_update_snaps() {
        let mut state = BlendState::new();
        let w = state.update(&BlendParams::default(), Vec2::new(0.5, 0.0));
        assert!((w.cube - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_is_gradual() {
        let params = BlendParams::default();
        let mut state = BlendState::new();
        state.update(&params, Vec2::new(1.0, 0.0));
        assert!(state.weights().sphere > 0.99);

        // One frame after a jump to the center only moves by the morph rate
        let w = state.update(&params, Vec2::ZERO);
        assert!((w.cube - params.morph_rate).abs() < 1e-5);

        for _ in 0..300 {
            let w = state.update(&params, Vec2::ZERO);
            assert_convex(&w);
        }
        assert!(state.weights().cube > 0.99);
    }

    #[test]
    fn test_definiteness() {
        let w = BlendWeights {
            sphere: 0.2,
            cube: 0.5,
            spiral: 0.3,
        };
        assert_eq!(w.definiteness(), 0.5);
    }
}
