//! # morphfield
//!
//! A procedural background of small translucent cubes that continuously
//! morph between a sphere, a cube lattice and a spiral. The pointer steers
//! the morph: near the center of the screen the field settles into the
//! lattice, toward the edges it relaxes into the sphere.
//!
//! ## Quick Start
//!
//! ```ignore
//! use morphfield::prelude::*;
//!
//! fn main() -> Result<(), BackgroundError> {
//!     Background::new()
//!         .with_theme(Theme::Dark)
//!         .with_object_count(512)
//!         .run()
//! }
//! ```
//!
//! ## Frame order
//!
//! Each frame a [`Simulation`] runs, in order:
//!
//! 1. advance the clock by a fixed step
//! 2. ease the blend weights toward the pointer-derived target
//! 3. move the camera along its orbit and unproject the pointer
//! 4. update every object (join, position, scale, opacity, color)
//! 5. smooth the pointer toward its latest raw position
//!
//! Step 5 runs after the objects, so the pointer a frame sees lags the
//! cursor by one smoothing step.
//!
//! ## Headless use
//!
//! [`Simulation`] does not touch the GPU. Drive it directly to embed the
//! motion in another renderer or to test it:
//!
//! ```ignore
//! let mut sim = Simulation::new(&BackgroundConfig::default(), 1280, 720);
//! sim.set_pointer_ndc(Vec2::ZERO);
//! for _ in 0..300 {
//!     sim.step();
//! }
//! let instances = build_instances(sim.objects(), sim.camera().position);
//! ```
//!
//! ## Configuration
//!
//! [`BackgroundConfig`] loads from TOML; every key is optional. See
//! [`config`] for the sections.

pub mod blend;
pub mod camera;
pub mod config;
pub mod error;
pub mod field;
mod gpu;
pub mod input;
pub mod lifecycle;
pub mod shader;
pub mod shapes;
mod simulation;
pub mod theme;
pub mod time;
pub mod update;
mod window;

pub use blend::{BlendParams, BlendState, BlendStrategy, BlendWeights};
pub use camera::Camera;
pub use config::BackgroundConfig;
pub use error::{BackgroundError, ConfigError, GpuError};
pub use field::{Field, FieldParams, SimulationObject, SpawnOrigin};
pub use glam::{Vec2, Vec3};
pub use lifecycle::{Lifecycle, MountState};
pub use shapes::{Shape, ShapeParams, ShapeTargets};
pub use simulation::Simulation;
pub use theme::{Theme, ThemeStyle};
pub use update::{OpacityRule, UpdateParams};
pub use window::Background;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use morphfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::blend::{BlendStrategy, BlendWeights};
    pub use crate::config::BackgroundConfig;
    pub use crate::error::BackgroundError;
    pub use crate::shader::build_instances;
    pub use crate::simulation::Simulation;
    pub use crate::theme::Theme;
    pub use crate::update::OpacityRule;
    pub use crate::window::Background;
    pub use crate::{Vec2, Vec3};
}
