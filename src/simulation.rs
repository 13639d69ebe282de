//! One running background instance.
//!
//! A [`Simulation`] exclusively owns its objects and all cross-frame state
//! (blend weights, pointer, camera, clock, theme). Nothing is shared between
//! instances, so two backgrounds can coexist without interfering.

use glam::{Vec2, Vec3};
use tracing::{debug, info};

use crate::blend::{target_weights, BlendParams, BlendState, BlendWeights};
use crate::camera::Camera;
use crate::config::BackgroundConfig;
use crate::field::{Field, FieldParams, SimulationObject};
use crate::input::Pointer;
use crate::shapes::ShapeParams;
use crate::theme::{Theme, ThemeStyle};
use crate::time::Time;
use crate::update::{pose_field, update_field, FrameContext, UpdateParams};

/// Depth (in [0, 1] clip space) of the world point under the pointer.
const POINTER_DEPTH: f32 = 0.75;

/// Shape-morphing cube field.
pub struct Simulation {
    field: Field,
    field_params: FieldParams,
    shapes: ShapeParams,
    blend_params: BlendParams,
    blend: BlendState,
    update: UpdateParams,
    pointer: Pointer,
    camera: Camera,
    time: Time,
    style: ThemeStyle,
}

impl Simulation {
    /// Allocate a field for a viewport of `width` x `height` pixels.
    pub fn new(config: &BackgroundConfig, width: u32, height: u32) -> Self {
        let camera = Camera::new(width, height);
        let field_params = config.field_params();
        let field = Field::spawn(&field_params, config.seed, camera.orbit.depth);

        let mut pointer = Pointer::new(config.pointer_smoothing);
        pointer.set_window_size(width, height);

        info!(
            objects = field.len(),
            theme = %config.theme,
            strategy = ?config.blend.strategy,
            "simulation created"
        );

        let mut sim = Self {
            field,
            field_params,
            shapes: config.shape_params(),
            blend_params: config.blend_params(),
            blend: BlendState::new(),
            update: config.update_params(),
            pointer,
            camera,
            time: Time::new(config.time_step),
            style: ThemeStyle::for_theme(config.theme),
        };

        // Objects are visible before the first step: place them where the
        // first frame's weights put them, keeping their initial progress.
        let weights = target_weights(&sim.blend_params, sim.pointer.smoothed());
        sim.apply(0.0, weights, false);
        sim
    }

    /// Advance one frame: clock, blend, camera, every object, then pointer
    /// smoothing.
    pub fn step(&mut self) -> BlendWeights {
        let time = self.time.tick();
        let weights = self.blend.update(&self.blend_params, self.pointer.smoothed());
        self.apply(time, weights, true);
        self.pointer.advance();
        weights
    }

    /// Move the camera for `time` and pose every object. `advance` also
    /// steps join progress.
    fn apply(&mut self, time: f32, weights: BlendWeights, advance: bool) {
        let pointer = self.pointer.smoothed();
        self.camera.follow(time, pointer);
        let pointer_world = self
            .camera
            .unproject(Vec3::new(pointer.x, pointer.y, POINTER_DEPTH));

        let ctx = FrameContext {
            time,
            weights,
            pointer_world,
            camera_position: self.camera.position,
            object_count: self.field_params.count,
            shapes: &self.shapes,
            field: &self.field_params,
            style: &self.style,
        };
        if advance {
            update_field(&mut self.field, &ctx, &self.update);
        } else {
            pose_field(&mut self.field, &ctx, &self.update);
        }
    }

    /// Track a new viewport size. Objects are left untouched.
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "viewport resized");
        self.camera.set_viewport(width, height);
        self.pointer.set_window_size(width, height);
    }

    /// Swap palette and material for `theme` without reallocating objects.
    pub fn set_theme(&mut self, theme: Theme) {
        if theme != self.style.theme {
            info!(%theme, "theme changed");
            self.style = ThemeStyle::for_theme(theme);
        }
    }

    pub fn theme(&self) -> Theme {
        self.style.theme
    }

    pub fn style(&self) -> &ThemeStyle {
        &self.style
    }

    /// Blend weights from the most recent frame.
    pub fn weights(&self) -> BlendWeights {
        self.blend.weights()
    }

    pub fn objects(&self) -> &[SimulationObject] {
        self.field.objects()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut Pointer {
        &mut self.pointer
    }

    /// Convenience for hosts that already have normalized coordinates.
    pub fn set_pointer_ndc(&mut self, ndc: Vec2) {
        self.pointer.set_ndc(ndc);
    }
}
