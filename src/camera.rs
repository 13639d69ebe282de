//! Camera for the orbiting background view.
//!
//! The camera holds no velocity: its position is recomputed every frame
//! from elapsed time and the smoothed pointer.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Orbit amplitudes and speeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    /// Horizontal swing in world units.
    pub radius_x: f32,
    /// Vertical swing in world units.
    pub radius_y: f32,
    pub speed_x: f32,
    pub speed_y: f32,
    /// Fixed depth of the camera.
    pub depth: f32,
    /// World-space offset per unit of pointer NDC.
    pub pointer_influence: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            radius_x: 60.0,
            radius_y: 40.0,
            speed_x: 0.2,
            speed_y: 0.15,
            depth: 60.0,
            pointer_influence: 8.0,
        }
    }
}

/// Perspective camera that orbits the origin.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub orbit: Orbit,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            fov_y: 60.0_f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 2000.0,
            orbit: Orbit::default(),
        };
        camera.set_viewport(width, height);
        camera.follow(0.0, Vec2::ZERO);
        camera
    }

    /// Recompute the position for elapsed time `time` and pointer `pointer`.
    pub fn follow(&mut self, time: f32, pointer: Vec2) {
        let o = &self.orbit;
        self.position = Vec3::new(
            (time * o.speed_x).sin() * o.radius_x + pointer.x * o.pointer_influence,
            (time * o.speed_y).cos() * o.radius_y + pointer.y * o.pointer_influence,
            o.depth,
        );
    }

    /// Update the aspect ratio. Zero-sized viewports are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a point in normalized device coordinates (depth in [0, 1]) back
    /// to world space.
    pub fn unproject(&self, ndc: Vec3) -> Vec3 {
        let world = self.view_proj().inverse() * Vec4::new(ndc.x, ndc.y, ndc.z, 1.0);
        world.truncate() / world.w
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}
