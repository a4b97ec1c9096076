use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3, vec3};

use crate::{
    math::{rotate, translate},
    render::TextureId,
};

/// The triangle reverses once it travels past this distance from the origin
pub const BOUNCE_LIMIT: f32 = 3.0;
/// Triangle speed in world units per second
pub const TRIANGLE_SPEED: f32 = 1.0;
/// Horizontal gap between the triangle & the rectangle chasing it
pub const FOLLOW_OFFSET: f32 = 1.5;
/// Rectangle spin in radians per second
pub const ROTATION_RATE: f32 = FRAC_PI_2;

/// Animation state & model matrices of the two sprites
#[derive(Debug, Clone)]
pub struct Scene {
    pub triangle_matrix: Mat4,
    pub rectangle_matrix: Mat4,
    pub triangle_x: f32,
    pub triangle_speed: f32,
    /// Accumulated spin in radians; grows without wrapping
    pub rotation_angle: f32,
    pub triangle_texture: TextureId,
    pub rectangle_texture: TextureId,
}

impl Scene {
    pub fn new(triangle_texture: TextureId, rectangle_texture: TextureId) -> Self {
        Self {
            triangle_matrix: Mat4::IDENTITY,
            rectangle_matrix: Mat4::IDENTITY,
            triangle_x: 0.0,
            triangle_speed: TRIANGLE_SPEED,
            rotation_angle: 0.0,
            triangle_texture,
            rectangle_texture,
        }
    }

    /// Advances the animation by `delta` seconds & rebuilds both model matrices
    ///
    /// Leaving the bounce interval only flips the direction; the position is not clamped,
    /// so the triangle may sit past the limit for a single frame
    pub fn update(&mut self, delta: f32) {
        self.triangle_x += self.triangle_speed * delta;
        if self.triangle_x > BOUNCE_LIMIT || self.triangle_x < -BOUNCE_LIMIT {
            self.triangle_speed = -self.triangle_speed;
            log::trace!("triangle bounced at x = {}", self.triangle_x);
        }

        self.rotation_angle += ROTATION_RATE * delta;

        self.triangle_matrix = translate(Mat4::IDENTITY, vec3(self.triangle_x, 0.0, 0.0));

        self.rectangle_matrix = translate(
            Mat4::IDENTITY,
            vec3(self.triangle_x + FOLLOW_OFFSET, 0.0, 0.0),
        );
        self.rectangle_matrix = rotate(self.rectangle_matrix, self.rotation_angle, Vec3::Z);
    }

    pub fn rectangle_translation(&self) -> Vec3 {
        self.rectangle_matrix.w_axis.truncate()
    }
}
