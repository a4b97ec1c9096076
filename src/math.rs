pub use glam::{Mat4, Vec3, vec3};

/// Post-multiplies `m` by a translation, so the translation applies after anything already in `m`
/// is applied to the geometry: `m · T(v)`
pub fn translate(m: Mat4, v: Vec3) -> Mat4 {
    m * Mat4::from_translation(v)
}

/// Post-multiplies `m` by a rotation of `angle` radians about `axis`: `m · R(angle, axis)`
pub fn rotate(m: Mat4, angle: f32, axis: Vec3) -> Mat4 {
    m * Mat4::from_axis_angle(axis.normalize(), angle)
}

/// Orthographic projection box in world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    /// Right-handed orthographic matrix mapping depth into wgpu's `0..1` clip range
    pub fn matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}
