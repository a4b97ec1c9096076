/// Local-space geometry for a sprite: interleaved `[x, y]` positions & matching `[u, v]` coords
///
/// Texture coordinates use the upper-left origin convention
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub positions: &'static [f32],
    pub tex_coords: &'static [f32],
}

impl Geometry {
    pub const fn vertex_count(&self) -> u32 {
        (self.positions.len() / 2) as u32
    }
}

pub const TRIANGLE: Geometry = Geometry {
    positions: &[
        0.0, 0.5, //
        -0.5, -0.5, //
        0.5, -0.5,
    ],
    tex_coords: &[
        0.5, 0.0, //
        0.0, 1.0, //
        1.0, 1.0,
    ],
};

/// Unit square centered on the origin, as two triangles
pub const RECTANGLE: Geometry = Geometry {
    positions: &[
        -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, //
        -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
    ],
    tex_coords: &[
        0.0, 1.0, 1.0, 1.0, 1.0, 0.0, //
        0.0, 1.0, 1.0, 0.0, 0.0, 0.0,
    ],
};
