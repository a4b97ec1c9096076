pub mod draw;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod vertex;

#[cfg(test)]
pub(crate) mod testing;

use glam::Mat4;

pub use renderer::Renderer;
pub use shader::{ShaderProgram, ShaderSources};

/// Opaque handle to a GPU-resident texture
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Opaque handle to a compiled & linked shader program
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub usize);

/// Shader input slot a per-vertex stream is bound to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeLocation(pub u32);

/// The matrix uniforms every textured program exposes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatrixUniform {
    Projection,
    View,
    Model,
}

/// Immediate-mode draw contract the scene renders against
///
/// Mirrors the classic bind-then-draw sequence: upload a model matrix, bind a texture,
/// point attribute locations at client-side float streams, enable them, draw, disable.
/// [`Renderer`] implements it on top of `wgpu`; tests implement it with a call recorder
pub trait RenderBackend {
    /// Uploads tightly packed RGBA8 pixels as a 2D texture with nearest filtering & no mipmaps
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId;
    fn delete_texture(&mut self, texture: TextureId);

    /// Compiles & links a vertex/fragment pair into an alpha-blended textured program
    fn create_program(&mut self, sources: &ShaderSources) -> anyhow::Result<ProgramId>;
    fn delete_program(&mut self, program: ProgramId);
    fn use_program(&mut self, program: ProgramId);
    fn set_uniform_matrix(&mut self, uniform: MatrixUniform, matrix: Mat4);

    fn set_clear_color(&mut self, color: [f64; 4]);
    /// Clears the color buffer of the frame being built
    fn clear(&mut self);

    fn bind_texture(&mut self, texture: TextureId);
    /// Points `location` at a stream of `components`-wide float vectors
    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, components: usize, data: &[f32]);
    fn enable_vertex_attrib_array(&mut self, location: AttributeLocation);
    fn disable_vertex_attrib_array(&mut self, location: AttributeLocation);
    /// Draws `count` vertices starting at `first` as a triangle list
    fn draw_triangles(&mut self, first: u32, count: u32);

    /// Presents the frame; may block on vsync
    fn present(&mut self);
}
