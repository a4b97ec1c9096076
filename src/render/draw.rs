use glam::Mat4;

use super::{
    RenderBackend, ShaderProgram, TextureId,
    primitives::{Geometry, RECTANGLE, TRIANGLE},
};
use crate::scene::Scene;

/// Draws one textured sprite
///
/// Uploads the model matrix, binds the texture, wires both attribute streams,
/// draws the geometry as a triangle list & unwires the streams again
pub fn draw_object(
    backend: &mut impl RenderBackend,
    shader: &ShaderProgram,
    model_matrix: Mat4,
    texture: TextureId,
    geometry: &Geometry,
) {
    shader.set_model_matrix(backend, model_matrix);
    backend.bind_texture(texture);

    let position = shader.position_attribute();
    let tex_coordinate = shader.tex_coordinate_attribute();

    backend.vertex_attrib_pointer(position, 2, geometry.positions);
    backend.enable_vertex_attrib_array(position);

    backend.vertex_attrib_pointer(tex_coordinate, 2, geometry.tex_coords);
    backend.enable_vertex_attrib_array(tex_coordinate);

    backend.draw_triangles(0, geometry.vertex_count());

    backend.disable_vertex_attrib_array(position);
    backend.disable_vertex_attrib_array(tex_coordinate);
}

/// Clears the frame, draws the triangle then the rectangle, & presents
pub fn draw_scene(backend: &mut impl RenderBackend, shader: &ShaderProgram, scene: &Scene) {
    backend.clear();

    draw_object(
        backend,
        shader,
        scene.triangle_matrix,
        scene.triangle_texture,
        &TRIANGLE,
    );
    draw_object(
        backend,
        shader,
        scene.rectangle_matrix,
        scene.rectangle_texture,
        &RECTANGLE,
    );

    backend.present();
}
