//! Call-recording [`RenderBackend`] used by unit tests

use glam::Mat4;

use super::{
    AttributeLocation, MatrixUniform, ProgramId, RenderBackend, ShaderSources, TextureId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateTexture { width: u32, height: u32, bytes: usize },
    DeleteTexture(TextureId),
    CreateProgram(ProgramId),
    DeleteProgram(ProgramId),
    UseProgram(ProgramId),
    SetMatrix(MatrixUniform, Mat4),
    SetClearColor([f64; 4]),
    Clear,
    BindTexture(TextureId),
    AttribPointer(AttributeLocation, usize, Vec<f32>),
    Enable(AttributeLocation),
    Disable(AttributeLocation),
    DrawTriangles { first: u32, count: u32 },
    Present,
}

#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub programs: Vec<ShaderSources>,
    pub textures: Vec<Vec<u8>>,
    pub fail_programs: bool,
}

impl RecordingBackend {
    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    pub fn position(&self, f: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls.iter().position(f)
    }
}

impl RenderBackend for RecordingBackend {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        self.calls.push(Call::CreateTexture {
            width,
            height,
            bytes: rgba.len(),
        });
        self.textures.push(rgba.to_vec());
        TextureId(self.textures.len() - 1)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.calls.push(Call::DeleteTexture(texture));
    }

    fn create_program(&mut self, sources: &ShaderSources) -> anyhow::Result<ProgramId> {
        if self.fail_programs {
            anyhow::bail!("link failed");
        }
        let id = ProgramId(self.programs.len());
        self.programs.push(sources.clone());
        self.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.calls.push(Call::DeleteProgram(program));
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(Call::UseProgram(program));
    }

    fn set_uniform_matrix(&mut self, uniform: MatrixUniform, matrix: Mat4) {
        self.calls.push(Call::SetMatrix(uniform, matrix));
    }

    fn set_clear_color(&mut self, color: [f64; 4]) {
        self.calls.push(Call::SetClearColor(color));
    }

    fn clear(&mut self) {
        self.calls.push(Call::Clear);
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.calls.push(Call::BindTexture(texture));
    }

    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, components: usize, data: &[f32]) {
        self.calls
            .push(Call::AttribPointer(location, components, data.to_vec()));
    }

    fn enable_vertex_attrib_array(&mut self, location: AttributeLocation) {
        self.calls.push(Call::Enable(location));
    }

    fn disable_vertex_attrib_array(&mut self, location: AttributeLocation) {
        self.calls.push(Call::Disable(location));
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        self.calls.push(Call::DrawTriangles { first, count });
    }

    fn present(&mut self) {
        self.calls.push(Call::Present);
    }
}

/// Lets a test keep inspecting a backend after handing it to an owner that drops it
impl<B: RenderBackend> RenderBackend for &mut B {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        (**self).create_texture(width, height, rgba)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        (**self).delete_texture(texture)
    }

    fn create_program(&mut self, sources: &ShaderSources) -> anyhow::Result<ProgramId> {
        (**self).create_program(sources)
    }

    fn delete_program(&mut self, program: ProgramId) {
        (**self).delete_program(program)
    }

    fn use_program(&mut self, program: ProgramId) {
        (**self).use_program(program)
    }

    fn set_uniform_matrix(&mut self, uniform: MatrixUniform, matrix: Mat4) {
        (**self).set_uniform_matrix(uniform, matrix)
    }

    fn set_clear_color(&mut self, color: [f64; 4]) {
        (**self).set_clear_color(color)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn bind_texture(&mut self, texture: TextureId) {
        (**self).bind_texture(texture)
    }

    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, components: usize, data: &[f32]) {
        (**self).vertex_attrib_pointer(location, components, data)
    }

    fn enable_vertex_attrib_array(&mut self, location: AttributeLocation) {
        (**self).enable_vertex_attrib_array(location)
    }

    fn disable_vertex_attrib_array(&mut self, location: AttributeLocation) {
        (**self).disable_vertex_attrib_array(location)
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        (**self).draw_triangles(first, count)
    }

    fn present(&mut self) {
        (**self).present()
    }
}
