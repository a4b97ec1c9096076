use std::{fs, path::Path};

use anyhow::Context;
use glam::Mat4;

use super::{AttributeLocation, MatrixUniform, ProgramId, RenderBackend};

pub(crate) const POSITION_LOCATION: AttributeLocation = AttributeLocation(0);
pub(crate) const TEX_COORDINATE_LOCATION: AttributeLocation = AttributeLocation(1);

/// Source text of a vertex/fragment shader pair
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn read(vertex_path: impl AsRef<Path>, fragment_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let read = |path: &Path| {
            fs::read_to_string(path)
                .with_context(|| format!("Unable to read shader source {}", path.display()))
        };

        Ok(Self {
            vertex: read(vertex_path.as_ref())?,
            fragment: read(fragment_path.as_ref())?,
        })
    }
}

/// A linked textured program & the uniforms/attributes the scene talks to
///
/// Vertex inputs live at fixed locations: 0 for the 2D position & 1 for the
/// 2D texture coordinate
#[derive(Debug)]
pub struct ShaderProgram {
    id: ProgramId,
}

impl ShaderProgram {
    /// Reads, compiles & links the two shader stages
    ///
    /// Must be called before any matrix setter or draw
    pub fn load(
        backend: &mut impl RenderBackend,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());
        let sources = ShaderSources::read(vertex_path, fragment_path)?;
        let id = backend.create_program(&sources).with_context(|| {
            format!(
                "Unable to build shader program from {} & {}",
                vertex_path.display(),
                fragment_path.display()
            )
        })?;

        log::info!(
            "Loaded shader program {id:?} ({}, {})",
            vertex_path.display(),
            fragment_path.display()
        );
        Ok(Self { id })
    }

    pub fn set_projection_matrix(&self, backend: &mut impl RenderBackend, matrix: Mat4) {
        backend.set_uniform_matrix(MatrixUniform::Projection, matrix);
    }

    pub fn set_view_matrix(&self, backend: &mut impl RenderBackend, matrix: Mat4) {
        backend.set_uniform_matrix(MatrixUniform::View, matrix);
    }

    pub fn set_model_matrix(&self, backend: &mut impl RenderBackend, matrix: Mat4) {
        backend.set_uniform_matrix(MatrixUniform::Model, matrix);
    }

    pub fn position_attribute(&self) -> AttributeLocation {
        POSITION_LOCATION
    }

    pub fn tex_coordinate_attribute(&self) -> AttributeLocation {
        TEX_COORDINATE_LOCATION
    }

    pub fn program_id(&self) -> ProgramId {
        self.id
    }

    pub fn release(&self, backend: &mut impl RenderBackend) {
        backend.delete_program(self.id);
    }
}
