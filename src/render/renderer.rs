use std::{collections::HashMap, num::NonZeroU64, ops::Range};

use anyhow::Context;
use glam::Mat4;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindingResource, Buffer, BufferBinding,
    BufferDescriptor, BufferUsages, Color, Device, DeviceDescriptor, ErrorFilter, Instance,
    LoadOp, Operations, PresentMode, Queue, RenderPassColorAttachment, RenderPassDescriptor,
    RenderPipeline, RequestAdapterOptions, ShaderModuleDescriptor, ShaderSource, StoreOp,
    Surface, SurfaceConfiguration, SurfaceError, SurfaceTarget,
    util::{BufferInitDescriptor, DeviceExt},
};

use super::{
    AttributeLocation, MatrixUniform, ProgramId, RenderBackend, ShaderSources, TextureId,
    pipeline::{self, CAMERA_GROUP, Layouts, MATRIX_SIZE, MODEL_GROUP, TEXTURE_GROUP},
    shader::{POSITION_LOCATION, TEX_COORDINATE_LOCATION},
    texture::Texture,
    vertex::Vertex,
};

const MAX_VERTICES: usize = 4096;
const MAX_DRAWS: usize = 256;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// Client-side float stream bound to an attribute location
struct Stream {
    components: usize,
    data: Vec<f32>,
    enabled: bool,
}

impl Stream {
    fn len(&self) -> u32 {
        (self.data.len() / self.components.max(1)) as u32
    }

    fn vec2(&self, index: u32) -> [f32; 2] {
        let at = index as usize * self.components;
        [self.data[at], self.data[at + 1]]
    }
}

struct DrawCommand {
    texture: TextureId,
    model_slot: u32,
    vertices: Range<u32>,
}

/// Everything recorded between two presents
#[derive(Default)]
struct FrameCommands {
    clear: bool,
    vertices: Vec<Vertex>,
    models: Vec<Mat4>,
    draws: Vec<DrawCommand>,
}

impl FrameCommands {
    fn reset(&mut self) {
        self.clear = false;
        self.vertices.clear();
        self.models.clear();
        self.draws.clear();
    }
}

struct RenderTarget {
    surface: Surface<'static>,
    config: SurfaceConfiguration,
}

struct Gpu {
    device: Device,
    queue: Queue,
}

/// [`RenderBackend`] built on `wgpu`
///
/// Draw calls are recorded into a per-frame command list: enabled attribute streams are
/// interleaved into a shared vertex buffer, model matrices take a slot in a dynamic-offset
/// uniform buffer. [`RenderBackend::present`] replays the list in one render pass
pub struct Renderer {
    gpu: Gpu,
    target: RenderTarget,
    layouts: Layouts,
    programs: Vec<Option<RenderPipeline>>,
    current_program: Option<ProgramId>,
    textures: Vec<Option<Texture>>,
    camera: CameraUniform,
    camera_buffer: Buffer,
    camera_bind_group: BindGroup,
    model_buffer: Buffer,
    model_bind_group: BindGroup,
    model_stride: u64,
    vertex_buffer: Buffer,
    clear_color: Color,
    streams: HashMap<AttributeLocation, Stream>,
    bound_texture: Option<TextureId>,
    model: Mat4,
    frame: FrameCommands,
}

impl Renderer {
    /// Creates a `Renderer` presenting to `window`
    ///
    /// Requests an adapter able to present to the surface, a device, & sets up the
    /// camera/model uniforms & the shared vertex buffer. No program exists until
    /// [`RenderBackend::create_program`] is called
    pub async fn new(
        width: u32,
        height: u32,
        vsync: bool,
        window: impl Into<SurfaceTarget<'static>>,
    ) -> anyhow::Result<Self> {
        let instance = Instance::default();
        let surface = instance
            .create_surface(window)
            .context("Unable to create a surface for the window")?;
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                // Force find adapter that can present to this surface
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("No graphics adapter can present to the window")?;
        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("twirl device"),
                ..Default::default()
            })
            .await
            .context("Unable to open the graphics device")?;
        log::info!("Using adapter {:?}", adapter.get_info());

        // Surfaces can't be configured with a zero extent
        let (w, h) = (width.max(1), height.max(1));
        let mut config = surface
            .get_default_config(&adapter, w, h)
            .context("The window surface is not supported by the adapter")?;
        config.present_mode = if vsync {
            PresentMode::AutoVsync
        } else {
            PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        let layouts = Layouts::new(&device);

        let camera = CameraUniform::default();
        let camera_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::bytes_of(&camera),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &layouts.camera,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let model_stride = MATRIX_SIZE.div_ceil(alignment) * alignment;
        let model_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Model Buffer"),
            size: model_stride * MAX_DRAWS as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &layouts.model,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: BindingResource::Buffer(BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: NonZeroU64::new(MATRIX_SIZE),
                }),
            }],
        });

        let vertex_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("Vertex Buffer"),
            size: (MAX_VERTICES * size_of::<Vertex>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Renderer {
            gpu: Gpu { device, queue },
            target: RenderTarget { surface, config },
            layouts,
            programs: Vec::new(),
            current_program: None,
            textures: Vec::new(),
            camera,
            camera_buffer,
            camera_bind_group,
            model_buffer,
            model_bind_group,
            model_stride,
            vertex_buffer,
            clear_color: Color::BLACK,
            streams: HashMap::new(),
            bound_texture: None,
            model: Mat4::IDENTITY,
            frame: FrameCommands::default(),
        })
    }

    /// Reconfigures the surface for a new window size
    pub fn resize(&mut self, w: u32, h: u32) {
        if w == 0 || h == 0 {
            return;
        }
        (self.target.config.width, self.target.config.height) = (w, h);
        self.target
            .surface
            .configure(&self.gpu.device, &self.target.config);
    }

    fn upload_camera(&self) {
        self.gpu
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&self.camera));
    }

    fn upload_models(&self) {
        if self.frame.models.is_empty() {
            return;
        }

        let stride = self.model_stride as usize;
        let mut data = vec![0u8; stride * self.frame.models.len()];
        for (slot, model) in self.frame.models.iter().enumerate() {
            let cols = model.to_cols_array();
            let bytes: &[u8] = bytemuck::cast_slice(&cols);
            data[slot * stride..slot * stride + bytes.len()].copy_from_slice(bytes);
        }
        self.gpu.queue.write_buffer(&self.model_buffer, 0, &data);
    }
}

impl RenderBackend for Renderer {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        let id = TextureId(self.textures.len());
        self.textures.push(Some(Texture::from_bytes(
            &self.gpu.device,
            &self.gpu.queue,
            &self.layouts.texture,
            rgba,
            width,
            height,
        )));
        id
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if let Some(slot) = self.textures.get_mut(texture.0) {
            *slot = None;
        }
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }

    fn create_program(&mut self, sources: &ShaderSources) -> anyhow::Result<ProgramId> {
        let device = &self.gpu.device;

        device.push_error_scope(ErrorFilter::Validation);
        let vertex = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Vertex Shader"),
            source: ShaderSource::Wgsl(sources.vertex.as_str().into()),
        });
        let fragment = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("Fragment Shader"),
            source: ShaderSource::Wgsl(sources.fragment.as_str().into()),
        });
        let pipeline = pipeline::create_textured_pipeline(
            device,
            self.target.config.format,
            &self.layouts,
            &vertex,
            &fragment,
        );

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            anyhow::bail!("Shader program failed to compile or link: {err}");
        }

        let id = ProgramId(self.programs.len());
        self.programs.push(Some(pipeline));
        Ok(id)
    }

    fn delete_program(&mut self, program: ProgramId) {
        if let Some(slot) = self.programs.get_mut(program.0) {
            *slot = None;
        }
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
    }

    fn set_uniform_matrix(&mut self, uniform: MatrixUniform, matrix: Mat4) {
        match uniform {
            MatrixUniform::Projection => {
                self.camera.projection = matrix.to_cols_array_2d();
                self.upload_camera();
            }
            MatrixUniform::View => {
                self.camera.view = matrix.to_cols_array_2d();
                self.upload_camera();
            }
            // Takes a uniform slot once a draw uses it
            MatrixUniform::Model => self.model = matrix,
        }
    }

    fn set_clear_color(&mut self, color: [f64; 4]) {
        self.clear_color = Color {
            r: color[0],
            g: color[1],
            b: color[2],
            a: color[3],
        };
    }

    fn clear(&mut self) {
        self.frame.clear = true;
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.bound_texture = Some(texture);
    }

    fn vertex_attrib_pointer(&mut self, location: AttributeLocation, components: usize, data: &[f32]) {
        let stream = self.streams.entry(location).or_insert(Stream {
            components,
            data: Vec::new(),
            enabled: false,
        });
        stream.components = components;
        stream.data.clear();
        stream.data.extend_from_slice(data);
    }

    fn enable_vertex_attrib_array(&mut self, location: AttributeLocation) {
        if let Some(stream) = self.streams.get_mut(&location) {
            stream.enabled = true;
        }
    }

    fn disable_vertex_attrib_array(&mut self, location: AttributeLocation) {
        if let Some(stream) = self.streams.get_mut(&location) {
            stream.enabled = false;
        }
    }

    fn draw_triangles(&mut self, first: u32, count: u32) {
        let Some(texture) = self.bound_texture else {
            log::warn!("Draw without a bound texture skipped");
            return;
        };

        let enabled = |location: AttributeLocation| {
            self.streams
                .get(&location)
                .filter(|s| s.enabled && s.components >= 2)
        };
        let (Some(position), Some(tex_coords)) =
            (enabled(POSITION_LOCATION), enabled(TEX_COORDINATE_LOCATION))
        else {
            log::warn!("Draw with a disabled attribute stream skipped");
            return;
        };

        let available = position.len().min(tex_coords.len());
        let end = first.saturating_add(count).min(available);
        let range = first.min(end)..end;
        if range.len() < count as usize {
            log::warn!(
                "Draw of {count} vertices reads past the bound streams; clamped to {}",
                range.len()
            );
        }

        if self.frame.draws.len() >= MAX_DRAWS
            || self.frame.vertices.len() + range.len() > MAX_VERTICES
        {
            log::warn!("Frame draw capacity exceeded; draw skipped");
            return;
        }

        let start = self.frame.vertices.len() as u32;
        self.frame.vertices.extend(
            range
                .clone()
                .map(|i| Vertex::new(position.vec2(i), tex_coords.vec2(i))),
        );
        let model_slot = self.frame.models.len() as u32;
        self.frame.models.push(self.model);
        self.frame.draws.push(DrawCommand {
            texture,
            model_slot,
            vertices: start..start + range.len() as u32,
        });
    }

    fn present(&mut self) {
        let surface_texture = match self.target.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.target
                    .surface
                    .configure(&self.gpu.device, &self.target.config);
                self.frame.reset();
                return;
            }
            Err(SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory; frame dropped");
                self.frame.reset();
                return;
            }
            Err(err) => {
                log::warn!("Frame skipped: {err}");
                self.frame.reset();
                return;
            }
        };

        let view = surface_texture.texture.create_view(&Default::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&Default::default());

        if !self.frame.vertices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.frame.vertices),
            );
        }
        self.upload_models();

        {
            let mut r_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: if self.frame.clear {
                            LoadOp::Clear(self.clear_color)
                        } else {
                            LoadOp::Load
                        },
                        store: StoreOp::Store,
                    },
                })],
                ..Default::default()
            });

            let pipeline = self
                .current_program
                .and_then(|id| self.programs.get(id.0))
                .and_then(Option::as_ref);

            match pipeline {
                Some(pipeline) => {
                    r_pass.set_pipeline(pipeline);
                    r_pass.set_bind_group(CAMERA_GROUP, &self.camera_bind_group, &[]);
                    r_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

                    for draw in &self.frame.draws {
                        let Some(texture) = self.textures.get(draw.texture.0).and_then(Option::as_ref)
                        else {
                            log::warn!("Draw with released texture {:?} skipped", draw.texture);
                            continue;
                        };
                        texture.bind(&mut r_pass, TEXTURE_GROUP);

                        let offset = (draw.model_slot as u64 * self.model_stride) as u32;
                        r_pass.set_bind_group(MODEL_GROUP, &self.model_bind_group, &[offset]);
                        r_pass.draw(draw.vertices.clone(), 0..1);
                    }
                }
                None if !self.frame.draws.is_empty() => {
                    log::warn!("No shader program in use; {} draws skipped", self.frame.draws.len());
                }
                None => {}
            }
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        surface_texture.present();

        self.frame.reset();
    }
}
