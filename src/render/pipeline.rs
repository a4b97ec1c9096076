use std::num::NonZeroU64;

use wgpu::{
    BindGroupLayout, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, BlendComponent,
    BlendFactor, BlendOperation, BlendState, BufferBindingType, ColorTargetState, ColorWrites,
    Device, FragmentState, PipelineLayoutDescriptor, RenderPipeline, RenderPipelineDescriptor,
    SamplerBindingType, ShaderModule, ShaderStages, TextureFormat, TextureSampleType,
    TextureViewDimension, VertexState,
};

use super::vertex::Vertex;

/// Bind group slots of the textured pipeline
pub const TEXTURE_GROUP: u32 = 0;
pub const CAMERA_GROUP: u32 = 1;
pub const MODEL_GROUP: u32 = 2;

/// Size of one `mat4x4<f32>` uniform
pub const MATRIX_SIZE: u64 = 64;

/// Source alpha over one-minus-source alpha, on color & alpha alike
const ALPHA_OVER: BlendComponent = BlendComponent {
    src_factor: BlendFactor::SrcAlpha,
    dst_factor: BlendFactor::OneMinusSrcAlpha,
    operation: BlendOperation::Add,
};

/// Bind group layouts shared by every textured program
///
/// - Texture layout: 2D texture & sampler (fragment shader)
/// - Camera layout: projection & view matrices (vertex shader)
/// - Model layout: per-draw model matrix at a dynamic offset (vertex shader)
pub struct Layouts {
    pub texture: BindGroupLayout,
    pub camera: BindGroupLayout,
    pub model: BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &Device) -> Self {
        Self {
            texture: create_texture_bind_group_layout(device),
            camera: create_uniform_layout(device, "Camera Bind Group Layout", false, None),
            model: create_uniform_layout(
                device,
                "Model Bind Group Layout",
                true,
                NonZeroU64::new(MATRIX_SIZE),
            ),
        }
    }
}

/// Creates the bind group layout for texture sampling
///
/// Defines two bindings:
/// - Binding 0: 2D texture (fragment shader)
/// - Binding 1: Sampler (fragment shader)
fn create_texture_bind_group_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Texture Bind Group Layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

fn create_uniform_layout(
    device: &Device,
    label: &str,
    has_dynamic_offset: bool,
    min_binding_size: Option<NonZeroU64>,
) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset,
                min_binding_size,
            },
            count: None,
        }],
    })
}

/// Creates the textured sprite pipeline from separately compiled stages
///
/// Configured with:
/// - Alpha blending for transparency
/// - Triangle list topology, no culling, no depth
/// - `Vertex` buffer layout from the vertex module
pub fn create_textured_pipeline(
    device: &Device,
    surface_format: TextureFormat,
    layouts: &Layouts,
    vertex: &ShaderModule,
    fragment: &ShaderModule,
) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Textured Pipeline Layout"),
        bind_group_layouts: &[&layouts.texture, &layouts.camera, &layouts.model],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Textured Pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: vertex,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        primitive: Default::default(),
        depth_stencil: None,
        multisample: Default::default(),
        fragment: Some(FragmentState {
            module: fragment,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(BlendState {
                    color: ALPHA_OVER,
                    alpha: ALPHA_OVER,
                }),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}
