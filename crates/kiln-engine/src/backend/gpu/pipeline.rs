use bytemuck::{Pod, Zeroable};

use crate::backend::{BlendEquation, BlendFactor, BlendState, ProgramHandle, Vertex};
use crate::coords::Mat4;
use crate::shader::{USER_UNIFORM_BINDING, USER_UNIFORM_SLOTS};

use super::texture::STORAGE_FORMAT;

/// Binding 0: projection and modulation color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct Globals {
    pub projection: [[f32; 4]; 4],
    pub color: [f32; 4],
}

pub(super) const GLOBALS_BYTES: u64 = std::mem::size_of::<Globals>() as u64;
pub(super) const USER_UNIFORM_BYTES: u64 = (USER_UNIFORM_SLOTS * 16) as u64;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

/// Clip-space y = -1 lands on memory row 0 and z moves from [-1, 1] to [0, 1].
pub(super) fn clip_adjust() -> Mat4 {
    Mat4::translation(0.0, 0.0, 0.5) * Mat4::scale(1.0, -1.0, 0.5)
}

/// One compiled WGSL stage and its entry point.
#[derive(Clone)]
pub(super) struct StageModule {
    pub module: wgpu::ShaderModule,
    pub entry: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub program: ProgramHandle,
    pub blend: Option<BlendState>,
    pub textured: bool,
}

pub(super) fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let uniform = |binding: u32, size: u64| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("kiln draw layout"),
        entries: &[
            uniform(0, GLOBALS_BYTES),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            uniform(USER_UNIFORM_BINDING, USER_UNIFORM_BYTES),
        ],
    })
}

pub(super) fn build(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    vertex: &StageModule,
    fragment: &StageModule,
    blend: Option<BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("kiln draw pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &vertex.module,
            entry_point: Some(&vertex.entry),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &VERTEX_ATTRIBUTES,
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment.module,
            entry_point: Some(&fragment.entry),
            targets: &[Some(wgpu::ColorTargetState {
                format: STORAGE_FORMAT,
                blend: blend.map(blend_state),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

pub(super) fn blend_state(state: BlendState) -> wgpu::BlendState {
    let operation = match state.equation {
        BlendEquation::Add => wgpu::BlendOperation::Add,
        BlendEquation::Subtract => wgpu::BlendOperation::Subtract,
        BlendEquation::ReverseSubtract => wgpu::BlendOperation::ReverseSubtract,
    };
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: factor(state.src_color),
            dst_factor: factor(state.dst_color),
            operation,
        },
        alpha: wgpu::BlendComponent {
            src_factor: factor(state.src_alpha),
            dst_factor: factor(state.dst_alpha),
            operation,
        },
    }
}

fn factor(f: BlendFactor) -> wgpu::BlendFactor {
    match f {
        BlendFactor::Zero => wgpu::BlendFactor::Zero,
        BlendFactor::One => wgpu::BlendFactor::One,
        BlendFactor::SrcColor => wgpu::BlendFactor::Src,
        BlendFactor::OneMinusSrcColor => wgpu::BlendFactor::OneMinusSrc,
        BlendFactor::DstColor => wgpu::BlendFactor::Dst,
        BlendFactor::OneMinusDstColor => wgpu::BlendFactor::OneMinusDst,
        BlendFactor::SrcAlpha => wgpu::BlendFactor::SrcAlpha,
        BlendFactor::OneMinusSrcAlpha => wgpu::BlendFactor::OneMinusSrcAlpha,
        BlendFactor::DstAlpha => wgpu::BlendFactor::DstAlpha,
        BlendFactor::OneMinusDstAlpha => wgpu::BlendFactor::OneMinusDstAlpha,
    }
}

/// Packs uniform slots into the program block.
pub(super) fn pack_uniforms<'a>(values: impl IntoIterator<Item = (u32, &'a [[u32; 4]])>) -> Vec<u8> {
    let mut block = vec![[0u32; 4]; USER_UNIFORM_SLOTS];
    for (location, slots) in values {
        for (i, slot) in slots.iter().enumerate() {
            if let Some(dst) = block.get_mut(location as usize + i) {
                *dst = *slot;
            }
        }
    }
    bytemuck::cast_slice(&block).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_adjust_flips_y_and_remaps_z() {
        let m = clip_adjust();
        assert_eq!(m.transform_point(0.5, -1.0, -1.0), [0.5, 1.0, 0.0, 1.0]);
        assert_eq!(m.transform_point(0.0, 1.0, 1.0), [0.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn globals_match_wgsl_layout() {
        assert_eq!(GLOBALS_BYTES, 80);
    }

    #[test]
    fn normal_blend_maps_factors() {
        let b = blend_state(BlendState::NORMAL);
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
        assert_eq!(b.alpha.operation, wgpu::BlendOperation::Add);
    }

    #[test]
    fn uniforms_land_in_their_slots() {
        let a = [[1, 2, 3, 4]];
        let m = [[5, 0, 0, 0], [6, 0, 0, 0]];
        let bytes = pack_uniforms([(0, &a[..]), (14, &m[..]), (15, &m[..])]);
        let words: &[u32] = bytemuck::cast_slice(&bytes);
        assert_eq!(words.len(), USER_UNIFORM_SLOTS * 4);
        assert_eq!(&words[..4], &[1, 2, 3, 4]);
        assert_eq!(words[14 * 4], 5);
        // Slots past the block are dropped.
        assert_eq!(words[15 * 4], 5);
    }
}
