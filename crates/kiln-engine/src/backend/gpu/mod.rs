//! wgpu backend.
//!
//! Every texture is an RGBA8 wgpu texture, and so is the window framebuffer:
//! drawing always lands offscreen and [`Backend::present`] copies the window
//! texture to the swapchain. Each draw is its own queue submission, which
//! keeps per-draw uniforms written through the queue in order.

mod init;
mod pipeline;
mod present;
mod readback;
mod texture;

use std::collections::HashMap;

use anyhow::Context;
use winit::window::Window;

use crate::backend::{
    Backend, DrawState, Features, FramebufferHandle, PixelRegion, ProgramHandle, SamplerState,
    ShaderHandle, ShaderStage, TexelData, TextureHandle, Tier, UniformValue, Vertex,
};
use crate::coords::{Color, Mat4};
use crate::error::{Error, Result};
use crate::format::GpuFormat;
use crate::shader::reflect::{self, Reflection, UniformSlot};
use crate::shader::{DEFAULT_TEXTURED_SOURCE, DEFAULT_UNTEXTURED_SOURCE, DEFAULT_VERTEX_SOURCE, USER_UNIFORM_BINDING};

use init::SurfaceState;
use pipeline::{Globals, PipelineKey, StageModule, GLOBALS_BYTES, USER_UNIFORM_BYTES};
use present::PresentPass;
use texture::GpuTexture;

pub use init::{GpuInit, SurfaceErrorAction};

/// Capabilities every wgpu device provides to the renderer.
const FEATURES: Features = Features::NON_POWER_OF_TWO
    .union(Features::RENDER_TARGETS)
    .union(Features::BLEND_EQUATIONS)
    .union(Features::BLEND_FUNC_SEPARATE)
    .union(Features::CHANNEL_ORDERINGS)
    .union(Features::TEXTURE_READBACK)
    .union(Features::BASIC_SHADERS);

const INITIAL_STREAM_VERTICES: u64 = 6000;

/// Covers clip space; used for scissored clears.
const CLEAR_QUAD: [Vertex; 6] = [
    Vertex::new(-1.0, -1.0, 0.0, 0.0, 0.0),
    Vertex::new(1.0, -1.0, 0.0, 0.0, 0.0),
    Vertex::new(1.0, 1.0, 0.0, 0.0, 0.0),
    Vertex::new(-1.0, -1.0, 0.0, 0.0, 0.0),
    Vertex::new(1.0, 1.0, 0.0, 0.0, 0.0),
    Vertex::new(-1.0, 1.0, 0.0, 0.0, 0.0),
];

struct GpuShader {
    stage: ShaderStage,
    module: StageModule,
    reflection: Reflection,
}

struct GpuProgram {
    vertex: StageModule,
    fragment: StageModule,
    uniforms: Vec<UniformSlot>,
    values: HashMap<u32, UniformValue>,
    buffer: wgpu::Buffer,
}

/// Stages used when no program is active.
struct Builtins {
    vertex: StageModule,
    textured: StageModule,
    untextured: StageModule,
}

/// Growable vertex buffer rewritten before each use.
struct VertexStream {
    buffer: wgpu::Buffer,
    capacity: u64,
    label: &'static str,
}

impl VertexStream {
    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        let capacity = INITIAL_STREAM_VERTICES * std::mem::size_of::<Vertex>() as u64;
        Self {
            buffer: vertex_buffer(device, capacity, label),
            capacity,
            label,
        }
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[Vertex]) {
        let bytes: &[u8] = bytemuck::cast_slice(vertices);
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.buffer = vertex_buffer(device, self.capacity, self.label);
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

fn vertex_buffer(device: &wgpu::Device, size: u64, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn uniform_buffer(device: &wgpu::Device, size: u64, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn builtin_stage(device: &wgpu::Device, source: &'static str, entry: &str) -> StageModule {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("kiln builtin shader"),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    StageModule {
        module,
        entry: entry.to_string(),
    }
}

/// Clamps `region` to a `width`x`height` attachment; `None` when nothing is left.
fn clamp_region(region: PixelRegion, width: u32, height: u32) -> Option<PixelRegion> {
    let x0 = region.x.min(width);
    let y0 = region.y.min(height);
    let x1 = region.x.saturating_add(region.w).min(width);
    let y1 = region.y.saturating_add(region.h).min(height);
    let clamped = PixelRegion::new(x0, y0, x1 - x0, y1 - y0);
    (!clamped.is_empty()).then_some(clamped)
}

pub struct WgpuBackend<'w> {
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// `None` when headless.
    surface: Option<SurfaceState<'w>>,
    present: Option<PresentPass>,
    window: GpuTexture,

    textures: HashMap<TextureHandle, Option<GpuTexture>>,
    framebuffers: HashMap<FramebufferHandle, TextureHandle>,
    shaders: HashMap<ShaderHandle, GpuShader>,
    programs: HashMap<ProgramHandle, GpuProgram>,
    next_id: u32,

    bound_texture: Option<TextureHandle>,
    bound_framebuffer: FramebufferHandle,

    layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    samplers: HashMap<SamplerState, wgpu::Sampler>,
    builtins: Builtins,
    globals: wgpu::Buffer,
    no_uniforms: wgpu::Buffer,
    /// 1x1 white texture bound for untextured draws.
    blank: GpuTexture,

    client: VertexStream,
    streamed: VertexStream,
    streamed_count: u32,
}

impl<'w> WgpuBackend<'w> {
    /// Creates a backend presenting to `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> anyhow::Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = init::instance();
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;
        let (adapter, device, queue) = init::open_device(&instance, Some(&surface), &init).await?;
        let surface = SurfaceState::configure(surface, &adapter, &device, (size.width, size.height), &init)?;
        let present = PresentPass::new(&device, surface.config.format);

        log::info!(
            "WgpuBackend: {} ({:?}) {}x{} surface={:?}",
            adapter.get_info().name,
            adapter.get_info().backend,
            size.width,
            size.height,
            surface.config.format
        );
        Ok(Self::assemble(device, queue, Some(surface), Some(present), size.width, size.height))
    }

    fn assemble(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: Option<SurfaceState<'w>>,
        present: Option<PresentPass>,
        width: u32,
        height: u32,
    ) -> Self {
        let layout = pipeline::bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kiln draw pipeline layout"),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let builtins = Builtins {
            vertex: builtin_stage(&device, DEFAULT_VERTEX_SOURCE, "vs_main"),
            textured: builtin_stage(&device, DEFAULT_TEXTURED_SOURCE, "fs_main"),
            untextured: builtin_stage(&device, DEFAULT_UNTEXTURED_SOURCE, "fs_main"),
        };

        let blank = GpuTexture::new(&device, 1, 1, 1, false, "kiln blank");
        blank.write(&queue, 0, PixelRegion::from_size(1, 1), &[255; 4]);

        Self {
            window: GpuTexture::new(&device, width, height, 1, false, "kiln window"),
            globals: uniform_buffer(&device, GLOBALS_BYTES, "kiln globals"),
            no_uniforms: uniform_buffer(&device, USER_UNIFORM_BYTES, "kiln empty uniforms"),
            client: VertexStream::new(&device, "kiln client vertices"),
            streamed: VertexStream::new(&device, "kiln streamed vertices"),
            streamed_count: 0,
            blank,
            builtins,
            layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            samplers: HashMap::new(),
            textures: HashMap::new(),
            framebuffers: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            next_id: 1,
            bound_texture: None,
            bound_framebuffer: FramebufferHandle::WINDOW,
            surface,
            present,
            device,
            queue,
        }
    }

    /// Whether frames go to a swapchain.
    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    fn next_handle(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn storage(&self, texture: TextureHandle) -> Result<&GpuTexture> {
        match self.textures.get(&texture) {
            Some(Some(tex)) => Ok(tex),
            Some(None) => Err(Error::backend(format!("texture {} has no storage", texture.0))),
            None => Err(Error::backend(format!("unknown texture {}", texture.0))),
        }
    }

    fn attached_texture(&self) -> Option<TextureHandle> {
        self.framebuffers.get(&self.bound_framebuffer).copied()
    }

    /// Texture behind the bound framebuffer.
    fn attachment(&self) -> Result<&GpuTexture> {
        if self.bound_framebuffer.is_window() {
            return Ok(&self.window);
        }
        let texture = self
            .attached_texture()
            .ok_or_else(|| Error::backend("bound framebuffer was deleted"))?;
        self.storage(texture)
    }

    fn sampler(&mut self, state: SamplerState) -> wgpu::Sampler {
        self.samplers
            .entry(state)
            .or_insert_with(|| self.device.create_sampler(&texture::sampler_descriptor(state)))
            .clone()
    }

    fn pipeline(&mut self, key: PipelineKey) -> Result<wgpu::RenderPipeline> {
        if let Some(p) = self.pipelines.get(&key) {
            return Ok(p.clone());
        }
        let (vertex, fragment) = if key.program.is_none() {
            let fragment = if key.textured {
                &self.builtins.textured
            } else {
                &self.builtins.untextured
            };
            (&self.builtins.vertex, fragment)
        } else {
            let program = self
                .programs
                .get(&key.program)
                .ok_or_else(|| Error::backend(format!("unknown program {}", key.program.0)))?;
            (&program.vertex, &program.fragment)
        };

        log::debug!("WgpuBackend: building pipeline {key:?}");
        let built = pipeline::build(&self.device, &self.pipeline_layout, vertex, fragment, key.blend);
        self.pipelines.insert(key, built.clone());
        Ok(built)
    }

    /// Copy of an attachment, for draws that sample their own target.
    fn snapshot(&self, source: &GpuTexture) -> GpuTexture {
        let copy = GpuTexture::new(&self.device, source.width, source.height, 1, source.opaque, "kiln feedback copy");
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kiln feedback encoder"),
        });
        encoder.copy_texture_to_texture(
            texture::base_level(&source.texture),
            texture::base_level(&copy.texture),
            texture::extent(source.width, source.height),
        );
        self.queue.submit(std::iter::once(encoder.finish()));
        copy
    }

    fn draw(&mut self, state: &DrawState, vertices: wgpu::Buffer, count: u32) -> Result<()> {
        let (width, height) = self.attachment()?.size();
        let Some(scissor) = clamp_region(state.scissor, width, height) else {
            return Ok(());
        };
        if count == 0 || state.viewport.is_empty() {
            return Ok(());
        }

        let pipeline = self.pipeline(PipelineKey {
            program: state.program,
            blend: state.blend,
            textured: state.textured,
        })?;

        let bound = if state.textured { self.bound_texture } else { None };
        let sampler_state = match bound {
            Some(handle) => self.storage(handle)?.sampler,
            None => SamplerState::default(),
        };
        let sampler = self.sampler(sampler_state);

        let feedback;
        let sampled = match bound {
            Some(handle) if self.attached_texture() == Some(handle) => {
                feedback = self.snapshot(self.storage(handle)?);
                &feedback.view
            }
            Some(handle) => &self.storage(handle)?.view,
            None => &self.blank.view,
        };

        let globals = Globals {
            projection: (pipeline::clip_adjust() * state.projection).to_cols(),
            color: state.color,
        };
        self.queue.write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals));

        let uniforms = self
            .programs
            .get(&state.program)
            .map_or(&self.no_uniforms, |p| &p.buffer);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kiln draw bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.globals.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(sampled),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: USER_UNIFORM_BINDING,
                    resource: uniforms.as_entire_binding(),
                },
            ],
        });

        let target = &self.attachment()?.attachment;
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kiln draw encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kiln draw"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let vp = state.viewport;
            pass.set_viewport(vp.x as f32, vp.y as f32, vp.w as f32, vp.h as f32, 0.0, 1.0);
            pass.set_scissor_rect(scissor.x, scissor.y, scissor.w, scissor.h);
            pass.set_pipeline(&pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.set_vertex_buffer(0, vertices.slice(..));
            pass.draw(0..count, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

impl WgpuBackend<'static> {
    /// Creates a backend without a swapchain. The window framebuffer exists
    /// offscreen only and [`Backend::present`] does nothing.
    pub async fn headless(width: u32, height: u32, init: GpuInit) -> anyhow::Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "window has zero size");

        let instance = init::instance();
        let (adapter, device, queue) = init::open_device(&instance, None, &init).await?;
        log::info!(
            "WgpuBackend: headless {} ({:?}) {width}x{height}",
            adapter.get_info().name,
            adapter.get_info().backend
        );
        Ok(Self::assemble(device, queue, None, None, width, height))
    }
}

impl Backend for WgpuBackend<'_> {
    fn tier(&self) -> Tier {
        Tier::VertexBuffers
    }

    fn features(&self) -> Features {
        FEATURES
    }

    fn window_size(&self) -> (u32, u32) {
        self.window.size()
    }

    fn resize_window(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::invalid(format!("window size {width}x{height}")));
        }
        self.window = GpuTexture::new(&self.device, width, height, 1, false, "kiln window");
        if let Some(surface) = &mut self.surface {
            surface.resize(&self.device, width, height);
        }
        Ok(())
    }

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&mut self) -> Result<TextureHandle> {
        let handle = TextureHandle(self.next_handle());
        self.textures.insert(handle, None);
        Ok(handle)
    }

    fn specify_texture(
        &mut self,
        texture: TextureHandle,
        width: u32,
        height: u32,
        format: GpuFormat,
        pixels: Option<TexelData<'_>>,
    ) -> Result<()> {
        if !format.is_storage_format() {
            return Err(Error::UnsupportedFormat(format!("{format:?} storage")));
        }
        if width == 0 || height == 0 {
            return Err(Error::invalid(format!("texture size {width}x{height}")));
        }
        let slot = self
            .textures
            .get_mut(&texture)
            .ok_or_else(|| Error::backend(format!("unknown texture {}", texture.0)))?;

        let mut tex = GpuTexture::new(&self.device, width, height, 1, format == GpuFormat::Rgb, "kiln texture");
        tex.sampler = slot.as_ref().map(|t| t.sampler).unwrap_or_default();
        if let Some(data) = pixels {
            let region = PixelRegion::from_size(width, height);
            let rgba = texture::to_rgba(region, data, tex.opaque)?;
            tex.write(&self.queue, 0, region, &rgba);
        }
        *slot = Some(tex);
        Ok(())
    }

    fn upload_texture(&mut self, texture: TextureHandle, region: PixelRegion, data: TexelData<'_>) -> Result<()> {
        if !FEATURES.contains(data.format.required_feature()) {
            return Err(Error::UnsupportedFormat(format!("{:?} uploads", data.format)));
        }
        let tex = self.storage(texture)?;
        if region.x.saturating_add(region.w) > tex.width || region.y.saturating_add(region.h) > tex.height {
            return Err(Error::invalid(format!(
                "upload region {region:?} exceeds {}x{} texture",
                tex.width, tex.height
            )));
        }
        let rgba = texture::to_rgba(region, data, tex.opaque)?;
        tex.write(&self.queue, 0, region, &rgba);
        Ok(())
    }

    fn read_texture(&mut self, texture: TextureHandle, region: PixelRegion) -> Result<Vec<u8>> {
        let tex = self.storage(texture)?;
        readback::read_region(&self.device, &self.queue, &tex.texture, region)
    }

    fn set_sampler(&mut self, texture: TextureHandle, sampler: SamplerState) {
        if let Some(Some(tex)) = self.textures.get_mut(&texture) {
            tex.sampler = sampler;
        }
    }

    fn generate_mipmaps(&mut self, texture: TextureHandle) -> Result<()> {
        let (width, height) = self.storage(texture)?.size();
        let full = PixelRegion::from_size(width, height);
        let base = self.read_texture(texture, full)?;
        let levels = texture::mip_level_count(width, height);

        let Some(Some(tex)) = self.textures.get_mut(&texture) else {
            return Err(Error::backend(format!("unknown texture {}", texture.0)));
        };
        if tex.mip_levels != levels {
            let mut grown = GpuTexture::new(&self.device, width, height, levels, tex.opaque, "kiln texture");
            grown.sampler = tex.sampler;
            grown.write(&self.queue, 0, full, &base);
            *tex = grown;
        }

        let (mut data, mut w, mut h) = (base, width, height);
        for level in 1..levels {
            let (next, nw, nh) = texture::downsample(&data, w, h);
            tex.write(&self.queue, level, PixelRegion::from_size(nw, nh), &next);
            (data, w, h) = (next, nw, nh);
        }
        Ok(())
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.bound_texture = texture;
    }

    // ── framebuffers ──────────────────────────────────────────────────────

    fn create_framebuffer(&mut self, texture: TextureHandle) -> Result<FramebufferHandle> {
        if !matches!(self.textures.get(&texture), Some(Some(_))) {
            return Err(Error::backend("incomplete framebuffer attachment"));
        }
        let handle = FramebufferHandle(self.next_handle());
        self.framebuffers.insert(handle, texture);
        Ok(handle)
    }

    fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if framebuffer.is_window() {
            return;
        }
        self.framebuffers.remove(&framebuffer);
        if self.bound_framebuffer == framebuffer {
            self.bound_framebuffer = FramebufferHandle::WINDOW;
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.bound_framebuffer = framebuffer;
    }

    fn read_pixels(&mut self, region: PixelRegion) -> Result<Vec<u8>> {
        let target = self.attachment()?;
        readback::read_region(&self.device, &self.queue, &target.texture, region)
    }

    fn clear(&mut self, color: Color, scissor: Option<PixelRegion>) -> Result<()> {
        let (width, height) = self.attachment()?.size();
        let full = PixelRegion::from_size(width, height);
        let region = match scissor {
            None => full,
            Some(r) => match clamp_region(r, width, height) {
                Some(r) => r,
                None => return Ok(()),
            },
        };

        if region != full {
            let state = DrawState {
                viewport: full,
                projection: Mat4::IDENTITY,
                scissor: region,
                blend: None,
                textured: false,
                color: color.to_f32(),
                program: ProgramHandle::NONE,
            };
            self.client.write(&self.device, &self.queue, &CLEAR_QUAD);
            let vertices = self.client.buffer.clone();
            return self.draw(&state, vertices, CLEAR_QUAD.len() as u32);
        }

        let [r, g, b, a] = color.to_f32();
        let target = &self.attachment()?.attachment;
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kiln clear encoder"),
        });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("kiln clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: r as f64,
                        g: g as f64,
                        b: b as f64,
                        a: a as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    // ── drawing ───────────────────────────────────────────────────────────

    fn draw_arrays(&mut self, state: &DrawState, vertices: &[Vertex]) -> Result<()> {
        self.client.write(&self.device, &self.queue, vertices);
        let buffer = self.client.buffer.clone();
        self.draw(state, buffer, vertices.len() as u32)
    }

    fn stream_vertices(&mut self, vertices: &[Vertex]) -> Result<()> {
        self.streamed.write(&self.device, &self.queue, vertices);
        self.streamed_count = vertices.len() as u32;
        Ok(())
    }

    fn draw_streamed(&mut self, state: &DrawState, count: u32) -> Result<()> {
        let buffer = self.streamed.buffer.clone();
        self.draw(state, buffer, count.min(self.streamed_count))
    }

    // ── shaders ───────────────────────────────────────────────────────────

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle, String> {
        if stage.as_naga().is_none() {
            return Err(format!("WGSL has no {stage:?} stage"));
        }
        let (_, reflection) = reflect::validate(stage, source)?;
        let entry = reflection
            .entry_point
            .clone()
            .ok_or_else(|| format!("no {stage:?} entry point in shader source"))?;

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kiln shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let handle = ShaderHandle(self.next_handle());
        self.shaders.insert(
            handle,
            GpuShader {
                stage,
                module: StageModule { module, entry },
                reflection,
            },
        );
        Ok(handle)
    }

    fn link_program(&mut self, shaders: &[ShaderHandle]) -> Result<ProgramHandle, String> {
        let mut vertex = None;
        let mut fragment = None;
        for handle in shaders {
            let shader = self
                .shaders
                .get(handle)
                .ok_or_else(|| format!("shader {} is not a compiled shader", handle.0))?;
            let slot = match shader.stage {
                ShaderStage::Vertex => &mut vertex,
                ShaderStage::Fragment => &mut fragment,
                ShaderStage::Geometry => return Err("geometry stages cannot be linked".to_string()),
            };
            if slot.replace(shader).is_some() {
                return Err(format!("more than one {:?} shader attached", shader.stage));
            }
        }
        let (Some(vertex), Some(fragment)) = (vertex, fragment) else {
            return Err("a program needs one vertex and one fragment shader".to_string());
        };

        let program = GpuProgram {
            vertex: vertex.module.clone(),
            fragment: fragment.module.clone(),
            uniforms: reflect::merge_uniforms([&vertex.reflection, &fragment.reflection]),
            values: HashMap::new(),
            buffer: uniform_buffer(&self.device, USER_UNIFORM_BYTES, "kiln program uniforms"),
        };
        let handle = ProgramHandle(self.next_handle());
        self.programs.insert(handle, program);
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader);
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.pipelines.retain(|key, _| key.program != program);
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.programs
            .get(&program)?
            .uniforms
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.slot)
    }

    fn set_uniform(&mut self, program: ProgramHandle, location: u32, value: UniformValue) {
        let Some(p) = self.programs.get_mut(&program) else { return };
        p.values.insert(location, value);

        let slots: Vec<(u32, Vec<[u32; 4]>)> = p.values.iter().map(|(l, v)| (*l, v.to_slots())).collect();
        let block = pipeline::pack_uniforms(slots.iter().map(|(l, s)| (*l, s.as_slice())));
        self.queue.write_buffer(&p.buffer, 0, &block);
    }

    fn uniform(&self, program: ProgramHandle, location: u32) -> Option<UniformValue> {
        self.programs.get(&program)?.values.get(&location).cloned()
    }

    // ── presentation ──────────────────────────────────────────────────────

    fn present(&mut self) -> Result<()> {
        let (Some(surface), Some(pass)) = (&self.surface, &self.present) else {
            return Ok(());
        };

        let frame = match surface.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                return match surface.handle_error(&self.device, err) {
                    SurfaceErrorAction::Fatal => Err(Error::backend("surface out of memory")),
                    action => {
                        log::debug!("WgpuBackend: present skipped ({action:?})");
                        Ok(())
                    }
                };
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("kiln present encoder"),
        });
        pass.encode(&self.device, &mut encoder, &self.window.view, &view);
        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `None` on machines without a usable adapter.
    fn headless() -> Option<WgpuBackend<'static>> {
        pollster::block_on(WgpuBackend::headless(8, 4, GpuInit::default())).ok()
    }

    #[test]
    fn clamp_region_to_attachment() {
        assert_eq!(
            clamp_region(PixelRegion::new(6, 2, 10, 10), 8, 4),
            Some(PixelRegion::new(6, 2, 2, 2))
        );
        assert_eq!(clamp_region(PixelRegion::new(8, 0, 4, 4), 8, 4), None);
        assert_eq!(clamp_region(PixelRegion::new(0, 0, 0, 4), 8, 4), None);
    }

    #[test]
    fn features_cover_shader_tier() {
        assert!(FEATURES.contains(Features::BASIC_SHADERS | Features::TEXTURE_READBACK));
        assert!(!FEATURES.contains(Features::GEOMETRY_SHADER));
    }

    #[test]
    fn window_clear_reads_back() {
        let Some(mut b) = headless() else { return };
        assert!(!b.has_surface());
        b.clear(Color::rgba(255, 0, 0, 255), None).unwrap();
        b.clear(Color::rgba(0, 0, 255, 255), Some(PixelRegion::new(0, 0, 2, 1))).unwrap();

        let px = b.read_pixels(PixelRegion::new(0, 0, 3, 1)).unwrap();
        assert_eq!(px, vec![0, 0, 255, 255, 0, 0, 255, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn texture_upload_round_trips() {
        let Some(mut b) = headless() else { return };
        let t = b.create_texture().unwrap();
        let bytes = [1, 2, 3, 4, 5, 6, 0, 0];
        let data = TexelData {
            format: GpuFormat::Rgb,
            pitch: 4,
            bytes: &bytes,
        };
        b.specify_texture(t, 1, 2, GpuFormat::Rgb, Some(data)).unwrap();

        let px = b.read_texture(t, PixelRegion::from_size(1, 2)).unwrap();
        assert_eq!(px, vec![1, 2, 3, 255, 5, 6, 0, 255]);
    }

    #[test]
    fn geometry_stage_is_rejected() {
        let Some(mut b) = headless() else { return };
        assert!(b.compile_shader(ShaderStage::Geometry, "").is_err());
    }
}
