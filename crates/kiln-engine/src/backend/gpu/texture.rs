use crate::backend::{FilterMode, PixelRegion, SamplerState, TexelData};
use crate::error::{Error, Result};

/// Every texture, window framebuffer included, is stored as RGBA8.
pub(super) const STORAGE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const USAGE: wgpu::TextureUsages = wgpu::TextureUsages::TEXTURE_BINDING
    .union(wgpu::TextureUsages::RENDER_ATTACHMENT)
    .union(wgpu::TextureUsages::COPY_SRC)
    .union(wgpu::TextureUsages::COPY_DST);

pub(super) struct GpuTexture {
    pub texture: wgpu::Texture,
    /// Every mip level, for sampling.
    pub view: wgpu::TextureView,
    /// Base level only, for framebuffer attachment.
    pub attachment: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    /// RGB storage: alpha is forced to opaque.
    pub opaque: bool,
    pub sampler: SamplerState,
}

impl GpuTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, mip_levels: u32, opaque: bool, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width, height),
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STORAGE_FORMAT,
            usage: USAGE,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let attachment = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            base_mip_level: 0,
            mip_level_count: Some(1),
            ..Default::default()
        });

        Self {
            texture,
            view,
            attachment,
            width,
            height,
            mip_levels,
            opaque,
            sampler: SamplerState::default(),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Writes tight RGBA rows into `region` of mip `level`.
    pub fn write(&self, queue: &wgpu::Queue, level: u32, region: PixelRegion, rgba: &[u8]) {
        if region.is_empty() {
            return;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: level,
                origin: wgpu::Origin3d {
                    x: region.x,
                    y: region.y,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * region.w),
                rows_per_image: Some(region.h),
            },
            extent(region.w, region.h),
        );
    }
}

pub(super) fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// Whole-texture copy location at mip level 0.
pub(super) fn base_level(texture: &wgpu::Texture) -> wgpu::TexelCopyTextureInfo<'_> {
    wgpu::TexelCopyTextureInfo {
        texture,
        mip_level: 0,
        origin: wgpu::Origin3d::ZERO,
        aspect: wgpu::TextureAspect::All,
    }
}

/// Decodes upload data into tight RGBA rows.
pub(super) fn to_rgba(region: PixelRegion, data: TexelData<'_>, opaque: bool) -> Result<Vec<u8>> {
    let format = data.format.pixel_format();
    let bpp = format.bytes_per_pixel as usize;
    let needed = if region.h == 0 {
        0
    } else {
        data.pitch * (region.h as usize - 1) + region.w as usize * bpp
    };
    if data.bytes.len() < needed {
        return Err(Error::invalid("upload data shorter than region"));
    }

    let mut out = Vec::with_capacity(region.w as usize * region.h as usize * 4);
    for row in 0..region.h as usize {
        for col in 0..region.w as usize {
            let start = row * data.pitch + col * bpp;
            let mut word = [0u8; 4];
            word[..bpp].copy_from_slice(&data.bytes[start..start + bpp]);
            let mut rgba = format.decode(u32::from_le_bytes(word));
            if opaque {
                rgba[3] = 255;
            }
            out.extend_from_slice(&rgba);
        }
    }
    Ok(out)
}

/// Levels in a full mip chain down to 1x1.
pub(super) fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Halves an RGBA image with a 2x2 box filter; odd edges reuse the last texel.
pub(super) fn downsample(rgba: &[u8], width: u32, height: u32) -> (Vec<u8>, u32, u32) {
    let nw = (width / 2).max(1);
    let nh = (height / 2).max(1);
    let texel = |x: u32, y: u32, c: usize| -> u32 {
        let x = x.min(width - 1) as usize;
        let y = y.min(height - 1) as usize;
        rgba[(y * width as usize + x) * 4 + c] as u32
    };

    let mut out = Vec::with_capacity(nw as usize * nh as usize * 4);
    for y in 0..nh {
        for x in 0..nw {
            for c in 0..4 {
                let sum = texel(2 * x, 2 * y, c)
                    + texel(2 * x + 1, 2 * y, c)
                    + texel(2 * x, 2 * y + 1, c)
                    + texel(2 * x + 1, 2 * y + 1, c);
                out.push(((sum + 2) / 4) as u8);
            }
        }
    }
    (out, nw, nh)
}

pub(super) fn sampler_descriptor(state: SamplerState) -> wgpu::SamplerDescriptor<'static> {
    let filter = |f: FilterMode| match f {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    };
    let (mipmap_filter, lod_max_clamp) = match state.mipmap {
        Some(FilterMode::Nearest) => (wgpu::MipmapFilterMode::Nearest, 32.0),
        Some(FilterMode::Linear) => (wgpu::MipmapFilterMode::Linear, 32.0),
        None => (wgpu::MipmapFilterMode::Nearest, 0.0),
    };

    wgpu::SamplerDescriptor {
        label: Some("kiln sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: filter(state.mag),
        min_filter: filter(state.min),
        mipmap_filter,
        lod_min_clamp: 0.0,
        lod_max_clamp,
        ..Default::default()
    }
}
