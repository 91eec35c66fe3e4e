use crate::backend::PixelRegion;
use crate::error::{Error, Result};

use super::texture::extent;

/// Row pitch of a staging copy: wgpu aligns buffer rows to 256 bytes.
pub(super) fn padded_row_bytes(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * 4).div_ceil(align) * align
}

/// Copies `region` of the base level of an RGBA8 texture to the CPU as tight rows.
pub(super) fn read_region(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    region: PixelRegion,
) -> Result<Vec<u8>> {
    if region.is_empty() {
        return Ok(Vec::new());
    }
    let size = texture.size();
    if region.x + region.w > size.width || region.y + region.h > size.height {
        return Err(Error::invalid(format!(
            "read region {region:?} exceeds {}x{} texture",
            size.width, size.height
        )));
    }

    let padded = padded_row_bytes(region.w);
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("kiln readback"),
        size: padded as u64 * region.h as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("kiln readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: region.x,
                y: region.y,
                z: 0,
            },
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(region.h),
            },
        },
        extent(region.w, region.h),
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| Error::backend(format!("device poll failed: {e}")))?;
    rx.recv()
        .map_err(|_| Error::backend("readback mapping was dropped"))?
        .map_err(|e| Error::backend(format!("readback mapping failed: {e}")))?;

    let mapped = slice.get_mapped_range();
    let row_bytes = region.w as usize * 4;
    let mut pixels = Vec::with_capacity(row_bytes * region.h as usize);
    for row in 0..region.h as usize {
        let start = row * padded as usize;
        pixels.extend_from_slice(&mapped[start..start + row_bytes]);
    }
    drop(mapped);
    staging.unmap();

    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_pad_to_copy_alignment() {
        assert_eq!(padded_row_bytes(1), 256);
        assert_eq!(padded_row_bytes(64), 256);
        assert_eq!(padded_row_bytes(65), 512);
    }
}
