use crate::backend::{Backend, Features, PixelRegion, TexelData, TextureHandle};
use crate::error::Result;
use crate::format::{resolve, GpuFormat, PixelBuffer, Resolution};

/// Storage size for a `width` x `height` image.
///
/// Each axis is rounded up to a power of two unless the backend takes any size.
pub(crate) fn storage_size(width: u32, height: u32, features: Features) -> (u32, u32) {
    if features.contains(Features::NON_POWER_OF_TWO) {
        (width, height)
    } else {
        (width.next_power_of_two(), height.next_power_of_two())
    }
}

/// Runs `f` with `buffer` laid out for a texture stored as `storage`.
fn with_texels<R>(
    storage: GpuFormat,
    buffer: &PixelBuffer,
    features: Features,
    f: impl FnOnce(TexelData<'_>) -> Result<R>,
) -> Result<R> {
    match resolve(storage, buffer.format(), features)? {
        Resolution::Direct(format) => f(TexelData {
            format,
            pitch: buffer.pitch(),
            bytes: buffer.data(),
        }),
        Resolution::Convert => {
            let converted = buffer.converted(storage.pixel_format());
            f(TexelData {
                format: storage,
                pitch: converted.pitch(),
                bytes: converted.data(),
            })
        }
    }
}

/// Defines storage from a buffer of exactly the storage size.
pub(crate) fn specify_pixels<B: Backend + ?Sized>(
    backend: &mut B,
    texture: TextureHandle,
    storage: GpuFormat,
    buffer: &PixelBuffer,
) -> Result<()> {
    let features = backend.features();
    let (w, h) = (buffer.width(), buffer.height());
    with_texels(storage, buffer, features, |texels| {
        backend.specify_texture(texture, w, h, storage, Some(texels))
    })
}

/// Replaces the texels at `(x, y)` with `buffer`, converting when needed.
pub(crate) fn upload_pixels<B: Backend + ?Sized>(
    backend: &mut B,
    texture: TextureHandle,
    storage: GpuFormat,
    x: u32,
    y: u32,
    buffer: &PixelBuffer,
) -> Result<()> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Ok(());
    }
    let features = backend.features();
    let region = PixelRegion::new(x, y, buffer.width(), buffer.height());
    with_texels(storage, buffer, features, |texels| {
        backend.upload_texture(texture, region, texels)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npot_keeps_size() {
        let all = Features::NON_POWER_OF_TWO;
        assert_eq!(storage_size(100, 60, all), (100, 60));
    }

    #[test]
    fn pot_pads_each_axis() {
        assert_eq!(storage_size(100, 60, Features::empty()), (128, 64));
        assert_eq!(storage_size(64, 1, Features::empty()), (64, 1));
    }
}
