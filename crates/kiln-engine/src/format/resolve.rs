use crate::backend::Features;
use crate::error::{Error, Result};

use super::{GpuFormat, PixelFormat};

/// Outcome of matching a CPU buffer against a texture format.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Upload the buffer bytes unchanged, tagged with this layout.
    Direct(GpuFormat),
    /// Convert the buffer to the texture's storage layout first.
    Convert,
}

/// Decides how `source` pixels reach a texture stored as `texture_format`.
///
/// Swizzled uploads are only chosen when `features` enables them; otherwise the
/// caller has to convert. Only `Rgb` and `Rgba` are valid storage formats.
pub fn resolve(texture_format: GpuFormat, source: &PixelFormat, features: Features) -> Result<Resolution> {
    let candidates: &[GpuFormat] = match texture_format {
        GpuFormat::Rgb => &[GpuFormat::Rgb, GpuFormat::Bgr],
        GpuFormat::Rgba => &[GpuFormat::Rgba, GpuFormat::Abgr, GpuFormat::Bgra],
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "{other:?} is not a texture storage format"
            )));
        }
    };

    if source.bytes_per_pixel != texture_format.channels() {
        return Ok(Resolution::Convert);
    }

    let direct = candidates.iter().copied().find(|candidate| {
        features.contains(candidate.required_feature())
            && candidate.pixel_format().masks.same_rgb(&source.masks)
    });

    Ok(direct.map_or(Resolution::Convert, Resolution::Direct))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ORDERINGS: Features = Features::BGR.union(Features::BGRA).union(Features::ABGR);

    #[test]
    fn rgb_source_into_rgb_is_direct() {
        let r = resolve(GpuFormat::Rgb, &PixelFormat::rgb24(), Features::empty()).unwrap();
        assert_eq!(r, Resolution::Direct(GpuFormat::Rgb));
    }

    #[test]
    fn bgr_source_needs_extension() {
        let without = resolve(GpuFormat::Rgb, &PixelFormat::bgr24(), Features::empty()).unwrap();
        assert_eq!(without, Resolution::Convert);

        let with = resolve(GpuFormat::Rgb, &PixelFormat::bgr24(), ALL_ORDERINGS).unwrap();
        assert_eq!(with, Resolution::Direct(GpuFormat::Bgr));
    }

    #[test]
    fn rgba_orderings() {
        let f = ALL_ORDERINGS;
        assert_eq!(
            resolve(GpuFormat::Rgba, &PixelFormat::rgba32(), f).unwrap(),
            Resolution::Direct(GpuFormat::Rgba)
        );
        assert_eq!(
            resolve(GpuFormat::Rgba, &PixelFormat::bgra32(), f).unwrap(),
            Resolution::Direct(GpuFormat::Bgra)
        );
        assert_eq!(
            resolve(GpuFormat::Rgba, &PixelFormat::abgr32(), f).unwrap(),
            Resolution::Direct(GpuFormat::Abgr)
        );
        assert_eq!(
            resolve(GpuFormat::Rgba, &PixelFormat::bgra32(), Features::ABGR).unwrap(),
            Resolution::Convert
        );
    }

    #[test]
    fn bytes_per_pixel_mismatch_converts() {
        let r = resolve(GpuFormat::Rgba, &PixelFormat::rgb24(), ALL_ORDERINGS).unwrap();
        assert_eq!(r, Resolution::Convert);
        let r = resolve(GpuFormat::Rgb, &PixelFormat::rgba32(), ALL_ORDERINGS).unwrap();
        assert_eq!(r, Resolution::Convert);
    }

    #[test]
    fn swizzled_storage_format_is_rejected() {
        let err = resolve(GpuFormat::Bgra, &PixelFormat::bgra32(), ALL_ORDERINGS).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedFormat);
    }
}
