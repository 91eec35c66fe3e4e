use crate::backend::Features;

use super::PixelFormat;

/// Texel layout as the backend receives it.
///
/// Textures are always stored as `Rgb` or `Rgba`. The swizzled variants only
/// describe upload data and need the matching [`Features`] flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GpuFormat {
    Rgb,
    Bgr,
    Rgba,
    Bgra,
    Abgr,
}

impl GpuFormat {
    /// Storage format for a channel count.
    pub fn for_channels(channels: u8) -> Option<Self> {
        match channels {
            3 => Some(GpuFormat::Rgb),
            4 => Some(GpuFormat::Rgba),
            _ => None,
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            GpuFormat::Rgb | GpuFormat::Bgr => 3,
            GpuFormat::Rgba | GpuFormat::Bgra | GpuFormat::Abgr => 4,
        }
    }

    /// CPU layout equivalent to this GPU format.
    pub fn pixel_format(self) -> PixelFormat {
        match self {
            GpuFormat::Rgb => PixelFormat::rgb24(),
            GpuFormat::Bgr => PixelFormat::bgr24(),
            GpuFormat::Rgba => PixelFormat::rgba32(),
            GpuFormat::Bgra => PixelFormat::bgra32(),
            GpuFormat::Abgr => PixelFormat::abgr32(),
        }
    }

    /// Backend capability needed to upload in this layout.
    pub fn required_feature(self) -> Features {
        match self {
            GpuFormat::Rgb | GpuFormat::Rgba => Features::empty(),
            GpuFormat::Bgr => Features::BGR,
            GpuFormat::Bgra => Features::BGRA,
            GpuFormat::Abgr => Features::ABGR,
        }
    }

    pub fn is_storage_format(self) -> bool {
        matches!(self, GpuFormat::Rgb | GpuFormat::Rgba)
    }
}
