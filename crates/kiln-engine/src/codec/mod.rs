//! Image file decode and encode through the `image` crate.
//!
//! Decoded buffers are RGB when the file has no alpha channel and RGBA
//! otherwise. The file format for saving comes from the path extension.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::{Error, Result};
use crate::format::{PixelBuffer, PixelFormat};

/// File formats the codec writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Png,
    Bmp,
    Tga,
}

impl FileFormat {
    /// Format named by the extension of `path`, ignoring case.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(FileFormat::Png),
            "bmp" => Ok(FileFormat::Bmp),
            "tga" => Ok(FileFormat::Tga),
            _ => Err(Error::Data(format!(
                "unsupported image file extension in {}",
                path.display()
            ))),
        }
    }

    fn as_image_format(self) -> image::ImageFormat {
        match self {
            FileFormat::Png => image::ImageFormat::Png,
            FileFormat::Bmp => image::ImageFormat::Bmp,
            FileFormat::Tga => image::ImageFormat::Tga,
        }
    }
}

/// Decodes an encoded image held in memory, guessing its format.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    decode_as(bytes, None)
}

/// Decodes with a known format. TGA has no signature and always needs one.
fn decode_as(bytes: &[u8], format: Option<FileFormat>) -> Result<PixelBuffer> {
    let decoded = match format {
        Some(format) => image::load_from_memory_with_format(bytes, format.as_image_format()),
        None => image::load_from_memory(bytes),
    }
    .map_err(|e| Error::Data(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());

    if decoded.color().has_alpha() {
        PixelBuffer::from_raw(width, height, PixelFormat::rgba32(), decoded.into_rgba8().into_raw())
    } else {
        PixelBuffer::from_raw(width, height, PixelFormat::rgb24(), decoded.into_rgb8().into_raw())
    }
}

/// Reads and decodes an image file. The extension, when known, picks the decoder.
pub fn load(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::Data(format!("{}: {e}", path.display())),
    })?;
    decode_as(&bytes, FileFormat::from_path(path).ok())
}

/// Encodes `buffer` in `format`.
pub fn encode(buffer: &PixelBuffer, format: FileFormat) -> Result<Vec<u8>> {
    let (width, height) = (buffer.width(), buffer.height());
    let image = if buffer.format().has_alpha() {
        let data = buffer.converted(PixelFormat::rgba32()).into_data();
        RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8)
    } else {
        let data = buffer.converted(PixelFormat::rgb24()).into_data();
        RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
    }
    .ok_or_else(|| Error::Data("pixel buffer does not match its dimensions".into()))?;

    let mut out = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut out), format.as_image_format())
        .map_err(|e| Error::Data(e.to_string()))?;
    Ok(out)
}

/// Encodes `buffer` in the format named by the extension and writes the file.
///
/// Nothing is written when the extension is unknown or encoding fails.
pub fn save(buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let bytes = encode(buffer, format)?;
    std::fs::write(path, bytes).map_err(|e| Error::Data(format!("{}: {e}", path.display())))
}
