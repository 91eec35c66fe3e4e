use crate::coords::Color;
use crate::error::{Error, Result};

use super::PixelFormat;

/// CPU-side pixel buffer, rows top to bottom.
///
/// `pitch` is the byte stride between rows and may exceed
/// `width * bytes_per_pixel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pitch: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Zero-filled buffer with a tight pitch.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let pitch = width as usize * format.bytes_per_pixel as usize;
        Self {
            width,
            height,
            pitch,
            format,
            data: vec![0; pitch * height as usize],
        }
    }

    /// Wraps existing bytes with a tight pitch.
    pub fn from_raw(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self> {
        let pitch = width as usize * format.bytes_per_pixel as usize;
        Self::with_pitch(width, height, pitch, format, data)
    }

    pub fn with_pitch(
        width: u32,
        height: u32,
        pitch: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self> {
        if !matches!(format.bytes_per_pixel, 1..=4) {
            return Err(Error::UnsupportedFormat(format!(
                "{} bytes per pixel",
                format.bytes_per_pixel
            )));
        }
        let row = width as usize * format.bytes_per_pixel as usize;
        if pitch < row {
            return Err(Error::invalid(format!("pitch {pitch} shorter than row {row}")));
        }
        let needed = if height == 0 { 0 } else { pitch * (height as usize - 1) + row };
        if data.len() < needed {
            return Err(Error::invalid(format!(
                "pixel data has {} bytes, {width}x{height} needs {needed}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pitch,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes of row `y` without trailing padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.pitch;
        &self.data[start..start + self.width as usize * self.format.bytes_per_pixel as usize]
    }

    fn word_at(&self, x: u32, y: u32) -> u32 {
        let bpp = self.format.bytes_per_pixel as usize;
        let start = y as usize * self.pitch + x as usize * bpp;
        let mut word = [0u8; 4];
        word[..bpp].copy_from_slice(&self.data[start..start + bpp]);
        u32::from_le_bytes(word)
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(Color::from(self.format.decode(self.word_at(x, y))))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.format.bytes_per_pixel as usize;
        let start = y as usize * self.pitch + x as usize * bpp;
        let word = self.format.encode(color.to_array()).to_le_bytes();
        self.data[start..start + bpp].copy_from_slice(&word[..bpp]);
    }

    /// Copy in another layout with a tight pitch.
    pub fn converted(&self, to: PixelFormat) -> PixelBuffer {
        if to == self.format && self.pitch == self.width as usize * to.bytes_per_pixel as usize {
            return self.clone();
        }
        let mut out = PixelBuffer::new(self.width, self.height, to);
        for y in 0..self.height {
            for x in 0..self.width {
                let rgba = self.format.decode(self.word_at(x, y));
                let bpp = to.bytes_per_pixel as usize;
                let start = y as usize * out.pitch + x as usize * bpp;
                out.data[start..start + bpp].copy_from_slice(&to.encode(rgba).to_le_bytes()[..bpp]);
            }
        }
        out
    }

    /// Copy of the `w` x `h` region at `(x, y)`, clamped to the buffer.
    pub fn region(&self, x: u32, y: u32, w: u32, h: u32) -> PixelBuffer {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let w = w.min(self.width - x);
        let h = h.min(self.height - y);
        let bpp = self.format.bytes_per_pixel as usize;

        let mut out = PixelBuffer::new(w, h, self.format);
        for row in 0..h {
            let src = (y + row) as usize * self.pitch + x as usize * bpp;
            let dst = row as usize * out.pitch;
            out.data[dst..dst + w as usize * bpp].copy_from_slice(&self.data[src..src + w as usize * bpp]);
        }
        out
    }

    /// Rows in reverse order.
    pub fn flipped_vertically(&self) -> PixelBuffer {
        let mut out = PixelBuffer::new(self.width, self.height, self.format);
        let row_len = out.pitch;
        for y in 0..self.height {
            let dst = (self.height - 1 - y) as usize * row_len;
            out.data[dst..dst + row_len].copy_from_slice(self.row(y));
        }
        out
    }
}
