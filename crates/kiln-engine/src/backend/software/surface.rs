use crate::backend::{FilterMode, PixelRegion, SamplerState, TexelData};
use crate::error::{Error, Result};
use crate::format::GpuFormat;

/// RGBA8 pixel store addressed in memory order.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    width: u32,
    height: u32,
    /// Alpha is not stored; every texel reads as opaque.
    opaque: bool,
    texels: Vec<[u8; 4]>,
}

impl Surface {
    pub fn new(width: u32, height: u32, opaque: bool) -> Self {
        let fill = if opaque { [0, 0, 0, 255] } else { [0; 4] };
        Self {
            width,
            height,
            opaque,
            texels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn for_format(width: u32, height: u32, format: GpuFormat) -> Self {
        Self::new(width, height, format.channels() == 3)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_allocated(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.texels[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, mut rgba: [u8; 4]) {
        if self.opaque {
            rgba[3] = 255;
        }
        let w = self.width as usize;
        self.texels[y as usize * w + x as usize] = rgba;
    }

    /// Clamps `region` to the surface. `None` when nothing is left.
    pub fn clamp(&self, region: PixelRegion) -> Option<PixelRegion> {
        let x0 = region.x.min(self.width);
        let y0 = region.y.min(self.height);
        let x1 = region.x.saturating_add(region.w).min(self.width);
        let y1 = region.y.saturating_add(region.h).min(self.height);
        let clamped = PixelRegion::new(x0, y0, x1 - x0, y1 - y0);
        (!clamped.is_empty()).then_some(clamped)
    }

    pub fn fill(&mut self, region: PixelRegion, rgba: [u8; 4]) {
        let Some(r) = self.clamp(region) else { return };
        for y in r.y..r.y + r.h {
            for x in r.x..r.x + r.w {
                self.set(x, y, rgba);
            }
        }
    }

    /// Writes `data` into `region`, first source row at memory row `region.y`.
    pub fn write(&mut self, region: PixelRegion, data: TexelData<'_>) -> Result<()> {
        if region.x.saturating_add(region.w) > self.width || region.y.saturating_add(region.h) > self.height {
            return Err(Error::invalid(format!(
                "upload region {region:?} exceeds {}x{} texture",
                self.width, self.height
            )));
        }
        let format = data.format.pixel_format();
        let bpp = format.bytes_per_pixel as usize;
        let needed = if region.h == 0 { 0 } else { data.pitch * (region.h as usize - 1) + region.w as usize * bpp };
        if data.bytes.len() < needed {
            return Err(Error::invalid("upload data shorter than region"));
        }

        for row in 0..region.h {
            for col in 0..region.w {
                let start = row as usize * data.pitch + col as usize * bpp;
                let mut word = [0u8; 4];
                word[..bpp].copy_from_slice(&data.bytes[start..start + bpp]);
                let rgba = format.decode(u32::from_le_bytes(word));
                self.set(region.x + col, region.y + row, rgba);
            }
        }
        Ok(())
    }

    /// Tight RGBA8 copy of `region`.
    pub fn read(&self, region: PixelRegion) -> Result<Vec<u8>> {
        if region.x.saturating_add(region.w) > self.width || region.y.saturating_add(region.h) > self.height {
            return Err(Error::invalid(format!(
                "read region {region:?} exceeds {}x{} surface",
                self.width, self.height
            )));
        }
        let mut out = Vec::with_capacity(region.w as usize * region.h as usize * 4);
        for y in region.y..region.y + region.h {
            for x in region.x..region.x + region.w {
                out.extend_from_slice(&self.get(x, y));
            }
        }
        Ok(out)
    }

    /// Samples at normalized `(s, t)` with clamp-to-edge addressing.
    ///
    /// `minifying` selects between the min and mag filters.
    pub fn sample(&self, s: f32, t: f32, sampler: SamplerState, minifying: bool) -> [f32; 4] {
        if !self.is_allocated() {
            return [0.0; 4];
        }
        let filter = if minifying { sampler.min } else { sampler.mag };
        let w = self.width as f32;
        let h = self.height as f32;

        match filter {
            FilterMode::Nearest => {
                let x = ((s * w).floor() as i64).clamp(0, self.width as i64 - 1) as u32;
                let y = ((t * h).floor() as i64).clamp(0, self.height as i64 - 1) as u32;
                to_unit(self.get(x, y))
            }
            FilterMode::Linear => {
                let u = s * w - 0.5;
                let v = t * h - 0.5;
                let x0 = u.floor();
                let y0 = v.floor();
                let fx = u - x0;
                let fy = v - y0;

                let texel = |x: f32, y: f32| {
                    let x = (x as i64).clamp(0, self.width as i64 - 1) as u32;
                    let y = (y as i64).clamp(0, self.height as i64 - 1) as u32;
                    to_unit(self.get(x, y))
                };

                let a = texel(x0, y0);
                let b = texel(x0 + 1.0, y0);
                let c = texel(x0, y0 + 1.0);
                let d = texel(x0 + 1.0, y0 + 1.0);

                let mut out = [0.0; 4];
                for i in 0..4 {
                    let top = a[i] + (b[i] - a[i]) * fx;
                    let bottom = c[i] + (d[i] - c[i]) * fx;
                    out[i] = top + (bottom - top) * fy;
                }
                out
            }
        }
    }
}

#[inline]
pub(super) fn to_unit(rgba: [u8; 4]) -> [f32; 4] {
    rgba.map(|c| c as f32 / 255.0)
}

#[inline]
pub(super) fn to_byte(v: [f32; 4]) -> [u8; 4] {
    v.map(|c| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8)
}
