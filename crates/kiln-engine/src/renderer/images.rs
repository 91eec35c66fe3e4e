use std::borrow::Cow;
use std::cell::Cell;
use std::path::Path;

use crate::backend::{Backend, Features, FramebufferHandle, PixelRegion};
use crate::codec;
use crate::coords::{Color, Rect};
use crate::error::{Error, Result};
use crate::format::{GpuFormat, PixelBuffer, PixelFormat};
use crate::target::Target;
use crate::texture::{specify_pixels, storage_size, upload_pixels, Filter, Image, ImageData};

use super::Renderer;

impl<B: Backend> Renderer<B> {
    // ── creation ──────────────────────────────────────────────────────────

    /// Creates an image with undefined contents.
    ///
    /// `channels` must be 3 (RGB) or 4 (RGBA). Storage is padded to powers of
    /// two when the backend needs it; the logical size stays as requested.
    pub fn create_image(&mut self, width: u32, height: u32, channels: u8) -> Result<Image> {
        self.report("create_image", |r| r.allocate_image(width, height, channels, None))
    }

    /// Creates an image holding a copy of `buffer`.
    pub fn copy_image_from_pixels(&mut self, buffer: &PixelBuffer) -> Result<Image> {
        self.report("copy_image_from_pixels", |r| r.image_from_pixels(buffer))
    }

    /// Another owner of the same texture.
    pub fn create_alias_image(&mut self, image: &Image) -> Result<Image> {
        self.report("create_alias_image", |r| {
            r.check_image(image)?;
            Ok(image.clone())
        })
    }

    /// Creates an independent image with the same pixels and settings.
    pub fn copy_image(&mut self, image: &Image) -> Result<Image> {
        self.report("copy_image", |r| {
            r.check_image(image)?;
            let pixels = r.image_pixels(image)?;
            let copy = r.image_from_pixels(&pixels)?;
            copy.color.set(image.color());
            r.apply_filter(&copy, image.filter());
            Ok(copy)
        })
    }

    /// Creates an image from the current contents of `target`.
    pub fn copy_image_from_target(&mut self, target: Target) -> Result<Image> {
        self.report("copy_image_from_target", |r| {
            let pixels = r.target_pixels(target)?;
            r.image_from_pixels(&pixels)
        })
    }

    /// Loads an image file (PNG, BMP or TGA).
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<Image> {
        let path = path.as_ref();
        self.report("load_image", |r| {
            let pixels = codec::load(path)?;
            r.image_from_pixels(&pixels)
        })
    }

    /// Writes the image to a file; the extension selects the format.
    pub fn save_image(&mut self, image: &Image, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.report("save_image", |r| {
            r.check_image(image)?;
            let pixels = r.image_pixels(image)?;
            codec::save(&pixels, path)
        })
    }

    fn image_from_pixels(&mut self, buffer: &PixelBuffer) -> Result<Image> {
        let channels = if buffer.format().has_alpha() { 4 } else { 3 };
        self.allocate_image(buffer.width(), buffer.height(), channels, Some(buffer))
    }

    fn allocate_image(
        &mut self,
        width: u32,
        height: u32,
        channels: u8,
        pixels: Option<&PixelBuffer>,
    ) -> Result<Image> {
        let format = GpuFormat::for_channels(channels)
            .ok_or_else(|| Error::invalid(format!("{channels} channels, expected 3 or 4")))?;
        if width == 0 || height == 0 {
            return Err(Error::invalid(format!("image size {width}x{height}")));
        }
        let (texture_width, texture_height) = storage_size(width, height, self.features);

        let handle = self.backend.create_texture()?;
        let stored = match pixels {
            Some(buffer) if (texture_width, texture_height) == (buffer.width(), buffer.height()) => {
                specify_pixels(&mut self.backend, handle, format, buffer)
            }
            Some(buffer) => self
                .backend
                .specify_texture(handle, texture_width, texture_height, format, None)
                .and_then(|_| upload_pixels(&mut self.backend, handle, format, 0, 0, buffer)),
            None => self
                .backend
                .specify_texture(handle, texture_width, texture_height, format, None),
        };
        if let Err(err) = stored {
            self.backend.delete_texture(handle);
            return Err(err);
        }

        let filter = self.init.default_filter;
        self.backend.set_sampler(handle, filter.sampler(false));

        let image = Image::new(ImageData {
            renderer: self.id,
            handle,
            width,
            height,
            texture_width,
            texture_height,
            format,
            target: Cell::new(None),
            has_mipmaps: Cell::new(false),
            filter: Cell::new(filter),
            color: Cell::new(Color::WHITE),
        });
        self.textures.insert(&image);
        Ok(image)
    }

    // ── contents ──────────────────────────────────────────────────────────

    /// Replaces pixels of `image` with `buffer`.
    ///
    /// `rect` places the buffer in logical image coordinates; `None` covers
    /// the whole image. Pixels falling outside the image are skipped. A rect
    /// with negative size is rejected without touching the image.
    pub fn update_image(&mut self, image: &Image, rect: Option<Rect>, buffer: &PixelBuffer) -> Result<()> {
        self.report("update_image", |r| {
            r.check_image(image)?;
            let dest = match rect {
                Some(rect) if rect.has_negative_size() || !rect.is_finite() => {
                    return Err(Error::invalid(format!("update rect {rect:?}")));
                }
                Some(rect) => rect,
                None => Rect::from_size(image.width as f32, image.height as f32),
            };

            let x = dest.x.max(0.0);
            let y = dest.y.max(0.0);
            let src_x = (x - dest.x) as u32;
            let src_y = (y - dest.y) as u32;
            let (x, y) = (x as u32, y as u32);
            if x >= image.width || y >= image.height {
                return Ok(());
            }
            let w = (dest.w as u32)
                .min(buffer.width().saturating_sub(src_x))
                .min(image.width - x);
            let h = (dest.h as u32)
                .min(buffer.height().saturating_sub(src_y))
                .min(image.height - y);
            if w == 0 || h == 0 {
                return Ok(());
            }

            r.flush_for_image(image)?;

            let part = if (src_x, src_y, w, h) == (0, 0, buffer.width(), buffer.height()) {
                Cow::Borrowed(buffer)
            } else {
                Cow::Owned(buffer.region(src_x, src_y, w, h))
            };
            upload_pixels(&mut r.backend, image.handle, image.format, x, y, &part)?;

            if image.has_mipmaps() {
                r.backend.generate_mipmaps(image.handle)?;
            }
            Ok(())
        })
    }

    /// Logical pixels of `image`, rows top to bottom, RGB or RGBA by channel count.
    pub fn read_image_pixels(&mut self, image: &Image) -> Result<PixelBuffer> {
        self.report("read_image_pixels", |r| {
            r.check_image(image)?;
            r.image_pixels(image)
        })
    }

    fn image_pixels(&mut self, image: &Image) -> Result<PixelBuffer> {
        if let Some(target) = image.target() {
            self.flush_target(target)?;
        }
        let region = PixelRegion::from_size(image.width, image.height);
        let rgba = if self.features.contains(Features::TEXTURE_READBACK) {
            self.backend.read_texture(image.handle, region)?
        } else {
            self.read_through_framebuffer(image, region)?
        };

        let buffer = PixelBuffer::from_raw(image.width, image.height, PixelFormat::rgba32(), rgba)?;
        Ok(match image.channels() {
            3 => buffer.converted(PixelFormat::rgb24()),
            _ => buffer,
        })
    }

    /// Reads texture contents through a framebuffer, creating a temporary one
    /// when the image has no target.
    fn read_through_framebuffer(&mut self, image: &Image, region: PixelRegion) -> Result<Vec<u8>> {
        if !self.features.contains(Features::RENDER_TARGETS) {
            return Err(Error::unsupported("image readback needs texture readback or render targets"));
        }
        self.flush_batch()?;

        let attached = image.target().and_then(|t| self.targets.get(t)).map(|rt| rt.handle);
        let (framebuffer, temporary) = match attached {
            Some(handle) => (handle, false),
            None => (self.backend.create_framebuffer(image.handle)?, true),
        };

        self.backend.bind_framebuffer(framebuffer);
        let pixels = self.backend.read_pixels(region);
        if temporary {
            self.backend.delete_framebuffer(framebuffer);
        }
        let previous = self.cache.framebuffer().unwrap_or(FramebufferHandle::WINDOW);
        self.backend.bind_framebuffer(previous);
        pixels
    }

    /// Flushes blits that sample `image` or draw into it.
    fn flush_for_image(&mut self, image: &Image) -> Result<()> {
        let sampled = self.cache.is_texture_bound(image.handle);
        let drawn = image.target().is_some() && image.target() == self.batch_target;
        if sampled || drawn {
            self.flush_batch()?;
        }
        Ok(())
    }

    // ── settings ──────────────────────────────────────────────────────────

    pub fn generate_mipmaps(&mut self, image: &Image) -> Result<()> {
        self.report("generate_mipmaps", |r| {
            r.check_image(image)?;
            r.flush_for_image(image)?;
            r.backend.generate_mipmaps(image.handle)?;
            image.has_mipmaps.set(true);
            r.apply_filter(image, image.filter());
            Ok(())
        })
    }

    pub fn set_image_filter(&mut self, image: &Image, filter: Filter) -> Result<()> {
        self.report("set_image_filter", |r| {
            r.check_image(image)?;
            if r.cache.is_texture_bound(image.handle) {
                r.flush_batch()?;
            }
            r.apply_filter(image, filter);
            Ok(())
        })
    }

    fn apply_filter(&mut self, image: &Image, filter: Filter) {
        self.backend.set_sampler(image.handle, filter.sampler(image.has_mipmaps()));
        image.filter.set(filter);
    }

    /// Sets the color the image is multiplied by when drawn.
    pub fn set_color(&mut self, image: &Image, color: Color) -> Result<()> {
        self.report("set_color", |r| {
            r.check_image(image)?;
            if image.color() == color {
                return Ok(());
            }
            if r.cache.is_texture_bound(image.handle) {
                r.flush_batch()?;
                r.cache.set_texture_color(image.handle, color.to_f32());
            }
            image.color.set(color);
            Ok(())
        })
    }

    // ── release ───────────────────────────────────────────────────────────

    /// Releases one owner of `image`.
    ///
    /// The last owner destroys the texture along with its render target.
    pub fn free_image(&mut self, image: Image) -> Result<()> {
        self.report("free_image", move |r| {
            r.check_image(&image)?;
            if image.owners() > 1 {
                return Ok(());
            }
            if let Some(target) = image.target() {
                r.destroy_target(target);
            }
            if r.cache.is_texture_bound(image.handle) {
                r.flush_batch()?;
                r.cache.forget_texture(image.handle);
                r.backend.bind_texture(None);
            }
            r.backend.delete_texture(image.handle);
            r.textures.remove(image.handle);
            Ok(())
        })
    }
}
