use std::cell::Cell;
use std::ops::Deref;
use std::rc::Rc;

use crate::backend::TextureHandle;
use crate::coords::Color;
use crate::format::GpuFormat;
use crate::target::Target;

use super::Filter;

/// State of one GPU texture.
///
/// Sizes and format are fixed at creation. Settings that change over the
/// image's lifetime are updated through the [`crate::Renderer`].
#[derive(Debug)]
pub struct ImageData {
    pub(crate) renderer: u32,
    pub(crate) handle: TextureHandle,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) texture_width: u32,
    pub(crate) texture_height: u32,
    pub(crate) format: GpuFormat,

    pub(crate) target: Cell<Option<Target>>,
    pub(crate) has_mipmaps: Cell<bool>,
    pub(crate) filter: Cell<Filter>,
    pub(crate) color: Cell<Color>,
}

impl ImageData {
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Logical width as requested by the caller.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Storage width; larger than [`ImageData::width`] when padded to a power of two.
    pub fn texture_width(&self) -> u32 {
        self.texture_width
    }

    pub fn texture_height(&self) -> u32 {
        self.texture_height
    }

    pub fn channels(&self) -> u8 {
        self.format.channels()
    }

    pub fn format(&self) -> GpuFormat {
        self.format
    }

    pub fn is_padded(&self) -> bool {
        self.texture_width != self.width || self.texture_height != self.height
    }

    /// Render target attached with [`crate::Renderer::load_target`], if any.
    pub fn target(&self) -> Option<Target> {
        self.target.get()
    }

    pub fn has_mipmaps(&self) -> bool {
        self.has_mipmaps.get()
    }

    pub fn filter(&self) -> Filter {
        self.filter.get()
    }

    /// Modulation color applied when the image is drawn.
    pub fn color(&self) -> Color {
        self.color.get()
    }
}

/// Shared handle to a GPU image.
///
/// Cloning adds an owner. [`crate::Renderer::free_image`] releases one owner
/// and destroys the texture when it was the last.
#[derive(Debug, Clone)]
pub struct Image(pub(crate) Rc<ImageData>);

impl Image {
    pub(crate) fn new(data: ImageData) -> Self {
        Image(Rc::new(data))
    }

    /// Number of live owners of the texture.
    pub fn owners(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether both handles own the same texture.
    pub fn same_texture(&self, other: &Image) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Image {
    type Target = ImageData;

    fn deref(&self) -> &ImageData {
        &self.0
    }
}
