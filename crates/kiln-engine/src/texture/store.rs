use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::backend::TextureHandle;

use super::{Image, ImageData};

/// Registry of the textures a renderer has created and not yet destroyed.
///
/// Entries are weak; the store never keeps an image alive. Textures whose
/// images were dropped without being freed stay registered until
/// [`TextureStore::drain`] at shutdown.
#[derive(Debug, Default)]
pub struct TextureStore {
    live: HashMap<TextureHandle, Weak<ImageData>>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: &Image) {
        self.live.insert(image.handle, Rc::downgrade(&image.0));
    }

    pub fn remove(&mut self, handle: TextureHandle) -> bool {
        self.live.remove(&handle).is_some()
    }

    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Removes every entry, returning the handles in ascending order.
    pub fn drain(&mut self) -> Vec<TextureHandle> {
        let mut handles: Vec<_> = self.live.drain().map(|(h, _)| h).collect();
        handles.sort();
        handles
    }
}
