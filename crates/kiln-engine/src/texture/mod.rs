//! GPU images: shared handles, sampling filters, upload helpers and the
//! per-renderer registry of live textures.

mod filter;
mod shared;
mod store;
mod upload;

pub use filter::Filter;
pub use shared::{Image, ImageData};
pub use store::TextureStore;
pub(crate) use upload::{specify_pixels, storage_size, upload_pixels};
