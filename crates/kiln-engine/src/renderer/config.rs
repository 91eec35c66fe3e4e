use crate::batch::DEFAULT_CAPACITY;
use crate::texture::Filter;

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererInit {
    /// Blit batch size in vertices; rounded down to whole quads.
    pub blit_buffer_capacity: usize,

    /// Blending state of new render targets.
    pub enable_blending: bool,

    /// Filter of new images.
    pub default_filter: Filter,

    /// Stroke width of new render targets.
    pub line_thickness: f32,

    /// Log every recorded error at `warn`.
    pub log_errors: bool,
}

impl Default for RendererInit {
    fn default() -> Self {
        Self {
            blit_buffer_capacity: DEFAULT_CAPACITY,
            enable_blending: true,
            default_filter: Filter::Linear,
            line_thickness: 1.0,
            log_errors: true,
        }
    }
}
