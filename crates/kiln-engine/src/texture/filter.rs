use crate::backend::{FilterMode, SamplerState};

/// How an image is sampled when it is drawn at another size.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
    /// Linear within and between mip levels.
    LinearMipmap,
}

impl Filter {
    pub fn sampler(self, has_mipmaps: bool) -> SamplerState {
        match self {
            Filter::Nearest => SamplerState {
                min: FilterMode::Nearest,
                mag: FilterMode::Nearest,
                mipmap: None,
            },
            Filter::Linear => SamplerState {
                min: FilterMode::Linear,
                mag: FilterMode::Linear,
                mipmap: has_mipmaps.then_some(FilterMode::Nearest),
            },
            Filter::LinearMipmap => SamplerState {
                min: FilterMode::Linear,
                mag: FilterMode::Linear,
                mipmap: has_mipmaps.then_some(FilterMode::Linear),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_never_uses_mips() {
        assert_eq!(Filter::Nearest.sampler(true).mipmap, None);
    }

    #[test]
    fn mip_filter_needs_mipmaps() {
        assert_eq!(Filter::LinearMipmap.sampler(false).mipmap, None);
        assert_eq!(Filter::LinearMipmap.sampler(true).mipmap, Some(FilterMode::Linear));
        assert_eq!(Filter::Linear.sampler(true).mipmap, Some(FilterMode::Nearest));
    }
}
