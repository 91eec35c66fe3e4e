use bitflags::bitflags;

use crate::batch::SubmitPath;

bitflags! {
    /// Optional backend capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        /// Textures may have any size; otherwise storage is padded to powers of two.
        const NON_POWER_OF_TWO    = 1 << 0;
        /// Textures can be attached as framebuffers.
        const RENDER_TARGETS      = 1 << 1;
        /// Subtract and reverse-subtract blend equations.
        const BLEND_EQUATIONS     = 1 << 2;
        /// Separate color/alpha blend factors.
        const BLEND_FUNC_SEPARATE = 1 << 3;
        const BGR                 = 1 << 4;
        const BGRA                = 1 << 5;
        const ABGR                = 1 << 6;
        const VERTEX_SHADER       = 1 << 7;
        const FRAGMENT_SHADER     = 1 << 8;
        const GEOMETRY_SHADER     = 1 << 9;
        /// Texture contents can be read back without a framebuffer.
        const TEXTURE_READBACK    = 1 << 10;

        const BASIC_SHADERS = Self::VERTEX_SHADER.bits() | Self::FRAGMENT_SHADER.bits();
        const ALL_SHADERS = Self::BASIC_SHADERS.bits() | Self::GEOMETRY_SHADER.bits();
        const CHANNEL_ORDERINGS = Self::BGR.bits() | Self::BGRA.bits() | Self::ABGR.bits();
    }
}

/// Capability tier of a backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Per-vertex immediate submission, no programmable pipeline.
    FixedFunction,
    /// Client-side vertex arrays with vertex and fragment programs.
    VertexArrays,
    /// Streamed vertex buffers with the full programmable pipeline.
    VertexBuffers,
    /// Embedded profile: vertex arrays, programs, no texture readback.
    Embedded,
}

impl Tier {
    pub fn submit_path(self) -> SubmitPath {
        match self {
            Tier::FixedFunction => SubmitPath::Immediate,
            Tier::VertexArrays | Tier::Embedded => SubmitPath::VertexArrays,
            Tier::VertexBuffers => SubmitPath::VertexBuffer,
        }
    }

    pub fn has_shader_pipeline(self) -> bool {
        !matches!(self, Tier::FixedFunction)
    }

    /// Features a device of this tier typically exposes.
    pub fn default_features(self) -> Features {
        let desktop = Features::NON_POWER_OF_TWO
            | Features::RENDER_TARGETS
            | Features::BLEND_EQUATIONS
            | Features::BLEND_FUNC_SEPARATE
            | Features::CHANNEL_ORDERINGS
            | Features::TEXTURE_READBACK;

        match self {
            Tier::FixedFunction => desktop,
            Tier::VertexArrays => desktop | Features::BASIC_SHADERS,
            Tier::VertexBuffers => desktop | Features::ALL_SHADERS,
            Tier::Embedded => {
                Features::RENDER_TARGETS
                    | Features::BLEND_EQUATIONS
                    | Features::BLEND_FUNC_SEPARATE
                    | Features::BGRA
                    | Features::BASIC_SHADERS
            }
        }
    }
}
