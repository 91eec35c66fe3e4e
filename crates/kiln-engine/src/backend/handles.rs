/// Backend texture object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Backend framebuffer object. [`FramebufferHandle::WINDOW`] is the window surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferHandle(pub u32);

impl FramebufferHandle {
    pub const WINDOW: FramebufferHandle = FramebufferHandle(0);

    #[inline]
    pub fn is_window(self) -> bool {
        self == Self::WINDOW
    }
}

/// Compiled shader stage. `0` means "no shader".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ShaderHandle(pub u32);

impl ShaderHandle {
    pub const NONE: ShaderHandle = ShaderHandle(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Linked program. `0` selects the built-in pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ProgramHandle(pub u32);

impl ProgramHandle {
    pub const NONE: ProgramHandle = ProgramHandle(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}
