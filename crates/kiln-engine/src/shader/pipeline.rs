use crate::backend::{Backend, Features, ProgramHandle, ShaderHandle, ShaderStage, UniformValue};

use super::{DEFAULT_TEXTURED_SOURCE, DEFAULT_UNTEXTURED_SOURCE, DEFAULT_VERTEX_SOURCE};

/// Diagnostic messages are cut to this many bytes.
pub const MAX_MESSAGE_LEN: usize = 256;

/// Program bookkeeping for one renderer.
///
/// Handles returned as [`ShaderHandle::NONE`] / [`ProgramHandle::NONE`] mean
/// failure; the reason is kept in [`ShaderPipeline::message`]. When the
/// backend has no programmable pipeline every operation returns the sentinel
/// and draws use the fixed pipeline.
#[derive(Debug, Default)]
pub struct ShaderPipeline {
    enabled: bool,
    message: String,
    default_textured: ProgramHandle,
    default_untextured: ProgramHandle,
    default_shaders: Vec<ShaderHandle>,
}

impl ShaderPipeline {
    /// Builds the default programs when the backend supports them.
    pub fn new<B: Backend + ?Sized>(backend: &mut B) -> Self {
        let mut pipeline = Self::default();

        if !backend.tier().has_shader_pipeline() || !backend.features().contains(Features::BASIC_SHADERS) {
            log::debug!("ShaderPipeline: fixed pipeline only ({:?})", backend.tier());
            return pipeline;
        }

        pipeline.enabled = true;
        let built = pipeline.build_defaults(backend);
        if !built {
            log::warn!(
                "ShaderPipeline: default programs failed, using fixed pipeline: {}",
                pipeline.message
            );
            pipeline.release(backend);
            pipeline.enabled = false;
        }
        pipeline
    }

    fn build_defaults<B: Backend + ?Sized>(&mut self, backend: &mut B) -> bool {
        let vs = self.compile(backend, ShaderStage::Vertex, DEFAULT_VERTEX_SOURCE);
        let textured_fs = self.compile(backend, ShaderStage::Fragment, DEFAULT_TEXTURED_SOURCE);
        let untextured_fs = self.compile(backend, ShaderStage::Fragment, DEFAULT_UNTEXTURED_SOURCE);
        self.default_shaders = [vs, textured_fs, untextured_fs]
            .into_iter()
            .filter(|s| !s.is_none())
            .collect();
        if vs.is_none() || textured_fs.is_none() || untextured_fs.is_none() {
            return false;
        }

        self.default_textured = self.link(backend, &[vs, textured_fs]);
        self.default_untextured = self.link(backend, &[vs, untextured_fs]);
        !self.default_textured.is_none() && !self.default_untextured.is_none()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last compile or link diagnostic.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn default_program(&self, textured: bool) -> ProgramHandle {
        if textured { self.default_textured } else { self.default_untextured }
    }

    pub fn is_default_program(&self, program: ProgramHandle) -> bool {
        !program.is_none() && (program == self.default_textured || program == self.default_untextured)
    }

    /// Program to draw with: a default program follows the draw kind, user
    /// programs are used as-is.
    pub fn program_for(&self, active: ProgramHandle, textured: bool) -> ProgramHandle {
        if !self.enabled {
            return ProgramHandle::NONE;
        }
        if active.is_none() || self.is_default_program(active) {
            self.default_program(textured)
        } else {
            active
        }
    }

    fn set_message(&mut self, message: impl Into<String>) {
        let mut message = message.into();
        if message.len() > MAX_MESSAGE_LEN {
            let mut end = MAX_MESSAGE_LEN;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        self.message = message;
    }

    pub fn compile<B: Backend + ?Sized>(&mut self, backend: &mut B, stage: ShaderStage, source: &str) -> ShaderHandle {
        if !self.enabled {
            return ShaderHandle::NONE;
        }
        if !backend.features().contains(stage.required_feature()) {
            self.set_message(format!("{stage:?} shaders are not supported by this backend"));
            return ShaderHandle::NONE;
        }
        match backend.compile_shader(stage, source) {
            Ok(handle) => handle,
            Err(log) => {
                self.set_message(log);
                ShaderHandle::NONE
            }
        }
    }

    pub fn link<B: Backend + ?Sized>(&mut self, backend: &mut B, shaders: &[ShaderHandle]) -> ProgramHandle {
        if !self.enabled {
            return ProgramHandle::NONE;
        }
        if shaders.iter().any(|s| s.is_none()) {
            self.set_message("cannot link a failed shader");
            return ProgramHandle::NONE;
        }
        match backend.link_program(shaders) {
            Ok(handle) => handle,
            Err(log) => {
                self.set_message(log);
                ProgramHandle::NONE
            }
        }
    }

    pub fn free_shader<B: Backend + ?Sized>(&mut self, backend: &mut B, shader: ShaderHandle) {
        if self.enabled && !shader.is_none() && !self.default_shaders.contains(&shader) {
            backend.delete_shader(shader);
        }
    }

    /// Default programs are owned by the pipeline and never freed here.
    pub fn free_program<B: Backend + ?Sized>(&mut self, backend: &mut B, program: ProgramHandle) -> bool {
        if !self.enabled || program.is_none() || self.is_default_program(program) {
            return false;
        }
        backend.delete_program(program);
        true
    }

    pub fn uniform_location<B: Backend + ?Sized>(&self, backend: &B, program: ProgramHandle, name: &str) -> Option<u32> {
        if !self.enabled || program.is_none() {
            return None;
        }
        backend.uniform_location(program, name)
    }

    pub fn set_uniform<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        program: ProgramHandle,
        location: u32,
        value: UniformValue,
    ) {
        if self.enabled && !program.is_none() {
            backend.set_uniform(program, location, value);
        }
    }

    pub fn uniform<B: Backend + ?Sized>(&self, backend: &B, program: ProgramHandle, location: u32) -> Option<UniformValue> {
        if !self.enabled || program.is_none() {
            return None;
        }
        backend.uniform(program, location)
    }

    /// Deletes the default programs and their stages.
    pub fn release<B: Backend + ?Sized>(&mut self, backend: &mut B) {
        for program in [self.default_textured, self.default_untextured] {
            if !program.is_none() {
                backend.delete_program(program);
            }
        }
        for shader in self.default_shaders.drain(..) {
            backend.delete_shader(shader);
        }
        self.default_textured = ProgramHandle::NONE;
        self.default_untextured = ProgramHandle::NONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SoftwareBackend, SoftwareInit, Tier};

    fn backend(tier: Tier) -> SoftwareBackend {
        SoftwareBackend::new(SoftwareInit {
            tier,
            ..Default::default()
        })
    }

    // ── defaults ──────────────────────────────────────────────────────────

    #[test]
    fn defaults_build_on_programmable_tiers() {
        let mut b = backend(Tier::VertexBuffers);
        let p = ShaderPipeline::new(&mut b);
        assert!(p.is_enabled(), "{}", p.message());
        assert!(!p.default_program(true).is_none());
        assert!(!p.default_program(false).is_none());
        assert_ne!(p.default_program(true), p.default_program(false));
    }

    #[test]
    fn fixed_function_returns_sentinels() {
        let mut b = backend(Tier::FixedFunction);
        let mut p = ShaderPipeline::new(&mut b);
        assert!(!p.is_enabled());
        assert!(p.compile(&mut b, ShaderStage::Vertex, DEFAULT_VERTEX_SOURCE).is_none());
        assert!(p.program_for(ProgramHandle(7), true).is_none());
    }

    #[test]
    fn default_program_follows_draw_kind() {
        let mut b = backend(Tier::VertexArrays);
        let p = ShaderPipeline::new(&mut b);
        let textured = p.default_program(true);
        assert_eq!(p.program_for(textured, false), p.default_program(false));
        assert_eq!(p.program_for(ProgramHandle::NONE, true), textured);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn compile_failure_keeps_message() {
        let mut b = backend(Tier::VertexBuffers);
        let mut p = ShaderPipeline::new(&mut b);
        let s = p.compile(&mut b, ShaderStage::Fragment, "this is not wgsl");
        assert!(s.is_none());
        assert!(!p.message().is_empty());
        assert!(p.message().len() <= MAX_MESSAGE_LEN);
    }

    #[test]
    fn geometry_stage_needs_feature() {
        let mut b = backend(Tier::VertexArrays);
        let mut p = ShaderPipeline::new(&mut b);
        let s = p.compile(&mut b, ShaderStage::Geometry, DEFAULT_VERTEX_SOURCE);
        assert!(s.is_none());
        assert!(p.message().contains("Geometry"));
    }

    #[test]
    fn linking_a_failed_shader_fails() {
        let mut b = backend(Tier::VertexBuffers);
        let mut p = ShaderPipeline::new(&mut b);
        let vs = p.compile(&mut b, ShaderStage::Vertex, DEFAULT_VERTEX_SOURCE);
        assert!(p.link(&mut b, &[vs, ShaderHandle::NONE]).is_none());
    }

    #[test]
    fn long_messages_are_truncated_on_char_boundary() {
        let mut p = ShaderPipeline::default();
        p.set_message("é".repeat(200));
        assert!(p.message().len() <= MAX_MESSAGE_LEN);
        assert!(p.message().chars().all(|c| c == 'é'));
    }

    #[test]
    fn defaults_cannot_be_freed() {
        let mut b = backend(Tier::VertexBuffers);
        let mut p = ShaderPipeline::new(&mut b);
        let textured = p.default_program(true);
        assert!(!p.free_program(&mut b, textured));
        assert!(p.is_default_program(textured));
    }
}
