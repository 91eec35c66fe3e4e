use std::path::Path;

use crate::backend::{Backend, ProgramHandle, ShaderHandle, ShaderStage, UniformValue};
use crate::error::{Error, ErrorKind, Result};
use crate::target::Target;

use super::Renderer;

impl<B: Backend> Renderer<B> {
    /// Compiles one WGSL stage. Returns [`ShaderHandle::NONE`] on failure; see
    /// [`Renderer::shader_message`].
    pub fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> ShaderHandle {
        let shader = self.shaders.compile(&mut self.backend, stage, source);
        if shader.is_none() && self.shaders.is_enabled() {
            let message = self.shaders.message().to_string();
            self.push_error("compile_shader", ErrorKind::BackendError, message);
        }
        shader
    }

    /// Reads and compiles a WGSL file.
    pub fn load_shader(&mut self, stage: ShaderStage, path: impl AsRef<Path>) -> ShaderHandle {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => self.compile_shader(stage, &source),
            Err(e) => {
                let err = match e.kind() {
                    std::io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
                    _ => Error::Data(format!("{}: {e}", path.display())),
                };
                self.push_error("load_shader", err.kind(), err.to_string());
                ShaderHandle::NONE
            }
        }
    }

    /// Links stages into a program. Returns [`ProgramHandle::NONE`] on failure.
    pub fn link_program(&mut self, shaders: &[ShaderHandle]) -> ProgramHandle {
        let program = self.shaders.link(&mut self.backend, shaders);
        if program.is_none() && self.shaders.is_enabled() {
            let message = self.shaders.message().to_string();
            self.push_error("link_program", ErrorKind::BackendError, message);
        }
        program
    }

    /// Links a vertex and a fragment stage.
    pub fn link_shaders(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> ProgramHandle {
        self.link_program(&[vertex, fragment])
    }

    pub fn free_shader(&mut self, shader: ShaderHandle) {
        self.shaders.free_shader(&mut self.backend, shader);
    }

    /// Deletes a program. Targets using it fall back to the default program.
    pub fn free_program(&mut self, program: ProgramHandle) -> Result<()> {
        self.report("free_program", |r| {
            if program.is_none() || r.shaders.is_default_program(program) {
                return Ok(());
            }
            let users: Vec<Target> = r
                .targets
                .handles()
                .into_iter()
                .filter(|t| r.targets.get(*t).is_some_and(|rt| rt.program == program))
                .collect();
            for target in users {
                r.flush_target(target)?;
                r.target_mut(target)?.program = ProgramHandle::NONE;
            }
            r.shaders.free_program(&mut r.backend, program);
            Ok(())
        })
    }

    /// Draws into `target` with `program`; [`ProgramHandle::NONE`] selects the default.
    pub fn activate_program(&mut self, target: Target, program: ProgramHandle) -> Result<()> {
        self.report("activate_program", |r| {
            r.target_ref(target)?;
            if !r.shaders.is_enabled() {
                return Ok(());
            }
            r.flush_target(target)?;
            let program = if r.shaders.is_default_program(program) {
                ProgramHandle::NONE
            } else {
                program
            };
            r.target_mut(target)?.program = program;
            Ok(())
        })
    }

    pub fn deactivate_program(&mut self, target: Target) -> Result<()> {
        self.activate_program(target, ProgramHandle::NONE)
    }

    /// Program textured draws into `target` use.
    pub fn active_program(&self, target: Target) -> Result<ProgramHandle> {
        let rt = self.target_ref(target)?;
        Ok(self.shaders.program_for(rt.program, true))
    }

    pub fn default_program(&self, textured: bool) -> ProgramHandle {
        self.shaders.default_program(textured)
    }

    pub fn is_default_program(&self, program: ProgramHandle) -> bool {
        self.shaders.is_default_program(program)
    }

    /// Diagnostic of the last failed compile or link.
    pub fn shader_message(&self) -> &str {
        self.shaders.message()
    }

    /// Slot of a member of the program's uniform block, `None` if absent.
    pub fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.shaders.uniform_location(&self.backend, program, name)
    }

    /// Sets a uniform. Pending blits are drawn with the old value first.
    pub fn set_uniform(&mut self, program: ProgramHandle, location: u32, value: UniformValue) -> Result<()> {
        self.report("set_uniform", |r| {
            r.flush_batch()?;
            r.shaders.set_uniform(&mut r.backend, program, location, value);
            Ok(())
        })
    }

    pub fn get_uniform(&self, program: ProgramHandle, location: u32) -> Option<UniformValue> {
        self.shaders.uniform(&self.backend, program, location)
    }
}
