use crate::backend::{Backend, DrawState, Vertex};
use crate::error::Result;

/// How a batch reaches the backend. Chosen once per renderer from its tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SubmitPath {
    /// One call per triangle.
    Immediate,
    /// The whole batch from client memory in one call.
    VertexArrays,
    /// Stream into the vertex buffer, then draw it.
    VertexBuffer,
}

impl SubmitPath {
    pub fn submit<B: Backend + ?Sized>(self, backend: &mut B, state: &DrawState, vertices: &[Vertex]) -> Result<()> {
        if vertices.is_empty() {
            return Ok(());
        }
        match self {
            SubmitPath::Immediate => {
                for tri in vertices.chunks_exact(3) {
                    backend.draw_arrays(state, tri)?;
                }
                Ok(())
            }
            SubmitPath::VertexArrays => backend.draw_arrays(state, vertices),
            SubmitPath::VertexBuffer => {
                backend.stream_vertices(vertices)?;
                backend.draw_streamed(state, vertices.len() as u32)
            }
        }
    }
}
