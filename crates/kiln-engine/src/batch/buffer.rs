use crate::backend::Vertex;

pub const VERTICES_PER_QUAD: usize = 6;

/// Default capacity in vertices (1000 quads).
pub const DEFAULT_CAPACITY: usize = 6000;

/// Fixed-capacity vertex accumulator.
///
/// Capacity is fixed at construction and rounded down to whole quads.
#[derive(Debug)]
pub struct BatchBuffer {
    vertices: Vec<Vertex>,
    capacity: usize,
}

impl BatchBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = (capacity / VERTICES_PER_QUAD).max(1) * VERTICES_PER_QUAD;
        Self {
            vertices: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Whether one more quad fits without a flush.
    pub fn has_room(&self) -> bool {
        self.vertices.len() + VERTICES_PER_QUAD <= self.capacity
    }

    /// Appends one quad. Returns `false` (and appends nothing) when full.
    pub fn push_quad(&mut self, quad: [Vertex; VERTICES_PER_QUAD]) -> bool {
        if !self.has_room() {
            return false;
        }
        self.vertices.extend_from_slice(&quad);
        true
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

impl Default for BatchBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_rounds_to_whole_quads() {
        assert_eq!(BatchBuffer::new(6000).capacity(), 6000);
        assert_eq!(BatchBuffer::new(13).capacity(), 12);
        assert_eq!(BatchBuffer::new(0).capacity(), 6);
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut b = BatchBuffer::new(12);
        let quad = [Vertex::default(); VERTICES_PER_QUAD];
        assert!(b.push_quad(quad));
        assert!(b.push_quad(quad));
        assert!(!b.push_quad(quad));
        assert_eq!(b.len(), 12);
        b.clear();
        assert!(b.is_empty() && b.has_room());
    }
}
