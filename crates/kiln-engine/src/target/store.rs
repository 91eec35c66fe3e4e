use super::RenderTarget;

/// Copyable handle to a render target owned by a renderer.
///
/// A handle outlives its target; lookups through a stale or foreign handle fail.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub(crate) renderer: u32,
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    target: Option<RenderTarget>,
}

/// Generational slab of render targets.
#[derive(Debug)]
pub struct TargetStore {
    renderer: u32,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl TargetStore {
    pub fn new(renderer: u32) -> Self {
        Self {
            renderer,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn insert(&mut self, target: RenderTarget) -> Target {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.target = Some(target);
        Target {
            renderer: self.renderer,
            index,
            generation: slot.generation,
        }
    }

    fn slot(&self, target: Target) -> Option<&Slot> {
        if target.renderer != self.renderer {
            return None;
        }
        self.slots
            .get(target.index as usize)
            .filter(|s| s.generation == target.generation)
    }

    pub fn get(&self, target: Target) -> Option<&RenderTarget> {
        self.slot(target)?.target.as_ref()
    }

    pub fn get_mut(&mut self, target: Target) -> Option<&mut RenderTarget> {
        self.slot(target)?;
        self.slots[target.index as usize].target.as_mut()
    }

    pub fn contains(&self, target: Target) -> bool {
        self.get(target).is_some()
    }

    /// Removes the target; the handle and any copies of it become stale.
    pub fn remove(&mut self, target: Target) -> Option<RenderTarget> {
        self.get(target)?;
        let slot = &mut self.slots[target.index as usize];
        let removed = slot.target.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(target.index);
        removed
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.target.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles of all live targets.
    pub fn handles(&self) -> Vec<Target> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.target.is_some())
            .map(|(i, s)| Target {
                renderer: self.renderer,
                index: i as u32,
                generation: s.generation,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FramebufferHandle;
    use crate::target::TargetKind;

    fn rt(id: u32) -> RenderTarget {
        RenderTarget::new(FramebufferHandle(id), TargetKind::Window, 8, 8, true)
    }

    #[test]
    fn removed_handle_goes_stale() {
        let mut s = TargetStore::new(1);
        let a = s.insert(rt(1));
        assert!(s.remove(a).is_some());
        assert!(s.get(a).is_none());
        assert!(s.remove(a).is_none());
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut s = TargetStore::new(1);
        let a = s.insert(rt(1));
        s.remove(a);
        let b = s.insert(rt(2));
        assert_eq!(a.index, b.index);
        assert_ne!(a, b);
        assert!(s.get(a).is_none());
        assert_eq!(s.get(b).map(|t| t.handle()), Some(FramebufferHandle(2)));
    }

    #[test]
    fn foreign_handle_is_rejected() {
        let mut mine = TargetStore::new(1);
        let mut other = TargetStore::new(2);
        mine.insert(rt(1));
        let foreign = other.insert(rt(1));
        assert!(mine.get(foreign).is_none());
    }

    #[test]
    fn handles_lists_live_targets() {
        let mut s = TargetStore::new(1);
        let a = s.insert(rt(1));
        let b = s.insert(rt(2));
        s.remove(a);
        assert_eq!(s.handles(), vec![b]);
        assert_eq!(s.len(), 1);
    }
}
