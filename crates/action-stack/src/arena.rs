//! Generational arena owning the nodes of a behavior.
//!
//! Nodes refer to each other (parent, child, buried, covering) by [`NodeId`]
//! instead of by reference. Each id carries the generation of the slot it was
//! issued for, so an id that outlives its node simply stops resolving: a
//! cascade that reaches an already freed node does nothing.

use std::fmt;

/// Index of a node inside its behavior's arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Raw slot index.
    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}:{})", self.index, self.generation)
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied { value: T, generation: u32 },
    Vacant { next_free: Option<u32>, generation: u32 },
}

/// Slot storage with a free list and per-slot generations.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live nodes.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub fn insert(&mut self, value: T) -> NodeId {
        self.len += 1;

        if let Some(free) = self.free_head {
            let slot = &mut self.slots[free as usize];
            let (next_free, generation) = match *slot {
                Slot::Vacant {
                    next_free,
                    generation,
                } => (next_free, generation),
                Slot::Occupied { .. } => unreachable!("free list pointed to occupied slot"),
            };
            self.free_head = next_free;
            *slot = Slot::Occupied { value, generation };
            NodeId {
                index: free,
                generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).expect("node arena overflow");
            self.slots.push(Slot::Occupied {
                value,
                generation: 0,
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Frees the slot and returns its value, or `None` if `id` is stale.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == id.generation => {
                let vacant = Slot::Vacant {
                    next_free: self.free_head,
                    generation: generation.wrapping_add(1),
                };
                let old = std::mem::replace(slot, vacant);
                self.free_head = Some(id.index);
                self.len -= 1;
                match old {
                    Slot::Occupied { value, .. } => Some(value),
                    Slot::Vacant { .. } => unreachable!(),
                }
            }
            _ => None,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.index as usize)? {
            Slot::Occupied { value, generation } if *generation == id.generation => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.index as usize)? {
            Slot::Occupied { value, generation } if *generation == id.generation => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut arena = Arena::new();
        let a = arena.insert("patrol");
        let b = arena.insert("attack");

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"patrol"));
        assert_eq!(arena.get(b), Some(&"attack"));
    }

    #[test]
    fn stale_id_does_not_resolve_after_reuse() {
        let mut arena = Arena::new();
        let old = arena.insert(1);
        assert_eq!(arena.remove(old), Some(1));

        let new = arena.insert(2);
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(arena.get(old).is_none());
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn double_remove_is_a_no_op() {
        let mut arena = Arena::new();
        let id = arena.insert("flee");
        assert!(arena.remove(id).is_some());
        assert!(arena.remove(id).is_none());
        assert_eq!(arena.len(), 0);
    }
}
