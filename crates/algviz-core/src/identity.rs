//! Compact ids for the layout engine.
//!
//! The layout engine wants small dense integers; scenes key everything by native identity.
//! [`IdentityMap`] keeps the two in a bijection, hands out the smallest free id first and only
//! reuses an id after it was explicitly released.

use crate::{Error, Result};
use rustc_hash::FxHashMap as HashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct IdentityMap<K> {
    offset: u32,
    compact: HashMap<K, u32>,
    slots: Vec<Option<K>>,
    free: BinaryHeap<Reverse<u32>>,
}

impl<K: Copy + Eq + Hash> IdentityMap<K> {
    pub fn new(offset: u32) -> Self {
        Self {
            offset,
            compact: HashMap::default(),
            slots: Vec::new(),
            free: BinaryHeap::new(),
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.compact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compact.is_empty()
    }

    /// Existing mapping without allocating.
    pub fn get(&self, identity: &K) -> Option<u32> {
        self.compact.get(identity).copied()
    }

    pub fn to_compact(&mut self, identity: K) -> u32 {
        if let Some(&id) = self.compact.get(&identity) {
            return id;
        }
        let id = match self.free.pop() {
            Some(Reverse(id)) => id,
            None => self.offset + self.slots.len() as u32,
        };
        let slot = (id - self.offset) as usize;
        if slot == self.slots.len() {
            self.slots.push(Some(identity));
        } else {
            self.slots[slot] = Some(identity);
        }
        self.compact.insert(identity, id);
        id
    }

    pub fn to_identity(&self, id: u32) -> Result<K> {
        id.checked_sub(self.offset)
            .and_then(|slot| self.slots.get(slot as usize))
            .and_then(|k| *k)
            .ok_or(Error::UnknownId { id })
    }

    /// Frees the identity's id for reuse. Returns the released id, if any.
    pub fn release(&mut self, identity: &K) -> Option<u32> {
        let id = self.compact.remove(identity)?;
        if let Some(slot) = self.slots.get_mut((id - self.offset) as usize) {
            *slot = None;
        }
        self.free.push(Reverse(id));
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_from_the_offset() {
        let mut m: IdentityMap<u64> = IdentityMap::new(10);
        assert_eq!(m.to_compact(7), 10);
        assert_eq!(m.to_compact(3), 11);
        assert_eq!(m.to_compact(7), 10);
        assert_eq!(m.to_identity(11), Ok(3));
        assert_eq!(m.to_identity(9), Err(Error::UnknownId { id: 9 }));
        assert_eq!(m.to_identity(12), Err(Error::UnknownId { id: 12 }));
    }

    #[test]
    fn smallest_released_id_is_recycled_first() {
        let mut m: IdentityMap<u64> = IdentityMap::new(0);
        for k in 0..4 {
            m.to_compact(k);
        }
        assert_eq!(m.release(&2), Some(2));
        assert_eq!(m.release(&1), Some(1));
        assert_eq!(m.release(&1), None);
        assert_eq!(m.to_identity(1), Err(Error::UnknownId { id: 1 }));

        assert_eq!(m.to_compact(100), 1);
        assert_eq!(m.to_compact(101), 2);
        assert_eq!(m.to_compact(102), 4);
        assert_eq!(m.len(), 5);
    }
}
