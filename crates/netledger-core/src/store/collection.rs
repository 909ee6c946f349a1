// ── Ordered entity collection ──
//
// Insertion-ordered storage with O(1) lookup by EntityId. Plain owned
// data: the whole inventory is cloned and swapped as one value, so no
// per-collection locking or change channels live here.

use indexmap::IndexMap;

use crate::model::{Device, EntityId, IpAddress, IpRange, OtherDevice, Vlan};

/// Anything stored in a [`Collection`] exposes its own primary key.
pub(crate) trait Keyed {
    fn key(&self) -> &EntityId;
}

macro_rules! impl_keyed {
    ($($ty:ty),* $(,)?) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &EntityId {
                &self.id
            }
        })*
    };
}

impl_keyed!(Vlan, IpRange, IpAddress, Device, OtherDevice);

#[derive(Debug, Clone)]
pub(crate) struct Collection<T> {
    by_id: IndexMap<EntityId, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            by_id: IndexMap::new(),
        }
    }
}

impl<T: Keyed> Collection<T> {
    /// Insert or replace an entity. Returns the previous value, if any.
    pub(crate) fn insert(&mut self, entity: T) -> Option<T> {
        self.by_id.insert(entity.key().clone(), entity)
    }

    /// Remove an entity, preserving the order of the rest.
    pub(crate) fn remove(&mut self, id: &EntityId) -> Option<T> {
        self.by_id.shift_remove(id)
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<&T> {
        self.by_id.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &EntityId) -> Option<&mut T> {
        self.by_id.get_mut(id)
    }

    pub(crate) fn contains(&self, id: &EntityId) -> bool {
        self.by_id.contains_key(id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.by_id.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.by_id.values_mut()
    }

    /// Keep only entities matching the predicate, preserving order.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.by_id.retain(|_, v| keep(v));
    }

    pub(crate) fn clear(&mut self) {
        self.by_id.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl<T: Keyed> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            by_id: iter.into_iter().map(|e| (e.key().clone(), e)).collect(),
        }
    }
}
