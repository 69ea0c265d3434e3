//! Generic handle-based storage.
//!
//! A [`Store`] hands out typed [`H`] handles for the items added to it.
//! Handles are plain `u32` ids under the hood and stay valid until the item
//! is removed. Stores for asset types with built-in defaults are created
//! through [`Store::populated`] so that the well-known handles always
//! resolve.

pub mod asset_store;

use dashmap::DashMap;
use dashmap::mapref::one::{Ref, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

/// Typed handle into a [`Store`].
pub struct H<T>(u32, PhantomData<fn() -> T>);

impl<T> H<T> {
    pub const fn new(id: u32) -> Self {
        H(id, PhantomData)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

impl<T> Clone for H<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for H<T> {}

impl<T> PartialEq for H<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for H<T> {}

impl<T> Hash for H<T> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.0.hash(state);
    }
}

impl<T> fmt::Debug for H<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H<{}>({})", std::any::type_name::<T>(), self.0)
    }
}

/// Types that seed a freshly created store with well-known defaults.
pub trait StoreDefaults: Sized {
    fn populate(store: &Store<Self>);
}

pub struct Store<T> {
    items: DashMap<u32, T>,
    next_id: AtomicU32,
}

impl<T> Store<T> {
    pub fn empty() -> Self {
        Store {
            items: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    pub fn add(&self, item: T) -> H<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.items.insert(id, item);
        H::new(id)
    }

    /// Adds a default item, asserting it lands on its well-known handle.
    /// Only meaningful while populating a fresh store.
    pub fn add_default(&self, expected: H<T>, item: T) {
        let handle = self.add(item);
        debug_assert_eq!(
            handle, expected,
            "default asset registered out of order"
        );
    }

    pub fn try_get(&self, handle: H<T>) -> Option<Ref<'_, u32, T>> {
        self.items.get(&handle.id())
    }

    pub fn try_get_mut(&self, handle: H<T>) -> Option<RefMut<'_, u32, T>> {
        self.items.get_mut(&handle.id())
    }

    pub fn contains(&self, handle: H<T>) -> bool {
        self.items.contains_key(&handle.id())
    }

    pub fn remove(&self, handle: H<T>) -> Option<T> {
        self.items.remove(&handle.id()).map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: StoreDefaults> Store<T> {
    pub fn populated() -> Self {
        let store = Store::empty();
        T::populate(&store);
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_stable_and_typed() {
        let store: Store<u32> = Store::empty();
        let a = store.add(7);
        let b = store.add(9);

        assert_ne!(a, b);
        assert_eq!(*store.try_get(a).unwrap(), 7);
        assert_eq!(*store.try_get(b).unwrap(), 9);
    }

    #[test]
    fn removal_invalidates_only_the_removed_handle() {
        let store: Store<&str> = Store::empty();
        let a = store.add("keep");
        let b = store.add("drop");

        assert_eq!(store.remove(b), Some("drop"));
        assert!(store.try_get(b).is_none());
        assert_eq!(*store.try_get(a).unwrap(), "keep");
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let store: Store<u8> = Store::empty();
        let a = store.add(1);
        store.remove(a);
        let b = store.add(2);
        assert_ne!(a, b);
    }
}
