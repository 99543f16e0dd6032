use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Untyped slot reference: index plus the generation the slot had when the
/// object was stored. A handle outlives its object harmlessly; lookups through
/// a stale handle find nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RawHandle {
    pub index:      u32,
    pub generation: u32,
}

/// Typed reference to an object owned by the resource cache.
///
/// Handles are plain values. Holding one does not keep the object alive; the
/// reference count is managed with the cache's `load_*` / `release_*` calls.
pub struct Handle<T> {
    pub(crate) raw: RawHandle,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(raw: RawHandle) -> Self {
        Self { raw, _kind: PhantomData }
    }

    pub fn index(self) -> u32 {
        self.raw.index
    }

    pub fn generation(self) -> u32 {
        self.raw.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = std::any::type_name::<T>().rsplit("::").next().unwrap_or("?");
        write!(f, "Handle<{}>({}v{})", name, self.raw.index, self.raw.generation)
    }
}
