use crate::handle::RawHandle;

use super::kind::Resource;

/// A stored resource with its bookkeeping.
#[derive(Debug)]
pub(crate) struct Entry {
    /// Store key the resource was registered under.
    pub hash:     u64,
    pub refs:     u32,
    pub resource: Resource,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry:      Option<Entry>,
}

/// Generational slot storage. Each entry carries its own store key so
/// removing it needs no reverse lookup.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free:  Vec<u32>,
}

impl Arena {
    /// Stores `resource` with a reference count of one.
    pub fn insert(&mut self, hash: u64, resource: Resource) -> RawHandle {
        let entry = Entry { hash, refs: 1, resource };
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = Some(entry);
                RawHandle { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, entry: Some(entry) });
                RawHandle { index, generation: 0 }
            }
        }
    }

    pub fn get(&self, handle: RawHandle) -> Option<&Entry> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?
            .entry
            .as_ref()
    }

    pub fn get_mut(&mut self, handle: RawHandle) -> Option<&mut Entry> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?
            .entry
            .as_mut()
    }

    /// Takes the entry out and retires the handle.
    pub fn remove(&mut self, handle: RawHandle) -> Option<Entry> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(entry)
    }

    /// Removes every entry, retiring all outstanding handles.
    pub fn drain(&mut self) -> Vec<Entry> {
        let mut out = Vec::new();
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(entry) = slot.entry.take() {
                slot.generation = slot.generation.wrapping_add(1);
                out.push(entry);
            }
            self.free.push(index as u32);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
