//! Thread-safe string interning for tags and fact names.
//!
//! Ids are dense, assigned in registration order, and never reused or changed. Concurrent callers
//! racing on the same name always converge on a single id: insertion goes through the dashmap
//! entry API, so only the first writer allocates.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct Interner {
    by_name: DashMap<Arc<str>, u32>,
    names: RwLock<Vec<Arc<str>>>,
    next: AtomicU32,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, name: &str) -> u32 {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }

        match self.by_name.entry(Arc::from(name)) {
            Entry::Occupied(existing) => *existing.get(),
            Entry::Vacant(slot) => {
                let id = self.next.fetch_add(1, Ordering::Relaxed);
                {
                    let mut names = self.names.write();
                    let index = id as usize;
                    if names.len() <= index {
                        names.resize(index + 1, Arc::from(""));
                    }
                    names[index] = slot.key().clone();
                }
                slot.insert(id);
                id
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).map(|id| *id)
    }

    pub fn name(&self, id: u32) -> Option<Arc<str>> {
        self.names.read().get(id as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.next.load(Ordering::Acquire) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interned symbolic category ("Tree", "Food"). Equality is integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tag(pub u32);

#[derive(Debug, Default)]
pub struct TagRegistry {
    interner: Interner,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_id(&self, name: &str) -> Tag {
        Tag(self.interner.intern(name))
    }

    pub fn lookup(&self, name: &str) -> Option<Tag> {
        self.interner.lookup(name).map(Tag)
    }

    pub fn name(&self, tag: Tag) -> Option<Arc<str>> {
        self.interner.name(tag.0)
    }

    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }
}
