//! Globally shared, lock-free fact store.
//!
//! Each fact occupies one `AtomicU64` holding its packed [`FactValue`] (0 = unknown). Storage is a
//! list of segments whose sizes double (`BASE`, `2*BASE`, `4*BASE`, ...); growing only ever
//! appends a segment, so existing words never move and readers never lock. The narrow `grow` lock
//! serializes appending segments and is taken only when a write touches a fact past the current
//! capacity.
//!
//! Every mutation bumps `version`, letting readers detect staleness with a single load.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::{FactId, FactValue, State};

const BASE: usize = 64;
const SEGMENTS: usize = 26;

#[derive(Debug)]
pub struct SharedFactStore {
    segments: [OnceLock<Box<[AtomicU64]>>; SEGMENTS],
    capacity: AtomicUsize,
    grow: Mutex<()>,
    version: AtomicU64,
}

impl Default for SharedFactStore {
    fn default() -> Self {
        Self::new()
    }
}

fn locate(index: usize) -> (usize, usize) {
    let n = index / BASE + 1;
    let segment = (usize::BITS - 1 - n.leading_zeros()) as usize;
    let start = BASE * ((1usize << segment) - 1);
    (segment, index - start)
}

impl SharedFactStore {
    pub fn new() -> Self {
        Self {
            segments: std::array::from_fn(|_| OnceLock::new()),
            capacity: AtomicUsize::new(0),
            grow: Mutex::new(()),
            version: AtomicU64::new(0),
        }
    }

    /// Number of fact slots currently allocated.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Acquire)
    }

    /// Monotonically increasing mutation counter.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Make sure `id` has a slot. Returns `false` if the id is beyond the maximum capacity.
    pub fn reserve(&self, id: FactId) -> bool {
        let needed = id.index() + 1;
        if self.capacity() >= needed {
            return true;
        }

        let _guard = self.grow.lock();
        let mut capacity = self.capacity();
        while capacity < needed {
            let (segment, _) = locate(capacity);
            if segment >= SEGMENTS {
                return false;
            }
            let size = BASE << segment;
            let _ = self.segments[segment]
                .get_or_init(|| (0..size).map(|_| AtomicU64::new(0)).collect());
            capacity += size;
            self.capacity.store(capacity, Ordering::Release);
        }
        true
    }

    fn slot(&self, id: FactId) -> Option<&AtomicU64> {
        let (segment, offset) = locate(id.index());
        self.segments.get(segment)?.get()?.get(offset)
    }

    pub fn get(&self, id: FactId) -> Option<FactValue> {
        let word = self.slot(id)?.load(Ordering::Acquire);
        FactValue::from_bits(word)
    }

    /// Store a value. Returns `false` only when the id cannot be allocated.
    pub fn set(&self, id: FactId, value: FactValue) -> bool {
        if !self.reserve(id) {
            tracing::warn!(fact = id.0, "shared fact store capacity exhausted");
            return false;
        }
        let Some(slot) = self.slot(id) else {
            return false;
        };
        slot.store(value.to_bits(), Ordering::Release);
        self.version.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Atomically replace `current` with `new`. `None` means unknown on either side.
    pub fn compare_and_set(
        &self,
        id: FactId,
        current: Option<FactValue>,
        new: Option<FactValue>,
    ) -> bool {
        if !self.reserve(id) {
            return false;
        }
        let Some(slot) = self.slot(id) else {
            return false;
        };
        let expected = current.map(FactValue::to_bits).unwrap_or(0);
        let replacement = new.map(FactValue::to_bits).unwrap_or(0);
        let swapped = slot
            .compare_exchange(expected, replacement, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if swapped {
            self.version.fetch_add(1, Ordering::AcqRel);
        }
        swapped
    }

    /// Reset a fact to unknown.
    pub fn clear(&self, id: FactId) {
        if let Some(slot) = self.slot(id) {
            if slot.swap(0, Ordering::AcqRel) != 0 {
                self.version.fetch_add(1, Ordering::AcqRel);
            }
        }
    }

    /// Copy the listed facts into `out`. Unknown facts are removed from `out`.
    pub fn snapshot_into(&self, ids: &[FactId], out: &mut State) {
        for &id in ids {
            match self.get(id) {
                Some(value) => out.set(id, value),
                None => {
                    out.remove(id);
                }
            }
        }
    }
}
