use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{FactId, FactRegistry, FactValue};

/// Sparse snapshot of facts.
///
/// Entries are kept sorted by `FactId`, which makes the representation canonical: two states with
/// the same (fact, value) pairs compare and hash equal regardless of insertion order. A fact that
/// was never set is unknown, which is different from `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct State {
    entries: Vec<(FactId, FactValue)>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn set(&mut self, id: FactId, value: impl Into<FactValue>) {
        let value = value.into();
        match self.entries.binary_search_by_key(&id, |(k, _)| *k) {
            Ok(i) => self.entries[i].1 = value,
            Err(i) => self.entries.insert(i, (id, value)),
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, id: FactId, value: impl Into<FactValue>) -> Self {
        self.set(id, value);
        self
    }

    /// Forget a fact (back to unknown). Returns the previous value.
    pub fn remove(&mut self, id: FactId) -> Option<FactValue> {
        let i = self.entries.binary_search_by_key(&id, |(k, _)| *k).ok()?;
        Some(self.entries.remove(i).1)
    }

    pub fn try_get(&self, id: FactId) -> Option<FactValue> {
        self.entries
            .binary_search_by_key(&id, |(k, _)| *k)
            .ok()
            .map(|i| self.entries[i].1)
    }

    pub fn contains(&self, id: FactId) -> bool {
        self.try_get(id).is_some()
    }

    pub fn get_bool(&self, id: FactId) -> Option<bool> {
        self.try_get(id)?.as_bool()
    }

    pub fn get_int(&self, id: FactId) -> Option<i32> {
        self.try_get(id)?.as_int()
    }

    pub fn get_float(&self, id: FactId) -> Option<f32> {
        self.try_get(id)?.as_float()
    }

    /// True when every fact in `target` is present here with an equal value.
    ///
    /// Both sides are sorted, so this is a single merge walk.
    pub fn satisfies(&self, target: &State) -> bool {
        let mut mine = self.entries.iter().peekable();
        'outer: for (id, want) in &target.entries {
            while let Some((k, v)) = mine.peek() {
                if k < id {
                    mine.next();
                    continue;
                }
                if k == id && v == want {
                    mine.next();
                    continue 'outer;
                }
                return false;
            }
            return false;
        }
        true
    }

    /// Number of facts in `target` that this state does not satisfy.
    pub fn distance_to(&self, target: &State) -> usize {
        target
            .entries
            .iter()
            .filter(|(id, want)| self.try_get(*id) != Some(*want))
            .count()
    }

    /// Overwrite this state's facts with every fact of `other`.
    pub fn extend_from(&mut self, other: &State) {
        for (id, value) in &other.entries {
            self.set(*id, *value);
        }
    }

    /// Entries in canonical (fact id) order.
    pub fn iter(&self) -> impl Iterator<Item = (FactId, FactValue)> + '_ {
        self.entries.iter().copied()
    }

    pub fn display<'a>(&'a self, facts: &'a FactRegistry) -> StateDisplay<'a> {
        StateDisplay { state: self, facts }
    }
}

impl FromIterator<(FactId, FactValue)> for State {
    fn from_iter<I: IntoIterator<Item = (FactId, FactValue)>>(iter: I) -> Self {
        let mut state = State::new();
        for (id, value) in iter {
            state.set(id, value);
        }
        state
    }
}

/// Human-readable rendering of a state using registered fact names.
pub struct StateDisplay<'a> {
    state: &'a State,
    facts: &'a FactRegistry,
}

impl fmt::Display for StateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (id, value)) in self.state.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match self.facts.name(id) {
                Some(name) => write!(f, "{name}: {value}")?,
                None => write!(f, "?{}: {value}", id.0)?,
            }
        }
        f.write_str("}")
    }
}
