use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::intern::Interner;

/// Interned fact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactId(pub u32);

impl FactId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Compact tagged value of a fact.
///
/// Packs into a single `u64` word (`to_bits`): the variant tag sits in bits 32..34 and the payload
/// in the low 32 bits. The all-zero word is reserved for "unknown", so a packed value is never 0.
///
/// Equality, hashing and ordering are defined on the packed word. For floats that means bit
/// equality: `-0.0 != 0.0` and a NaN equals itself.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FactValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

const TAG_SHIFT: u32 = 32;
const TAG_BOOL: u64 = 1;
const TAG_INT: u64 = 2;
const TAG_FLOAT: u64 = 3;
const PAYLOAD_MASK: u64 = 0xFFFF_FFFF;

impl FactValue {
    pub const fn to_bits(self) -> u64 {
        match self {
            FactValue::Bool(b) => (TAG_BOOL << TAG_SHIFT) | (b as u64),
            FactValue::Int(i) => (TAG_INT << TAG_SHIFT) | (i as u32 as u64),
            FactValue::Float(f) => (TAG_FLOAT << TAG_SHIFT) | (f.to_bits() as u64),
        }
    }

    /// Decode a packed word. Returns `None` for the unknown word (and any malformed tag).
    pub const fn from_bits(bits: u64) -> Option<Self> {
        let payload = (bits & PAYLOAD_MASK) as u32;
        match bits >> TAG_SHIFT {
            TAG_BOOL => Some(FactValue::Bool(payload != 0)),
            TAG_INT => Some(FactValue::Int(payload as i32)),
            TAG_FLOAT => Some(FactValue::Float(f32::from_bits(payload))),
            _ => None,
        }
    }

    pub const fn as_bool(self) -> Option<bool> {
        match self {
            FactValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub const fn as_int(self) -> Option<i32> {
        match self {
            FactValue::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Numeric view; ints widen to float.
    pub fn as_float(self) -> Option<f32> {
        match self {
            FactValue::Float(f) => Some(f),
            FactValue::Int(i) => Some(i as f32),
            FactValue::Bool(_) => None,
        }
    }
}

impl PartialEq for FactValue {
    fn eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Eq for FactValue {}

impl Hash for FactValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl PartialOrd for FactValue {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FactValue {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.to_bits().cmp(&other.to_bits())
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Bool(value)
    }
}

impl From<i32> for FactValue {
    fn from(value: i32) -> Self {
        FactValue::Int(value)
    }
}

impl From<f32> for FactValue {
    fn from(value: f32) -> Self {
        FactValue::Float(value)
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Bool(b) => write!(f, "{b}"),
            FactValue::Int(i) => write!(f, "{i}"),
            FactValue::Float(x) => write!(f, "{x:.2}"),
        }
    }
}

/// Process-wide fact name registry.
///
/// `get_id` is idempotent and safe to call from many planning threads at once.
#[derive(Debug, Default)]
pub struct FactRegistry {
    interner: Interner,
}

impl FactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_id(&self, name: &str) -> FactId {
        FactId(self.interner.intern(name))
    }

    pub fn lookup(&self, name: &str) -> Option<FactId> {
        self.interner.lookup(name).map(FactId)
    }

    pub fn name(&self, id: FactId) -> Option<Arc<str>> {
        self.interner.name(id.0)
    }

    pub fn len(&self) -> usize {
        self.interner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interner.is_empty()
    }
}
