//! Atoms: the typed nodes and links of the knowledge graph.
//!
//! The graph store owns every atom; the inference core only holds
//! [`Handle`]s. A handle is a niche-optimized id, so the "no atom" sentinel is
//! simply `Option<Handle>::None` and costs nothing extra.

pub mod store;
pub mod types;

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

pub use store::{AtomStore, MemStore, StoreResult};
pub use types::AtomType;

/// Opaque reference to an atom in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Handle(NonZeroU64);

impl Handle {
    /// Create a `Handle` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Handle)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "h:{}", self.0)
    }
}

/// Structural identity of an atom: the key atoms are deduplicated on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Atom {
    Node { atom_type: AtomType, name: String },
    Link { atom_type: AtomType, outgoing: Vec<Handle> },
}

impl Atom {
    pub fn atom_type(&self) -> AtomType {
        match self {
            Atom::Node { atom_type, .. } | Atom::Link { atom_type, .. } => *atom_type,
        }
    }

    /// Node name, `None` for links.
    pub fn name(&self) -> Option<&str> {
        match self {
            Atom::Node { name, .. } => Some(name),
            Atom::Link { .. } => None,
        }
    }

    /// Outgoing set, empty for nodes.
    pub fn outgoing(&self) -> &[Handle] {
        match self {
            Atom::Node { .. } => &[],
            Atom::Link { outgoing, .. } => outgoing,
        }
    }
}
