//! The graph-store boundary and an in-memory store.
//!
//! [`AtomStore`] is everything the inference core asks of a graph store:
//! validity tests, atom creation, truth-value get/replace and type queries.
//! [`MemStore`] implements it with `DashMap` indexes so that all operations
//! take `&self` and a store can be shared by the search and its callbacks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as IndexEntry;

use crate::error::StoreError;
use crate::truth::TruthValue;

use super::{Atom, AtomType, Handle};

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Interface of the graph store collaborator.
///
/// Creation is idempotent: adding a node or link that already exists returns
/// the existing handle and leaves its truth value untouched.
pub trait AtomStore {
    /// Whether the handle refers to a live atom.
    fn is_valid(&self, handle: Handle) -> bool;

    /// Structural description of an atom.
    fn get_atom(&self, handle: Handle) -> StoreResult<Atom>;

    /// Add (or find) a node.
    fn add_node(&self, atom_type: AtomType, name: &str) -> StoreResult<Handle>;

    /// Add (or find) a link over an ordered outgoing set.
    fn add_link(&self, atom_type: AtomType, outgoing: Vec<Handle>) -> StoreResult<Handle>;

    /// Shared snapshot of the atom's current truth value.
    fn get_truth_value(&self, handle: Handle) -> StoreResult<Arc<TruthValue>>;

    /// Replace the atom's truth value wholesale.
    fn set_truth_value(&self, handle: Handle, tv: TruthValue) -> StoreResult<()>;

    /// All atoms of `atom_type`, including subtypes when `subclass` is set.
    fn atoms_of_type(&self, atom_type: AtomType, subclass: bool) -> Vec<Handle>;

    /// Type subsumption query.
    fn inherits_type(&self, sub: AtomType, sup: AtomType) -> bool {
        sub.inherits(sup)
    }

    fn get_type(&self, handle: Handle) -> StoreResult<AtomType> {
        Ok(self.get_atom(handle)?.atom_type())
    }

    fn get_name(&self, handle: Handle) -> StoreResult<Option<String>> {
        Ok(self.get_atom(handle)?.name().map(str::to_owned))
    }

    fn get_outgoing(&self, handle: Handle) -> StoreResult<Vec<Handle>> {
        Ok(self.get_atom(handle)?.outgoing().to_vec())
    }

    /// Whether the atom is, or contains, a `VariableNode`.
    fn contains_variables(&self, handle: Handle) -> StoreResult<bool> {
        match self.get_atom(handle)? {
            Atom::Node { atom_type, .. } => Ok(atom_type == AtomType::VariableNode),
            Atom::Link { outgoing, .. } => {
                for h in outgoing {
                    if self.contains_variables(h)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

struct Entry {
    atom: Atom,
    tv: Arc<TruthValue>,
}

/// In-memory, deduplicating atom store.
pub struct MemStore {
    /// Handle → atom and its current truth value.
    atoms: DashMap<Handle, Entry>,
    /// Structural key → handle, for deduplication.
    index: DashMap<Atom, Handle>,
    /// Exact type → handles of that type.
    by_type: DashMap<AtomType, Vec<Handle>>,
    next: AtomicU64,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            atoms: DashMap::new(),
            index: DashMap::new(),
            by_type: DashMap::new(),
            next: AtomicU64::new(1),
        }
    }

    /// Number of atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    fn insert(&self, key: Atom) -> StoreResult<Handle> {
        // The vacant index entry stays locked until the atom is registered,
        // so concurrent adds of the same atom agree on one handle.
        let slot = match self.index.entry(key) {
            IndexEntry::Occupied(existing) => return Ok(*existing.get()),
            IndexEntry::Vacant(slot) => slot,
        };
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        let handle = Handle::new(raw).ok_or(StoreError::Exhausted)?;
        let atom_type = slot.key().atom_type();
        self.atoms.insert(
            handle,
            Entry {
                atom: slot.key().clone(),
                tv: Arc::new(TruthValue::default()),
            },
        );
        self.by_type.entry(atom_type).or_default().push(handle);
        slot.insert(handle);
        tracing::trace!(%handle, %atom_type, "atom added");
        Ok(handle)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomStore for MemStore {
    fn is_valid(&self, handle: Handle) -> bool {
        self.atoms.contains_key(&handle)
    }

    fn get_atom(&self, handle: Handle) -> StoreResult<Atom> {
        self.atoms
            .get(&handle)
            .map(|e| e.atom.clone())
            .ok_or(StoreError::InvalidHandle {
                handle: handle.get(),
            })
    }

    fn add_node(&self, atom_type: AtomType, name: &str) -> StoreResult<Handle> {
        if !atom_type.is_node() {
            return Err(StoreError::NotANodeType {
                atom_type: atom_type.to_string(),
            });
        }
        self.insert(Atom::Node {
            atom_type,
            name: name.to_owned(),
        })
    }

    fn add_link(&self, atom_type: AtomType, mut outgoing: Vec<Handle>) -> StoreResult<Handle> {
        if !atom_type.is_link() {
            return Err(StoreError::NotALinkType {
                atom_type: atom_type.to_string(),
            });
        }
        if let Some(bad) = outgoing.iter().find(|h| !self.is_valid(**h)) {
            return Err(StoreError::InvalidHandle { handle: bad.get() });
        }
        if atom_type.is_unordered() {
            outgoing.sort();
        }
        self.insert(Atom::Link {
            atom_type,
            outgoing,
        })
    }

    fn get_truth_value(&self, handle: Handle) -> StoreResult<Arc<TruthValue>> {
        self.atoms
            .get(&handle)
            .map(|e| Arc::clone(&e.tv))
            .ok_or(StoreError::InvalidHandle {
                handle: handle.get(),
            })
    }

    fn set_truth_value(&self, handle: Handle, tv: TruthValue) -> StoreResult<()> {
        let mut entry = self
            .atoms
            .get_mut(&handle)
            .ok_or(StoreError::InvalidHandle {
                handle: handle.get(),
            })?;
        entry.tv = Arc::new(tv);
        Ok(())
    }

    fn atoms_of_type(&self, atom_type: AtomType, subclass: bool) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self
            .by_type
            .iter()
            .filter(|e| {
                let t = *e.key();
                t == atom_type || (subclass && t.inherits(atom_type))
            })
            .flat_map(|e| e.value().clone())
            .collect();
        handles.sort();
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_are_deduplicated() {
        let store = MemStore::new();
        let a = store.add_node(AtomType::ConceptNode, "cat").unwrap();
        let b = store.add_node(AtomType::ConceptNode, "cat").unwrap();
        let c = store.add_node(AtomType::PredicateNode, "cat").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn concurrent_adds_share_one_handle() {
        let store = MemStore::new();
        let shared = &store;
        let handles: Vec<Handle> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(move || shared.add_node(AtomType::ConceptNode, "cat").unwrap()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert!(handles.iter().all(|h| *h == handles[0]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.atoms_of_type(AtomType::ConceptNode, false), vec![handles[0]]);
    }

    #[test]
    fn unordered_links_ignore_order() {
        let store = MemStore::new();
        let a = store.add_node(AtomType::ConceptNode, "a").unwrap();
        let b = store.add_node(AtomType::ConceptNode, "b").unwrap();
        let s1 = store.add_link(AtomType::SetLink, vec![a, b]).unwrap();
        let s2 = store.add_link(AtomType::SetLink, vec![b, a]).unwrap();
        assert_eq!(s1, s2);

        let l1 = store.add_link(AtomType::ListLink, vec![a, b]).unwrap();
        let l2 = store.add_link(AtomType::ListLink, vec![b, a]).unwrap();
        assert_ne!(l1, l2);
    }

    #[test]
    fn truth_values_are_replaced_wholesale() {
        let store = MemStore::new();
        let a = store.add_node(AtomType::ConceptNode, "a").unwrap();
        let before = store.get_truth_value(a).unwrap();
        assert_eq!(*before, TruthValue::default());

        store.set_truth_value(a, TruthValue::simple(0.7, 5.0)).unwrap();
        // The earlier snapshot is unaffected.
        assert_eq!(*before, TruthValue::default());
        assert_eq!(store.get_truth_value(a).unwrap().strength(), 0.7);

        // Re-adding keeps the truth value.
        store.add_node(AtomType::ConceptNode, "a").unwrap();
        assert_eq!(store.get_truth_value(a).unwrap().strength(), 0.7);
    }

    #[test]
    fn rejects_wrong_kinds_and_dangling_handles() {
        let store = MemStore::new();
        assert!(matches!(
            store.add_node(AtomType::ListLink, "x"),
            Err(StoreError::NotANodeType { .. })
        ));
        assert!(matches!(
            store.add_link(AtomType::ConceptNode, vec![]),
            Err(StoreError::NotALinkType { .. })
        ));
        let dangling = Handle::new(999).unwrap();
        assert!(!store.is_valid(dangling));
        assert!(matches!(
            store.add_link(AtomType::ListLink, vec![dangling]),
            Err(StoreError::InvalidHandle { handle: 999 })
        ));
        assert!(store.get_atom(dangling).is_err());
    }

    #[test]
    fn atoms_of_type_with_subclasses() {
        let store = MemStore::new();
        let a = store.add_node(AtomType::ConceptNode, "a").unwrap();
        let b = store.add_node(AtomType::ConceptNode, "b").unwrap();
        let inh = store.add_link(AtomType::InheritanceLink, vec![a, b]).unwrap();
        let sub = store.add_link(AtomType::SubsetLink, vec![a, b]).unwrap();

        assert_eq!(store.atoms_of_type(AtomType::InheritanceLink, false), vec![inh]);
        assert_eq!(
            store.atoms_of_type(AtomType::InheritanceLink, true),
            vec![inh, sub]
        );
        assert_eq!(store.atoms_of_type(AtomType::Node, true), vec![a, b]);
    }

    #[test]
    fn contains_variables_walks_outgoing() {
        let store = MemStore::new();
        let x = store.add_node(AtomType::VariableNode, "$x").unwrap();
        let a = store.add_node(AtomType::ConceptNode, "a").unwrap();
        let closed = store.add_link(AtomType::ListLink, vec![a, a]).unwrap();
        let open = store.add_link(AtomType::ListLink, vec![a, x]).unwrap();
        let nested = store.add_link(AtomType::ListLink, vec![closed, open]).unwrap();
        assert!(!store.contains_variables(closed).unwrap());
        assert!(store.contains_variables(open).unwrap());
        assert!(store.contains_variables(nested).unwrap());
    }
}
