// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # pln-core
//!
//! The inference core of a probabilistic logic network: uncertain truth
//! values, the formulas that combine them, pattern queries that collect
//! groundings, and inference rules built on both.
//!
//! ## Architecture
//!
//! - **Truth values** (`truth`): `(strength, count)` pairs and context-versioned composites
//! - **Formulas** (`formula`): the truth-value algebra behind an arity-checked `Evaluator`
//! - **Atoms** (`atom`): typed nodes and links behind the `AtomStore` trait, with an in-memory store
//! - **Patterns** (`pattern`): templates, unification and bind-link parsing
//! - **Queries** (`query`): backtracking search and the implicator collectors
//! - **Rules** (`rules`): deduction, inversion, modus ponens and conjunction
//!
//! ## Library usage
//!
//! ```no_run
//! use pln_core::atom::{AtomStore, AtomType, MemStore};
//! use pln_core::formula::Evaluator;
//! use pln_core::rules::Rule;
//! use pln_core::truth::TruthValue;
//!
//! let store = MemStore::new();
//! let cat = store.add_node(AtomType::ConceptNode, "cat").unwrap();
//! let mammal = store.add_node(AtomType::ConceptNode, "mammal").unwrap();
//! let animal = store.add_node(AtomType::ConceptNode, "animal").unwrap();
//! let a = store.add_link(AtomType::InheritanceLink, vec![cat, mammal]).unwrap();
//! let b = store.add_link(AtomType::InheritanceLink, vec![mammal, animal]).unwrap();
//! store.set_truth_value(a, TruthValue::simple(0.95, 40.0)).unwrap();
//! store.set_truth_value(b, TruthValue::simple(0.99, 90.0)).unwrap();
//!
//! let rule = Rule::deduction(AtomType::InheritanceLink);
//! if let Some(conclusion) = rule.apply(&store, &Evaluator::default(), &[a, b]).unwrap() {
//!     conclusion.materialize(&store).unwrap();
//! }
//! ```

pub mod atom;
pub mod config;
pub mod error;
pub mod formula;
pub mod pattern;
pub mod query;
pub mod rules;
pub mod truth;
