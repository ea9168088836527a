//! Pattern queries and grounding collectors.
//!
//! A [`PatternSearch`] enumerates the groundings of a [`BindPattern`] and
//! hands each one to a [`GroundingCallback`]. The callback decides whether
//! the search goes on. [`Implicator`] is the callback that instantiates the
//! implicand for every grounding; [`bindlink`] and friends wire a search and
//! an implicator together and return the results as a `SetLink`.

pub mod implicator;
pub mod search;

use std::collections::HashMap;

use crate::atom::{AtomStore, Handle};
use crate::error::ImplyError;
use crate::pattern::{BindPattern, Template, Variable};

pub use implicator::{
    Implicator, ImplicatorKind, Instantiator, bindlink, crisp_logic_bindlink, imply,
    imply_pattern, pln_bindlink, single_bindlink,
};
pub use search::BacktrackSearch;

/// Result type for query and implication operations.
pub type ImplyResult<T> = std::result::Result<T, ImplyError>;

/// Whether a search should keep looking for groundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    Continue,
    Stop,
}

/// One solution of a pattern.
///
/// Only valid for the duration of the callback invocation that receives it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grounding {
    /// Variable → grounding atom.
    pub var_soln: HashMap<Variable, Handle>,
    /// Clause → the atom that grounded it.
    pub term_soln: HashMap<Template, Handle>,
}

/// Receives the groundings found by a [`PatternSearch`].
pub trait GroundingCallback {
    /// Called once per complete grounding.
    fn grounding(&mut self, grounding: &Grounding) -> SearchControl;

    /// Vet a candidate binding before the search commits to it.
    fn variable_match(&self, _variable: &Variable, _candidate: Handle) -> bool {
        true
    }
}

/// The pattern-matching engine.
pub trait PatternSearch {
    /// Enumerate groundings of `pattern`, invoking `callback` for each until
    /// it asks to stop.
    ///
    /// With `check_connectivity` set, a pattern whose variable-bearing clauses
    /// share no variables across groups is rejected.
    fn search(
        &self,
        store: &dyn AtomStore,
        pattern: &BindPattern,
        callback: &mut dyn GroundingCallback,
        check_connectivity: bool,
    ) -> ImplyResult<()>;
}
