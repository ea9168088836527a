//! Templates: value trees over atoms, variables and type wildcards.
//!
//! A [`Template`] describes a shape of atoms. Rules use templates for their
//! input filters, conclusions and goal decompositions; the query layer parses
//! bind links into templates and matches them against the store.
//!
//! Matching is one-sided (template against a stored atom, see
//! [`Template::match_atom`]); [`unify`] is the two-sided counterpart used for
//! goal/target checks.

pub mod bind;
pub mod unify;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::atom::{Atom, AtomStore, AtomType, Handle, StoreResult};

pub use bind::{BindPattern, TypeMap};
pub use unify::{Substitution, unify};

/// Variable → grounding handle.
pub type Bindings = HashMap<Variable, Handle>;

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

static NEXT_VARIABLE: AtomicU64 = AtomicU64::new(1);

/// A free variable of a template.
///
/// Identity is the process-wide unique id; the name is for display only, so
/// two templates built independently never capture each other's variables.
#[derive(Debug, Clone)]
pub struct Variable {
    id: u64,
    name: Arc<str>,
}

impl Variable {
    /// A new variable named after its id (`$v17`).
    pub fn fresh() -> Self {
        let id = NEXT_VARIABLE.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            name: Arc::from(format!("$v{id}")),
        }
    }

    /// A new variable with a display name (e.g. a `VariableNode` name).
    pub fn named(name: &str) -> Self {
        Self {
            id: NEXT_VARIABLE.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// A shape of atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Template {
    /// A concrete atom.
    Atom(Handle),
    /// A free variable.
    Var(Variable),
    /// Any atom whose type inherits the given type.
    Typed(AtomType),
    /// A link of `link_type` (or a subtype) over the given shapes.
    Link {
        link_type: AtomType,
        outgoing: Vec<Template>,
    },
}

impl Template {
    pub fn link(link_type: AtomType, outgoing: Vec<Template>) -> Self {
        Template::Link {
            link_type,
            outgoing,
        }
    }

    pub fn var(variable: &Variable) -> Self {
        Template::Var(variable.clone())
    }

    /// Free variables in order of first occurrence.
    pub fn variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<Variable>) {
        match self {
            Template::Var(v) => {
                if !out.contains(v) {
                    out.push(v.clone());
                }
            }
            Template::Link { outgoing, .. } => {
                for t in outgoing {
                    t.collect_variables(out);
                }
            }
            Template::Atom(_) | Template::Typed(_) => {}
        }
    }

    /// Whether the template denotes exactly one atom shape (no variables, no wildcards).
    pub fn is_closed(&self) -> bool {
        match self {
            Template::Atom(_) => true,
            Template::Var(_) | Template::Typed(_) => false,
            Template::Link { outgoing, .. } => outgoing.iter().all(Template::is_closed),
        }
    }

    /// Type of the outermost atom, when known without looking at the store.
    pub fn head_type(&self) -> Option<AtomType> {
        match self {
            Template::Link { link_type, .. } => Some(*link_type),
            Template::Typed(t) => Some(*t),
            Template::Atom(_) | Template::Var(_) => None,
        }
    }

    /// One-level expansion of a concrete link atom into a `Link` template.
    pub fn expand(store: &dyn AtomStore, handle: Handle) -> StoreResult<Template> {
        Ok(match store.get_atom(handle)? {
            Atom::Node { .. } => Template::Atom(handle),
            Atom::Link {
                atom_type,
                outgoing,
            } => Template::link(atom_type, outgoing.into_iter().map(Template::Atom).collect()),
        })
    }

    /// All ways `handle` matches this template, each extending `bindings`.
    pub fn match_atom(
        &self,
        store: &dyn AtomStore,
        handle: Handle,
        bindings: &Bindings,
    ) -> StoreResult<Vec<Bindings>> {
        self.match_atom_with(store, handle, bindings, &mut |_, _| Ok(true))
    }

    /// Like [`match_atom`](Self::match_atom), consulting `accept` before each
    /// new variable binding.
    pub fn match_atom_with(
        &self,
        store: &dyn AtomStore,
        handle: Handle,
        bindings: &Bindings,
        accept: &mut dyn FnMut(&Variable, Handle) -> StoreResult<bool>,
    ) -> StoreResult<Vec<Bindings>> {
        match self {
            Template::Atom(h) => Ok(if *h == handle {
                vec![bindings.clone()]
            } else {
                Vec::new()
            }),
            Template::Typed(t) => Ok(if store.get_type(handle)?.inherits(*t) {
                vec![bindings.clone()]
            } else {
                Vec::new()
            }),
            Template::Var(v) => match bindings.get(v) {
                Some(bound) if *bound == handle => Ok(vec![bindings.clone()]),
                Some(_) => Ok(Vec::new()),
                None => {
                    if !accept(v, handle)? {
                        return Ok(Vec::new());
                    }
                    let mut extended = bindings.clone();
                    extended.insert(v.clone(), handle);
                    Ok(vec![extended])
                }
            },
            Template::Link {
                link_type,
                outgoing,
            } => {
                let Atom::Link {
                    atom_type,
                    outgoing: actual,
                } = store.get_atom(handle)?
                else {
                    return Ok(Vec::new());
                };
                if !atom_type.inherits(*link_type) || actual.len() != outgoing.len() {
                    return Ok(Vec::new());
                }
                if atom_type.is_unordered() {
                    let mut out = Vec::new();
                    let mut used = vec![false; actual.len()];
                    match_unordered(store, outgoing, &actual, &mut used, bindings, accept, &mut out)?;
                    return Ok(out);
                }
                let mut partial = vec![bindings.clone()];
                for (t, h) in outgoing.iter().zip(&actual) {
                    let mut next = Vec::new();
                    for b in &partial {
                        next.extend(t.match_atom_with(store, *h, b, accept)?);
                    }
                    if next.is_empty() {
                        return Ok(next);
                    }
                    partial = next;
                }
                Ok(partial)
            }
        }
    }

    /// Whether some binding of the template's variables makes it match `handle`.
    pub fn matches(&self, store: &dyn AtomStore, handle: Handle) -> StoreResult<bool> {
        Ok(!self.match_atom(store, handle, &Bindings::new())?.is_empty())
    }
}

/// Assign each remaining template to an unused outgoing atom, collecting
/// every distinct consistent assignment.
fn match_unordered(
    store: &dyn AtomStore,
    templates: &[Template],
    actual: &[Handle],
    used: &mut [bool],
    bindings: &Bindings,
    accept: &mut dyn FnMut(&Variable, Handle) -> StoreResult<bool>,
    out: &mut Vec<Bindings>,
) -> StoreResult<()> {
    let Some((first, rest)) = templates.split_first() else {
        if !out.contains(bindings) {
            out.push(bindings.clone());
        }
        return Ok(());
    };
    for i in 0..actual.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        for b in first.match_atom_with(store, actual[i], bindings, accept)? {
            match_unordered(store, rest, actual, used, &b, accept, out)?;
        }
        used[i] = false;
    }
    Ok(())
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Template::Atom(h) => write!(f, "{h}"),
            Template::Var(v) => write!(f, "{v}"),
            Template::Typed(t) => write!(f, "<{t}>"),
            Template::Link {
                link_type,
                outgoing,
            } => {
                write!(f, "({link_type}")?;
                for t in outgoing {
                    write!(f, " {t}")?;
                }
                f.write_str(")")
            }
        }
    }
}
