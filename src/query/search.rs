//! Backtracking pattern search.
//!
//! Clauses are grounded left to right. For each clause, every atom of the
//! clause's type (or a subtype) is a candidate; each consistent extension of
//! the current bindings is explored depth-first. Absent clauses are checked
//! once all positive clauses are grounded.

use std::collections::HashMap;

use crate::atom::{AtomStore, AtomType, Handle, StoreResult};
use crate::error::ImplyError;
use crate::pattern::{BindPattern, Bindings, Template, Variable};

use super::{Grounding, GroundingCallback, ImplyResult, PatternSearch, SearchControl};

/// Exhaustive depth-first search over store candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackSearch;

impl PatternSearch for BacktrackSearch {
    fn search(
        &self,
        store: &dyn AtomStore,
        pattern: &BindPattern,
        callback: &mut dyn GroundingCallback,
        check_connectivity: bool,
    ) -> ImplyResult<()> {
        if check_connectivity {
            let components = connected_components(&pattern.clauses);
            if components > 1 {
                return Err(ImplyError::DisconnectedPattern { components });
            }
        }

        let state = SearchState {
            store,
            pattern,
            candidates: pattern
                .clauses
                .iter()
                .map(|clause| candidates(store, clause))
                .collect(),
        };
        let mut found = 0usize;
        let control = state.solve(0, &Bindings::new(), &mut HashMap::new(), callback, &mut found)?;
        tracing::debug!(
            clauses = pattern.clauses.len(),
            absent = pattern.absent.len(),
            groundings = found,
            stopped = control == SearchControl::Stop,
            "pattern search finished"
        );
        Ok(())
    }
}

struct SearchState<'a> {
    store: &'a dyn AtomStore,
    pattern: &'a BindPattern,
    /// Candidate atoms per positive clause.
    candidates: Vec<Vec<Handle>>,
}

impl SearchState<'_> {
    fn solve(
        &self,
        index: usize,
        bindings: &Bindings,
        term_soln: &mut HashMap<Template, Handle>,
        callback: &mut dyn GroundingCallback,
        found: &mut usize,
    ) -> ImplyResult<SearchControl> {
        let Some(clause) = self.pattern.clauses.get(index) else {
            if self.absent_grounded(bindings)? {
                return Ok(SearchControl::Continue);
            }
            *found += 1;
            let grounding = Grounding {
                var_soln: bindings.clone(),
                term_soln: term_soln.clone(),
            };
            tracing::trace!(variables = grounding.var_soln.len(), "grounding found");
            return Ok(callback.grounding(&grounding));
        };

        for &candidate in &self.candidates[index] {
            let extensions = {
                let vet: &dyn GroundingCallback = &*callback;
                clause.match_atom_with(self.store, candidate, bindings, &mut |v, h| {
                    self.accept(vet, v, h)
                })?
            };
            for extended in extensions {
                let previous = term_soln.insert(clause.clone(), candidate);
                let control = self.solve(index + 1, &extended, term_soln, callback, found)?;
                match previous {
                    Some(p) => term_soln.insert(clause.clone(), p),
                    None => term_soln.remove(clause),
                };
                if control == SearchControl::Stop {
                    return Ok(SearchControl::Stop);
                }
            }
        }
        Ok(SearchControl::Continue)
    }

    /// Variables never ground to atoms that contain variables themselves, so
    /// the pattern's own clauses are never matched.
    fn accept(&self, vet: &dyn GroundingCallback, variable: &Variable, candidate: Handle) -> StoreResult<bool> {
        if self.store.contains_variables(candidate)? {
            return Ok(false);
        }
        Ok(vet.variable_match(variable, candidate))
    }

    /// Whether any absent clause has a grounding under `bindings`.
    fn absent_grounded(&self, bindings: &Bindings) -> ImplyResult<bool> {
        for clause in &self.pattern.absent {
            for candidate in candidates(self.store, clause) {
                let matches = clause.match_atom_with(self.store, candidate, bindings, &mut |_, h| {
                    Ok(!self.store.contains_variables(h)?)
                })?;
                if !matches.is_empty() {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

fn candidates(store: &dyn AtomStore, clause: &Template) -> Vec<Handle> {
    match clause {
        Template::Atom(h) => vec![*h],
        Template::Link { link_type, .. } => store.atoms_of_type(*link_type, true),
        Template::Typed(t) => store.atoms_of_type(*t, true),
        Template::Var(_) => store.atoms_of_type(AtomType::Atom, true),
    }
}

/// Number of groups of variable-bearing clauses linked by shared variables.
fn connected_components(clauses: &[Template]) -> usize {
    let groups: Vec<Vec<Variable>> = clauses
        .iter()
        .map(Template::variables)
        .filter(|vars| !vars.is_empty())
        .collect();

    let mut parent: Vec<usize> = (0..groups.len()).collect();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            if groups[i].iter().any(|v| groups[j].contains(v)) {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                parent[a] = b;
            }
        }
    }
    (0..groups.len()).filter(|&i| find(&mut parent, i) == i).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::MemStore;

    /// Records groundings; optionally stops after the first.
    #[derive(Default)]
    struct Collect {
        seen: Vec<Grounding>,
        stop_after_first: bool,
        forbidden: Option<Handle>,
    }

    impl GroundingCallback for Collect {
        fn grounding(&mut self, grounding: &Grounding) -> SearchControl {
            self.seen.push(grounding.clone());
            if self.stop_after_first {
                SearchControl::Stop
            } else {
                SearchControl::Continue
            }
        }

        fn variable_match(&self, _variable: &Variable, candidate: Handle) -> bool {
            self.forbidden != Some(candidate)
        }
    }

    struct Zoo {
        store: MemStore,
        cat: Handle,
        dog: Handle,
        animal: Handle,
        pet: Handle,
    }

    fn zoo() -> Zoo {
        let store = MemStore::new();
        let cat = store.add_node(AtomType::ConceptNode, "cat").unwrap();
        let dog = store.add_node(AtomType::ConceptNode, "dog").unwrap();
        let animal = store.add_node(AtomType::ConceptNode, "animal").unwrap();
        let pet = store.add_node(AtomType::ConceptNode, "pet").unwrap();
        for (a, b) in [(cat, animal), (dog, animal), (cat, pet)] {
            store.add_link(AtomType::InheritanceLink, vec![a, b]).unwrap();
        }
        Zoo {
            store,
            cat,
            dog,
            animal,
            pet,
        }
    }

    fn inh(a: Template, b: Template) -> Template {
        Template::link(AtomType::InheritanceLink, vec![a, b])
    }

    #[test]
    fn single_clause_finds_every_grounding() {
        let z = zoo();
        let x = Variable::named("$x");
        let pattern = BindPattern::new(
            vec![x.clone()],
            vec![inh(Template::var(&x), Template::Atom(z.animal))],
            Template::var(&x),
        );
        let mut cb = Collect::default();
        BacktrackSearch.search(&z.store, &pattern, &mut cb, true).unwrap();
        let mut found: Vec<Handle> = cb.seen.iter().map(|g| g.var_soln[&x]).collect();
        found.sort();
        assert_eq!(found, vec![z.cat, z.dog]);
        assert_eq!(cb.seen[0].term_soln.len(), 1);
    }

    #[test]
    fn clauses_join_on_shared_variables() {
        let z = zoo();
        let x = Variable::named("$x");
        let pattern = BindPattern::new(
            vec![x.clone()],
            vec![
                inh(Template::var(&x), Template::Atom(z.animal)),
                inh(Template::var(&x), Template::Atom(z.pet)),
            ],
            Template::var(&x),
        );
        let mut cb = Collect::default();
        BacktrackSearch.search(&z.store, &pattern, &mut cb, true).unwrap();
        assert_eq!(cb.seen.len(), 1);
        assert_eq!(cb.seen[0].var_soln[&x], z.cat);
    }

    #[test]
    fn absent_clauses_filter_groundings() {
        let z = zoo();
        let x = Variable::named("$x");
        let pattern = BindPattern::new(
            vec![x.clone()],
            vec![inh(Template::var(&x), Template::Atom(z.animal))],
            Template::var(&x),
        )
        .with_absent(inh(Template::var(&x), Template::Atom(z.pet)));
        let mut cb = Collect::default();
        BacktrackSearch.search(&z.store, &pattern, &mut cb, true).unwrap();
        assert_eq!(cb.seen.len(), 1);
        assert_eq!(cb.seen[0].var_soln[&x], z.dog);
    }

    #[test]
    fn callback_can_stop_the_search() {
        let z = zoo();
        let (x, y) = (Variable::named("$x"), Variable::named("$y"));
        let pattern = BindPattern::new(
            vec![x.clone(), y.clone()],
            vec![inh(Template::var(&x), Template::var(&y))],
            Template::var(&x),
        );
        let mut cb = Collect {
            stop_after_first: true,
            ..Collect::default()
        };
        BacktrackSearch.search(&z.store, &pattern, &mut cb, true).unwrap();
        assert_eq!(cb.seen.len(), 1);
    }

    #[test]
    fn variable_match_vetoes_candidates() {
        let z = zoo();
        let x = Variable::named("$x");
        let pattern = BindPattern::new(
            vec![x.clone()],
            vec![inh(Template::var(&x), Template::Atom(z.animal))],
            Template::var(&x),
        );
        let mut cb = Collect {
            forbidden: Some(z.cat),
            ..Collect::default()
        };
        BacktrackSearch.search(&z.store, &pattern, &mut cb, true).unwrap();
        assert_eq!(cb.seen.len(), 1);
        assert_eq!(cb.seen[0].var_soln[&x], z.dog);
    }

    #[test]
    fn variables_never_ground_to_variable_nodes() {
        let z = zoo();
        let var_node = z.store.add_node(AtomType::VariableNode, "$x").unwrap();
        z.store
            .add_link(AtomType::InheritanceLink, vec![var_node, z.animal])
            .unwrap();
        let x = Variable::named("$x");
        let pattern = BindPattern::new(
            vec![x.clone()],
            vec![inh(Template::var(&x), Template::Atom(z.animal))],
            Template::var(&x),
        );
        let mut cb = Collect::default();
        BacktrackSearch.search(&z.store, &pattern, &mut cb, true).unwrap();
        assert!(cb.seen.iter().all(|g| g.var_soln[&x] != var_node));
        assert_eq!(cb.seen.len(), 2);
    }

    #[test]
    fn disconnected_patterns_are_rejected_on_request() {
        let z = zoo();
        let (x, y) = (Variable::named("$x"), Variable::named("$y"));
        let pattern = BindPattern::new(
            vec![x.clone(), y.clone()],
            vec![
                inh(Template::var(&x), Template::Atom(z.animal)),
                inh(Template::var(&y), Template::Atom(z.pet)),
            ],
            Template::var(&x),
        );
        let mut cb = Collect::default();
        let err = BacktrackSearch.search(&z.store, &pattern, &mut cb, true).unwrap_err();
        assert!(matches!(err, ImplyError::DisconnectedPattern { components: 2 }));

        // Without the check the cross product is enumerated.
        BacktrackSearch.search(&z.store, &pattern, &mut cb, false).unwrap();
        assert_eq!(cb.seen.len(), 2);
    }

    #[test]
    fn component_counting() {
        let (x, y, w) = (Variable::fresh(), Variable::fresh(), Variable::fresh());
        let h = Handle::new(1).unwrap();
        let pair = |a: &Variable, b: &Variable| Template::link(AtomType::ListLink, vec![Template::var(a), Template::var(b)]);
        assert_eq!(connected_components(&[]), 0);
        assert_eq!(connected_components(&[Template::Atom(h)]), 0);
        assert_eq!(connected_components(&[pair(&x, &y), pair(&y, &w)]), 1);
        assert_eq!(connected_components(&[pair(&x, &x), pair(&y, &w)]), 2);
    }
}
