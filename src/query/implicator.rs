//! Grounding collectors that instantiate an implicand per grounding.
//!
//! An [`Implicator`] is the [`GroundingCallback`] behind every bindlink
//! entry point. Its [`ImplicatorKind`] decides what happens after each
//! successful instantiation:
//!
//! - `Default` keeps searching;
//! - `Crisp` marks the instance as certainly true and keeps searching;
//! - `Single` stops after the first instance.
//!
//! Groundings whose implicand cannot be instantiated are skipped.

use std::collections::HashMap;

use crate::atom::{AtomStore, AtomType, Handle, StoreResult};
use crate::pattern::{BindPattern, Template, TypeMap, Variable};
use crate::truth::{SimpleTruthValue, TruthValue};

use super::{Grounding, GroundingCallback, ImplyResult, PatternSearch, SearchControl};

/// Builds atoms from templates and variable groundings.
#[derive(Clone, Copy)]
pub struct Instantiator<'a> {
    store: &'a dyn AtomStore,
}

impl<'a> Instantiator<'a> {
    pub fn new(store: &'a dyn AtomStore) -> Self {
        Self { store }
    }

    /// Create (or find) the atom `template` denotes under `var_soln`.
    ///
    /// Returns `None` when a variable is unbound or a type wildcard remains.
    pub fn instantiate(
        &self,
        template: &Template,
        var_soln: &HashMap<Variable, Handle>,
    ) -> StoreResult<Option<Handle>> {
        match template {
            Template::Atom(h) => Ok(Some(*h)),
            Template::Var(v) => Ok(var_soln.get(v).copied()),
            Template::Typed(_) => Ok(None),
            Template::Link {
                link_type,
                outgoing,
            } => {
                let mut handles = Vec::with_capacity(outgoing.len());
                for t in outgoing {
                    match self.instantiate(t, var_soln)? {
                        Some(h) => handles.push(h),
                        None => return Ok(None),
                    }
                }
                self.store.add_link(*link_type, handles).map(Some)
            }
        }
    }
}

/// What an [`Implicator`] does after instantiating a grounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplicatorKind {
    /// Collect every instance.
    Default,
    /// Collect every instance and set its truth value to certainly true.
    Crisp,
    /// Stop after the first instance.
    Single,
}

/// Collects instantiated implicands.
pub struct Implicator<'a> {
    store: &'a dyn AtomStore,
    kind: ImplicatorKind,
    implicand: Template,
    type_restrictions: TypeMap,
    result_list: Vec<Handle>,
}

impl<'a> Implicator<'a> {
    pub fn new(store: &'a dyn AtomStore, kind: ImplicatorKind, implicand: Template) -> Self {
        Self {
            store,
            kind,
            implicand,
            type_restrictions: TypeMap::new(),
            result_list: Vec::new(),
        }
    }

    /// Restrict the types variables may ground to.
    pub fn with_type_restrictions(mut self, type_restrictions: TypeMap) -> Self {
        self.type_restrictions = type_restrictions;
        self
    }

    pub fn into_results(self) -> Vec<Handle> {
        self.result_list
    }
}

impl GroundingCallback for Implicator<'_> {
    fn grounding(&mut self, grounding: &Grounding) -> SearchControl {
        let handle = match Instantiator::new(self.store).instantiate(&self.implicand, &grounding.var_soln) {
            Ok(Some(h)) => h,
            Ok(None) => {
                tracing::trace!(implicand = %self.implicand, "implicand not fully grounded, skipped");
                return SearchControl::Continue;
            }
            Err(e) => {
                tracing::warn!(error = %e, implicand = %self.implicand, "instantiation failed, skipped");
                return SearchControl::Continue;
            }
        };
        self.result_list.push(handle);

        match self.kind {
            ImplicatorKind::Default => SearchControl::Continue,
            ImplicatorKind::Crisp => {
                let certain = TruthValue::Simple(SimpleTruthValue::true_certain());
                if let Err(e) = self.store.set_truth_value(handle, certain) {
                    tracing::warn!(error = %e, %handle, "could not affirm instance");
                }
                SearchControl::Continue
            }
            ImplicatorKind::Single => SearchControl::Stop,
        }
    }

    fn variable_match(&self, variable: &Variable, candidate: Handle) -> bool {
        let Some(allowed) = self.type_restrictions.get(variable) else {
            return true;
        };
        match self.store.get_type(candidate) {
            Ok(t) => allowed.iter().any(|a| self.store.inherits_type(t, *a)),
            Err(_) => false,
        }
    }
}

/// Run a stored bind link and return its instances wrapped in a `SetLink`.
pub fn imply(
    store: &dyn AtomStore,
    search: &dyn PatternSearch,
    bind_handle: Handle,
    kind: ImplicatorKind,
    check_connectivity: bool,
) -> ImplyResult<Handle> {
    let pattern = BindPattern::from_bind_link(store, bind_handle)?;
    imply_pattern(store, search, &pattern, kind, check_connectivity)
}

/// Like [`imply`], for an already parsed pattern.
///
/// The `SetLink` holds each distinct instance once; no instances gives an
/// empty `SetLink`.
pub fn imply_pattern(
    store: &dyn AtomStore,
    search: &dyn PatternSearch,
    pattern: &BindPattern,
    kind: ImplicatorKind,
    check_connectivity: bool,
) -> ImplyResult<Handle> {
    let mut implicator = Implicator::new(store, kind, pattern.implicand.clone())
        .with_type_restrictions(pattern.typemap.clone());
    search.search(store, pattern, &mut implicator, check_connectivity)?;

    let mut results = implicator.into_results();
    results.sort();
    results.dedup();
    let count = results.len();
    let set = store.add_link(AtomType::SetLink, results)?;
    tracing::debug!(?kind, results = count, %set, "implication finished");
    Ok(set)
}

/// Collect every instance.
pub fn bindlink(store: &dyn AtomStore, search: &dyn PatternSearch, bind_handle: Handle) -> ImplyResult<Handle> {
    imply(store, search, bind_handle, ImplicatorKind::Default, true)
}

/// Stop at the first instance.
pub fn single_bindlink(
    store: &dyn AtomStore,
    search: &dyn PatternSearch,
    bind_handle: Handle,
) -> ImplyResult<Handle> {
    imply(store, search, bind_handle, ImplicatorKind::Single, true)
}

/// Collect every instance and affirm it as certainly true.
pub fn crisp_logic_bindlink(
    store: &dyn AtomStore,
    search: &dyn PatternSearch,
    bind_handle: Handle,
) -> ImplyResult<Handle> {
    imply(store, search, bind_handle, ImplicatorKind::Crisp, true)
}

/// Collect every instance without the connectivity check, for rule patterns
/// that legitimately join unrelated premises.
pub fn pln_bindlink(store: &dyn AtomStore, search: &dyn PatternSearch, bind_handle: Handle) -> ImplyResult<Handle> {
    imply(store, search, bind_handle, ImplicatorKind::Default, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::MemStore;
    use crate::error::ImplyError;
    use crate::query::BacktrackSearch;
    use crate::truth::MAX_CONFIDENCE;

    struct World {
        store: MemStore,
        x: Handle,
        cat: Handle,
        dog: Handle,
        animal: Handle,
    }

    fn world() -> World {
        let store = MemStore::new();
        let x = store.add_node(AtomType::VariableNode, "$x").unwrap();
        let cat = store.add_node(AtomType::ConceptNode, "cat").unwrap();
        let dog = store.add_node(AtomType::ConceptNode, "dog").unwrap();
        let animal = store.add_node(AtomType::ConceptNode, "animal").unwrap();
        store.add_link(AtomType::InheritanceLink, vec![cat, animal]).unwrap();
        store.add_link(AtomType::InheritanceLink, vec![dog, animal]).unwrap();
        World {
            store,
            x,
            cat,
            dog,
            animal,
        }
    }

    /// `BindLink($x, Implication(Inheritance($x, animal), Evaluation(pet, List($x))))`
    fn pet_query(w: &World) -> (Handle, Handle) {
        let pet = w.store.add_node(AtomType::PredicateNode, "pet").unwrap();
        let clause = w.store.add_link(AtomType::InheritanceLink, vec![w.x, w.animal]).unwrap();
        let args = w.store.add_link(AtomType::ListLink, vec![w.x]).unwrap();
        let implicand = w.store.add_link(AtomType::EvaluationLink, vec![pet, args]).unwrap();
        let rewrite = w.store.add_link(AtomType::ImplicationLink, vec![clause, implicand]).unwrap();
        (w.store.add_link(AtomType::BindLink, vec![w.x, rewrite]).unwrap(), pet)
    }

    fn instance(w: &World, pet: Handle, who: Handle) -> Handle {
        let args = w.store.add_link(AtomType::ListLink, vec![who]).unwrap();
        w.store.add_link(AtomType::EvaluationLink, vec![pet, args]).unwrap()
    }

    #[test]
    fn default_collects_every_instance() {
        let w = world();
        let (bl, pet) = pet_query(&w);
        let set = bindlink(&w.store, &BacktrackSearch, bl).unwrap();
        let mut results = w.store.get_outgoing(set).unwrap();
        results.sort();
        let mut expected = vec![instance(&w, pet, w.cat), instance(&w, pet, w.dog)];
        expected.sort();
        assert_eq!(results, expected);
        assert_eq!(w.store.get_type(set).unwrap(), AtomType::SetLink);
    }

    #[test]
    fn single_stops_after_first() {
        let w = world();
        let (bl, _) = pet_query(&w);
        let set = single_bindlink(&w.store, &BacktrackSearch, bl).unwrap();
        assert_eq!(w.store.get_outgoing(set).unwrap().len(), 1);
    }

    #[test]
    fn crisp_affirms_instances() {
        let w = world();
        let (bl, pet) = pet_query(&w);
        let cat_instance = instance(&w, pet, w.cat);
        w.store.set_truth_value(cat_instance, TruthValue::simple(0.0, 0.1)).unwrap();

        crisp_logic_bindlink(&w.store, &BacktrackSearch, bl).unwrap();
        let tv = w.store.get_truth_value(cat_instance).unwrap();
        assert_eq!(tv.strength(), 1.0);
        assert!((tv.confidence() - MAX_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn no_match_gives_empty_set() {
        let w = world();
        let plant = w.store.add_node(AtomType::ConceptNode, "plant").unwrap();
        let clause = w.store.add_link(AtomType::InheritanceLink, vec![w.x, plant]).unwrap();
        let rewrite = w.store.add_link(AtomType::ImplicationLink, vec![clause, w.x]).unwrap();
        let bl = w.store.add_link(AtomType::BindLink, vec![w.x, rewrite]).unwrap();
        let set = bindlink(&w.store, &BacktrackSearch, bl).unwrap();
        assert!(w.store.get_outgoing(set).unwrap().is_empty());
    }

    /// `BindLink($x, Implication(Not(Inheritance($x, plant)), Evaluation(no-plants, List(animal))))`
    fn no_plants_query(w: &World) -> (Handle, Handle, Handle) {
        let plant = w.store.add_node(AtomType::ConceptNode, "plant").unwrap();
        let tag = w.store.add_node(AtomType::PredicateNode, "no-plants").unwrap();
        let clause = w.store.add_link(AtomType::InheritanceLink, vec![w.x, plant]).unwrap();
        let not = w.store.add_link(AtomType::NotLink, vec![clause]).unwrap();
        let args = w.store.add_link(AtomType::ListLink, vec![w.animal]).unwrap();
        let implicand = w.store.add_link(AtomType::EvaluationLink, vec![tag, args]).unwrap();
        let rewrite = w.store.add_link(AtomType::ImplicationLink, vec![not, implicand]).unwrap();
        let bl = w.store.add_link(AtomType::BindLink, vec![w.x, rewrite]).unwrap();
        (bl, plant, implicand)
    }

    #[test]
    fn absent_only_pattern_fires_once_when_nothing_matches() {
        let w = world();
        let (bl, _, implicand) = no_plants_query(&w);

        let set = crisp_logic_bindlink(&w.store, &BacktrackSearch, bl).unwrap();
        assert_eq!(w.store.get_outgoing(set).unwrap(), vec![implicand]);
        assert_eq!(w.store.get_truth_value(implicand).unwrap().strength(), 1.0);
    }

    #[test]
    fn absent_only_pattern_is_empty_when_a_match_exists() {
        let w = world();
        let (bl, plant, _) = no_plants_query(&w);
        w.store.add_link(AtomType::InheritanceLink, vec![w.cat, plant]).unwrap();

        let set = crisp_logic_bindlink(&w.store, &BacktrackSearch, bl).unwrap();
        assert!(w.store.get_outgoing(set).unwrap().is_empty());
    }

    #[test]
    fn type_restrictions_filter_groundings() {
        let w = world();
        let robot = w.store.add_node(AtomType::PredicateNode, "robot").unwrap();
        w.store.add_link(AtomType::InheritanceLink, vec![robot, w.animal]).unwrap();
        let x = Variable::named("$x");
        let pattern = BindPattern::new(
            vec![x.clone()],
            vec![Template::link(
                AtomType::InheritanceLink,
                vec![Template::var(&x), Template::Atom(w.animal)],
            )],
            Template::var(&x),
        )
        .with_type(&x, vec![AtomType::PredicateNode]);

        let set = imply_pattern(&w.store, &BacktrackSearch, &pattern, ImplicatorKind::Default, true).unwrap();
        assert_eq!(w.store.get_outgoing(set).unwrap(), vec![robot]);
    }

    #[test]
    fn ungroundable_implicands_are_skipped() {
        let w = world();
        let x = Variable::named("$x");
        let pattern = BindPattern::new(
            vec![x.clone()],
            vec![Template::link(
                AtomType::InheritanceLink,
                vec![Template::var(&x), Template::Atom(w.animal)],
            )],
            Template::link(AtomType::ListLink, vec![Template::var(&x), Template::Typed(AtomType::Node)]),
        );
        let set = imply_pattern(&w.store, &BacktrackSearch, &pattern, ImplicatorKind::Default, true).unwrap();
        assert!(w.store.get_outgoing(set).unwrap().is_empty());
    }

    #[test]
    fn pln_bindlink_skips_connectivity_check() {
        let w = world();
        let y = w.store.add_node(AtomType::VariableNode, "$y").unwrap();
        let decls = w.store.add_link(AtomType::VariableList, vec![w.x, y]).unwrap();
        let c1 = w.store.add_link(AtomType::InheritanceLink, vec![w.x, w.animal]).unwrap();
        let c2 = w.store.add_link(AtomType::InheritanceLink, vec![y, w.animal]).unwrap();
        let body = w.store.add_link(AtomType::AndLink, vec![c1, c2]).unwrap();
        let out = w.store.add_link(AtomType::ListLink, vec![w.x, y]).unwrap();
        let rewrite = w.store.add_link(AtomType::ImplicationLink, vec![body, out]).unwrap();
        let bl = w.store.add_link(AtomType::BindLink, vec![decls, rewrite]).unwrap();

        assert!(matches!(
            bindlink(&w.store, &BacktrackSearch, bl),
            Err(ImplyError::DisconnectedPattern { components: 2 })
        ));
        let set = pln_bindlink(&w.store, &BacktrackSearch, bl).unwrap();
        // cat/dog for each of two variables.
        assert_eq!(w.store.get_outgoing(set).unwrap().len(), 4);
    }

    #[test]
    fn instantiator_reports_unbound_variables() {
        let w = world();
        let inst = Instantiator::new(&w.store);
        let x = Variable::fresh();
        let t = Template::link(AtomType::ListLink, vec![Template::var(&x)]);
        assert_eq!(inst.instantiate(&t, &HashMap::new()).unwrap(), None);

        let mut soln = HashMap::new();
        soln.insert(x, w.cat);
        let h = inst.instantiate(&t, &soln).unwrap().unwrap();
        assert_eq!(w.store.get_outgoing(h).unwrap(), vec![w.cat]);
    }
}
