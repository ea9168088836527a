//! Two-sided unification of templates.
//!
//! Used to decide whether a rule's conclusion shape can produce a goal, where
//! both sides may contain variables. Concrete link atoms are expanded through
//! the store one level at a time as needed.

use std::collections::HashMap;

use crate::atom::{AtomStore, AtomType};

use super::{Template, Variable};

/// Variable → template, as built by [`unify`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    map: HashMap<Variable, Template>,
}

impl Substitution {
    pub fn get(&self, variable: &Variable) -> Option<&Template> {
        self.map.get(variable)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Apply the substitution exhaustively.
    pub fn apply(&self, template: &Template) -> Template {
        match template {
            Template::Var(v) => match self.map.get(v) {
                Some(bound) => self.apply(bound),
                None => template.clone(),
            },
            Template::Link {
                link_type,
                outgoing,
            } => Template::link(*link_type, outgoing.iter().map(|t| self.apply(t)).collect()),
            Template::Atom(_) | Template::Typed(_) => template.clone(),
        }
    }

    /// Follow variable bindings at the head only.
    fn walk(&self, template: &Template) -> Template {
        let mut current = template;
        while let Template::Var(v) = current {
            match self.map.get(v) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    fn occurs(&self, variable: &Variable, template: &Template) -> bool {
        match self.walk(template) {
            Template::Var(v) => v == *variable,
            Template::Link { outgoing, .. } => outgoing.iter().any(|t| self.occurs(variable, t)),
            Template::Atom(_) | Template::Typed(_) => false,
        }
    }
}

/// Most general unifier of `a` and `b`, if any.
///
/// Link types unify when one inherits the other; a `Typed(t)` wildcard unifies
/// with anything whose type inherits `t`. Outgoing sets unify positionally.
pub fn unify(store: &dyn AtomStore, a: &Template, b: &Template) -> Option<Substitution> {
    let mut subst = Substitution::default();
    unify_into(store, a, b, &mut subst).then_some(subst)
}

fn unify_into(store: &dyn AtomStore, a: &Template, b: &Template, subst: &mut Substitution) -> bool {
    let a = subst.walk(a);
    let b = subst.walk(b);
    match (&a, &b) {
        (Template::Var(x), Template::Var(y)) if x == y => true,
        (Template::Var(x), t) | (t, Template::Var(x)) => {
            if subst.occurs(x, t) {
                return false;
            }
            subst.map.insert(x.clone(), t.clone());
            true
        }
        (Template::Typed(t1), Template::Typed(t2)) => t1.inherits(*t2) || t2.inherits(*t1),
        (Template::Typed(t), other) | (other, Template::Typed(t)) => {
            type_of(store, other).is_some_and(|ty| ty.inherits(*t))
        }
        (Template::Atom(h1), Template::Atom(h2)) => h1 == h2,
        (Template::Atom(h), link @ Template::Link { .. })
        | (link @ Template::Link { .. }, Template::Atom(h)) => match Template::expand(store, *h) {
            Ok(expanded @ Template::Link { .. }) => unify_into(store, &expanded, link, subst),
            _ => false,
        },
        (
            Template::Link {
                link_type: t1,
                outgoing: o1,
            },
            Template::Link {
                link_type: t2,
                outgoing: o2,
            },
        ) => {
            (t1.inherits(*t2) || t2.inherits(*t1))
                && o1.len() == o2.len()
                && o1.iter().zip(o2).all(|(x, y)| unify_into(store, x, y, subst))
        }
    }
}

fn type_of(store: &dyn AtomStore, template: &Template) -> Option<AtomType> {
    match template {
        Template::Atom(h) => store.get_type(*h).ok(),
        other => other.head_type(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Handle, MemStore};

    fn setup() -> (MemStore, Handle, Handle, Handle) {
        let store = MemStore::new();
        let a = store.add_node(AtomType::ConceptNode, "a").unwrap();
        let b = store.add_node(AtomType::ConceptNode, "b").unwrap();
        let ab = store.add_link(AtomType::InheritanceLink, vec![a, b]).unwrap();
        (store, a, b, ab)
    }

    #[test]
    fn variables_bind_to_concrete_atoms() {
        let (store, a, b, _) = setup();
        let (x, y) = (Variable::fresh(), Variable::fresh());
        let pattern = Template::link(AtomType::InheritanceLink, vec![Template::var(&x), Template::var(&y)]);
        let goal = Template::link(AtomType::InheritanceLink, vec![Template::Atom(a), Template::Atom(b)]);
        let s = unify(&store, &pattern, &goal).unwrap();
        assert_eq!(s.apply(&pattern), goal);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn concrete_links_expand_through_the_store() {
        let (store, a, _, ab) = setup();
        let x = Variable::fresh();
        let pattern = Template::link(AtomType::InheritanceLink, vec![Template::Atom(a), Template::var(&x)]);
        assert!(unify(&store, &pattern, &Template::Atom(ab)).is_some());
        assert!(unify(&store, &Template::Atom(ab), &Template::Atom(a)).is_none());
    }

    #[test]
    fn link_types_unify_along_the_hierarchy() {
        let (store, a, b, _) = setup();
        let sub = Template::link(AtomType::SubsetLink, vec![Template::Atom(a), Template::Atom(b)]);
        let inh = Template::link(AtomType::InheritanceLink, vec![Template::Atom(a), Template::Atom(b)]);
        let imp = Template::link(AtomType::ImplicationLink, vec![Template::Atom(a), Template::Atom(b)]);
        assert!(unify(&store, &sub, &inh).is_some());
        assert!(unify(&store, &inh, &imp).is_none());
    }

    #[test]
    fn shared_variables_must_agree() {
        let (store, a, b, _) = setup();
        let x = Variable::fresh();
        let same = Template::link(AtomType::ListLink, vec![Template::var(&x), Template::var(&x)]);
        let diff = Template::link(AtomType::ListLink, vec![Template::Atom(a), Template::Atom(b)]);
        let twice = Template::link(AtomType::ListLink, vec![Template::Atom(a), Template::Atom(a)]);
        assert!(unify(&store, &same, &diff).is_none());
        assert!(unify(&store, &same, &twice).is_some());
    }

    #[test]
    fn occurs_check_rejects_cycles() {
        let (store, a, _, _) = setup();
        let x = Variable::fresh();
        let wrapped = Template::link(AtomType::ListLink, vec![Template::var(&x), Template::Atom(a)]);
        assert!(unify(&store, &Template::var(&x), &wrapped).is_none());
    }

    #[test]
    fn typed_wildcards() {
        let (store, a, _, ab) = setup();
        let node = Template::Typed(AtomType::Node);
        assert!(unify(&store, &node, &Template::Atom(a)).is_some());
        assert!(unify(&store, &node, &Template::Atom(ab)).is_none());
        assert!(unify(&store, &Template::Typed(AtomType::Link), &Template::Atom(ab)).is_some());
    }
}
