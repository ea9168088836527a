//! Deduction: `L(A, B), L(B, C) |- L(A, C)`.

use crate::atom::{AtomStore, AtomType, Handle};
use crate::formula::Formula;
use crate::pattern::{Template, Variable};
use crate::truth::TruthValue;

use super::{Rule, RuleOps, RuleResult, prefixed_name, truth_value};

static OPS: RuleOps = RuleOps {
    validate,
    extract_truth_values,
    build_target,
    decompose_goal,
    target_template,
};

impl Rule {
    /// Deduction over binary links of `link_type` (and its subtypes).
    pub fn deduction(link_type: AtomType) -> Rule {
        let premise = || {
            Template::link(
                link_type,
                vec![Template::Typed(AtomType::Atom), Template::Typed(AtomType::Atom)],
            )
        };
        Rule::new(
            prefixed_name(link_type, "DeductionRule"),
            Formula::Deduction,
            link_type,
            vec![premise(), premise()],
            &OPS,
        )
    }
}

fn validate(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> bool {
    premises.len() == 2 && premises[0] != premises[1] && rule.matches_filter(store, premises)
}

/// `[AB, BC, A, B, C]`; `B` is taken from the first premise.
fn extract_truth_values(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Vec<TruthValue>> {
    rule.expect_premises(premises, 2)?;
    let (a, b) = rule.binary_premise(store, premises[0])?;
    let (b2, c) = rule.binary_premise(store, premises[1])?;
    rule.check_shared(b, b2)?;
    Ok(vec![
        truth_value(store, premises[0])?,
        truth_value(store, premises[1])?,
        truth_value(store, a)?,
        truth_value(store, b)?,
        truth_value(store, c)?,
    ])
}

fn build_target(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Template> {
    rule.expect_premises(premises, 2)?;
    let (a, _) = rule.binary_premise(store, premises[0])?;
    let (_, c) = rule.binary_premise(store, premises[1])?;
    Ok(rule.binary(Template::Atom(a), Template::Atom(c)))
}

/// `L(X, Y)` needs `L(X, $v)` and `L($v, Y)` for some fresh `$v`.
fn decompose_goal(rule: &Rule, store: &dyn AtomStore, goal: &Template) -> Vec<Vec<Template>> {
    let Some((x, y)) = rule.split_binary_goal(store, goal) else {
        return Vec::new();
    };
    let middle = Template::Var(Variable::fresh());
    vec![vec![rule.binary(x, middle.clone()), rule.binary(middle, y)]]
}

fn target_template(rule: &Rule) -> Template {
    rule.binary(
        Template::Var(Variable::fresh()),
        Template::Var(Variable::fresh()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::MemStore;
    use crate::error::RuleError;
    use crate::formula::Evaluator;

    struct Chain {
        store: MemStore,
        a: Handle,
        b: Handle,
        c: Handle,
        ab: Handle,
        bc: Handle,
    }

    fn chain() -> Chain {
        let store = MemStore::new();
        let node = |name: &str, s: f64| {
            let h = store.add_node(AtomType::ConceptNode, name).unwrap();
            store.set_truth_value(h, TruthValue::simple(s, 100.0)).unwrap();
            h
        };
        let (a, b, c) = (node("a", 0.2), node("b", 0.4), node("c", 0.5));
        let ab = store.add_link(AtomType::InheritanceLink, vec![a, b]).unwrap();
        let bc = store.add_link(AtomType::InheritanceLink, vec![b, c]).unwrap();
        store.set_truth_value(ab, TruthValue::simple(0.8, 50.0)).unwrap();
        store.set_truth_value(bc, TruthValue::simple(0.9, 50.0)).unwrap();
        Chain {
            store,
            a,
            b,
            c,
            ab,
            bc,
        }
    }

    #[test]
    fn named_after_link_type() {
        assert_eq!(Rule::deduction(AtomType::InheritanceLink).name(), "InheritanceDeductionRule");
        assert_eq!(Rule::deduction(AtomType::ImplicationLink).name(), "ImplicationDeductionRule");
    }

    #[test]
    fn extracts_in_formula_order() {
        let ch = chain();
        let rule = Rule::deduction(AtomType::InheritanceLink);
        let tvs = rule.extract_truth_values(&ch.store, &[ch.ab, ch.bc]).unwrap();
        let strengths: Vec<f64> = tvs.iter().map(TruthValue::strength).collect();
        assert_eq!(strengths, vec![0.8, 0.9, 0.2, 0.4, 0.5]);
    }

    #[test]
    fn forward_application() {
        let ch = chain();
        let rule = Rule::deduction(AtomType::InheritanceLink);
        let conclusion = rule
            .apply(&ch.store, &Evaluator::default(), &[ch.ab, ch.bc])
            .unwrap()
            .unwrap();
        assert_eq!(conclusion.rule, "InheritanceDeductionRule");
        assert_eq!(
            conclusion.template,
            Template::link(AtomType::InheritanceLink, vec![Template::Atom(ch.a), Template::Atom(ch.c)])
        );
        let tv = conclusion.evaluation.value().unwrap();
        let expected = 0.8 * 0.9 + 0.2 * (0.5 - 0.4 * 0.9) / 0.6;
        assert!((tv.strength - expected).abs() < 1e-9);
        // nA clamps to nAB = 50; nAC = 50 * 50 / 100.
        assert!((tv.count - 25.0).abs() < 1e-9);

        let h = conclusion.materialize(&ch.store).unwrap().unwrap();
        assert_eq!(ch.store.get_outgoing(h).unwrap(), vec![ch.a, ch.c]);
        assert!((ch.store.get_truth_value(h).unwrap().strength() - expected).abs() < 1e-9);
    }

    #[test]
    fn identical_premises_decline() {
        let ch = chain();
        let rule = Rule::deduction(AtomType::InheritanceLink);
        assert!(!rule.validate(&ch.store, &[ch.ab, ch.ab]));
        assert_eq!(rule.apply(&ch.store, &Evaluator::default(), &[ch.ab, ch.ab]).unwrap(), None);
    }

    #[test]
    fn wrong_shapes_decline() {
        let ch = chain();
        let rule = Rule::deduction(AtomType::InheritanceLink);
        let imp = ch.store.add_link(AtomType::ImplicationLink, vec![ch.a, ch.b]).unwrap();
        assert!(!rule.validate(&ch.store, &[ch.ab]));
        assert!(!rule.validate(&ch.store, &[ch.ab, imp]));
        assert!(!rule.validate(&ch.store, &[ch.ab, ch.a]));
        assert!(matches!(
            rule.extract_truth_values(&ch.store, &[ch.ab]),
            Err(RuleError::PremiseCount { expected: 2, actual: 1, .. })
        ));
        assert!(matches!(
            rule.extract_truth_values(&ch.store, &[ch.ab, ch.a]),
            Err(RuleError::MalformedPremise { .. })
        ));
    }

    #[test]
    fn strict_arguments_reject_broken_chains() {
        let ch = chain();
        let ca = ch.store.add_link(AtomType::InheritanceLink, vec![ch.c, ch.a]).unwrap();

        let lenient = Rule::deduction(AtomType::InheritanceLink);
        assert!(lenient.apply(&ch.store, &Evaluator::default(), &[ch.ab, ca]).unwrap().is_some());

        let strict = Rule::deduction(AtomType::InheritanceLink).with_strict_arguments(true);
        let err = strict
            .apply(&ch.store, &Evaluator::default(), &[ch.ab, ca])
            .unwrap_err();
        assert!(matches!(err, RuleError::SharedEndpointMismatch { .. }));
        assert!(strict.apply(&ch.store, &Evaluator::default(), &[ch.ab, ch.bc]).unwrap().is_some());
    }

    #[test]
    fn decomposes_through_a_fresh_middle_term() {
        let ch = chain();
        let rule = Rule::deduction(AtomType::InheritanceLink);
        let goal = Template::link(AtomType::InheritanceLink, vec![Template::Atom(ch.a), Template::Atom(ch.c)]);
        let alternatives = rule.decompose_goal(&ch.store, &goal);
        assert_eq!(alternatives.len(), 1);
        let [first, second] = &alternatives[0][..] else {
            panic!("expected two premises");
        };
        let (Template::Link { outgoing: o1, .. }, Template::Link { outgoing: o2, .. }) = (first, second) else {
            panic!("premises should be links");
        };
        assert_eq!(o1[0], Template::Atom(ch.a));
        assert_eq!(o2[1], Template::Atom(ch.c));
        assert!(matches!(o1[1], Template::Var(_)));
        assert_eq!(o1[1], o2[0]);

        // A concrete goal atom decomposes the same way.
        let ac = ch.store.add_link(AtomType::InheritanceLink, vec![ch.a, ch.c]).unwrap();
        assert_eq!(rule.decompose_goal(&ch.store, &Template::Atom(ac)).len(), 1);
    }

    #[test]
    fn other_link_types_do_not_decompose() {
        let ch = chain();
        let rule = Rule::deduction(AtomType::InheritanceLink);
        let goal = Template::link(AtomType::ImplicationLink, vec![Template::Atom(ch.a), Template::Atom(ch.c)]);
        assert!(rule.decompose_goal(&ch.store, &goal).is_empty());
        assert!(!rule.can_produce(&ch.store, &goal));

        let sub = Template::link(AtomType::SubsetLink, vec![Template::Atom(ch.a), Template::Atom(ch.c)]);
        assert!(rule.can_produce(&ch.store, &sub));
        assert_eq!(rule.decompose_goal(&ch.store, &sub).len(), 1);
    }

    #[test]
    fn fresh_target_templates() {
        let rule = Rule::deduction(AtomType::InheritanceLink);
        let (t1, t2) = (rule.target_template(), rule.target_template());
        assert_eq!(t1.variables().len(), 2);
        assert_ne!(t1, t2);
    }
}
