//! Modus ponens: `Implication(A, B), A |- B`.

use crate::atom::{AtomStore, AtomType, Handle};
use crate::formula::Formula;
use crate::pattern::{Template, Variable};
use crate::truth::TruthValue;

use super::{Rule, RuleOps, RuleResult, truth_value};

static OPS: RuleOps = RuleOps {
    validate,
    extract_truth_values,
    build_target,
    decompose_goal,
    target_template,
};

impl Rule {
    pub fn modus_ponens() -> Rule {
        Rule::new(
            "ModusPonensRule".to_string(),
            Formula::ModusPonens,
            AtomType::ImplicationLink,
            vec![
                Template::link(
                    AtomType::ImplicationLink,
                    vec![Template::Typed(AtomType::Atom), Template::Typed(AtomType::Atom)],
                ),
                Template::Typed(AtomType::Atom),
            ],
            &OPS,
        )
    }
}

/// The antecedent check happens at extraction, under strict arguments.
fn validate(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> bool {
    premises.len() == 2 && premises[0] != premises[1] && rule.matches_filter(store, premises)
}

/// `[A, AB]`.
fn extract_truth_values(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Vec<TruthValue>> {
    rule.expect_premises(premises, 2)?;
    let (antecedent, _) = rule.binary_premise(store, premises[0])?;
    rule.check_shared(antecedent, premises[1])?;
    Ok(vec![
        truth_value(store, premises[1])?,
        truth_value(store, premises[0])?,
    ])
}

fn build_target(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Template> {
    rule.expect_premises(premises, 2)?;
    let (_, consequent) = rule.binary_premise(store, premises[0])?;
    Ok(Template::Atom(consequent))
}

/// Any goal `G` follows from `Implication($v, G)` and `$v`.
fn decompose_goal(rule: &Rule, _store: &dyn AtomStore, goal: &Template) -> Vec<Vec<Template>> {
    let antecedent = Template::Var(Variable::fresh());
    vec![vec![rule.binary(antecedent.clone(), goal.clone()), antecedent]]
}

fn target_template(_rule: &Rule) -> Template {
    Template::Var(Variable::fresh())
}
