//! Inversion: `L(A, B) |- L(B, A)` by Bayes' rule.

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
    /// Inversion of binary links of `link_type` (and its subtypes).
    pub fn inversion(link_type: AtomType) -> Rule {
        Rule::new(
            prefixed_name(link_type, "InversionRule"),
            Formula::Inversion,
            link_type,
            vec![Template::link(
                link_type,
                vec![Template::Typed(AtomType::Atom), Template::Typed(AtomType::Atom)],
            )],
            &OPS,
        )
    }
}

fn validate(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> bool {
    premises.len() == 1 && rule.matches_filter(store, premises)
}

/// `[AB, A, B]`.
fn extract_truth_values(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Vec<TruthValue>> {
    rule.expect_premises(premises, 1)?;
    let (a, b) = rule.binary_premise(store, premises[0])?;
    Ok(vec![
        truth_value(store, premises[0])?,
        truth_value(store, a)?,
        truth_value(store, b)?,
    ])
}

fn build_target(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Template> {
    rule.expect_premises(premises, 1)?;
    let (a, b) = rule.binary_premise(store, premises[0])?;
    Ok(rule.binary(Template::Atom(b), Template::Atom(a)))
}

fn decompose_goal(rule: &Rule, store: &dyn AtomStore, goal: &Template) -> Vec<Vec<Template>> {
    match rule.split_binary_goal(store, goal) {
        Some((x, y)) => vec![vec![rule.binary(y, x)]],
        None => Vec::new(),
    }
}

fn target_template(rule: &Rule) -> Template {
    rule.binary(
        Template::Var(Variable::fresh()),
        Template::Var(Variable::fresh()),
    )
}
