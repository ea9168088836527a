//! Symmetric conjunction: `p1, ..., pn |- And(p1, ..., pn)`.

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
    /// Conjunction of `arity` distinct premises.
    pub fn symmetric_and(arity: usize) -> Rule {
        Rule::new(
            "SymmetricAndRule".to_string(),
            Formula::SymmetricAnd,
            AtomType::AndLink,
            vec![Template::Typed(AtomType::Atom); arity],
            &OPS,
        )
    }
}

fn arity(rule: &Rule) -> usize {
    rule.input_filter().len()
}

fn validate(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> bool {
    let distinct = premises
        .iter()
        .enumerate()
        .all(|(i, h)| !premises[..i].contains(h));
    !premises.is_empty() && distinct && rule.matches_filter(store, premises)
}

fn extract_truth_values(rule: &Rule, store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Vec<TruthValue>> {
    rule.expect_premises(premises, arity(rule))?;
    premises.iter().map(|h| truth_value(store, *h)).collect()
}

fn build_target(rule: &Rule, _store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Template> {
    rule.expect_premises(premises, arity(rule))?;
    Ok(Template::link(
        AtomType::AndLink,
        premises.iter().copied().map(Template::Atom).collect(),
    ))
}

/// `And(g1, ..., gn)` needs each `gi`.
fn decompose_goal(rule: &Rule, store: &dyn AtomStore, goal: &Template) -> Vec<Vec<Template>> {
    let expanded = match goal {
        Template::Atom(h) => match Template::expand(store, *h) {
            Ok(t) => t,
            Err(_) => return Vec::new(),
        },
        other => other.clone(),
    };
    match expanded {
        Template::Link {
            link_type,
            outgoing,
        } if link_type.inherits(AtomType::AndLink) && outgoing.len() == arity(rule) => {
            vec![outgoing]
        }
        _ => Vec::new(),
    }
}

fn target_template(rule: &Rule) -> Template {
    Template::link(
        AtomType::AndLink,
        (0..arity(rule))
            .map(|_| Template::Var(Variable::fresh()))
            .collect(),
    )
}
