//! Inference rules: premise shapes, truth-value formulas and conclusions.
//!
//! A [`Rule`] bundles a formula with the structural knowledge needed to use
//! it in both directions:
//!
//! - **forward**: validate concrete premises, extract their truth values in
//!   the formula's order, compute the conclusion's truth value and build the
//!   conclusion shape ([`Rule::apply`]);
//! - **backward**: split a goal into premise shapes that would prove it
//!   ([`Rule::decompose_goal`]), after a cheap [`Rule::can_produce`] check.
//!
//! Rule-specific behaviour lives in a static [`RuleOps`] table; the shared
//! plumbing is here. Instances are built by the constructors in the
//! submodules (`Rule::deduction`, `Rule::inversion`, `Rule::modus_ponens`,
//! `Rule::symmetric_and`).

pub mod and;
pub mod deduction;
pub mod inversion;
pub mod modus_ponens;

use crate::atom::{Atom, AtomStore, AtomType, Handle, StoreResult};
use crate::config::RuleConfig;
use crate::error::RuleError;
use crate::formula::{Evaluation, Evaluator, Formula};
use crate::pattern::{Template, unify};
use crate::query::Instantiator;
use crate::truth::TruthValue;

/// Result type for rule operations.
pub type RuleResult<T> = std::result::Result<T, RuleError>;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// Behaviour table of one kind of rule.
pub struct RuleOps {
    /// Whether the premises are acceptable. Declining is not an error.
    pub validate: fn(&Rule, &dyn AtomStore, &[Handle]) -> bool,
    /// Premise truth values in the formula's input order.
    pub extract_truth_values: fn(&Rule, &dyn AtomStore, &[Handle]) -> RuleResult<Vec<TruthValue>>,
    /// Shape of the conclusion drawn from the premises.
    pub build_target: fn(&Rule, &dyn AtomStore, &[Handle]) -> RuleResult<Template>,
    /// Premise shapes that would prove the goal; one entry per alternative.
    pub decompose_goal: fn(&Rule, &dyn AtomStore, &Template) -> Vec<Vec<Template>>,
    /// Fully variablized conclusion shape, with fresh variables.
    pub target_template: fn(&Rule) -> Template,
}

/// An inference rule.
pub struct Rule {
    name: String,
    formula: Formula,
    link_type: AtomType,
    input_filter: Vec<Template>,
    strict_arguments: bool,
    ops: &'static RuleOps,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("formula", &self.formula)
            .field("link_type", &self.link_type)
            .field("strict_arguments", &self.strict_arguments)
            .finish()
    }
}

impl Rule {
    pub(crate) fn new(
        name: String,
        formula: Formula,
        link_type: AtomType,
        input_filter: Vec<Template>,
        ops: &'static RuleOps,
    ) -> Self {
        Self {
            name,
            formula,
            link_type,
            input_filter,
            strict_arguments: false,
            ops,
        }
    }

    /// Check that chained premises share their intermediate atom.
    pub fn with_strict_arguments(mut self, strict: bool) -> Self {
        self.strict_arguments = strict;
        self
    }

    pub fn with_config(self, config: &RuleConfig) -> Self {
        self.with_strict_arguments(config.strict_argument_validity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formula(&self) -> Formula {
        self.formula
    }

    pub fn link_type(&self) -> AtomType {
        self.link_type
    }

    pub fn strict_arguments(&self) -> bool {
        self.strict_arguments
    }

    /// Premise shapes, one template per premise.
    pub fn input_filter(&self) -> &[Template] {
        &self.input_filter
    }

    /// Whether each premise matches its input-filter template.
    pub fn matches_filter(&self, store: &dyn AtomStore, premises: &[Handle]) -> bool {
        premises.len() == self.input_filter.len()
            && self
                .input_filter
                .iter()
                .zip(premises)
                .all(|(t, h)| t.matches(store, *h).unwrap_or(false))
    }

    pub fn validate(&self, store: &dyn AtomStore, premises: &[Handle]) -> bool {
        (self.ops.validate)(self, store, premises)
    }

    pub fn extract_truth_values(
        &self,
        store: &dyn AtomStore,
        premises: &[Handle],
    ) -> RuleResult<Vec<TruthValue>> {
        (self.ops.extract_truth_values)(self, store, premises)
    }

    pub fn compute_conclusion_tv(
        &self,
        evaluator: &Evaluator,
        tvs: &[TruthValue],
    ) -> RuleResult<Evaluation> {
        Ok(evaluator.compute(self.formula, tvs)?)
    }

    pub fn build_target(&self, store: &dyn AtomStore, premises: &[Handle]) -> RuleResult<Template> {
        (self.ops.build_target)(self, store, premises)
    }

    pub fn decompose_goal(&self, store: &dyn AtomStore, goal: &Template) -> Vec<Vec<Template>> {
        (self.ops.decompose_goal)(self, store, goal)
    }

    pub fn target_template(&self) -> Template {
        (self.ops.target_template)(self)
    }

    /// Whether the rule's conclusion shape unifies with `goal`.
    pub fn can_produce(&self, store: &dyn AtomStore, goal: &Template) -> bool {
        unify(store, &self.target_template(), goal).is_some()
    }

    /// Draw a conclusion from concrete premises.
    ///
    /// Returns `Ok(None)` when the rule declines the premises.
    pub fn apply(
        &self,
        store: &dyn AtomStore,
        evaluator: &Evaluator,
        premises: &[Handle],
    ) -> RuleResult<Option<Conclusion>> {
        if !self.validate(store, premises) {
            tracing::trace!(rule = %self.name, premises = premises.len(), "premises declined");
            return Ok(None);
        }
        let tvs = self.extract_truth_values(store, premises)?;
        let evaluation = self.compute_conclusion_tv(evaluator, &tvs)?;
        let template = self.build_target(store, premises)?;
        tracing::debug!(rule = %self.name, target = %template, computed = evaluation.is_computed(), "rule applied");
        Ok(Some(Conclusion {
            rule: self.name.clone(),
            template,
            evaluation,
        }))
    }

    // Shared helpers for the rule instances.

    fn expect_premises(&self, premises: &[Handle], expected: usize) -> RuleResult<()> {
        if premises.len() != expected {
            return Err(RuleError::PremiseCount {
                rule: self.name.clone(),
                expected,
                actual: premises.len(),
            });
        }
        Ok(())
    }

    /// Endpoints of a two-element link premise.
    fn binary_premise(&self, store: &dyn AtomStore, premise: Handle) -> RuleResult<(Handle, Handle)> {
        match store.get_atom(premise)? {
            Atom::Link { outgoing, .. } if outgoing.len() == 2 => Ok((outgoing[0], outgoing[1])),
            other => Err(RuleError::MalformedPremise {
                rule: self.name.clone(),
                handle: premise.get(),
                reason: format!("expected a binary link, found {}", other.atom_type()),
            }),
        }
    }

    fn check_shared(&self, left: Handle, right: Handle) -> RuleResult<()> {
        if self.strict_arguments && left != right {
            return Err(RuleError::SharedEndpointMismatch {
                rule: self.name.clone(),
                left: left.get(),
                right: right.get(),
            });
        }
        Ok(())
    }

    /// A binary link of the rule's link type over the given shapes.
    fn binary(&self, first: Template, second: Template) -> Template {
        Template::link(self.link_type, vec![first, second])
    }

    /// Split a goal of the rule's link type into its two arguments.
    fn split_binary_goal(&self, store: &dyn AtomStore, goal: &Template) -> Option<(Template, Template)> {
        let expanded = match goal {
            Template::Atom(h) => Template::expand(store, *h).ok()?,
            other => other.clone(),
        };
        match expanded {
            Template::Link {
                link_type,
                mut outgoing,
            } if link_type.inherits(self.link_type) && outgoing.len() == 2 => {
                let second = outgoing.pop()?;
                let first = outgoing.pop()?;
                Some((first, second))
            }
            _ => None,
        }
    }
}

/// Owned copy of a premise's truth value.
fn truth_value(store: &dyn AtomStore, handle: Handle) -> RuleResult<TruthValue> {
    Ok(TruthValue::clone(&*store.get_truth_value(handle)?))
}

/// Name of a per-link-type rule: `InheritanceLink` + `DeductionRule` →
/// `InheritanceDeductionRule`.
fn prefixed_name(link_type: AtomType, rule: &str) -> String {
    let name = link_type.name();
    format!("{}{rule}", name.strip_suffix("Link").unwrap_or(name))
}

/// The standard rule set for the given configuration.
pub fn default_rules(config: &RuleConfig) -> Vec<Rule> {
    let mut rules = Vec::new();
    for link_type in [
        AtomType::InheritanceLink,
        AtomType::SubsetLink,
        AtomType::ImplicationLink,
    ] {
        rules.push(Rule::deduction(link_type).with_config(config));
        rules.push(Rule::inversion(link_type).with_config(config));
    }
    rules.push(Rule::modus_ponens().with_config(config));
    rules.push(Rule::symmetric_and(2).with_config(config));
    rules
}

// ---------------------------------------------------------------------------
// Conclusion
// ---------------------------------------------------------------------------

/// What a rule derived from its premises.
#[derive(Debug, Clone, PartialEq)]
pub struct Conclusion {
    /// Name of the rule that fired.
    pub rule: String,
    pub template: Template,
    pub evaluation: Evaluation,
}

impl Conclusion {
    /// Create the conclusion atom and replace its truth value.
    ///
    /// `None` when the formula produced no value or the template is not closed.
    pub fn materialize(&self, store: &dyn AtomStore) -> StoreResult<Option<Handle>> {
        let Some(tv) = self.evaluation.value() else {
            return Ok(None);
        };
        if !self.template.is_closed() {
            return Ok(None);
        }
        let Some(handle) = Instantiator::new(store).instantiate(&self.template, &Default::default())? else {
            return Ok(None);
        };
        store.set_truth_value(handle, tv.into())?;
        tracing::debug!(rule = %self.rule, %handle, tv = %tv, "conclusion materialized");
        Ok(Some(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::MemStore;

    #[test]
    fn names_are_prefixed_by_link_type() {
        assert_eq!(
            prefixed_name(AtomType::InheritanceLink, "DeductionRule"),
            "InheritanceDeductionRule"
        );
        assert_eq!(
            prefixed_name(AtomType::ImplicationLink, "InversionRule"),
            "ImplicationInversionRule"
        );
    }

    #[test]
    fn default_rules_follow_config() {
        let rules = default_rules(&RuleConfig {
            strict_argument_validity: true,
        });
        assert_eq!(rules.len(), 8);
        assert!(rules.iter().all(Rule::strict_arguments));
        assert!(rules.iter().any(|r| r.name() == "SubsetDeductionRule"));
        assert!(!default_rules(&RuleConfig::default())[0].strict_arguments());
    }

    #[test]
    fn materialize_skips_open_or_uncomputed_conclusions() {
        let store = MemStore::new();
        let a = store.add_node(AtomType::ConceptNode, "a").unwrap();
        let closed = Template::link(AtomType::ListLink, vec![Template::Atom(a)]);

        let not_computed = Conclusion {
            rule: "test".into(),
            template: closed.clone(),
            evaluation: Evaluation::NotComputed {
                formula: Formula::DeductionGeometry,
            },
        };
        assert_eq!(not_computed.materialize(&store).unwrap(), None);

        let open = Conclusion {
            rule: "test".into(),
            template: Template::Typed(AtomType::Node),
            evaluation: Evaluation::Value(crate::truth::SimpleTruthValue::new(0.5, 1.0)),
        };
        assert_eq!(open.materialize(&store).unwrap(), None);

        let ok = Conclusion {
            template: closed,
            ..open
        };
        let h = ok.materialize(&store).unwrap().unwrap();
        assert_eq!(store.get_truth_value(h).unwrap().strength(), 0.5);
    }
}
