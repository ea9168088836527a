//! Formulas over sequences of truth values.
//!
//! Callers guarantee the minimum length; the dispatcher checks [`Arity`]
//! before delegating here.
//!
//! [`Arity`]: super::Arity

use crate::config::FormulaConfig;
use crate::truth::{SimpleTruthValue as Tv, confidence_to_count};

use super::algebra::negation;

/// How [`subset_eval`] combines a subset membership with a superset membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsetCombiner {
    /// Probabilistic intersection, `a * b`.
    Product,
    /// Fuzzy intersection, `min(a, b)`.
    Min,
}

impl SubsetCombiner {
    fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            SubsetCombiner::Product => a * b,
            SubsetCombiner::Min => a.min(b),
        }
    }
}

/// Conjunction of independent inputs: product of strengths, product of confidences.
pub fn symmetric_and(tvs: &[Tv]) -> Tv {
    let (s, c) = tvs
        .iter()
        .fold((1.0, 1.0), |(s, c), tv| (s * tv.strength, c * tv.confidence()));
    Tv::new(s, confidence_to_count(c))
}

fn or_pair(a: Tv, b: Tv) -> Tv {
    Tv::new(
        a.strength + b.strength,
        a.count + b.count - (a.strength * b.count + b.strength * a.count) / 2.0,
    )
}

/// Disjunction, evaluated by splitting the inputs in half and combining pairwise.
///
/// The left half holds `N / 2` inputs and the right half the rest, so for
/// `N = 2` this is exactly the pairwise combination.
pub fn or(tvs: &[Tv]) -> Tv {
    match tvs {
        [] => Tv::unknown(),
        [single] => *single,
        [a, b] => or_pair(*a, *b),
        _ => {
            let (left, right) = tvs.split_at(tvs.len() / 2);
            or_pair(or(left), or(right))
        }
    }
}

/// Disjunction through De Morgan: `not(and(not x_i))`.
pub fn or_via_and(tvs: &[Tv]) -> Tv {
    let negated: Vec<Tv> = tvs.iter().copied().map(negation).collect();
    negation(symmetric_and(&negated))
}

/// `[A, B, AB]`: `A or B` minus the overlap, count scaled by the confidence level.
pub fn excluding_or(cfg: &FormulaConfig, a: Tv, b: Tv, ab: Tv) -> Tv {
    let s = a.strength + b.strength - ab.strength;
    let n = (a.count + b.count - (a.strength * b.count + b.strength * a.count) / 2.0)
        * cfg.default_confidence_level;
    Tv::new(s, n)
}

/// Universal quantification: strengths averaged with weight `sqrt(count)`.
///
/// Inputs without any evidence give `(0, 0)`.
pub fn for_all(cfg: &FormulaConfig, tvs: &[Tv]) -> Tv {
    let (weighted, total_weight, total_count) =
        tvs.iter().fold((0.0, 0.0, 0.0), |(ws, w, n), tv| {
            let weight = tv.count.max(0.0).sqrt();
            (ws + tv.strength * weight, w + weight, n + tv.count)
        });
    if total_weight <= 0.0 {
        return Tv::unknown();
    }
    Tv::new(weighted / total_weight.max(cfg.tv_min), total_count)
}

/// Existential quantification: `not(forall(not x_i))`.
pub fn exists(cfg: &FormulaConfig, tvs: &[Tv]) -> Tv {
    let negated: Vec<Tv> = tvs.iter().copied().map(negation).collect();
    negation(for_all(cfg, &negated))
}

/// Count-weighted average strength; counts add up.
pub fn predicate_tv(cfg: &FormulaConfig, tvs: &[Tv]) -> Tv {
    let (weighted, total) = tvs.iter().fold((0.0, 0.0), |(ws, n), tv| {
        (ws + tv.strength * tv.count, n + tv.count)
    });
    Tv::new(weighted / total.max(cfg.tv_min), total)
}

/// Subset evaluation over paired memberships.
///
/// The first half of `tvs` are memberships in the subset, the second half the
/// memberships of the same elements in the superset. An empty input gives `(0, 0)`.
pub fn subset_eval(cfg: &FormulaConfig, combiner: SubsetCombiner, tvs: &[Tv]) -> Tv {
    if tvs.is_empty() {
        return Tv::unknown();
    }
    let (sub, sup) = tvs.split_at(tvs.len() / 2);
    let (overlap, mass) = sub
        .iter()
        .zip(sup)
        .fold((0.0, 0.0), |(o, m), (a, b)| {
            (o + combiner.combine(a.strength, b.strength), m + a.strength)
        });
    Tv::new(overlap / mass.max(cfg.tv_min), sub.len() as f64)
}
