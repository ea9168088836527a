//! The truth-value algebra and its dispatch.
//!
//! A [`Formula`] names one function of the algebra. Formulas are evaluated
//! through an [`Evaluator`], which owns the numeric constants
//! ([`FormulaConfig`]), checks the input contract once and reports each
//! evaluation to an optional [`FormulaObserver`]. The pure functions live in
//! [`algebra`] (fixed arity) and [`variadic`] (sequences).

pub mod algebra;
pub mod variadic;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::FormulaConfig;
use crate::error::FormulaError;
use crate::truth::{SimpleTruthValue, TruthValue};

pub use variadic::SubsetCombiner;

/// Result type for formula evaluation.
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

// ---------------------------------------------------------------------------
// Formula
// ---------------------------------------------------------------------------

/// One function of the truth-value algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formula {
    Identity,
    Inversion,
    ImplicationBreakdown,
    ImplicationConstruction,
    Not,
    Negation,
    Deduction,
    DeductionGeometry,
    Revision,
    Inh2Sim,
    Sim2Inh,
    AndBreakdown,
    ModusPonens,
    Inh2Imp,
    Imp2Inh,
    Mem2Inh,
    Mem2Eval,
    Eval2Inh,
    Ext2Int,
    Int2Ext,
    InheritanceSubstitution,
    SymmetricAnd,
    AsymmetricAnd,
    Or,
    OrViaAnd,
    ExcludingOr,
    ForAll,
    Exists,
    PredicateTv,
    SubsetEval(SubsetCombiner),
    ContextFreeToSensitive,
}

/// Number of truth values a formula consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    /// Any even number, including zero.
    Even,
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Even => n % 2 == 0,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(k) => write!(f, "{k}"),
            Arity::AtLeast(k) => write!(f, "at least {k}"),
            Arity::Even => f.write_str("an even number of"),
        }
    }
}

impl Formula {
    /// Every formula, in declaration order.
    pub const ALL: [Formula; 32] = [
        Formula::Identity,
        Formula::Inversion,
        Formula::ImplicationBreakdown,
        Formula::ImplicationConstruction,
        Formula::Not,
        Formula::Negation,
        Formula::Deduction,
        Formula::DeductionGeometry,
        Formula::Revision,
        Formula::Inh2Sim,
        Formula::Sim2Inh,
        Formula::AndBreakdown,
        Formula::ModusPonens,
        Formula::Inh2Imp,
        Formula::Imp2Inh,
        Formula::Mem2Inh,
        Formula::Mem2Eval,
        Formula::Eval2Inh,
        Formula::Ext2Int,
        Formula::Int2Ext,
        Formula::InheritanceSubstitution,
        Formula::SymmetricAnd,
        Formula::AsymmetricAnd,
        Formula::Or,
        Formula::OrViaAnd,
        Formula::ExcludingOr,
        Formula::ForAll,
        Formula::Exists,
        Formula::PredicateTv,
        Formula::SubsetEval(SubsetCombiner::Product),
        Formula::SubsetEval(SubsetCombiner::Min),
        Formula::ContextFreeToSensitive,
    ];

    pub fn arity(self) -> Arity {
        use Formula::*;
        match self {
            Identity | Negation | AndBreakdown | Inh2Imp | Imp2Inh | Mem2Inh | Mem2Eval
            | Eval2Inh | Ext2Int | Int2Ext => Arity::Exactly(1),
            Not | Revision | ModusPonens | InheritanceSubstitution | AsymmetricAnd
            | ContextFreeToSensitive => Arity::Exactly(2),
            Inversion | ImplicationBreakdown | ImplicationConstruction | Sim2Inh
            | ExcludingOr => Arity::Exactly(3),
            Inh2Sim => Arity::Exactly(4),
            Deduction | DeductionGeometry => Arity::Exactly(5),
            SymmetricAnd | OrViaAnd | ForAll | Exists | PredicateTv => Arity::AtLeast(1),
            Or => Arity::AtLeast(2),
            SubsetEval(_) => Arity::Even,
        }
    }

    /// Kebab-case name, as accepted by [`Formula::from_name`].
    pub fn name(self) -> &'static str {
        use Formula::*;
        match self {
            Identity => "identity",
            Inversion => "inversion",
            ImplicationBreakdown => "implication-breakdown",
            ImplicationConstruction => "implication-construction",
            Not => "not",
            Negation => "negation",
            Deduction => "deduction",
            DeductionGeometry => "deduction-geometry",
            Revision => "revision",
            Inh2Sim => "inh2sim",
            Sim2Inh => "sim2inh",
            AndBreakdown => "and-breakdown",
            ModusPonens => "modus-ponens",
            Inh2Imp => "inh2imp",
            Imp2Inh => "imp2inh",
            Mem2Inh => "mem2inh",
            Mem2Eval => "mem2eval",
            Eval2Inh => "eval2inh",
            Ext2Int => "ext2int",
            Int2Ext => "int2ext",
            InheritanceSubstitution => "inheritance-substitution",
            SymmetricAnd => "symmetric-and",
            AsymmetricAnd => "asymmetric-and",
            Or => "or",
            OrViaAnd => "or-via-and",
            ExcludingOr => "excluding-or",
            ForAll => "forall",
            Exists => "exists",
            PredicateTv => "predicate-tv",
            SubsetEval(SubsetCombiner::Product) => "subset-eval-product",
            SubsetEval(SubsetCombiner::Min) => "subset-eval-min",
            ContextFreeToSensitive => "context-free-to-sensitive",
        }
    }

    pub fn from_name(name: &str) -> FormulaResult<Formula> {
        Formula::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| FormulaError::UnknownFormula {
                name: name.to_string(),
            })
    }

    /// Evaluate with the default configuration and no observer.
    pub fn compute(self, tvs: &[TruthValue]) -> FormulaResult<Evaluation> {
        Evaluator::default().compute(self, tvs)
    }

    /// Delegate to the pure function. `None` when `tvs` does not fit the shape.
    fn evaluate(self, cfg: &FormulaConfig, tvs: &[SimpleTruthValue]) -> Option<Evaluation> {
        use algebra as a;
        use variadic as v;

        let value = match (self, tvs) {
            (Formula::Identity, [x]) => a::identity(*x),
            (Formula::Negation, [x]) => a::negation(*x),
            (
                Formula::AndBreakdown
                | Formula::Inh2Imp
                | Formula::Imp2Inh
                | Formula::Mem2Eval
                | Formula::Eval2Inh,
                [ab],
            ) => a::pass_through(*ab),
            (Formula::Mem2Inh, [ab]) => a::mem2inh(cfg, *ab),
            (Formula::Ext2Int, [ab]) => a::ext2int(cfg, *ab),
            (Formula::Int2Ext, [ab]) => a::int2ext(cfg, *ab),
            (Formula::Not, [x, y]) => a::not(*x, *y),
            (Formula::Revision, [x, y]) => a::revision(cfg, *x, *y),
            (Formula::ModusPonens, [x, ab]) => a::modus_ponens(cfg, *x, *ab),
            (Formula::InheritanceSubstitution, [x, y]) => a::inheritance_substitution(*x, *y),
            (Formula::AsymmetricAnd, [x, y]) => a::asymmetric_and(*x, *y),
            (Formula::ContextFreeToSensitive, [x, cx]) => a::context_free_to_sensitive(*x, *cx),
            (Formula::Inversion, [ab, x, y]) => a::inversion(cfg, *ab, *x, *y),
            (Formula::ImplicationBreakdown, [ab, x, y]) => {
                a::implication_breakdown(cfg, *ab, *x, *y)
            }
            (Formula::ImplicationConstruction, [ab, x, y]) => {
                a::implication_construction(*ab, *x, *y)
            }
            (Formula::Sim2Inh, [ab, x, y]) => a::sim2inh(cfg, *ab, *x, *y),
            (Formula::ExcludingOr, [x, y, xy]) => v::excluding_or(cfg, *x, *y, *xy),
            (Formula::Inh2Sim, [ab, ba, x, y]) => a::inh2sim(cfg, *ab, *ba, *x, *y),
            (Formula::Deduction, [ab, bc, x, y, z]) => a::deduction(cfg, *ab, *bc, *x, *y, *z),
            (Formula::DeductionGeometry, [ab, bc, x, y, z]) => {
                return Some(a::deduction_geometry(cfg, *ab, *bc, *x, *y, *z));
            }
            (Formula::SymmetricAnd, [_, ..]) => v::symmetric_and(tvs),
            (Formula::OrViaAnd, [_, ..]) => v::or_via_and(tvs),
            (Formula::ForAll, [_, ..]) => v::for_all(cfg, tvs),
            (Formula::Exists, [_, ..]) => v::exists(cfg, tvs),
            (Formula::PredicateTv, [_, ..]) => v::predicate_tv(cfg, tvs),
            (Formula::Or, [_, _, ..]) => v::or(tvs),
            (Formula::SubsetEval(combiner), _) if tvs.len() % 2 == 0 => {
                v::subset_eval(cfg, combiner, tvs)
            }
            _ => return None,
        };
        Some(Evaluation::Value(value))
    }

    fn arity_error(self, actual: usize) -> FormulaError {
        FormulaError::Arity {
            formula: self.name().to_string(),
            expected: self.arity().to_string(),
            actual,
        }
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::from_name(s)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Outcome of a formula evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    Value(SimpleTruthValue),
    /// The formula exists but does not produce a value.
    NotComputed { formula: Formula },
}

impl Evaluation {
    pub fn value(&self) -> Option<SimpleTruthValue> {
        match self {
            Evaluation::Value(tv) => Some(*tv),
            Evaluation::NotComputed { .. } => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Evaluation::Value(_))
    }

    pub fn into_result(self) -> FormulaResult<SimpleTruthValue> {
        match self {
            Evaluation::Value(tv) => Ok(tv),
            Evaluation::NotComputed { formula } => Err(FormulaError::NotComputed {
                formula: formula.name().to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// One completed evaluation, as seen by a [`FormulaObserver`].
#[derive(Debug, Clone, Copy)]
pub struct FormulaEvent<'a> {
    pub formula: Formula,
    pub inputs: &'a [SimpleTruthValue],
    pub output: &'a Evaluation,
}

/// Receives every evaluation an [`Evaluator`] performs.
pub trait FormulaObserver: Send + Sync {
    fn on_compute(&self, event: &FormulaEvent<'_>);
}

impl<F> FormulaObserver for F
where
    F: Fn(&FormulaEvent<'_>) + Send + Sync,
{
    fn on_compute(&self, event: &FormulaEvent<'_>) {
        self(event)
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Evaluates formulas against a configuration.
#[derive(Clone, Default)]
pub struct Evaluator {
    config: FormulaConfig,
    observer: Option<Arc<dyn FormulaObserver>>,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Evaluator {
    pub fn new(config: FormulaConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Attach an observer notified after every evaluation.
    pub fn with_observer(mut self, observer: Arc<dyn FormulaObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &FormulaConfig {
        &self.config
    }

    /// Evaluate `formula` over `tvs`.
    ///
    /// Composite inputs contribute their primary component; composites with
    /// versioned (context-bound) entries are rejected.
    pub fn compute(&self, formula: Formula, tvs: &[TruthValue]) -> FormulaResult<Evaluation> {
        let contexts: BTreeSet<_> = tvs.iter().flat_map(TruthValue::version_handles).collect();
        if !contexts.is_empty() {
            return Err(FormulaError::VersionedInput {
                formula: formula.name().to_string(),
                contexts: contexts.len(),
            });
        }
        let primaries: Vec<SimpleTruthValue> = tvs.iter().map(TruthValue::primary).collect();
        self.compute_simple(formula, &primaries)
    }

    /// Evaluate `formula` over simple truth values.
    pub fn compute_simple(
        &self,
        formula: Formula,
        tvs: &[SimpleTruthValue],
    ) -> FormulaResult<Evaluation> {
        if !formula.arity().accepts(tvs.len()) {
            return Err(formula.arity_error(tvs.len()));
        }
        let output = formula
            .evaluate(&self.config, tvs)
            .ok_or_else(|| formula.arity_error(tvs.len()))?;

        match output {
            Evaluation::Value(tv) => {
                if !(0.0..=1.0).contains(&tv.strength) {
                    tracing::debug!(%formula, strength = tv.strength, "strength outside [0, 1]");
                }
                tracing::trace!(%formula, inputs = tvs.len(), result = %tv, "formula evaluated");
            }
            Evaluation::NotComputed { .. } => {
                tracing::trace!(%formula, inputs = tvs.len(), "formula not computed");
            }
        }
        if let Some(observer) = &self.observer {
            observer.on_compute(&FormulaEvent {
                formula,
                inputs: tvs,
                output: &output,
            });
        }
        Ok(output)
    }

    /// Apply a fixed-arity formula to consecutive groups of `tvs`.
    pub fn multi_compute(
        &self,
        formula: Formula,
        tvs: &[TruthValue],
    ) -> FormulaResult<Vec<Evaluation>> {
        let group = match formula.arity() {
            Arity::Exactly(k) => k,
            arity => {
                return Err(FormulaError::Arity {
                    formula: formula.name().to_string(),
                    expected: format!("a fixed arity (has {arity})"),
                    actual: tvs.len(),
                });
            }
        };
        if tvs.is_empty() || tvs.len() % group != 0 {
            return Err(FormulaError::GroupSize {
                formula: formula.name().to_string(),
                arity: group,
                actual: tvs.len(),
            });
        }
        tvs.chunks(group)
            .map(|chunk| self.compute(formula, chunk))
            .collect()
    }
}
