//! Uncertain truth values attached to atoms.
//!
//! A [`SimpleTruthValue`] is a `(strength, count)` pair: strength estimates the
//! probability of the proposition, count is the amount of evidence behind it.
//! Count converts to a bounded confidence in `[0, 1)` via `c = n / (n + K)`.
//! A [`CompositeTruthValue`] additionally carries per-context versions of the
//! same fact. Truth values are plain values: formulas return owned results and
//! the store replaces them wholesale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::atom::Handle;
use crate::error::FormulaError;

/// Estimated degree of truth, conventionally in `[0, 1]`.
pub type Strength = f64;
/// Non-negative evidence weight.
pub type Count = f64;
/// Bounded `[0, 1)` transform of [`Count`].
pub type Confidence = f64;

/// Evidence horizon `K` of the count/confidence conversion.
pub const DEFAULT_K: Count = 800.0;

/// Largest confidence accepted by [`confidence_to_count`]; keeps the result finite.
pub const MAX_CONFIDENCE: Confidence = 0.999_999_8;

/// Convert an evidence count into a confidence in `[0, 1)`.
pub fn count_to_confidence(count: Count) -> Confidence {
    let count = count.max(0.0);
    count / (count + DEFAULT_K)
}

/// Convert a confidence into an evidence count.
///
/// Confidence is clamped to `[0, MAX_CONFIDENCE]`, so a confidence of 1 maps to
/// the largest representable finite count rather than infinity.
pub fn confidence_to_count(confidence: Confidence) -> Count {
    let c = confidence.clamp(0.0, MAX_CONFIDENCE);
    DEFAULT_K * c / (1.0 - c)
}

/// A `(strength, count)` truth value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimpleTruthValue {
    pub strength: Strength,
    pub count: Count,
}

impl SimpleTruthValue {
    /// Create a truth value from strength and count.
    pub const fn new(strength: Strength, count: Count) -> Self {
        Self { strength, count }
    }

    /// Create a truth value from strength and confidence.
    pub fn from_confidence(strength: Strength, confidence: Confidence) -> Self {
        Self::new(strength, confidence_to_count(confidence))
    }

    /// Crisp true with maximal confidence.
    pub fn true_certain() -> Self {
        Self::from_confidence(1.0, 1.0)
    }

    /// The default value of a freshly created atom: false, no evidence.
    pub const fn unknown() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn confidence(&self) -> Confidence {
        count_to_confidence(self.count)
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.strength.is_finite() && self.count.is_finite()
    }

    /// Approximate equality: strength within `epsilon`, count within a relative `epsilon`.
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.strength - other.strength).abs() <= epsilon
            && (self.count - other.count).abs() <= epsilon * self.count.abs().max(1.0)
    }
}

impl std::fmt::Display for SimpleTruthValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(stv {:.6} {:.6} n={:.4})",
            self.strength,
            self.confidence(),
            self.count
        )
    }
}

impl std::str::FromStr for SimpleTruthValue {
    type Err = FormulaError;

    /// Parse `strength:count`, e.g. `0.8:12`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason: &str| FormulaError::ParseTruthValue {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let (strength, count) = s.split_once(':').ok_or_else(|| err("missing ':'"))?;
        let strength: Strength = strength
            .trim()
            .parse()
            .map_err(|_| err("strength is not a number"))?;
        let count: Count = count.trim().parse().map_err(|_| err("count is not a number"))?;
        if !strength.is_finite() || !count.is_finite() || count < 0.0 {
            return Err(err("expected finite values and a non-negative count"));
        }
        Ok(Self::new(strength, count))
    }
}

/// Kind of context a versioned truth value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndicatorKind {
    Contextual,
    Hypothetical,
}

/// Identifies one context of a [`CompositeTruthValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionHandle {
    pub indicator: IndicatorKind,
    /// The atom standing for the context or hypothesis.
    pub substantive: Handle,
}

/// A truth value holding a primary (context-free) value plus per-context versions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositeTruthValue {
    pub primary: SimpleTruthValue,
    pub versioned: BTreeMap<VersionHandle, SimpleTruthValue>,
}

impl CompositeTruthValue {
    pub fn new(primary: SimpleTruthValue) -> Self {
        Self {
            primary,
            versioned: BTreeMap::new(),
        }
    }

    /// Attach the value the fact holds with under `version`.
    pub fn with_version(mut self, version: VersionHandle, tv: SimpleTruthValue) -> Self {
        self.versioned.insert(version, tv);
        self
    }

    pub fn version(&self, version: &VersionHandle) -> Option<&SimpleTruthValue> {
        self.versioned.get(version)
    }
}

/// Any truth value an atom can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TruthValue {
    Simple(SimpleTruthValue),
    Composite(CompositeTruthValue),
}

impl TruthValue {
    pub fn simple(strength: Strength, count: Count) -> Self {
        TruthValue::Simple(SimpleTruthValue::new(strength, count))
    }

    /// The context-free component.
    pub fn primary(&self) -> SimpleTruthValue {
        match self {
            TruthValue::Simple(tv) => *tv,
            TruthValue::Composite(ctv) => ctv.primary,
        }
    }

    /// Versioned contexts carried by this value (empty for simple values).
    pub fn version_handles(&self) -> impl Iterator<Item = &VersionHandle> {
        let versions = match self {
            TruthValue::Simple(_) => None,
            TruthValue::Composite(ctv) => Some(ctv.versioned.keys()),
        };
        versions.into_iter().flatten()
    }

    pub fn strength(&self) -> Strength {
        self.primary().strength
    }

    pub fn count(&self) -> Count {
        self.primary().count
    }

    pub fn confidence(&self) -> Confidence {
        self.primary().confidence()
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        TruthValue::Simple(SimpleTruthValue::unknown())
    }
}

impl From<SimpleTruthValue> for TruthValue {
    fn from(tv: SimpleTruthValue) -> Self {
        TruthValue::Simple(tv)
    }
}

impl From<CompositeTruthValue> for TruthValue {
    fn from(ctv: CompositeTruthValue) -> Self {
        TruthValue::Composite(ctv)
    }
}
