//! Fixed-arity truth-value formulas.
//!
//! Each function takes its inputs as separate, named parameters in the order
//! of the formula's contract: link truth values first, then node truth values.
//! Shapes used in the docs:
//!
//! - `Link`: `[AB]`
//! - `Atom2`: `[A, B]`
//! - `Link1Node2`: `[AB, A, B]`
//! - `Link2Node2`: `[AB, BA, A, B]`
//! - `Link2Node3`: `[AB, BC, A, B, C]`
//!
//! Denominators that may approach zero are floored with `FormulaConfig::tv_min`
//! (or `inversion_floor`), so finite inputs always give finite outputs.

use crate::config::FormulaConfig;
use crate::truth::{DEFAULT_K, SimpleTruthValue as Tv, Strength};

use super::{Evaluation, Formula};

/// Confidence of the substitution pattern used by [`inheritance_substitution`].
pub const SUBSTITUTION_PATTERN_CONFIDENCE: f64 = 0.75;

/// `[A]`: the input, unchanged.
pub fn identity(a: Tv) -> Tv {
    a
}

/// `[AB, A, B]`: Bayesian inversion, `P(A|B) = P(B|A) P(A) / P(B)`.
pub fn inversion(cfg: &FormulaConfig, ab: Tv, a: Tv, b: Tv) -> Tv {
    let s_ba = ab.strength * a.strength / b.strength.max(cfg.inversion_floor);
    let n_ba = ab.count * b.count / a.count.max(cfg.inversion_floor);
    Tv::new(s_ba, n_ba)
}

/// `[AB, A, B]`: propagate an implication onto its consequent.
///
/// Blends the evidence carried through `A -> B` with the prior of `B`
/// (standing in for `P(B | not A)`); when `B` alone has more evidence the
/// prior wins outright.
pub fn implication_breakdown(cfg: &FormulaConfig, ab: Tv, a: Tv, b: Tv) -> Tv {
    let mut n2 = ab.count.min(a.count);
    let mut s2 = if n2 + b.count > 0.0 {
        (ab.strength * a.strength * n2 + b.strength * (1.0 - a.strength) * b.count)
            / (n2 + b.count).max(cfg.tv_min)
    } else {
        b.strength
    };
    if n2 < b.count {
        s2 = b.strength;
        n2 = b.count;
    }
    Tv::new(s2, n2)
}

/// `[AB, A, B]`: `P(B|A)` from the joint `AB` and `A`; count passes through.
pub fn implication_construction(ab: Tv, a: Tv, _b: Tv) -> Tv {
    let s = if a.strength > 0.0 {
        ab.strength / a.strength
    } else {
        0.0
    };
    Tv::new(s, ab.count)
}

/// `[A, B]`: negation of the second argument.
pub fn not(_a: Tv, b: Tv) -> Tv {
    Tv::new(1.0 - b.strength, b.count)
}

/// `[A]`: unary negation.
pub fn negation(a: Tv) -> Tv {
    Tv::new(1.0 - a.strength, a.count)
}

/// `[AB, BC, A, B, C]`: deduction `A -> B, B -> C |- A -> C` under independence.
///
/// `nA` is clamped to `nAB` first. The conclusion carries no evidence when
/// nothing is known about the middle term (`nB = 0`).
pub fn deduction(cfg: &FormulaConfig, ab: Tv, bc: Tv, a: Tv, b: Tv, c: Tv) -> Tv {
    let n_a = a.count.min(ab.count);

    let w1 = cfg.deduction_term_weight;
    let w2 = 2.0 - w1;
    let s_ac = w1 * ab.strength * bc.strength
        + w2 * (1.0 - ab.strength) * (c.strength - b.strength * bc.strength)
            / (1.0 - b.strength).max(cfg.tv_min);

    let n_ac = if b.count > 0.0 {
        cfg.independence_assumption_discount * n_a * bc.count / b.count.max(cfg.tv_min)
    } else {
        0.0
    };
    Tv::new(s_ac, n_ac)
}

/// Distance-weighting term of the geometric deduction.
fn geometry_weight(cfg: &FormulaConfig, s_a: Strength, s_b: Strength, s_c: Strength, s_ab: Strength) -> Strength {
    let p1 = (s_a - s_b).abs() / (s_a + s_b).max(cfg.tv_min);
    let p2 = 1.0 - (1.0 + s_b - s_ab * s_a - s_c).min(s_a + s_b - s_ab * s_a) + s_b.max(1.0 - s_c);
    p1 + (1.0 - p1) * p2
}

/// `[AB, BC, A, B, C]`: geometric deduction.
///
/// The weighting scheme is unfinished: intermediates are computed and traced,
/// but the formula reports [`Evaluation::NotComputed`] instead of a value.
pub fn deduction_geometry(cfg: &FormulaConfig, ab: Tv, bc: Tv, a: Tv, b: Tv, c: Tv) -> Evaluation {
    let s_ba = inversion(cfg, ab, a, b).strength;
    let direct = ab.strength
        * bc.strength
        * (1.0
            + geometry_weight(cfg, a.strength, b.strength, c.strength, ab.strength)
                * (-1.0 + 1.0 / (s_ba + bc.strength).max(cfg.tv_min)).max(0.0));
    let complement = (1.0 - ab.strength)
        * (1.0 - bc.strength)
        * (1.0
            + geometry_weight(cfg, a.strength, 1.0 - b.strength, c.strength, ab.strength)
                * (-1.0 + 1.0 / (2.0 - s_ba - bc.strength).max(cfg.tv_min)).max(0.0));
    let n_ac = cfg.independence_assumption_geometry_discount * a.count * bc.count
        / b.count.max(cfg.tv_min);
    tracing::trace!(s_ac = direct + complement, n_ac, "geometric deduction intermediates");
    Evaluation::NotComputed {
        formula: Formula::DeductionGeometry,
    }
}

/// `[A, B]`: merge two estimates of the same fact, weighted by evidence.
///
/// With no evidence on either side both sources weigh one half.
pub fn revision(cfg: &FormulaConfig, a: Tv, b: Tv) -> Tv {
    let total = a.count + b.count;
    let (w_a, w_b) = if total > 0.0 {
        let denom = total.max(cfg.tv_min);
        (a.count / denom, b.count / denom)
    } else {
        (0.5, 0.5)
    };
    let s = w_a * a.strength + w_b * b.strength
        - cfg.revision_strength_dependency * a.strength * b.strength;
    let n = a.count.max(b.count) + cfg.revision_count_dependency * a.count.min(b.count);
    Tv::new(s, n)
}

/// `[AB, BA, A, B]`: inheritance to similarity.
///
/// The `sAB - 1` numerator is floored, so any strength below one yields the
/// floor scaled by `1 / (1 + sA / sB)`.
pub fn inh2sim(cfg: &FormulaConfig, ab: Tv, ba: Tv, a: Tv, b: Tv) -> Tv {
    let s = (ab.strength - 1.0).max(cfg.tv_min) / (1.0 + a.strength / b.strength.max(cfg.tv_min));
    let n = ab.count + ba.count - ab.strength * a.count;
    Tv::new(s, n)
}

/// `[AB, A, B]`: similarity to inheritance.
pub fn sim2inh(cfg: &FormulaConfig, ab: Tv, a: Tv, b: Tv) -> Tv {
    let s = (1.0 + b.strength / a.strength.max(cfg.tv_min)) * ab.strength
        / (1.0 + ab.strength.max(cfg.tv_min));
    let n = (ab.count + ab.strength * a.count) * a.count / (a.count + b.count).max(cfg.tv_min);
    Tv::new(s, n)
}

/// `[AB]`: unchanged; shared by the AND breakdown and the lossless kind conversions.
pub fn pass_through(ab: Tv) -> Tv {
    ab
}

/// `[AB]`: member to extensional inheritance, count discounted.
pub fn mem2inh(cfg: &FormulaConfig, ab: Tv) -> Tv {
    Tv::new(ab.strength, ab.count * cfg.membership_to_inheritance_count_discount)
}

/// `[AB]`: extensional to intensional, count discounted.
pub fn ext2int(cfg: &FormulaConfig, ab: Tv) -> Tv {
    Tv::new(ab.strength, ab.count * cfg.extension_to_intension_count_discount)
}

/// `[AB]`: intensional to extensional, count discounted.
pub fn int2ext(cfg: &FormulaConfig, ab: Tv) -> Tv {
    Tv::new(ab.strength, ab.count * cfg.intension_to_extension_count_discount)
}

/// `[A, AB]`: modus ponens, `P(B) = P(A) P(B|A) + P(B|not A) (1 - P(A))`.
pub fn modus_ponens(cfg: &FormulaConfig, a: Tv, ab: Tv) -> Tv {
    let s = a.strength * ab.strength + cfg.default_node_probability * (1.0 - a.strength);
    Tv::new(s, a.count)
}

/// `[A, B]`: substitute `B` for an instance of `A`; the count shrinks with `A`'s support.
pub fn inheritance_substitution(a: Tv, b: Tv) -> Tv {
    let d1 = a.count / (a.count + DEFAULT_K);
    let n = SUBSTITUTION_PATTERN_CONFIDENCE * b.count * d1 * a.strength;
    Tv::new(b.strength, n)
}

/// `[A, B]`: conjunction where `B` is evaluated given `A`.
pub fn asymmetric_and(a: Tv, b: Tv) -> Tv {
    Tv::new(a.strength * b.strength, b.count)
}

/// Shannon entropy (bits) of a Bernoulli variable; 0 outside `(0, 1)`.
pub fn binary_entropy(p: Strength) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
}

/// `[A, CX]`: specialize a context-free fact to a context.
///
/// Strength passes through; confidence deflates by `1 - H(sA) H(sCX)`.
pub fn context_free_to_sensitive(a: Tv, cx: Tv) -> Tv {
    let c = a.confidence()
        * cx.confidence()
        * (1.0 - binary_entropy(a.strength) * binary_entropy(cx.strength));
    Tv::from_confidence(a.strength, c)
}
