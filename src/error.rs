//! Rich diagnostic error types for the inference core.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Contract violations (wrong truth-value
//! arity, versioned composite inputs, mismatched rule premises) surface here as
//! errors; recoverable outcomes such as a rule declining to fire or a grounding
//! that fails to instantiate are not errors at all.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the inference core.
#[derive(Debug, Error, Diagnostic)]
pub enum PlnError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Imply(#[from] ImplyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Formula errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum FormulaError {
    #[error("{formula} expects {expected} truth value(s), got {actual}")]
    #[diagnostic(
        code(pln::formula::arity),
        help(
            "Every formula documents the exact order and number of truth values it \
             consumes. Assemble the sequence in that order; only AND/OR/FORALL/EXISTS \
             style formulas accept a variable number of inputs."
        )
    )]
    Arity {
        formula: String,
        expected: String,
        actual: usize,
    },

    #[error("{formula} received a composite truth value with {contexts} versioned context(s)")]
    #[diagnostic(
        code(pln::formula::versioned_input),
        help(
            "Context-free formulas only accept the primary component of a composite \
             truth value. Strip the versioned entries, or evaluate each context separately."
        )
    )]
    VersionedInput { formula: String, contexts: usize },

    #[error("{formula} cannot be applied group-wise to {actual} truth values (group size {arity})")]
    #[diagnostic(
        code(pln::formula::group_size),
        help("multi_compute needs a non-empty sequence whose length is a multiple of the formula arity.")
    )]
    GroupSize {
        formula: String,
        arity: usize,
        actual: usize,
    },

    #[error("{formula} does not produce a truth value")]
    #[diagnostic(
        code(pln::formula::not_computed),
        help(
            "This formula is an unfinished variant and always reports NotComputed. \
             Use the simple deduction formula instead."
        )
    )]
    NotComputed { formula: String },

    #[error("unknown formula: {name}")]
    #[diagnostic(
        code(pln::formula::unknown),
        help("Use one of the names listed by `Formula::ALL` (e.g. `deduction`, `revision`, `or`).")
    )]
    UnknownFormula { name: String },

    #[error("cannot parse truth value {input:?}: {reason}")]
    #[diagnostic(
        code(pln::formula::parse_tv),
        help("Truth values are written as `strength:count`, e.g. `0.8:12`.")
    )]
    ParseTruthValue { input: String, reason: String },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("invalid handle: {handle}")]
    #[diagnostic(
        code(pln::store::invalid_handle),
        help("The handle does not refer to a live atom in this store.")
    )]
    InvalidHandle { handle: u64 },

    #[error("{atom_type} is not a link type")]
    #[diagnostic(
        code(pln::store::not_a_link),
        help("Links must be created with a type that inherits from `Link`.")
    )]
    NotALinkType { atom_type: String },

    #[error("{atom_type} is not a node type")]
    #[diagnostic(
        code(pln::store::not_a_node),
        help("Nodes must be created with a type that inherits from `Node`.")
    )]
    NotANodeType { atom_type: String },

    #[error("handle space exhausted")]
    #[diagnostic(
        code(pln::store::exhausted),
        help("The store allocated 2^64 - 1 atoms. Something is allocating in a loop.")
    )]
    Exhausted,
}

// ---------------------------------------------------------------------------
// Implication (bind-pattern query) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ImplyError {
    #[error("malformed bind link {handle}: {reason}")]
    #[diagnostic(
        code(pln::imply::malformed_bindlink),
        help(
            "A bind link has the shape BindLink(<variables>, ImplicationLink(<pattern>, <implicand>)). \
             Variables are VariableNodes, TypedVariableLinks or a VariableList of those."
        )
    )]
    MalformedBindLink { handle: u64, reason: String },

    #[error("unknown atom type name: {name}")]
    #[diagnostic(
        code(pln::imply::unknown_type),
        help("TypeNode names must match an atom type, e.g. `ConceptNode` or `InheritanceLink`.")
    )]
    UnknownType { name: String },

    #[error("pattern is not connected: {components} disjoint clause groups")]
    #[diagnostic(
        code(pln::imply::disconnected),
        help(
            "Every clause should share a variable with another clause, otherwise the \
             search explores a cartesian product. Use the pln variant to skip this check."
        )
    )]
    DisconnectedPattern { components: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Rule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("{rule} expects {expected} premise(s), got {actual}")]
    #[diagnostic(
        code(pln::rule::premise_count),
        help("Validate premises with `Rule::validate` before extracting truth values.")
    )]
    PremiseCount {
        rule: String,
        expected: usize,
        actual: usize,
    },

    #[error("{rule}: premise {handle} does not have the expected shape ({reason})")]
    #[diagnostic(
        code(pln::rule::malformed_premise),
        help("Premises must match the rule's input filter. Check them with `Rule::matches_filter`.")
    )]
    MalformedPremise {
        rule: String,
        handle: u64,
        reason: String,
    },

    #[error("{rule}: shared endpoint mismatch, {left} is not {right}")]
    #[diagnostic(
        code(pln::rule::shared_endpoint),
        help(
            "The intermediate term of chained premises must be the same atom \
             (e.g. the second argument of A->B is the first argument of B->C). \
             The caller is responsible for pairing premises correctly."
        )
    )]
    SharedEndpointMismatch { rule: String, left: u64, right: u64 },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    #[diagnostic(
        code(pln::config::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {message}")]
    #[diagnostic(
        code(pln::config::parse),
        help("The configuration is TOML with optional [formulas] and [rules] tables.")
    )]
    Parse { message: String },

    #[error("config serialization error: {message}")]
    #[diagnostic(code(pln::config::serialize))]
    Serialize { message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(pln::config::invalid),
        help("Floors must be strictly positive and discount factors non-negative.")
    )]
    Invalid { message: String },
}

/// Convenience alias for functions returning inference-core results.
pub type PlnResult<T> = std::result::Result<T, PlnError>;
