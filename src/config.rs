//! Configuration: formula constants and rule options.
//!
//! Every numeric constant of the truth-value algebra lives in
//! [`FormulaConfig`] with its documented default, so deployments can tune
//! discount factors without recompiling. Configuration is TOML:
//!
//! ```toml
//! [formulas]
//! independence_assumption_discount = 0.8
//!
//! [rules]
//! strict_argument_validity = true
//! ```
//!
//! Missing tables and keys fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Numeric constants of the truth-value algebra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaConfig {
    /// Floor for near-zero denominators (default: 1e-6).
    pub tv_min: f64,
    /// Floor used by the Bayesian inversion formula (default: 1e-5).
    pub inversion_floor: f64,
    /// Weight `w1` of the direct term in simple deduction; `w2 = 2 - w1` (default: 1.0).
    pub deduction_term_weight: f64,
    /// Count discount compensating the independence assumption of deduction (default: 1.0).
    pub independence_assumption_discount: f64,
    /// Same discount for the geometric deduction variant (default: 1.0).
    pub independence_assumption_geometry_discount: f64,
    /// Strength dependency between revised sources (default: 0.0).
    pub revision_strength_dependency: f64,
    /// Count dependency between revised sources (default: 0.0).
    pub revision_count_dependency: f64,
    /// Stand-in for the unknown `P(B | not A)` in modus ponens (default: 0.1).
    pub default_node_probability: f64,
    /// Count discount applied by member-to-inheritance conversion (default: 1.0).
    pub membership_to_inheritance_count_discount: f64,
    /// Count discount applied by extension-to-intension conversion (default: 1.0).
    pub extension_to_intension_count_discount: f64,
    /// Count discount applied by intension-to-extension conversion (default: 1.0).
    pub intension_to_extension_count_discount: f64,
    /// Count scale of the excluding OR (default: 0.9).
    pub default_confidence_level: f64,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            tv_min: 1e-6,
            inversion_floor: 1e-5,
            deduction_term_weight: 1.0,
            independence_assumption_discount: 1.0,
            independence_assumption_geometry_discount: 1.0,
            revision_strength_dependency: 0.0,
            revision_count_dependency: 0.0,
            default_node_probability: 0.1,
            membership_to_inheritance_count_discount: 1.0,
            extension_to_intension_count_discount: 1.0,
            intension_to_extension_count_discount: 1.0,
            default_confidence_level: 0.9,
        }
    }
}

impl FormulaConfig {
    /// Check floors are strictly positive and factors are non-negative finite numbers.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [("tv_min", self.tv_min), ("inversion_floor", self.inversion_floor)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be > 0, got {value}"),
                });
            }
        }
        for (name, value) in [
            ("deduction_term_weight", self.deduction_term_weight),
            (
                "independence_assumption_discount",
                self.independence_assumption_discount,
            ),
            (
                "independence_assumption_geometry_discount",
                self.independence_assumption_geometry_discount,
            ),
            ("revision_strength_dependency", self.revision_strength_dependency),
            ("revision_count_dependency", self.revision_count_dependency),
            ("default_node_probability", self.default_node_probability),
            (
                "membership_to_inheritance_count_discount",
                self.membership_to_inheritance_count_discount,
            ),
            (
                "extension_to_intension_count_discount",
                self.extension_to_intension_count_discount,
            ),
            (
                "intension_to_extension_count_discount",
                self.intension_to_extension_count_discount,
            ),
            ("default_confidence_level", self.default_confidence_level),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    message: format!("{name} must be >= 0, got {value}"),
                });
            }
        }
        if self.deduction_term_weight > 2.0 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "deduction_term_weight must be <= 2, got {}",
                    self.deduction_term_weight
                ),
            });
        }
        Ok(())
    }
}

/// Options shared by all rule instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Check that chained premises share their intermediate atom
    /// (e.g. `A->B` and `B->C`) when extracting truth values (default: false).
    pub strict_argument_validity: bool,
}

/// Complete configuration of the inference core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlnConfig {
    pub formulas: FormulaConfig,
    pub rules: RuleConfig,
}

impl PlnConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: PlnConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.formulas.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })
    }
}
