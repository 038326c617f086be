//! Curve and bootstrap configuration.
//!
//! Every field has a default, so a configuration file only lists what it
//! changes:
//!
//! ```toml
//! kind = "HazardRate"
//! interpolation = "BackwardFlat"
//!
//! [bootstrap]
//! accuracy = 1e-10
//! ```

use serde::{Deserialize, Serialize};

use pillar_core::daycounts::DayCountConvention;
use pillar_math::interpolation::InterpolationMethod;
use pillar_math::solvers::SolverConfig;

use crate::error::{CurveError, CurveResult};
use crate::kind::CurveKind;

fn default_accuracy() -> f64 {
    1e-12
}

fn default_max_evaluations() -> u32 {
    100
}

fn default_bracket_widening() -> f64 {
    10.0
}

fn default_true() -> bool {
    true
}

/// Settings for one bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Largest acceptable `|implied - market|` for any helper.
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,

    /// Objective evaluations allowed per pillar solve.
    #[serde(default = "default_max_evaluations")]
    pub max_evaluations: u32,

    /// Factor applied to the search bracket on the retry after a failed pillar.
    #[serde(default = "default_bracket_widening")]
    pub bracket_widening: f64,

    /// Reprice every helper against the finished curve.
    #[serde(default = "default_true")]
    pub global_check: bool,

    /// Re-run the pass once, seeded from the first, if the global check fails.
    #[serde(default = "default_true")]
    pub global_retry: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            accuracy: default_accuracy(),
            max_evaluations: default_max_evaluations(),
            bracket_widening: default_bracket_widening(),
            global_check: true,
            global_retry: true,
        }
    }
}

impl BootstrapConfig {
    /// Sets the accuracy.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Sets the evaluation budget per pillar.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: u32) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Sets the bracket widening factor.
    #[must_use]
    pub fn with_bracket_widening(mut self, factor: f64) -> Self {
        self.bracket_widening = factor;
        self
    }

    /// Enables or disables the global repricing check.
    #[must_use]
    pub fn with_global_check(mut self, enabled: bool) -> Self {
        self.global_check = enabled;
        self
    }

    /// Enables or disables the seeded retry after a failed global check.
    #[must_use]
    pub fn with_global_retry(mut self, enabled: bool) -> Self {
        self.global_retry = enabled;
        self
    }

    /// Root finder settings for a single pillar.
    ///
    /// Pillars are solved ten times tighter than the global check demands.
    #[must_use]
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig::new(self.accuracy * 0.1, self.max_evaluations)
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> CurveResult<()> {
        if !(self.accuracy.is_finite() && self.accuracy > 0.0) {
            return Err(CurveError::invalid_config(format!(
                "accuracy must be positive, got {}",
                self.accuracy
            )));
        }
        if self.max_evaluations == 0 {
            return Err(CurveError::invalid_config("max_evaluations must be at least 1"));
        }
        if !(self.bracket_widening.is_finite() && self.bracket_widening >= 1.0) {
            return Err(CurveError::invalid_config(format!(
                "bracket_widening must be at least 1, got {}",
                self.bracket_widening
            )));
        }
        Ok(())
    }
}

/// Everything a [`PiecewiseCurve`](crate::PiecewiseCurve) needs besides its
/// reference date and helpers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PiecewiseCurveConfig {
    /// What the nodes hold.
    #[serde(default)]
    pub kind: CurveKind,

    /// Interpolation between nodes.
    #[serde(default)]
    pub interpolation: InterpolationMethod,

    /// Convention mapping dates to curve times.
    #[serde(default)]
    pub day_count: DayCountConvention,

    /// Default query policy beyond the last pillar.
    #[serde(default)]
    pub allow_extrapolation: bool,

    /// Bootstrap settings.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl PiecewiseCurveConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> CurveResult<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| CurveError::invalid_config(format!("TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(source: &str) -> CurveResult<Self> {
        let config: Self = serde_json::from_str(source)
            .map_err(|e| CurveError::invalid_config(format!("JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises to TOML.
    pub fn to_toml_string(&self) -> CurveResult<String> {
        toml::to_string(self).map_err(|e| CurveError::invalid_config(format!("TOML: {e}")))
    }

    /// Checks that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::InvalidConfig` for out-of-range bootstrap settings
    /// or an interpolation the curve kind cannot use.
    pub fn validate(&self) -> CurveResult<()> {
        self.bootstrap.validate()?;
        self.validate_interpolation()
    }

    /// Checks that `interpolation` can carry `kind` node values.
    pub fn validate_interpolation(&self) -> CurveResult<()> {
        if self.kind.supports(self.interpolation) {
            Ok(())
        } else {
            Err(CurveError::invalid_config(format!(
                "{} interpolation cannot carry {} nodes",
                self.interpolation, self.kind
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BootstrapConfig::default();
        assert_eq!(config.accuracy, 1e-12);
        assert_eq!(config.max_evaluations, 100);
        assert_eq!(config.bracket_widening, 10.0);
        assert!(config.global_check && config.global_retry);
        assert!((config.solver_config().tolerance - 1e-13).abs() < 1e-25);
    }

    #[test]
    fn test_partial_toml() {
        let config = PiecewiseCurveConfig::from_toml_str(
            r#"
            kind = "HazardRate"
            interpolation = "BackwardFlat"
            day_count = "Act360"

            [bootstrap]
            accuracy = 1e-10
            global_retry = false
            "#,
        )
        .unwrap();

        assert_eq!(config.kind, CurveKind::HazardRate);
        assert_eq!(config.interpolation, InterpolationMethod::BackwardFlat);
        assert_eq!(config.day_count, DayCountConvention::Act360);
        assert!(!config.allow_extrapolation);
        assert_eq!(config.bootstrap.accuracy, 1e-10);
        assert_eq!(config.bootstrap.max_evaluations, 100);
        assert!(!config.bootstrap.global_retry);
    }

    #[test]
    fn test_json_and_empty_documents() {
        let config = PiecewiseCurveConfig::from_json_str(r#"{"allow_extrapolation": true}"#).unwrap();
        assert!(config.allow_extrapolation);
        assert_eq!(config.interpolation, InterpolationMethod::LogLinear);

        assert_eq!(
            PiecewiseCurveConfig::from_toml_str("").unwrap(),
            PiecewiseCurveConfig::default()
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = PiecewiseCurveConfig::from_toml_str("[bootstrap]\naccuracy = -1.0\n");
        assert!(matches!(result, Err(CurveError::InvalidConfig { .. })));

        let result = PiecewiseCurveConfig::from_toml_str("[bootstrap]\nbracket_widening = 0.5\n");
        assert!(matches!(result, Err(CurveError::InvalidConfig { .. })));

        assert!(PiecewiseCurveConfig::from_toml_str("kind = \"Forward\"").is_err());

        // Hazard curves default to log-linear, which cannot take the 0.0 anchor
        let result = PiecewiseCurveConfig::from_toml_str("kind = \"HazardRate\"");
        assert!(matches!(result, Err(CurveError::InvalidConfig { .. })));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = PiecewiseCurveConfig {
            kind: CurveKind::SurvivalProbability,
            ..PiecewiseCurveConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(PiecewiseCurveConfig::from_toml_str(&text).unwrap(), config);
    }
}
