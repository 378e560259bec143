// ============================================================================
// Final Distribution Validation
// ============================================================================
//
// Contract: a distribution handed to the selector has at least one entry,
// every entry inside [min_probability, max_probability] and a sum of 1.0
// within sum_epsilon.
//
// Checked after normalization and on the fallback path, before any draw.

use serde::{Deserialize, Serialize};

use crate::config::limits::ProbabilityBounds;
use crate::tendency::ProbabilityDistribution;

/// Slack on the per-entry bounds for float rounding after rescaling
const BOUND_SLACK: f64 = 1e-12;

/// Probability distribution validator
///
/// Validates that probability distributions sum to 1.0 within a tolerance
/// and that every probability lies inside the configured bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityValidator {
    /// Tolerance for deviation from 1.0
    tolerance: f64,
    min: f64,
    max: f64,
}

impl ProbabilityValidator {
    /// Validator for the default bounds (0.01..=0.95, tolerance 1e-6)
    pub fn new() -> Self {
        Self::from_bounds(&ProbabilityBounds::default())
    }

    pub fn from_bounds(bounds: &ProbabilityBounds) -> Self {
        Self { tolerance: bounds.sum_epsilon, min: bounds.min_probability, max: bounds.max_probability }
    }

    /// Validate a probability distribution
    ///
    /// # Validation Rules
    /// 1. Distribution must not be empty
    /// 2. All probabilities must be finite and inside the bounds
    /// 3. Sum must be within tolerance of 1.0
    ///
    /// # Examples
    /// ```
    /// use play_core::engine::probability_validator::ProbabilityValidator;
    ///
    /// let validator = ProbabilityValidator::new();
    ///
    /// assert!(validator.validate_distribution(&[0.45, 0.55]).is_ok());
    ///
    /// // Invalid: sum != 1.0
    /// assert!(validator.validate_distribution(&[0.45, 0.60]).is_err());
    ///
    /// // Invalid: below the minimum
    /// assert!(validator.validate_distribution(&[0.005, 0.995]).is_err());
    /// ```
    pub fn validate_distribution(&self, probabilities: &[f64]) -> Result<(), String> {
        if probabilities.is_empty() {
            return Err("Empty probability distribution".to_string());
        }

        if let Some(bad) = probabilities.iter().find(|p| !p.is_finite()) {
            return Err(format!("Non-finite probability: {}", bad));
        }

        if let Some(out) = probabilities
            .iter()
            .find(|&&p| p < self.min - BOUND_SLACK || p > self.max + BOUND_SLACK)
        {
            return Err(format!(
                "Probability {} outside bounds [{}, {}]",
                out, self.min, self.max
            ));
        }

        let sum: f64 = probabilities.iter().sum();
        let deviation = (sum - 1.0).abs();

        if deviation > self.tolerance {
            return Err(format!(
                "Probability sum {:.6} deviates from 1.0 by {:.6} (tolerance: {:.6})",
                sum, deviation, self.tolerance
            ));
        }

        Ok(())
    }

    pub fn validate(&self, distribution: &ProbabilityDistribution) -> Result<(), String> {
        let values: Vec<f64> = distribution.iter().map(|(_, v)| v).collect();
        self.validate_distribution(&values)
    }

    /// Get the current tolerance value
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for ProbabilityValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tendency::PlayType;

    #[test]
    fn test_valid_distribution() {
        let validator = ProbabilityValidator::new();

        assert!(validator.validate_distribution(&[0.45, 0.55]).is_ok());
        assert!(validator.validate_distribution(&[0.25, 0.25, 0.25, 0.25]).is_ok());

        // Both bounds are inclusive
        assert!(validator.validate_distribution(&[0.01, 0.04, 0.95]).is_ok());
    }

    #[test]
    fn test_distribution_sum_not_one() {
        let validator = ProbabilityValidator::new();

        let result = validator.validate_distribution(&[0.45, 0.60]);
        let err_msg = result.unwrap_err();
        assert!(err_msg.contains("deviates from 1.0"));
        assert!(err_msg.contains("1.05"));
    }

    #[test]
    fn test_out_of_bounds() {
        let validator = ProbabilityValidator::new();

        let err_msg = validator.validate_distribution(&[0.005, 0.995]).unwrap_err();
        assert!(err_msg.contains("outside bounds"));
        assert!(validator.validate_distribution(&[0.96, 0.04]).is_err());
    }

    #[test]
    fn test_empty_and_non_finite() {
        let validator = ProbabilityValidator::new();

        assert!(validator.validate_distribution(&[]).unwrap_err().contains("Empty"));
        assert!(validator.validate_distribution(&[f64::NAN, 0.5]).unwrap_err().contains("Non-finite"));
    }

    #[test]
    fn test_custom_bounds() {
        let bounds = ProbabilityBounds { min_probability: 0.03, max_probability: 0.90, sum_epsilon: 1e-3 };
        let validator = ProbabilityValidator::from_bounds(&bounds);
        assert_eq!(validator.tolerance(), 1e-3);

        assert!(validator.validate_distribution(&[0.02, 0.98]).is_err());
        // sum = 0.9995, inside the looser tolerance
        assert!(validator.validate_distribution(&[0.4995, 0.5]).is_ok());
    }

    #[test]
    fn test_validate_map() {
        let validator = ProbabilityValidator::new();
        let dist = ProbabilityDistribution::from_entries([(PlayType::Run, 0.3), (PlayType::FieldGoal, 0.7)]);
        assert!(validator.validate(&dist).is_ok());
        assert!(validator.validate(&ProbabilityDistribution::new()).is_err());
    }
}
