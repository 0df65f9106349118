//! Initial beliefs for new items and judges.

use judge_core::model::Priors;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_mu() -> f64 {
    0.0
}

const fn default_sigma_sq() -> f64 {
    1.0
}

const fn default_alpha() -> f64 {
    10.0
}

const fn default_beta() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriorsConfig {
    /// Skill mean of a new item.
    #[serde(default = "default_mu")]
    pub mu: f64,

    /// Skill variance of a new item.
    #[serde(default = "default_sigma_sq")]
    pub sigma_sq: f64,

    /// Reliability shape parameters of a new judge. The default
    /// `Beta(10, 1)` assumes judges are mostly attentive.
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_beta")]
    pub beta: f64,
}

impl Default for PriorsConfig {
    fn default() -> Self {
        Self {
            mu: default_mu(),
            sigma_sq: default_sigma_sq(),
            alpha: default_alpha(),
            beta: default_beta(),
        }
    }
}

impl PriorsConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a non-finite mean or a
    /// non-positive variance or shape parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.mu.is_finite() {
            return Err(ConfigError::invalid("priors.mu", "must be finite"));
        }
        for (field, value) in [
            ("priors.sigma_sq", self.sigma_sq),
            ("priors.alpha", self.alpha),
            ("priors.beta", self.beta),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{value} must be a positive number"),
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn priors(&self) -> Priors {
        Priors {
            mu: self.mu,
            sigma_sq: self.sigma_sq,
            alpha: self.alpha,
            beta: self.beta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_model_defaults() {
        let config = PriorsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.priors(), Priors::default());
    }

    #[test]
    fn rejects_non_positive_shape() {
        let config = PriorsConfig {
            beta: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "priors.beta"
        ));
    }
}
