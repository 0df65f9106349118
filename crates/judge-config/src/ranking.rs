//! Candidate selection knobs.

use chrono::Duration;
use judge_core::model::RankingParams;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default exploration probability.
const fn default_epsilon() -> f64 {
    0.25
}

/// Default busy window in minutes.
const fn default_timeout_minutes() -> f64 {
    5.0
}

/// Default number of views before an item stops being preferred.
const fn default_min_views() -> usize {
    2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankingConfig {
    /// Probability of a uniform pick instead of the most informative one.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// How long an assignment keeps its item busy for other judges.
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: f64,

    /// Items seen by fewer judges than this are preferred.
    #[serde(default = "default_min_views")]
    pub min_views: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            timeout_minutes: default_timeout_minutes(),
            min_views: default_min_views(),
        }
    }
}

impl RankingConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `epsilon` is outside `[0, 1]` or
    /// the timeout is not a positive number of minutes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::invalid(
                "ranking.epsilon",
                format!("{} is not within [0, 1]", self.epsilon),
            ));
        }
        if !(self.timeout_minutes.is_finite() && self.timeout_minutes > 0.0) {
            return Err(ConfigError::invalid(
                "ranking.timeout_minutes",
                format!("{} must be a positive number", self.timeout_minutes),
            ));
        }
        Ok(())
    }

    /// Runtime parameters for the assignment planner.
    #[must_use]
    pub fn params(&self) -> RankingParams {
        #[allow(clippy::cast_possible_truncation)]
        let timeout = Duration::milliseconds((self.timeout_minutes * 60_000.0).round() as i64);
        RankingParams {
            epsilon: self.epsilon,
            timeout,
            min_views: self.min_views,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_planner_defaults() {
        let config = RankingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.params(), RankingParams::default());
    }

    #[test]
    fn fractional_timeout_converts() {
        let config = RankingConfig {
            timeout_minutes: 0.5,
            ..Default::default()
        };
        assert_eq!(config.params().timeout, Duration::seconds(30));
    }

    #[test]
    fn rejects_out_of_range() {
        let config = RankingConfig {
            epsilon: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "ranking.epsilon"
        ));

        let config = RankingConfig {
            timeout_minutes: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
