//! Bayesian belief model over item skill and judge reliability.
//!
//! Item skill is Gaussian `N(mu, sigma_sq)`. Judge reliability is
//! `Beta(alpha, beta)` over the probability that the judge is attentive: an
//! attentive judge orders a pair by a probit link on the skill difference, an
//! inattentive one answers uniformly at random.
//!
//! - [`update`] performs one joint approximate posterior update
//! - [`gain`] scores a prospective comparison without committing anything

pub mod gain;
pub mod update;

use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

use crate::errors::CoreError;

pub use gain::expected_information_gain;
pub use update::{UpdateResult, update};

/// Weight of the reliability divergence in the information gain.
pub const GAMMA: f64 = 0.1;

/// Smallest factor a single update may shrink a variance by.
pub const KAPPA: f64 = 1e-4;

/// Variance floor for item skill.
pub const MIN_SIGMA_SQ: f64 = 1e-12;

/// Shape parameter bounds for reliability beliefs.
pub const MIN_SHAPE: f64 = 1e-6;
pub const MAX_SHAPE: f64 = 1e12;

// ---------------------------------------------------------------------------
// Beliefs
// ---------------------------------------------------------------------------

/// Gaussian belief over an item's latent skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkillBelief {
    pub mu: f64,
    pub sigma_sq: f64,
}

impl SkillBelief {
    #[must_use]
    pub const fn new(mu: f64, sigma_sq: f64) -> Self {
        Self { mu, sigma_sq }
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidBelief` if `mu` is not finite or `sigma_sq`
    /// is not a finite positive number.
    pub fn validate(self, field: &'static str) -> Result<Self, CoreError> {
        if !self.mu.is_finite() {
            return Err(CoreError::InvalidBelief {
                field,
                value: self.mu,
            });
        }
        if !(self.sigma_sq.is_finite() && self.sigma_sq > 0.0) {
            return Err(CoreError::InvalidBelief {
                field,
                value: self.sigma_sq,
            });
        }
        Ok(self)
    }
}

/// Beta belief over a judge's attentiveness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Reliability {
    pub alpha: f64,
    pub beta: f64,
}

impl Reliability {
    #[must_use]
    pub const fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// Expected probability that the judge is attentive.
    #[must_use]
    pub fn mean(self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidBelief` if either shape parameter is not a
    /// finite positive number.
    pub fn validate(self) -> Result<Self, CoreError> {
        for (field, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CoreError::InvalidBelief { field, value });
            }
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Initial belief values for new items and judges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Priors {
    pub mu: f64,
    pub sigma_sq: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for Priors {
    fn default() -> Self {
        Self {
            mu: 0.0,
            sigma_sq: 1.0,
            alpha: 10.0,
            beta: 1.0,
        }
    }
}

impl Priors {
    #[must_use]
    pub const fn skill(&self) -> SkillBelief {
        SkillBelief::new(self.mu, self.sigma_sq)
    }

    #[must_use]
    pub const fn reliability(&self) -> Reliability {
        Reliability::new(self.alpha, self.beta)
    }
}

/// Selection and pool-filter knobs, passed explicitly into the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingParams {
    /// Probability of a uniform exploration pick when a reference exists.
    pub epsilon: f64,
    /// How long an unacted assignment keeps its item busy for other judges.
    pub timeout: Duration,
    /// Items seen by fewer judges than this are preferred.
    pub min_views: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            epsilon: 0.25,
            timeout: Duration::minutes(5),
            min_views: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Standard normal helpers
// ---------------------------------------------------------------------------

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

pub(crate) fn normal_pdf(z: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * z * z).exp()
}

pub(crate) fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}

/// `pdf(z) / cdf(z)`, with the asymptotic form once the CDF underflows.
pub(crate) fn inverse_mills(z: f64) -> f64 {
    let cdf = normal_cdf(z);
    if cdf > 1e-300 {
        normal_pdf(z) / cdf
    } else {
        -z - 1.0 / z
    }
}
