//! Joint skill/reliability update for one observed comparison.
//!
//! The exact posterior after observing "winner beats loser" is a two-part
//! mixture: the judge was attentive (probit likelihood on the skill
//! difference, reliability pseudo-count on `alpha`) or answered at random
//! (skills untouched, pseudo-count on `beta`). Both parts are weighted by the
//! same responsibilities, and each family is projected back onto itself by
//! matching first and second moments.

use serde::{Deserialize, Serialize};

use super::{
    KAPPA, MAX_SHAPE, MIN_SHAPE, MIN_SIGMA_SQ, Reliability, SkillBelief, inverse_mills, normal_cdf,
};
use crate::errors::CoreError;

/// Updated beliefs after one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub reliability: Reliability,
    pub winner: SkillBelief,
    pub loser: SkillBelief,
}

/// Apply one observed outcome.
///
/// # Errors
///
/// Returns `CoreError::InvalidBelief` if any input variance or shape
/// parameter is non-positive or non-finite. Outputs are always valid.
pub fn update(
    reliability: Reliability,
    winner: SkillBelief,
    loser: SkillBelief,
) -> Result<UpdateResult, CoreError> {
    let reliability = reliability.validate()?;
    let winner = winner.validate("winner")?;
    let loser = loser.validate("loser")?;
    Ok(Step::compute(reliability, winner, loser).apply())
}

/// Intermediate quantities shared by the skill and reliability projections.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    reliability: Reliability,
    winner: SkillBelief,
    loser: SkillBelief,
    /// Predictive probability of the observed ordering.
    pub(crate) outcome_prob: f64,
    /// Posterior responsibility of the "attentive" component.
    attentive: f64,
    diff_mean: f64,
    diff_var: f64,
    post_diff_mean: f64,
    post_diff_var: f64,
}

impl Step {
    /// Inputs must already be validated.
    pub(crate) fn compute(reliability: Reliability, winner: SkillBelief, loser: SkillBelief) -> Self {
        let diff_mean = winner.mu - loser.mu;
        let diff_var = winner.sigma_sq + loser.sigma_sq;
        let scale = (1.0 + diff_var).sqrt();
        let z = diff_mean / scale;

        let attentive_prior = reliability.mean();
        let agree = attentive_prior * normal_cdf(z);
        let random = (1.0 - attentive_prior) * 0.5;
        let outcome_prob = (agree + random).max(f64::MIN_POSITIVE);
        let attentive = (agree / outcome_prob).clamp(0.0, 1.0);

        // Attentive component: N(d) * Phi(d), truncated-probit moments.
        let lambda = inverse_mills(z);
        let shift = diff_var / scale * lambda;
        let attentive_var =
            diff_var - diff_var * diff_var / (1.0 + diff_var) * lambda * (lambda + z);

        // Mixture with the untouched random component N(m, v).
        let post_diff_mean = diff_mean + attentive * shift;
        let post_diff_var = attentive * attentive_var
            + (1.0 - attentive) * diff_var
            + attentive * (1.0 - attentive) * shift * shift;

        Self {
            reliability,
            winner,
            loser,
            outcome_prob,
            attentive,
            diff_mean,
            diff_var,
            post_diff_mean,
            post_diff_var: post_diff_var.clamp(0.0, diff_var),
        }
    }

    pub(crate) fn apply(&self) -> UpdateResult {
        let delta = self.post_diff_mean - self.diff_mean;
        let retained = self.post_diff_var / self.diff_var;

        let winner_share = self.winner.sigma_sq / self.diff_var;
        let loser_share = self.loser.sigma_sq / self.diff_var;

        UpdateResult {
            reliability: self.updated_reliability(),
            winner: SkillBelief {
                mu: self.winner.mu + winner_share * delta,
                sigma_sq: shrink(self.winner.sigma_sq, winner_share, retained),
            },
            loser: SkillBelief {
                mu: self.loser.mu - loser_share * delta,
                sigma_sq: shrink(self.loser.sigma_sq, loser_share, retained),
            },
        }
    }

    /// Moment-match `a * Beta(alpha + 1, beta) + (1 - a) * Beta(alpha, beta + 1)`.
    fn updated_reliability(&self) -> Reliability {
        let Reliability { alpha, beta } = self.reliability;
        let a = self.attentive;
        let n = alpha + beta;

        let mean = (alpha + a) / (n + 1.0);
        let second = (alpha + 1.0) * (alpha + 2.0 * a) / ((n + 1.0) * (n + 2.0));
        let variance = second - mean * mean;

        let (alpha, beta) = if variance > 0.0 && variance.is_finite() {
            let concentration = (mean - second) / variance;
            (mean * concentration, (1.0 - mean) * concentration)
        } else {
            (alpha + a, beta + (1.0 - a))
        };

        Reliability {
            alpha: clamp_shape(alpha),
            beta: clamp_shape(beta),
        }
    }
}

/// Shrink an item variance by its share of the information gained on the
/// difference. The factor never exceeds 1.
fn shrink(sigma_sq: f64, share: f64, retained: f64) -> f64 {
    let factor = (1.0 - share * (1.0 - retained)).clamp(KAPPA, 1.0);
    (sigma_sq * factor).max(MIN_SIGMA_SQ.min(sigma_sq))
}

fn clamp_shape(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(MIN_SHAPE, MAX_SHAPE)
    } else {
        MAX_SHAPE
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn unit() -> SkillBelief {
        SkillBelief::new(0.0, 1.0)
    }

    #[rstest]
    #[case(1.0, 1.0)]
    #[case(10.0, 1.0)]
    #[case(1.0, 10.0)]
    #[case(0.5, 0.5)]
    fn symmetric_case_separates_means(#[case] alpha: f64, #[case] beta: f64) {
        let result = update(Reliability::new(alpha, beta), unit(), unit()).unwrap();
        assert!(result.winner.mu > result.loser.mu);
        assert!(result.winner.mu > 0.0);
        assert!(result.loser.mu < 0.0);
        assert!(result.winner.sigma_sq < 1.0);
        assert!(result.loser.sigma_sq < 1.0);
    }

    #[test]
    fn uniform_reliability_still_informs_skills() {
        let result = update(Reliability::new(1.0, 1.0), unit(), unit()).unwrap();
        assert!(result.winner.mu > 0.0);
        assert!(result.winner.sigma_sq < 1.0);
        // Even outcome under a flat prior says nothing about attentiveness.
        assert!((result.reliability.mean() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn agreeing_outcome_raises_reliability() {
        let prior = Reliability::new(5.0, 5.0);
        let strong = SkillBelief::new(2.0, 0.5);
        let weak = SkillBelief::new(-2.0, 0.5);

        let agree = update(prior, strong, weak).unwrap();
        assert!(agree.reliability.mean() > prior.mean());

        let disagree = update(prior, weak, strong).unwrap();
        assert!(disagree.reliability.mean() < prior.mean());
    }

    #[test]
    fn upset_moves_means_further_than_expected_result() {
        let prior = Reliability::new(10.0, 1.0);
        let strong = SkillBelief::new(1.0, 1.0);
        let weak = SkillBelief::new(-1.0, 1.0);

        let expected = update(prior, strong, weak).unwrap();
        let upset = update(prior, weak, strong).unwrap();
        assert!((upset.winner.mu - weak.mu) > (expected.winner.mu - strong.mu));
    }

    #[test]
    fn larger_variance_item_moves_more() {
        let result = update(
            Reliability::new(10.0, 1.0),
            SkillBelief::new(0.0, 2.0),
            SkillBelief::new(0.0, 0.5),
        )
        .unwrap();
        assert!(result.winner.mu.abs() > result.loser.mu.abs());
    }

    #[test]
    fn deterministic() {
        let rel = Reliability::new(3.0, 2.0);
        let a = update(rel, SkillBelief::new(0.3, 0.7), SkillBelief::new(-0.1, 1.2)).unwrap();
        let b = update(rel, SkillBelief::new(0.3, 0.7), SkillBelief::new(-0.1, 1.2)).unwrap();
        assert_eq!(a, b);
    }

    #[rstest]
    #[case(0.0, 1.0, 1.0)]
    #[case(1.0, 1.0, 0.0)]
    #[case(1.0, -2.0, 1.0)]
    #[case(f64::NAN, 1.0, 1.0)]
    fn rejects_invalid_inputs(#[case] alpha: f64, #[case] beta: f64, #[case] sigma_sq: f64) {
        let result = update(
            Reliability::new(alpha, beta),
            SkillBelief::new(0.0, sigma_sq),
            unit(),
        );
        assert!(matches!(result, Err(CoreError::InvalidBelief { .. })));
    }

    #[test]
    fn extreme_upset_stays_finite() {
        let result = update(
            Reliability::new(1e6, 1e-3),
            SkillBelief::new(-60.0, 1e-3),
            SkillBelief::new(60.0, 1e-3),
        )
        .unwrap();
        assert!(result.winner.mu.is_finite());
        assert!(result.loser.mu.is_finite());
        assert!(result.reliability.alpha > 0.0 && result.reliability.beta > 0.0);
    }

    fn shape() -> impl Strategy<Value = f64> {
        1e-3..1e4_f64
    }

    fn mean() -> impl Strategy<Value = f64> {
        -20.0..20.0_f64
    }

    fn variance() -> impl Strategy<Value = f64> {
        1e-6..50.0_f64
    }

    proptest! {
        #[test]
        fn outputs_stay_positive_and_variance_never_grows(
            alpha in shape(), beta in shape(),
            mw in mean(), vw in variance(),
            ml in mean(), vl in variance(),
        ) {
            let result = update(
                Reliability::new(alpha, beta),
                SkillBelief::new(mw, vw),
                SkillBelief::new(ml, vl),
            ).unwrap();

            prop_assert!(result.reliability.alpha > 0.0 && result.reliability.alpha.is_finite());
            prop_assert!(result.reliability.beta > 0.0 && result.reliability.beta.is_finite());
            prop_assert!(result.winner.sigma_sq > 0.0);
            prop_assert!(result.loser.sigma_sq > 0.0);
            prop_assert!(result.winner.sigma_sq <= vw);
            prop_assert!(result.loser.sigma_sq <= vl);
            prop_assert!(result.winner.mu >= mw);
            prop_assert!(result.loser.mu <= ml);
        }

        #[test]
        fn repeated_updates_stay_valid(outcomes in proptest::collection::vec(any::<bool>(), 1..200)) {
            let mut rel = Reliability::new(10.0, 1.0);
            let mut a = SkillBelief::new(0.0, 1.0);
            let mut b = SkillBelief::new(0.0, 1.0);
            for a_wins in outcomes {
                if a_wins {
                    let r = update(rel, a, b).unwrap();
                    rel = r.reliability;
                    a = r.winner;
                    b = r.loser;
                } else {
                    let r = update(rel, b, a).unwrap();
                    rel = r.reliability;
                    b = r.winner;
                    a = r.loser;
                }
                prop_assert!(rel.validate().is_ok());
                prop_assert!(a.validate("a").is_ok());
                prop_assert!(b.validate("b").is_ok());
            }
        }
    }
}
