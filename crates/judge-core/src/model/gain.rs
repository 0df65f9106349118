//! Expected information gain of a prospective comparison.

use statrs::function::gamma::{digamma, ln_gamma};

use super::update::Step;
use super::{GAMMA, Reliability, SkillBelief};
use crate::errors::CoreError;

/// Score comparing `candidate` against `reference` for a judge with the
/// given reliability belief.
///
/// Both outcomes are enumerated and weighted by their predictive
/// probability. Each contributes the divergence of the updated beliefs from
/// the current ones: the two skill beliefs plus `GAMMA` times the
/// reliability belief. The result is finite and non-negative.
///
/// # Errors
///
/// Returns `CoreError::InvalidBelief` for out-of-domain inputs.
pub fn expected_information_gain(
    reliability: Reliability,
    reference: SkillBelief,
    candidate: SkillBelief,
) -> Result<f64, CoreError> {
    let reliability = reliability.validate()?;
    let reference = reference.validate("reference")?;
    let candidate = candidate.validate("candidate")?;

    let reference_wins = Step::compute(reliability, reference, candidate);
    let candidate_wins = Step::compute(reliability, candidate, reference);

    let mut total = 0.0;
    for (step, reference_is_winner) in [(reference_wins, true), (candidate_wins, false)] {
        let result = step.apply();
        let (new_reference, new_candidate) = if reference_is_winner {
            (result.winner, result.loser)
        } else {
            (result.loser, result.winner)
        };
        let divergence = kl_gaussian(new_reference, reference)
            + kl_gaussian(new_candidate, candidate)
            + GAMMA * kl_beta(result.reliability, reliability);
        total += step.outcome_prob * divergence;
    }

    if total.is_finite() {
        Ok(total.max(0.0))
    } else {
        Ok(0.0)
    }
}

/// `KL(posterior || prior)` between two univariate Gaussians.
fn kl_gaussian(posterior: SkillBelief, prior: SkillBelief) -> f64 {
    let ratio = posterior.sigma_sq / prior.sigma_sq;
    let shift = posterior.mu - prior.mu;
    shift * shift / (2.0 * prior.sigma_sq) + 0.5 * (ratio - 1.0 - ratio.ln())
}

/// `KL(posterior || prior)` between two Beta distributions.
fn kl_beta(posterior: Reliability, prior: Reliability) -> f64 {
    let (a1, b1) = (posterior.alpha, posterior.beta);
    let (a2, b2) = (prior.alpha, prior.beta);
    ln_beta(a2, b2) - ln_beta(a1, b1)
        + (a1 - a2) * digamma(a1)
        + (b1 - b2) * digamma(b1)
        + (a2 - a1 + b2 - b1) * digamma(a1 + b1)
}

fn ln_beta(a: f64, b: f64) -> f64 {
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn rel() -> Reliability {
        Reliability::new(10.0, 1.0)
    }

    #[test]
    fn divergence_of_identical_beliefs_is_zero() {
        let belief = SkillBelief::new(0.4, 0.8);
        assert!(kl_gaussian(belief, belief).abs() < 1e-12);
        let beta = Reliability::new(3.0, 7.0);
        assert!(kl_beta(beta, beta).abs() < 1e-9);
    }

    #[test]
    fn uncertain_candidate_is_more_informative() {
        let reference = SkillBelief::new(0.0, 1.0);
        let settled = expected_information_gain(rel(), reference, SkillBelief::new(0.0, 0.05))
            .unwrap();
        let fresh =
            expected_information_gain(rel(), reference, SkillBelief::new(0.0, 1.0)).unwrap();
        assert!(fresh > settled);
    }

    #[test]
    fn close_match_beats_foregone_conclusion() {
        let reference = SkillBelief::new(0.0, 0.5);
        let close = expected_information_gain(rel(), reference, SkillBelief::new(0.1, 0.5))
            .unwrap();
        let lopsided = expected_information_gain(rel(), reference, SkillBelief::new(6.0, 0.5))
            .unwrap();
        assert!(close > lopsided);
    }

    #[test]
    fn identical_candidates_score_identically() {
        let reference = SkillBelief::new(0.2, 0.9);
        let candidate = SkillBelief::new(-0.3, 1.1);
        let a = expected_information_gain(rel(), reference, candidate).unwrap();
        let b = expected_information_gain(rel(), reference, candidate).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn rejects_invalid_input() {
        let result = expected_information_gain(
            Reliability::new(1.0, 1.0),
            SkillBelief::new(0.0, -1.0),
            SkillBelief::new(0.0, 1.0),
        );
        assert!(matches!(result, Err(CoreError::InvalidBelief { field: "reference", .. })));
    }

    proptest! {
        #[test]
        fn gain_is_finite_and_non_negative(
            alpha in 1e-2..1e3_f64, beta in 1e-2..1e3_f64,
            mr in -10.0..10.0_f64, vr in 1e-4..10.0_f64,
            mc in -10.0..10.0_f64, vc in 1e-4..10.0_f64,
        ) {
            let gain = expected_information_gain(
                Reliability::new(alpha, beta),
                SkillBelief::new(mr, vr),
                SkillBelief::new(mc, vc),
            ).unwrap();
            prop_assert!(gain.is_finite());
            prop_assert!(gain >= 0.0);
        }
    }
}
