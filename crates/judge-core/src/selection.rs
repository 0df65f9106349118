//! Epsilon-greedy choice of the next item to show a judge.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::entities::Item;
use crate::enums::Pick;
use crate::errors::CoreError;
use crate::model::{Reliability, SkillBelief, expected_information_gain};

/// Anything the selector can score.
pub trait Candidate {
    fn skill(&self) -> SkillBelief;
}

impl Candidate for Item {
    fn skill(&self) -> SkillBelief {
        Self::skill(self)
    }
}

impl Candidate for SkillBelief {
    fn skill(&self) -> SkillBelief {
        *self
    }
}

impl<T: Candidate + ?Sized> Candidate for &T {
    fn skill(&self) -> SkillBelief {
        (**self).skill()
    }
}

/// Pick the next item, or `None` for an empty pool.
///
/// # Errors
///
/// Propagates `CoreError::InvalidBelief` from the gain estimator.
pub fn select_next<T, R>(
    reliability: Reliability,
    reference: Option<SkillBelief>,
    candidates: Vec<T>,
    epsilon: f64,
    rng: &mut R,
) -> Result<Option<T>, CoreError>
where
    T: Candidate,
    R: Rng + ?Sized,
{
    Ok(select_next_with_pick(reliability, reference, candidates, epsilon, rng)?
        .map(|(item, _)| item))
}

/// Like [`select_next`], also reporting which branch chose the item.
///
/// # Errors
///
/// Propagates `CoreError::InvalidBelief` from the gain estimator.
pub fn select_next_with_pick<T, R>(
    reliability: Reliability,
    reference: Option<SkillBelief>,
    mut candidates: Vec<T>,
    epsilon: f64,
    rng: &mut R,
) -> Result<Option<(T, Pick)>, CoreError>
where
    T: Candidate,
    R: Rng + ?Sized,
{
    if candidates.is_empty() {
        return Ok(None);
    }
    candidates.shuffle(rng);

    let Some(reference) = reference else {
        return Ok(candidates.into_iter().next().map(|c| (c, Pick::Random)));
    };

    if rng.random::<f64>() < epsilon {
        return Ok(candidates.into_iter().next().map(|c| (c, Pick::Explore)));
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let gain = expected_information_gain(reliability, reference, candidate.skill())?;
        if best.is_none_or(|(_, top)| gain > top) {
            best = Some((index, gain));
        }
    }

    Ok(best.map(|(index, _)| (candidates.swap_remove(index), Pick::Greedy)))
}
