//! Deterministic fold of the decision log.
//!
//! Every stored belief is a function of the priors and the ordered
//! decisions. Replaying the log rebuilds those beliefs from scratch, which is
//! how drift between stored and derived state is detected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{Decision, Item, Judge};
use crate::errors::CoreError;
use crate::model::{Priors, Reliability, SkillBelief, update};

/// Beliefs derived from priors plus a prefix of the decision log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    pub items: BTreeMap<String, SkillBelief>,
    pub judges: BTreeMap<String, Reliability>,
    pub applied: usize,
}

impl BeliefState {
    /// Start every known item and judge at the priors.
    #[must_use]
    pub fn at_priors<'a>(
        priors: &Priors,
        item_ids: impl IntoIterator<Item = &'a str>,
        judge_ids: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            items: item_ids
                .into_iter()
                .map(|id| (id.to_string(), priors.skill()))
                .collect(),
            judges: judge_ids
                .into_iter()
                .map(|id| (id.to_string(), priors.reliability()))
                .collect(),
            applied: 0,
        }
    }

    /// Apply one decision. Ids not seen before start at the priors.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a decision whose winner and loser
    /// coincide, or `CoreError::InvalidBelief` for out-of-domain priors.
    pub fn apply(&mut self, priors: &Priors, decision: &Decision) -> Result<(), CoreError> {
        if decision.winner_id == decision.loser_id {
            return Err(CoreError::Validation(format!(
                "decision {} compares {} with itself",
                decision.id, decision.winner_id
            )));
        }
        let reliability = *self
            .judges
            .entry(decision.judge_id.clone())
            .or_insert_with(|| priors.reliability());
        let winner = *self
            .items
            .entry(decision.winner_id.clone())
            .or_insert_with(|| priors.skill());
        let loser = *self
            .items
            .entry(decision.loser_id.clone())
            .or_insert_with(|| priors.skill());

        let result = update(reliability, winner, loser)?;
        self.judges
            .insert(decision.judge_id.clone(), result.reliability);
        self.items.insert(decision.winner_id.clone(), result.winner);
        self.items.insert(decision.loser_id.clone(), result.loser);
        self.applied += 1;
        Ok(())
    }
}

/// Fold `decisions` in order, starting from the priors.
///
/// # Errors
///
/// Propagates the first error from [`BeliefState::apply`].
pub fn replay<'a>(
    priors: &Priors,
    items: impl IntoIterator<Item = &'a str>,
    judges: impl IntoIterator<Item = &'a str>,
    decisions: &[Decision],
) -> Result<BeliefState, CoreError> {
    let mut state = BeliefState::at_priors(priors, items, judges);
    for decision in decisions {
        state.apply(priors, decision)?;
    }
    Ok(state)
}

/// A stored belief that disagrees with its replayed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Drift {
    Item {
        id: String,
        stored: SkillBelief,
        replayed: SkillBelief,
    },
    Judge {
        id: String,
        stored: Reliability,
        replayed: Reliability,
    },
}

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}

/// Compare stored beliefs against a replayed state.
#[must_use]
pub fn drift(state: &BeliefState, items: &[Item], judges: &[Judge], tolerance: f64) -> Vec<Drift> {
    let mut out = Vec::new();
    for item in items {
        let Some(&replayed) = state.items.get(&item.id) else {
            continue;
        };
        let stored = item.skill();
        if !(close(stored.mu, replayed.mu, tolerance)
            && close(stored.sigma_sq, replayed.sigma_sq, tolerance))
        {
            out.push(Drift::Item {
                id: item.id.clone(),
                stored,
                replayed,
            });
        }
    }
    for judge in judges {
        let Some(&replayed) = state.judges.get(&judge.id) else {
            continue;
        };
        let stored = judge.reliability();
        if !(close(stored.alpha, replayed.alpha, tolerance)
            && close(stored.beta, replayed.beta, tolerance))
        {
            out.push(Drift::Judge {
                id: judge.id.clone(),
                stored,
                replayed,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    const NONE: [&str; 0] = [];

    fn decision(id: &str, judge: &str, winner: &str, loser: &str) -> Decision {
        Decision {
            id: id.to_string(),
            judge_id: judge.to_string(),
            winner_id: winner.to_string(),
            loser_id: loser.to_string(),
            created_at: Utc::now(),
        }
    }

    fn log() -> Vec<Decision> {
        vec![
            decision("d1", "j1", "a", "b"),
            decision("d2", "j2", "b", "c"),
            decision("d3", "j1", "a", "c"),
            decision("d4", "j2", "c", "a"),
        ]
    }

    #[test]
    fn replay_is_deterministic() {
        let priors = Priors::default();
        let first = replay(&priors, ["a", "b", "c"], ["j1", "j2"], &log()).unwrap();
        let second = replay(&priors, ["a", "b", "c"], ["j1", "j2"], &log()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.applied, 4);
    }

    #[test]
    fn untouched_entities_stay_at_priors() {
        let priors = Priors::default();
        let state = replay(&priors, ["a", "b", "z"], ["j1", "j9"], &log()[..1]).unwrap();
        assert_eq!(state.items["z"], priors.skill());
        assert_eq!(state.judges["j9"], priors.reliability());
        assert!(state.items["a"].mu > state.items["b"].mu);
    }

    #[test]
    fn replay_matches_stepwise_updates() {
        let priors = Priors::default();
        let state = replay(&priors, NONE, NONE, &log()[..1]).unwrap();
        let expected = update(priors.reliability(), priors.skill(), priors.skill()).unwrap();
        assert_eq!(state.items["a"], expected.winner);
        assert_eq!(state.items["b"], expected.loser);
        assert_eq!(state.judges["j1"], expected.reliability);
    }

    #[test]
    fn self_comparison_is_rejected() {
        let mut state = BeliefState::default();
        let result = state.apply(&Priors::default(), &decision("d", "j", "a", "a"));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn drift_reports_only_mismatches() {
        let priors = Priors::default();
        let state = replay(&priors, NONE, NONE, &log()).unwrap();
        let a = state.items["a"];

        let item = |id: &str, skill: SkillBelief| Item {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            active: true,
            prioritized: false,
            mu: skill.mu,
            sigma_sq: skill.sigma_sq,
            viewed_by: std::collections::BTreeSet::new(),
            version: 1,
            created_at: Utc::now(),
        };
        let items = vec![
            item("a", a),
            item("b", SkillBelief::new(9.0, 1.0)),
            item("ghost", SkillBelief::new(0.0, 1.0)),
        ];

        let found = drift(&state, &items, &[], 1e-9);
        assert_eq!(found.len(), 1);
        assert!(matches!(&found[0], Drift::Item { id, .. } if id == "b"));
    }
}
