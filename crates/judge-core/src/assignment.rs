//! Per-judge assignment planner.
//!
//! Every transition is a pure function from a [`Snapshot`] of the state it
//! depends on to a [`Step`]: either a no-op carrying the outcome to report, or
//! a [`Plan`] of writes the storage layer applies atomically with version
//! checks. A plan whose commit fails is simply discarded and recomputed from
//! a fresh snapshot.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{Assignment, Item, Judge};
use crate::enums::{AssignmentState, BeginAction, Pick, VoteAction};
use crate::errors::CoreError;
use crate::model::{RankingParams, Reliability, SkillBelief, update};
use crate::pool::candidate_pool;
use crate::selection::select_next_with_pick;

/// Everything a transition reads.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub judge: Judge,
    /// All items, with their `viewed_by` sets populated.
    pub items: Vec<Item>,
    /// Items currently assigned to other active judges.
    pub busy: BTreeSet<String>,
    /// Judging window is closed.
    pub closed: bool,
    pub now: DateTime<Utc>,
}

/// What the judge should see after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The judge has an item to look at.
    Assigned(Assignment),
    /// Nothing left to show right now.
    Waiting,
    /// The submission did not match the judge's live assignment. Nothing
    /// changed.
    Stale,
    /// Judging is closed.
    Closed,
    /// The judge has been disabled.
    Inactive,
}

impl Outcome {
    fn from_assignment(assignment: Assignment) -> Self {
        if assignment.next.is_some() {
            Self::Assigned(assignment)
        } else {
            Self::Waiting
        }
    }
}

/// New belief for an item, valid only if the item is still at `version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefChange {
    pub item_id: String,
    pub version: i64,
    pub skill: SkillBelief,
}

/// Comparison to append to the decision log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionDraft {
    pub winner_id: String,
    pub loser_id: String,
}

/// Writes produced by one transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub judge_id: String,
    /// The judge row must still be at this version.
    pub judge_version: i64,
    pub assignment: Assignment,
    /// Set when a new `next` is assigned.
    pub assigned_at: Option<DateTime<Utc>>,
    pub reliability: Option<Reliability>,
    pub beliefs: Vec<BeliefChange>,
    pub decision: Option<DecisionDraft>,
    pub viewed: Option<String>,
    pub ignored: Option<String>,
    /// Prioritized item that is now being assigned.
    pub deprioritize: Option<String>,
    pub pick: Option<Pick>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    NoOp(Outcome),
    Apply(Box<Plan>),
}

impl Step {
    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        match self {
            Self::NoOp(outcome) => outcome,
            Self::Apply(plan) => &plan.outcome,
        }
    }
}

/// Working copy of the snapshot a plan is built on.
struct Draft<'a> {
    snapshot: &'a Snapshot,
    items: Vec<Item>,
    ignore: BTreeSet<String>,
    plan: Plan,
}

impl<'a> Draft<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        let judge = &snapshot.judge;
        Self {
            snapshot,
            items: snapshot.items.clone(),
            ignore: judge.ignore.clone(),
            plan: Plan {
                judge_id: judge.id.clone(),
                judge_version: judge.version,
                assignment: judge.assignment(),
                assigned_at: None,
                reliability: None,
                beliefs: Vec::new(),
                decision: None,
                viewed: None,
                ignored: None,
                deprioritize: None,
                pick: None,
                outcome: Outcome::Waiting,
            },
        }
    }

    fn item(&self, id: &str) -> Result<&Item, CoreError> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or_else(|| CoreError::not_found("item", id))
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut Item, CoreError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| CoreError::not_found("item", id))
    }

    fn reliability(&self) -> Reliability {
        self.plan
            .reliability
            .unwrap_or_else(|| self.snapshot.judge.reliability())
    }

    fn ignore(&mut self, id: &str) {
        self.ignore.insert(id.to_string());
        self.plan.ignored = Some(id.to_string());
    }

    fn view(&mut self, id: &str) -> Result<(), CoreError> {
        let judge_id = self.snapshot.judge.id.clone();
        self.item_mut(id)?.viewed_by.insert(judge_id);
        self.plan.viewed = Some(id.to_string());
        Ok(())
    }

    /// Choose and assign a new `next`, optionally relative to a reference.
    fn choose_next<R>(
        &mut self,
        reference: Option<&str>,
        params: &RankingParams,
        rng: &mut R,
    ) -> Result<(), CoreError>
    where
        R: Rng + ?Sized,
    {
        let reference = reference.map(|id| self.item(id).map(Item::skill)).transpose()?;
        let pool = candidate_pool(
            &self.items,
            &self.ignore,
            &self.snapshot.busy,
            params.min_views,
        );
        let chosen = select_next_with_pick(self.reliability(), reference, pool, params.epsilon, rng)?
            .map(|(item, pick)| (item.id.clone(), item.prioritized, pick));

        match chosen {
            Some((id, prioritized, pick)) => {
                debug!(judge = %self.plan.judge_id, item = %id, %pick, "Assigning next item");
                if prioritized {
                    self.plan.deprioritize = Some(id.clone());
                }
                self.plan.assignment.next = Some(id);
                self.plan.assigned_at = Some(self.snapshot.now);
                self.plan.pick = Some(pick);
            }
            None => {
                debug!(judge = %self.plan.judge_id, "Candidate pool is empty");
                self.plan.assignment.next = None;
            }
        }
        Ok(())
    }

    fn record(&mut self, winner_id: &str, loser_id: &str) -> Result<(), CoreError> {
        let winner = self.item(winner_id)?;
        let loser = self.item(loser_id)?;
        let (winner_version, loser_version) = (winner.version, loser.version);
        let result = update(self.reliability(), winner.skill(), loser.skill())?;

        self.item_mut(winner_id)?.set_skill(result.winner);
        self.item_mut(loser_id)?.set_skill(result.loser);
        self.plan.reliability = Some(result.reliability);
        self.plan.beliefs = vec![
            BeliefChange {
                item_id: winner_id.to_string(),
                version: winner_version,
                skill: result.winner,
            },
            BeliefChange {
                item_id: loser_id.to_string(),
                version: loser_version,
                skill: result.loser,
            },
        ];
        self.plan.decision = Some(DecisionDraft {
            winner_id: winner_id.to_string(),
            loser_id: loser_id.to_string(),
        });
        Ok(())
    }

    fn finish(mut self) -> Step {
        self.plan.outcome = Outcome::from_assignment(self.plan.assignment.clone());
        Step::Apply(Box::new(self.plan))
    }
}

fn gate(snapshot: &Snapshot) -> Option<Outcome> {
    if snapshot.closed {
        Some(Outcome::Closed)
    } else if !snapshot.judge.active {
        Some(Outcome::Inactive)
    } else {
        None
    }
}

/// Assign a first item to a judge that has none.
///
/// # Errors
///
/// Returns `CoreError` if stored beliefs are out of domain.
pub fn plan_initialize<R>(
    snapshot: &Snapshot,
    params: &RankingParams,
    rng: &mut R,
) -> Result<Step, CoreError>
where
    R: Rng + ?Sized,
{
    if let Some(outcome) = gate(snapshot) {
        return Ok(Step::NoOp(outcome));
    }
    let current = snapshot.judge.assignment();
    if current.next.is_some() {
        return Ok(Step::NoOp(Outcome::Assigned(current)));
    }

    let mut draft = Draft::new(snapshot);
    draft.choose_next(None, params, rng)?;
    if draft.plan.assignment.next.is_none() {
        return Ok(Step::NoOp(Outcome::Waiting));
    }
    Ok(draft.finish())
}

/// Act on the first item a judge was shown.
///
/// # Errors
///
/// Returns `CoreError` if the assigned item is missing from the snapshot or
/// stored beliefs are out of domain.
pub fn plan_begin<R>(
    snapshot: &Snapshot,
    claimed_next: &str,
    action: BeginAction,
    params: &RankingParams,
    rng: &mut R,
) -> Result<Step, CoreError>
where
    R: Rng + ?Sized,
{
    if let Some(outcome) = gate(snapshot) {
        return Ok(Step::NoOp(outcome));
    }
    let current = snapshot.judge.assignment();
    if current.state() != AssignmentState::Begin || current.next.as_deref() != Some(claimed_next) {
        debug!(judge = %snapshot.judge.id, claimed_next, "Stale begin submission");
        return Ok(Step::NoOp(Outcome::Stale));
    }

    let mut draft = Draft::new(snapshot);
    draft.ignore(claimed_next);
    match action {
        BeginAction::Continue => {
            draft.view(claimed_next)?;
            draft.plan.assignment.prev = Some(claimed_next.to_string());
            draft.choose_next(Some(claimed_next), params, rng)?;
        }
        BeginAction::Skip => {
            draft.plan.assignment.next = None;
        }
    }
    Ok(draft.finish())
}

/// Act on a comparison between `prev` and `next`.
///
/// # Errors
///
/// Returns `CoreError` if an assigned item is missing from the snapshot or
/// stored beliefs are out of domain.
pub fn plan_vote<R>(
    snapshot: &Snapshot,
    claimed_prev: &str,
    claimed_next: &str,
    action: VoteAction,
    params: &RankingParams,
    rng: &mut R,
) -> Result<Step, CoreError>
where
    R: Rng + ?Sized,
{
    if let Some(outcome) = gate(snapshot) {
        return Ok(Step::NoOp(outcome));
    }
    let current = snapshot.judge.assignment();
    if current.state() != AssignmentState::Steady
        || current.prev.as_deref() != Some(claimed_prev)
        || current.next.as_deref() != Some(claimed_next)
    {
        debug!(judge = %snapshot.judge.id, claimed_prev, claimed_next, "Stale vote submission");
        return Ok(Step::NoOp(Outcome::Stale));
    }

    let mut draft = Draft::new(snapshot);
    match action {
        VoteAction::Skip => {
            draft.ignore(claimed_next);
            draft.choose_next(Some(claimed_prev), params, rng)?;
        }
        VoteAction::Previous | VoteAction::Current => {
            let both_active = draft.item(claimed_prev)?.active && draft.item(claimed_next)?.active;
            if both_active {
                let (winner, loser) = if action == VoteAction::Previous {
                    (claimed_prev, claimed_next)
                } else {
                    (claimed_next, claimed_prev)
                };
                draft.record(winner, loser)?;
            } else {
                debug!(judge = %snapshot.judge.id, "Skipping update for deactivated item");
            }
            draft.view(claimed_next)?;
            draft.plan.assignment.prev = Some(claimed_next.to_string());
            draft.ignore(claimed_next);
            draft.choose_next(Some(claimed_next), params, rng)?;
        }
    }
    Ok(draft.finish())
}
