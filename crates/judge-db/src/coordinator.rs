//! Judge assignment transitions.
//!
//! Each public method reads a snapshot on a fresh connection, asks the pure
//! planner in `judge_core::assignment` what to do, and commits the resulting
//! plan inside one `BEGIN IMMEDIATE` transaction. Every row the plan was
//! computed from is compared against the version seen in the snapshot; if any
//! moved, the commit is abandoned and the whole transition is recomputed.
//! A plan that cannot be built because the snapshot is missing a row it
//! refers to is treated the same way.

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

use judge_core::assignment::{Outcome, Plan, Snapshot, Step, plan_begin, plan_initialize, plan_vote};
use judge_core::enums::{BeginAction, VoteAction};
use judge_core::errors::CoreError;
use judge_core::ids::PREFIX_DECISION;
use judge_core::model::RankingParams;

use crate::error::DatabaseError;
use crate::generate_id_on;
use crate::service::JudgeService;
use crate::snapshot::load_snapshot;

impl JudgeService {
    /// Give an uninitialized judge its first item. A judge that already has
    /// one gets it back unchanged.
    pub async fn initialize_if_needed<R>(
        &self,
        judge_id: &str,
        rng: &mut R,
    ) -> Result<Outcome, DatabaseError>
    where
        R: Rng + ?Sized,
    {
        self.transition(judge_id, "initialize", rng, |snapshot, params, rng| {
            plan_initialize(snapshot, params, rng)
        })
        .await
    }

    /// Continue past or skip the first item. `claimed_next` must echo the
    /// item the judge was shown.
    pub async fn submit_begin_action<R>(
        &self,
        judge_id: &str,
        claimed_next: &str,
        action: BeginAction,
        rng: &mut R,
    ) -> Result<Outcome, DatabaseError>
    where
        R: Rng + ?Sized,
    {
        self.transition(judge_id, "begin", rng, |snapshot, params, rng| {
            plan_begin(snapshot, claimed_next, action, params, rng)
        })
        .await
    }

    /// Submit a comparison. A pair that does not match the judge's live
    /// assignment is reported as [`Outcome::Stale`] and changes nothing.
    pub async fn submit_vote_action<R>(
        &self,
        judge_id: &str,
        claimed_prev: &str,
        claimed_next: &str,
        action: VoteAction,
        rng: &mut R,
    ) -> Result<Outcome, DatabaseError>
    where
        R: Rng + ?Sized,
    {
        self.transition(judge_id, "vote", rng, |snapshot, params, rng| {
            plan_vote(snapshot, claimed_prev, claimed_next, action, params, rng)
        })
        .await
    }

    async fn transition<R, F>(
        &self,
        judge_id: &str,
        label: &'static str,
        rng: &mut R,
        planner: F,
    ) -> Result<Outcome, DatabaseError>
    where
        R: Rng + ?Sized,
        F: Fn(&Snapshot, &RankingParams, &mut R) -> Result<Step, CoreError>,
    {
        let mut attempts = self.retry().attempts(label);
        loop {
            match self.try_transition(judge_id, rng, &planner).await {
                Ok(outcome) => return Ok(outcome),
                Err(error) => attempts.backoff(error).await?,
            }
        }
    }

    async fn try_transition<R, F>(
        &self,
        judge_id: &str,
        rng: &mut R,
        planner: &F,
    ) -> Result<Outcome, DatabaseError>
    where
        R: Rng + ?Sized,
        F: Fn(&Snapshot, &RankingParams, &mut R) -> Result<Step, CoreError>,
    {
        let conn = self.db().connect().await?;
        let snapshot = load_snapshot(&conn, judge_id, self.params()).await?;
        match planner(&snapshot, self.params(), rng).map_err(planning_error)? {
            Step::NoOp(outcome) => Ok(outcome),
            Step::Apply(plan) => {
                commit(&conn, &plan).await?;
                let plan = *plan;
                Ok(plan.outcome)
            }
        }
    }
}

/// A plan that names a row its own snapshot lacks was computed from torn
/// state; recompute it like any other conflict.
fn planning_error(error: CoreError) -> DatabaseError {
    match error {
        CoreError::NotFound { entity_type, id } => {
            DatabaseError::WriteConflict(format!("{entity_type} {id} missing from snapshot"))
        }
        other => DatabaseError::Core(other),
    }
}

/// Apply a plan atomically, or not at all.
async fn commit(conn: &libsql::Connection, plan: &Plan) -> Result<(), DatabaseError> {
    let tx = conn
        .transaction_with_behavior(libsql::TransactionBehavior::Immediate)
        .await?;
    match write_plan(&tx, plan).await {
        Ok(()) => {
            tx.commit().await?;
            debug!(judge = %plan.judge_id, next = ?plan.assignment.next, "Committed transition");
            if let Some(decision) = &plan.decision {
                info!(
                    judge = %plan.judge_id,
                    winner = %decision.winner_id,
                    loser = %decision.loser_id,
                    "Recorded decision"
                );
            }
            Ok(())
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback failed");
            }
            Err(error)
        }
    }
}

async fn write_plan(conn: &libsql::Connection, plan: &Plan) -> Result<(), DatabaseError> {
    // A newly assigned item may have been deleted after the snapshot.
    if let (Some(next), Some(_)) = (plan.assignment.next.as_deref(), plan.assigned_at) {
        let mut rows = conn.query("SELECT 1 FROM items WHERE id = ?1", [next]).await?;
        if rows.next().await?.is_none() {
            return Err(DatabaseError::WriteConflict(format!("item {next} vanished")));
        }
    }

    let changed = conn
        .execute(
            "UPDATE judges SET prev_id = ?1, next_id = ?2,
                    updated_at = COALESCE(?3, updated_at),
                    alpha = COALESCE(?4, alpha), beta = COALESCE(?5, beta),
                    version = version + 1
             WHERE id = ?6 AND version = ?7",
            libsql::params![
                plan.assignment.prev.as_deref(),
                plan.assignment.next.as_deref(),
                plan.assigned_at.map(|at| at.to_rfc3339()),
                plan.reliability.map(|r| r.alpha),
                plan.reliability.map(|r| r.beta),
                plan.judge_id.as_str(),
                plan.judge_version
            ],
        )
        .await?;
    if changed == 0 {
        return Err(DatabaseError::WriteConflict(format!("judge {}", plan.judge_id)));
    }

    for belief in &plan.beliefs {
        let changed = conn
            .execute(
                "UPDATE items SET mu = ?1, sigma_sq = ?2, version = version + 1
                 WHERE id = ?3 AND version = ?4",
                libsql::params![
                    belief.skill.mu,
                    belief.skill.sigma_sq,
                    belief.item_id.as_str(),
                    belief.version
                ],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::WriteConflict(format!("item {}", belief.item_id)));
        }
    }

    if let Some(decision) = &plan.decision {
        let id = generate_id_on(conn, PREFIX_DECISION).await?;
        conn.execute(
            "INSERT INTO decisions (id, judge_id, winner_id, loser_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                id.as_str(),
                plan.judge_id.as_str(),
                decision.winner_id.as_str(),
                decision.loser_id.as_str(),
                Utc::now().to_rfc3339()
            ],
        )
        .await?;
    }

    if let Some(item_id) = plan.viewed.as_deref() {
        conn.execute(
            "INSERT OR IGNORE INTO views (item_id, judge_id) VALUES (?1, ?2)",
            [item_id, plan.judge_id.as_str()],
        )
        .await?;
    }
    if let Some(item_id) = plan.ignored.as_deref() {
        conn.execute(
            "INSERT OR IGNORE INTO ignores (judge_id, item_id) VALUES (?1, ?2)",
            [plan.judge_id.as_str(), item_id],
        )
        .await?;
    }
    if let Some(item_id) = plan.deprioritize.as_deref() {
        conn.execute("UPDATE items SET prioritized = 0 WHERE id = ?1", [item_id])
            .await?;
    }
    Ok(())
}
