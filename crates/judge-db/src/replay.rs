//! Rebuild stored beliefs from the decision log.

use serde::{Deserialize, Serialize};
use tracing::info;

use judge_core::replay::{Drift, drift, replay};

use crate::error::DatabaseError;
use crate::repos::decision::load_decisions;
use crate::retry::with_retries;
use crate::service::JudgeService;
use crate::snapshot::{load_items, load_judges};

/// Relative tolerance used when comparing stored and replayed beliefs.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Result of replaying the decision log against stored beliefs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Decisions folded.
    pub decisions: usize,
    /// Beliefs that disagree with the replay.
    pub drift: Vec<Drift>,
}

impl ReplayReport {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.drift.is_empty()
    }
}

async fn replay_on(
    conn: &libsql::Connection,
    service: &JudgeService,
    tolerance: f64,
) -> Result<ReplayReport, DatabaseError> {
    let items = load_items(conn).await?;
    let judges = load_judges(conn).await?;
    let decisions = load_decisions(conn).await?;
    let state = replay(
        service.priors(),
        items.iter().map(|item| item.id.as_str()),
        judges.iter().map(|judge| judge.id.as_str()),
        &decisions,
    )?;
    Ok(ReplayReport {
        decisions: decisions.len(),
        drift: drift(&state, &items, &judges, tolerance),
    })
}

impl JudgeService {
    /// Compare stored beliefs with a replay of the decision log.
    pub async fn replay_report(&self, tolerance: f64) -> Result<ReplayReport, DatabaseError> {
        replay_on(self.db().conn(), self, tolerance).await
    }

    /// Overwrite every drifted belief with its replayed value.
    ///
    /// Runs in one immediate transaction and bumps the version of every row
    /// it rewrites, so in-flight transitions computed from the old beliefs
    /// are retried. Returns the drift that was corrected.
    pub async fn apply_replay(&self, tolerance: f64) -> Result<ReplayReport, DatabaseError> {
        with_retries(self.retry(), "replay", || self.rewrite_beliefs(tolerance)).await
    }

    async fn rewrite_beliefs(&self, tolerance: f64) -> Result<ReplayReport, DatabaseError> {
        let conn = self.db().connect().await?;
        let tx = conn
            .transaction_with_behavior(libsql::TransactionBehavior::Immediate)
            .await?;

        let report = replay_on(&tx, self, tolerance).await?;
        for entry in &report.drift {
            match entry {
                Drift::Item { id, replayed, .. } => {
                    tx.execute(
                        "UPDATE items SET mu = ?1, sigma_sq = ?2, version = version + 1 WHERE id = ?3",
                        libsql::params![replayed.mu, replayed.sigma_sq, id.as_str()],
                    )
                    .await?;
                }
                Drift::Judge { id, replayed, .. } => {
                    tx.execute(
                        "UPDATE judges SET alpha = ?1, beta = ?2, version = version + 1 WHERE id = ?3",
                        libsql::params![replayed.alpha, replayed.beta, id.as_str()],
                    )
                    .await?;
                }
            }
        }
        tx.commit().await?;

        info!(
            decisions = report.decisions,
            rewritten = report.drift.len(),
            "Replayed decision log"
        );
        Ok(report)
    }
}
