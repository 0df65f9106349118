//! Decision log: append-only, read back in commit order.

use judge_core::entities::Decision;
use judge_core::ranking::IgnoreEntry;

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::service::JudgeService;

fn row_to_decision(row: &libsql::Row) -> Result<Decision, DatabaseError> {
    Ok(Decision {
        id: row.get::<String>(0)?,
        judge_id: row.get::<String>(1)?,
        winner_id: row.get::<String>(2)?,
        loser_id: row.get::<String>(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

/// Every decision, in the order it was committed.
pub(crate) async fn load_decisions(
    conn: &libsql::Connection,
) -> Result<Vec<Decision>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, judge_id, winner_id, loser_id, created_at FROM decisions ORDER BY rowid",
            (),
        )
        .await?;
    let mut decisions = Vec::new();
    while let Some(row) = rows.next().await? {
        decisions.push(row_to_decision(&row)?);
    }
    Ok(decisions)
}

pub(crate) async fn load_ignores(
    conn: &libsql::Connection,
) -> Result<Vec<IgnoreEntry>, DatabaseError> {
    let mut rows = conn
        .query("SELECT judge_id, item_id FROM ignores ORDER BY judge_id, item_id", ())
        .await?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next().await? {
        entries.push(IgnoreEntry {
            judge_id: row.get::<String>(0)?,
            item_id: row.get::<String>(1)?,
        });
    }
    Ok(entries)
}

impl JudgeService {
    pub async fn list_decisions(&self) -> Result<Vec<Decision>, DatabaseError> {
        load_decisions(self.db().conn()).await
    }

    /// Decisions recorded by one judge, oldest first.
    pub async fn decisions_by_judge(&self, judge_id: &str) -> Result<Vec<Decision>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, judge_id, winner_id, loser_id, created_at FROM decisions
                 WHERE judge_id = ?1 ORDER BY rowid",
                [judge_id],
            )
            .await?;
        let mut decisions = Vec::new();
        while let Some(row) = rows.next().await? {
            decisions.push(row_to_decision(&row)?);
        }
        Ok(decisions)
    }

    pub async fn count_decisions(&self) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM decisions", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(0)?;
        u64::try_from(count).map_err(|_| DatabaseError::InvalidState(format!("count {count}")))
    }

    pub async fn list_ignores(&self) -> Result<Vec<IgnoreEntry>, DatabaseError> {
        load_ignores(self.db().conn()).await
    }
}
