//! Leaderboard and judge summary reads.

use judge_core::ranking::{JudgeStanding, Standing, rank_items, summarize_judges};

use crate::error::DatabaseError;
use crate::repos::decision::{load_decisions, load_ignores};
use crate::service::JudgeService;
use crate::snapshot::{load_items, load_judges};

impl JudgeService {
    /// Items ordered by skill mean, best first.
    pub async fn leaderboard(&self) -> Result<Vec<Standing>, DatabaseError> {
        let conn = self.db().conn();
        let items = load_items(conn).await?;
        let decisions = load_decisions(conn).await?;
        let ignores = load_ignores(conn).await?;
        Ok(rank_items(&items, &decisions, &ignores))
    }

    pub async fn judge_summary(&self) -> Result<Vec<JudgeStanding>, DatabaseError> {
        let conn = self.db().conn();
        let judges = load_judges(conn).await?;
        let decisions = load_decisions(conn).await?;
        Ok(summarize_judges(&judges, &decisions))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn leaderboard_orders_by_mean() {
        let svc = test_service().await;
        let a = svc.create_item("A", "").await.unwrap();
        let b = svc.create_item("B", "").await.unwrap();
        svc.db()
            .conn()
            .execute("UPDATE items SET mu = 1.5 WHERE id = ?1", [b.id.as_str()])
            .await
            .unwrap();

        let board = svc.leaderboard().await.unwrap();
        let order: Vec<_> = board.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(order, vec![b.id.as_str(), a.id.as_str()]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].rank, 2);
    }

    #[tokio::test]
    async fn judge_summary_lists_everyone() {
        let svc = test_service().await;
        svc.create_judge("Ada", "").await.unwrap();
        svc.create_judge("Bob", "").await.unwrap();

        let summary = svc.judge_summary().await.unwrap();
        assert_eq!(summary.len(), 2);
        assert!(summary.iter().all(|j| j.decisions == 0));
        assert!((summary[0].reliability - 10.0 / 11.0).abs() < 1e-12);
    }
}
