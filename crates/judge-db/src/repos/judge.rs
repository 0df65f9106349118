//! Judge repository.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;

use judge_core::entities::{Assignment, Judge};
use judge_core::ids::PREFIX_JUDGE;

use crate::error::DatabaseError;
use crate::service::JudgeService;
use crate::snapshot::{load_judge, load_judges};

impl JudgeService {
    /// Register an active judge with no assignment and prior reliability.
    pub async fn create_judge(&self, name: &str, email: &str) -> Result<Judge, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_JUDGE).await?;
        let reliability = self.priors().reliability();

        self.db()
            .conn()
            .execute(
                "INSERT INTO judges (id, name, email, active, alpha, beta, version, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4, ?5, 1, ?6)",
                libsql::params![
                    id.as_str(),
                    name,
                    email,
                    reliability.alpha,
                    reliability.beta,
                    now.to_rfc3339()
                ],
            )
            .await?;

        info!(judge = %id, name, "Created judge");
        Ok(Judge {
            id,
            name: name.to_string(),
            email: email.to_string(),
            active: true,
            alpha: reliability.alpha,
            beta: reliability.beta,
            ignore: BTreeSet::new(),
            prev: None,
            next: None,
            updated_at: None,
            version: 1,
            created_at: now,
        })
    }

    pub async fn get_judge(&self, id: &str) -> Result<Judge, DatabaseError> {
        load_judge(self.db().conn(), id).await
    }

    pub async fn list_judges(&self) -> Result<Vec<Judge>, DatabaseError> {
        load_judges(self.db().conn()).await
    }

    /// The judge's current `(prev, next)` slots.
    pub async fn assignment(&self, judge_id: &str) -> Result<Assignment, DatabaseError> {
        Ok(self.get_judge(judge_id).await?.assignment())
    }

    /// Enable or disable a judge. A disabled judge's assignment stops
    /// counting as busy and every transition it submits is refused.
    pub async fn set_judge_active(&self, id: &str, active: bool) -> Result<Judge, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE judges SET active = ?1, version = version + 1 WHERE id = ?2",
                libsql::params![i64::from(active), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("judge", id));
        }
        info!(judge = id, active, "Judge activity changed");
        self.get_judge(id).await
    }

    /// Delete a judge together with its decisions, views and ignores.
    pub async fn delete_judge(&self, id: &str) -> Result<(), DatabaseError> {
        let deleted = self
            .db()
            .conn()
            .execute("DELETE FROM judges WHERE id = ?1", [id])
            .await?;
        if deleted == 0 {
            return Err(DatabaseError::not_found("judge", id));
        }
        info!(judge = id, "Deleted judge");
        Ok(())
    }
}
