//! Item repository: creation, listing, and administrative flags.

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;

use judge_core::entities::Item;
use judge_core::ids::PREFIX_ITEM;

use crate::error::DatabaseError;
use crate::service::JudgeService;
use crate::snapshot::{load_item, load_items};

impl JudgeService {
    /// Create an active item with beliefs at the configured priors.
    pub async fn create_item(&self, name: &str, description: &str) -> Result<Item, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ITEM).await?;
        let skill = self.priors().skill();

        self.db()
            .conn()
            .execute(
                "INSERT INTO items (id, name, description, active, prioritized, mu, sigma_sq, version, created_at)
                 VALUES (?1, ?2, ?3, 1, 0, ?4, ?5, 1, ?6)",
                libsql::params![
                    id.as_str(),
                    name,
                    description,
                    skill.mu,
                    skill.sigma_sq,
                    now.to_rfc3339()
                ],
            )
            .await?;

        info!(item = %id, name, "Created item");
        Ok(Item {
            id,
            name: name.to_string(),
            description: description.to_string(),
            active: true,
            prioritized: false,
            mu: skill.mu,
            sigma_sq: skill.sigma_sq,
            viewed_by: BTreeSet::new(),
            version: 1,
            created_at: now,
        })
    }

    pub async fn get_item(&self, id: &str) -> Result<Item, DatabaseError> {
        load_item(self.db().conn(), id).await
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, DatabaseError> {
        load_items(self.db().conn()).await
    }

    /// Enable or disable an item. Bumps the version so in-flight plans that
    /// read the old state conflict.
    pub async fn set_item_active(&self, id: &str, active: bool) -> Result<Item, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE items SET active = ?1, version = version + 1 WHERE id = ?2",
                libsql::params![i64::from(active), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("item", id));
        }
        info!(item = id, active, "Item activity changed");
        self.get_item(id).await
    }

    /// Mark an item to be shown before anything else. Cleared automatically
    /// once the item is assigned to a judge.
    pub async fn set_item_prioritized(
        &self,
        id: &str,
        prioritized: bool,
    ) -> Result<Item, DatabaseError> {
        let changed = self
            .db()
            .conn()
            .execute(
                "UPDATE items SET prioritized = ?1 WHERE id = ?2",
                libsql::params![i64::from(prioritized), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::not_found("item", id));
        }
        self.get_item(id).await
    }

    /// Delete an item along with its decisions, views and ignores. Judges
    /// holding it in an assignment slot have that slot cleared.
    pub async fn delete_item(&self, id: &str) -> Result<(), DatabaseError> {
        let conn = self.db().connect().await?;
        let tx = conn
            .transaction_with_behavior(libsql::TransactionBehavior::Immediate)
            .await?;
        tx.execute(
            "UPDATE judges SET version = version + 1 WHERE next_id = ?1 OR prev_id = ?1",
            [id],
        )
        .await?;
        let deleted = tx.execute("DELETE FROM items WHERE id = ?1", [id]).await?;
        if deleted == 0 {
            tx.rollback().await?;
            return Err(DatabaseError::not_found("item", id));
        }
        tx.commit().await?;
        info!(item = id, "Deleted item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::error::DatabaseError;
    use crate::test_support::helpers::test_service;

    #[tokio::test]
    async fn create_item_roundtrip() {
        let svc = test_service().await;
        let item = svc.create_item("Rocket", "Goes up").await.unwrap();

        assert!(judge_core::ids::has_prefix(&item.id, "itm"));
        assert!(item.active);
        assert!(!item.prioritized);
        assert_eq!((item.mu, item.sigma_sq), (0.0, 1.0));

        let fetched = svc.get_item(&item.id).await.unwrap();
        assert_eq!(fetched, item);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let svc = test_service().await;
        let result = svc.get_item("itm-00000000").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { entity: "item", .. })));
    }

    #[tokio::test]
    async fn toggling_active_bumps_version() {
        let svc = test_service().await;
        let item = svc.create_item("Rocket", "").await.unwrap();

        let disabled = svc.set_item_active(&item.id, false).await.unwrap();
        assert!(!disabled.active);
        assert_eq!(disabled.version, item.version + 1);

        let enabled = svc.set_item_active(&item.id, true).await.unwrap();
        assert!(enabled.active);
        assert_eq!(enabled.version, item.version + 2);
    }

    #[tokio::test]
    async fn prioritizing_keeps_version() {
        let svc = test_service().await;
        let item = svc.create_item("Rocket", "").await.unwrap();
        let flagged = svc.set_item_prioritized(&item.id, true).await.unwrap();
        assert!(flagged.prioritized);
        assert_eq!(flagged.version, item.version);
    }

    #[tokio::test]
    async fn list_items_in_creation_order() {
        let svc = test_service().await;
        let a = svc.create_item("A", "").await.unwrap();
        let b = svc.create_item("B", "").await.unwrap();
        let ids: Vec<_> = svc
            .list_items()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn delete_item_removes_it() {
        let svc = test_service().await;
        let item = svc.create_item("Rocket", "").await.unwrap();
        svc.delete_item(&item.id).await.unwrap();
        assert!(svc.get_item(&item.id).await.is_err());
        assert!(matches!(
            svc.delete_item(&item.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
