//! Settings repository: a small key/value table.

use crate::error::DatabaseError;
use crate::service::JudgeService;

/// Key of the judging-window flag.
pub const SETTING_CLOSED: &str = "closed";

/// Whether judging is closed, read on an arbitrary connection.
pub(crate) async fn read_closed(conn: &libsql::Connection) -> Result<bool, DatabaseError> {
    Ok(read_setting(conn, SETTING_CLOSED).await?.as_deref() == Some("true"))
}

async fn read_setting(
    conn: &libsql::Connection,
    key: &str,
) -> Result<Option<String>, DatabaseError> {
    let mut rows = conn
        .query("SELECT value FROM settings WHERE key = ?1", [key])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

impl JudgeService {
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        read_setting(self.db().conn(), key).await
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .await?;
        Ok(())
    }

    pub async fn is_closed(&self) -> Result<bool, DatabaseError> {
        read_closed(self.db().conn()).await
    }

    /// Open or close the judging window.
    pub async fn set_closed(&self, closed: bool) -> Result<(), DatabaseError> {
        self.set_setting(SETTING_CLOSED, if closed { "true" } else { "false" })
            .await?;
        tracing::info!(closed, "Judging window updated");
        Ok(())
    }
}
