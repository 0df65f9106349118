//! Row loaders shared by repositories and the transition snapshot.
//!
//! Every function takes an explicit connection so transitions can read on
//! their own connection.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use judge_core::assignment::Snapshot;
use judge_core::entities::{Item, Judge};
use judge_core::model::RankingParams;
use judge_core::pool::{JudgeSlot, busy_items};
use tracing::warn;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime, parse_optional_datetime};
use crate::repos::setting::read_closed;

pub(crate) const ITEM_COLUMNS: &str =
    "id, name, description, active, prioritized, mu, sigma_sq, version, created_at";

pub(crate) const JUDGE_COLUMNS: &str =
    "id, name, email, active, alpha, beta, prev_id, next_id, updated_at, version, created_at";

fn row_to_item(row: &libsql::Row) -> Result<Item, DatabaseError> {
    Ok(Item {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        description: row.get::<String>(2)?,
        active: get_bool(row, 3)?,
        prioritized: get_bool(row, 4)?,
        mu: row.get::<f64>(5)?,
        sigma_sq: row.get::<f64>(6)?,
        viewed_by: BTreeSet::new(),
        version: row.get::<i64>(7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn row_to_judge(row: &libsql::Row) -> Result<Judge, DatabaseError> {
    Ok(Judge {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        email: row.get::<String>(2)?,
        active: get_bool(row, 3)?,
        alpha: row.get::<f64>(4)?,
        beta: row.get::<f64>(5)?,
        ignore: BTreeSet::new(),
        prev: get_opt_string(row, 6)?,
        next: get_opt_string(row, 7)?,
        updated_at: parse_optional_datetime(get_opt_string(row, 8)?.as_deref())?,
        version: row.get::<i64>(9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

/// All items with their viewers, in creation order.
pub(crate) async fn load_items(conn: &libsql::Connection) -> Result<Vec<Item>, DatabaseError> {
    let mut items = Vec::new();
    let mut rows = conn
        .query(
            &format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY rowid"),
            (),
        )
        .await?;
    while let Some(row) = rows.next().await? {
        items.push(row_to_item(&row)?);
    }
    drop(rows);

    let mut viewers: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut rows = conn.query("SELECT item_id, judge_id FROM views", ()).await?;
    while let Some(row) = rows.next().await? {
        viewers
            .entry(row.get::<String>(0)?)
            .or_default()
            .insert(row.get::<String>(1)?);
    }

    for item in &mut items {
        if let Some(seen) = viewers.remove(&item.id) {
            item.viewed_by = seen;
        }
    }
    Ok(items)
}

/// One item with its viewers.
pub(crate) async fn load_item(conn: &libsql::Connection, id: &str) -> Result<Item, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("item", id))?;
    let mut item = row_to_item(&row)?;
    drop(rows);

    let mut rows = conn
        .query("SELECT judge_id FROM views WHERE item_id = ?1", [id])
        .await?;
    while let Some(row) = rows.next().await? {
        item.viewed_by.insert(row.get::<String>(0)?);
    }
    Ok(item)
}

/// One judge with its ignore set.
pub(crate) async fn load_judge(conn: &libsql::Connection, id: &str) -> Result<Judge, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {JUDGE_COLUMNS} FROM judges WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("judge", id))?;
    let mut judge = row_to_judge(&row)?;
    drop(rows);

    let mut rows = conn
        .query("SELECT item_id FROM ignores WHERE judge_id = ?1", [id])
        .await?;
    while let Some(row) = rows.next().await? {
        judge.ignore.insert(row.get::<String>(0)?);
    }
    Ok(judge)
}

/// All judges with their ignore sets, in creation order.
pub(crate) async fn load_judges(conn: &libsql::Connection) -> Result<Vec<Judge>, DatabaseError> {
    let mut judges = Vec::new();
    let mut rows = conn
        .query(
            &format!("SELECT {JUDGE_COLUMNS} FROM judges ORDER BY rowid"),
            (),
        )
        .await?;
    while let Some(row) = rows.next().await? {
        judges.push(row_to_judge(&row)?);
    }
    drop(rows);

    let mut ignored: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut rows = conn.query("SELECT judge_id, item_id FROM ignores", ()).await?;
    while let Some(row) = rows.next().await? {
        ignored
            .entry(row.get::<String>(0)?)
            .or_default()
            .insert(row.get::<String>(1)?);
    }

    for judge in &mut judges {
        if let Some(set) = ignored.remove(&judge.id) {
            judge.ignore = set;
        }
    }
    Ok(judges)
}

/// Live assignments of every judge that currently has a `next`.
pub(crate) async fn load_slots(conn: &libsql::Connection) -> Result<Vec<JudgeSlot>, DatabaseError> {
    let mut slots = Vec::new();
    let mut rows = conn
        .query(
            "SELECT id, active, next_id, updated_at FROM judges WHERE next_id IS NOT NULL",
            (),
        )
        .await?;
    while let Some(row) = rows.next().await? {
        slots.push(JudgeSlot {
            judge_id: row.get::<String>(0)?,
            active: get_bool(&row, 1)?,
            next: get_opt_string(&row, 2)?,
            updated_at: parse_optional_datetime(get_opt_string(&row, 3)?.as_deref())?,
        });
    }
    Ok(slots)
}

/// Everything a transition for `judge_id` reads, as of one point in time.
///
/// The reads share a deferred transaction so that a concurrent commit (an
/// item deletion, say) is either fully visible or not at all. The read
/// transaction is closed before returning; the connection is free for the
/// commit that follows.
pub(crate) async fn load_snapshot(
    conn: &libsql::Connection,
    judge_id: &str,
    params: &RankingParams,
) -> Result<Snapshot, DatabaseError> {
    let tx = conn.transaction().await?;
    match read_snapshot(&tx, judge_id, params).await {
        Ok(snapshot) => {
            tx.commit().await?;
            Ok(snapshot)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(error = %rollback, "Rollback of snapshot read failed");
            }
            Err(error)
        }
    }
}

async fn read_snapshot(
    conn: &libsql::Connection,
    judge_id: &str,
    params: &RankingParams,
) -> Result<Snapshot, DatabaseError> {
    let now = Utc::now();
    let judge = load_judge(conn, judge_id).await?;
    let closed = read_closed(conn).await?;
    let items = load_items(conn).await?;
    let slots = load_slots(conn).await?;
    let busy = busy_items(&slots, judge_id, now, params.timeout);

    Ok(Snapshot {
        judge,
        items,
        busy,
        closed,
        now,
    })
}
