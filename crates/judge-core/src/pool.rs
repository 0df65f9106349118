//! Candidate pool computation.
//!
//! Filters are applied in a fixed order, each with its own fallback:
//!
//! 1. active items the judge has not ignored
//! 2. prioritized items only, if there are any
//! 3. drop items currently assigned to another active judge, unless that
//!    empties the pool
//! 4. prefer items seen by fewer than `min_views` judges, if there are any

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Item, Judge};

/// Another judge's live assignment, as far as the busy check cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeSlot {
    pub judge_id: String,
    pub active: bool,
    pub next: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Judge> for JudgeSlot {
    fn from(judge: &Judge) -> Self {
        Self {
            judge_id: judge.id.clone(),
            active: judge.active,
            next: judge.next.clone(),
            updated_at: judge.updated_at,
        }
    }
}

/// Items assigned to some other active judge within `timeout` of `now`.
#[must_use]
pub fn busy_items(
    slots: &[JudgeSlot],
    requesting_judge: &str,
    now: DateTime<Utc>,
    timeout: Duration,
) -> BTreeSet<String> {
    slots
        .iter()
        .filter(|slot| slot.active && slot.judge_id != requesting_judge)
        .filter_map(|slot| {
            let next = slot.next.as_ref()?;
            let updated_at = slot.updated_at?;
            (now - updated_at < timeout).then(|| next.clone())
        })
        .collect()
}

/// Items the judge may be shown next. Possibly empty.
#[must_use]
pub fn candidate_pool<'a>(
    items: &'a [Item],
    ignore: &BTreeSet<String>,
    busy: &BTreeSet<String>,
    min_views: usize,
) -> Vec<&'a Item> {
    let available: Vec<&Item> = items
        .iter()
        .filter(|item| item.active && !ignore.contains(&item.id))
        .collect();

    let prioritized: Vec<&Item> = available.iter().copied().filter(|i| i.prioritized).collect();
    let pool = if prioritized.is_empty() {
        available
    } else {
        prioritized
    };

    let idle: Vec<&Item> = pool
        .iter()
        .copied()
        .filter(|item| !busy.contains(&item.id))
        .collect();
    let pool = if idle.is_empty() { pool } else { idle };

    let less_seen: Vec<&Item> = pool
        .iter()
        .copied()
        .filter(|item| item.view_count() < min_views)
        .collect();
    if less_seen.is_empty() { pool } else { less_seen }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            active: true,
            prioritized: false,
            mu: 0.0,
            sigma_sq: 1.0,
            viewed_by: BTreeSet::new(),
            version: 0,
            created_at: Utc::now(),
        }
    }

    fn ids(pool: &[&Item]) -> Vec<String> {
        pool.iter().map(|i| i.id.clone()).collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn slot(judge: &str, next: &str, minutes_ago: i64) -> JudgeSlot {
        JudgeSlot {
            judge_id: judge.to_string(),
            active: true,
            next: Some(next.to_string()),
            updated_at: Some(Utc::now() - Duration::minutes(minutes_ago)),
        }
    }

    #[test]
    fn inactive_and_ignored_items_are_excluded() {
        let mut items = vec![item("x"), item("y"), item("z")];
        items[1].active = false;
        let pool = candidate_pool(&items, &set(&["z"]), &BTreeSet::new(), 2);
        assert_eq!(ids(&pool), vec!["x"]);
    }

    #[test]
    fn prioritized_items_win_when_present() {
        let mut items = vec![item("x"), item("y"), item("z")];
        items[2].prioritized = true;
        let pool = candidate_pool(&items, &BTreeSet::new(), &BTreeSet::new(), 2);
        assert_eq!(ids(&pool), vec!["z"]);
    }

    #[test]
    fn ignored_prioritized_item_does_not_restrict() {
        let mut items = vec![item("x"), item("y")];
        items[1].prioritized = true;
        let pool = candidate_pool(&items, &set(&["y"]), &BTreeSet::new(), 2);
        assert_eq!(ids(&pool), vec!["x"]);
    }

    #[test]
    fn busy_items_are_avoided() {
        let items = vec![item("x"), item("y"), item("z")];
        let pool = candidate_pool(&items, &BTreeSet::new(), &set(&["x", "y"]), 2);
        assert_eq!(ids(&pool), vec!["z"]);
    }

    #[test]
    fn all_busy_falls_back_to_pre_filter_set() {
        let items = vec![item("x"), item("y"), item("z")];
        let pool = candidate_pool(&items, &set(&["z"]), &set(&["x", "y", "z"]), 2);
        assert_eq!(ids(&pool), vec!["x", "y"]);
    }

    #[test]
    fn all_busy_and_nothing_available_is_empty() {
        let items = vec![item("x")];
        let pool = candidate_pool(&items, &set(&["x"]), &set(&["x"]), 2);
        assert!(pool.is_empty());
    }

    #[test]
    fn less_seen_items_are_preferred() {
        let mut items = vec![item("x"), item("y")];
        items[0].viewed_by = set(&["j1", "j2"]);
        let pool = candidate_pool(&items, &BTreeSet::new(), &BTreeSet::new(), 2);
        assert_eq!(ids(&pool), vec!["y"]);

        items[1].viewed_by = set(&["j1", "j2", "j3"]);
        let pool = candidate_pool(&items, &BTreeSet::new(), &BTreeSet::new(), 2);
        assert_eq!(ids(&pool), vec!["x", "y"]);
    }

    #[test]
    fn busy_set_respects_timeout_and_activity() {
        let now = Utc::now();
        let mut stale = slot("j2", "y", 10);
        stale.updated_at = Some(now - Duration::minutes(10));
        let mut inactive = slot("j3", "z", 0);
        inactive.active = false;
        let slots = vec![slot("j1", "x", 1), stale, inactive, slot("me", "w", 0)];

        let busy = busy_items(&slots, "me", now, Duration::minutes(5));
        assert_eq!(busy, set(&["x"]));
    }

    #[test]
    fn slot_without_timestamp_is_not_busy() {
        let mut unstamped = slot("j1", "x", 0);
        unstamped.updated_at = None;
        let busy = busy_items(&[unstamped], "me", Utc::now(), Duration::minutes(5));
        assert!(busy.is_empty());
    }
}
