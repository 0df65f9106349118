//! Leaderboard ordering.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Decision, Item, Judge};

/// One row of the item leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Standing {
    pub rank: usize,
    pub item_id: String,
    pub name: String,
    pub active: bool,
    pub mu: f64,
    pub sigma_sq: f64,
    /// Decisions this item took part in.
    pub decisions: usize,
    pub views: usize,
    /// Judges who dropped the item without ever viewing it.
    pub skips: usize,
}

/// One row of the judge summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct JudgeStanding {
    pub judge_id: String,
    pub name: String,
    pub active: bool,
    pub alpha: f64,
    pub beta: f64,
    /// Expected probability the judge is attentive.
    pub reliability: f64,
    pub decisions: usize,
}

/// A judge's ignore entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreEntry {
    pub judge_id: String,
    pub item_id: String,
}

/// Items ordered by skill mean, highest first. Ties fall back to name.
#[must_use]
pub fn rank_items(items: &[Item], decisions: &[Decision], ignores: &[IgnoreEntry]) -> Vec<Standing> {
    let mut involvement: HashMap<&str, usize> = HashMap::new();
    for decision in decisions {
        *involvement.entry(decision.winner_id.as_str()).or_default() += 1;
        *involvement.entry(decision.loser_id.as_str()).or_default() += 1;
    }

    let by_id: HashMap<&str, &Item> = items.iter().map(|i| (i.id.as_str(), i)).collect();
    let mut skips: HashMap<&str, usize> = HashMap::new();
    for entry in ignores {
        let viewed = by_id
            .get(entry.item_id.as_str())
            .is_some_and(|item| item.viewed_by.contains(&entry.judge_id));
        if !viewed {
            *skips.entry(entry.item_id.as_str()).or_default() += 1;
        }
    }

    let mut ordered: Vec<&Item> = items.iter().collect();
    ordered.sort_by(|a, b| b.mu.total_cmp(&a.mu).then_with(|| a.name.cmp(&b.name)));

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, item)| Standing {
            rank: index + 1,
            item_id: item.id.clone(),
            name: item.name.clone(),
            active: item.active,
            mu: item.mu,
            sigma_sq: item.sigma_sq,
            decisions: involvement.get(item.id.as_str()).copied().unwrap_or_default(),
            views: item.view_count(),
            skips: skips.get(item.id.as_str()).copied().unwrap_or_default(),
        })
        .collect()
}

/// Judges with their decision counts, most prolific first.
#[must_use]
pub fn summarize_judges(judges: &[Judge], decisions: &[Decision]) -> Vec<JudgeStanding> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for decision in decisions {
        *counts.entry(decision.judge_id.as_str()).or_default() += 1;
    }

    let mut rows: Vec<JudgeStanding> = judges
        .iter()
        .map(|judge| JudgeStanding {
            judge_id: judge.id.clone(),
            name: judge.name.clone(),
            active: judge.active,
            alpha: judge.alpha,
            beta: judge.beta,
            reliability: judge.reliability().mean(),
            decisions: counts.get(judge.id.as_str()).copied().unwrap_or_default(),
        })
        .collect();
    rows.sort_by(|a, b| b.decisions.cmp(&a.decisions).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Spearman rank correlation between two orderings of the same ids.
///
/// Returns `None` when fewer than two ids are shared.
#[must_use]
pub fn rank_correlation(left: &[String], right: &[String]) -> Option<f64> {
    let positions: HashMap<&str, usize> = right
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let pairs: Vec<(usize, usize)> = left
        .iter()
        .filter_map(|id| positions.get(id.as_str()).copied())
        .enumerate()
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    // Re-rank the right positions among the shared ids.
    let mut order: Vec<usize> = (0..pairs.len()).collect();
    order.sort_by_key(|&i| pairs[i].1);
    let mut right_rank = vec![0_usize; pairs.len()];
    for (rank, &i) in order.iter().enumerate() {
        right_rank[i] = rank;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = pairs.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let d_sq: f64 = pairs
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let d = i as f64 - right_rank[i] as f64;
            d * d
        })
        .sum();
    Some(1.0 - 6.0 * d_sq / (n * (n * n - 1.0)))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn item(id: &str, mu: f64) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_uppercase(),
            description: String::new(),
            active: true,
            prioritized: false,
            mu,
            sigma_sq: 1.0,
            viewed_by: BTreeSet::new(),
            version: 1,
            created_at: Utc::now(),
        }
    }

    fn decision(judge: &str, winner: &str, loser: &str) -> Decision {
        Decision {
            id: format!("dec-{winner}{loser}"),
            judge_id: judge.to_string(),
            winner_id: winner.to_string(),
            loser_id: loser.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn items_are_ordered_by_mean() {
        let items = vec![item("a", -0.5), item("b", 1.2), item("c", 0.3)];
        let standings = rank_items(&items, &[], &[]);
        let order: Vec<_> = standings.iter().map(|s| s.item_id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[2].rank, 3);
    }

    #[test]
    fn counts_decisions_views_and_skips() {
        let mut items = vec![item("a", 0.0), item("b", 0.0)];
        items[0].viewed_by.insert("j1".to_string());
        let decisions = vec![decision("j1", "a", "b"), decision("j2", "b", "a")];
        let ignores = vec![
            IgnoreEntry {
                judge_id: "j1".to_string(),
                item_id: "a".to_string(),
            },
            IgnoreEntry {
                judge_id: "j2".to_string(),
                item_id: "a".to_string(),
            },
        ];

        let standings = rank_items(&items, &decisions, &ignores);
        let a = standings.iter().find(|s| s.item_id == "a").unwrap();
        assert_eq!((a.decisions, a.views, a.skips), (2, 1, 1));
    }

    #[test]
    fn judges_sorted_by_activity() {
        let judge = |id: &str| Judge {
            id: id.to_string(),
            name: id.to_string(),
            email: String::new(),
            active: true,
            alpha: 10.0,
            beta: 1.0,
            ignore: BTreeSet::new(),
            prev: None,
            next: None,
            updated_at: None,
            version: 0,
            created_at: Utc::now(),
        };
        let rows = summarize_judges(
            &[judge("j1"), judge("j2")],
            &[decision("j2", "a", "b"), decision("j2", "b", "c")],
        );
        assert_eq!(rows[0].judge_id, "j2");
        assert_eq!(rows[0].decisions, 2);
        assert_eq!(rows[1].decisions, 0);
    }

    #[test]
    fn rank_correlation_bounds() {
        let ids = |v: &[&str]| v.iter().map(ToString::to_string).collect::<Vec<_>>();
        let forward = ids(&["a", "b", "c", "d"]);
        let reverse = ids(&["d", "c", "b", "a"]);
        assert!((rank_correlation(&forward, &forward).unwrap() - 1.0).abs() < 1e-12);
        assert!((rank_correlation(&forward, &reverse).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(rank_correlation(&forward[..1], &forward), None);
    }
}
