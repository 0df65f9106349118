use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::SkillBelief;

/// An entry competing for rank (e.g. a submission under review).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    /// Prioritized items are shown before anything else. Cleared once the
    /// item is assigned to a judge.
    pub prioritized: bool,
    pub mu: f64,
    pub sigma_sq: f64,
    /// Judges who have been shown this item (order irrelevant).
    pub viewed_by: BTreeSet<String>,
    /// Bumped on every belief or `active` change; guards concurrent commits.
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Item {
    #[must_use]
    pub const fn skill(&self) -> SkillBelief {
        SkillBelief {
            mu: self.mu,
            sigma_sq: self.sigma_sq,
        }
    }

    pub const fn set_skill(&mut self, skill: SkillBelief) {
        self.mu = skill.mu;
        self.sigma_sq = skill.sigma_sq;
    }

    #[must_use]
    pub fn view_count(&self) -> usize {
        self.viewed_by.len()
    }
}
