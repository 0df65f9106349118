use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AssignmentState;
use crate::model::Reliability;

/// A human performing comparisons.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Judge {
    pub id: String,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub alpha: f64,
    pub beta: f64,
    /// Items this judge must never be shown again.
    pub ignore: BTreeSet<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    /// Last time `next` was set to an item.
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

impl Judge {
    #[must_use]
    pub const fn reliability(&self) -> Reliability {
        Reliability {
            alpha: self.alpha,
            beta: self.beta,
        }
    }

    #[must_use]
    pub fn assignment(&self) -> Assignment {
        Assignment {
            prev: self.prev.clone(),
            next: self.next.clone(),
        }
    }
}

/// The pair of assignment slots that drives presentation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Assignment {
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl Assignment {
    #[must_use]
    pub const fn state(&self) -> AssignmentState {
        AssignmentState::from_slots(self.prev.is_some(), self.next.is_some())
    }
}
