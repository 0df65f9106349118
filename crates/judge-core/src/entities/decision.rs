use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One recorded pairwise outcome. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Decision {
    pub id: String,
    pub judge_id: String,
    pub winner_id: String,
    pub loser_id: String,
    pub created_at: DateTime<Utc>,
}
