//! Assignment states, judge actions, and selection kinds.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AssignmentState
// ---------------------------------------------------------------------------

/// Where a judge sits in the assignment state machine.
///
/// ```text
/// uninitialized ──init──→ begin ──continue──→ steady ──vote/skip──→ steady
///       ↑                   │                   │
///       └──────skip─────────┘←────pool empty────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentState {
    /// No item assigned. Surfaced to judges as "waiting".
    Uninitialized,
    /// First item assigned, nothing to compare against yet.
    Begin,
    /// Comparing `next` against `prev`.
    Steady,
}

impl AssignmentState {
    /// Derive the state from the assignment slots.
    #[must_use]
    pub const fn from_slots(has_prev: bool, has_next: bool) -> Self {
        match (has_prev, has_next) {
            (_, false) => Self::Uninitialized,
            (false, true) => Self::Begin,
            (true, true) => Self::Steady,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Begin => "begin",
            Self::Steady => "steady",
        }
    }
}

impl fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BeginAction
// ---------------------------------------------------------------------------

/// Action available on the very first item a judge sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BeginAction {
    Continue,
    Skip,
}

impl BeginAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for BeginAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VoteAction
// ---------------------------------------------------------------------------

/// Outcome a judge submits when comparing `next` against `prev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VoteAction {
    /// The previously shown item wins.
    Previous,
    /// The currently shown item wins.
    Current,
    /// Conflict of interest or unable to judge; the current item is dropped.
    Skip,
}

impl VoteAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Previous => "previous",
            Self::Current => "current",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for VoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pick
// ---------------------------------------------------------------------------

/// Which branch of the selector produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Pick {
    /// No reference item, uniform choice.
    Random,
    /// Exploration draw fired, uniform choice.
    Explore,
    /// Maximum expected information gain.
    Greedy,
}

impl Pick {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Explore => "explore",
            Self::Greedy => "greedy",
        }
    }
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
