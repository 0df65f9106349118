use clap::{Subcommand, ValueEnum};

use judge_core::enums::VoteAction;

/// Which item won a comparison.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum VoteChoice {
    /// The previously shown item is better.
    Previous,
    /// The currently shown item is better.
    Current,
    /// Drop the current item without comparing.
    Skip,
}

impl From<VoteChoice> for VoteAction {
    fn from(choice: VoteChoice) -> Self {
        match choice {
            VoteChoice::Previous => Self::Previous,
            VoteChoice::Current => Self::Current,
            VoteChoice::Skip => Self::Skip,
        }
    }
}

/// Commands a judge issues during a session.
#[derive(Clone, Debug, Subcommand)]
pub enum JudgingCommands {
    /// Show the judge's current assignment, assigning a first item if needed.
    Next { judge: String },
    /// Show the judge's assignment without changing it.
    Status { judge: String },
    /// Act on the first item shown.
    Begin {
        judge: String,
        /// The item the judge was shown.
        item: String,
        /// Skip the item instead of continuing.
        #[arg(long)]
        skip: bool,
    },
    /// Compare the current item against the previous one.
    Vote {
        judge: String,
        #[arg(long)]
        prev: String,
        #[arg(long)]
        next: String,
        choice: VoteChoice,
    },
}
