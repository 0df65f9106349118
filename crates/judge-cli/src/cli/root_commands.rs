use clap::{Args, Subcommand};

use crate::cli::subcommands::{ItemCommands, JudgeCommands, JudgingCommands, SettingsCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the judging database if it does not exist.
    Init,
    /// Manage items under review.
    Item {
        #[command(subcommand)]
        action: ItemCommands,
    },
    /// Manage judges.
    Judge {
        #[command(subcommand)]
        action: JudgeCommands,
    },
    /// Act as a judge: fetch, continue, skip, and vote.
    Judging {
        #[command(subcommand)]
        action: JudgingCommands,
    },
    /// Items ranked by estimated skill.
    Leaderboard(LeaderboardArgs),
    /// The decision log, oldest first.
    Decisions(DecisionsArgs),
    /// Open or close the judging window.
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Recompute beliefs from the decision log and report drift.
    Replay(ReplayArgs),
    /// Run simulated judges against a scratch database.
    Simulate(SimulateArgs),
}

#[derive(Clone, Debug, Args)]
pub struct LeaderboardArgs {
    /// Show the judge summary instead of items.
    #[arg(long)]
    pub judges: bool,
}

#[derive(Clone, Debug, Args)]
pub struct DecisionsArgs {
    /// Only decisions made by this judge.
    #[arg(long)]
    pub judge: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ReplayArgs {
    /// Overwrite drifted beliefs with their replayed values.
    #[arg(long)]
    pub apply: bool,
    /// Relative tolerance when comparing beliefs.
    #[arg(long, default_value_t = judge_db::replay::DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}

#[derive(Clone, Debug, Args)]
pub struct SimulateArgs {
    /// Number of items with hidden skills.
    #[arg(long, default_value_t = 20)]
    pub items: usize,
    /// Number of concurrent judges.
    #[arg(long, default_value_t = 5)]
    pub judges: usize,
    /// Actions each judge submits before stopping.
    #[arg(long, default_value_t = 40)]
    pub actions: usize,
    /// Probability that a simulated judge pays attention.
    #[arg(long, default_value_t = 0.9)]
    pub attentiveness: f64,
    /// Seed for reproducible hidden skills and judge behavior.
    #[arg(long)]
    pub seed: Option<u64>,
}
