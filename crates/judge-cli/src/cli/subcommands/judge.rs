use clap::Subcommand;

/// Judge administration commands.
#[derive(Clone, Debug, Subcommand)]
pub enum JudgeCommands {
    /// Register a judge at the prior reliability.
    Add {
        name: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// List judges.
    List,
    /// Get a judge by ID.
    Get { id: String },
    /// Allow a judge to act again.
    Enable { id: String },
    /// Refuse every action from a judge.
    Disable { id: String },
    /// Delete a judge and its decisions.
    Delete { id: String },
}
