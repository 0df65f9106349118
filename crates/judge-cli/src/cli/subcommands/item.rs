use clap::Subcommand;

/// Item administration commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ItemCommands {
    /// Add an item at the prior belief.
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List items.
    List,
    /// Get an item by ID.
    Get { id: String },
    /// Make an item eligible for assignment again.
    Enable { id: String },
    /// Stop assigning an item and stop recording comparisons against it.
    Disable { id: String },
    /// Show an item before anything else until it is next assigned.
    Prioritize {
        id: String,
        /// Remove the priority flag instead.
        #[arg(long)]
        cancel: bool,
    },
    /// Delete an item and every decision that involves it.
    Delete { id: String },
}
