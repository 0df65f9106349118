use clap::Subcommand;

/// Judging window commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SettingsCommands {
    /// Show whether judging is open.
    Show,
    /// Accept judge actions.
    Open,
    /// Refuse judge actions.
    Close,
}
