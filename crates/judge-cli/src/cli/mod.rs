use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `jdg` binary.
#[derive(Debug, Parser)]
#[command(name = "jdg", version, about = "Crowd pairwise judging and ranking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Database file (defaults to `database.path` from config)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::subcommands::{ItemCommands, JudgingCommands, VoteChoice};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["jdg", "--format", "table", "--verbose", "leaderboard"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Leaderboard(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["jdg", "leaderboard", "--format", "raw", "--db", "x.db"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert_eq!(cli.global_flags().db.as_deref(), Some("x.db"));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["jdg", "--format", "xml", "leaderboard"]).is_err());
    }

    #[test]
    fn item_add_takes_name_and_description() {
        let cli = Cli::try_parse_from(["jdg", "item", "add", "Rocket", "--description", "Goes up"])
            .expect("cli should parse");
        let Commands::Item {
            action: ItemCommands::Add { name, description },
        } = cli.command
        else {
            panic!("expected item add");
        };
        assert_eq!(name, "Rocket");
        assert_eq!(description.as_deref(), Some("Goes up"));
    }

    #[test]
    fn vote_requires_both_items() {
        let cli = Cli::try_parse_from([
            "jdg", "judging", "vote", "jdg-1", "--prev", "itm-1", "--next", "itm-2", "current",
        ])
        .expect("cli should parse");
        let Commands::Judging {
            action: JudgingCommands::Vote { choice, prev, next, .. },
        } = cli.command
        else {
            panic!("expected judging vote");
        };
        assert_eq!(choice, VoteChoice::Current);
        assert_eq!((prev.as_str(), next.as_str()), ("itm-1", "itm-2"));

        assert!(
            Cli::try_parse_from(["jdg", "judging", "vote", "jdg-1", "--prev", "itm-1", "current"])
                .is_err()
        );
    }

    #[test]
    fn simulate_has_defaults() {
        let cli = Cli::try_parse_from(["jdg", "simulate"]).expect("cli should parse");
        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.items, 20);
        assert_eq!(args.judges, 5);
        assert!(args.seed.is_none());
    }
}
