use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Init => commands::init::handle(ctx, flags).await,
        Commands::Item { action } => commands::item::handle(&action, ctx, flags).await,
        Commands::Judge { action } => commands::judge::handle(&action, ctx, flags).await,
        Commands::Judging { action } => commands::judging::handle(&action, ctx, flags).await,
        Commands::Leaderboard(args) => commands::leaderboard::handle(&args, ctx, flags).await,
        Commands::Decisions(args) => commands::decisions::handle(&args, ctx, flags).await,
        Commands::Settings { action } => commands::settings::handle(&action, ctx, flags).await,
        Commands::Replay(args) => commands::replay::handle(&args, ctx, flags).await,
        Commands::Simulate(_) => unreachable!("simulate is pre-dispatched in main"),
    }
}
