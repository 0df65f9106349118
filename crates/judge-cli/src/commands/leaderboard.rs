use crate::cli::GlobalFlags;
use crate::cli::root_commands::LeaderboardArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `jdg leaderboard`.
pub async fn handle(args: &LeaderboardArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if args.judges {
        output(&ctx.service.judge_summary().await?, flags.format)
    } else {
        output(&ctx.service.leaderboard().await?, flags.format)
    }
}
