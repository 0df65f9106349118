use crate::cli::GlobalFlags;
use crate::cli::root_commands::DecisionsArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `jdg decisions`.
pub async fn handle(args: &DecisionsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let decisions = match &args.judge {
        Some(judge_id) => ctx.service.decisions_by_judge(judge_id).await?,
        None => ctx.service.list_decisions().await?,
    };
    output(&decisions, flags.format)
}
