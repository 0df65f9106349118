use anyhow::bail;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReplayArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `jdg replay`.
pub async fn handle(args: &ReplayArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !(args.tolerance.is_finite() && args.tolerance >= 0.0) {
        bail!("--tolerance must be a non-negative number, got {}", args.tolerance);
    }
    let report = if args.apply {
        ctx.service.apply_replay(args.tolerance).await?
    } else {
        ctx.service.replay_report(args.tolerance).await?
    };
    output(&report, flags.format)
}
