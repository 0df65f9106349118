use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SettingsCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `jdg settings`.
pub async fn handle(
    action: &SettingsCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SettingsCommands::Show => {}
        SettingsCommands::Open => ctx.service.set_closed(false).await?,
        SettingsCommands::Close => ctx.service.set_closed(true).await?,
    }
    let closed = ctx.service.is_closed().await?;
    output(&json!({ "closed": closed }), flags.format)
}
