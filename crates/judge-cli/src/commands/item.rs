use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ItemCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `jdg item`.
pub async fn handle(action: &ItemCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        ItemCommands::Add { name, description } => {
            let item = svc
                .create_item(name, description.as_deref().unwrap_or_default())
                .await?;
            output(&item, flags.format)
        }
        ItemCommands::List => output(&svc.list_items().await?, flags.format),
        ItemCommands::Get { id } => output(&svc.get_item(id).await?, flags.format),
        ItemCommands::Enable { id } => output(&svc.set_item_active(id, true).await?, flags.format),
        ItemCommands::Disable { id } => output(&svc.set_item_active(id, false).await?, flags.format),
        ItemCommands::Prioritize { id, cancel } => {
            output(&svc.set_item_prioritized(id, !cancel).await?, flags.format)
        }
        ItemCommands::Delete { id } => {
            svc.delete_item(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
