use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::JudgeCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `jdg judge`.
pub async fn handle(action: &JudgeCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        JudgeCommands::Add { name, email } => {
            let judge = svc
                .create_judge(name, email.as_deref().unwrap_or_default())
                .await?;
            output(&judge, flags.format)
        }
        JudgeCommands::List => output(&svc.list_judges().await?, flags.format),
        JudgeCommands::Get { id } => output(&svc.get_judge(id).await?, flags.format),
        JudgeCommands::Enable { id } => output(&svc.set_judge_active(id, true).await?, flags.format),
        JudgeCommands::Disable { id } => output(&svc.set_judge_active(id, false).await?, flags.format),
        JudgeCommands::Delete { id } => {
            svc.delete_judge(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
