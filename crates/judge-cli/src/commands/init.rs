use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct InitResponse<'a> {
    database: &'a str,
    items: usize,
    judges: usize,
    closed: bool,
}

/// Handle `jdg init`. Opening the context already created and migrated the
/// database; report what it holds.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let response = InitResponse {
        database: &ctx.config.database.path,
        items: ctx.service.list_items().await?.len(),
        judges: ctx.service.list_judges().await?.len(),
        closed: ctx.service.is_closed().await?,
    };
    output(&response, flags.format)
}
