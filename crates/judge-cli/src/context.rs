use std::path::Path;

use anyhow::Context;
use judge_config::JudgeConfig;
use judge_db::service::JudgeService;

use crate::cli::GlobalFlags;

/// Load layered configuration, applying the `--db` override.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<JudgeConfig> {
    let mut config = JudgeConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(path) = &flags.db {
        config.database.path.clone_from(path);
        config.validate().context("invalid --db path")?;
    }
    Ok(config)
}

/// Shared resources for command handlers.
pub struct AppContext {
    pub service: JudgeService,
    pub config: JudgeConfig,
}

impl AppContext {
    /// Open the configured database, creating its directory if needed.
    pub async fn init(config: JudgeConfig) -> anyhow::Result<Self> {
        ensure_parent_dir(Path::new(&config.database.path))?;
        let service = JudgeService::open(&config)
            .await
            .with_context(|| format!("failed to open {}", config.database.path))?;
        Ok(Self { service, config })
    }
}

pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
