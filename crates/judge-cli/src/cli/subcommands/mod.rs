mod item;
mod judge;
mod judging;
mod settings;

pub use item::ItemCommands;
pub use judge::JudgeCommands;
pub use judging::{JudgingCommands, VoteChoice};
pub use settings::SettingsCommands;
