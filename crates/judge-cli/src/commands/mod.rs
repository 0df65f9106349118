pub mod decisions;
pub mod dispatch;
pub mod init;
pub mod item;
pub mod judge;
pub mod judging;
pub mod leaderboard;
pub mod replay;
pub mod settings;
pub mod simulate;
