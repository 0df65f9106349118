//! Repository modules for administrative and read operations.
//!
//! Each module adds methods to `JudgeService` via `impl JudgeService` blocks.

pub mod decision;
pub mod item;
pub mod judge;
pub mod setting;
pub mod standings;
