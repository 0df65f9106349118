//! # judge-core
//!
//! Pure computation for crowd pairwise ranking. No IO, no database.
//!
//! This crate provides:
//! - Entity structs for items, judges, and recorded decisions
//! - The Bayesian belief model: the joint skill/reliability update and the
//!   expected information gain of a prospective comparison
//! - Epsilon-greedy candidate selection with injected randomness
//! - Candidate pool filtering and the per-judge assignment planner
//! - Deterministic replay of the decision log and leaderboard ordering

pub mod assignment;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod model;
pub mod pool;
pub mod ranking;
pub mod replay;
pub mod selection;
