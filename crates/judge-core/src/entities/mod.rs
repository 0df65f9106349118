//! Entity structs for items, judges, and decisions.

mod decision;
mod item;
mod judge;

pub use decision::Decision;
pub use item::Item;
pub use judge::{Assignment, Judge};
