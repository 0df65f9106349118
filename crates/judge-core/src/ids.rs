//! ID prefix constants.
//!
//! IDs are generated in SQL as `{prefix}-{8 hex chars}`, e.g. `itm-a3f8b2c1`.

pub const PREFIX_ITEM: &str = "itm";
pub const PREFIX_JUDGE: &str = "jdg";
pub const PREFIX_DECISION: &str = "dec";

pub const ALL_PREFIXES: &[&str] = &[PREFIX_ITEM, PREFIX_JUDGE, PREFIX_DECISION];

/// Check whether `id` has the shape `{prefix}-{8 hex}`.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|hex| hex.len() == 8 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
