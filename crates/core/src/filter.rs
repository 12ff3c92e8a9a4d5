//! Visibility filtering
//!
//! Decides paint/skip per block from the currently visible category set.
//! Raw type strings collapse to a closed set of effective categories so a
//! single "Table" layer switch hides table bodies, captions, and
//! footnotes together.

use std::collections::HashSet;

/// Sentinel category key that makes every block visible.
pub const SHOW_ALL: &str = "all";

/// The canonical top-level category a raw type string collapses to.
///
/// Any type beginning with `table` maps to `table`, any type beginning
/// with `image` maps to `image`; every other type is its own category.
pub fn effective_category(block_type: &str) -> &str {
    if block_type.starts_with("table") {
        "table"
    } else if block_type.starts_with("image") {
        "image"
    } else {
        block_type
    }
}

/// A block is visible iff its effective category is in the visible set,
/// or the set contains the [`SHOW_ALL`] sentinel.
pub fn is_visible(block_type: &str, visible: &HashSet<String>) -> bool {
    visible.contains(effective_category(block_type)) || visible.contains(SHOW_ALL)
}
