//! Enumerating the keys of a mapping node

use crate::core::node::Node;
use std::collections::BTreeSet;

/// Distinct scalar keys present in a mapping node
///
/// Non-scalar keys are skipped. Any node that is not a mapping has no keys.
pub fn present_keys(mapping: &Node) -> BTreeSet<String> {
    mapping
        .entries()
        .filter_map(|(key, _)| key.scalar_value())
        .map(str::to_string)
        .collect()
}
