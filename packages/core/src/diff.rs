//! Keyed-list matching primitives shared by the general reconciler
//! ([`crate::mount`]) and the fast-lane ([`crate::fastlane`]).
//!
//! Matching children and minimizing the resulting moves are the two pieces
//! of keyed reconciliation that don't depend on whether the caller is
//! walking a single diff or batching many lists through the fast-lane, so
//! they live here once rather than being duplicated. [`match_children`] is
//! the primitive both [`crate::mount::diff_keyed`] and
//! [`match_keyed_children`] build on: keyed children match by key, and any
//! unkeyed child sitting alongside them matches positionally against the
//! other unkeyed children, independently of the keyed ones. The
//! move-minimization step is built on the `longest-increasing-subsequence`
//! crate: children whose old index already appears in increasing order
//! relative to their neighbors don't need to move, and everything outside
//! that subsequence gets a single `MoveBefore`.

use crate::nodes::{NodeKey, VNode};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Matches each item in `new_keys` against `old_keys` by position. A `Some`
/// key matches the old item with the same key, if any; a `None` key matches
/// the next not-yet-claimed `None` item in `old_keys`, in order. The two
/// kinds never compete with each other: a new keyed item can't claim an old
/// unkeyed slot and vice versa, so inserting or removing a keyed item never
/// displaces an unkeyed sibling's identity.
pub fn match_children<'a>(
    old_keys: impl Iterator<Item = Option<&'a NodeKey>>,
    new_keys: impl Iterator<Item = Option<&'a NodeKey>>,
) -> Vec<Option<usize>> {
    let mut by_key: FxHashMap<&NodeKey, usize> = FxHashMap::default();
    let mut unkeyed_old: VecDeque<usize> = VecDeque::new();
    for (i, key) in old_keys.enumerate() {
        match key {
            Some(key) => {
                by_key.insert(key, i);
            }
            None => unkeyed_old.push_back(i),
        }
    }

    new_keys
        .map(|key| match key {
            Some(key) => by_key.get(key).copied(),
            None => unkeyed_old.pop_front(),
        })
        .collect()
}

/// For each child in `new`, looks up whether `old` had a child with the
/// same key and returns its index there, preserving `new`'s order.
pub fn match_keyed_children(old: &[VNode], new: &[VNode]) -> Vec<Option<usize>> {
    match_children(old.iter().map(VNode::key), new.iter().map(VNode::key))
}

/// Returns the positions within `matched_old_indices` (not the old indices
/// themselves) that form the longest run already in increasing order -
/// i.e. the children that can stay where they are. Every other position
/// needs a `MoveBefore`.
pub fn stationary_positions(matched_old_indices: &[usize]) -> Vec<usize> {
    longest_increasing_subsequence::lis(matched_old_indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::VElement;

    fn keyed(key: &str) -> VNode {
        VNode::Element(VElement::new("li").with_key(key))
    }

    fn unkeyed() -> VNode {
        VNode::Element(VElement::new("li"))
    }

    #[test]
    fn match_keyed_children_finds_reused_and_new() {
        let old = vec![keyed("a"), keyed("b"), keyed("c")];
        let new = vec![keyed("c"), keyed("a"), keyed("d")];

        let matches = match_keyed_children(&old, &new);
        assert_eq!(matches, vec![Some(2), Some(0), None]);
    }

    #[test]
    fn unkeyed_siblings_match_positionally_among_themselves() {
        // old: [unkeyed@0, keyed(a)@1, unkeyed@2]
        // new: [keyed(a), unkeyed, unkeyed]
        // The keyed child matches by key regardless of position; the two
        // unkeyed new children claim the two unkeyed old slots in order,
        // never the keyed one.
        let old = vec![unkeyed(), keyed("a"), unkeyed()];
        let new = vec![keyed("a"), unkeyed(), unkeyed()];

        let matches = match_children(old.iter().map(VNode::key), new.iter().map(VNode::key));
        assert_eq!(matches, vec![Some(1), Some(0), Some(2)]);
    }

    #[test]
    fn stationary_positions_minimizes_moves() {
        // new order reuses old indices 0, 2, 1, 3 -> index 1 (value 2) is the
        // one child out of increasing order and must move.
        let matched = vec![0, 2, 1, 3];
        let stationary = stationary_positions(&matched);
        assert_eq!(stationary, vec![0, 1, 3]);
    }
}
