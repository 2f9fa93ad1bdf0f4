//! Fast-lane: bulk-commit optimizations for two unrelated shapes of
//! large, uniform child-list updates.
//!
//! [`try_fastlane`] is the gate [`crate::mount::diff_children`] calls
//! before falling through to the general keyed path
//! (`longest-increasing-subsequence`-based, same as [`crate::diff`]) -
//! large keyed reorders, gated by `fastlane_threshold`. [`try_bulk_text`]
//! is the other mode: a same-length, non-keyed list where nothing moves
//! and every change (if any) is confined to attrs/text content, gated by
//! the much smaller `bulk_text_threshold` since it has no moves to
//! minimize - it only skips the general path's per-child structural
//! re-checks. Both gates decide eligibility completely before emitting
//! anything, so a failing condition never leaves a half-applied batch
//! behind.

use crate::arena::ElementId;
use crate::config::RuntimeConfig;
use crate::diff::stationary_positions;
use crate::mount::Mounted;
use crate::mutations::{Mutation, MutationList};
use crate::nodes::{AttributeValue, VAttribute, VElement, VNode};
use rustc_hash::FxHashMap;
use std::collections::HashSet;

/// Counters surfaced for diagnostics in dev builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastlaneStats {
    pub items_processed: usize,
    pub items_reused: usize,
    pub commits: usize,
}

/// Attempts the bulk path for a keyed child list. On success, `old` is
/// reordered in place to match `new` and the necessary `MoveBefore`/
/// `SetAttribute`/`SetText` edits are appended to `out`; returns `None|
/// without touching `old` or `out` at all if any gating condition fails.
pub(crate) fn try_fastlane(
    config: &RuntimeConfig,
    out: &mut MutationList,
    parent: ElementId,
    old: &mut Vec<Mounted>,
    new: &[VNode],
) -> Option<FastlaneStats> {
    if new.len() < config.fastlane_threshold || old.len() != new.len() {
        return None;
    }

    let tag = match old.first()? {
        Mounted::Element { tag, .. } => tag.clone(),
        _ => return None,
    };
    if !old
        .iter()
        .all(|m| matches!(m, Mounted::Element { tag: t, .. } if *t == tag))
    {
        return None;
    }
    if !new
        .iter()
        .all(|n| matches!(n, VNode::Element(e) if e.tag == tag))
    {
        return None;
    }

    // Every child must be keyed and every key must be used exactly once on
    // both sides - a bijective match, not just "mostly matched" (insertions
    // and removals are structural changes the general path must handle).
    let mut by_key = FxHashMap::default();
    for (i, m) in old.iter().enumerate() {
        let key = m.key()?;
        if by_key.insert(key.clone(), i).is_some() {
            return None;
        }
    }
    let mut matched = Vec::with_capacity(new.len());
    let mut used = vec![false; old.len()];
    for n in new {
        let key = n.key()?;
        let old_i = *by_key.get(key)?;
        if used[old_i] {
            return None;
        }
        used[old_i] = true;
        matched.push(old_i);
    }

    // Gate (c): prop/child differences must be limited to `data-*`
    // attributes and a single direct text child's content - anything else
    // (a structural attribute, a handler, nested element children) falls
    // back to the general algorithm.
    for (new_i, &old_i) in matched.iter().enumerate() {
        let new_el = match &new[new_i] {
            VNode::Element(e) => e,
            _ => return None,
        };
        let (old_attrs, old_children) = match &old[old_i] {
            Mounted::Element { attrs, children, .. } => (attrs, children),
            _ => return None,
        };
        if !compatible(old_attrs, old_children, new_el) {
            return None;
        }
    }

    // Eligible. Compute the minimal move set exactly like the general keyed
    // path, then update attrs/text in place before reordering storage.
    let stationary: HashSet<usize> = stationary_positions(&matched).into_iter().collect();
    for (new_i, &old_i) in matched.iter().enumerate() {
        let new_el = match &new[new_i] {
            VNode::Element(e) => e,
            _ => unreachable!("checked above"),
        };
        apply_updates(out, &mut old[old_i], new_el);
    }

    let mut next_anchor: Option<ElementId> = None;
    for i in (0..new.len()).rev() {
        let root = old[matched[i]].anchor_id();
        if !stationary.contains(&i) {
            out.edits.push(Mutation::MoveBefore {
                parent,
                child: root,
                before: next_anchor,
            });
        }
        next_anchor = Some(root);
    }

    let mut slots: Vec<Option<Mounted>> = old.drain(..).map(Some).collect();
    let mut reordered = Vec::with_capacity(new.len());
    for &old_i in &matched {
        reordered.push(slots[old_i].take().expect("matched index used exactly once"));
    }
    *old = reordered;

    Some(FastlaneStats {
        items_processed: new.len(),
        items_reused: new.len(),
        commits: 1,
    })
}

/// Attempts the bulk-text path for a same-length, non-keyed child list.
/// Unlike [`try_fastlane`], there is no reordering to compute here - every
/// child keeps its position - so eligibility only needs the same
/// tag/attrs/single-text-child shape check [`try_fastlane`] uses, reused
/// verbatim via [`compatible`]. On success every position's attrs/text are
/// brought up to date in place and `out` gains the necessary
/// `SetAttribute`/`SetText` edits; returns `None` without touching `out` at
/// all if any gating condition fails, so the caller can fall through to
/// [`crate::mount::diff_positional`]'s general per-child loop.
pub(crate) fn try_bulk_text(
    config: &RuntimeConfig,
    out: &mut MutationList,
    old: &mut [Mounted],
    new: &[VNode],
) -> Option<()> {
    if old.len() != new.len() || new.len() < config.bulk_text_threshold {
        return None;
    }

    let tag = match old.first()? {
        Mounted::Element { tag, .. } => tag.clone(),
        _ => return None,
    };
    if !old
        .iter()
        .all(|m| matches!(m, Mounted::Element { tag: t, .. } if *t == tag))
    {
        return None;
    }
    if !new
        .iter()
        .all(|n| matches!(n, VNode::Element(e) if e.tag == tag))
    {
        return None;
    }

    for (old_m, new_n) in old.iter().zip(new) {
        let new_el = match new_n {
            VNode::Element(e) => e,
            _ => return None,
        };
        let (old_attrs, old_children) = match old_m {
            Mounted::Element { attrs, children, .. } => (attrs, children),
            _ => return None,
        };
        if !compatible(old_attrs, old_children, new_el) {
            return None;
        }
    }

    // Eligible - every position is a pure attrs/text update, no structural
    // edit or move needed anywhere in the list.
    for (old_m, new_n) in old.iter_mut().zip(new) {
        let new_el = match new_n {
            VNode::Element(e) => e,
            _ => unreachable!("checked above"),
        };
        apply_updates(out, old_m, new_el);
    }

    Some(())
}

fn compatible(old_attrs: &[VAttribute], old_children: &[Mounted], new: &VElement) -> bool {
    if !attrs_compatible(old_attrs, &new.attrs) {
        return false;
    }
    match (old_children, new.children.as_slice()) {
        ([], []) => true,
        ([Mounted::Text { .. }], [VNode::Text(_)]) => true,
        (a, b) if a.is_empty() && b.is_empty() => true,
        _ => false,
    }
}

/// `data-*` attributes may differ freely; every other attribute (structural
/// attrs, event handlers) must compare equal, and the attribute *set* itself
/// may not change shape (adding/removing an attribute is a structural edit).
fn attrs_compatible(old: &[VAttribute], new: &[VAttribute]) -> bool {
    if old.len() != new.len() {
        return false;
    }
    let old_map: FxHashMap<&str, &AttributeValue> =
        old.iter().map(|a| (a.name.as_ref(), &a.value)).collect();
    let new_map: FxHashMap<&str, &AttributeValue> =
        new.iter().map(|a| (a.name.as_ref(), &a.value)).collect();
    if old_map.len() != new_map.len() {
        return false;
    }
    for (name, old_val) in &old_map {
        let Some(new_val) = new_map.get(name) else {
            return false;
        };
        if *old_val == *new_val {
            continue;
        }
        if !name.starts_with("data-") {
            return false;
        }
    }
    true
}

fn apply_updates(out: &mut MutationList, mounted: &mut Mounted, new: &VElement) {
    let Mounted::Element { id, attrs, children, .. } = mounted else {
        unreachable!("checked by compatible()");
    };

    for new_attr in &new.attrs {
        let changed = attrs
            .iter()
            .find(|a| a.name == new_attr.name)
            .map(|old_attr| old_attr.value != new_attr.value)
            .unwrap_or(true);
        if changed {
            out.edits.push(Mutation::SetAttribute {
                id: *id,
                name: new_attr.name.clone(),
                value: new_attr.value.clone(),
            });
        }
    }
    *attrs = new.attrs.clone();

    if let ([Mounted::Text { id: text_id, text }], [VNode::Text(new_text)]) =
        (children.as_mut_slice(), new.children.as_slice())
    {
        if text != new_text {
            out.edits.push(Mutation::SetText {
                id: *text_id,
                value: new_text.to_string(),
            });
            *text = new_text.clone();
        }
    }
}
