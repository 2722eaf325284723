//! Session Merge

use rustc_hash::FxHashMap;

use crate::items::{LineItem, ProductId};

/// Reconciles the server-side cart with the local anonymous cart at login.
///
/// Server lines come first and local lines after; duplicate ids collapse
/// to the last occurrence, so a product present in both carts keeps the
/// local line wholesale. Quantities are never summed across the two
/// carts; one copy replaces the other. A summing merge would arguably match
/// user expectation better, but changing that is a product decision;
/// the replacing behavior is pinned by tests.
pub fn merge_session_carts(server: Vec<LineItem>, local: Vec<LineItem>) -> Vec<LineItem> {
    let mut combined = server;
    combined.extend(local);

    dedup_last_wins(combined)
}

/// Collapses duplicate ids, keeping the last occurrence's line at the
/// first occurrence's position.
pub(crate) fn dedup_last_wins(lines: Vec<LineItem>) -> Vec<LineItem> {
    let mut deduped: Vec<LineItem> = Vec::with_capacity(lines.len());
    let mut positions: FxHashMap<ProductId, usize> = FxHashMap::default();

    for line in lines {
        if let Some(&position) = positions.get(&line.id) {
            if let Some(kept) = deduped.get_mut(position) {
                *kept = line;
            }
        } else {
            positions.insert(line.id.clone(), deduped.len());
            deduped.push(line);
        }
    }

    deduped
}
