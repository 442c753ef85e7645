//! Keyed child list diffing
//!
//! Children of a keyed slot are matched by [`Key`], never by position. The
//! diff reports which keys were added, removed, or moved, so the tree can
//! keep every surviving child's node (and memo cell) untouched.
//!
//! # Example
//!
//! ```rust
//! use indexmap::IndexMap;
//! use memoview_tree::diff::diff_keys;
//! use memoview_tree::Key;
//!
//! let old: IndexMap<Key, ()> = [1, 2, 3].into_iter().map(|k| (Key::from(k), ())).collect();
//! let new: Vec<Key> = [3, 1, 2].into_iter().map(Key::from).collect();
//!
//! let diff = diff_keys(&old, &new);
//! assert!(diff.added.is_empty() && diff.removed.is_empty());
//! assert_eq!(diff.moved, vec![Key::from(3)]);
//! ```

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::id::Key;

/// Result of diffing a keyed child list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyedDiff {
    /// New key order with duplicates dropped
    pub order: Vec<Key>,
    /// Keys not present before
    pub added: Vec<Key>,
    /// Keys no longer present, in old order
    pub removed: Vec<Key>,
    /// Surviving keys that changed relative position (minimal set)
    pub moved: Vec<Key>,
    /// Repeated keys in the new list, ignored after their first occurrence
    pub duplicates: Vec<Key>,
}

impl KeyedDiff {
    /// True when the list has the same keys in the same order
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }
}

/// Diff an existing keyed list against a new key sequence
pub fn diff_keys<V>(old: &IndexMap<Key, V>, new: &[Key]) -> KeyedDiff {
    let mut seen = FxHashSet::default();
    let mut diff = KeyedDiff::default();

    for key in new {
        if seen.insert(key) {
            diff.order.push(key.clone());
        } else {
            diff.duplicates.push(key.clone());
        }
    }

    diff.added = diff
        .order
        .iter()
        .filter(|k| !old.contains_key(*k))
        .cloned()
        .collect();

    diff.removed = old.keys().filter(|k| !seen.contains(k)).cloned().collect();

    // Surviving keys in new order, tagged with their old position. Keys on the
    // longest increasing run of old positions stay put; the rest moved.
    let kept: Vec<(&Key, usize)> = diff
        .order
        .iter()
        .filter_map(|k| old.get_index_of(k).map(|i| (k, i)))
        .collect();
    let positions: Vec<usize> = kept.iter().map(|(_, i)| *i).collect();
    let stable = longest_increasing_mask(&positions);

    diff.moved = kept
        .iter()
        .zip(stable)
        .filter(|(_, stays)| !stays)
        .map(|((k, _), _)| (*k).clone())
        .collect();

    diff
}

/// Mark the members of one longest strictly increasing subsequence
fn longest_increasing_mask(seq: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; seq.len()];

    for (i, &v) in seq.iter().enumerate() {
        let pos = tails.partition_point(|&t| seq[t] < v);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut mask = vec![false; seq.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        mask[i] = true;
        cursor = prev[i];
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old_list(keys: &[i64]) -> IndexMap<Key, ()> {
        keys.iter().map(|&k| (Key::from(k), ())).collect()
    }

    fn keys(keys: &[i64]) -> Vec<Key> {
        keys.iter().map(|&k| Key::from(k)).collect()
    }

    #[test]
    fn test_unchanged() {
        let diff = diff_keys(&old_list(&[1, 2, 3]), &keys(&[1, 2, 3]));
        assert!(diff.is_unchanged());
        assert_eq!(diff.order, keys(&[1, 2, 3]));
    }

    #[test]
    fn test_reorder_moves_minimal_set() {
        let diff = diff_keys(&old_list(&[1, 2, 3]), &keys(&[3, 1, 2]));
        assert_eq!(diff.moved, keys(&[3]));
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());

        let diff = diff_keys(&old_list(&[1, 2, 3, 4]), &keys(&[4, 3, 2, 1]));
        assert_eq!(diff.moved.len(), 3);
    }

    #[test]
    fn test_add_and_remove() {
        let diff = diff_keys(&old_list(&[1, 2, 3]), &keys(&[1, 3, 4]));
        assert_eq!(diff.added, keys(&[4]));
        assert_eq!(diff.removed, keys(&[2]));
        assert!(diff.moved.is_empty());
    }

    #[test]
    fn test_duplicates_dropped() {
        let diff = diff_keys(&old_list(&[]), &keys(&[1, 2, 1, 3, 2]));
        assert_eq!(diff.order, keys(&[1, 2, 3]));
        assert_eq!(diff.duplicates, keys(&[1, 2]));
        assert_eq!(diff.added, keys(&[1, 2, 3]));
    }

    #[test]
    fn test_longest_increasing_mask() {
        assert_eq!(
            longest_increasing_mask(&[2, 0, 1]),
            vec![false, true, true]
        );
        assert!(longest_increasing_mask(&[]).is_empty());
        assert_eq!(
            longest_increasing_mask(&[0, 1, 2]),
            vec![true, true, true]
        );
    }
}
