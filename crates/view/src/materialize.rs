//! Full materialization, windowing and diffing.
//!
//! Materialization recomputes a view's filtered sequence from its source's
//! current members. Windowing slices the filtered sequence into the visible
//! one, and diffing compares two visible sequences by cid to produce the
//! minimal set of membership events.

use crate::predicate::PredicateSet;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::ops::Range;
use hashbrown::HashSet;
use prism_core::{Cid, Comparator, Record};

/// Filters and orders `members`.
///
/// Records keep their source order unless a comparator is given, in which
/// case they are stably sorted so ties stay in source order.
pub fn materialize<M: Record>(
    members: Vec<Rc<M>>,
    predicates: &PredicateSet<M>,
    comparator: Option<&Comparator<M>>,
) -> Vec<Rc<M>> {
    let mut filtered: Vec<Rc<M>> = if predicates.is_empty() {
        members
    } else {
        members.into_iter().filter(|r| predicates.test(r)).collect()
    };
    if let Some(comparator) = comparator {
        comparator.sort(&mut filtered);
    }
    filtered
}

/// Returns the visible range of a sequence of `len` records.
///
/// An unset offset is 0 and an unset limit is unbounded. Both ends are
/// clamped to `len`.
pub fn window(len: usize, offset: Option<usize>, limit: Option<usize>) -> Range<usize> {
    let start = offset.unwrap_or(0).min(len);
    let end = match limit {
        Some(limit) => start.saturating_add(limit).min(len),
        None => len,
    };
    start..end
}

/// When a diff reports that the visible order changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortCheck {
    /// Never.
    Never,
    /// When the sequences differ in any way, membership included.
    Sequence,
    /// When records visible both before and after changed relative order.
    Relative,
}

/// Membership events between two visible sequences.
#[derive(Debug)]
pub struct Diff<M> {
    /// Records no longer visible, in previous order.
    pub removed: Vec<Rc<M>>,
    /// Newly visible records, in current order.
    pub added: Vec<Rc<M>>,
    /// Whether the visible order changed. Views announce it with `Sort`
    /// only while a comparator is active.
    pub sorted: bool,
}

impl<M> Default for Diff<M> {
    fn default() -> Self {
        Self {
            removed: Vec::new(),
            added: Vec::new(),
            sorted: false,
        }
    }
}

impl<M> Diff<M> {
    /// Returns true if nothing needs to be published.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && !self.sorted
    }
}

/// Returns the cids of `records`.
pub fn cid_set<M: Record>(records: &[Rc<M>]) -> HashSet<Cid> {
    records.iter().map(|r| r.cid()).collect()
}

/// Diffs two visible sequences by cid.
pub fn diff<M: Record>(
    previous: &[Rc<M>],
    previous_cids: &HashSet<Cid>,
    current: &[Rc<M>],
    current_cids: &HashSet<Cid>,
    check: SortCheck,
) -> Diff<M> {
    let removed: Vec<Rc<M>> = previous
        .iter()
        .filter(|r| !current_cids.contains(&r.cid()))
        .cloned()
        .collect();
    let added: Vec<Rc<M>> = current
        .iter()
        .filter(|r| !previous_cids.contains(&r.cid()))
        .cloned()
        .collect();

    let sorted = match check {
        SortCheck::Never => false,
        SortCheck::Sequence => {
            previous.len() != current.len()
                || previous.iter().zip(current).any(|(a, b)| a.cid() != b.cid())
        }
        SortCheck::Relative => {
            let before = previous.iter().filter(|r| current_cids.contains(&r.cid()));
            let after = current.iter().filter(|r| previous_cids.contains(&r.cid()));
            before.zip(after).any(|(a, b)| a.cid() != b.cid())
        }
    };

    Diff {
        removed,
        added,
        sorted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Predicate;
    use alloc::vec;
    use prism_core::Value;

    struct Item {
        cid: Cid,
        rank: i64,
    }

    impl Record for Item {
        fn cid(&self) -> Cid {
            self.cid
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "rank" => Some(Value::Int64(self.rank)),
                _ => None,
            }
        }
    }

    fn items(ranks: &[i64]) -> Vec<Rc<Item>> {
        ranks
            .iter()
            .enumerate()
            .map(|(i, &rank)| Rc::new(Item { cid: i as Cid, rank }))
            .collect()
    }

    fn cids(records: &[Rc<Item>]) -> Vec<Cid> {
        records.iter().map(|r| r.cid).collect()
    }

    #[test]
    fn test_materialize_preserves_source_order() {
        let mut predicates = PredicateSet::new();
        predicates.add(Predicate::new(|item: &Item| item.rank % 2 == 0));

        let filtered = materialize(items(&[4, 1, 2, 3, 0]), &predicates, None);
        assert_eq!(cids(&filtered), vec![0, 2, 4]);
    }

    #[test]
    fn test_materialize_stable_sort() {
        let comparator = Comparator::field("rank");
        let filtered = materialize(items(&[2, 1, 2, 1]), &PredicateSet::new(), Some(&comparator));
        assert_eq!(cids(&filtered), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_window() {
        assert_eq!(window(100, None, None), 0..100);
        assert_eq!(window(100, None, Some(10)), 0..10);
        assert_eq!(window(100, Some(5), Some(10)), 5..15);
        assert_eq!(window(100, Some(95), Some(10)), 95..100);
        assert_eq!(window(100, Some(200), None), 100..100);
        assert_eq!(window(100, Some(5), Some(0)), 5..5);
        assert_eq!(window(3, Some(1), Some(usize::MAX)), 1..3);
    }

    #[test]
    fn test_diff_membership() {
        let all = items(&[0, 1, 2, 3]);
        let previous = vec![all[0].clone(), all[1].clone(), all[2].clone()];
        let current = vec![all[1].clone(), all[2].clone(), all[3].clone()];

        let diff = diff(
            &previous,
            &cid_set(&previous),
            &current,
            &cid_set(&current),
            SortCheck::Relative,
        );
        assert_eq!(cids(&diff.removed), vec![0]);
        assert_eq!(cids(&diff.added), vec![3]);
        assert!(!diff.sorted);
    }

    #[test]
    fn test_diff_sequence_check() {
        let all = items(&[0, 1, 2]);
        let previous = vec![all[0].clone(), all[1].clone()];
        let current = vec![all[0].clone(), all[1].clone(), all[2].clone()];

        let sequence = diff(&previous, &cid_set(&previous), &current, &cid_set(&current), SortCheck::Sequence);
        let relative = diff(&previous, &cid_set(&previous), &current, &cid_set(&current), SortCheck::Relative);
        assert!(sequence.sorted);
        assert!(!relative.sorted);
    }

    #[test]
    fn test_diff_reorder_only() {
        let all = items(&[0, 1, 2]);
        let previous = vec![all[0].clone(), all[1].clone(), all[2].clone()];
        let current = vec![all[2].clone(), all[0].clone(), all[1].clone()];

        let diff = diff(&previous, &cid_set(&previous), &current, &cid_set(&current), SortCheck::Relative);
        assert!(diff.removed.is_empty());
        assert!(diff.added.is_empty());
        assert!(diff.sorted);
        assert!(!diff.is_empty());
    }

    #[test]
    fn test_diff_unchanged() {
        let all = items(&[0, 1]);
        let set = cid_set(&all);
        let diff = diff(&all, &set, &all, &set, SortCheck::Sequence);
        assert!(diff.is_empty());
    }
}
