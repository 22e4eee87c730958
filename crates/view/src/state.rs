//! View state and the commit step shared by every update path.

use crate::materialize::{cid_set, diff, window, Diff, SortCheck};
use crate::spec::ParsedSpec;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use hashbrown::HashSet;
use prism_core::{Cid, Record};
use prism_index::IndexStore;

/// A localized change to the filtered sequence.
#[derive(Debug)]
pub enum Patch<M> {
    /// Insert `record` at `at`.
    Insert { at: usize, record: Rc<M> },
    /// Remove the record at `at`.
    Remove { at: usize },
    /// Remove the record at `from`, then insert it at `to` in the shortened sequence.
    Move { from: usize, to: usize },
}

/// Everything a view derives from its source and configuration.
pub struct ViewState<M: Record + 'static> {
    pub spec: ParsedSpec<M>,
    /// Every source member accepted by the predicates, in view order.
    pub filtered: Vec<Rc<M>>,
    /// The visible window of `filtered`.
    pub models: Vec<Rc<M>>,
    /// Cids of `models`.
    pub visible: HashSet<Cid>,
    /// Indexes over `filtered`.
    pub indexes: IndexStore<M>,
}

impl<M: Record + 'static> ViewState<M> {
    pub fn new(index_names: Vec<alloc::string::String>) -> Self {
        Self {
            spec: ParsedSpec::blank(),
            filtered: Vec::new(),
            models: Vec::new(),
            visible: HashSet::new(),
            indexes: IndexStore::new(index_names),
        }
    }

    /// Replaces `filtered` wholesale and rebuilds the indexes.
    pub fn replace(&mut self, filtered: Vec<Rc<M>>, check: SortCheck) -> Diff<M> {
        self.indexes.rebuild(filtered.iter());
        self.filtered = filtered;
        self.rewindow(check)
    }

    /// Applies a localized change.
    pub fn apply(&mut self, patch: Patch<M>, check: SortCheck) -> Diff<M> {
        let unbounded = self.spec.unbounded();
        match patch {
            Patch::Insert { at, record } => {
                self.indexes.put(record.clone());
                self.filtered.insert(at, record.clone());
                if unbounded {
                    self.visible.insert(record.cid());
                    self.models.insert(at, record.clone());
                    return Diff {
                        added: vec![record],
                        ..Diff::default()
                    };
                }
            }
            Patch::Remove { at } => {
                let record = self.filtered.remove(at);
                self.indexes.delete(&record);
                if unbounded {
                    self.visible.remove(&record.cid());
                    self.models.remove(at);
                    return Diff {
                        removed: vec![record],
                        ..Diff::default()
                    };
                }
            }
            Patch::Move { from, to } => {
                let record = self.filtered.remove(from);
                self.filtered.insert(to, record);
                if unbounded {
                    let record = self.models.remove(from);
                    self.models.insert(to, record);
                    return Diff {
                        sorted: from != to && check != SortCheck::Never,
                        ..Diff::default()
                    };
                }
            }
        }
        self.rewindow(check)
    }

    /// Re-slices `models` out of `filtered` and diffs against the old slice.
    pub fn rewindow(&mut self, check: SortCheck) -> Diff<M> {
        let range = window(self.filtered.len(), self.spec.offset, self.spec.limit);
        let models = self.filtered[range].to_vec();
        let visible = cid_set(&models);
        let diff = diff(&self.models, &self.visible, &models, &visible, check);
        self.models = models;
        self.visible = visible;
        diff
    }

    /// Returns the position of a record in `filtered`.
    pub fn filtered_position(&self, record: &M) -> Option<usize> {
        if !self.indexes.contains(record) {
            return None;
        }
        let cid = record.cid();
        self.filtered.iter().position(|r| r.cid() == cid)
    }

    /// Returns the sort check for a full pass forced by a source reset.
    pub fn full_check(&self) -> SortCheck {
        if self.spec.comparator.is_some() {
            SortCheck::Sequence
        } else {
            SortCheck::Never
        }
    }

    /// Returns the sort check for a localized update.
    pub fn local_check(&self) -> SortCheck {
        if self.spec.comparator.is_some() {
            SortCheck::Relative
        } else {
            SortCheck::Never
        }
    }
}
