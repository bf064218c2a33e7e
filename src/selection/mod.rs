//! Selection tracker
//!
//! The set of item ids the user picked in the gallery, used for bulk
//! actions. A selection only means something for the filtered view it was
//! made in, so the tracker clears itself on every filter key change.

use crate::filters::ItemId;
use crate::query::{FilterKeyObserver, QuerySnapshot};
use std::collections::HashSet;
use tracing::debug;

/// In-memory set of selected item ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: HashSet<ItemId>,
}

impl SelectionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id; returns whether it is selected afterwards
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    pub fn select(&mut self, id: &str) {
        self.selected.insert(id.to_string());
    }

    pub fn deselect(&mut self, id: &str) {
        self.selected.remove(id);
    }

    /// Toggle the whole visible set
    ///
    /// If the selection is exactly the visible set it is cleared, otherwise
    /// it becomes the visible set. `visible` is read at call time, so ids
    /// loaded since the last call are taken into account. Returns whether
    /// anything is selected afterwards.
    pub fn select_all<'a, I>(&mut self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: HashSet<&str> = visible.into_iter().collect();
        let same = visible.len() == self.selected.len()
            && self.selected.iter().all(|id| visible.contains(id.as_str()));
        if same {
            self.selected.clear();
        } else {
            self.selected = visible.into_iter().map(str::to_string).collect();
        }
        !self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in no particular order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    /// Selected ids in the order they appear in `visible`
    #[must_use]
    pub fn selected_in<'a, I>(&self, visible: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        visible
            .into_iter()
            .filter(|id| self.selected.contains(*id))
            .collect()
    }

    /// Drop selected ids that are not in `visible`
    pub fn retain_visible<'a, I>(&mut self, visible: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let visible: HashSet<&str> = visible.into_iter().collect();
        self.selected.retain(|id| visible.contains(id.as_str()));
    }
}

impl FilterKeyObserver for SelectionTracker {
    fn filter_key_changed(&mut self, snapshot: &QuerySnapshot) {
        if !self.selected.is_empty() {
            debug!(key = %snapshot.key, dropped = self.selected.len(), "clearing selection on filter change");
        }
        self.selected.clear();
    }
}
