//! Bucket selection for histogram and category charts
//!
//! A chart renders a fixed list of [`Bucket`]s; clicking bars toggles bucket
//! indices in a [`BucketChart`]. The selection stays separate from the filter
//! until [`BucketChart::apply`] is called.
//!
//! Applying collapses the selected buckets into their convex hull: one
//! `{min, max}` band from the lowest selected `min` to the highest selected
//! `max`. Selecting two disjoint buckets therefore also admits the gap
//! between them. Filters carry a single range per dimension, so a
//! disjunction of ranges cannot be expressed downstream.

use crate::filters::{DimensionKey, FilterState, NumericRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One bar of a histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub count: u64,
}

impl Bucket {
    #[must_use]
    pub fn new(min: f64, max: f64, label: impl Into<String>, count: u64) -> Self {
        Self {
            min,
            max,
            label: label.into(),
            count,
        }
    }
}

/// Convex hull of the selected buckets
///
/// Indices outside `buckets` are ignored. Returns `None` when nothing valid
/// is selected.
#[must_use]
pub fn convex_hull<'a, I>(buckets: &[Bucket], selected: I) -> Option<NumericRange>
where
    I: IntoIterator<Item = &'a usize>,
{
    selected
        .into_iter()
        .filter_map(|&idx| buckets.get(idx))
        .fold(None, |hull: Option<(f64, f64)>, bucket| {
            Some(match hull {
                None => (bucket.min, bucket.max),
                Some((min, max)) => (min.min(bucket.min), max.max(bucket.max)),
            })
        })
        .and_then(|(min, max)| NumericRange::new(min, max))
}

/// Per-chart bucket selection
#[derive(Debug, Clone, Default)]
pub struct BucketChart {
    buckets: Vec<Bucket>,
    selected: BTreeSet<usize>,
}

impl BucketChart {
    #[must_use]
    pub fn new(buckets: Vec<Bucket>) -> Self {
        Self {
            buckets,
            selected: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Toggle one bucket
    ///
    /// Every click is independent: selecting a bucket never deselects the
    /// others. Out-of-range indices are ignored. Returns whether the bucket
    /// is selected afterwards.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.buckets.len() {
            return false;
        }
        if self.selected.remove(&index) {
            false
        } else {
            self.selected.insert(index);
            true
        }
    }

    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected indices in ascending order
    #[must_use]
    pub fn selected(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Empty the selection without touching any filter
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// The range that [`BucketChart::apply`] would set
    #[must_use]
    pub fn applied_range(&self) -> Option<NumericRange> {
        convex_hull(&self.buckets, &self.selected)
    }

    /// Write the selection into the filter
    ///
    /// With nothing selected the dimension is cleared.
    pub fn apply(&self, dimension: DimensionKey, filter: &mut FilterState) {
        filter.set_range(dimension, self.applied_range());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation_count_buckets() -> Vec<Bucket> {
        vec![
            Bucket::new(0.0, 0.0, "0", 120),
            Bucket::new(1.0, 5.0, "1-5", 300),
            Bucket::new(6.0, 10.0, "6-10", 42),
        ]
    }

    #[test]
    fn test_disjoint_buckets_collapse_to_hull() {
        let mut chart = BucketChart::new(annotation_count_buckets());
        chart.toggle(0);
        chart.toggle(2);

        assert!(!chart.is_selected(1));
        assert_eq!(
            chart.applied_range(),
            Some(NumericRange { min: 0.0, max: 10.0 })
        );
    }

    #[test]
    fn test_hull_of_two_buckets_without_gap_bucket() {
        let buckets = vec![Bucket::new(0.0, 0.0, "0", 1), Bucket::new(6.0, 10.0, "6-10", 1)];
        assert_eq!(
            convex_hull(&buckets, &[0, 1]),
            Some(NumericRange { min: 0.0, max: 10.0 })
        );
    }

    #[test]
    fn test_toggle_is_independent_per_click() {
        let mut chart = BucketChart::new(annotation_count_buckets());
        assert!(chart.toggle(1));
        assert!(chart.toggle(2));
        assert_eq!(chart.selected(), vec![1, 2]);

        assert!(!chart.toggle(1));
        assert_eq!(chart.selected(), vec![2]);
        assert_eq!(
            chart.applied_range(),
            Some(NumericRange { min: 6.0, max: 10.0 })
        );
    }

    #[test]
    fn test_out_of_range_toggle_is_noop() {
        let mut chart = BucketChart::new(annotation_count_buckets());
        assert!(!chart.toggle(7));
        assert!(chart.selected().is_empty());
        assert_eq!(convex_hull(chart.buckets(), &[7]), None);
    }

    #[test]
    fn test_clear_selection_leaves_filter_alone() {
        let key = DimensionKey::Metric("annotation_count".to_string());
        let mut filter = FilterState::new();
        let mut chart = BucketChart::new(annotation_count_buckets());
        chart.toggle(0);
        chart.apply(key.clone(), &mut filter);

        chart.clear_selection();
        assert!(chart.applied_range().is_none());
        assert_eq!(
            filter.numeric_range(&key),
            Some(NumericRange { min: 0.0, max: 0.0 })
        );
    }

    #[test]
    fn test_apply_empty_selection_clears_dimension() {
        let mut filter = FilterState::new();
        filter.set_numeric_range(DimensionKey::Width, 1.0, 2.0);
        BucketChart::new(annotation_count_buckets()).apply(DimensionKey::Width, &mut filter);
        assert!(!filter.has_active_filters());
    }
}
