//! The filter model: single source of truth for "which subset is requested"
//!
//! `FilterState` is pure state plus derived reads. Every operation is total:
//! unknown tags or unparsable bounds are ignored rather than reported, so
//! UI widgets can call straight into it.

use super::types::{DimensionKey, ItemId, MatchMode, NumericRange, SchemaId, TagDisposition, TagId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Multi-dimensional filter over the item collection
///
/// Tag dispositions live in one ordered map so a tag can never be both
/// included and excluded. Clearing a dimension removes its entry entirely.
/// Deserialized snapshots are rebuilt through the setters, so they obey the
/// same rules as state built in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFilterState")]
pub struct FilterState {
    /// Tag id → disposition, in first-insertion order
    #[serde(default)]
    tags: Vec<(TagId, TagDisposition)>,

    #[serde(default)]
    include_mode: MatchMode,

    #[serde(default)]
    exclude_mode: MatchMode,

    #[serde(default)]
    ranges: BTreeMap<DimensionKey, NumericRange>,

    #[serde(default)]
    categories: BTreeMap<SchemaId, BTreeSet<String>>,

    #[serde(default)]
    text_query: Option<String>,

    #[serde(default)]
    item_ids: Option<BTreeSet<ItemId>>,

    /// Known tag ids; when set, toggling anything else is a no-op
    #[serde(skip)]
    tag_catalog: Option<HashSet<TagId>>,
}

/// Wire shape of a [`FilterState`] snapshot, before normalisation
#[derive(Deserialize)]
struct RawFilterState {
    #[serde(default)]
    tags: Vec<(TagId, TagDisposition)>,
    #[serde(default)]
    include_mode: MatchMode,
    #[serde(default)]
    exclude_mode: MatchMode,
    #[serde(default)]
    ranges: BTreeMap<DimensionKey, NumericRange>,
    #[serde(default)]
    categories: BTreeMap<SchemaId, BTreeSet<String>>,
    #[serde(default)]
    text_query: Option<String>,
    #[serde(default)]
    item_ids: Option<BTreeSet<ItemId>>,
}

impl From<RawFilterState> for FilterState {
    fn from(raw: RawFilterState) -> Self {
        let mut state = Self::with_match_modes(raw.include_mode, raw.exclude_mode);
        // a repeated tag keeps its first position and its last disposition
        for (tag, disposition) in &raw.tags {
            state.set_tag_disposition(tag, Some(*disposition));
        }
        for (key, range) in raw.ranges {
            state.set_range(key, Some(range));
        }
        for (schema, values) in raw.categories {
            state.set_category_values(&schema, values);
        }
        state.set_text_query(raw.text_query.as_deref());
        if let Some(ids) = raw.item_ids {
            state.set_item_ids(ids);
        }
        state
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    /// Empty filter with OR semantics for both include and exclude tags
    #[must_use]
    pub fn new() -> Self {
        Self::with_match_modes(MatchMode::Any, MatchMode::Any)
    }

    /// Empty filter with the given default match modes
    #[must_use]
    pub fn with_match_modes(include_mode: MatchMode, exclude_mode: MatchMode) -> Self {
        Self {
            tags: Vec::new(),
            include_mode,
            exclude_mode,
            ranges: BTreeMap::new(),
            categories: BTreeMap::new(),
            text_query: None,
            item_ids: None,
            tag_catalog: None,
        }
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Restrict tag toggling to a known set of ids (`None` accepts any id)
    pub fn set_tag_catalog<I, S>(&mut self, catalog: Option<I>)
    where
        I: IntoIterator<Item = S>,
        S: Into<TagId>,
    {
        self.tag_catalog = catalog.map(|ids| ids.into_iter().map(Into::into).collect());
    }

    /// Advance a tag through Absent → Include → Exclude → Absent
    ///
    /// Returns the disposition after the call. Ids outside the tag catalog
    /// are left untouched.
    pub fn toggle_tag(&mut self, id: &str) -> Option<TagDisposition> {
        if !self.is_known_tag(id) {
            debug!(tag = id, "ignoring toggle of unknown tag");
            return None;
        }
        let next = TagDisposition::cycle(self.disposition(id));
        self.set_tag_disposition(id, next);
        next
    }

    /// Force a tag to a specific disposition (`None` = Absent)
    ///
    /// An existing entry keeps its position when switching between Include
    /// and Exclude.
    pub fn set_tag_disposition(&mut self, id: &str, disposition: Option<TagDisposition>) {
        let position = self.tags.iter().position(|(tag, _)| tag == id);
        match (position, disposition) {
            (Some(idx), Some(d)) => self.tags[idx].1 = d,
            (Some(idx), None) => {
                self.tags.remove(idx);
            }
            (None, Some(d)) => {
                if self.is_known_tag(id) {
                    self.tags.push((id.to_string(), d));
                }
            }
            (None, None) => {}
        }
    }

    /// Force a tag back to Absent regardless of its state
    ///
    /// Returns whether the tag had a disposition.
    pub fn remove_tag(&mut self, id: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|(tag, _)| tag != id);
        before != self.tags.len()
    }

    /// Current disposition of a tag (`None` = Absent)
    #[must_use]
    pub fn disposition(&self, id: &str) -> Option<TagDisposition> {
        self.tags
            .iter()
            .find(|(tag, _)| tag == id)
            .map(|(_, d)| *d)
    }

    /// Included tag ids, in insertion order
    #[must_use]
    pub fn included_ids(&self) -> Vec<&str> {
        self.ids_with(TagDisposition::Include)
    }

    /// Excluded tag ids, in insertion order
    #[must_use]
    pub fn excluded_ids(&self) -> Vec<&str> {
        self.ids_with(TagDisposition::Exclude)
    }

    fn ids_with(&self, disposition: TagDisposition) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|(_, d)| *d == disposition)
            .map(|(tag, _)| tag.as_str())
            .collect()
    }

    fn is_known_tag(&self, id: &str) -> bool {
        self.tag_catalog
            .as_ref()
            .is_none_or(|catalog| catalog.contains(id))
    }

    #[must_use]
    pub const fn include_mode(&self) -> MatchMode {
        self.include_mode
    }

    #[must_use]
    pub const fn exclude_mode(&self) -> MatchMode {
        self.exclude_mode
    }

    pub const fn set_include_mode(&mut self, mode: MatchMode) {
        self.include_mode = mode;
    }

    pub const fn set_exclude_mode(&mut self, mode: MatchMode) {
        self.exclude_mode = mode;
    }

    // ------------------------------------------------------------------
    // Numeric ranges
    // ------------------------------------------------------------------

    /// Constrain a dimension to `min..=max`
    ///
    /// Reversed bounds are swapped; a NaN or infinite bound leaves the filter unchanged.
    pub fn set_numeric_range(&mut self, key: DimensionKey, min: f64, max: f64) {
        match NumericRange::new(min, max) {
            Some(range) => {
                self.ranges.insert(key, range);
            }
            None => debug!(dimension = %key, "ignoring range with non-finite bound"),
        }
    }

    /// Set or clear (`None`) a dimension
    pub fn set_range(&mut self, key: DimensionKey, range: Option<NumericRange>) {
        match range {
            Some(range) => self.set_numeric_range(key, range.min, range.max),
            None => self.clear_numeric_range(&key),
        }
    }

    /// Remove any constraint on a dimension
    pub fn clear_numeric_range(&mut self, key: &DimensionKey) {
        self.ranges.remove(key);
    }

    #[must_use]
    pub fn numeric_range(&self, key: &DimensionKey) -> Option<NumericRange> {
        self.ranges.get(key).copied()
    }

    #[must_use]
    pub const fn numeric_ranges(&self) -> &BTreeMap<DimensionKey, NumericRange> {
        &self.ranges
    }

    // ------------------------------------------------------------------
    // Categorical attributes
    // ------------------------------------------------------------------

    /// Add or remove one value of an attribute facet
    ///
    /// Removing the last value drops the schema entry.
    pub fn toggle_category_value(&mut self, schema: &str, value: &str) {
        let values = self.categories.entry(schema.to_string()).or_default();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        if values.is_empty() {
            self.categories.remove(schema);
        }
    }

    /// Replace the selected values of an attribute facet
    ///
    /// An empty iterator clears the facet.
    pub fn set_category_values<I, S>(&mut self, schema: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.categories.remove(schema);
        } else {
            self.categories.insert(schema.to_string(), values);
        }
    }

    pub fn clear_category(&mut self, schema: &str) {
        self.categories.remove(schema);
    }

    #[must_use]
    pub fn category_values(&self, schema: &str) -> Option<&BTreeSet<String>> {
        self.categories.get(schema)
    }

    #[must_use]
    pub const fn categories(&self) -> &BTreeMap<SchemaId, BTreeSet<String>> {
        &self.categories
    }

    // ------------------------------------------------------------------
    // Free text and explicit ids
    // ------------------------------------------------------------------

    /// Set the free-text query; empty or whitespace-only text clears it
    pub fn set_text_query(&mut self, query: Option<&str>) {
        self.text_query = query
            .filter(|q| !q.trim().is_empty())
            .map(str::to_string);
    }

    #[must_use]
    pub fn text_query(&self) -> Option<&str> {
        self.text_query.as_deref()
    }

    /// Select items directly by id, bypassing every other dimension
    ///
    /// An empty iterator clears the explicit id set.
    pub fn set_item_ids<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        let ids: BTreeSet<ItemId> = ids.into_iter().map(Into::into).collect();
        self.item_ids = (!ids.is_empty()).then_some(ids);
    }

    pub fn clear_item_ids(&mut self) {
        self.item_ids = None;
    }

    #[must_use]
    pub const fn item_ids(&self) -> Option<&BTreeSet<ItemId>> {
        self.item_ids.as_ref()
    }

    // ------------------------------------------------------------------
    // Derived
    // ------------------------------------------------------------------

    /// Whether any dimension currently constrains the collection
    ///
    /// Match modes alone do not count as a filter.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        !self.tags.is_empty()
            || !self.categories.is_empty()
            || !self.ranges.is_empty()
            || self.text_query.is_some()
            || self.item_ids.is_some()
    }

    /// Drop every constraint, keeping match modes and the tag catalog
    pub fn clear_all(&mut self) {
        self.tags.clear();
        self.ranges.clear();
        self.categories.clear();
        self.text_query = None;
        self.item_ids = None;
    }
}
