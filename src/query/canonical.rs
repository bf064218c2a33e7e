//! Canonical request payload and filter key
//!
//! `serialize` turns a [`FilterState`] into a [`CanonicalQuery`] that carries
//! only non-empty dimensions. Omitted keys, never `null` or `[]`, mean "no
//! constraint": a remote source may read `tag_ids: []` as "match nothing".
//! Lists are sorted and maps are ordered, so equal filter content always
//! yields the same [`FilterKey`] regardless of the order the UI built it in.

use crate::filters::{DimensionKey, FilterState, ItemId, MatchMode, NumericRange, SchemaId, TagId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Wire form of a filter, as sent to the paginated query endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<TagId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_match_mode: Option<MatchMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_tag_ids: Option<Vec<TagId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_match_mode: Option<MatchMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<NumericRange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<NumericRange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<NumericRange>,

    /// Quality metric name → range
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<BTreeMap<String, NumericRange>>,

    /// Attribute schema → accepted values (sorted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<SchemaId, Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_query: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_ids: Option<Vec<ItemId>>,
}

/// Derive the canonical query for a filter state
#[must_use]
pub fn serialize(filter: &FilterState) -> CanonicalQuery {
    let tag_ids = sorted_non_empty(filter.included_ids());
    let exclude_tag_ids = sorted_non_empty(filter.excluded_ids());

    let mut metrics = BTreeMap::new();
    let mut width = None;
    let mut height = None;
    let mut file_size = None;
    for (key, range) in filter.numeric_ranges() {
        match key {
            DimensionKey::Width => width = Some(*range),
            DimensionKey::Height => height = Some(*range),
            DimensionKey::FileSize => file_size = Some(*range),
            DimensionKey::Metric(name) => {
                metrics.insert(name.clone(), *range);
            }
        }
    }

    let attributes: BTreeMap<SchemaId, Vec<String>> = filter
        .categories()
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(schema, values)| (schema.clone(), values.iter().cloned().collect()))
        .collect();

    CanonicalQuery {
        include_match_mode: tag_ids.as_ref().map(|_| filter.include_mode()),
        tag_ids,
        exclude_match_mode: exclude_tag_ids.as_ref().map(|_| filter.exclude_mode()),
        exclude_tag_ids,
        width,
        height,
        file_size,
        metrics: (!metrics.is_empty()).then_some(metrics),
        attributes: (!attributes.is_empty()).then_some(attributes),
        text_query: filter.text_query().map(str::to_string),
        item_ids: filter
            .item_ids()
            .filter(|ids| !ids.is_empty())
            .map(|ids| ids.iter().cloned().collect()),
    }
}

fn sorted_non_empty(ids: Vec<&str>) -> Option<Vec<String>> {
    if ids.is_empty() {
        return None;
    }
    let mut ids: Vec<String> = ids.into_iter().map(str::to_string).collect();
    ids.sort();
    ids.dedup();
    Some(ids)
}

fn normalize_list(list: Option<Vec<String>>) -> Option<Vec<String>> {
    list.and_then(|mut values| {
        values.sort();
        values.dedup();
        (!values.is_empty()).then_some(values)
    })
}

impl CanonicalQuery {
    /// Whether the query places no constraint at all
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    /// Bring a query received from elsewhere into canonical shape
    ///
    /// Empty lists and maps become absent keys, lists are sorted and
    /// de-duplicated, and match modes without ids are dropped.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.tag_ids = normalize_list(self.tag_ids);
        self.exclude_tag_ids = normalize_list(self.exclude_tag_ids);
        self.item_ids = normalize_list(self.item_ids);
        if self.tag_ids.is_none() {
            self.include_match_mode = None;
        }
        if self.exclude_tag_ids.is_none() {
            self.exclude_match_mode = None;
        }
        self.metrics = self.metrics.filter(|m| !m.is_empty());
        self.attributes = self
            .attributes
            .map(|attrs| {
                attrs
                    .into_iter()
                    .filter_map(|(schema, values)| {
                        normalize_list(Some(values)).map(|values| (schema, values))
                    })
                    .collect::<BTreeMap<_, _>>()
            })
            .filter(|attrs| !attrs.is_empty());
        self.text_query = self.text_query.filter(|q| !q.trim().is_empty());
        self
    }

    /// Parse and normalize a JSON payload
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the payload is not a valid query.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::normalized)
    }

    /// Compact JSON encoding
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if encoding fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Rebuild an equivalent filter state (tag catalog not included)
    #[must_use]
    pub fn to_filter_state(&self) -> FilterState {
        let mut filter = FilterState::with_match_modes(
            self.include_match_mode.unwrap_or_default(),
            self.exclude_match_mode.unwrap_or_default(),
        );
        for tag in self.tag_ids.iter().flatten() {
            filter.set_tag_disposition(tag, Some(crate::filters::TagDisposition::Include));
        }
        for tag in self.exclude_tag_ids.iter().flatten() {
            filter.set_tag_disposition(tag, Some(crate::filters::TagDisposition::Exclude));
        }
        let fixed = [
            (DimensionKey::Width, self.width),
            (DimensionKey::Height, self.height),
            (DimensionKey::FileSize, self.file_size),
        ];
        for (key, range) in fixed {
            filter.set_range(key, range);
        }
        for (name, range) in self.metrics.iter().flatten() {
            filter.set_range(DimensionKey::Metric(name.clone()), Some(*range));
        }
        for (schema, values) in self.attributes.iter().flatten() {
            filter.set_category_values(schema, values.iter().cloned());
        }
        filter.set_text_query(self.text_query.as_deref());
        if let Some(ids) = &self.item_ids {
            filter.set_item_ids(ids.iter().cloned());
        }
        filter
    }
}

/// Deterministic cache-invalidation key for a canonical query
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKey(String);

impl FilterKey {
    /// Key for a canonical query
    #[must_use]
    pub fn of(query: &CanonicalQuery) -> Self {
        // Encoding cannot fail for this type; fall back to Debug, which is
        // deterministic as well.
        Self(query.to_json().unwrap_or_else(|_| format!("{query:?}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A canonical query together with its key
///
/// This is what filter-key observers receive when the filter changes.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot {
    pub query: CanonicalQuery,
    pub key: FilterKey,
}

impl QuerySnapshot {
    #[must_use]
    pub fn of(filter: &FilterState) -> Self {
        Self::from_query(serialize(filter))
    }

    #[must_use]
    pub fn from_query(query: CanonicalQuery) -> Self {
        let key = FilterKey::of(&query);
        Self { query, key }
    }
}
