//! Annotated image record and query matching

use crate::filters::{ItemId, MatchMode, NumericRange, SchemaId, TagId};
use crate::pages::Identified;
use crate::query::CanonicalQuery;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One image of an annotated dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    pub id: ItemId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub tags: Vec<TagId>,

    #[serde(default)]
    pub width: u32,

    #[serde(default)]
    pub height: u32,

    /// Size in bytes
    #[serde(default)]
    pub file_size: u64,

    /// Quality metric name → value
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,

    /// Attribute schema → value
    #[serde(default)]
    pub attributes: BTreeMap<SchemaId, String>,
}

impl Identified for ImageItem {
    fn item_id(&self) -> &str {
        &self.id
    }
}

impl ImageItem {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            tags: Vec::new(),
            width: 0,
            height: 0,
            file_size: 0,
            metrics: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether the item satisfies every constraint of `query`
    ///
    /// An explicit id list overrides all other constraints.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn matches(&self, query: &CanonicalQuery) -> bool {
        if let Some(ids) = &query.item_ids {
            return ids.iter().any(|id| *id == self.id);
        }

        if let Some(tags) = &query.tag_ids {
            let hit = match query.include_match_mode.unwrap_or_default() {
                MatchMode::All => tags.iter().all(|t| self.has_tag(t)),
                MatchMode::Any => tags.iter().any(|t| self.has_tag(t)),
            };
            if !hit {
                return false;
            }
        }

        if let Some(tags) = &query.exclude_tag_ids {
            let excluded = match query.exclude_match_mode.unwrap_or_default() {
                MatchMode::All => tags.iter().all(|t| self.has_tag(t)),
                MatchMode::Any => tags.iter().any(|t| self.has_tag(t)),
            };
            if excluded {
                return false;
            }
        }

        let within = |range: Option<&NumericRange>, value: f64| range.is_none_or(|r| r.contains(value));
        if !within(query.width.as_ref(), f64::from(self.width))
            || !within(query.height.as_ref(), f64::from(self.height))
            || !within(query.file_size.as_ref(), self.file_size as f64)
        {
            return false;
        }

        if let Some(metrics) = &query.metrics {
            let all_within = metrics.iter().all(|(name, range)| {
                self.metrics
                    .get(name)
                    .is_some_and(|value| range.contains(*value))
            });
            if !all_within {
                return false;
            }
        }

        if let Some(attributes) = &query.attributes {
            let all_accepted = attributes.iter().all(|(schema, values)| {
                self.attributes
                    .get(schema)
                    .is_some_and(|value| values.contains(value))
            });
            if !all_accepted {
                return false;
            }
        }

        if let Some(text) = &query.text_query {
            let needle = text.to_lowercase();
            let found = self.name.to_lowercase().contains(&needle)
                || self.tags.iter().any(|t| t.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{DimensionKey, FilterState, TagDisposition};
    use crate::query::serialize;

    fn item(id: &str, tags: &[&str]) -> ImageItem {
        ImageItem {
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            ..ImageItem::new(id)
        }
    }

    fn query(build: impl FnOnce(&mut FilterState)) -> CanonicalQuery {
        let mut filters = FilterState::new();
        build(&mut filters);
        serialize(&filters)
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(item("a", &[]).matches(&CanonicalQuery::default()));
    }

    #[test]
    fn test_include_any_and_all() {
        let both = item("a", &["cat", "dog"]);
        let cat = item("b", &["cat"]);

        let any = query(|f| {
            f.toggle_tag("cat");
            f.toggle_tag("dog");
        });
        assert!(both.matches(&any));
        assert!(cat.matches(&any));

        let all = query(|f| {
            f.toggle_tag("cat");
            f.toggle_tag("dog");
            f.set_include_mode(MatchMode::All);
        });
        assert!(both.matches(&all));
        assert!(!cat.matches(&all));
    }

    #[test]
    fn test_exclude_any_and_all() {
        let both = item("a", &["blurry", "dark"]);
        let blurry = item("b", &["blurry"]);

        let any = query(|f| {
            f.set_tag_disposition("blurry", Some(TagDisposition::Exclude));
            f.set_tag_disposition("dark", Some(TagDisposition::Exclude));
        });
        assert!(!both.matches(&any));
        assert!(!blurry.matches(&any));

        let all = query(|f| {
            f.set_tag_disposition("blurry", Some(TagDisposition::Exclude));
            f.set_tag_disposition("dark", Some(TagDisposition::Exclude));
            f.set_exclude_mode(MatchMode::All);
        });
        assert!(!both.matches(&all));
        assert!(blurry.matches(&all));
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let mut image = ImageItem::new("a");
        image.width = 640;
        image.metrics.insert("sharpness".to_string(), 0.5);

        let q = query(|f| {
            f.set_numeric_range(DimensionKey::Width, 0.0, 640.0);
            f.set_numeric_range(DimensionKey::Metric("sharpness".to_string()), 0.5, 1.0);
        });
        assert!(image.matches(&q));

        let q = query(|f| f.set_numeric_range(DimensionKey::Width, 641.0, 2000.0));
        assert!(!image.matches(&q));
    }

    #[test]
    fn test_missing_metric_does_not_match() {
        let q = query(|f| f.set_numeric_range(DimensionKey::Metric("brightness".to_string()), 0.0, 1.0));
        assert!(!ImageItem::new("a").matches(&q));
    }

    #[test]
    fn test_attribute_values() {
        let mut image = ImageItem::new("a");
        image.attributes.insert("weather".to_string(), "rain".to_string());

        assert!(image.matches(&query(|f| {
            f.toggle_category_value("weather", "rain");
            f.toggle_category_value("weather", "snow");
        })));
        assert!(!image.matches(&query(|f| {
            f.toggle_category_value("weather", "sun");
        })));
        assert!(!image.matches(&query(|f| {
            f.toggle_category_value("time", "night");
        })));
    }

    #[test]
    fn test_text_query_is_case_insensitive() {
        let mut image = item("a", &["Street"]);
        image.name = "IMG_0001.jpg".to_string();
        assert!(image.matches(&query(|f| f.set_text_query(Some("img_0001")))));
        assert!(image.matches(&query(|f| f.set_text_query(Some("street")))));
        assert!(!image.matches(&query(|f| f.set_text_query(Some("forest")))));
    }

    #[test]
    fn test_item_ids_override_other_constraints() {
        let image = item("a", &["dog"]);
        let q = query(|f| {
            f.toggle_tag("cat");
            f.set_item_ids(["a".to_string()]);
        });
        assert!(image.matches(&q));
    }
}
