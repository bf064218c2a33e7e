//! Value types shared by the filter model and the query serializer
//!
//! - `TagDisposition`: per-tag Include/Exclude state (absence means no constraint)
//! - `MatchMode`: how several tags of one disposition combine (AND/OR)
//! - `NumericRange`: an inclusive `{min, max}` band over one dimension
//! - `DimensionKey`: which numeric dimension a range constrains

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an annotation tag
pub type TagId = String;

/// Identifier of a collection item (image)
pub type ItemId = String;

/// Identifier of a categorical attribute schema
pub type SchemaId = String;

/// Disposition of a tag inside the filter
///
/// A tag that is not present in the filter has no constraint. Cycling goes
/// Absent → Include → Exclude → Absent, see [`TagDisposition::cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagDisposition {
    /// Items must carry the tag (combined with the include match mode)
    Include,
    /// Items must not carry the tag (combined with the exclude match mode)
    Exclude,
}

impl TagDisposition {
    /// Next state in the tri-state cycle, `None` meaning Absent
    #[must_use]
    pub const fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::Include),
            Some(Self::Include) => Some(Self::Exclude),
            Some(Self::Exclude) => None,
        }
    }
}

/// How multiple tags of the same disposition are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// Every tag must match (AND logic)
    #[serde(rename = "AND", alias = "and", alias = "all")]
    All,
    /// At least one tag must match (OR logic)
    #[default]
    #[serde(rename = "OR", alias = "or", alias = "any")]
    Any,
}

impl MatchMode {
    /// Wire representation (`"AND"` / `"OR"`)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "AND",
            Self::Any => "OR",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" | "all" => Ok(Self::All),
            "or" | "any" => Ok(Self::Any),
            other => Err(format!("Unknown match mode '{other}' (expected AND or OR)")),
        }
    }
}

/// Inclusive numeric band over one dimension
///
/// `{min: 0, max: 0}` is a meaningful filter ("exactly zero"); the absence of
/// a range is what encodes "no constraint". Bounds are finite, and `-0.0` is
/// stored as `0.0` so equal bands always encode the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Deserialize)]
struct RawRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawRange> for NumericRange {
    type Error = String;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
            .ok_or_else(|| format!("Invalid range {}..{}: bounds must be finite", raw.min, raw.max))
    }
}

fn positive_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl NumericRange {
    /// Build a range, swapping reversed bounds
    ///
    /// Returns `None` when either bound is NaN or infinite.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        let (min, max) = (positive_zero(min), positive_zero(max));
        if min > max {
            Some(Self { min: max, max: min })
        } else {
            Some(Self { min, max })
        }
    }

    /// Whether `value` falls inside the band (bounds included)
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

impl FromStr for NumericRange {
    type Err = String;

    /// Parse `MIN..MAX`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once("..")
            .ok_or_else(|| format!("Invalid range '{s}': expected MIN..MAX"))?;
        let min = min
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("Invalid range minimum '{min}': {e}"))?;
        let max = max
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("Invalid range maximum '{max}': {e}"))?;
        Self::new(min, max).ok_or_else(|| format!("Invalid range '{s}': bounds must be finite numbers"))
    }
}

/// Numeric dimension a range filter applies to
///
/// Serialized as its display string so it can key JSON/TOML maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DimensionKey {
    /// Image width in pixels
    Width,
    /// Image height in pixels
    Height,
    /// Stored size in bytes
    FileSize,
    /// Named quality metric (e.g. `brightness`, `annotation_count`)
    Metric(String),
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width => f.write_str("width"),
            Self::Height => f.write_str("height"),
            Self::FileSize => f.write_str("file_size"),
            Self::Metric(name) => write!(f, "metric:{name}"),
        }
    }
}

impl FromStr for DimensionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "width" => Ok(Self::Width),
            "height" => Ok(Self::Height),
            "file_size" | "size" => Ok(Self::FileSize),
            _ => match s.strip_prefix("metric:") {
                Some(name) if !name.is_empty() => Ok(Self::Metric(name.to_string())),
                _ => Err(format!("Unknown dimension '{s}'")),
            },
        }
    }
}

impl From<DimensionKey> for String {
    fn from(key: DimensionKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for DimensionKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
