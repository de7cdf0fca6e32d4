//! Value shapes held by a UI filter leaf.
//!
//! A leaf's value list always has one slot. What that slot looks like is
//! decided by the comparator:
//!
//! | Comparator | Shape |
//! |------------|-------|
//! | `RANGE` | [`FilterValue::Range`] `{lower, upper}` |
//! | `NEAR` | [`FilterValue::Proximity`] `{value, distance}` |
//! | `INTERSECTS`, `DWITHIN` | [`FilterValue::Geometry`], the whole wire leaf |
//! | `BETWEEN` | scalar ISO interval string, see [`DateInterval`] |
//! | anything else | [`FilterValue::Scalar`] |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::wire::WireLeaf;

/// The single value slot of a UI filter leaf.
///
/// Serialized untagged, so the JSON form is exactly what the filter editor
/// stores: a plain scalar, `{"lower": .., "upper": ..}`,
/// `{"value": .., "distance": ..}`, or a wire leaf object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A geometry predicate carried as the complete wire leaf.
    Geometry(Box<WireLeaf>),
    /// Inclusive numeric range.
    Range { lower: Value, upper: Value },
    /// Point (or other geometry text) and a distance around it.
    Proximity { value: Value, distance: Value },
    /// Any plain JSON value. `null` stands for "no value entered".
    Scalar(Value),
}

impl FilterValue {
    /// Creates a range value.
    pub fn range(lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        FilterValue::Range {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// Creates a proximity value.
    pub fn proximity(value: impl Into<Value>, distance: impl Into<Value>) -> Self {
        FilterValue::Proximity {
            value: value.into(),
            distance: distance.into(),
        }
    }

    /// Returns `true` for a `null` scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Scalar(Value::Null))
    }

    /// Extracts a string scalar, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::Scalar(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Extracts the bounds of a range value, if present.
    pub fn as_range(&self) -> Option<(&Value, &Value)> {
        match self {
            FilterValue::Range { lower, upper } => Some((lower, upper)),
            _ => None,
        }
    }

    /// Extracts `(value, distance)` of a proximity value, if present.
    pub fn as_proximity(&self) -> Option<(&Value, &Value)> {
        match self {
            FilterValue::Proximity { value, distance } => Some((value, distance)),
            _ => None,
        }
    }

    /// Converts the slot to the JSON a plain wire leaf carries as `value`.
    ///
    /// `null` becomes the empty string; the wire form never omits the field.
    pub fn to_wire_value(&self) -> Value {
        match self {
            FilterValue::Scalar(Value::Null) => Value::String(String::new()),
            FilterValue::Scalar(value) => value.clone(),
            other => serde_json::to_value(other).unwrap_or(Value::Null),
        }
    }
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Scalar(Value::String(String::new()))
    }
}

impl From<Value> for FilterValue {
    fn from(value: Value) -> Self {
        FilterValue::Scalar(value)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Scalar(Value::String(s))
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        FilterValue::Scalar(Value::from(n))
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Scalar(Value::from(n))
    }
}

impl From<u64> for FilterValue {
    fn from(n: u64) -> Self {
        FilterValue::Scalar(Value::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        FilterValue::Scalar(Value::from(n))
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Scalar(Value::Bool(b))
    }
}

impl From<WireLeaf> for FilterValue {
    fn from(leaf: WireLeaf) -> Self {
        FilterValue::Geometry(Box::new(leaf))
    }
}

/// A date interval in `from/to` form.
///
/// Either side may be open. An open side is written as an empty string, so
/// `"2020-01-01/"` means "from 2020-01-01 onwards".
///
/// # Example
///
/// ```
/// use filterbridge::DateInterval;
///
/// let interval = DateInterval::parse("2020-01-01/2020-02-01").unwrap();
/// assert_eq!(interval.from.as_deref(), Some("2020-01-01"));
/// assert_eq!(interval.to.as_deref(), Some("2020-02-01"));
/// assert_eq!(interval.to_string(), "2020-01-01/2020-02-01");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateInterval {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateInterval {
    /// Creates an interval from optional endpoints. Empty strings are open sides.
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        DateInterval {
            from: non_empty(from),
            to: non_empty(to),
        }
    }

    /// Splits `text` on `/`.
    ///
    /// Returns `None` when there is no separator. Anything after a second `/`
    /// is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        if !text.contains('/') {
            return None;
        }
        let mut parts = text.split('/');
        Some(DateInterval::new(parts.next(), parts.next()))
    }

    /// Returns `true` if neither side is set.
    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.from.as_deref().unwrap_or_default(),
            self.to.as_deref().unwrap_or_default()
        )
    }
}

fn non_empty(side: Option<&str>) -> Option<String> {
    side.filter(|s| !s.is_empty()).map(str::to_string)
}
