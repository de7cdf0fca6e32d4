//! The wire filter tree and the helpers that build its leaves.
//!
//! The wire tree is the CQL-shaped JSON stored with a saved search:
//!
//! ```text
//! {"type": "AND", "filters": [
//!     {"type": "ILIKE", "property": "title", "value": "%ship%"},
//!     {"type": "=", "value": true, "property": {
//!         "type": "FILTER_FUNCTION",
//!         "filterFunctionName": "proximity",
//!         "params": ["anyText", 2, "ship"]}}
//! ]}
//! ```
//!
//! A node with `filters` is a [`WireGroup`]. A node whose `property` is an
//! object is a [`FunctionLeaf`]. Anything else is a [`WireLeaf`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::comparator::QueryOperator;
use crate::value::{DateInterval, FilterValue};

/// Name of the only filter function the codec understands.
pub const PROXIMITY_FUNCTION: &str = "proximity";

/// Marker carried in the `type` field of a function descriptor.
pub const FILTER_FUNCTION_KIND: &str = "FILTER_FUNCTION";

/// Extra leaf field holding the lower bound of a range.
pub const LOWER_BOUNDARY: &str = "lowerBoundary";
/// Extra leaf field holding the upper bound of a range.
pub const UPPER_BOUNDARY: &str = "upperBoundary";
/// Extra leaf field holding the start of a `DURING` interval.
pub const FROM: &str = "from";
/// Extra leaf field holding the end of a `DURING` interval.
pub const TO: &str = "to";

/// Boolean combinator of a wire group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanOperator {
    And,
    Or,
    Not,
}

/// Any node of the wire tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireNode {
    Group(WireGroup),
    Function(FunctionLeaf),
    Leaf(WireLeaf),
}

impl WireNode {
    /// Returns `true` if this node has a `filters` list.
    pub fn is_group(&self) -> bool {
        matches!(self, WireNode::Group(_))
    }

    /// Returns the group, if this is one.
    pub fn as_group(&self) -> Option<&WireGroup> {
        match self {
            WireNode::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Returns the plain leaf, if this is one.
    pub fn as_leaf(&self) -> Option<&WireLeaf> {
        match self {
            WireNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Returns the function leaf, if this is one.
    pub fn as_function(&self) -> Option<&FunctionLeaf> {
        match self {
            WireNode::Function(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Replaces the pass-through extension payload of a leaf.
    ///
    /// Groups carry no extension data; the call is a no-op for them.
    pub fn set_extension_data(&mut self, data: Option<Value>) {
        match self {
            WireNode::Group(_) => {}
            WireNode::Function(leaf) => leaf.extension_data = data,
            WireNode::Leaf(leaf) => leaf.extension_data = data,
        }
    }
}

impl From<WireGroup> for WireNode {
    fn from(group: WireGroup) -> Self {
        WireNode::Group(group)
    }
}

impl From<WireLeaf> for WireNode {
    fn from(leaf: WireLeaf) -> Self {
        WireNode::Leaf(leaf)
    }
}

impl From<FunctionLeaf> for WireNode {
    fn from(leaf: FunctionLeaf) -> Self {
        WireNode::Function(leaf)
    }
}

/// Nested boolean group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireGroup {
    #[serde(rename = "type")]
    pub op: BooleanOperator,
    pub filters: Vec<WireNode>,
}

impl WireGroup {
    pub fn new(op: BooleanOperator, filters: Vec<WireNode>) -> Self {
        WireGroup { op, filters }
    }
}

/// A single predicate over a named property.
///
/// Fields the codec does not model (interval endpoints, range boundaries,
/// geometry parameters) live in `extra` and survive a decode/encode cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireLeaf {
    #[serde(rename = "type")]
    pub op: QueryOperator,
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(
        rename = "extensionData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub extension_data: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WireLeaf {
    /// Creates a leaf with a value and no extra fields.
    pub fn new(op: QueryOperator, property: impl Into<String>, value: impl Into<Value>) -> Self {
        WireLeaf {
            op,
            property: property.into(),
            value: Some(value.into()),
            extension_data: None,
            extra: Map::new(),
        }
    }

    /// The leaf a blank search starts from: `anyText ILIKE ''`.
    pub fn default_filter() -> Self {
        WireLeaf::new(QueryOperator::ILike, "anyText", "")
    }

    /// Adds an extra field.
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Returns an extra field.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Returns the interval this leaf describes.
    ///
    /// A `from/to` string value wins; otherwise the `from` and `to` fields are
    /// used, with numbers and other scalars rendered as JSON text.
    pub fn interval(&self) -> DateInterval {
        if let Some(interval) = self
            .value
            .as_ref()
            .and_then(Value::as_str)
            .and_then(DateInterval::parse)
        {
            return interval;
        }
        let from = self.extra(FROM).and_then(endpoint_text);
        let to = self.extra(TO).and_then(endpoint_text);
        DateInterval::new(from.as_deref(), to.as_deref())
    }
}

/// Text of an interval endpoint. Non-string scalars keep their JSON text.
fn endpoint_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// A predicate whose property is a filter function call.
///
/// The enclosing leaf is an `= true` test on the function's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionLeaf {
    #[serde(rename = "type")]
    pub op: QueryOperator,
    pub property: FunctionCall,
    #[serde(default)]
    pub value: Value,
    #[serde(
        rename = "extensionData",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub extension_data: Option<Value>,
}

/// Structured function descriptor held in a [`FunctionLeaf`]'s `property`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    #[serde(rename = "filterFunctionName")]
    pub name: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

fn function_kind() -> String {
    FILTER_FUNCTION_KIND.to_string()
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, params: Vec<Value>) -> Self {
        FunctionCall {
            kind: function_kind(),
            name: name.into(),
            params,
        }
    }
}

/// Builds wire leaves and classifies operators.
///
/// The codec never constructs a leaf itself; it asks the factory. Every
/// method has a CQL default, so an implementation only overrides what it
/// needs. A builder returning `None` produces nothing, and the enclosing
/// group drops the slot.
///
/// # Example
///
/// ```
/// use filterbridge::{CqlFilterFactory, FilterFactory, QueryOperator, WireNode};
///
/// let factory = CqlFilterFactory;
/// assert!(factory.is_geo_predicate(QueryOperator::Intersects));
///
/// let node = factory.null_filter("title").unwrap();
/// let leaf = node.as_leaf().unwrap();
/// assert_eq!(leaf.op, QueryOperator::IsNull);
/// assert_eq!(leaf.value, None);
/// ```
pub trait FilterFactory: Send + Sync {
    /// Returns `true` if leaves with this operator carry a geometry.
    fn is_geo_predicate(&self, op: QueryOperator) -> bool {
        matches!(op, QueryOperator::Intersects | QueryOperator::Dwithin)
    }

    /// Builds `name(params...) = true`.
    fn function_filter(&self, name: &str, params: Vec<Value>) -> Option<WireNode> {
        Some(WireNode::Function(FunctionLeaf {
            op: QueryOperator::Eq,
            property: FunctionCall::new(name, params),
            value: Value::Bool(true),
            extension_data: None,
        }))
    }

    /// Builds `property IS NULL`.
    fn null_filter(&self, property: &str) -> Option<WireNode> {
        Some(WireNode::Leaf(WireLeaf {
            op: QueryOperator::IsNull,
            property: property.to_string(),
            value: None,
            extension_data: None,
            extra: Map::new(),
        }))
    }

    /// Builds `property op value`.
    ///
    /// - A geometry value is reused as the leaf, retargeted at `property`.
    ///   A geo operator with nothing drawn yet builds nothing.
    /// - A range value also writes `lowerBoundary` and `upperBoundary`.
    /// - A `DURING` interval string also writes `from` and `to`.
    /// - `null` becomes `""`.
    fn plain_filter(
        &self,
        op: QueryOperator,
        property: &str,
        value: &FilterValue,
    ) -> Option<WireNode> {
        let leaf = match value {
            FilterValue::Geometry(geometry) => WireLeaf {
                op,
                property: property.to_string(),
                ..(**geometry).clone()
            },
            FilterValue::Scalar(scalar)
                if self.is_geo_predicate(op) && (scalar.is_null() || scalar == "") =>
            {
                return None;
            }
            FilterValue::Range { lower, upper } => {
                WireLeaf::new(op, property, value.to_wire_value())
                    .with_extra(LOWER_BOUNDARY, lower.clone())
                    .with_extra(UPPER_BOUNDARY, upper.clone())
            }
            _ => {
                let leaf = WireLeaf::new(op, property, value.to_wire_value());
                match value.as_str().and_then(DateInterval::parse) {
                    Some(interval) if op == QueryOperator::During => leaf
                        .with_extra(FROM, interval.from)
                        .with_extra(TO, interval.to),
                    _ => leaf,
                }
            }
        };
        Some(WireNode::Leaf(leaf))
    }
}

/// The stock CQL filter builders.
#[derive(Debug, Clone, Copy, Default)]
pub struct CqlFilterFactory;

impl FilterFactory for CqlFilterFactory {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf_of(node: Option<WireNode>) -> WireLeaf {
        match node {
            Some(WireNode::Leaf(leaf)) => leaf,
            other => panic!("expected plain leaf, got {other:?}"),
        }
    }

    #[test]
    fn node_discrimination() {
        let group: WireNode = serde_json::from_value(json!({
            "type": "OR",
            "filters": [{"type": "ILIKE", "property": "title", "value": "x"}]
        }))
        .unwrap();
        assert!(group.is_group());

        let function: WireNode = serde_json::from_value(json!({
            "type": "=",
            "value": true,
            "property": {
                "type": "FILTER_FUNCTION",
                "filterFunctionName": "proximity",
                "params": ["anyText", 2, "ship"]
            }
        }))
        .unwrap();
        assert_eq!(function.as_function().unwrap().property.name, "proximity");

        let leaf: WireNode =
            serde_json::from_value(json!({"type": ">", "property": "size", "value": 3})).unwrap();
        assert_eq!(leaf.as_leaf().unwrap().op, QueryOperator::Gt);
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let result: Result<WireNode, _> =
            serde_json::from_value(json!({"type": "<>", "property": "size", "value": 3}));
        assert!(result.is_err());
    }

    #[test]
    fn extra_fields_survive_serde() {
        let input = json!({
            "type": "DURING",
            "property": "modified",
            "value": "",
            "from": "2020-01-01",
            "to": "2020-02-01",
            "extensionData": {"tag": 1}
        });
        let node: WireNode = serde_json::from_value(input.clone()).unwrap();
        let leaf = node.as_leaf().unwrap();
        assert_eq!(leaf.extra(FROM), Some(&json!("2020-01-01")));
        assert_eq!(leaf.extension_data, Some(json!({"tag": 1})));
        assert_eq!(serde_json::to_value(&node).unwrap(), input);
    }

    #[test]
    fn interval_prefers_value_then_fields() {
        let split = WireLeaf::new(QueryOperator::During, "modified", "a/b");
        assert_eq!(split.interval().to_string(), "a/b");

        let fields = WireLeaf::new(QueryOperator::During, "modified", "")
            .with_extra(FROM, "a")
            .with_extra(TO, Value::Null);
        assert_eq!(fields.interval(), DateInterval::new(Some("a"), None));
    }

    #[test]
    fn function_filter_shape() {
        let node = CqlFilterFactory
            .function_filter(PROXIMITY_FUNCTION, vec![json!("location"), json!(500), json!("P")])
            .unwrap();
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "type": "=",
                "property": {
                    "type": "FILTER_FUNCTION",
                    "filterFunctionName": "proximity",
                    "params": ["location", 500, "P"]
                },
                "value": true
            })
        );
    }

    #[test]
    fn null_filter_has_no_value() {
        let node = CqlFilterFactory.null_filter("title").unwrap();
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "IS NULL", "property": "title"})
        );
    }

    #[test]
    fn plain_filter_normalizes_null() {
        let leaf = leaf_of(CqlFilterFactory.plain_filter(
            QueryOperator::ILike,
            "title",
            &FilterValue::Scalar(Value::Null),
        ));
        assert_eq!(leaf.value, Some(json!("")));
    }

    #[test]
    fn plain_filter_writes_range_boundaries() {
        let leaf = leaf_of(CqlFilterFactory.plain_filter(
            QueryOperator::Between,
            "size",
            &FilterValue::range(1, 10),
        ));
        assert_eq!(leaf.extra(LOWER_BOUNDARY), Some(&json!(1)));
        assert_eq!(leaf.extra(UPPER_BOUNDARY), Some(&json!(10)));
    }

    #[test]
    fn plain_filter_writes_interval_endpoints() {
        let leaf = leaf_of(CqlFilterFactory.plain_filter(
            QueryOperator::During,
            "modified",
            &FilterValue::from("2020-01-01/"),
        ));
        assert_eq!(leaf.value, Some(json!("2020-01-01/")));
        assert_eq!(leaf.extra(FROM), Some(&json!("2020-01-01")));
        assert_eq!(leaf.extra(TO), Some(&Value::Null));
    }

    #[test]
    fn plain_filter_retargets_geometry() {
        let geometry = WireLeaf::new(QueryOperator::Dwithin, "anyGeo", "POINT(1 2)")
            .with_extra("distance", 100);
        let leaf = leaf_of(CqlFilterFactory.plain_filter(
            QueryOperator::Dwithin,
            "location",
            &FilterValue::from(geometry),
        ));
        assert_eq!(leaf.property, "location");
        assert_eq!(leaf.value, Some(json!("POINT(1 2)")));
        assert_eq!(leaf.extra("distance"), Some(&json!(100)));
    }

    #[test]
    fn plain_filter_skips_geo_without_geometry() {
        assert_eq!(
            CqlFilterFactory.plain_filter(
                QueryOperator::Intersects,
                "location",
                &FilterValue::default()
            ),
            None
        );
    }
}
