//! The editable UI filter tree.
//!
//! A [`UiNode`] is either a [`FilterGroup`] (a boolean combinator over an
//! ordered list of children) or a [`Filter`] (one predicate). Nodes are plain
//! owned data: each child has exactly one parent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::comparator::Comparator;
use crate::value::FilterValue;
use crate::wire::BooleanOperator;

/// Boolean combinator of a UI group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupOperator {
    And,
    Or,
    /// "None of": encoded as `NOT(AND(children))`.
    None,
    /// Produced only by decoding a wire `NOT` group; the editor never offers it.
    Not,
}

impl GroupOperator {
    /// Returns the wire operator this group encodes to directly.
    ///
    /// `NONE` has no direct counterpart and returns `None`.
    pub fn boolean_operator(self) -> Option<BooleanOperator> {
        match self {
            GroupOperator::And => Some(BooleanOperator::And),
            GroupOperator::Or => Some(BooleanOperator::Or),
            GroupOperator::Not => Some(BooleanOperator::Not),
            GroupOperator::None => None,
        }
    }
}

impl From<BooleanOperator> for GroupOperator {
    fn from(op: BooleanOperator) -> Self {
        match op {
            BooleanOperator::And => GroupOperator::And,
            BooleanOperator::Or => GroupOperator::Or,
            BooleanOperator::Not => GroupOperator::Not,
        }
    }
}

/// Any node of the UI tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UiNode {
    Group(FilterGroup),
    Leaf(Filter),
}

impl UiNode {
    /// Returns the group, if this is one.
    pub fn as_group(&self) -> Option<&FilterGroup> {
        match self {
            UiNode::Group(group) => Some(group),
            UiNode::Leaf(_) => None,
        }
    }

    /// Returns the leaf, if this is one.
    pub fn as_leaf(&self) -> Option<&Filter> {
        match self {
            UiNode::Leaf(filter) => Some(filter),
            UiNode::Group(_) => None,
        }
    }

    /// Position among siblings, 1-based. Roots have 0.
    pub fn sort_order(&self) -> usize {
        match self {
            UiNode::Group(group) => group.sort_order,
            UiNode::Leaf(filter) => filter.sort_order,
        }
    }

    fn set_sort_order(&mut self, sort_order: usize) {
        match self {
            UiNode::Group(group) => group.sort_order = sort_order,
            UiNode::Leaf(filter) => filter.sort_order = sort_order,
        }
    }
}

impl From<FilterGroup> for UiNode {
    fn from(group: FilterGroup) -> Self {
        UiNode::Group(group)
    }
}

impl From<Filter> for UiNode {
    fn from(filter: Filter) -> Self {
        UiNode::Leaf(filter)
    }
}

/// A boolean group of filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub operator: GroupOperator,
    pub filters: Vec<UiNode>,
    #[serde(default)]
    pub sort_order: usize,
}

impl FilterGroup {
    /// Creates an empty group.
    pub fn new(operator: GroupOperator) -> Self {
        FilterGroup {
            operator,
            filters: Vec::new(),
            sort_order: 0,
        }
    }

    /// Creates a group holding one [`Filter::default`] leaf, as the editor
    /// does when the user adds a group.
    pub fn with_default_filter(operator: GroupOperator) -> Self {
        let mut group = FilterGroup::new(operator);
        group.push_default();
        group
    }

    /// Appends a child, stamping its sort order with its 1-based position.
    pub fn push(&mut self, node: impl Into<UiNode>) {
        let mut node = node.into();
        node.set_sort_order(self.filters.len() + 1);
        self.filters.push(node);
    }

    /// Appends a [`Filter::default`] leaf.
    pub fn push_default(&mut self) {
        self.push(Filter::default());
    }

    /// Builder form of [`FilterGroup::push`].
    pub fn with(mut self, node: impl Into<UiNode>) -> Self {
        self.push(node);
        self
    }

    /// Returns the number of direct children.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Iterates every leaf in the subtree, depth first.
    pub fn leaves(&self) -> Vec<&Filter> {
        let mut leaves = Vec::new();
        collect_leaves(self, &mut leaves);
        leaves
    }
}

fn collect_leaves<'a>(group: &'a FilterGroup, leaves: &mut Vec<&'a Filter>) {
    for node in &group.filters {
        match node {
            UiNode::Group(child) => collect_leaves(child, leaves),
            UiNode::Leaf(filter) => leaves.push(filter),
        }
    }
}

/// One predicate: `property comparator value`.
///
/// `value` holds exactly one slot; see [`FilterValue`] for its shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub property: String,
    pub comparator: Comparator,
    #[serde(default = "default_value")]
    pub value: Vec<FilterValue>,
    #[serde(default)]
    pub sort_order: usize,
    /// Opaque payload owned by whoever attached it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_data: Option<Value>,
}

fn default_value() -> Vec<FilterValue> {
    vec![FilterValue::default()]
}

impl Filter {
    /// Creates a leaf with a single value slot.
    pub fn new(
        property: impl Into<String>,
        comparator: Comparator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Filter {
            property: property.into(),
            comparator,
            value: vec![value.into()],
            sort_order: 0,
            extension_data: None,
        }
    }

    /// Attaches an extension payload.
    pub fn with_extension_data(mut self, data: Value) -> Self {
        self.extension_data = Some(data);
        self
    }

    /// Returns the value slot, if any.
    pub fn first_value(&self) -> Option<&FilterValue> {
        self.value.first()
    }
}

impl Default for Filter {
    /// `anyText CONTAINS ""`, the leaf a blank search starts from.
    fn default() -> Self {
        Filter::new("anyText", Comparator::Contains, FilterValue::default())
    }
}
