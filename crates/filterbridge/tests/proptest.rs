//! Property-based tests for filterbridge using proptest.

use filterbridge::{
    decode, encode, Comparator, Filter, FilterGroup, FilterValue, GroupOperator, QueryOperator,
    UiNode, WireLeaf, WireNode,
};
use proptest::prelude::*;
use serde_json::Value;

// ============================================================================
// Strategies
// ============================================================================

fn property_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn date_strategy() -> impl Strategy<Value = String> {
    (2000u32..2030, 1u32..13, 1u32..29).prop_map(|(y, m, d)| format!("{y:04}-{m:02}-{d:02}"))
}

fn scalar_strategy() -> impl Strategy<Value = FilterValue> {
    prop_oneof![
        "[a-zA-Z0-9 %]{0,12}".prop_map(FilterValue::from),
        any::<i64>().prop_map(FilterValue::from),
        any::<bool>().prop_map(FilterValue::from),
    ]
}

/// Leaves whose comparator survives a round trip over a non-date property.
fn leaf_strategy() -> impl Strategy<Value = Filter> {
    let plain = prop_oneof![
        Just(Comparator::Before),
        Just(Comparator::After),
        Just(Comparator::Contains),
        Just(Comparator::MatchCase),
        Just(Comparator::Equals),
        Just(Comparator::Gt),
        Just(Comparator::Lt),
        Just(Comparator::Lte),
        Just(Comparator::Gte),
    ];

    prop_oneof![
        (property_strategy(), plain, scalar_strategy())
            .prop_map(|(property, comparator, value)| Filter::new(property, comparator, value)),
        (property_strategy(), date_strategy(), date_strategy()).prop_map(|(property, from, to)| {
            Filter::new(property, Comparator::Between, format!("{from}/{to}"))
        }),
        (property_strategy(), any::<i32>(), any::<i32>()).prop_map(|(property, lower, upper)| {
            Filter::new(property, Comparator::Range, FilterValue::range(lower, upper))
        }),
        (property_strategy(), any::<i32>(), any::<i32>()).prop_map(|(property, lower, upper)| {
            Filter::new(property, Comparator::Between, FilterValue::range(lower, upper))
        }),
        (property_strategy(), "[A-Z]{1,6}", 0u32..100_000).prop_map(
            |(property, point, distance)| {
                Filter::new(property, Comparator::Near, FilterValue::proximity(point, distance))
            }
        ),
        property_strategy().prop_map(|property| {
            Filter::new(property, Comparator::IsEmpty, FilterValue::Scalar(Value::Null))
        }),
        (property_strategy(), "[A-Z]{1,6}").prop_map(|(property, shape)| {
            let geometry = WireLeaf::new(QueryOperator::Intersects, property.clone(), shape);
            Filter::new(property, Comparator::Intersects, geometry)
        }),
    ]
}

fn operator_strategy() -> impl Strategy<Value = GroupOperator> {
    prop_oneof![
        Just(GroupOperator::And),
        Just(GroupOperator::Or),
        Just(GroupOperator::Not),
    ]
}

fn group_from(operator: GroupOperator, children: Vec<UiNode>) -> FilterGroup {
    children
        .into_iter()
        .fold(FilterGroup::new(operator), |group, child| group.with(child))
}

fn node_strategy() -> impl Strategy<Value = UiNode> {
    leaf_strategy()
        .prop_map(UiNode::Leaf)
        .prop_recursive(4, 32, 4, |inner| {
            (operator_strategy(), prop::collection::vec(inner, 0..4))
                .prop_map(|(operator, children)| UiNode::Group(group_from(operator, children)))
        })
}

fn tree_strategy() -> impl Strategy<Value = FilterGroup> {
    (operator_strategy(), prop::collection::vec(node_strategy(), 0..5))
        .prop_map(|(operator, children)| group_from(operator, children))
}

fn count_groups(node: &WireNode) -> usize {
    match node {
        WireNode::Group(group) => 1 + group.filters.iter().map(count_groups).sum::<usize>(),
        _ => 0,
    }
}

fn count_ui_groups(group: &FilterGroup) -> usize {
    1 + group
        .filters
        .iter()
        .filter_map(UiNode::as_group)
        .map(count_ui_groups)
        .sum::<usize>()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Decoding an encoded tree gives the tree back.
    #[test]
    fn decode_inverts_encode(tree in tree_strategy()) {
        let wire = encode(&tree).unwrap();
        let back = decode(Some(&wire)).unwrap();
        prop_assert_eq!(back, tree);
    }

    /// Encoding never adds or loses leaves.
    #[test]
    fn encode_preserves_leaf_count(tree in tree_strategy()) {
        let wire = encode(&tree).unwrap();
        let back = decode(Some(&wire)).unwrap();
        prop_assert_eq!(back.leaves().len(), tree.leaves().len());
    }

    /// Encoded trees survive JSON serialization unchanged.
    #[test]
    fn wire_json_is_stable(tree in tree_strategy()) {
        let wire = encode(&tree).unwrap();
        let json = serde_json::to_string(&wire).unwrap();
        let parsed: WireNode = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, wire);
    }

    /// A NONE group costs exactly one extra wire group.
    #[test]
    fn none_adds_one_wrapper(children in prop::collection::vec(node_strategy(), 0..4)) {
        let none = group_from(GroupOperator::None, children.clone());
        let and = group_from(GroupOperator::And, children);

        let none_groups = count_groups(&encode(&none).unwrap());
        let and_groups = count_groups(&encode(&and).unwrap());
        prop_assert_eq!(none_groups, and_groups + 1);
        prop_assert_eq!(and_groups, count_ui_groups(&and));
    }

    /// Every comparator decoded from a plain leaf maps back to its operator.
    #[test]
    fn decoded_comparator_maps_to_same_operator(
        property in property_strategy(),
        index in 0usize..filterbridge::COMPARATOR_TABLE.len(),
    ) {
        let (_, op) = filterbridge::COMPARATOR_TABLE[index];
        let leaf = WireNode::Leaf(WireLeaf::new(op, property, "x"));
        let tree = decode(Some(&leaf)).unwrap();
        let filter = tree.filters[0].as_leaf().unwrap();
        prop_assert_eq!(filter.comparator.query_operator(), Some(op));
    }
}
