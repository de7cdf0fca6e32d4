//! Conversion of single leaves between the wire and UI trees.
//!
//! All comparator-specific value handling lives here:
//!
//! - `=` over a date property decodes as `RELATIVE`
//! - `DURING` values become `from/to` strings, unless the leaf carries range
//!   boundaries instead
//! - `BETWEEN` boundaries become `{lower, upper}`
//! - geo leaves are carried whole
//! - `NEAR` round-trips through the `proximity` filter function

use serde_json::Value;

use crate::comparator::{Comparator, QueryOperator};
use crate::error::{FilterError, Result};
use crate::metadata::MetadataLookup;
use crate::tree::Filter;
use crate::value::FilterValue;
use crate::wire::{
    FilterFactory, FunctionLeaf, WireLeaf, WireNode, LOWER_BOUNDARY, PROXIMITY_FUNCTION,
    UPPER_BOUNDARY,
};

/// Decodes a plain wire leaf.
pub fn decode_leaf(
    leaf: &WireLeaf,
    metadata: &dyn MetadataLookup,
    factory: &dyn FilterFactory,
) -> Filter {
    let comparator = resolve_comparator(leaf, metadata);

    let value = if factory.is_geo_predicate(leaf.op) {
        FilterValue::Geometry(Box::new(leaf.clone()))
    } else {
        match leaf.op {
            QueryOperator::During if !has_interval_text(leaf) && has_boundaries(leaf) => {
                range(leaf)
            }
            QueryOperator::During => FilterValue::from(leaf.interval().to_string()),
            QueryOperator::Between => range(leaf),
            _ => FilterValue::Scalar(leaf.value.clone().unwrap_or(Value::Null)),
        }
    };

    Filter {
        property: leaf.property.clone(),
        comparator,
        value: vec![value],
        sort_order: 0,
        extension_data: leaf.extension_data.clone(),
    }
}

fn resolve_comparator(leaf: &WireLeaf, metadata: &dyn MetadataLookup) -> Comparator {
    if leaf.op == QueryOperator::Eq && metadata.is_date(&leaf.property) {
        return Comparator::Relative;
    }
    let comparator = leaf.op.comparator();
    if leaf.op.is_ambiguous() {
        tracing::trace!(
            property = %leaf.property,
            op = %leaf.op,
            comparator = %comparator,
            "resolved ambiguous operator"
        );
    }
    comparator
}

fn boundary(leaf: &WireLeaf, key: &str) -> Value {
    leaf.extra(key).cloned().unwrap_or(Value::Null)
}

fn range(leaf: &WireLeaf) -> FilterValue {
    FilterValue::Range {
        lower: boundary(leaf, LOWER_BOUNDARY),
        upper: boundary(leaf, UPPER_BOUNDARY),
    }
}

fn has_boundaries(leaf: &WireLeaf) -> bool {
    leaf.extra(LOWER_BOUNDARY).is_some() || leaf.extra(UPPER_BOUNDARY).is_some()
}

fn has_interval_text(leaf: &WireLeaf) -> bool {
    leaf.value
        .as_ref()
        .and_then(Value::as_str)
        .is_some_and(|text| text.contains('/'))
}

/// Decodes a function-backed wire leaf.
///
/// Only `proximity(property, distance, value)` is understood; anything else
/// is [`FilterError::UnsupportedFilterFunction`].
pub fn decode_function_leaf(leaf: &FunctionLeaf) -> Result<Filter> {
    let call = &leaf.property;
    if call.name != PROXIMITY_FUNCTION {
        tracing::warn!(function = %call.name, "unsupported filter function");
        return Err(FilterError::UnsupportedFilterFunction {
            name: call.name.clone(),
        });
    }

    let (target, distance, value) = match call.params.as_slice() {
        [target, distance, value] => (target, distance, value),
        params => {
            return Err(FilterError::InvalidFunctionParams {
                function: PROXIMITY_FUNCTION,
                reason: format!("expected 3 parameters, found {}", params.len()),
            })
        }
    };
    let property = target
        .as_str()
        .ok_or_else(|| FilterError::InvalidFunctionParams {
            function: PROXIMITY_FUNCTION,
            reason: format!("property parameter must be a string, found {target}"),
        })?;

    Ok(Filter {
        property: property.to_string(),
        comparator: Comparator::Near,
        value: vec![FilterValue::Proximity {
            value: value.clone(),
            distance: distance.clone(),
        }],
        sort_order: 0,
        extension_data: leaf.extension_data.clone(),
    })
}

/// Encodes a UI leaf.
///
/// Returns `Ok(None)` when the factory builds nothing for it. An empty value
/// list is treated as a `null` slot.
pub fn encode_leaf(filter: &Filter, factory: &dyn FilterFactory) -> Result<Option<WireNode>> {
    let empty = FilterValue::Scalar(Value::Null);
    let value = filter.first_value().unwrap_or(&empty);

    let node = match filter.comparator {
        Comparator::Near => {
            let (point, distance) =
                value
                    .as_proximity()
                    .ok_or(FilterError::MalformedValue {
                        comparator: Comparator::Near,
                        expected: "{value, distance}",
                    })?;
            factory.function_filter(
                PROXIMITY_FUNCTION,
                vec![
                    Value::String(filter.property.clone()),
                    distance.clone(),
                    point.clone(),
                ],
            )
        }
        Comparator::IsEmpty => factory.null_filter(&filter.property),
        comparator => match comparator.query_operator() {
            Some(op) => factory.plain_filter(op, &filter.property, value),
            None => None,
        },
    };

    Ok(node.map(|mut node| {
        node.set_extension_data(filter.extension_data.clone());
        node
    }))
}
