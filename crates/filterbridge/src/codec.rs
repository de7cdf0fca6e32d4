//! Tree-level encode and decode.
//!
//! [`Codec`] walks whole trees and hands every leaf to the leaf transform.
//! Decoding is top-down: wire groups become [`FilterGroup`]s and leaves are
//! decoded against the metadata lookup. Encoding is bottom-up: children are
//! encoded first and any child that produces nothing is dropped.
//!
//! A `NONE` group encodes as `NOT(AND(children))`. Decoding that shape gives
//! a `NOT` group around an `AND` group, not `NONE`.

use crate::error::{FilterError, Result};
use crate::leaf::{decode_function_leaf, decode_leaf, encode_leaf};
use crate::metadata::{MetadataLookup, NoMetadata};
use crate::tree::{FilterGroup, GroupOperator, UiNode};
use crate::wire::{BooleanOperator, CqlFilterFactory, FilterFactory, WireGroup, WireLeaf, WireNode};

/// Default nesting limit for both directions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

static NO_METADATA: NoMetadata = NoMetadata;
static CQL_FACTORY: CqlFilterFactory = CqlFilterFactory;

/// Tunables for a [`Codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Deepest group nesting accepted. The root group is level 1.
    pub max_depth: usize,
}

impl Default for CodecOptions {
    fn default() -> Self {
        CodecOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Converts filter trees in both directions.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use filterbridge::{AttributeType, Codec, Comparator, QueryOperator, WireLeaf, WireNode};
///
/// let mut types = HashMap::new();
/// types.insert("created".to_string(), AttributeType::Date);
///
/// let codec = Codec::new(&types);
/// let wire = WireNode::Leaf(WireLeaf::new(QueryOperator::Eq, "created", "P1D"));
///
/// let tree = codec.decode(Some(&wire)).unwrap();
/// let leaf = tree.filters[0].as_leaf().unwrap();
/// assert_eq!(leaf.comparator, Comparator::Relative);
///
/// let back = codec.encode(&tree).unwrap();
/// assert_eq!(back.as_group().unwrap().filters[0], wire);
/// ```
#[derive(Clone, Copy)]
pub struct Codec<'a> {
    metadata: &'a dyn MetadataLookup,
    factory: &'a dyn FilterFactory,
    options: CodecOptions,
}

impl Default for Codec<'static> {
    fn default() -> Self {
        Codec::new(&NO_METADATA)
    }
}

impl<'a> Codec<'a> {
    /// Creates a codec over a metadata lookup, with the CQL filter builders.
    pub fn new(metadata: &'a dyn MetadataLookup) -> Self {
        Codec {
            metadata,
            factory: &CQL_FACTORY,
            options: CodecOptions::default(),
        }
    }

    /// Replaces the filter builders.
    pub fn with_factory(mut self, factory: &'a dyn FilterFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the options in effect.
    pub fn options(&self) -> CodecOptions {
        self.options
    }

    // ========================================================================
    // Decode
    // ========================================================================

    /// Decodes a wire tree, a bare wire leaf, or nothing.
    ///
    /// `None` yields the blank search: an `AND` group holding
    /// `anyText CONTAINS ""`. A bare leaf is wrapped in an `AND` group.
    pub fn decode(&self, wire: Option<&WireNode>) -> Result<FilterGroup> {
        match wire {
            Some(WireNode::Group(group)) => self.decode_tree(group),
            Some(leaf) => self.wrap(leaf),
            None => self.wrap(&WireNode::Leaf(WireLeaf::default_filter())),
        }
    }

    /// Decodes a wire group.
    pub fn decode_tree(&self, group: &WireGroup) -> Result<FilterGroup> {
        tracing::debug!(op = ?group.op, children = group.filters.len(), "decoding filter tree");
        self.decode_group(group, 1)
    }

    /// Parses and decodes wire JSON. Blank input and `null` mean "no filter".
    pub fn decode_json(&self, json: &str) -> Result<FilterGroup> {
        if json.trim().is_empty() {
            return self.decode(None);
        }
        let wire: Option<WireNode> = serde_json::from_str(json)?;
        self.decode(wire.as_ref())
    }

    fn wrap(&self, leaf: &WireNode) -> Result<FilterGroup> {
        let mut root = FilterGroup::new(GroupOperator::And);
        root.push(self.decode_node(leaf, 2)?);
        Ok(root)
    }

    fn decode_group(&self, group: &WireGroup, depth: usize) -> Result<FilterGroup> {
        self.check_depth(depth)?;
        let mut ui = FilterGroup::new(group.op.into());
        for child in &group.filters {
            ui.push(self.decode_node(child, depth + 1)?);
        }
        Ok(ui)
    }

    fn decode_node(&self, node: &WireNode, depth: usize) -> Result<UiNode> {
        let decoded = match node {
            WireNode::Group(group) => UiNode::Group(self.decode_group(group, depth)?),
            WireNode::Function(leaf) => UiNode::Leaf(decode_function_leaf(leaf)?),
            WireNode::Leaf(leaf) => UiNode::Leaf(decode_leaf(leaf, self.metadata, self.factory)),
        };
        Ok(decoded)
    }

    // ========================================================================
    // Encode
    // ========================================================================

    /// Encodes a UI tree rooted at a group.
    pub fn encode(&self, group: &FilterGroup) -> Result<WireNode> {
        tracing::debug!(operator = ?group.operator, children = group.len(), "encoding filter tree");
        self.encode_group(group, 1)
    }

    /// Encodes any UI node. A leaf the factory builds nothing for gives `None`.
    pub fn encode_node(&self, node: &UiNode) -> Result<Option<WireNode>> {
        match node {
            UiNode::Group(group) => self.encode(group).map(Some),
            UiNode::Leaf(filter) => encode_leaf(filter, self.factory),
        }
    }

    /// Parses a UI tree from JSON and encodes it.
    pub fn encode_json(&self, json: &str) -> Result<WireNode> {
        let group: FilterGroup = serde_json::from_str(json)?;
        self.encode(&group)
    }

    fn encode_group(&self, group: &FilterGroup, depth: usize) -> Result<WireNode> {
        self.check_depth(depth)?;

        let mut filters = Vec::with_capacity(group.filters.len());
        for child in &group.filters {
            let encoded = match child {
                UiNode::Group(inner) => Some(self.encode_group(inner, depth + 1)?),
                UiNode::Leaf(filter) => encode_leaf(filter, self.factory)?,
            };
            match encoded {
                Some(node) => filters.push(node),
                None => tracing::debug!(sort_order = child.sort_order(), "dropped empty filter"),
            }
        }

        let wire = match group.operator.boolean_operator() {
            Some(op) => WireGroup::new(op, filters),
            None => WireGroup::new(
                BooleanOperator::Not,
                vec![WireNode::Group(WireGroup::new(BooleanOperator::And, filters))],
            ),
        };
        Ok(WireNode::Group(wire))
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.options.max_depth {
            return Err(FilterError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }
}

/// Decodes with no metadata and the CQL builders.
pub fn decode(wire: Option<&WireNode>) -> Result<FilterGroup> {
    Codec::default().decode(wire)
}

/// Encodes with the CQL builders.
pub fn encode(group: &FilterGroup) -> Result<WireNode> {
    Codec::default().encode(group)
}
