//! Filterbridge - two-way conversion between editable filter trees and
//! CQL-shaped wire filter trees.
//!
//! A search UI edits filters as a tree of groups and leaves, where each leaf
//! reads like a sentence: *title CONTAINS "ship"*, *created RELATIVE "P1D"*,
//! *location NEAR 500m of POINT(1 2)*. Saved searches store the same filter as
//! a CQL-shaped JSON tree of boolean groups and operator leaves. This crate
//! converts between the two so a saved search can be re-opened in the editor
//! exactly as it was left.
//!
//! # Quick Start
//!
//! ```rust
//! use filterbridge::{Catalog, Codec, Comparator, Filter, FilterGroup, FilterValue, GroupOperator};
//!
//! let catalog = Catalog::from_metacard_types_json(
//!     r#"{"ddf.metacard": {"created": {"id": "created", "type": "DATE"}}}"#,
//! )
//! .unwrap();
//! let codec = Codec::new(&catalog);
//!
//! let tree = FilterGroup::new(GroupOperator::And)
//!     .with(Filter::new("title", Comparator::Contains, "ship"))
//!     .with(Filter::new("created", Comparator::Relative, "P1D"))
//!     .with(Filter::new("size", Comparator::Range, FilterValue::range(1, 10)));
//!
//! let wire = codec.encode(&tree).unwrap();
//! let reopened = codec.decode(Some(&wire)).unwrap();
//! assert_eq!(reopened, tree);
//! ```
//!
//! # Comparators and operators
//!
//! | Comparator | Wire operator | Value shape |
//! |------------|---------------|-------------|
//! | `CONTAINS` / `MATCHCASE` | `ILIKE` / `LIKE` | text |
//! | `EQUALS`, `=`, `RELATIVE` | `=` | scalar; `RELATIVE` only over DATE properties |
//! | `>`, `<`, `>=`, `<=` | same | scalar |
//! | `BEFORE` / `AFTER` | same | timestamp text |
//! | `BETWEEN` | `DURING` | `from/to` interval text |
//! | `RANGE` | `BETWEEN` | `{lower, upper}` |
//! | `INTERSECTS` / `DWITHIN` | same | the whole wire leaf |
//! | `IS EMPTY` | `IS NULL` | none |
//! | `NEAR` | `proximity(...) = true` | `{value, distance}` |
//!
//! # Known asymmetries
//!
//! - `=` decodes as `RELATIVE` for DATE properties and `EQUALS` otherwise, so
//!   the bare `=` comparator comes back as `EQUALS`.
//! - A `NONE` group encodes as `NOT(AND(..))` and decodes as a `NOT` group.

mod codec;
mod comparator;
mod error;
mod leaf;
mod metadata;
mod tree;
mod value;
mod wire;

// Re-export public API
pub use codec::{decode, encode, Codec, CodecOptions, DEFAULT_MAX_DEPTH};
pub use comparator::{Comparator, QueryOperator, COMPARATOR_TABLE, EQUALITY_COMPARATOR};
pub use error::{FilterError, Result};
pub use leaf::{decode_function_leaf, decode_leaf, encode_leaf};
pub use metadata::{
    AttributeChoice, AttributeDefinition, AttributeType, Catalog, MetadataLookup, NoMetadata,
};
pub use tree::{Filter, FilterGroup, GroupOperator, UiNode};
pub use value::{DateInterval, FilterValue};
pub use wire::{
    BooleanOperator, CqlFilterFactory, FilterFactory, FunctionCall, FunctionLeaf, WireGroup,
    WireLeaf, WireNode, FILTER_FUNCTION_KIND, FROM, LOWER_BOUNDARY, PROXIMITY_FUNCTION, TO,
    UPPER_BOUNDARY,
};
