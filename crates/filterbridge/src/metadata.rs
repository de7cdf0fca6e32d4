//! Property metadata consulted while decoding.
//!
//! The decoder only needs one fact about a property: its declared type, so it
//! can tell a relative-date `=` from a plain equality. [`MetadataLookup`] is
//! that seam. [`Catalog`] is the concrete implementation, built from the
//! search UI's metacard-type document.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Declared semantic type of a property.
///
/// Only [`AttributeType::Date`] changes decoding; the rest are carried so a
/// catalog can be inspected and re-serialized without loss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    Date,
    String,
    Xml,
    Long,
    Integer,
    Short,
    Float,
    Double,
    Boolean,
    Binary,
    Geometry,
    Object,
    /// Any type name this crate does not know about.
    Other(String),
}

impl AttributeType {
    /// Returns the catalog spelling of this type.
    pub fn as_str(&self) -> &str {
        match self {
            AttributeType::Date => "DATE",
            AttributeType::String => "STRING",
            AttributeType::Xml => "XML",
            AttributeType::Long => "LONG",
            AttributeType::Integer => "INTEGER",
            AttributeType::Short => "SHORT",
            AttributeType::Float => "FLOAT",
            AttributeType::Double => "DOUBLE",
            AttributeType::Boolean => "BOOLEAN",
            AttributeType::Binary => "BINARY",
            AttributeType::Geometry => "GEOMETRY",
            AttributeType::Object => "OBJECT",
            AttributeType::Other(name) => name,
        }
    }
}

impl From<String> for AttributeType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "DATE" => AttributeType::Date,
            "STRING" => AttributeType::String,
            "XML" => AttributeType::Xml,
            "LONG" => AttributeType::Long,
            "INTEGER" => AttributeType::Integer,
            "SHORT" => AttributeType::Short,
            "FLOAT" => AttributeType::Float,
            "DOUBLE" => AttributeType::Double,
            "BOOLEAN" => AttributeType::Boolean,
            "BINARY" => AttributeType::Binary,
            "GEOMETRY" => AttributeType::Geometry,
            "OBJECT" => AttributeType::Object,
            _ => AttributeType::Other(name),
        }
    }
}

impl From<&str> for AttributeType {
    fn from(name: &str) -> Self {
        AttributeType::from(name.to_string())
    }
}

impl From<AttributeType> for String {
    fn from(ty: AttributeType) -> Self {
        match ty {
            AttributeType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only lookup from property name to declared type.
///
/// Implementations must answer from memory; the codec calls this once per
/// plain leaf, synchronously.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use filterbridge::{AttributeType, MetadataLookup};
///
/// let mut types = HashMap::new();
/// types.insert("created".to_string(), AttributeType::Date);
///
/// assert!(types.is_date("created"));
/// assert!(!types.is_date("title"));
/// ```
pub trait MetadataLookup: Send + Sync {
    /// Returns the declared type of `property`, if the catalog knows it.
    fn attribute_type(&self, property: &str) -> Option<&AttributeType>;

    /// Returns `true` if `property` is declared as a date.
    fn is_date(&self, property: &str) -> bool {
        matches!(self.attribute_type(property), Some(AttributeType::Date))
    }
}

/// A lookup that knows nothing; every property is treated as non-date.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataLookup for NoMetadata {
    fn attribute_type(&self, _property: &str) -> Option<&AttributeType> {
        None
    }
}

impl MetadataLookup for HashMap<String, AttributeType> {
    fn attribute_type(&self, property: &str) -> Option<&AttributeType> {
        self.get(property)
    }
}

impl MetadataLookup for BTreeMap<String, AttributeType> {
    fn attribute_type(&self, property: &str) -> Option<&AttributeType> {
        self.get(property)
    }
}

/// One attribute as described by the metacard-type document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    /// Attribute name. Filled from the map key when the document omits it.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    #[serde(default)]
    pub multivalued: bool,
    #[serde(default)]
    pub is_injected: bool,
    /// Display name configured for the attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Hidden attributes are not offered in property pickers.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl AttributeDefinition {
    /// Creates a visible, single-valued definition.
    pub fn new(id: impl Into<String>, attribute_type: impl Into<AttributeType>) -> Self {
        AttributeDefinition {
            id: id.into(),
            attribute_type: attribute_type.into(),
            multivalued: false,
            is_injected: false,
            alias: None,
            hidden: false,
        }
    }

    /// Returns the alias if set, otherwise the id.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.id)
    }
}

/// A property offered by a picker: the attribute id and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeChoice {
    pub value: String,
    pub label: String,
}

/// In-memory snapshot of every known attribute, keyed by id.
///
/// # Example
///
/// ```
/// use filterbridge::{Catalog, MetadataLookup};
///
/// let json = r#"{
///     "ddf.metacard": {
///         "created": {"id": "created", "type": "DATE", "multivalued": false},
///         "title": {"id": "title", "type": "STRING", "multivalued": false}
///     }
/// }"#;
///
/// let catalog = Catalog::from_metacard_types_json(json).unwrap();
/// assert!(catalog.is_date("created"));
/// assert!(!catalog.is_date("title"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    attributes: BTreeMap<String, AttributeDefinition>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Parses a metacard-type document, `{typeName: {attribute: definition}}`.
    ///
    /// Attributes shared by several types are merged; the definition from the
    /// first type in name order wins.
    pub fn from_metacard_types_json(json: &str) -> Result<Self> {
        let types: BTreeMap<String, BTreeMap<String, AttributeDefinition>> =
            serde_json::from_str(json)?;

        let mut catalog = Catalog::new();
        for (type_name, attributes) in types {
            for (key, mut definition) in attributes {
                if definition.id.is_empty() {
                    definition.id = key.clone();
                }
                if catalog.attributes.contains_key(&key) {
                    tracing::trace!(attribute = %key, metacard_type = %type_name, "attribute already declared");
                    continue;
                }
                catalog.attributes.insert(key, definition);
            }
        }
        tracing::debug!(attributes = catalog.len(), "loaded metadata catalog");
        Ok(catalog)
    }

    /// Adds or replaces an attribute definition.
    pub fn insert(&mut self, definition: AttributeDefinition) {
        self.attributes.insert(definition.id.clone(), definition);
    }

    /// Builder form of [`Catalog::insert`].
    pub fn with(mut self, definition: AttributeDefinition) -> Self {
        self.insert(definition);
        self
    }

    /// Sets the display alias of a known attribute. Unknown ids are ignored.
    pub fn with_alias(mut self, id: &str, alias: impl Into<String>) -> Self {
        if let Some(definition) = self.attributes.get_mut(id) {
            definition.alias = Some(alias.into());
        }
        self
    }

    /// Marks a known attribute as hidden. Unknown ids are ignored.
    pub fn with_hidden(mut self, id: &str) -> Self {
        if let Some(definition) = self.attributes.get_mut(id) {
            definition.hidden = true;
        }
        self
    }

    /// Returns the definition of an attribute.
    pub fn get(&self, id: &str) -> Option<&AttributeDefinition> {
        self.attributes.get(id)
    }

    /// Iterates definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.values()
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns `true` if the catalog has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Visible date attributes, in id order, as picker choices.
    pub fn date_attributes(&self) -> Vec<AttributeChoice> {
        self.iter()
            .filter(|definition| !definition.hidden)
            .filter(|definition| definition.attribute_type == AttributeType::Date)
            .map(|definition| AttributeChoice {
                value: definition.id.clone(),
                label: definition.label().to_string(),
            })
            .collect()
    }
}

impl MetadataLookup for Catalog {
    fn attribute_type(&self, property: &str) -> Option<&AttributeType> {
        self.attributes
            .get(property)
            .map(|definition| &definition.attribute_type)
    }
}
