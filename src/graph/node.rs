//! Node implementation for the sales graph
//!
//! A node carries exactly one label and one natural key. The key is
//! immutable; every other attribute can be overwritten by a later upsert.

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId, NodeKey};
use serde::{Deserialize, Serialize};

/// A node in the property graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Store-assigned identifier
    pub id: NodeId,

    /// Entity label (Person, Region, ...)
    pub label: Label,

    /// Natural business key, unique within `label`
    pub key: NodeKey,

    /// Non-key attributes
    pub properties: PropertyMap,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Node {
    /// Create a new node with the given identity and attributes
    pub fn new(id: NodeId, label: impl Into<Label>, key: NodeKey, properties: PropertyMap) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Node {
            id,
            label: label.into(),
            key,
            properties,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &Label) -> bool {
        self.label == *label
    }

    /// Replace every non-key attribute with `properties`
    pub fn overwrite_properties(&mut self, properties: PropertyMap) {
        self.properties = properties;
        self.update_timestamp();
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Get a string property, treating blanks and non-strings as absent
    pub fn text_property(&self, key: &str) -> Option<&str> {
        self.get_property(key)
            .and_then(PropertyValue::as_string)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn update_timestamp(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
