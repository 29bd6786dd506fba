//! Named projection views
//!
//! A view selects node labels and relationship types out of the stored graph
//! and fixes how each relationship is oriented for downstream algorithms.

use crate::graph::{EdgeType, Label};
use crate::schema::{edge_types, labels};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a stored relationship appears in a view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    /// Stored direction
    #[default]
    #[serde(alias = "DIRECTED")]
    Natural,
    /// Flipped direction
    Reverse,
    /// Both directions
    Undirected,
}

/// Edge property read as the view weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightProperty {
    pub property: String,
    /// Used when the edge lacks the property or it is not numeric
    pub default_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipProjection {
    pub edge_type: EdgeType,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<WeightProperty>,
}

/// One named view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSpec {
    pub name: String,
    pub labels: Vec<Label>,
    pub relationships: Vec<RelationshipProjection>,
}

impl ProjectionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_relationship(
        mut self,
        edge_type: impl Into<EdgeType>,
        orientation: Orientation,
    ) -> Self {
        self.relationships.push(RelationshipProjection {
            edge_type: edge_type.into(),
            orientation,
            weight: None,
        });
        self
    }

    pub fn with_weighted_relationship(
        mut self,
        edge_type: impl Into<EdgeType>,
        orientation: Orientation,
        property: impl Into<String>,
        default_value: f64,
    ) -> Self {
        self.relationships.push(RelationshipProjection {
            edge_type: edge_type.into(),
            orientation,
            weight: Some(WeightProperty {
                property: property.into(),
                default_value,
            }),
        });
        self
    }

    /// True when any relationship carries a weight
    pub fn is_weighted(&self) -> bool {
        self.relationships.iter().any(|rel| rel.weight.is_some())
    }
}

/// Views by name, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionCatalog {
    views: IndexMap<String, ProjectionSpec>,
}

impl ProjectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three views consumed downstream
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.declare(
            ProjectionSpec::new("salesperson-graph")
                .with_label(labels::PERSON)
                .with_relationship(edge_types::WORKS_WITH, Orientation::Natural),
        );
        catalog.declare(
            ProjectionSpec::new("product-graph")
                .with_label(labels::PRODUCT)
                .with_weighted_relationship(
                    edge_types::COMMONLY_SOLD_BY,
                    Orientation::Undirected,
                    "weight",
                    1.0,
                ),
        );
        catalog.declare(
            ProjectionSpec::new("knowledge-graph")
                .with_label(labels::PRODUCT)
                .with_label(labels::SUBCATEGORY)
                .with_label(labels::CATEGORY)
                .with_label(labels::RESELLER)
                .with_label(labels::CITY)
                .with_relationship(edge_types::IN_SUBCATEGORY, Orientation::Undirected)
                .with_relationship(edge_types::IN_CATEGORY, Orientation::Undirected)
                .with_relationship(edge_types::SOLD, Orientation::Undirected)
                .with_relationship(edge_types::LOCATED_IN, Orientation::Undirected),
        );
        catalog
    }

    /// Register a view, replacing any view with the same name.
    ///
    /// A replaced view is dropped first, so it moves to the end of the
    /// declaration order. Returns the replaced view.
    pub fn declare(&mut self, spec: ProjectionSpec) -> Option<ProjectionSpec> {
        let previous = self.views.shift_remove(&spec.name);
        if previous.is_some() {
            debug!("Replacing projection view {}", spec.name);
        }
        self.views.insert(spec.name.clone(), spec);
        previous
    }

    /// Remove a view; missing names are not an error
    pub fn drop(&mut self, name: &str) -> bool {
        self.views.shift_remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&ProjectionSpec> {
        self.views.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.views.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectionSpec> {
        self.views.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}
