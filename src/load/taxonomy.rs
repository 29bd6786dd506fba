//! Derived taxonomy and location nodes
//!
//! Products carry their subcategory and category as plain attributes and
//! resellers carry their address. This stage turns those attributes into
//! `Subcategory`, `Category` and `City` nodes with linking edges.

use crate::error::PipelineResult;
use crate::graph::{
    EdgeType, GraphBackend, Label, NodeKey, NodeRef, PropertyMap, PropertyValue, UpsertOutcome,
};
use crate::schema::{edge_types, labels};
use serde::Serialize;
use tracing::info;

/// Counts from one derivation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaxonomyStats {
    pub subcategories: usize,
    pub categories: usize,
    pub cities: usize,
    pub edges_created: usize,
}

fn text_attr<'p>(properties: &'p PropertyMap, name: &str) -> Option<&'p str> {
    properties
        .get(name)
        .and_then(PropertyValue::as_string)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// City key: the non-blank parts of "city, state, country"
pub fn city_key(city: &str, state: Option<&str>, country: Option<&str>) -> String {
    [Some(city), state, country]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct TaxonomyDeriver<'a, B: GraphBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: GraphBackend + ?Sized> TaxonomyDeriver<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    pub fn derive(&mut self) -> PipelineResult<TaxonomyStats> {
        let mut stats = TaxonomyStats::default();
        self.derive_product_taxonomy(&mut stats)?;
        self.derive_reseller_cities(&mut stats)?;

        info!(
            "Derived {} subcategories, {} categories, {} cities ({} new edges)",
            stats.subcategories, stats.categories, stats.cities, stats.edges_created
        );
        Ok(stats)
    }

    fn derive_product_taxonomy(&mut self, stats: &mut TaxonomyStats) -> PipelineResult<()> {
        let product = Label::new(labels::PRODUCT);
        let subcategory = Label::new(labels::SUBCATEGORY);
        let category = Label::new(labels::CATEGORY);
        let in_subcategory = EdgeType::new(edge_types::IN_SUBCATEGORY);
        let in_category = EdgeType::new(edge_types::IN_CATEGORY);

        for (product_key, properties) in self.backend.scan_label(&product)? {
            let Some(sub_name) = text_attr(&properties, "subcategory") else {
                continue;
            };
            let sub_key = NodeKey::from(sub_name);
            let outcome = self
                .backend
                .upsert_node(&subcategory, sub_key.clone(), PropertyMap::new())?;
            if outcome.is_created() {
                stats.subcategories += 1;
            }
            self.link(
                &in_subcategory,
                NodeRef::new(&product, &product_key),
                NodeRef::new(&subcategory, &sub_key),
                stats,
            )?;

            if let Some(cat_name) = text_attr(&properties, "category") {
                let cat_key = NodeKey::from(cat_name);
                let outcome = self
                    .backend
                    .upsert_node(&category, cat_key.clone(), PropertyMap::new())?;
                if outcome.is_created() {
                    stats.categories += 1;
                }
                self.link(
                    &in_category,
                    NodeRef::new(&subcategory, &sub_key),
                    NodeRef::new(&category, &cat_key),
                    stats,
                )?;
            }
        }
        Ok(())
    }

    fn derive_reseller_cities(&mut self, stats: &mut TaxonomyStats) -> PipelineResult<()> {
        let reseller = Label::new(labels::RESELLER);
        let city = Label::new(labels::CITY);
        let located_in = EdgeType::new(edge_types::LOCATED_IN);

        for (reseller_key, properties) in self.backend.scan_label(&reseller)? {
            let Some(city_name) = text_attr(&properties, "city") else {
                continue;
            };
            let state = text_attr(&properties, "state");
            let country = text_attr(&properties, "country");
            let key = NodeKey::Text(city_key(city_name, state, country));

            let attributes = PropertyMap::from([
                ("city".to_string(), PropertyValue::from(city_name)),
                ("state".to_string(), state.into()),
                ("country".to_string(), country.into()),
            ]);
            if self.backend.upsert_node(&city, key.clone(), attributes)?.is_created() {
                stats.cities += 1;
            }
            self.link(
                &located_in,
                NodeRef::new(&reseller, &reseller_key),
                NodeRef::new(&city, &key),
                stats,
            )?;
        }
        Ok(())
    }

    fn link(
        &mut self,
        edge_type: &EdgeType,
        from: NodeRef<'_>,
        to: NodeRef<'_>,
        stats: &mut TaxonomyStats,
    ) -> PipelineResult<()> {
        let outcome = self.backend.upsert_edge(edge_type, from, to, PropertyMap::new())?;
        if outcome == UpsertOutcome::Created {
            stats.edges_created += 1;
        }
        Ok(())
    }
}
