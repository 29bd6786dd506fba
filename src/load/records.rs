//! Typed input records
//!
//! One record type per source file. Entity records become nodes, link
//! records become edges between two already-loaded entities.

use super::source::Row;
use crate::error::PipelineResult;
use crate::graph::{NodeKey, PropertyMap, PropertyValue};
use crate::schema::{edge_types, labels};
use tracing::warn;

/// A record that can be built from one row of a tabular source
pub trait FromRow: Sized {
    /// Header columns the source must provide
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row) -> PipelineResult<Self>;
}

/// A record describing one entity node
pub trait EntityRecord: FromRow {
    const LABEL: &'static str;

    fn key(&self) -> NodeKey;

    /// Non-key attributes written on upsert
    fn into_properties(self) -> PropertyMap;
}

/// A record referencing two entities by natural key
pub trait LinkRecord: FromRow {
    const FROM_LABEL: &'static str;
    const TO_LABEL: &'static str;
    const EDGE_TYPE: &'static str;

    fn endpoints(&self) -> (NodeKey, NodeKey);
}

/// Blank cells become `Null`
fn text_value(raw: &str) -> PropertyValue {
    if raw.is_empty() {
        PropertyValue::Null
    } else {
        PropertyValue::String(raw.to_string())
    }
}

fn integer_or_text(raw: &str) -> PropertyValue {
    raw.parse::<i64>()
        .map(PropertyValue::Integer)
        .unwrap_or_else(|_| text_value(raw))
}

/// Currency formatted decimals such as `$1,898.09`
pub(crate) fn decimal_value(raw: &str) -> PropertyValue {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return PropertyValue::Null;
    }
    match cleaned.parse::<f64>() {
        Ok(value) => PropertyValue::Float(value),
        Err(_) => {
            warn!("Keeping non-decimal value '{}' as text", raw);
            PropertyValue::String(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub key: i64,
    pub external_id: String,
    pub display_name: String,
    pub title: String,
}

impl FromRow for PersonRecord {
    const COLUMNS: &'static [&'static str] = &["EmployeeKey", "EmployeeID", "Salesperson", "Title"];

    fn from_row(row: &Row) -> PipelineResult<Self> {
        Ok(Self {
            key: row.int_key("EmployeeKey")?,
            external_id: row.text("EmployeeID").to_string(),
            display_name: row.text("Salesperson").to_string(),
            title: row.text("Title").to_string(),
        })
    }
}

impl EntityRecord for PersonRecord {
    const LABEL: &'static str = labels::PERSON;

    fn key(&self) -> NodeKey {
        NodeKey::Int(self.key)
    }

    fn into_properties(self) -> PropertyMap {
        PropertyMap::from([
            ("externalId".to_string(), integer_or_text(&self.external_id)),
            ("displayName".to_string(), text_value(&self.display_name)),
            ("title".to_string(), text_value(&self.title)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub key: i64,
    pub name: String,
    pub country: String,
    pub group: String,
}

impl FromRow for RegionRecord {
    const COLUMNS: &'static [&'static str] = &["SalesTerritoryKey", "Region", "Country", "Group"];

    fn from_row(row: &Row) -> PipelineResult<Self> {
        Ok(Self {
            key: row.int_key("SalesTerritoryKey")?,
            name: row.text("Region").to_string(),
            country: row.text("Country").to_string(),
            group: row.text("Group").to_string(),
        })
    }
}

impl EntityRecord for RegionRecord {
    const LABEL: &'static str = labels::REGION;

    fn key(&self) -> NodeKey {
        NodeKey::Int(self.key)
    }

    fn into_properties(self) -> PropertyMap {
        PropertyMap::from([
            ("name".to_string(), text_value(&self.name)),
            ("country".to_string(), text_value(&self.country)),
            ("group".to_string(), text_value(&self.group)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub key: i64,
    pub name: String,
    pub standard_cost: String,
    pub color: String,
    pub subcategory: String,
    pub category: String,
}

impl FromRow for ProductRecord {
    const COLUMNS: &'static [&'static str] = &[
        "ProductKey",
        "Product",
        "Standard Cost",
        "Color",
        "Subcategory",
        "Category",
    ];

    fn from_row(row: &Row) -> PipelineResult<Self> {
        Ok(Self {
            key: row.int_key("ProductKey")?,
            name: row.text("Product").to_string(),
            standard_cost: row.text("Standard Cost").to_string(),
            color: row.text("Color").to_string(),
            subcategory: row.text("Subcategory").to_string(),
            category: row.text("Category").to_string(),
        })
    }
}

impl EntityRecord for ProductRecord {
    const LABEL: &'static str = labels::PRODUCT;

    fn key(&self) -> NodeKey {
        NodeKey::Int(self.key)
    }

    fn into_properties(self) -> PropertyMap {
        PropertyMap::from([
            ("name".to_string(), text_value(&self.name)),
            ("standardCost".to_string(), decimal_value(&self.standard_cost)),
            ("color".to_string(), text_value(&self.color)),
            ("subcategory".to_string(), text_value(&self.subcategory)),
            ("category".to_string(), text_value(&self.category)),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResellerRecord {
    pub key: i64,
    pub name: String,
    pub business_type: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl FromRow for ResellerRecord {
    const COLUMNS: &'static [&'static str] = &[
        "ResellerKey",
        "Reseller",
        "Business Type",
        "City",
        "State-Province",
        "Country-Region",
    ];

    fn from_row(row: &Row) -> PipelineResult<Self> {
        Ok(Self {
            key: row.int_key("ResellerKey")?,
            name: row.text("Reseller").to_string(),
            business_type: row.text("Business Type").to_string(),
            city: row.text("City").to_string(),
            state: row.text("State-Province").to_string(),
            country: row.text("Country-Region").to_string(),
        })
    }
}

impl EntityRecord for ResellerRecord {
    const LABEL: &'static str = labels::RESELLER;

    fn key(&self) -> NodeKey {
        NodeKey::Int(self.key)
    }

    fn into_properties(self) -> PropertyMap {
        PropertyMap::from([
            ("name".to_string(), text_value(&self.name)),
            ("businessType".to_string(), text_value(&self.business_type)),
            ("city".to_string(), text_value(&self.city)),
            ("state".to_string(), text_value(&self.state)),
            ("country".to_string(), text_value(&self.country)),
        ])
    }
}

/// Salesperson assigned to a sales territory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub person: i64,
    pub region: i64,
}

impl FromRow for AssignmentRecord {
    const COLUMNS: &'static [&'static str] = &["EmployeeKey", "SalesTerritoryKey"];

    fn from_row(row: &Row) -> PipelineResult<Self> {
        Ok(Self {
            person: row.int_key("EmployeeKey")?,
            region: row.int_key("SalesTerritoryKey")?,
        })
    }
}

impl LinkRecord for AssignmentRecord {
    const FROM_LABEL: &'static str = labels::PERSON;
    const TO_LABEL: &'static str = labels::REGION;
    const EDGE_TYPE: &'static str = edge_types::ASSIGNED_TO;

    fn endpoints(&self) -> (NodeKey, NodeKey) {
        (NodeKey::Int(self.person), NodeKey::Int(self.region))
    }
}

/// One sales order line; only the reseller and product matter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleRecord {
    pub reseller: i64,
    pub product: i64,
}

impl FromRow for SaleRecord {
    const COLUMNS: &'static [&'static str] = &["ResellerKey", "ProductKey"];

    fn from_row(row: &Row) -> PipelineResult<Self> {
        Ok(Self {
            reseller: row.int_key("ResellerKey")?,
            product: row.int_key("ProductKey")?,
        })
    }
}

impl LinkRecord for SaleRecord {
    const FROM_LABEL: &'static str = labels::RESELLER;
    const TO_LABEL: &'static str = labels::PRODUCT;
    const EDGE_TYPE: &'static str = edge_types::SOLD;

    fn endpoints(&self) -> (NodeKey, NodeKey) {
        (NodeKey::Int(self.reseller), NodeKey::Int(self.product))
    }
}
