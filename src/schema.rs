//! Labels and relationship types of the sales graph

/// Node labels
pub mod labels {
    pub const PERSON: &str = "Person";
    pub const REGION: &str = "Region";
    pub const PRODUCT: &str = "Product";
    pub const RESELLER: &str = "Reseller";
    pub const SUBCATEGORY: &str = "Subcategory";
    pub const CATEGORY: &str = "Category";
    pub const CITY: &str = "City";
}

/// Relationship types
pub mod edge_types {
    pub const ASSIGNED_TO: &str = "ASSIGNED_TO";
    pub const SOLD: &str = "SOLD";
    pub const WORKS_WITH: &str = "WORKS_WITH";
    pub const COMMONLY_SOLD_BY: &str = "COMMONLY_SOLD_BY";
    pub const IN_SUBCATEGORY: &str = "IN_SUBCATEGORY";
    pub const IN_CATEGORY: &str = "IN_CATEGORY";
    pub const LOCATED_IN: &str = "LOCATED_IN";
}
