//! Products Data

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: u64,
    pub stock: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Product Update Data
///
/// Stock is changed through `set_stock` so every change is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub category: String,
    pub price: u64,
    pub description: Option<String>,
    pub image_url: Option<String>,
}
