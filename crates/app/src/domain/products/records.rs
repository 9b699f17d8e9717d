//! Product Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use grocer::{
    orders::UnknownVariant,
    products::{CatalogProduct, ProductId},
};
use jiff::Timestamp;

/// Product Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: u64,
    pub stock: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProductRecord> for CatalogProduct {
    fn from(record: ProductRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            category: record.category,
            price: record.price,
            stock: record.stock,
            description: record.description,
            image_url: record.image_url,
        }
    }
}

/// Product ranked by how often it was ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularProductRecord {
    pub product: ProductRecord,

    /// Distinct non-cancelled orders containing the product
    pub order_count: u64,

    /// Units sold across those orders
    pub units_sold: u64,
}

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryAction {
    Sale,
    Restock,
    Adjustment,
}

impl InventoryAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Restock => "restock",
            Self::Adjustment => "adjustment",
        }
    }

    /// Classify a manual stock change.
    pub const fn for_change(previous: u32, new: u32) -> Self {
        if new > previous {
            Self::Restock
        } else {
            Self::Adjustment
        }
    }
}

impl FromStr for InventoryAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "restock" => Ok(Self::Restock),
            "adjustment" => Ok(Self::Adjustment),
            _ => Err(UnknownVariant {
                kind: "inventory action",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for InventoryAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Inventory Log Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryLogRecord {
    pub id: i64,
    pub product_id: ProductId,
    pub action: InventoryAction,
    pub quantity_change: i64,
    pub previous_stock: u32,
    pub new_stock: u32,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}
