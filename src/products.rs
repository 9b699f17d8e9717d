//! Products

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    num::ParseIntError,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Product identifier assigned by the catalog store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Wrap a raw catalog id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw catalog id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Catalog product as seen by the ordering flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    /// Product id
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Free-text grouping
    pub category: String,

    /// Unit price in minor units
    pub price: u64,

    /// Units currently in stock
    pub stock: u32,

    /// Optional description
    pub description: Option<String>,

    /// Optional image reference
    pub image_url: Option<String>,
}

impl CatalogProduct {
    /// Whether at least one unit can be sold.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn product_id_parses_from_callback_suffix() -> TestResult {
        let id: ProductId = "42".parse()?;

        assert_eq!(id, ProductId::new(42));
        assert_eq!(id.to_string(), "42");

        Ok(())
    }

    #[test]
    fn product_id_rejects_garbage() {
        assert!("forty-two".parse::<ProductId>().is_err());
    }
}
