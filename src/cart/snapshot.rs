//! Cart snapshot stored alongside a persisted order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{cart::CartLine, products::ProductId};

/// One line of a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLine {
    /// Product name at the time the line was added
    pub name: String,

    /// Price charged per unit, in minor units
    pub unit_price: u64,

    /// Units ordered
    pub quantity: u32,
}

/// Mapping of product id to the purchased line, as serialised into the order row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot(BTreeMap<ProductId, SnapshotLine>);

impl CartSnapshot {
    pub(crate) fn from_lines(lines: &[CartLine]) -> Self {
        Self(
            lines
                .iter()
                .map(|line| {
                    (
                        line.product_id,
                        SnapshotLine {
                            name: line.name.clone(),
                            unit_price: line.unit_price,
                            quantity: line.quantity,
                        },
                    )
                })
                .collect(),
        )
    }

    /// Iterate lines ordered by product id.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, &SnapshotLine)> {
        self.0.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of unit price times quantity.
    pub fn total(&self) -> u64 {
        self.0.values().fold(0_u64, |acc, line| {
            acc.saturating_add(line.unit_price.saturating_mul(u64::from(line.quantity)))
        })
    }

    /// Serialise to the JSON form stored in the database.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` serialisation failures.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Parse the stored JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error when the value does not match the snapshot shape.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
