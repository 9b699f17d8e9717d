//! Customer Records

use grocer::customers::{CustomerId, display_name};
use jiff::Timestamp;

/// Customer Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub registered_at: Timestamp,
    pub last_active_at: Timestamp,
}

impl CustomerRecord {
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, self.last_name.as_deref().unwrap_or_default())
    }
}

/// Address Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub id: i64,
    pub customer_id: CustomerId,
    pub label: String,
    pub street_address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub is_default: bool,
    pub created_at: Timestamp,
}

/// Customer ranked by spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopCustomerRecord {
    pub id: CustomerId,
    pub name: String,
    pub order_count: u64,

    /// Sum of non-cancelled order totals, in minor units
    pub total_spent: u64,
}

/// Customer Stats
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerStats {
    pub total: u64,

    /// Customers seen since the requested cut-off
    pub active: u64,
    pub top_customers: Vec<TopCustomerRecord>,
}
