//! Order Records

use grocer::{
    cart::CartSnapshot,
    customers::CustomerId,
    orders::{Fulfillment, OrderDraft, OrderId, OrderStatus},
    products::ProductId,
};
use jiff::Timestamp;

/// Order Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub customer_id: CustomerId,

    /// Cart as it was at commit time
    pub items: CartSnapshot,
    pub subtotal: u64,
    pub delivery_fee: u64,
    pub total: u64,
    pub fulfillment: Fulfillment,
    pub delivery_address: Option<String>,
    pub phone: String,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Whether this stored order is the one `draft` describes.
    pub fn matches_draft(&self, draft: &OrderDraft) -> bool {
        self.id == draft.id
            && self.customer_id == draft.customer
            && self.total == draft.quote.total
            && self.items == draft.snapshot
    }
}

/// Order Item Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub id: i64,
    pub order_id: OrderId,

    /// `None` once the product has been deleted
    pub product_id: Option<ProductId>,
    pub quantity: u32,
    pub unit_price: u64,
    pub subtotal: u64,
}

/// Order with the name of the customer who placed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentOrderRecord {
    pub order: OrderRecord,
    pub customer_name: String,
}

/// Aggregate sales over a time window, cancelled orders excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SalesSummary {
    pub order_count: u64,

    /// Sum of order totals, in minor units
    pub revenue: u64,

    /// Mean order total rounded down, zero when there were no orders
    pub average: u64,
}

impl SalesSummary {
    pub(crate) fn new(order_count: u64, revenue: u64) -> Self {
        let average = revenue.checked_div(order_count).unwrap_or_default();

        Self {
            order_count,
            revenue,
            average,
        }
    }
}
