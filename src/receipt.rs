//! Receipt

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Zoned;
use rusty_money::iso::Currency;

use crate::{
    cart::CartLine,
    money::format_minor,
    orders::{Fulfillment, OrderDraft, OrderId},
    pricing::Quote,
};

/// Confirmation document sent after an order is committed.
#[derive(Debug, Clone)]
pub struct Receipt {
    order_id: OrderId,
    placed_at: Zoned,
    lines: Vec<CartLine>,
    quote: Quote,
    fulfillment: Fulfillment,
    address: Option<String>,
    phone: String,
    currency: &'static Currency,
}

impl Receipt {
    /// Receipt for a committed `draft`.
    pub fn new(draft: &OrderDraft, placed_at: Zoned, currency: &'static Currency) -> Self {
        Self {
            order_id: draft.id.clone(),
            placed_at,
            lines: draft.lines.clone(),
            quote: draft.quote,
            fulfillment: draft.fulfillment,
            address: draft.address.clone(),
            phone: draft.phone.clone(),
            currency,
        }
    }

    /// Order the receipt is for.
    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Amount charged.
    pub fn total(&self) -> u64 {
        self.quote.total
    }

    /// Fixed readiness estimate for the fulfillment type.
    pub fn readiness(&self) -> &'static str {
        match self.fulfillment {
            Fulfillment::Delivery => "🚚 Expected delivery time: 30-45 minutes",
            Fulfillment::Pickup => "🏪 You can pick up your order in 15-20 minutes",
        }
    }

    fn money(&self, amount: u64) -> String {
        format_minor(amount, self.currency)
    }
}

impl Display for Receipt {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "🧾 ORDER CONFIRMATION")?;
        writeln!(f)?;
        writeln!(f, "📋 Order ID: {}", self.order_id)?;
        writeln!(f, "📅 Date: {}", self.placed_at.strftime("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f)?;
        writeln!(f, "Items Ordered:")?;

        for line in &self.lines {
            writeln!(
                f,
                "• {} x {} = {}",
                line.name,
                line.quantity,
                self.money(line.subtotal())
            )?;
        }

        writeln!(f)?;
        writeln!(f, "💰 Subtotal: {}", self.money(self.quote.subtotal))?;
        writeln!(f, "🚚 Delivery Fee: {}", self.money(self.quote.delivery_fee))?;
        writeln!(f, "Total Amount: {}", self.money(self.quote.total))?;
        writeln!(f)?;
        writeln!(f, "📦 Order Type: {}", self.fulfillment)?;

        if let (Fulfillment::Delivery, Some(address)) = (self.fulfillment, &self.address) {
            writeln!(f, "📍 Delivery Address: {address}")?;
        }

        writeln!(f, "📞 Phone: {}", self.phone)?;
        writeln!(f)?;
        writeln!(f, "✅ Your order has been confirmed!")?;
        write!(f, "{}", self.readiness())
    }
}
