//! Orders

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::{CartLine, CartSnapshot},
    customers::CustomerId,
    pricing::{OrderPolicy, PricingError, Quote, quote},
    session::Session,
};

const ORDER_ID_LEN: usize = 8;

/// Short customer-facing order reference, e.g. `3F2A9C01`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generate a fresh id from a random UUID.
    ///
    /// Collisions are possible in principle and are left to the store's
    /// primary key to reject.
    pub fn generate() -> Self {
        let id = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(ORDER_ID_LEN)
            .collect::<String>()
            .to_ascii_uppercase();

        Self(id)
    }

    /// The id as stored and displayed.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Rejected order id input.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid order id {0:?}: expected {ORDER_ID_LEN} hexadecimal characters")]
pub struct InvalidOrderId(pub String);

impl FromStr for OrderId {
    type Err = InvalidOrderId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.len() == ORDER_ID_LEN && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidOrderId(s.to_string()))
        }
    }
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fulfillment {
    /// Delivered to the captured address
    Delivery,

    /// Collected in store
    Pickup,
}

impl Fulfillment {
    /// Stored form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivery => "delivery",
            Self::Pickup => "pickup",
        }
    }

    /// Human label used in replies and receipts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Delivery => "Home Delivery",
            Self::Pickup => "Take Away",
        }
    }
}

/// Unrecognised stored enum value.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownVariant {
    /// What was being parsed
    pub kind: &'static str,

    /// Input that failed
    pub value: String,
}

impl FromStr for Fulfillment {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delivery" => Ok(Self::Delivery),
            "pickup" => Ok(Self::Pickup),
            _ => Err(UnknownVariant {
                kind: "fulfillment",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for Fulfillment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation
    Pending,

    /// Accepted by the store
    Confirmed,

    /// Being picked and packed
    Preparing,

    /// Ready for dispatch or collection
    Ready,

    /// Handed to the customer
    Delivered,

    /// Abandoned
    Cancelled,
}

impl OrderStatus {
    /// Every status, in pipeline order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Stored form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is allowed.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Position along the fulfilment pipeline. Cancelled sits outside it.
    const fn stage(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Preparing => Some(2),
            Self::Ready => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled => None,
        }
    }

    /// Whether an administrator may move an order from `self` to `next`.
    ///
    /// Moves go forward along the pipeline, possibly skipping stages.
    /// Any non-terminal order may be cancelled.
    pub fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }

        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| UnknownVariant {
                kind: "order status",
                value: s.to_string(),
            })
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Why a session cannot be turned into an order yet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Empty cart or subtotal below minimum.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// No delivery or pickup choice made.
    #[error("order type has not been selected")]
    FulfillmentRequired,

    /// Delivery order without an address.
    #[error("delivery address is missing")]
    AddressRequired,

    /// No contact phone captured.
    #[error("phone number is missing")]
    PhoneRequired,
}

/// Everything needed to persist an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    /// Freshly generated id
    pub id: OrderId,

    /// Owning customer
    pub customer: CustomerId,

    /// Cart lines in display order
    pub lines: Vec<CartLine>,

    /// Subtotal, fee and total
    pub quote: Quote,

    /// Delivery or pickup
    pub fulfillment: Fulfillment,

    /// Delivery address, only for delivery orders
    pub address: Option<String>,

    /// Contact phone
    pub phone: String,

    /// Stored cart snapshot
    pub snapshot: CartSnapshot,
}

/// Validate `session` against `policy` and build an order draft.
///
/// Checks run in this order: empty cart, below minimum, fulfillment chosen,
/// address for delivery, phone.
///
/// # Errors
///
/// Returns the first failing [`CheckoutError`]. The session is never modified.
pub fn prepare_order(session: &Session, policy: &OrderPolicy) -> Result<OrderDraft, CheckoutError> {
    let cart = session.cart();

    // Minimum is checked against the fee-free subtotal, so pickup is used
    // until the real choice is known.
    quote(cart, Fulfillment::Pickup, policy)?;

    let fulfillment = session.fulfillment().ok_or(CheckoutError::FulfillmentRequired)?;
    let quote = quote(cart, fulfillment, policy)?;
    let checkout = session.checkout();

    let address = match fulfillment {
        Fulfillment::Delivery => Some(
            checkout
                .address
                .clone()
                .ok_or(CheckoutError::AddressRequired)?,
        ),
        Fulfillment::Pickup => None,
    };

    let phone = checkout.phone.clone().ok_or(CheckoutError::PhoneRequired)?;

    Ok(OrderDraft {
        id: OrderId::generate(),
        customer: session.customer(),
        lines: cart.lines().to_vec(),
        quote,
        fulfillment,
        address,
        phone,
        snapshot: cart.snapshot(),
    })
}
