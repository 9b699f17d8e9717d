//! Grocer prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine, CartSnapshot, SnapshotLine},
    customers::{ConversationId, CustomerId, CustomerProfile},
    menu::{Button, Input, Keyboard, Reply},
    money::{AmountError, format_minor, to_minor_units},
    orders::{CheckoutError, Fulfillment, OrderDraft, OrderId, OrderStatus, prepare_order},
    pricing::{OrderPolicy, PricingError, Quote, quote},
    products::{CatalogProduct, ProductId},
    receipt::Receipt,
    session::{Action, CheckoutInfo, Event, Notice, Session, SessionState},
};
