//! Grocer
//!
//! Grocer is the ordering core of a chat-driven grocery storefront: cart model, pricing rules,
//! order identity and the per-customer session state machine.

pub mod cart;
pub mod customers;
pub mod menu;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
