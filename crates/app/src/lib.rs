//! Persistence, sessions and the chat storefront for the grocery ordering core.

pub mod context;
pub mod database;
pub mod domain;
pub mod notify;
pub mod sessions;
pub mod storefront;

#[cfg(test)]
mod test;
