//! Domain services backed by PostgreSQL.

pub mod customers;
pub mod orders;
pub mod products;
