//! Server configuration module

use clap::Parser;
use grocer::{
    money::{self, AmountError},
    pricing::OrderPolicy,
};
use grocer_app::storefront::StoreInfo;
use jiff::tz::TimeZone;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::config::{
    db::DatabaseConfig,
    logging::LoggingConfig,
    outbound::OutboundConfig,
    server::ServerRuntimeConfig,
    store::{OrderingConfig, StoreConfig},
};

pub(crate) mod db;
pub(crate) mod logging;
pub(crate) mod outbound;
pub(crate) mod server;
pub(crate) mod store;

/// Errors raised while turning settings into store rules.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An amount could not be expressed in minor units.
    #[error("invalid {key}: {source}")]
    Amount {
        /// Setting that failed
        key: &'static str,

        /// Conversion failure
        #[source]
        source: AmountError,
    },

    /// The currency code is not ISO 4217.
    #[error(transparent)]
    Currency(AmountError),

    /// The time zone is not in the system database.
    #[error("unknown time zone {name:?}: {source}")]
    TimeZone {
        /// Configured zone name
        name: String,

        /// Lookup failure
        #[source]
        source: jiff::Error,
    },

    /// The cart limit must allow at least one product.
    #[error("MAX_CART_ITEMS must be at least 1")]
    MaxCartItems,
}

/// Grocer chat server configuration
#[derive(Debug, Parser)]
#[command(name = "grocer-chat", about = "Grocer chat storefront server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Store details.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Ordering rules.
    #[command(flatten)]
    pub ordering: OrderingConfig,

    /// Outbound messaging settings.
    #[command(flatten)]
    pub outbound: OutboundConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Resolve store details and ordering rules.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown currency or time zone, or an amount
    /// that cannot be represented in the currency's minor units.
    pub fn store_info(&self) -> Result<StoreInfo, ConfigError> {
        let ordering = &self.ordering;
        let store = &self.store;

        let currency = money::currency(&ordering.currency).map_err(ConfigError::Currency)?;

        if ordering.max_cart_items == 0 {
            return Err(ConfigError::MaxCartItems);
        }

        let policy = OrderPolicy {
            min_order_amount: minor("MIN_ORDER_AMOUNT", ordering.min_order_amount, currency)?,
            free_delivery_minimum: minor(
                "FREE_DELIVERY_MINIMUM",
                ordering.free_delivery_minimum,
                currency,
            )?,
            delivery_fee: minor("DELIVERY_FEE", ordering.delivery_fee, currency)?,
            max_cart_items: ordering.max_cart_items,
        };

        let time_zone =
            TimeZone::get(&store.store_time_zone).map_err(|source| ConfigError::TimeZone {
                name: store.store_time_zone.clone(),
                source,
            })?;

        Ok(StoreInfo {
            name: store.store_name.clone(),
            address: store.store_address.clone(),
            phone: store.store_phone.clone(),
            email: store.store_email.clone(),
            open_time: store.store_open_time.clone(),
            close_time: store.store_close_time.clone(),
            delivery_open_time: store.delivery_open_time.clone(),
            delivery_close_time: store.delivery_close_time.clone(),
            delivery_radius_km: store.delivery_radius_km,
            currency,
            policy,
            time_zone,
        })
    }
}

fn minor(key: &'static str, amount: Decimal, currency: &Currency) -> Result<u64, ConfigError> {
    money::to_minor_units(amount, currency).map_err(|source| ConfigError::Amount { key, source })
}
