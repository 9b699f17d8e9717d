//! Store & Ordering Config

use clap::Args;
use rust_decimal::Decimal;

/// Store details shown to customers.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Store display name
    #[arg(long, env = "STORE_NAME", default_value = "Fresh Grocery Store")]
    pub store_name: String,

    /// Street address shown on the contact page
    #[arg(
        long,
        env = "STORE_ADDRESS",
        default_value = "123 Main Street, City, State 12345"
    )]
    pub store_address: String,

    /// Contact phone number
    #[arg(long, env = "STORE_PHONE", default_value = "+1-555-0123")]
    pub store_phone: String,

    /// Contact email address
    #[arg(long, env = "STORE_EMAIL", default_value = "orders@freshgrocery.com")]
    pub store_email: String,

    /// Opening time, informational
    #[arg(long, env = "STORE_OPEN_TIME", default_value = "08:00")]
    pub store_open_time: String,

    /// Closing time, informational
    #[arg(long, env = "STORE_CLOSE_TIME", default_value = "22:00")]
    pub store_close_time: String,

    /// First delivery slot, informational
    #[arg(long, env = "DELIVERY_OPEN_TIME", default_value = "09:00")]
    pub delivery_open_time: String,

    /// Last delivery slot, informational
    #[arg(long, env = "DELIVERY_CLOSE_TIME", default_value = "21:00")]
    pub delivery_close_time: String,

    /// Delivery radius in kilometres
    #[arg(long, env = "DELIVERY_RADIUS_KM", default_value = "10")]
    pub delivery_radius_km: Decimal,

    /// IANA time zone used for receipts and order history
    #[arg(long, env = "STORE_TIME_ZONE", default_value = "UTC")]
    pub store_time_zone: String,
}

/// Ordering rules. Amounts are major units of `currency`.
#[derive(Debug, Args)]
pub struct OrderingConfig {
    /// Flat delivery fee below the free-delivery minimum
    #[arg(long, env = "DELIVERY_FEE", default_value = "5.00")]
    pub delivery_fee: Decimal,

    /// Subtotal from which delivery is free
    #[arg(long, env = "FREE_DELIVERY_MINIMUM", default_value = "50.00")]
    pub free_delivery_minimum: Decimal,

    /// Smallest subtotal that can be ordered
    #[arg(long, env = "MIN_ORDER_AMOUNT", default_value = "10.00")]
    pub min_order_amount: Decimal,

    /// Maximum distinct products per cart
    #[arg(long, env = "MAX_CART_ITEMS", default_value_t = 50)]
    pub max_cart_items: usize,

    /// ISO 4217 currency code
    #[arg(long, env = "CURRENCY", default_value = "USD")]
    pub currency: String,
}
