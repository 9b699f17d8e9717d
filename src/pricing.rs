//! Pricing

use thiserror::Error;

use crate::{cart::Cart, orders::Fulfillment};

/// Store-wide ordering rules, all amounts in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPolicy {
    /// Smallest subtotal that may be ordered
    pub min_order_amount: u64,

    /// Delivery orders at or above this subtotal ship free
    pub free_delivery_minimum: u64,

    /// Flat fee charged on delivery orders below the free-delivery minimum
    pub delivery_fee: u64,

    /// Maximum distinct lines per cart
    pub max_cart_items: usize,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            min_order_amount: 1_000,
            free_delivery_minimum: 5_000,
            delivery_fee: 500,
            max_cart_items: 50,
        }
    }
}

impl OrderPolicy {
    /// Delivery fee owed for `subtotal` under `fulfillment`.
    pub fn delivery_fee_for(&self, subtotal: u64, fulfillment: Fulfillment) -> u64 {
        match fulfillment {
            Fulfillment::Delivery if subtotal < self.free_delivery_minimum => self.delivery_fee,
            Fulfillment::Delivery | Fulfillment::Pickup => 0,
        }
    }
}

/// Priced breakdown of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Sum of line subtotals
    pub subtotal: u64,

    /// Fee added for delivery
    pub delivery_fee: u64,

    /// Subtotal plus fee
    pub total: u64,
}

/// Reasons a cart cannot be priced for an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Subtotal is below the configured minimum.
    #[error("subtotal {subtotal} is below the minimum order amount {minimum}")]
    BelowMinimum {
        /// Configured minimum
        minimum: u64,

        /// Cart subtotal
        subtotal: u64,

        /// Amount still missing
        shortfall: u64,
    },
}

/// Price `cart` for `fulfillment` under `policy`.
///
/// # Errors
///
/// - [`PricingError::EmptyCart`]: the cart has no lines.
/// - [`PricingError::BelowMinimum`]: the subtotal is below `policy.min_order_amount`.
pub fn quote(cart: &Cart, fulfillment: Fulfillment, policy: &OrderPolicy) -> Result<Quote, PricingError> {
    if cart.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let subtotal = cart.total();

    if subtotal < policy.min_order_amount {
        return Err(PricingError::BelowMinimum {
            minimum: policy.min_order_amount,
            subtotal,
            shortfall: policy.min_order_amount - subtotal,
        });
    }

    let delivery_fee = policy.delivery_fee_for(subtotal, fulfillment);

    Ok(Quote {
        subtotal,
        delivery_fee,
        total: subtotal.saturating_add(delivery_fee),
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::products::{CatalogProduct, ProductId};

    fn product(id: i64, price: u64) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Pantry".to_string(),
            price,
            stock: 100,
            description: None,
            image_url: None,
        }
    }

    fn cart_with(lines: &[(i64, u64, u32)]) -> Result<Cart, crate::cart::CartError> {
        let mut cart = Cart::new(50);

        for &(id, price, quantity) in lines {
            let product = product(id, price);

            for _ in 0..quantity {
                cart.add_item(&product, product.stock)?;
            }
        }

        Ok(cart)
    }

    #[test]
    fn delivery_below_free_minimum_pays_flat_fee() -> TestResult {
        let cart = cart_with(&[(1, 300, 2), (2, 550, 1)])?;

        let quote = quote(&cart, Fulfillment::Delivery, &OrderPolicy::default())?;

        assert_eq!(
            quote,
            Quote {
                subtotal: 1150,
                delivery_fee: 500,
                total: 1650,
            }
        );

        Ok(())
    }

    #[test]
    fn delivery_at_free_minimum_is_free() -> TestResult {
        let cart = cart_with(&[(1, 2500, 2)])?;

        let quote = quote(&cart, Fulfillment::Delivery, &OrderPolicy::default())?;

        assert_eq!(quote.delivery_fee, 0);
        assert_eq!(quote.total, 5000);

        Ok(())
    }

    #[test]
    fn pickup_never_pays_fee() -> TestResult {
        let cart = cart_with(&[(1, 1100, 1)])?;

        let quote = quote(&cart, Fulfillment::Pickup, &OrderPolicy::default())?;

        assert_eq!(quote.delivery_fee, 0);
        assert_eq!(quote.total, 1100);

        Ok(())
    }

    #[test]
    fn below_minimum_reports_shortfall() -> TestResult {
        let cart = cart_with(&[(1, 400, 2)])?;

        let result = quote(&cart, Fulfillment::Pickup, &OrderPolicy::default());

        assert_eq!(
            result,
            Err(PricingError::BelowMinimum {
                minimum: 1000,
                subtotal: 800,
                shortfall: 200,
            })
        );

        Ok(())
    }

    #[test]
    fn empty_cart_is_checked_before_minimum() {
        let result = quote(&Cart::new(50), Fulfillment::Delivery, &OrderPolicy::default());

        assert_eq!(result, Err(PricingError::EmptyCart));
    }
}
