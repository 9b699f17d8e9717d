//! Cart

use thiserror::Error;

use crate::products::{CatalogProduct, ProductId};

pub mod snapshot;

pub use snapshot::{CartSnapshot, SnapshotLine};

/// Errors raised by cart mutations. The cart is left unchanged when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Adding another unit would exceed the live stock level.
    #[error("only {available} units available")]
    OutOfStock {
        /// Units in stock when the add was attempted
        available: u32,
    },

    /// The cart already holds the maximum number of distinct lines.
    #[error("cart is full, at most {limit} items allowed")]
    CartFull {
        /// Configured line ceiling
        limit: usize,
    },

    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// One product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Product this line refers to
    pub product_id: ProductId,

    /// Product name when the line was created
    pub name: String,

    /// Unit price captured when the line was created, in minor units
    pub unit_price: u64,

    /// Units ordered, always at least one
    pub quantity: u32,
}

impl CartLine {
    /// Unit price multiplied by quantity.
    pub fn subtotal(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

/// Session-scoped shopping cart.
///
/// Lines keep the order in which products were first added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    max_lines: usize,
}

impl Cart {
    /// Create an empty cart that accepts at most `max_lines` distinct products.
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: Vec::new(),
            max_lines,
        }
    }

    /// Add one unit of `product`, checking against `live_stock`.
    ///
    /// A new line snapshots the product's current name and price; later adds
    /// only bump the quantity. Returns the line quantity after the add.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`]: the new quantity would exceed `live_stock`.
    /// - [`CartError::CartFull`]: the product is new and the cart is at its line limit.
    pub fn add_item(&mut self, product: &CatalogProduct, live_stock: u32) -> Result<u32, CartError> {
        if let Some(line) = self.line_mut(product.id) {
            if line.quantity >= live_stock {
                return Err(CartError::OutOfStock {
                    available: live_stock,
                });
            }

            line.quantity += 1;

            return Ok(line.quantity);
        }

        if self.lines.len() >= self.max_lines {
            return Err(CartError::CartFull {
                limit: self.max_lines,
            });
        }

        if live_stock == 0 {
            return Err(CartError::OutOfStock { available: 0 });
        }

        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        });

        Ok(1)
    }

    /// Remove the whole line for `product`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] when there is no such line.
    pub fn remove_item(&mut self, product: ProductId) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|line| line.product_id == product)
            .ok_or(CartError::NotInCart(product))?;

        Ok(self.lines.remove(index))
    }

    /// Remove one unit of `product`, dropping the line when it reaches zero.
    ///
    /// Returns the remaining quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] when there is no such line.
    pub fn decrement_item(&mut self, product: ProductId) -> Result<u32, CartError> {
        let line = self
            .line_mut(product)
            .ok_or(CartError::NotInCart(product))?;

        if line.quantity > 1 {
            line.quantity -= 1;

            return Ok(line.quantity);
        }

        self.remove_item(product)?;

        Ok(0)
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total(&self) -> u64 {
        self.lines
            .iter()
            .fold(0_u64, |acc, line| acc.saturating_add(line.subtotal()))
    }

    /// The cart lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity currently held for `product`, zero when absent.
    pub fn quantity_of(&self, product: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product_id == product)
            .map_or(0, |line| line.quantity)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Configured line ceiling.
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Serialisable copy of the lines for persistence alongside an order.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::from_lines(&self.lines)
    }

    fn line_mut(&mut self, product: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product_id == product)
    }
}
