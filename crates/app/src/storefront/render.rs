//! Reply texts.

use std::fmt::Write as _;

use grocer::{
    cart::{Cart, CartError, CartLine},
    menu::{self, Keyboard, Reply},
    money::format_minor,
    orders::{CheckoutError, Fulfillment, OrderStatus},
    pricing::PricingError,
    products::CatalogProduct,
    session::{MIN_SEARCH_CHARS, Notice},
};
use jiff::tz::TimeZone;
use rusty_money::iso::Currency;

use crate::domain::{orders::records::OrderRecord, products::records::PopularProductRecord};

use super::StoreInfo;

const ADDRESS_PREVIEW_CHARS: usize = 50;

pub(super) fn welcome(store: &StoreInfo, first_name: &str) -> Reply {
    let text = format!(
        "🏪 Welcome to {}, {first_name}!\n\n\
         I can help you:\n\
         • 🛒 Browse and order products\n\
         • 🛍️ Manage your shopping cart\n\
         • 📦 Choose delivery or take-away\n\
         • 📋 Track your orders\n\
         • 📞 Get customer support\n\n\
         Let's get started! 🛒",
        store.name
    );

    Reply::with_keyboard(text, Keyboard::main_menu())
}

pub(super) fn help() -> Reply {
    let text = format!(
        "🆘 How to use this bot:\n\n\
         {} - View available items by category\n\
         {} - See items in your cart and manage them\n\
         {} - Choose between home delivery or take-away\n\
         {} - View your order history\n\
         {} - Show this help message\n\
         {} - Get store contact information\n\n\
         Commands:\n\
         /start - Start the bot\n\
         /help - Show help\n\
         /cart - Quick access to cart\n\
         /orders - View your orders",
        menu::BROWSE,
        menu::VIEW_CART,
        menu::ORDER_TYPE,
        menu::MY_ORDERS,
        menu::HELP,
        menu::CONTACT,
    );

    Reply::with_keyboard(text, Keyboard::main_menu())
}

pub(super) fn categories(categories: &[String]) -> Reply {
    if categories.is_empty() {
        return Reply::with_keyboard(
            "Sorry, there are no products available right now.",
            Keyboard::main_menu(),
        );
    }

    Reply::with_keyboard("Please select a category:", Keyboard::categories(categories))
}

fn push_product(text: &mut String, product: &CatalogProduct, currency: &'static Currency) {
    let _ = writeln!(text, "💰 Price: {}", format_minor(product.price, currency));
    let _ = writeln!(text, "📦 Stock: {} units", product.stock);

    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(text, "📝 {description}");
    }

    text.push('\n');
}

pub(super) fn category_products(
    category: &str,
    products: &[CatalogProduct],
    currency: &'static Currency,
) -> Reply {
    if products.is_empty() {
        return Reply::text(format!(
            "Sorry, no products available in {category} category."
        ));
    }

    let mut text = format!("🏷️ {category} Products:\n\n");

    for product in products {
        let _ = writeln!(text, "{}", product.name);
        push_product(&mut text, product, currency);
    }

    Reply::with_keyboard(text.trim_end(), Keyboard::add_to_cart(products))
}

pub(super) fn search_results(
    term: &str,
    products: &[CatalogProduct],
    currency: &'static Currency,
) -> Reply {
    if products.is_empty() {
        return Reply::text(format!(
            "❌ No products found for '{term}'. Try different keywords!"
        ));
    }

    let mut text = format!("🔍 Search Results for '{term}':\n\n");

    for product in products {
        let _ = writeln!(text, "{}", product.name);
        let _ = writeln!(text, "📂 Category: {}", product.category);
        push_product(&mut text, product, currency);
    }

    Reply::with_keyboard(text.trim_end(), Keyboard::add_to_cart(products))
}

pub(super) fn popular(products: &[PopularProductRecord], currency: &'static Currency) -> Reply {
    if products.is_empty() {
        return Reply::text("No popular products data available yet.");
    }

    let mut text = String::from("⭐ Most Popular Products:\n\n");

    for (rank, popular) in products.iter().enumerate() {
        let product = &popular.product;

        let _ = writeln!(text, "{}. {}", rank + 1, product.name);
        let _ = writeln!(
            text,
            "📂 {} | 💰 {}",
            product.category,
            format_minor(product.price, currency)
        );
        let _ = writeln!(
            text,
            "📦 {} in stock | 🔥 Ordered {} times\n",
            product.stock, popular.order_count
        );
    }

    let catalog: Vec<CatalogProduct> = products
        .iter()
        .map(|popular| CatalogProduct::from(popular.product.clone()))
        .collect();

    Reply::with_keyboard(text.trim_end(), Keyboard::add_to_cart(&catalog))
}

pub(super) fn cart(cart: &Cart, currency: &'static Currency) -> Vec<Reply> {
    if cart.is_empty() {
        return vec![Reply::text(format!(
            "Your cart is empty! 🛒\nUse '{}' to add items.",
            menu::BROWSE
        ))];
    }

    let mut text = String::from("🛍️ Your Cart:\n\n");

    for line in cart.lines() {
        let _ = writeln!(text, "{}", line.name);
        let _ = writeln!(
            text,
            "💰 {} x {} = {}\n",
            format_minor(line.unit_price, currency),
            line.quantity,
            format_minor(line.subtotal(), currency)
        );
    }

    let _ = write!(text, "Total: {}", format_minor(cart.total(), currency));

    vec![
        Reply::with_keyboard(text, Keyboard::cart()),
        Reply::with_keyboard(
            "Tap an item to remove it:",
            Keyboard::remove_from_cart(cart.lines()),
        ),
    ]
}

pub(super) fn removed(line: &CartLine) -> Reply {
    Reply::text(format!("🗑️ Removed {} from cart.", line.name))
}

pub(super) fn added_to_cart(product: &CatalogProduct, result: Result<u32, CartError>) -> Reply {
    let text = match result {
        Ok(1) => format!("✅ Added {} to cart!", product.name),
        Ok(_) => format!("✅ Added another {} to cart!", product.name),
        Err(CartError::OutOfStock { available }) => {
            format!("❌ Sorry, only {available} {} available!", product.name)
        }
        Err(CartError::CartFull { limit }) => {
            format!("❌ Cart is full! Maximum {limit} items allowed.")
        }
        Err(CartError::NotInCart(_)) => product_not_found().text,
    };

    Reply::text(text)
}

pub(super) fn product_not_found() -> Reply {
    Reply::text("❌ Product not found!")
}

pub(super) fn order_types() -> Reply {
    Reply::with_keyboard(
        "How would you like to receive your order?",
        Keyboard::order_type(),
    )
}

pub(super) fn fulfillment_selected(fulfillment: Fulfillment) -> Vec<Reply> {
    let confirmation = match fulfillment {
        Fulfillment::Delivery => {
            "Great! You've selected Home Delivery 🚚\n\n\
             For delivery, we'll need your address during checkout."
        }
        Fulfillment::Pickup => {
            "Perfect! You've selected Take Away 🏪\n\n\
             You can pick up your order from our store."
        }
    };

    vec![
        Reply::text(confirmation),
        Reply::with_keyboard(
            "Order type set! You can now browse products and checkout.",
            Keyboard::main_menu(),
        ),
    ]
}

pub(super) fn request_address() -> Reply {
    Reply::text("Please provide your delivery address:")
}

pub(super) fn request_phone(address_saved: bool) -> Reply {
    if address_saved {
        Reply::text("Address saved! Now please provide your phone number:")
    } else {
        Reply::text("Please provide your phone number for pickup notification:")
    }
}

pub(super) fn search_prompt() -> Reply {
    Reply::text("🔍 What product are you looking for? Type the product name:")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();

    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn status_label(status: OrderStatus) -> String {
    title_case(status.as_str())
}

pub(super) fn orders(
    orders: &[OrderRecord],
    currency: &'static Currency,
    time_zone: &TimeZone,
) -> Reply {
    if orders.is_empty() {
        return Reply::text("You haven't placed any orders yet. Start shopping! 🛒");
    }

    let mut text = String::from("📋 Your Recent Orders:\n\n");

    for order in orders {
        let placed = order.created_at.to_zoned(time_zone.clone());

        let _ = writeln!(text, "🔢 Order #{}", order.id);
        let _ = writeln!(text, "💰 Total: {}", format_minor(order.total, currency));
        let _ = writeln!(text, "📦 Type: {}", order.fulfillment.label());
        let _ = writeln!(text, "📅 Date: {}", placed.strftime("%Y-%m-%d %H:%M"));
        let _ = writeln!(text, "📊 Status: {}", status_label(order.status));

        if let (Fulfillment::Delivery, Some(address)) =
            (order.fulfillment, order.delivery_address.as_deref())
        {
            let preview: String = address.chars().take(ADDRESS_PREVIEW_CHARS).collect();
            let ellipsis = if preview.len() < address.len() { "..." } else { "" };

            let _ = writeln!(text, "📍 Address: {preview}{ellipsis}");
        }

        text.push('\n');
    }

    Reply::text(text.trim_end())
}

pub(super) fn contact(store: &StoreInfo) -> Reply {
    let policy = &store.policy;

    let text = format!(
        "📞 Contact Information\n\n\
         🏪 Store Name: {name}\n\
         📍 Address: {address}\n\
         📞 Phone: {phone}\n\
         📧 Email: {email}\n\n\
         🕒 Store Hours:\n\
         Monday - Friday: {open} - {close}\n\
         Saturday - Sunday: {open} - {close}\n\n\
         🚚 Delivery Hours:\n\
         Monday - Sunday: {delivery_open} - {delivery_close}\n\n\
         💰 Delivery Info:\n\
         • Delivery fee: {fee}\n\
         • Free delivery on orders over {free}\n\
         • Delivery radius: {radius} km",
        name = store.name,
        address = store.address,
        phone = store.phone,
        email = store.email,
        open = store.open_time,
        close = store.close_time,
        delivery_open = store.delivery_open_time,
        delivery_close = store.delivery_close_time,
        fee = format_minor(policy.delivery_fee, store.currency),
        free = format_minor(policy.free_delivery_minimum, store.currency),
        radius = store.delivery_radius_km,
    );

    Reply::text(text)
}

pub(super) fn main_menu() -> Reply {
    Reply::with_keyboard("Back to main menu!", Keyboard::main_menu())
}

pub(super) fn cart_cleared() -> Reply {
    Reply::with_keyboard("Cart cleared! 🗑️", Keyboard::main_menu())
}

pub(super) fn notice(notice: Notice) -> Reply {
    match notice {
        Notice::EmptyCart => Reply::text("Your cart is empty! Add some products first."),
        Notice::OrderTypeRequired => Reply::text(format!(
            "Please select order type first ({})",
            menu::ORDER_TYPE
        )),
        Notice::SearchTooShort => Reply::text(format!(
            "Please enter at least {MIN_SEARCH_CHARS} characters to search."
        )),
        Notice::BlankInput => Reply::text("Please type a non-empty answer."),
        Notice::NotInCart => Reply::text("That item is no longer in your cart."),
        Notice::Unrecognized => Reply::with_keyboard(
            "Sorry, I didn't understand that. Please use the menu buttons below.",
            Keyboard::main_menu(),
        ),
    }
}

pub(super) fn checkout_rejected(error: &CheckoutError, currency: &'static Currency) -> Reply {
    match error {
        CheckoutError::Pricing(PricingError::EmptyCart) => notice(Notice::EmptyCart),
        CheckoutError::Pricing(PricingError::BelowMinimum {
            minimum, subtotal, ..
        }) => Reply::text(format!(
            "❌ Minimum order amount is {}. Your cart total is {}",
            format_minor(*minimum, currency),
            format_minor(*subtotal, currency)
        )),
        CheckoutError::FulfillmentRequired => notice(Notice::OrderTypeRequired),
        CheckoutError::AddressRequired => request_address(),
        CheckoutError::PhoneRequired => request_phone(false),
    }
}

pub(super) fn insufficient_stock(name: &str) -> Reply {
    Reply::text(format!(
        "❌ Sorry, there is not enough {name} in stock anymore. Please update your cart and try again."
    ))
}

pub(super) fn order_failed() -> Reply {
    Reply::text("❌ Sorry, there was an error processing your order. Please try again.")
}

pub(super) fn failure() -> Reply {
    Reply::with_keyboard(
        "❌ Sorry, something went wrong. Please try again in a moment.",
        Keyboard::main_menu(),
    )
}
