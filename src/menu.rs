//! Menu
//!
//! Button labels, commands and callback payloads understood by the storefront,
//! and the keyboards offered with each reply.

use serde::{Deserialize, Serialize};

use crate::{
    cart::CartLine,
    orders::Fulfillment,
    products::{CatalogProduct, ProductId},
    session::Event,
};

/// Browse products button
pub const BROWSE: &str = "🛒 Browse Products";
/// View cart button
pub const VIEW_CART: &str = "🛍️ View Cart";
/// Order type button
pub const ORDER_TYPE: &str = "📦 Order Type";
/// Order history button
pub const MY_ORDERS: &str = "📋 My Orders";
/// Help button
pub const HELP: &str = "ℹ️ Help";
/// Contact button
pub const CONTACT: &str = "📞 Contact";
/// Delivery choice
pub const HOME_DELIVERY: &str = "🚚 Home Delivery";
/// Pickup choice
pub const TAKE_AWAY: &str = "🏪 Take Away";
/// Return to the main menu
pub const BACK: &str = "🔙 Back to Main Menu";
/// Start a search
pub const SEARCH: &str = "🔍 Search Products";
/// Popular products
pub const POPULAR: &str = "⭐ Popular Items";
/// Keep shopping from the cart view
pub const ADD_MORE: &str = "➕ Add More Items";
/// Show removal actions from the cart view
pub const REMOVE_ITEMS: &str = "➖ Remove Items";
/// Start checkout
pub const CHECKOUT: &str = "🛒 Checkout";
/// Empty the cart
pub const CLEAR_CART: &str = "🗑️ Clear Cart";
/// Prefix of every category button
pub const CATEGORY_PREFIX: &str = "📂 ";

const ADD_TO_CART: &str = "add_to_cart_";
const REMOVE_FROM_CART: &str = "remove_from_cart_";

/// Raw inbound message as delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "lowercase")]
pub enum Input {
    /// Typed text or a reply-keyboard button
    Text(String),

    /// Slash command such as `/start`
    Command(String),

    /// Inline button payload
    Callback(String),
}

/// Translate transport input into a session event.
pub fn parse(input: &Input) -> Event {
    match input {
        Input::Command(command) => parse_command(command),
        Input::Callback(data) => parse_callback(data),
        Input::Text(text) if text.trim_start().starts_with('/') => parse_command(text),
        Input::Text(text) => parse_text(text),
    }
}

fn parse_command(command: &str) -> Event {
    let name = command
        .trim()
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '@')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match name.as_str() {
        "start" => Event::Start,
        "help" => Event::Help,
        "cart" => Event::ViewCart,
        "orders" => Event::MyOrders,
        _ => Event::Unknown,
    }
}

fn parse_callback(data: &str) -> Event {
    let data = data.trim();

    if let Some(id) = data.strip_prefix(ADD_TO_CART).and_then(|id| id.parse().ok()) {
        return Event::AddToCart(id);
    }

    if let Some(id) = data.strip_prefix(REMOVE_FROM_CART).and_then(|id| id.parse().ok()) {
        return Event::RemoveFromCart(id);
    }

    Event::Unknown
}

fn parse_text(text: &str) -> Event {
    let trimmed = text.trim();

    match trimmed {
        BROWSE | ADD_MORE => Event::Browse,
        VIEW_CART | REMOVE_ITEMS => Event::ViewCart,
        ORDER_TYPE => Event::ChooseOrderType,
        MY_ORDERS => Event::MyOrders,
        HELP => Event::Help,
        CONTACT => Event::Contact,
        HOME_DELIVERY => Event::SelectFulfillment(Fulfillment::Delivery),
        TAKE_AWAY => Event::SelectFulfillment(Fulfillment::Pickup),
        BACK => Event::BackToMenu,
        SEARCH => Event::Search,
        POPULAR => Event::Popular,
        CHECKOUT => Event::Checkout,
        CLEAR_CART => Event::ClearCart,
        _ => match trimmed.strip_prefix(CATEGORY_PREFIX.trim_end()) {
            Some(category) if !category.trim().is_empty() => {
                Event::SelectCategory(category.trim().to_string())
            }
            _ => Event::Text(text.to_string()),
        },
    }
}

/// Callback payload adding one unit of `product`.
pub fn add_to_cart_data(product: ProductId) -> String {
    format!("{ADD_TO_CART}{product}")
}

/// Callback payload removing the line for `product`.
pub fn remove_from_cart_data(product: ProductId) -> String {
    format!("{REMOVE_FROM_CART}{product}")
}

/// A keyboard button. Buttons with a callback are inline actions; the rest
/// send their label back as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Visible label
    pub label: String,

    /// Inline payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
}

impl Button {
    /// Reply-keyboard button.
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback: None,
        }
    }

    /// Inline action button.
    pub fn action(label: impl Into<String>, callback: String) -> Self {
        Self {
            label: label.into(),
            callback: Some(callback),
        }
    }
}

/// Rows of buttons attached to a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    /// Button rows, top to bottom
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    fn from_labels(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|label| Button::text(*label)).collect())
                .collect(),
        }
    }

    /// Main menu.
    pub fn main_menu() -> Self {
        Self::from_labels(&[&[BROWSE, VIEW_CART], &[ORDER_TYPE, MY_ORDERS], &[HELP, CONTACT]])
    }

    /// Delivery or pickup choice.
    pub fn order_type() -> Self {
        Self::from_labels(&[&[HOME_DELIVERY, TAKE_AWAY], &[BACK]])
    }

    /// One button per category followed by search, popular and back.
    pub fn categories(categories: &[String]) -> Self {
        let mut rows: Vec<Vec<Button>> = categories
            .iter()
            .map(|category| vec![Button::text(format!("{CATEGORY_PREFIX}{category}"))])
            .collect();

        rows.push(vec![Button::text(SEARCH), Button::text(POPULAR)]);
        rows.push(vec![Button::text(BACK)]);

        Self { rows }
    }

    /// Actions offered with the cart view.
    pub fn cart() -> Self {
        Self::from_labels(&[&[ADD_MORE, REMOVE_ITEMS], &[CHECKOUT, CLEAR_CART], &[BACK]])
    }

    /// One add-to-cart action per product.
    pub fn add_to_cart(products: &[CatalogProduct]) -> Self {
        Self {
            rows: products
                .iter()
                .map(|product| {
                    vec![Button::action(
                        format!("🛒 Add {}", product.name),
                        add_to_cart_data(product.id),
                    )]
                })
                .collect(),
        }
    }

    /// One remove action per cart line.
    pub fn remove_from_cart(lines: &[CartLine]) -> Self {
        Self {
            rows: lines
                .iter()
                .map(|line| {
                    vec![Button::action(
                        format!("❌ Remove {}", line.name),
                        remove_from_cart_data(line.product_id),
                    )]
                })
                .collect(),
        }
    }
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Message body
    pub text: String,

    /// Optional keyboard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    /// Text without a keyboard.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// Text with a keyboard.
    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn menu_buttons_map_to_events() {
        let cases = [
            (BROWSE, Event::Browse),
            (ADD_MORE, Event::Browse),
            (VIEW_CART, Event::ViewCart),
            (ORDER_TYPE, Event::ChooseOrderType),
            (HOME_DELIVERY, Event::SelectFulfillment(Fulfillment::Delivery)),
            (TAKE_AWAY, Event::SelectFulfillment(Fulfillment::Pickup)),
            (BACK, Event::BackToMenu),
            (SEARCH, Event::Search),
            (CHECKOUT, Event::Checkout),
            (CLEAR_CART, Event::ClearCart),
        ];

        for (label, event) in cases {
            assert_eq!(parse(&Input::Text(label.to_string())), event, "label {label}");
        }
    }

    #[test]
    fn category_prefix_selects_category() {
        assert_eq!(
            parse(&Input::Text("📂 Fresh Produce".to_string())),
            Event::SelectCategory("Fresh Produce".to_string())
        );
    }

    #[test]
    fn commands_are_recognised_with_or_without_bot_suffix() {
        assert_eq!(parse(&Input::Command("/start".to_string())), Event::Start);
        assert_eq!(parse(&Input::Command("/cart@grocer_bot".to_string())), Event::ViewCart);
        assert_eq!(parse(&Input::Text("/orders".to_string())), Event::MyOrders);
        assert_eq!(parse(&Input::Command("/nope".to_string())), Event::Unknown);
    }

    #[test]
    fn callbacks_carry_product_ids() {
        assert_eq!(
            parse(&Input::Callback("add_to_cart_42".to_string())),
            Event::AddToCart(ProductId::new(42))
        );
        assert_eq!(
            parse(&Input::Callback(remove_from_cart_data(ProductId::new(9)))),
            Event::RemoveFromCart(ProductId::new(9))
        );
        assert_eq!(
            parse(&Input::Callback("add_to_cart_x".to_string())),
            Event::Unknown
        );
    }

    #[test]
    fn other_text_is_passed_through_untrimmed() {
        assert_eq!(
            parse(&Input::Text(" 12 Elm Road ".to_string())),
            Event::Text(" 12 Elm Road ".to_string())
        );
    }

    #[test]
    fn input_deserialises_from_tagged_json() -> TestResult {
        let input: Input = serde_json::from_value(json!({ "kind": "callback", "body": "add_to_cart_3" }))?;

        assert_eq!(input, Input::Callback("add_to_cart_3".to_string()));

        Ok(())
    }

    #[test]
    fn categories_keyboard_ends_with_search_and_back() {
        let keyboard = Keyboard::categories(&["Dairy".to_string()]);

        assert_eq!(keyboard.rows.len(), 3);
        assert_eq!(keyboard.rows.first(), Some(&vec![Button::text("📂 Dairy")]));
        assert_eq!(keyboard.rows.last(), Some(&vec![Button::text(BACK)]));
    }
}
