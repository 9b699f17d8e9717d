//! Session
//!
//! Per-customer ordering state machine. [`Session::apply`] maps every
//! `(state, event)` pair to the next state and an [`Action`] for the driver to
//! carry out. The machine never performs I/O; lookups, searches and order
//! placement are requested through the returned action.

use crate::{
    cart::{Cart, CartError, CartLine},
    customers::CustomerId,
    orders::{Fulfillment, OrderId},
    products::{CatalogProduct, ProductId},
};

/// Minimum number of characters in a search term.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Where the customer currently is in the ordering flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Initial state and reset target
    #[default]
    MainMenu,

    /// Looking at the category list
    Browsing,

    /// Picking delivery or pickup
    ChoosingOrderType,

    /// Waiting for a delivery address
    CheckoutAddress,

    /// Waiting for a phone number, then placing the order
    CheckoutPhone,

    /// Waiting for a search term
    Searching,
}

/// Contact details captured during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutInfo {
    /// Delivery address, only collected for delivery orders
    pub address: Option<String>,

    /// Contact phone
    pub phone: Option<String>,
}

impl CheckoutInfo {
    fn clear(&mut self) {
        self.address = None;
        self.phone = None;
    }
}

/// Everything a customer can do, after input parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start`
    Start,

    /// Help button or `/help`
    Help,

    /// Browse products or add more items
    Browse,

    /// A category button
    SelectCategory(String),

    /// View cart button or `/cart`
    ViewCart,

    /// Order type button
    ChooseOrderType,

    /// Delivery or take-away button
    SelectFulfillment(Fulfillment),

    /// Checkout button
    Checkout,

    /// Search button
    Search,

    /// Popular items button
    Popular,

    /// My orders button or `/orders`
    MyOrders,

    /// Contact button
    Contact,

    /// Back to main menu button
    BackToMenu,

    /// Clear cart button
    ClearCart,

    /// Add-to-cart action on a product
    AddToCart(ProductId),

    /// Remove action on a cart line
    RemoveFromCart(ProductId),

    /// Any other text message
    Text(String),

    /// A command or callback nobody handles
    Unknown,
}

/// Short replies that need no data from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Checkout attempted with nothing in the cart
    EmptyCart,

    /// Checkout attempted before choosing delivery or pickup
    OrderTypeRequired,

    /// Search term shorter than [`MIN_SEARCH_CHARS`]
    SearchTooShort,

    /// Blank address or phone input
    BlankInput,

    /// Removal of a product that is not in the cart
    NotInCart,

    /// Input did not match anything valid in the current state
    Unrecognized,
}

/// What the driver must do after an event was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Greet the customer and record them
    Welcome,

    /// Show usage help
    ShowHelp,

    /// List categories
    ShowCategories,

    /// List in-stock products of a category
    ShowCategory(String),

    /// Show cart contents
    ShowCart,

    /// Offer delivery or pickup
    ShowOrderTypes,

    /// Confirm the fulfillment choice
    FulfillmentSelected(Fulfillment),

    /// Ask for the delivery address
    RequestAddress,

    /// Ask for the phone number
    RequestPhone {
        /// An address was just stored
        address_saved: bool,
    },

    /// Validate and place the order
    PlaceOrder,

    /// Ask for a search term
    PromptSearch,

    /// Run a product search
    RunSearch(String),

    /// Show most popular products
    ShowPopular,

    /// Show the customer's order history
    ShowOrders,

    /// Show store contact details
    ShowContact,

    /// Look the product up and add it to the cart
    AddToCart(ProductId),

    /// A cart line was removed
    Removed(CartLine),

    /// Cart was emptied
    CartCleared,

    /// Back at the main menu
    MainMenu,

    /// Reply with a fixed notice
    Notify(Notice),
}

/// In-memory ordering session owned by one customer.
#[derive(Debug, Clone)]
pub struct Session {
    customer: CustomerId,
    state: SessionState,
    fulfillment: Option<Fulfillment>,
    cart: Cart,
    checkout: CheckoutInfo,
    last_order: Option<OrderId>,
    registered: bool,
}

impl Session {
    /// Fresh session at the main menu with an empty cart.
    pub fn new(customer: CustomerId, max_cart_items: usize) -> Self {
        Self {
            customer,
            state: SessionState::MainMenu,
            fulfillment: None,
            cart: Cart::new(max_cart_items),
            checkout: CheckoutInfo::default(),
            last_order: None,
            registered: false,
        }
    }

    /// Owning customer.
    pub fn customer(&self) -> CustomerId {
        self.customer
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Selected fulfillment, if any.
    pub fn fulfillment(&self) -> Option<Fulfillment> {
        self.fulfillment
    }

    /// The cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Captured checkout details.
    pub fn checkout(&self) -> &CheckoutInfo {
        &self.checkout
    }

    /// Id of the last order placed in this session.
    pub fn last_order(&self) -> Option<&OrderId> {
        self.last_order.as_ref()
    }

    /// Whether the customer record was written during this process lifetime.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Note that the customer record has been written.
    pub fn mark_registered(&mut self) {
        self.registered = true;
    }

    /// Add one unit of a freshly loaded product, using its stock as the live level.
    ///
    /// # Errors
    ///
    /// Propagates [`CartError`] from [`Cart::add_item`].
    pub fn add_to_cart(&mut self, product: &CatalogProduct) -> Result<u32, CartError> {
        self.cart.add_item(product, product.stock)
    }

    /// Reset after a committed order: cart and checkout info are cleared, the
    /// state returns to the main menu and `order_id` is remembered. The
    /// fulfillment choice is kept for the next order.
    pub fn complete_order(&mut self, order_id: OrderId) {
        self.cart.clear();
        self.checkout.clear();
        self.state = SessionState::MainMenu;
        self.last_order = Some(order_id);
    }

    /// Apply `event` and return what the driver should do next.
    pub fn apply(&mut self, event: Event) -> Action {
        use SessionState::{
            Browsing, CheckoutAddress, CheckoutPhone, ChoosingOrderType, MainMenu, Searching,
        };

        match (self.state, event) {
            (_, Event::Start) => {
                self.state = MainMenu;

                Action::Welcome
            }
            (_, Event::Help) => Action::ShowHelp,
            (_, Event::Browse) => {
                self.state = Browsing;

                Action::ShowCategories
            }
            (_, Event::SelectCategory(category)) => Action::ShowCategory(category),
            (_, Event::ViewCart) => Action::ShowCart,
            (_, Event::ChooseOrderType) => {
                self.state = ChoosingOrderType;

                Action::ShowOrderTypes
            }
            (_, Event::SelectFulfillment(fulfillment)) => {
                self.fulfillment = Some(fulfillment);
                self.state = MainMenu;

                Action::FulfillmentSelected(fulfillment)
            }
            (_, Event::Checkout) => self.begin_checkout(),
            (_, Event::Search) => {
                self.state = Searching;

                Action::PromptSearch
            }
            (_, Event::Popular) => Action::ShowPopular,
            (_, Event::MyOrders) => Action::ShowOrders,
            (_, Event::Contact) => Action::ShowContact,
            (_, Event::BackToMenu) => {
                self.state = MainMenu;

                Action::MainMenu
            }
            (_, Event::ClearCart) => {
                self.cart.clear();

                Action::CartCleared
            }
            (_, Event::AddToCart(product)) => Action::AddToCart(product),
            (_, Event::RemoveFromCart(product)) => match self.cart.remove_item(product) {
                Ok(line) => Action::Removed(line),
                Err(_) => Action::Notify(Notice::NotInCart),
            },
            (CheckoutAddress, Event::Text(text)) => match non_blank(&text) {
                Some(address) => {
                    self.checkout.address = Some(address);
                    self.state = CheckoutPhone;

                    Action::RequestPhone {
                        address_saved: true,
                    }
                }
                None => Action::Notify(Notice::BlankInput),
            },
            (CheckoutPhone, Event::Text(text)) => match non_blank(&text) {
                Some(phone) => {
                    self.checkout.phone = Some(phone);

                    Action::PlaceOrder
                }
                None => Action::Notify(Notice::BlankInput),
            },
            (Searching, Event::Text(text)) => {
                let term = text.trim();

                if term.chars().count() < MIN_SEARCH_CHARS {
                    return Action::Notify(Notice::SearchTooShort);
                }

                self.state = MainMenu;

                Action::RunSearch(term.to_string())
            }
            (MainMenu | Browsing | ChoosingOrderType, Event::Text(_)) | (_, Event::Unknown) => {
                Action::Notify(Notice::Unrecognized)
            }
        }
    }

    fn begin_checkout(&mut self) -> Action {
        if self.cart.is_empty() {
            return Action::Notify(Notice::EmptyCart);
        }

        let Some(fulfillment) = self.fulfillment else {
            return Action::Notify(Notice::OrderTypeRequired);
        };

        self.checkout.clear();

        match fulfillment {
            Fulfillment::Delivery => {
                self.state = SessionState::CheckoutAddress;

                Action::RequestAddress
            }
            Fulfillment::Pickup => {
                self.state = SessionState::CheckoutPhone;

                Action::RequestPhone {
                    address_saved: false,
                }
            }
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn product(id: i64, price: u64, stock: u32) -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Dairy".to_string(),
            price,
            stock,
            description: None,
            image_url: None,
        }
    }

    fn session() -> Session {
        Session::new(CustomerId::new(7), 50)
    }

    fn session_with_cart() -> Result<Session, CartError> {
        let mut session = session();

        session.add_to_cart(&product(1, 1200, 5))?;

        Ok(session)
    }

    #[test]
    fn new_session_starts_at_main_menu() {
        let session = session();

        assert_eq!(session.state(), SessionState::MainMenu);
        assert!(session.cart().is_empty());
        assert_eq!(session.fulfillment(), None);
    }

    #[test]
    fn browse_moves_to_browsing_from_any_state() {
        let mut session = session();

        session.apply(Event::Search);

        assert_eq!(session.apply(Event::Browse), Action::ShowCategories);
        assert_eq!(session.state(), SessionState::Browsing);
    }

    #[test]
    fn category_and_cart_views_keep_state() {
        let mut session = session();

        session.apply(Event::Browse);

        assert_eq!(
            session.apply(Event::SelectCategory("Dairy".to_string())),
            Action::ShowCategory("Dairy".to_string())
        );
        assert_eq!(session.apply(Event::ViewCart), Action::ShowCart);
        assert_eq!(session.state(), SessionState::Browsing);
    }

    #[test]
    fn selecting_fulfillment_returns_to_main_menu() {
        let mut session = session();

        session.apply(Event::ChooseOrderType);
        assert_eq!(session.state(), SessionState::ChoosingOrderType);

        let action = session.apply(Event::SelectFulfillment(Fulfillment::Pickup));

        assert_eq!(action, Action::FulfillmentSelected(Fulfillment::Pickup));
        assert_eq!(session.fulfillment(), Some(Fulfillment::Pickup));
        assert_eq!(session.state(), SessionState::MainMenu);
    }

    #[test]
    fn checkout_with_empty_cart_stays_put() {
        let mut session = session();

        session.apply(Event::SelectFulfillment(Fulfillment::Delivery));
        session.apply(Event::Browse);

        assert_eq!(
            session.apply(Event::Checkout),
            Action::Notify(Notice::EmptyCart)
        );
        assert_eq!(session.state(), SessionState::Browsing);
    }

    #[test]
    fn checkout_without_order_type_stays_put() -> TestResult {
        let mut session = session_with_cart()?;

        assert_eq!(
            session.apply(Event::Checkout),
            Action::Notify(Notice::OrderTypeRequired)
        );
        assert_eq!(session.state(), SessionState::MainMenu);

        Ok(())
    }

    #[test]
    fn delivery_checkout_asks_for_address_then_phone() -> TestResult {
        let mut session = session_with_cart()?;

        session.apply(Event::SelectFulfillment(Fulfillment::Delivery));

        assert_eq!(session.apply(Event::Checkout), Action::RequestAddress);
        assert_eq!(session.state(), SessionState::CheckoutAddress);

        let action = session.apply(Event::Text(" 1 High Street ".to_string()));

        assert_eq!(
            action,
            Action::RequestPhone {
                address_saved: true
            }
        );
        assert_eq!(session.state(), SessionState::CheckoutPhone);
        assert_eq!(session.checkout().address.as_deref(), Some("1 High Street"));

        assert_eq!(
            session.apply(Event::Text("555-0100".to_string())),
            Action::PlaceOrder
        );
        assert_eq!(session.checkout().phone.as_deref(), Some("555-0100"));

        Ok(())
    }

    #[test]
    fn pickup_checkout_skips_address() -> TestResult {
        let mut session = session_with_cart()?;

        session.apply(Event::SelectFulfillment(Fulfillment::Pickup));

        assert_eq!(
            session.apply(Event::Checkout),
            Action::RequestPhone {
                address_saved: false
            }
        );
        assert_eq!(session.state(), SessionState::CheckoutPhone);

        Ok(())
    }

    #[test]
    fn blank_checkout_input_reprompts() -> TestResult {
        let mut session = session_with_cart()?;

        session.apply(Event::SelectFulfillment(Fulfillment::Delivery));
        session.apply(Event::Checkout);

        assert_eq!(
            session.apply(Event::Text("   ".to_string())),
            Action::Notify(Notice::BlankInput)
        );
        assert_eq!(session.state(), SessionState::CheckoutAddress);
        assert_eq!(session.checkout().address, None);

        Ok(())
    }

    #[test]
    fn restarting_checkout_discards_captured_details() -> TestResult {
        let mut session = session_with_cart()?;

        session.apply(Event::SelectFulfillment(Fulfillment::Delivery));
        session.apply(Event::Checkout);
        session.apply(Event::Text("Old address".to_string()));
        session.apply(Event::Checkout);

        assert_eq!(session.checkout(), &CheckoutInfo::default());
        assert_eq!(session.state(), SessionState::CheckoutAddress);

        Ok(())
    }

    #[test]
    fn back_to_menu_works_during_checkout_and_keeps_cart() -> TestResult {
        let mut session = session_with_cart()?;

        session.apply(Event::SelectFulfillment(Fulfillment::Delivery));
        session.apply(Event::Checkout);

        assert_eq!(session.apply(Event::BackToMenu), Action::MainMenu);
        assert_eq!(session.state(), SessionState::MainMenu);
        assert_eq!(session.cart().len(), 1);
        assert_eq!(session.fulfillment(), Some(Fulfillment::Delivery));

        Ok(())
    }

    #[test]
    fn one_character_search_stays_in_searching() {
        let mut session = session();

        assert_eq!(session.apply(Event::Search), Action::PromptSearch);

        assert_eq!(
            session.apply(Event::Text(" a ".to_string())),
            Action::Notify(Notice::SearchTooShort)
        );
        assert_eq!(session.state(), SessionState::Searching);
    }

    #[test]
    fn search_returns_to_main_menu() {
        let mut session = session();

        session.apply(Event::Search);

        assert_eq!(
            session.apply(Event::Text("  milk ".to_string())),
            Action::RunSearch("milk".to_string())
        );
        assert_eq!(session.state(), SessionState::MainMenu);
    }

    #[test]
    fn clear_cart_keeps_state() -> TestResult {
        let mut session = session_with_cart()?;

        session.apply(Event::Browse);

        assert_eq!(session.apply(Event::ClearCart), Action::CartCleared);
        assert!(session.cart().is_empty());
        assert_eq!(session.state(), SessionState::Browsing);

        Ok(())
    }

    #[test]
    fn remove_from_cart_reports_missing_lines() -> TestResult {
        let mut session = session_with_cart()?;

        assert!(matches!(
            session.apply(Event::RemoveFromCart(ProductId::new(1))),
            Action::Removed(line) if line.product_id == ProductId::new(1)
        ));
        assert_eq!(
            session.apply(Event::RemoveFromCart(ProductId::new(1))),
            Action::Notify(Notice::NotInCart)
        );

        Ok(())
    }

    #[test]
    fn free_text_outside_input_states_is_unrecognised() {
        let mut session = session();

        for setup in [Event::BackToMenu, Event::Browse, Event::ChooseOrderType] {
            session.apply(setup);

            let state = session.state();

            assert_eq!(
                session.apply(Event::Text("hello".to_string())),
                Action::Notify(Notice::Unrecognized)
            );
            assert_eq!(session.state(), state, "state must not change");
        }
    }

    #[test]
    fn complete_order_resets_session() -> TestResult {
        let mut session = session_with_cart()?;

        session.apply(Event::SelectFulfillment(Fulfillment::Pickup));
        session.apply(Event::Checkout);
        session.apply(Event::Text("555-0100".to_string()));

        let id: OrderId = "ABCDEF12".parse()?;

        session.complete_order(id.clone());

        assert_eq!(session.state(), SessionState::MainMenu);
        assert!(session.cart().is_empty());
        assert_eq!(session.checkout(), &CheckoutInfo::default());
        assert_eq!(session.last_order(), Some(&id));
        assert_eq!(session.fulfillment(), Some(Fulfillment::Pickup));

        Ok(())
    }
}
