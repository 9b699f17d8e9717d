//! Chat storefront: drives customer sessions against the domain services.

mod checkout;
mod render;

use std::sync::Arc;

use grocer::{
    customers::{ConversationId, CustomerId, CustomerProfile},
    menu::{self, Input, Reply},
    pricing::OrderPolicy,
    products::{CatalogProduct, ProductId},
    session::{Action, Event, Session},
};
use jiff::tz::TimeZone;
use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::{
    context::AppContext,
    domain::{
        customers::CustomersService,
        orders::OrdersService,
        products::{ProductsService, ProductsServiceError},
    },
    notify::Notifier,
    sessions::SessionStore,
};

const POPULAR_LIMIT: u32 = 10;
const ORDER_HISTORY_LIMIT: u32 = 10;

/// Store details shown to customers, plus the ordering rules.
#[derive(Debug, Clone)]
pub struct StoreInfo {
    /// Display name used in greetings
    pub name: String,

    /// Street address shown on the contact card
    pub address: String,

    /// Contact phone number
    pub phone: String,

    /// Contact email
    pub email: String,

    /// Opening time, as shown to customers
    pub open_time: String,

    /// Closing time, as shown to customers
    pub close_time: String,

    /// Start of the delivery window
    pub delivery_open_time: String,

    /// End of the delivery window
    pub delivery_close_time: String,

    /// Advertised delivery radius in kilometres
    pub delivery_radius_km: Decimal,

    /// Currency prices are stored and rendered in
    pub currency: &'static Currency,

    /// Cart limits, minimum order and delivery fees
    pub policy: OrderPolicy,

    /// Zone used for receipt and order history timestamps
    pub time_zone: TimeZone,
}

impl Default for StoreInfo {
    fn default() -> Self {
        Self {
            name: "Fresh Grocery Store".to_string(),
            address: "123 Main Street, City, State 12345".to_string(),
            phone: "+1-555-0123".to_string(),
            email: "orders@freshgrocery.com".to_string(),
            open_time: "08:00".to_string(),
            close_time: "22:00".to_string(),
            delivery_open_time: "09:00".to_string(),
            delivery_close_time: "21:00".to_string(),
            delivery_radius_km: Decimal::TEN,
            currency: iso::USD,
            policy: OrderPolicy::default(),
            time_zone: TimeZone::UTC,
        }
    }
}

/// One inbound message from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Update {
    /// Where replies are delivered
    pub conversation: ConversationId,

    /// Sender, used to key the session
    pub customer: CustomerId,

    /// Sender's names, refreshed on registration
    pub profile: CustomerProfile,

    /// Text or button press
    pub input: Input,
}

pub struct Storefront {
    products: Arc<dyn ProductsService>,
    customers: Arc<dyn CustomersService>,
    orders: Arc<dyn OrdersService>,
    notifier: Arc<dyn Notifier>,
    sessions: SessionStore,
    store: StoreInfo,
}

impl Storefront {
    #[must_use]
    pub fn new(context: AppContext, notifier: Arc<dyn Notifier>, store: StoreInfo) -> Self {
        Self {
            products: context.products,
            customers: context.customers,
            orders: context.orders,
            notifier,
            sessions: SessionStore::new(store.policy.max_cart_items),
            store,
        }
    }

    #[must_use]
    pub fn store(&self) -> &StoreInfo {
        &self.store
    }

    /// Customers seen since start-up.
    pub async fn active_sessions(&self) -> usize {
        self.sessions.len().await
    }

    /// Process one update and deliver the replies it produces.
    ///
    /// Updates for the same customer are handled one at a time. Failures
    /// are logged and answered with a generic notice, never returned.
    /// Returns the number of replies produced.
    pub async fn handle(&self, update: Update) -> usize {
        let Update {
            conversation,
            customer,
            profile,
            input,
        } = update;

        let event = menu::parse(&input);

        let mut session = self.sessions.acquire(customer).await;

        if !session.is_registered() || matches!(event, Event::Start) {
            self.register(&mut session, &profile).await;
        }

        let from = session.state();
        let action = session.apply(event);

        debug!(%customer, ?from, to = ?session.state(), ?action, "session event applied");

        let replies = self.perform(&mut session, &profile, action).await;
        let produced = replies.len();

        for reply in replies {
            if let Err(error) = self.notifier.deliver(conversation, reply).await {
                warn!(%conversation, %error, "failed to deliver reply");
            }
        }

        produced
    }

    async fn register(&self, session: &mut Session, profile: &CustomerProfile) {
        match self
            .customers
            .upsert_customer(session.customer(), profile.clone())
            .await
        {
            Ok(_) => session.mark_registered(),
            Err(error) => {
                warn!(customer = %session.customer(), %error, "failed to register customer");
            }
        }
    }

    async fn perform(
        &self,
        session: &mut Session,
        profile: &CustomerProfile,
        action: Action,
    ) -> Vec<Reply> {
        let currency = self.store.currency;

        match action {
            Action::Welcome => vec![render::welcome(&self.store, &profile.first_name)],
            Action::ShowHelp => vec![render::help()],
            Action::ShowCategories => match self.products.list_categories().await {
                Ok(categories) => vec![render::categories(&categories)],
                Err(error) => failure("list_categories", &error),
            },
            Action::ShowCategory(category) => {
                match self
                    .products
                    .list_products_in_category(category.clone())
                    .await
                {
                    Ok(products) => {
                        let products = catalog(products);

                        vec![render::category_products(&category, &products, currency)]
                    }
                    Err(error) => failure("list_products_in_category", &error),
                }
            }
            Action::ShowCart => render::cart(session.cart(), currency),
            Action::Removed(line) => {
                let mut replies = vec![render::removed(&line)];

                replies.extend(render::cart(session.cart(), currency));

                replies
            }
            Action::ShowOrderTypes => vec![render::order_types()],
            Action::FulfillmentSelected(fulfillment) => render::fulfillment_selected(fulfillment),
            Action::RequestAddress => vec![render::request_address()],
            Action::RequestPhone { address_saved } => vec![render::request_phone(address_saved)],
            Action::PlaceOrder => self.place_order(session).await,
            Action::PromptSearch => vec![render::search_prompt()],
            Action::RunSearch(term) => match self.products.search_products(term.clone()).await {
                Ok(products) => {
                    let products = catalog(products);

                    vec![render::search_results(&term, &products, currency)]
                }
                Err(error) => failure("search_products", &error),
            },
            Action::ShowPopular => match self.products.popular_products(POPULAR_LIMIT).await {
                Ok(products) => vec![render::popular(&products, currency)],
                Err(error) => failure("popular_products", &error),
            },
            Action::ShowOrders => {
                match self
                    .orders
                    .customer_orders(session.customer(), ORDER_HISTORY_LIMIT)
                    .await
                {
                    Ok(orders) => vec![render::orders(&orders, currency, &self.store.time_zone)],
                    Err(error) => failure("customer_orders", &error),
                }
            }
            Action::ShowContact => vec![render::contact(&self.store)],
            Action::AddToCart(product) => vec![self.add_to_cart(session, product).await],
            Action::CartCleared => vec![render::cart_cleared()],
            Action::MainMenu => vec![render::main_menu()],
            Action::Notify(notice) => vec![render::notice(notice)],
        }
    }

    async fn add_to_cart(&self, session: &mut Session, product: ProductId) -> Reply {
        match self.products.get_product(product).await {
            Ok(record) => {
                let product = CatalogProduct::from(record);
                let result = session.add_to_cart(&product);

                render::added_to_cart(&product, result)
            }
            Err(ProductsServiceError::NotFound) => render::product_not_found(),
            Err(error) => {
                error!(%product, %error, "get_product failed");

                render::failure()
            }
        }
    }
}

fn catalog<T: Into<CatalogProduct>>(records: Vec<T>) -> Vec<CatalogProduct> {
    records.into_iter().map(Into::into).collect()
}

fn failure(operation: &'static str, error: &dyn std::error::Error) -> Vec<Reply> {
    error!(operation, %error, "storefront operation failed");

    vec![render::failure()]
}
