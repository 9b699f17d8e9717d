//! Test helpers.

use std::sync::Arc;

use grocer_app::{
    context::AppContext,
    domain::{
        customers::{MockCustomersService, records::CustomerRecord},
        orders::MockOrdersService,
        products::MockProductsService,
    },
    notify::{MockNotifier, Notifier},
    storefront::{StoreInfo, Storefront},
};
use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use crate::state::State;

/// Service mocks behind a test storefront. Unset expectations fail the test.
pub(crate) struct Mocks {
    pub(crate) products: MockProductsService,
    pub(crate) customers: MockCustomersService,
    pub(crate) orders: MockOrdersService,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            products: MockProductsService::new(),
            customers: MockCustomersService::new(),
            orders: MockOrdersService::new(),
            notifier: Arc::new(MockNotifier::new()),
        }
    }
}

/// Customers mock that accepts every registration.
pub(crate) fn registered_customers() -> MockCustomersService {
    let mut customers = MockCustomersService::new();

    customers
        .expect_upsert_customer()
        .returning(|id, profile| {
            Ok(CustomerRecord {
                id,
                first_name: profile.first_name,
                last_name: profile.last_name,
                username: profile.username,
                registered_at: Timestamp::UNIX_EPOCH,
                last_active_at: Timestamp::UNIX_EPOCH,
            })
        });

    customers
}

pub(crate) fn service(mocks: Mocks, route: Router) -> Service {
    let storefront = Storefront::new(
        AppContext {
            products: Arc::new(mocks.products),
            customers: Arc::new(mocks.customers),
            orders: Arc::new(mocks.orders),
        },
        mocks.notifier,
        StoreInfo::default(),
    );

    Service::new(
        Router::new()
            .hoop(inject(State::from_storefront(storefront)))
            .push(route),
    )
}
