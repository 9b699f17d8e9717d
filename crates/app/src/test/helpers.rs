//! Test Helpers

use grocer::{
    cart::Cart,
    customers::{CustomerId, CustomerProfile},
    orders::{Fulfillment, OrderDraft, OrderId},
    pricing::{OrderPolicy, quote},
    products::CatalogProduct,
};
use testresult::TestResult;

use crate::{
    domain::{
        customers::{CustomersService, CustomersServiceError, records::CustomerRecord},
        products::{
            ProductsService, ProductsServiceError, data::NewProduct, records::ProductRecord,
        },
    },
    test::TestContext,
};

pub(crate) fn profile(first_name: &str, last_name: Option<&str>) -> CustomerProfile {
    CustomerProfile {
        first_name: first_name.to_string(),
        last_name: last_name.map(str::to_string),
        username: None,
    }
}

pub(crate) async fn create_customer(
    ctx: &TestContext,
    id: i64,
) -> Result<CustomerRecord, CustomersServiceError> {
    ctx.customers
        .upsert_customer(CustomerId::new(id), profile("Test", Some("Customer")))
        .await
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    category: &str,
    price: u64,
    stock: u32,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            name: name.to_string(),
            category: category.to_string(),
            price,
            stock,
            description: None,
            image_url: None,
        })
        .await
}

/// Build an order draft the way checkout would, without a minimum order amount.
pub(crate) fn draft(
    customer: CustomerId,
    lines: &[(&ProductRecord, u32)],
    fulfillment: Fulfillment,
) -> TestResult<OrderDraft> {
    let policy = OrderPolicy {
        min_order_amount: 0,
        ..OrderPolicy::default()
    };

    let mut cart = Cart::new(policy.max_cart_items);

    for (product, quantity) in lines {
        let product = CatalogProduct::from((*product).clone());

        for _ in 0..*quantity {
            cart.add_item(&product, product.stock)?;
        }
    }

    Ok(OrderDraft {
        id: OrderId::generate(),
        customer,
        lines: cart.lines().to_vec(),
        quote: quote(&cart, fulfillment, &policy)?,
        fulfillment,
        address: matches!(fulfillment, Fulfillment::Delivery).then(|| "1 Test Street".to_string()),
        phone: "555-0100".to_string(),
        snapshot: cart.snapshot(),
    })
}
