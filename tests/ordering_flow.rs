//! Integration test walking a customer through a full ordering session.
//!
//! Cart: Apples $3.00 x2, Bread $5.50 x1.
//!
//! - Subtotal: $11.50
//! - Delivery selected, free delivery from $50.00, flat fee $5.00
//! - Total: $16.50
//!
//! After the order is placed the session is back at the main menu with an
//! empty cart and no checkout details.

use jiff::Zoned;
use rusty_money::iso;
use testresult::TestResult;

use grocer::prelude::*;

fn product(id: i64, name: &str, price: u64, stock: u32) -> CatalogProduct {
    CatalogProduct {
        id: ProductId::new(id),
        name: name.to_string(),
        category: "Groceries".to_string(),
        price,
        stock,
        description: None,
        image_url: None,
    }
}

fn send(session: &mut Session, text: &str) -> Action {
    session.apply(grocer::menu::parse(&Input::Text(text.to_string())))
}

#[test]
fn delivery_order_from_browse_to_receipt() -> TestResult {
    let policy = OrderPolicy::default();
    let apples = product(1, "Apples", 300, 10);
    let bread = product(2, "Bread", 550, 3);

    let mut session = Session::new(CustomerId::new(1001), policy.max_cart_items);

    assert_eq!(send(&mut session, "🛒 Browse Products"), Action::ShowCategories);

    for product in [&apples, &apples, &bread] {
        let callback = Input::Callback(grocer::menu::add_to_cart_data(product.id));

        assert_eq!(
            session.apply(grocer::menu::parse(&callback)),
            Action::AddToCart(product.id)
        );

        session.add_to_cart(product)?;
    }

    assert_eq!(session.cart().total(), 1150);

    send(&mut session, "📦 Order Type");
    send(&mut session, "🚚 Home Delivery");

    assert_eq!(send(&mut session, "🛒 Checkout"), Action::RequestAddress);
    send(&mut session, "12 Elm Road");
    assert_eq!(send(&mut session, "+1 555 0100"), Action::PlaceOrder);

    let draft = prepare_order(&session, &policy)?;

    assert_eq!(
        draft.quote,
        Quote {
            subtotal: 1150,
            delivery_fee: 500,
            total: 1650,
        }
    );
    assert_eq!(draft.address.as_deref(), Some("12 Elm Road"));
    assert_eq!(draft.snapshot.total(), 1150);

    let receipt = Receipt::new(&draft, "2026-05-04T18:00:00[UTC]".parse::<Zoned>()?, iso::USD);

    assert!(receipt.to_string().contains("Total Amount: $16.50"));

    session.complete_order(draft.id.clone());

    assert_eq!(session.state(), SessionState::MainMenu);
    assert!(session.cart().is_empty());
    assert_eq!(session.checkout(), &CheckoutInfo::default());
    assert_eq!(session.last_order(), Some(&draft.id));

    Ok(())
}

#[test]
fn order_below_minimum_is_rejected_without_reset() -> TestResult {
    let policy = OrderPolicy::default();
    let milk = product(3, "Milk", 400, 10);

    let mut session = Session::new(CustomerId::new(1002), policy.max_cart_items);

    session.add_to_cart(&milk)?;
    session.add_to_cart(&milk)?;

    send(&mut session, "🏪 Take Away");
    send(&mut session, "🛒 Checkout");
    send(&mut session, "555-0199");

    assert_eq!(
        prepare_order(&session, &policy),
        Err(CheckoutError::Pricing(PricingError::BelowMinimum {
            minimum: 1000,
            subtotal: 800,
            shortfall: 200,
        }))
    );
    assert_eq!(session.state(), SessionState::CheckoutPhone);
    assert_eq!(session.cart().len(), 1);

    Ok(())
}

#[test]
fn pickup_orders_never_pay_delivery() -> TestResult {
    let policy = OrderPolicy::default();
    let cheese = product(4, "Cheese", 1200, 10);

    let mut session = Session::new(CustomerId::new(1003), policy.max_cart_items);

    session.add_to_cart(&cheese)?;

    send(&mut session, "🏪 Take Away");
    send(&mut session, "🛒 Checkout");
    send(&mut session, "555-0142");

    let draft = prepare_order(&session, &policy)?;

    assert_eq!(draft.quote.delivery_fee, 0);
    assert_eq!(draft.address, None);

    Ok(())
}

#[test]
fn stock_limits_hold_across_session_adds() -> TestResult {
    let eggs = product(5, "Eggs", 250, 2);

    let mut session = Session::new(CustomerId::new(1004), 50);

    session.add_to_cart(&eggs)?;
    session.add_to_cart(&eggs)?;

    assert_eq!(
        session.add_to_cart(&eggs),
        Err(CartError::OutOfStock { available: 2 })
    );
    assert_eq!(session.cart().quantity_of(eggs.id), 2);

    Ok(())
}
