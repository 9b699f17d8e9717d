//! Order commit.

use grocer::{
    menu::{Keyboard, Reply},
    orders::prepare_order,
    receipt::Receipt,
    session::Session,
};
use tracing::{error, info};

use crate::domain::orders::OrdersServiceError;

use super::{Storefront, render};

impl Storefront {
    /// Validate the session, record the order and render its receipt.
    ///
    /// The session is only reset once the order is stored; on any failure
    /// it stays in the phone step so the customer can retry.
    pub(super) async fn place_order(&self, session: &mut Session) -> Vec<Reply> {
        let draft = match prepare_order(session, &self.store.policy) {
            Ok(draft) => draft,
            Err(rejection) => {
                info!(customer = %session.customer(), %rejection, "checkout rejected");

                return vec![render::checkout_rejected(&rejection, self.store.currency)];
            }
        };

        match self.orders.place_order(draft.clone()).await {
            Ok(order) => {
                let placed_at = order.created_at.to_zoned(self.store.time_zone.clone());
                let receipt = Receipt::new(&draft, placed_at, self.store.currency);

                session.complete_order(order.id);

                vec![Reply::with_keyboard(receipt.to_string(), Keyboard::main_menu())]
            }
            Err(OrdersServiceError::InsufficientStock { product }) => {
                let name = draft
                    .lines
                    .iter()
                    .find(|line| line.product_id == product)
                    .map_or_else(|| product.to_string(), |line| line.name.clone());

                info!(customer = %session.customer(), %product, "order rejected for stock");

                vec![render::insufficient_stock(&name)]
            }
            Err(error) => {
                error!(customer = %session.customer(), order = %draft.id, %error, "failed to place order");

                vec![render::order_failed()]
            }
        }
    }
}
