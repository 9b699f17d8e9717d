//! Orders service.

use std::{
    future::Future,
    sync::atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use grocer::{
    customers::CustomerId,
    orders::{OrderDraft, OrderId, OrderStatus},
};
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info, warn};

use crate::{
    database::Db,
    domain::orders::{
        errors::OrdersServiceError,
        records::{OrderItemRecord, OrderRecord, RecentOrderRecord, SalesSummary},
        repository::PgOrdersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }

    async fn try_place_order(&self, draft: &OrderDraft) -> Result<OrderRecord, OrdersServiceError> {
        let items = draft.snapshot.to_json()?;

        let mut tx = self.db.begin().await?;

        let order = self.repository.create_order(&mut tx, draft, items).await?;

        for line in &draft.lines {
            self.repository
                .create_order_item(&mut tx, &draft.id, line)
                .await?;

            let Some(remaining) = self
                .repository
                .decrement_stock(&mut tx, line.product_id, line.quantity)
                .await?
            else {
                debug!(
                    order = %draft.id,
                    product = %line.product_id,
                    quantity = line.quantity,
                    "insufficient stock, rolling back order"
                );

                return Err(OrdersServiceError::InsufficientStock {
                    product: line.product_id,
                });
            };

            self.repository
                .create_sale_log(&mut tx, line.product_id, line.quantity, remaining, &draft.id)
                .await?;
        }

        tx.commit().await?;

        info!(
            order = %order.id,
            customer = %order.customer_id,
            total = order.total,
            lines = draft.lines.len(),
            "order placed"
        );

        Ok(order)
    }
}

/// Run `attempt` through [`Db::with_retry`].
///
/// A connection failure while committing can hide a commit that landed. The
/// retry then collides with the draft's own id; in that case the stored order
/// is read back with `lookup` and returned when it is the one the draft
/// describes.
async fn place_with_retry<A, AF, L, LF>(
    draft: &OrderDraft,
    mut attempt: A,
    lookup: L,
) -> Result<OrderRecord, OrdersServiceError>
where
    A: FnMut() -> AF,
    AF: Future<Output = Result<OrderRecord, OrdersServiceError>>,
    L: FnOnce() -> LF,
    LF: Future<Output = Result<OrderRecord, OrdersServiceError>>,
{
    let attempts = AtomicU32::new(0);

    let result = Db::with_retry("place_order", || {
        attempts.fetch_add(1, Ordering::Relaxed);

        attempt()
    })
    .await;

    match result {
        Err(OrdersServiceError::AlreadyExists) if attempts.load(Ordering::Relaxed) > 1 => {
            let stored = lookup().await?;

            if stored.matches_draft(draft) {
                warn!(order = %stored.id, "order was committed before the connection failed");

                Ok(stored)
            } else {
                Err(OrdersServiceError::AlreadyExists)
            }
        }
        result => result,
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn place_order(&self, draft: OrderDraft) -> Result<OrderRecord, OrdersServiceError> {
        let draft = &draft;

        place_with_retry(
            draft,
            || self.try_place_order(draft),
            || self.get_order(draft.id.clone()),
        )
        .await
    }

    async fn get_order(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError> {
        let order = &order;

        Db::with_retry("get_order", || async move {
            let mut tx = self.db.begin().await?;

            let record = self.repository.get_order(&mut tx, order).await?;

            tx.commit().await?;

            Ok(record)
        })
        .await
    }

    async fn order_items(&self, order: OrderId) -> Result<Vec<OrderItemRecord>, OrdersServiceError> {
        let order = &order;

        Db::with_retry("order_items", || async move {
            let mut tx = self.db.begin().await?;

            let items = self.repository.list_order_items(&mut tx, order).await?;

            tx.commit().await?;

            Ok(items)
        })
        .await
    }

    async fn customer_orders(
        &self,
        customer: CustomerId,
        limit: u32,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        Db::with_retry("customer_orders", || async move {
            let mut tx = self.db.begin().await?;

            let orders = self
                .repository
                .customer_orders(&mut tx, customer, i64::from(limit))
                .await?;

            tx.commit().await?;

            Ok(orders)
        })
        .await
    }

    async fn recent_orders(&self, limit: u32) -> Result<Vec<RecentOrderRecord>, OrdersServiceError> {
        Db::with_retry("recent_orders", || async move {
            let mut tx = self.db.begin().await?;

            let orders = self
                .repository
                .recent_orders(&mut tx, i64::from(limit))
                .await?;

            tx.commit().await?;

            Ok(orders)
        })
        .await
    }

    async fn update_status(
        &self,
        order: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        if !from.can_transition_to(to) {
            return Err(OrdersServiceError::InvalidTransition { from, to });
        }

        let order = &order;

        Db::with_retry("update_status", || async move {
            let mut tx = self.db.begin().await?;

            let updated = self
                .repository
                .update_status(&mut tx, order, from, to)
                .await?;

            let Some(updated) = updated else {
                let current = self.repository.get_order(&mut tx, order).await?;

                return Err(OrdersServiceError::StatusConflict {
                    expected: from,
                    actual: current.status,
                });
            };

            tx.commit().await?;

            info!(order = %order, %from, %to, "order status updated");

            Ok(updated)
        })
        .await
    }

    async fn sales_summary(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<SalesSummary, OrdersServiceError> {
        Db::with_retry("sales_summary", || async move {
            let mut tx = self.db.begin().await?;

            let (order_count, revenue) = self.repository.sales_summary(&mut tx, from, to).await?;

            tx.commit().await?;

            Ok(SalesSummary::new(
                u64::try_from(order_count)?,
                u64::try_from(revenue)?,
            ))
        })
        .await
    }
}

#[automock]
#[async_trait]
/// Order persistence operations.
pub trait OrdersService: Send + Sync {
    /// Record the order, its items and the stock it consumes in one transaction.
    ///
    /// Nothing is written when any line is short of stock.
    async fn place_order(&self, draft: OrderDraft) -> Result<OrderRecord, OrdersServiceError>;

    async fn get_order(&self, order: OrderId) -> Result<OrderRecord, OrdersServiceError>;

    async fn order_items(&self, order: OrderId) -> Result<Vec<OrderItemRecord>, OrdersServiceError>;

    /// The customer's most recent orders, newest first.
    async fn customer_orders(
        &self,
        customer: CustomerId,
        limit: u32,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Most recent orders across all customers, newest first.
    async fn recent_orders(&self, limit: u32) -> Result<Vec<RecentOrderRecord>, OrdersServiceError>;

    /// Move an order from `from` to `to`, failing if it is no longer in `from`.
    async fn update_status(
        &self,
        order: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Sales in the half-open window `[from, to)`.
    async fn sales_summary(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<SalesSummary, OrdersServiceError>;
}
