//! Orders Repository

use grocer::{
    cart::{CartLine, CartSnapshot},
    customers::{CustomerId, display_name},
    orders::{OrderDraft, OrderId, OrderStatus},
    products::ProductId,
};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{get_parsed, get_u32, get_u64},
    domain::orders::records::{OrderItemRecord, OrderRecord, RecentOrderRecord},
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const CREATE_SALE_LOG_SQL: &str = include_str!("sql/create_sale_log.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("sql/list_order_items.sql");
const CUSTOMER_ORDERS_SQL: &str = include_str!("sql/customer_orders.sql");
const RECENT_ORDERS_SQL: &str = include_str!("sql/recent_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const SALES_SUMMARY_SQL: &str = include_str!("sql/sales_summary.sql");

fn encode<T, U>(value: T, column: &str) -> Result<U, sqlx::Error>
where
    U: TryFrom<T, Error = std::num::TryFromIntError>,
{
    U::try_from(value).map_err(|e| sqlx::Error::Encode(format!("{column}: {e}").into()))
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        draft: &OrderDraft,
        items: serde_json::Value,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(draft.id.as_str())
            .bind(draft.customer.get())
            .bind(items)
            .bind(encode::<u64, i64>(draft.quote.subtotal, "subtotal")?)
            .bind(encode::<u64, i64>(draft.quote.delivery_fee, "delivery_fee")?)
            .bind(encode::<u64, i64>(draft.quote.total, "total")?)
            .bind(draft.fulfillment.as_str())
            .bind(draft.address.as_deref())
            .bind(&draft.phone)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderId,
        line: &CartLine,
    ) -> Result<u64, sqlx::Error> {
        let result = query(CREATE_ORDER_ITEM_SQL)
            .bind(order.as_str())
            .bind(line.product_id.get())
            .bind(encode::<u32, i32>(line.quantity, "quantity")?)
            .bind(encode::<u64, i64>(line.unit_price, "unit_price")?)
            .bind(encode::<u64, i64>(line.subtotal(), "subtotal")?)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    /// Take `quantity` units out of stock when enough remain.
    ///
    /// Returns the remaining stock, or `None` when the product is missing or
    /// short; the row is left untouched in that case.
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
        quantity: u32,
    ) -> Result<Option<u32>, sqlx::Error> {
        let remaining = query_scalar::<Postgres, i32>(DECREMENT_STOCK_SQL)
            .bind(product.get())
            .bind(encode::<u32, i32>(quantity, "quantity")?)
            .fetch_optional(&mut **tx)
            .await?;

        remaining
            .map(|stock| {
                u32::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "stock".to_string(),
                    source: Box::new(e),
                })
            })
            .transpose()
    }

    pub(crate) async fn create_sale_log(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
        quantity: u32,
        remaining: u32,
        order: &OrderId,
    ) -> Result<u64, sqlx::Error> {
        let quantity: i32 = encode(quantity, "quantity_change")?;
        let remaining: i32 = encode(remaining, "new_stock")?;

        let result = query(CREATE_SALE_LOG_SQL)
            .bind(product.get())
            .bind(-quantity)
            .bind(remaining.saturating_add(quantity))
            .bind(remaining)
            .bind(format!("Order {order}"))
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderId,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderId,
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(LIST_ORDER_ITEMS_SQL)
            .bind(order.as_str())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn customer_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerId,
        limit: i64,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CUSTOMER_ORDERS_SQL)
            .bind(customer.get())
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn recent_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: i64,
    ) -> Result<Vec<RecentOrderRecord>, sqlx::Error> {
        query_as::<Postgres, RecentOrderRecord>(RECENT_ORDERS_SQL)
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }

    /// Set the status only if it still equals `from`.
    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.as_str())
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Order count and revenue in `[from, to)`.
    pub(crate) async fn sales_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<(i64, i64), sqlx::Error> {
        query_as::<Postgres, (i64, i64)>(SALES_SUMMARY_SQL)
            .bind(SqlxTimestamp::from(from))
            .bind(SqlxTimestamp::from(to))
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let items = CartSnapshot::from_json(row.try_get("items")?).map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "items".to_string(),
                source: Box::new(e),
            }
        })?;

        Ok(Self {
            id: get_parsed(row, "id")?,
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            items,
            subtotal: get_u64(row, "subtotal")?,
            delivery_fee: get_u64(row, "delivery_fee")?,
            total: get_u64(row, "total")?,
            fulfillment: get_parsed(row, "fulfillment")?,
            delivery_address: row.try_get("delivery_address")?,
            phone: row.try_get("phone")?,
            status: get_parsed(row, "status")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let product_id: Option<i64> = row.try_get("product_id")?;

        Ok(Self {
            id: row.try_get("id")?,
            order_id: get_parsed(row, "order_id")?,
            product_id: product_id.map(ProductId::new),
            quantity: get_u32(row, "quantity")?,
            unit_price: get_u64(row, "unit_price")?,
            subtotal: get_u64(row, "subtotal")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for RecentOrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let first_name: String = row.try_get("first_name")?;
        let last_name: Option<String> = row.try_get("last_name")?;

        Ok(Self {
            order: OrderRecord::from_row(row)?,
            customer_name: display_name(&first_name, last_name.as_deref().unwrap_or_default()),
        })
    }
}
