//! Products Repository

use grocer::products::ProductId;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{get_parsed, get_u32, get_u64},
    domain::products::{
        data::{NewProduct, ProductUpdate},
        records::{InventoryAction, InventoryLogRecord, PopularProductRecord, ProductRecord},
    },
};

const LIST_CATEGORIES_SQL: &str = include_str!("sql/list_categories.sql");
const LIST_PRODUCTS_IN_CATEGORY_SQL: &str = include_str!("sql/list_products_in_category.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const SEARCH_PRODUCTS_SQL: &str = include_str!("sql/search_products.sql");
const POPULAR_PRODUCTS_SQL: &str = include_str!("sql/popular_products.sql");
const LOW_STOCK_PRODUCTS_SQL: &str = include_str!("sql/low_stock_products.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const LOCK_PRODUCT_STOCK_SQL: &str = include_str!("sql/lock_product_stock.sql");
const SET_PRODUCT_STOCK_SQL: &str = include_str!("sql/set_product_stock.sql");
const CREATE_INVENTORY_LOG_SQL: &str = include_str!("sql/create_inventory_log.sql");
const LIST_INVENTORY_LOGS_SQL: &str = include_str!("sql/list_inventory_logs.sql");

/// Stock movement to append to the inventory log.
#[derive(Debug, Clone)]
pub(crate) struct InventoryChange<'a> {
    pub(crate) product: ProductId,
    pub(crate) action: InventoryAction,
    pub(crate) previous_stock: u32,
    pub(crate) new_stock: u32,
    pub(crate) reason: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_categories(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<String>, sqlx::Error> {
        query_scalar::<Postgres, String>(LIST_CATEGORIES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_products_in_category(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: &str,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_IN_CATEGORY_SQL)
            .bind(category)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.get())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn search_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        pattern: &str,
        limit: i64,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(SEARCH_PRODUCTS_SQL)
            .bind(pattern)
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn popular_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: i64,
    ) -> Result<Vec<PopularProductRecord>, sqlx::Error> {
        query_as::<Postgres, PopularProductRecord>(POPULAR_PRODUCTS_SQL)
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn low_stock_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        threshold: i32,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LOW_STOCK_PRODUCTS_SQL)
            .bind(threshold)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
        price: i64,
        stock: i32,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(&product.name)
            .bind(&product.category)
            .bind(price)
            .bind(stock)
            .bind(product.description.as_deref())
            .bind(product.image_url.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
        update: &ProductUpdate,
        price: i64,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.get())
            .bind(&update.name)
            .bind(&update.category)
            .bind(price)
            .bind(update.description.as_deref())
            .bind(update.image_url.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
    ) -> Result<u64, sqlx::Error> {
        let result = query(DELETE_PRODUCT_SQL)
            .bind(product.get())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lock the product row for the rest of the transaction and return its stock.
    pub(crate) async fn lock_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
    ) -> Result<i32, sqlx::Error> {
        query_scalar::<Postgres, i32>(LOCK_PRODUCT_STOCK_SQL)
            .bind(product.get())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
        stock: i32,
    ) -> Result<u64, sqlx::Error> {
        let result = query(SET_PRODUCT_STOCK_SQL)
            .bind(product.get())
            .bind(stock)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub(crate) async fn create_inventory_log(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        change: InventoryChange<'_>,
    ) -> Result<InventoryLogRecord, sqlx::Error> {
        let previous = i64::from(change.previous_stock);
        let new = i64::from(change.new_stock);

        let to_column = |value: i64, column: &str| {
            i32::try_from(value).map_err(|e| sqlx::Error::Encode(format!("{column}: {e}").into()))
        };

        query_as::<Postgres, InventoryLogRecord>(CREATE_INVENTORY_LOG_SQL)
            .bind(change.product.get())
            .bind(change.action.as_str())
            .bind(to_column(new - previous, "quantity_change")?)
            .bind(to_column(previous, "previous_stock")?)
            .bind(to_column(new, "new_stock")?)
            .bind(change.reason)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_inventory_logs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
        limit: i64,
    ) -> Result<Vec<InventoryLogRecord>, sqlx::Error> {
        query_as::<Postgres, InventoryLogRecord>(LIST_INVENTORY_LOGS_SQL)
            .bind(product.get())
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            price: get_u64(row, "price")?,
            stock: get_u32(row, "stock")?,
            description: row.try_get("description")?,
            image_url: row.try_get("image_url")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PopularProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            product: ProductRecord::from_row(row)?,
            order_count: get_u64(row, "order_count")?,
            units_sold: get_u64(row, "units_sold")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for InventoryLogRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            product_id: ProductId::new(row.try_get("product_id")?),
            action: get_parsed(row, "action")?,
            quantity_change: i64::from(row.try_get::<i32, _>("quantity_change")?),
            previous_stock: get_u32(row, "previous_stock")?,
            new_stock: get_u32(row, "new_stock")?,
            reason: row.try_get("reason")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
