//! Products service.

use async_trait::async_trait;
use grocer::products::ProductId;
use mockall::automock;

use crate::{
    database::Db,
    domain::products::{
        data::{NewProduct, ProductUpdate},
        errors::ProductsServiceError,
        records::{InventoryAction, InventoryLogRecord, PopularProductRecord, ProductRecord},
        repository::{InventoryChange, PgProductsRepository},
    },
};

/// Most rows a single search returns.
const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

/// Case-insensitive substring pattern with `LIKE` wildcards in `term` escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);

    pattern.push('%');

    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }

        pattern.push(c);
    }

    pattern.push('%');

    pattern
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_categories(&self) -> Result<Vec<String>, ProductsServiceError> {
        Db::with_retry("list_categories", || async move {
            let mut tx = self.db.begin().await?;

            let categories = self.repository.list_categories(&mut tx).await?;

            tx.commit().await?;

            Ok(categories)
        })
        .await
    }

    async fn list_products_in_category(
        &self,
        category: String,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let category = category.as_str();

        Db::with_retry("list_products_in_category", || async move {
            let mut tx = self.db.begin().await?;

            let products = self
                .repository
                .list_products_in_category(&mut tx, category)
                .await?;

            tx.commit().await?;

            Ok(products)
        })
        .await
    }

    async fn get_product(&self, product: ProductId) -> Result<ProductRecord, ProductsServiceError> {
        Db::with_retry("get_product", || async move {
            let mut tx = self.db.begin().await?;

            let record = self.repository.get_product(&mut tx, product).await?;

            tx.commit().await?;

            Ok(record)
        })
        .await
    }

    async fn search_products(
        &self,
        term: String,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let pattern = contains_pattern(term.trim());
        let pattern = pattern.as_str();

        Db::with_retry("search_products", || async move {
            let mut tx = self.db.begin().await?;

            let products = self
                .repository
                .search_products(&mut tx, pattern, SEARCH_LIMIT)
                .await?;

            tx.commit().await?;

            Ok(products)
        })
        .await
    }

    async fn popular_products(
        &self,
        limit: u32,
    ) -> Result<Vec<PopularProductRecord>, ProductsServiceError> {
        Db::with_retry("popular_products", || async move {
            let mut tx = self.db.begin().await?;

            let products = self
                .repository
                .popular_products(&mut tx, i64::from(limit))
                .await?;

            tx.commit().await?;

            Ok(products)
        })
        .await
    }

    async fn low_stock_products(
        &self,
        threshold: u32,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let threshold = i32::try_from(threshold)?;

        Db::with_retry("low_stock_products", || async move {
            let mut tx = self.db.begin().await?;

            let products = self
                .repository
                .low_stock_products(&mut tx, threshold)
                .await?;

            tx.commit().await?;

            Ok(products)
        })
        .await
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let price = i64::try_from(product.price)?;
        let stock = i32::try_from(product.stock)?;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_product(&mut tx, &product, price, stock)
            .await?;

        if product.stock > 0 {
            self.repository
                .create_inventory_log(
                    &mut tx,
                    InventoryChange {
                        product: created.id,
                        action: InventoryAction::Restock,
                        previous_stock: 0,
                        new_stock: product.stock,
                        reason: Some("Initial stock"),
                    },
                )
                .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductId,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let price = i64::try_from(update.price)?;

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product(&mut tx, product, &update, price)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(&self, product: ProductId) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn set_stock(
        &self,
        product: ProductId,
        stock: u32,
        reason: Option<String>,
    ) -> Result<InventoryLogRecord, ProductsServiceError> {
        let new_stock = i32::try_from(stock)?;

        let mut tx = self.db.begin().await?;

        let previous = u32::try_from(self.repository.lock_stock(&mut tx, product).await?)?;

        self.repository
            .set_stock(&mut tx, product, new_stock)
            .await?;

        let entry = self
            .repository
            .create_inventory_log(
                &mut tx,
                InventoryChange {
                    product,
                    action: InventoryAction::for_change(previous, stock),
                    previous_stock: previous,
                    new_stock: stock,
                    reason: reason.as_deref(),
                },
            )
            .await?;

        tx.commit().await?;

        Ok(entry)
    }

    async fn inventory_log(
        &self,
        product: ProductId,
        limit: u32,
    ) -> Result<Vec<InventoryLogRecord>, ProductsServiceError> {
        Db::with_retry("inventory_log", || async move {
            let mut tx = self.db.begin().await?;

            let entries = self
                .repository
                .list_inventory_logs(&mut tx, product, i64::from(limit))
                .await?;

            tx.commit().await?;

            Ok(entries)
        })
        .await
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Distinct categories that have at least one product in stock.
    async fn list_categories(&self) -> Result<Vec<String>, ProductsServiceError>;

    /// In-stock products of one category, by name.
    async fn list_products_in_category(
        &self,
        category: String,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductId) -> Result<ProductRecord, ProductsServiceError>;

    /// In-stock products whose name or description contains `term`, ignoring case.
    async fn search_products(&self, term: String)
    -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Products ranked by order count then units sold, cancelled orders excluded.
    async fn popular_products(
        &self,
        limit: u32,
    ) -> Result<Vec<PopularProductRecord>, ProductsServiceError>;

    /// Products with stock at or below `threshold`, lowest first.
    async fn low_stock_products(
        &self,
        threshold: u32,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Creates a new product.
    async fn create_product(&self, product: NewProduct)
    -> Result<ProductRecord, ProductsServiceError>;

    /// Updates the descriptive fields and price of a product.
    async fn update_product(
        &self,
        product: ProductId,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Deletes a product. Past order items keep their snapshot.
    async fn delete_product(&self, product: ProductId) -> Result<(), ProductsServiceError>;

    /// Set the stock level and record the change in the inventory log.
    async fn set_stock(
        &self,
        product: ProductId,
        stock: u32,
        reason: Option<String>,
    ) -> Result<InventoryLogRecord, ProductsServiceError>;

    /// Most recent inventory log entries for a product.
    async fn inventory_log(
        &self,
        product: ProductId,
        limit: u32,
    ) -> Result<Vec<InventoryLogRecord>, ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use grocer::orders::{Fulfillment, OrderStatus};
    use testresult::TestResult;

    use crate::{
        domain::orders::OrdersService,
        test::{
            TestContext,
            helpers::{create_customer, create_product, draft},
        },
    };

    use super::*;

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("milk"), "%milk%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn create_product_returns_stored_fields() -> TestResult {
        let ctx = TestContext::new().await;

        let product = create_product(&ctx, "Whole Milk", "Dairy", 249, 12).await?;

        assert_eq!(product.name, "Whole Milk");
        assert_eq!(product.category, "Dairy");
        assert_eq!(product.price, 249);
        assert_eq!(product.stock, 12);

        let log = ctx.products.inventory_log(product.id, 10).await?;

        assert_eq!(log.len(), 1);
        assert_eq!(log.first().map(|e| e.action), Some(InventoryAction::Restock));

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_id_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.get_product(ProductId::new(999_999)).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn categories_only_include_in_stock_products() -> TestResult {
        let ctx = TestContext::new().await;

        create_product(&ctx, "Apples", "Produce", 300, 5).await?;
        create_product(&ctx, "Bread", "Bakery", 550, 0).await?;
        create_product(&ctx, "Cheddar", "Dairy", 700, 2).await?;

        let categories = ctx.products.list_categories().await?;

        assert_eq!(categories, vec!["Dairy".to_string(), "Produce".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn category_listing_is_sorted_and_in_stock() -> TestResult {
        let ctx = TestContext::new().await;

        create_product(&ctx, "Pears", "Produce", 300, 5).await?;
        create_product(&ctx, "Apples", "Produce", 300, 5).await?;
        create_product(&ctx, "Kiwis", "Produce", 300, 0).await?;

        let products = ctx
            .products
            .list_products_in_category("Produce".to_string())
            .await?;

        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["Apples", "Pears"]);

        Ok(())
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_matches_description() -> TestResult {
        let ctx = TestContext::new().await;

        create_product(&ctx, "Oat Drink", "Dairy", 199, 5).await?;

        ctx.products
            .create_product(NewProduct {
                name: "Greek Yogurt".to_string(),
                category: "Dairy".to_string(),
                price: 350,
                stock: 3,
                description: Some("Thick and creamy, made with whole MILK".to_string()),
                image_url: None,
            })
            .await?;

        let by_name = ctx.products.search_products("oat".to_string()).await?;
        let by_description = ctx.products.search_products("milk".to_string()).await?;
        let wildcard = ctx.products.search_products("%".to_string()).await?;

        assert_eq!(by_name.len(), 1);
        assert_eq!(by_description.first().map(|p| p.name.as_str()), Some("Greek Yogurt"));
        assert!(wildcard.is_empty(), "a bare % must not match everything");

        Ok(())
    }

    #[tokio::test]
    async fn low_stock_includes_threshold() -> TestResult {
        let ctx = TestContext::new().await;

        create_product(&ctx, "Eggs", "Dairy", 300, 10).await?;
        create_product(&ctx, "Butter", "Dairy", 300, 2).await?;
        create_product(&ctx, "Flour", "Pantry", 300, 11).await?;

        let products = ctx.products.low_stock_products(10).await?;
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["Butter", "Eggs"]);

        Ok(())
    }

    #[tokio::test]
    async fn set_stock_logs_restock_and_adjustment() -> TestResult {
        let ctx = TestContext::new().await;

        let product = create_product(&ctx, "Rice", "Pantry", 400, 0).await?;

        let restock = ctx
            .products
            .set_stock(product.id, 25, Some("Admin update".to_string()))
            .await?;

        assert_eq!(restock.action, InventoryAction::Restock);
        assert_eq!(restock.quantity_change, 25);

        let adjustment = ctx.products.set_stock(product.id, 20, None).await?;

        assert_eq!(adjustment.action, InventoryAction::Adjustment);
        assert_eq!(adjustment.previous_stock, 25);
        assert_eq!(adjustment.new_stock, 20);
        assert_eq!(adjustment.quantity_change, -5);

        assert_eq!(ctx.products.get_product(product.id).await?.stock, 20);

        Ok(())
    }

    #[tokio::test]
    async fn set_stock_unknown_product_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.set_stock(ProductId::new(424_242), 5, None).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_product_changes_price() -> TestResult {
        let ctx = TestContext::new().await;

        let product = create_product(&ctx, "Tea", "Pantry", 500, 4).await?;

        let updated = ctx
            .products
            .update_product(
                product.id,
                ProductUpdate {
                    name: "Green Tea".to_string(),
                    category: "Pantry".to_string(),
                    price: 650,
                    description: None,
                    image_url: None,
                },
            )
            .await?;

        assert_eq!(updated.name, "Green Tea");
        assert_eq!(updated.price, 650);
        assert_eq!(updated.stock, 4);

        Ok(())
    }

    #[tokio::test]
    async fn delete_product_makes_it_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let product = create_product(&ctx, "Salt", "Pantry", 100, 1).await?;

        ctx.products.delete_product(product.id).await?;

        let again = ctx.products.delete_product(product.id).await;

        assert!(
            matches!(again, Err(ProductsServiceError::NotFound)),
            "expected NotFound after deletion, got {again:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn popular_products_rank_by_orders_then_units() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = create_customer(&ctx, 7101).await?.id;

        let milk = create_product(&ctx, "Whole Milk", "Dairy", 250, 50).await?;
        let apples = create_product(&ctx, "Apples", "Produce", 300, 50).await?;
        let bread = create_product(&ctx, "Bread", "Bakery", 550, 50).await?;
        let cheese = create_product(&ctx, "Cheddar", "Dairy", 700, 50).await?;

        for lines in [
            vec![(&milk, 1), (&bread, 3)],
            vec![(&milk, 1), (&bread, 1), (&apples, 1)],
            vec![(&milk, 1), (&apples, 5)],
        ] {
            ctx.orders
                .place_order(draft(customer, &lines, Fulfillment::Pickup)?)
                .await?;
        }

        let cancelled = ctx
            .orders
            .place_order(draft(customer, &[(&cheese, 9)], Fulfillment::Pickup)?)
            .await?;

        ctx.orders
            .update_status(cancelled.id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await?;

        let popular = ctx.products.popular_products(10).await?;

        let ranking: Vec<_> = popular
            .iter()
            .map(|p| (p.product.name.as_str(), p.order_count, p.units_sold))
            .collect();

        assert_eq!(
            ranking,
            vec![("Whole Milk", 3, 3), ("Apples", 2, 6), ("Bread", 2, 4)]
        );

        let top = ctx.products.popular_products(1).await?;

        assert_eq!(top.len(), 1);
        assert_eq!(top.first().map(|p| p.product.id), Some(milk.id));

        Ok(())
    }

    #[tokio::test]
    async fn negative_price_cannot_be_created_through_check_constraint() -> TestResult {
        let ctx = TestContext::new().await;

        let result = sqlx::query("INSERT INTO products (name, category, price, stock) VALUES ('x', 'y', -1, 0)")
            .execute(ctx.db.pool())
            .await
            .map_err(ProductsServiceError::from);

        assert!(
            matches!(result, Err(ProductsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }
}
