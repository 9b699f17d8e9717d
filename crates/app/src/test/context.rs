//! Test context for service-level integration tests.

use crate::{
    database::Db,
    domain::{
        customers::PgCustomersService, orders::PgOrdersService, products::PgProductsService,
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub customers: PgCustomersService,
    pub orders: PgOrdersService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        Self {
            products: PgProductsService::new(db.clone()),
            customers: PgCustomersService::new(db.clone()),
            orders: PgOrdersService::new(db),
            db: test_db,
        }
    }
}
