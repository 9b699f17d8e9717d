//! Customers service.

use async_trait::async_trait;
use grocer::customers::{CustomerId, CustomerProfile};
use jiff::Timestamp;
use mockall::automock;

use crate::{
    database::Db,
    domain::customers::{
        data::NewAddress,
        errors::CustomersServiceError,
        records::{AddressRecord, CustomerRecord, CustomerStats},
        repository::PgCustomersRepository,
    },
};

const TOP_CUSTOMERS: i64 = 5;

#[derive(Debug, Clone)]
pub struct PgCustomersService {
    db: Db,
    repository: PgCustomersRepository,
}

impl PgCustomersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCustomersRepository::new(),
        }
    }
}

#[async_trait]
impl CustomersService for PgCustomersService {
    async fn upsert_customer(
        &self,
        customer: CustomerId,
        profile: CustomerProfile,
    ) -> Result<CustomerRecord, CustomersServiceError> {
        let profile = &profile;

        Db::with_retry("upsert_customer", || async move {
            let mut tx = self.db.begin().await?;

            let record = self
                .repository
                .upsert_customer(&mut tx, customer, profile)
                .await?;

            tx.commit().await?;

            Ok(record)
        })
        .await
    }

    async fn add_address(
        &self,
        customer: CustomerId,
        address: NewAddress,
    ) -> Result<AddressRecord, CustomersServiceError> {
        let mut tx = self.db.begin().await?;

        if address.is_default {
            self.repository
                .clear_default_address(&mut tx, customer)
                .await?;
        }

        let created = self
            .repository
            .create_address(&mut tx, customer, &address)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn list_addresses(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<AddressRecord>, CustomersServiceError> {
        Db::with_retry("list_addresses", || async move {
            let mut tx = self.db.begin().await?;

            let addresses = self.repository.list_addresses(&mut tx, customer).await?;

            tx.commit().await?;

            Ok(addresses)
        })
        .await
    }

    async fn customer_stats(
        &self,
        active_since: Timestamp,
    ) -> Result<CustomerStats, CustomersServiceError> {
        Db::with_retry("customer_stats", || async move {
            let mut tx = self.db.begin().await?;

            let (total, active) = self
                .repository
                .count_customers(&mut tx, active_since)
                .await?;

            let top_customers = self.repository.top_customers(&mut tx, TOP_CUSTOMERS).await?;

            tx.commit().await?;

            Ok(CustomerStats {
                total: u64::try_from(total)?,
                active: u64::try_from(active)?,
                top_customers,
            })
        })
        .await
    }
}

#[automock]
#[async_trait]
/// Customer persistence operations.
pub trait CustomersService: Send + Sync {
    /// Insert the customer, or refresh their names and last-active time.
    async fn upsert_customer(
        &self,
        customer: CustomerId,
        profile: CustomerProfile,
    ) -> Result<CustomerRecord, CustomersServiceError>;

    /// Store an address for the customer.
    async fn add_address(
        &self,
        customer: CustomerId,
        address: NewAddress,
    ) -> Result<AddressRecord, CustomersServiceError>;

    /// The customer's addresses, default first.
    async fn list_addresses(
        &self,
        customer: CustomerId,
    ) -> Result<Vec<AddressRecord>, CustomersServiceError>;

    /// Customer counts and the top spenders.
    async fn customer_stats(
        &self,
        active_since: Timestamp,
    ) -> Result<CustomerStats, CustomersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers::profile};

    use super::*;

    #[tokio::test]
    async fn upsert_creates_then_updates_without_duplicating() -> TestResult {
        let ctx = TestContext::new().await;
        let id = CustomerId::new(5001);

        let created = ctx.customers.upsert_customer(id, profile("Ada", None)).await?;

        let updated = ctx
            .customers
            .upsert_customer(id, profile("Ada", Some("Lovelace")))
            .await?;

        assert_eq!(created.id, id);
        assert_eq!(updated.registered_at, created.registered_at);
        assert!(updated.last_active_at >= created.last_active_at);
        assert_eq!(updated.display_name(), "Ada Lovelace");

        let stats = ctx.customers.customer_stats(Timestamp::UNIX_EPOCH).await?;

        assert_eq!(stats.total, 1);

        Ok(())
    }

    #[tokio::test]
    async fn addresses_list_default_first() -> TestResult {
        let ctx = TestContext::new().await;
        let id = CustomerId::new(5002);

        ctx.customers.upsert_customer(id, profile("Grace", None)).await?;

        let address = |street: &str, is_default: bool| NewAddress {
            label: "home".to_string(),
            street_address: street.to_string(),
            city: None,
            state: None,
            postal_code: None,
            is_default,
        };

        ctx.customers.add_address(id, address("1 First St", true)).await?;
        ctx.customers.add_address(id, address("2 Second St", false)).await?;
        ctx.customers.add_address(id, address("3 Third St", true)).await?;

        let addresses = ctx.customers.list_addresses(id).await?;
        let streets: Vec<&str> = addresses.iter().map(|a| a.street_address.as_str()).collect();

        assert_eq!(streets, vec!["3 Third St", "1 First St", "2 Second St"]);
        assert_eq!(addresses.iter().filter(|a| a.is_default).count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn address_for_unknown_customer_is_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .customers
            .add_address(
                CustomerId::new(404),
                NewAddress {
                    label: "home".to_string(),
                    street_address: "Nowhere".to_string(),
                    city: None,
                    state: None,
                    postal_code: None,
                    is_default: false,
                },
            )
            .await;

        assert!(
            matches!(result, Err(CustomersServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn active_customers_respect_cut_off() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.customers
            .upsert_customer(CustomerId::new(1), profile("A", None))
            .await?;

        let cut_off = Timestamp::now();

        let stats = ctx
            .customers
            .customer_stats(cut_off.checked_add(jiff::SignedDuration::from_hours(1))?)
            .await?;

        assert_eq!(stats.total, 1);
        assert_eq!(stats.active, 0);
        assert!(stats.top_customers.is_empty());

        Ok(())
    }
}
