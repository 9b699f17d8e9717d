//! Customers Repository

use grocer::customers::{CustomerId, CustomerProfile, display_name};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::get_u64,
    domain::customers::{
        data::NewAddress,
        records::{AddressRecord, CustomerRecord, TopCustomerRecord},
    },
};

const UPSERT_CUSTOMER_SQL: &str = include_str!("sql/upsert_customer.sql");
const CREATE_ADDRESS_SQL: &str = include_str!("sql/create_address.sql");
const CLEAR_DEFAULT_ADDRESS_SQL: &str = include_str!("sql/clear_default_address.sql");
const LIST_ADDRESSES_SQL: &str = include_str!("sql/list_addresses.sql");
const COUNT_CUSTOMERS_SQL: &str = include_str!("sql/count_customers.sql");
const TOP_CUSTOMERS_SQL: &str = include_str!("sql/top_customers.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCustomersRepository;

impl PgCustomersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn upsert_customer(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerId,
        profile: &CustomerProfile,
    ) -> Result<CustomerRecord, sqlx::Error> {
        query_as::<Postgres, CustomerRecord>(UPSERT_CUSTOMER_SQL)
            .bind(customer.get())
            .bind(&profile.first_name)
            .bind(profile.last_name.as_deref())
            .bind(profile.username.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn clear_default_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerId,
    ) -> Result<u64, sqlx::Error> {
        let result = query(CLEAR_DEFAULT_ADDRESS_SQL)
            .bind(customer.get())
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    pub(crate) async fn create_address(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerId,
        address: &NewAddress,
    ) -> Result<AddressRecord, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(CREATE_ADDRESS_SQL)
            .bind(customer.get())
            .bind(&address.label)
            .bind(&address.street_address)
            .bind(address.city.as_deref())
            .bind(address.state.as_deref())
            .bind(address.postal_code.as_deref())
            .bind(address.is_default)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_addresses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerId,
    ) -> Result<Vec<AddressRecord>, sqlx::Error> {
        query_as::<Postgres, AddressRecord>(LIST_ADDRESSES_SQL)
            .bind(customer.get())
            .fetch_all(&mut **tx)
            .await
    }

    /// Total customers and those active since `active_since`.
    pub(crate) async fn count_customers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        active_since: Timestamp,
    ) -> Result<(i64, i64), sqlx::Error> {
        query_as::<Postgres, (i64, i64)>(COUNT_CUSTOMERS_SQL)
            .bind(SqlxTimestamp::from(active_since))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn top_customers(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: i64,
    ) -> Result<Vec<TopCustomerRecord>, sqlx::Error> {
        query_as::<Postgres, TopCustomerRecord>(TOP_CUSTOMERS_SQL)
            .bind(limit)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CustomerRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: CustomerId::new(row.try_get("id")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            username: row.try_get("username")?,
            registered_at: row.try_get::<SqlxTimestamp, _>("registered_at")?.to_jiff(),
            last_active_at: row.try_get::<SqlxTimestamp, _>("last_active_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AddressRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            label: row.try_get("label")?,
            street_address: row.try_get("street_address")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            postal_code: row.try_get("postal_code")?,
            is_default: row.try_get("is_default")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for TopCustomerRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let first_name: String = row.try_get("first_name")?;
        let last_name: Option<String> = row.try_get("last_name")?;

        Ok(Self {
            id: CustomerId::new(row.try_get("id")?),
            name: display_name(&first_name, last_name.as_deref().unwrap_or_default()),
            order_count: get_u64(row, "order_count")?,
            total_spent: get_u64(row, "total_spent")?,
        })
    }
}
