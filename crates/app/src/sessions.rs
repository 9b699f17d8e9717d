//! In-memory session store.

use std::sync::Arc;

use grocer::{customers::CustomerId, session::Session};
use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Sessions keyed by customer, created on first use and kept for the
/// lifetime of the process.
///
/// Holding the guard returned by [`SessionStore::acquire`] serialises all
/// work for that customer; other customers are unaffected.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<FxHashMap<CustomerId, Arc<Mutex<Session>>>>,
    max_cart_items: usize,
}

impl SessionStore {
    #[must_use]
    pub fn new(max_cart_items: usize) -> Self {
        Self {
            sessions: Mutex::new(FxHashMap::default()),
            max_cart_items,
        }
    }

    /// Lock the customer's session, creating it if needed.
    pub async fn acquire(&self, customer: CustomerId) -> OwnedMutexGuard<Session> {
        let session = {
            let mut sessions = self.sessions.lock().await;

            Arc::clone(
                sessions
                    .entry(customer)
                    .or_insert_with(|| Arc::new(Mutex::new(Session::new(customer, self.max_cart_items)))),
            )
        };

        session.lock_owned().await
    }

    /// Number of sessions created so far.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use grocer::session::SessionState;
    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn sessions_are_created_lazily_and_reused() {
        let store = SessionStore::new(50);

        assert!(store.is_empty().await);

        {
            let mut session = store.acquire(CustomerId::new(1)).await;
            session.apply(grocer::session::Event::Browse);
        }

        let session = store.acquire(CustomerId::new(1)).await;

        assert_eq!(session.state(), SessionState::Browsing);
        assert_eq!(session.customer(), CustomerId::new(1));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn same_customer_waits_other_customers_do_not() {
        let store = Arc::new(SessionStore::new(50));

        let held = store.acquire(CustomerId::new(1)).await;

        let other = timeout(Duration::from_millis(100), store.acquire(CustomerId::new(2))).await;

        assert!(other.is_ok(), "a different customer must not be blocked");

        let same = timeout(Duration::from_millis(50), store.acquire(CustomerId::new(1))).await;

        assert!(same.is_err(), "the same customer must wait for the guard");

        drop(held);

        let again = timeout(Duration::from_millis(100), store.acquire(CustomerId::new(1))).await;

        assert!(again.is_ok(), "released session should be available");
    }
}
