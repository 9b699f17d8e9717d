//! State

use std::sync::Arc;

use grocer_app::storefront::Storefront;

pub(crate) struct State {
    pub(crate) storefront: Storefront,
}

impl State {
    #[must_use]
    pub(crate) fn new(storefront: Storefront) -> Self {
        Self { storefront }
    }

    #[must_use]
    pub(crate) fn from_storefront(storefront: Storefront) -> Arc<Self> {
        Arc::new(Self::new(storefront))
    }
}
