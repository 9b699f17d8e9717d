//! Reply delivery with outcome metrics.

use async_trait::async_trait;
use grocer::{customers::ConversationId, menu::Reply};
use grocer_app::notify::{Notifier, NotifyError};

use crate::observability::{DeliveryOutcome, observe_delivery};

/// Wraps a notifier and counts delivered and failed replies.
#[derive(Debug)]
pub(crate) struct MeteredNotifier<N> {
    inner: N,
}

impl<N> MeteredNotifier<N> {
    pub(crate) fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: Notifier> Notifier for MeteredNotifier<N> {
    async fn deliver(&self, conversation: ConversationId, reply: Reply) -> Result<(), NotifyError> {
        let result = self.inner.deliver(conversation, reply).await;

        observe_delivery(if result.is_ok() {
            DeliveryOutcome::Delivered
        } else {
            DeliveryOutcome::Failed
        });

        result
    }
}
