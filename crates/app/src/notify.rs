//! Outbound reply delivery.

use std::time::Duration;

use async_trait::async_trait;
use grocer::{customers::ConversationId, menu::Reply};
use mockall::automock;
use reqwest::Client;
use thiserror::Error;

/// Errors that can occur while delivering a reply.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The messaging gateway answered with a non-2xx status.
    #[error("unexpected response from messaging gateway: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
/// Sends replies back into a conversation.
pub trait Notifier: Send + Sync {
    /// Deliver one reply. No read acknowledgement is expected.
    async fn deliver(&self, conversation: ConversationId, reply: Reply) -> Result<(), NotifyError>;
}

/// Connection details for the outbound messaging gateway.
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// Gateway base URL, e.g. `"http://localhost:8081"`.
    pub base_url: String,

    /// Optional bearer token.
    pub token: Option<String>,

    /// Upper bound on a single delivery, connect through response.
    pub timeout: Duration,
}

impl HttpNotifierConfig {
    /// Delivery timeout used when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Posts replies as JSON to `{base_url}/conversations/{id}/messages`.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    config: HttpNotifierConfig,
    http: Client,
}

impl HttpNotifier {
    /// Build the notifier and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new(config: HttpNotifierConfig) -> Result<Self, NotifyError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn url(&self, conversation: ConversationId) -> String {
        format!(
            "{}/conversations/{conversation}/messages",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn deliver(&self, conversation: ConversationId, reply: Reply) -> Result<(), NotifyError> {
        let mut request = self.http.post(self.url(conversation)).json(&reply);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(NotifyError::UnexpectedResponse(format!(
                "delivery to conversation {conversation} failed with status {status}: {text}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn url_joins_base_and_conversation() -> TestResult {
        let notifier = HttpNotifier::new(HttpNotifierConfig {
            base_url: "http://gateway.local/".to_string(),
            token: None,
            timeout: HttpNotifierConfig::DEFAULT_TIMEOUT,
        })?;

        assert_eq!(
            notifier.url(ConversationId::new(-42)),
            "http://gateway.local/conversations/-42/messages"
        );

        Ok(())
    }

    #[tokio::test]
    async fn deliver_gives_up_on_a_silent_gateway() -> TestResult {
        // Connections queue in the backlog but nothing ever answers.
        let listener = TcpListener::bind("127.0.0.1:0")?;

        let notifier = HttpNotifier::new(HttpNotifierConfig {
            base_url: format!("http://{}", listener.local_addr()?),
            token: None,
            timeout: Duration::from_millis(200),
        })?;

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            notifier.deliver(ConversationId::new(1), Reply::text("hello")),
        )
        .await?;

        assert!(
            matches!(&result, Err(NotifyError::Http(error)) if error.is_timeout()),
            "expected a timeout, got {result:?}"
        );

        Ok(())
    }
}
