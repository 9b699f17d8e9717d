//! Outbound Messaging Config

use std::time::Duration;

use clap::Args;
use grocer_app::notify::HttpNotifierConfig;

/// Messaging gateway that receives replies.
#[derive(Debug, Args)]
pub struct OutboundConfig {
    /// Gateway base URL
    #[arg(long, env = "OUTBOUND_URL")]
    pub outbound_url: String,

    /// Bearer token sent with every reply
    #[arg(long, env = "OUTBOUND_TOKEN", hide_env_values = true)]
    pub outbound_token: Option<String>,

    /// Seconds to wait for the gateway before a delivery fails
    #[arg(long, env = "OUTBOUND_TIMEOUT_SECS", default_value_t = 10)]
    pub outbound_timeout_secs: u64,
}

impl From<&OutboundConfig> for HttpNotifierConfig {
    fn from(config: &OutboundConfig) -> Self {
        Self {
            base_url: config.outbound_url.clone(),
            token: config
                .outbound_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            timeout: Duration::from_secs(config.outbound_timeout_secs),
        }
    }
}
