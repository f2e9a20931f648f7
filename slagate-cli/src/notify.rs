use slagate_common::Result;
use slagate_slack::{SlackClient, SlackConfig};
use tracing::info;

/// Where the rendered report goes.
pub enum Notifier {
    Slack { client: SlackClient, channel: String },
    /// No Slack credentials: print the report instead.
    Stdout,
    /// Report suppressed (stdout is reserved for JSON output).
    Silent,
}

impl Notifier {
    /// Slack when both token and channel are present, otherwise `fallback`.
    pub fn from_credentials(
        token: Option<String>,
        channel: Option<String>,
        api_base: &str,
        fallback: Notifier,
    ) -> Self {
        match (token, channel) {
            (Some(token), Some(channel)) => {
                let config = SlackConfig { token, api_base: api_base.to_string() };
                Notifier::Slack { client: SlackClient::new(config), channel }
            }
            _ => fallback,
        }
    }

    pub async fn send(&self, text: &str) -> Result<()> {
        match self {
            Notifier::Slack { client, channel } => {
                client.post_message(channel, text, None).await?;
                info!(%channel, "SLA summary posted to Slack");
            }
            Notifier::Stdout => println!("{text}"),
            Notifier::Silent => {}
        }
        Ok(())
    }
}
