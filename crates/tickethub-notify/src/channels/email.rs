//! Email delivery through the platform mail relay.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use tickethub_core::config::notifier::MailRelayConfig;
use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_entity::user::User;

use super::NotificationChannel;
use crate::message::NotificationMessage;

/// Request body accepted by the relay's send endpoint.
#[derive(Debug, Serialize)]
struct RelaySendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends one email per recipient through the platform mail relay's HTTP
/// API.
pub struct EmailRelayChannel {
    http: reqwest::Client,
    config: MailRelayConfig,
}

impl EmailRelayChannel {
    /// Create a new relay channel.
    pub fn new(config: MailRelayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn send_url(&self) -> String {
        format!("{}/api/send", self.config.relay_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl NotificationChannel for EmailRelayChannel {
    fn channel_type(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, recipient: &User, message: &NotificationMessage) -> AppResult<()> {
        if !self.config.enabled {
            debug!(email = %recipient.email, "Email channel disabled, skipping");
            return Ok(());
        }

        let request = RelaySendRequest {
            from: &self.config.from_address,
            to: &recipient.email,
            subject: &message.title,
            text: &message.body,
        };

        let response = self
            .http
            .post(self.send_url())
            .bearer_auth(&self.config.api_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Delivery,
                    format!("Mail relay request failed for {}: {e}", recipient.email),
                    e,
                )
            })?;

        if !response.status().is_success() {
            return Err(AppError::new(
                ErrorKind::Delivery,
                format!(
                    "Mail relay rejected message for {}: HTTP {}",
                    recipient.email,
                    response.status()
                ),
            ));
        }

        debug!(email = %recipient.email, kind = %message.kind, "Email accepted by relay");
        Ok(())
    }
}
