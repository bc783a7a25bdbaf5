//! Notification fan-out configuration.

use serde::{Deserialize, Serialize};

/// Notification fan-out and delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Per-recipient delivery timeout in seconds. A delivery still pending
    /// after this long is recorded as failed and the loop moves on.
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_seconds: u64,
    /// Mail relay settings.
    #[serde(default)]
    pub mail: MailRelayConfig,
    /// In-app notification settings.
    #[serde(default)]
    pub in_app: InAppConfig,
}

/// Mail relay (HTTP API) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailRelayConfig {
    /// Whether email delivery is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of the platform mail relay.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Bearer token for the relay API.
    #[serde(default)]
    pub api_token: String,
    /// Sender address stamped on outgoing mail.
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

/// In-app notification storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InAppConfig {
    /// Whether in-app delivery is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of days after which stored notifications are cleaned up.
    #[serde(default = "default_cleanup_days")]
    pub cleanup_after_days: u32,
    /// Maximum stored notifications per user.
    #[serde(default = "default_max_stored")]
    pub max_stored_per_user: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            delivery_timeout_seconds: default_delivery_timeout(),
            mail: MailRelayConfig::default(),
            in_app: InAppConfig::default(),
        }
    }
}

impl Default for MailRelayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            relay_url: default_relay_url(),
            api_token: String::new(),
            from_address: default_from_address(),
        }
    }
}

impl Default for InAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cleanup_after_days: default_cleanup_days(),
            max_stored_per_user: default_max_stored(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_delivery_timeout() -> u64 {
    5
}

fn default_relay_url() -> String {
    "http://localhost:8025".to_string()
}

fn default_from_address() -> String {
    "noreply@tickethub.local".to_string()
}

fn default_cleanup_days() -> u32 {
    30
}

fn default_max_stored() -> u64 {
    1000
}
