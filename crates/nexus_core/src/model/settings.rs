//! Settings-tab records: webhooks, API keys and third-party integrations.
//!
//! These are local state only. Nothing here performs network I/O; toggling a
//! connection or generating a key just mutates the store.

use super::{EntityId, EntityKind, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix of generated API key strings.
pub const API_KEY_PREFIX: &str = "nx_live_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: EntityId,
    pub name: String,
    pub url: String,
    /// Event names, e.g. `client.created`, `deal.closed`.
    pub events: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Webhook {
    const KIND: EntityKind = EntityKind::Webhook;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhook {
    pub name: String,
    pub url: String,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub events: Option<Vec<String>>,
    pub active: Option<bool>,
}

impl WebhookPatch {
    pub(crate) fn apply(self, webhook: &mut Webhook) {
        if let Some(value) = self.name {
            webhook.name = value;
        }
        if let Some(value) = self.url {
            webhook.url = value;
        }
        if let Some(value) = self.events {
            webhook.events = value;
        }
        if let Some(value) = self.active {
            webhook.active = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: EntityId,
    pub name: String,
    pub key: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Key with everything but the prefix and last four characters masked.
    pub fn masked(&self) -> String {
        let visible_tail: String = self
            .key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("{API_KEY_PREFIX}••••{visible_tail}")
    }
}

impl Record for ApiKey {
    const KIND: EntityKind = EntityKind::ApiKey;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Generates a fresh key string.
pub fn generate_api_key_value() -> String {
    format!("{API_KEY_PREFIX}{}", uuid::Uuid::new_v4().simple())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationCategory {
    Messaging,
    Email,
    Calendar,
    Marketing,
    Automation,
    Payments,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    pub id: EntityId,
    pub name: String,
    pub category: IntegrationCategory,
    pub connected: bool,
    /// Saved credential form values, keyed by field name.
    pub config: BTreeMap<String, String>,
    pub connected_at: Option<DateTime<Utc>>,
}

impl Record for Integration {
    const KIND: EntityKind = EntityKind::Integration;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_api_key_value, ApiKey, API_KEY_PREFIX};
    use chrono::Utc;

    #[test]
    fn generated_keys_are_prefixed_and_unique() {
        let first = generate_api_key_value();
        let second = generate_api_key_value();
        assert!(first.starts_with(API_KEY_PREFIX));
        assert_eq!(first.len(), API_KEY_PREFIX.len() + 32);
        assert_ne!(first, second);
    }

    #[test]
    fn masked_key_shows_only_tail() {
        let key = ApiKey {
            id: "k1".to_string(),
            name: "ERP".to_string(),
            key: format!("{API_KEY_PREFIX}abcdef1234"),
            active: true,
            created_at: Utc::now(),
            last_used_at: None,
        };
        assert_eq!(key.masked(), format!("{API_KEY_PREFIX}••••1234"));
    }
}
