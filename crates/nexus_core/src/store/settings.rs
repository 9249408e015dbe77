//! Webhook, API key and integration mutators.
//!
//! All state is local; no request is ever sent to a webhook URL or
//! integration provider.

use super::{CrmStore, StoreResult};
use crate::model::new_entity_id;
use crate::model::notification::NotificationKind;
use crate::model::settings::{
    generate_api_key_value, ApiKey, Integration, NewWebhook, Webhook, WebhookPatch,
};
use log::info;
use std::collections::BTreeMap;

impl CrmStore {
    pub fn add_webhook(&mut self, input: NewWebhook) -> Webhook {
        let webhook = Webhook {
            id: new_entity_id(),
            name: input.name,
            url: input.url,
            events: input.events,
            active: true,
            created_at: self.now(),
        };
        self.webhooks.push(webhook.clone());

        info!(
            "event=webhook_create module=store status=ok webhook_id={} events={}",
            webhook.id,
            webhook.events.len()
        );
        self.notify(
            NotificationKind::Success,
            "Webhook criado",
            format!("{} foi configurado", webhook.name),
        );
        webhook
    }

    pub fn update_webhook(&mut self, id: &str, patch: WebhookPatch) -> StoreResult<Webhook> {
        let webhook = self.webhooks.require_mut(id)?;
        patch.apply(webhook);
        let updated = webhook.clone();
        info!("event=webhook_update module=store status=ok webhook_id={id}");
        Ok(updated)
    }

    /// Flips the active flag and returns the new value.
    pub fn toggle_webhook(&mut self, id: &str) -> StoreResult<bool> {
        let webhook = self.webhooks.require_mut(id)?;
        webhook.active = !webhook.active;
        let active = webhook.active;
        info!("event=webhook_toggle module=store status=ok webhook_id={id} active={active}");
        Ok(active)
    }

    pub fn delete_webhook(&mut self, id: &str) -> StoreResult<Webhook> {
        let webhook = self.webhooks.remove(id)?.record;
        info!("event=webhook_delete module=store status=ok webhook_id={id}");
        self.notify(
            NotificationKind::Success,
            "Webhook removido",
            format!("{} foi removido", webhook.name),
        );
        Ok(webhook)
    }

    /// Generates a new active key. The full key value is only visible in the
    /// returned record and the store; hosts should display [`ApiKey::masked`].
    pub fn generate_api_key(&mut self, name: &str) -> ApiKey {
        let key = ApiKey {
            id: new_entity_id(),
            name: name.trim().to_string(),
            key: generate_api_key_value(),
            active: true,
            created_at: self.now(),
            last_used_at: None,
        };
        self.api_keys.push(key.clone());

        info!("event=api_key_create module=store status=ok key_id={}", key.id);
        self.notify(
            NotificationKind::Success,
            "Chave de API gerada",
            "Copie a chave agora; ela não será exibida novamente",
        );
        key
    }

    /// Deactivates a key without deleting it.
    pub fn revoke_api_key(&mut self, id: &str) -> StoreResult<ApiKey> {
        let key = self.api_keys.require_mut(id)?;
        key.active = false;
        let revoked = key.clone();
        info!("event=api_key_revoke module=store status=ok key_id={id}");
        self.notify(
            NotificationKind::Warning,
            "Chave revogada",
            format!("{} não pode mais ser usada", revoked.name),
        );
        Ok(revoked)
    }

    pub fn delete_api_key(&mut self, id: &str) -> StoreResult<ApiKey> {
        let key = self.api_keys.remove(id)?.record;
        info!("event=api_key_delete module=store status=ok key_id={id}");
        Ok(key)
    }

    /// Marks an integration connected and stores its credential form values.
    pub fn connect_integration(
        &mut self,
        id: &str,
        config: BTreeMap<String, String>,
    ) -> StoreResult<Integration> {
        let now = self.now();
        let integration = self.integrations.require_mut(id)?;
        integration.connected = true;
        integration.config = config;
        integration.connected_at = Some(now);
        let connected = integration.clone();

        info!(
            "event=integration_connect module=store status=ok integration_id={id} fields={}",
            connected.config.len()
        );
        self.notify(
            NotificationKind::Success,
            "Integração conectada",
            format!("{} foi conectado", connected.name),
        );
        Ok(connected)
    }

    /// Disconnects an integration and forgets its saved credentials.
    pub fn disconnect_integration(&mut self, id: &str) -> StoreResult<Integration> {
        let integration = self.integrations.require_mut(id)?;
        integration.connected = false;
        integration.config.clear();
        integration.connected_at = None;
        let disconnected = integration.clone();

        info!("event=integration_disconnect module=store status=ok integration_id={id}");
        self.notify(
            NotificationKind::Info,
            "Integração desconectada",
            format!("{} foi desconectado", disconnected.name),
        );
        Ok(disconnected)
    }
}
