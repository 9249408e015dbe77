//! Client mutators.

use super::undo::UndoCommand;
use super::{CrmStore, StoreResult};
use crate::model::client::{Client, ClientPatch, NewClient};
use crate::model::notification::NotificationKind;
use crate::model::{new_entity_id, EntityKind};
use log::info;

/// What a cascading delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    pub kind: EntityKind,
    pub deals_removed: usize,
    pub tasks_removed: usize,
}

impl CrmStore {
    /// Adds a client stamped with a fresh id, the tenant and `now`.
    pub fn add_client(&mut self, input: NewClient) -> Client {
        let client = input.into_client(new_entity_id(), self.config.tenant_id.clone(), self.now());
        self.clients.push(client.clone());

        info!(
            "event=client_create module=store status=ok client_id={}",
            client.id
        );
        self.notify(
            NotificationKind::Success,
            "Cliente criado",
            format!("{} foi adicionado com sucesso", client.name),
        );
        client
    }

    /// Merges `patch` into a client and records the previous snapshot.
    pub fn update_client(&mut self, id: &str, patch: ClientPatch) -> StoreResult<Client> {
        let now = self.now();
        let client = self.clients.require_mut(id)?;
        let before = client.clone();
        patch.apply(client);
        client.updated_at = now;
        let updated = client.clone();

        self.record_undo(UndoCommand::UpdateClient { before });
        info!("event=client_update module=store status=ok client_id={id}");
        self.notify(
            NotificationKind::Success,
            "Cliente atualizado",
            format!("{} foi atualizado", updated.name),
        );
        Ok(updated)
    }

    /// Deletes a client with its deals and every task related to either.
    pub fn delete_client(&mut self, id: &str) -> StoreResult<DeleteReport> {
        let client = self.clients.remove(id)?;
        let removal = self.cascade_delete(EntityKind::Client, id);
        let report = DeleteReport {
            kind: EntityKind::Client,
            deals_removed: removal.deals.len(),
            tasks_removed: removal.tasks.len(),
        };

        if self.ui.selected_client_id.as_deref() == Some(id) {
            self.ui.selected_client_id = None;
        }
        let selected_deal_removed = self
            .ui
            .selected_deal_id
            .as_deref()
            .is_some_and(|selected| removal.deals.iter().any(|item| item.record.id == selected));
        if selected_deal_removed {
            self.ui.selected_deal_id = None;
        }

        let name = client.record.name.clone();
        self.record_undo(UndoCommand::DeleteClient {
            client,
            deals: removal.deals,
            tasks: removal.tasks,
        });
        info!(
            "event=client_delete module=store status=ok client_id={id} deals_removed={} tasks_removed={}",
            report.deals_removed, report.tasks_removed
        );
        self.notify(
            NotificationKind::Success,
            "Cliente excluído",
            format!("{name} foi removido"),
        );
        Ok(report)
    }
}
