//! Deal mutators and pipeline lifecycle rules.
//!
//! # Invariants
//! - Creating a deal for a `lead` client promotes the client to `negotiation`.
//! - Moving to `closed` sets probability 100, activates the client and adds
//!   one high-priority follow-up task due `follow_up_days` later.
//! - Moving to `lost` sets probability 0 and demotes a `negotiation` client
//!   back to `lead`; any other client status is left alone.
//! - Dropping a deal onto its current stage changes nothing.

use super::clients::DeleteReport;
use super::undo::UndoCommand;
use super::{CrmStore, StoreError, StoreResult};
use crate::model::client::{Client, ClientStatus};
use crate::model::deal::{Deal, DealPatch, DealStage, NewDeal, StageChange, MAX_PROBABILITY};
use crate::model::notification::NotificationKind;
use crate::model::task::{RelatedKind, RelatedTo, Task, TaskPriority};
use crate::model::{new_entity_id, EntityKind};
use chrono::Duration;
use log::info;

/// Outcome of [`CrmStore::move_deal_stage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMove {
    pub deal: Deal,
    /// `false` when the deal was already in the target stage.
    pub changed: bool,
    /// New client status when a lifecycle rule changed it.
    pub client_status: Option<ClientStatus>,
    /// Follow-up task created by a move to `closed`.
    pub follow_up_task: Option<Task>,
}

impl CrmStore {
    pub fn add_deal(&mut self, input: NewDeal) -> StoreResult<Deal> {
        self.ensure_stage_exists(&input.stage)?;

        let now = self.now();
        let actor = self.actor_name();
        let deal = input.into_deal(new_entity_id(), self.config.tenant_id.clone(), now, &actor);

        if let Ok(client) = self.clients.require_mut(&deal.client_id) {
            if client.status == ClientStatus::Lead {
                client.status = ClientStatus::Negotiation;
                client.updated_at = now;
                info!(
                    "event=client_promote module=store status=ok client_id={} to=negotiation",
                    client.id
                );
            }
        }
        self.deals.push(deal.clone());

        info!(
            "event=deal_create module=store status=ok deal_id={} client_id={} stage={}",
            deal.id, deal.client_id, deal.stage
        );
        self.notify(
            NotificationKind::Success,
            "Negócio criado",
            format!("{} foi adicionado ao pipeline", deal.title),
        );
        Ok(deal)
    }

    pub fn update_deal(&mut self, id: &str, patch: DealPatch) -> StoreResult<Deal> {
        let now = self.now();
        let deal = self.deals.require_mut(id)?;
        let before = deal.clone();
        patch.apply(deal);
        deal.updated_at = now;
        let updated = deal.clone();

        self.record_undo(UndoCommand::UpdateDeal { before });
        info!("event=deal_update module=store status=ok deal_id={id}");
        self.notify(
            NotificationKind::Success,
            "Negócio atualizado",
            format!("{} foi atualizado", updated.title),
        );
        Ok(updated)
    }

    /// Moves a deal card to another pipeline stage and applies lifecycle rules.
    pub fn move_deal_stage(&mut self, id: &str, stage: DealStage) -> StoreResult<StageMove> {
        self.ensure_stage_exists(&stage)?;
        let current = self.deals.require(id)?;
        if current.stage == stage {
            return Ok(StageMove {
                deal: current.clone(),
                changed: false,
                client_status: None,
                follow_up_task: None,
            });
        }

        let now = self.now();
        let actor = self.actor_name();
        let deal = self.deals.require_mut(id)?;
        let before = deal.clone();
        deal.history.push(StageChange {
            from: Some(deal.stage.clone()),
            to: stage.clone(),
            changed_at: now,
            changed_by: actor,
        });
        deal.stage = stage.clone();
        deal.updated_at = now;
        match stage {
            DealStage::Closed => deal.probability = MAX_PROBABILITY,
            DealStage::Lost => deal.probability = 0,
            _ => {}
        }
        let deal = deal.clone();

        let client_before = self.apply_client_lifecycle(&deal);
        let client_status = client_before
            .as_ref()
            .and_then(|before| self.clients.get(&before.id))
            .map(|client| client.status);

        let follow_up_task = if deal.stage == DealStage::Closed {
            Some(self.create_follow_up_task(&deal))
        } else {
            None
        };

        self.record_undo(UndoCommand::MoveDealStage {
            before,
            client_before,
            follow_up_task_id: follow_up_task.as_ref().map(|task| task.id.clone()),
        });
        info!(
            "event=deal_move module=store status=ok deal_id={} from={} to={}",
            deal.id,
            deal.history
                .last()
                .and_then(|change| change.from.as_ref())
                .map_or("none", DealStage::as_str),
            deal.stage
        );
        match deal.stage {
            DealStage::Closed => self.notify(
                NotificationKind::Success,
                "Negócio fechado!",
                format!("{} foi ganho", deal.title),
            ),
            DealStage::Lost => self.notify(
                NotificationKind::Warning,
                "Negócio perdido",
                format!("{} foi marcado como perdido", deal.title),
            ),
            _ => {
                let stage_name = self
                    .pipeline_stages
                    .get(deal.stage.as_str())
                    .map_or_else(|| deal.stage.to_string(), |stage| stage.name.clone());
                self.notify(
                    NotificationKind::Info,
                    "Negócio movido",
                    format!("{} agora está em {stage_name}", deal.title),
                );
            }
        }

        Ok(StageMove {
            deal,
            changed: true,
            client_status,
            follow_up_task,
        })
    }

    /// Deletes a deal and every task related to it.
    pub fn delete_deal(&mut self, id: &str) -> StoreResult<DeleteReport> {
        let deal = self.deals.remove(id)?;
        let removal = self.cascade_delete(EntityKind::Deal, id);
        let report = DeleteReport {
            kind: EntityKind::Deal,
            deals_removed: 1,
            tasks_removed: removal.tasks.len(),
        };
        if self.ui.selected_deal_id.as_deref() == Some(id) {
            self.ui.selected_deal_id = None;
        }

        let title = deal.record.title.clone();
        self.record_undo(UndoCommand::DeleteDeal {
            deal,
            tasks: removal.tasks,
        });
        info!(
            "event=deal_delete module=store status=ok deal_id={id} tasks_removed={}",
            report.tasks_removed
        );
        self.notify(
            NotificationKind::Success,
            "Negócio excluído",
            format!("{title} foi removido"),
        );
        Ok(report)
    }

    fn ensure_stage_exists(&self, stage: &DealStage) -> StoreResult<()> {
        if self.pipeline_stages.contains(stage.as_str()) {
            Ok(())
        } else {
            Err(StoreError::UnknownPipelineStage(stage.to_string()))
        }
    }

    /// Returns the client as it was before a rule changed it.
    fn apply_client_lifecycle(&mut self, deal: &Deal) -> Option<Client> {
        let now = self.now();
        let client = self.clients.require_mut(&deal.client_id).ok()?;
        let next = match (&deal.stage, client.status) {
            (DealStage::Closed, current) if current != ClientStatus::Active => ClientStatus::Active,
            (DealStage::Lost, ClientStatus::Negotiation) => ClientStatus::Lead,
            _ => return None,
        };
        let before = client.clone();
        client.status = next;
        client.updated_at = now;
        info!(
            "event=client_lifecycle module=store status=ok client_id={} from={} to={}",
            client.id,
            before.status.as_str(),
            next.as_str()
        );
        Some(before)
    }

    fn create_follow_up_task(&mut self, deal: &Deal) -> Task {
        let now = self.now();
        let status = self
            .first_column_id()
            .unwrap_or_else(|| "todo".to_string());
        let client_name = self.client_name(&deal.client_id).to_string();
        let task = Task {
            id: new_entity_id(),
            tenant_id: self.config.tenant_id.clone(),
            title: format!("Onboarding: {client_name}"),
            description: format!(
                "Iniciar onboarding do cliente após fechamento de \"{}\"",
                deal.title
            ),
            status,
            priority: TaskPriority::High,
            due_date: self.today() + Duration::days(self.config.follow_up_days),
            assigned_to: deal.assigned_to.clone(),
            related_to: Some(RelatedTo::new(
                RelatedKind::Deal,
                deal.id.clone(),
                deal.title.clone(),
            )),
            created_at: now,
            updated_at: now,
        };
        self.tasks.push(task.clone());
        info!(
            "event=task_follow_up module=store status=ok task_id={} deal_id={}",
            task.id, deal.id
        );
        task
    }
}
