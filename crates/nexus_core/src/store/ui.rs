//! UI-transient state: active page, selection, open modal and prefill slot.
//!
//! # Invariants
//! - Closing a modal always clears the prefill slot.
//! - Navigating away never touches entity collections.

use super::{CrmStore, StoreResult};
use crate::model::task::{RelatedKind, RelatedTo};
use crate::model::team::TeamMember;
use crate::model::{EntityId, EntityKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    #[default]
    Dashboard,
    Crm,
    Tasks,
    Omnichannel,
    Settings,
}

/// Modal currently shown. `None` ids open the form in create mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Modal {
    Client { client_id: Option<EntityId> },
    Deal { deal_id: Option<EntityId> },
    Task { task_id: Option<EntityId> },
}

/// Values handed from one page to the form another page opens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Prefill {
    pub client_id: Option<EntityId>,
    pub deal_id: Option<EntityId>,
    pub conversation_id: Option<EntityId>,
    pub title: Option<String>,
    pub related_to: Option<RelatedTo>,
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub page: Page,
    pub selected_client_id: Option<EntityId>,
    pub selected_deal_id: Option<EntityId>,
    pub selected_conversation_id: Option<EntityId>,
    pub modal: Option<Modal>,
    pub prefill: Option<Prefill>,
    pub current_user_id: Option<EntityId>,
}

impl CrmStore {
    pub fn navigate(&mut self, page: Page) {
        self.ui.page = page;
    }

    /// Switches page and leaves values for the form the target page opens.
    pub fn navigate_with_prefill(&mut self, page: Page, prefill: Prefill) {
        self.ui.page = page;
        self.ui.prefill = Some(prefill);
    }

    pub fn open_modal(&mut self, modal: Modal, prefill: Option<Prefill>) {
        self.ui.modal = Some(modal);
        if prefill.is_some() {
            self.ui.prefill = prefill;
        }
    }

    pub fn close_modal(&mut self) {
        self.ui.modal = None;
        self.ui.prefill = None;
    }

    pub fn select_client(&mut self, id: Option<&str>) -> StoreResult<()> {
        if let Some(id) = id {
            self.clients.require(id)?;
        }
        self.ui.selected_client_id = id.map(str::to_string);
        Ok(())
    }

    pub fn select_deal(&mut self, id: Option<&str>) -> StoreResult<()> {
        if let Some(id) = id {
            self.deals.require(id)?;
        }
        self.ui.selected_deal_id = id.map(str::to_string);
        Ok(())
    }

    /// Selects a conversation and marks it read.
    pub fn select_conversation(&mut self, id: Option<&str>) -> StoreResult<()> {
        if let Some(id) = id {
            self.mark_conversation_read(id)?;
        }
        self.ui.selected_conversation_id = id.map(str::to_string);
        Ok(())
    }

    /// Switches the active user recorded as author of history entries.
    pub fn set_current_user(&mut self, member_id: &str) -> StoreResult<()> {
        self.team_members.require(member_id)?;
        self.ui.current_user_id = Some(member_id.to_string());
        log::info!("event=user_switch module=store status=ok member_id={member_id}");
        Ok(())
    }

    pub fn current_user(&self) -> Option<&TeamMember> {
        self.ui
            .current_user_id
            .as_deref()
            .and_then(|id| self.team_members.get(id))
    }

    /// Opens the task modal in create mode, linked to `deal_id`.
    pub fn prefill_task_from_deal(&mut self, deal_id: &str) -> StoreResult<Prefill> {
        let deal = self.deals.require(deal_id)?;
        let prefill = Prefill {
            client_id: Some(deal.client_id.clone()),
            deal_id: Some(deal.id.clone()),
            conversation_id: None,
            title: Some(format!("Follow-up: {}", deal.title)),
            related_to: Some(RelatedTo::new(
                RelatedKind::Deal,
                deal.id.clone(),
                deal.title.clone(),
            )),
            value: None,
        };
        self.open_modal(Modal::Task { task_id: None }, Some(prefill.clone()));
        Ok(prefill)
    }

    /// Opens the deal modal in create mode for a client.
    pub fn prefill_deal_from_client(&mut self, client_id: &str) -> StoreResult<Prefill> {
        let client = self.clients.require(client_id)?;
        let prefill = Prefill {
            client_id: Some(client.id.clone()),
            title: Some(format!("Oportunidade: {}", client.name)),
            value: Some(client.estimated_value),
            ..Prefill::default()
        };
        self.open_modal(Modal::Deal { deal_id: None }, Some(prefill.clone()));
        Ok(prefill)
    }

    /// Opens the task modal in create mode, linked to a conversation.
    pub fn prefill_task_from_conversation(&mut self, conversation_id: &str) -> StoreResult<Prefill> {
        let conversation = self.conversations.require(conversation_id)?;
        let prefill = Prefill {
            client_id: conversation.client_id.clone(),
            conversation_id: Some(conversation.id.clone()),
            title: Some(format!("Responder {}", conversation.contact_name)),
            related_to: Some(RelatedTo::new(
                RelatedKind::Conversation,
                conversation.id.clone(),
                conversation.contact_name.clone(),
            )),
            ..Prefill::default()
        };
        self.open_modal(Modal::Task { task_id: None }, Some(prefill.clone()));
        Ok(prefill)
    }

    /// Kind and id of the record the open modal edits, if any.
    pub fn editing_target(&self) -> Option<(EntityKind, &str)> {
        match self.ui.modal.as_ref()? {
            Modal::Client { client_id } => client_id.as_deref().map(|id| (EntityKind::Client, id)),
            Modal::Deal { deal_id } => deal_id.as_deref().map(|id| (EntityKind::Deal, id)),
            Modal::Task { task_id } => task_id.as_deref().map(|id| (EntityKind::Task, id)),
        }
    }
}
