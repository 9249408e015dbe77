//! Omnichannel inbox mutators.
//!
//! # Invariants
//! - Messages are appended in send order and never edited.
//! - `unread_count` only grows on inbound messages and resets on read.

use super::{CrmStore, StoreResult};
use crate::model::conversation::{Conversation, ConversationStatus, Message, MessageDirection};
use crate::model::new_entity_id;
use log::info;

impl CrmStore {
    /// Appends an outbound reply authored by the active user. Replying to a
    /// closed conversation reopens it.
    pub fn send_message(&mut self, conversation_id: &str, body: &str) -> StoreResult<Message> {
        let now = self.now();
        let author = self.actor_name();
        let conversation = self.conversations.require_mut(conversation_id)?;
        let message = Message {
            id: new_entity_id(),
            direction: MessageDirection::Outbound,
            author,
            body: body.to_string(),
            sent_at: now,
        };
        conversation.messages.push(message.clone());
        if conversation.status == ConversationStatus::Closed {
            conversation.status = ConversationStatus::Open;
        }
        conversation.updated_at = now;

        info!(
            "event=message_send module=store status=ok conversation_id={conversation_id} message_id={}",
            message.id
        );
        Ok(message)
    }

    /// Appends an inbound message from the contact.
    pub fn receive_message(&mut self, conversation_id: &str, body: &str) -> StoreResult<Message> {
        let now = self.now();
        let conversation = self.conversations.require_mut(conversation_id)?;
        let message = Message {
            id: new_entity_id(),
            direction: MessageDirection::Inbound,
            author: conversation.contact_name.clone(),
            body: body.to_string(),
            sent_at: now,
        };
        conversation.messages.push(message.clone());
        conversation.unread_count += 1;
        if conversation.status == ConversationStatus::Closed {
            conversation.status = ConversationStatus::Open;
        }
        conversation.updated_at = now;

        info!(
            "event=message_receive module=store status=ok conversation_id={conversation_id} unread={}",
            conversation.unread_count
        );
        Ok(message)
    }

    pub fn mark_conversation_read(&mut self, conversation_id: &str) -> StoreResult<()> {
        let conversation = self.conversations.require_mut(conversation_id)?;
        conversation.unread_count = 0;
        Ok(())
    }

    pub fn set_conversation_status(
        &mut self,
        conversation_id: &str,
        status: ConversationStatus,
    ) -> StoreResult<Conversation> {
        let now = self.now();
        let conversation = self.conversations.require_mut(conversation_id)?;
        conversation.status = status;
        conversation.updated_at = now;
        let updated = conversation.clone();
        info!(
            "event=conversation_status module=store status=ok conversation_id={conversation_id} to={status:?}"
        );
        Ok(updated)
    }

    pub fn assign_conversation(
        &mut self,
        conversation_id: &str,
        assignee: &str,
    ) -> StoreResult<Conversation> {
        let now = self.now();
        let conversation = self.conversations.require_mut(conversation_id)?;
        conversation.assigned_to = assignee.to_string();
        conversation.updated_at = now;
        Ok(conversation.clone())
    }

    /// Conversations with the most recent activity first.
    pub fn inbox(&self) -> Vec<&Conversation> {
        let mut conversations: Vec<&Conversation> = self.conversations.iter().collect();
        conversations.sort_by(|left, right| right.updated_at.cmp(&left.updated_at));
        conversations
    }

    /// Total unread inbound messages across the inbox.
    pub fn unread_total(&self) -> u32 {
        self.conversations
            .iter()
            .map(|conversation| conversation.unread_count)
            .sum()
    }
}
