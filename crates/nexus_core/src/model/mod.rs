//! CRM domain records.
//!
//! # Responsibility
//! - Define the plain records held by the store and their partial patches.
//! - Keep wire naming (`camelCase`, original enum strings) in serde attributes.
//!
//! # Invariants
//! - Records carry no behavior beyond patch application and small helpers.
//! - Every stored record is addressable by a string id (see [`Record`]).

pub mod board;
pub mod client;
pub mod conversation;
pub mod deal;
pub mod notification;
pub mod settings;
pub mod task;
pub mod team;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Record identifier. Seed data uses short ids (`c1`), generated ids are UUIDs.
pub type EntityId = String;

/// Record families known to the store.
///
/// Used in errors, cascade relations and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Deal,
    Task,
    TeamMember,
    Goal,
    Webhook,
    ApiKey,
    Integration,
    PipelineStage,
    TaskColumn,
    Conversation,
}

impl EntityKind {
    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Deal => "deal",
            Self::Task => "task",
            Self::TeamMember => "team_member",
            Self::Goal => "goal",
            Self::Webhook => "webhook",
            Self::ApiKey => "api_key",
            Self::Integration => "integration",
            Self::PipelineStage => "pipeline_stage",
            Self::TaskColumn => "task_column",
            Self::Conversation => "conversation",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record stored in a [`crate::store::table::Table`].
pub trait Record: Clone {
    /// Record family.
    const KIND: EntityKind;

    /// Stable id within its table.
    fn id(&self) -> &str;
}

/// Generates a fresh random record id.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}
