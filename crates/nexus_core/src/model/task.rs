//! Task record.
//!
//! `status` holds a task column id; columns are user-configurable, so the
//! value is a plain string checked by the store.

use super::{EntityId, EntityKind, Record};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Task column identifier (see [`super::board::TaskColumn`]).
pub type ColumnId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Kind of record a task points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedKind {
    Client,
    Deal,
    Conversation,
}

/// Polymorphic link from a task to a client, deal or conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTo {
    #[serde(rename = "type")]
    pub kind: RelatedKind,
    pub id: EntityId,
    /// Display name captured when the link was made.
    pub name: String,
}

impl RelatedTo {
    pub fn new(kind: RelatedKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn points_at(&self, kind: RelatedKind, id: &str) -> bool {
        self.kind == kind && self.id == id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    pub tenant_id: String,
    pub title: String,
    pub description: String,
    pub status: ColumnId,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    pub assigned_to: String,
    pub related_to: Option<RelatedTo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn is_related_to(&self, kind: RelatedKind, id: &str) -> bool {
        self.related_to
            .as_ref()
            .is_some_and(|related| related.points_at(kind, id))
    }
}

impl Record for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// Column id; `None` places the task in the first column.
    pub status: Option<ColumnId>,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    pub assigned_to: String,
    pub related_to: Option<RelatedTo>,
}

impl NewTask {
    pub(crate) fn into_task(
        self,
        id: EntityId,
        tenant_id: String,
        status: ColumnId,
        now: DateTime<Utc>,
    ) -> Task {
        Task {
            id,
            tenant_id,
            title: self.title,
            description: self.description,
            status,
            priority: self.priority,
            due_date: self.due_date,
            assigned_to: self.assigned_to,
            related_to: self.related_to,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ColumnId>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub related_to: Option<Option<RelatedTo>>,
}

impl TaskPatch {
    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(value) = self.title {
            task.title = value;
        }
        if let Some(value) = self.description {
            task.description = value;
        }
        if let Some(value) = self.status {
            task.status = value;
        }
        if let Some(value) = self.priority {
            task.priority = value;
        }
        if let Some(value) = self.due_date {
            task.due_date = value;
        }
        if let Some(value) = self.assigned_to {
            task.assigned_to = value;
        }
        if let Some(value) = self.related_to {
            task.related_to = value;
        }
    }
}
