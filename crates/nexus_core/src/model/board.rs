//! Configurable kanban buckets: pipeline stages and task columns.
//!
//! # Invariants
//! - Within one list, `order` is the dense ranking `1..=N` after every
//!   store mutation.

use super::deal::DealStage;
use super::task::ColumnId;
use super::{EntityKind, Record};
use serde::{Deserialize, Serialize};

/// Shared shape of ordered buckets.
pub trait Ordered {
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStage {
    pub id: DealStage,
    pub name: String,
    pub color: String,
    pub order: u32,
}

impl Record for PipelineStage {
    const KIND: EntityKind = EntityKind::PipelineStage;

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Ordered for PipelineStage {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskColumn {
    pub id: ColumnId,
    pub name: String,
    pub color: String,
    pub order: u32,
}

impl Record for TaskColumn {
    const KIND: EntityKind = EntityKind::TaskColumn;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Ordered for TaskColumn {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

/// Partial update for a stage or column. A new `id` renames the bucket and
/// migrates every card that referenced the old id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Built-in pipeline stages used when no custom board exists.
pub fn default_pipeline_stages() -> Vec<PipelineStage> {
    [
        (DealStage::New, "Novo", "#64748b"),
        (DealStage::Qualified, "Qualificado", "#3b82f6"),
        (DealStage::Proposal, "Proposta", "#8b5cf6"),
        (DealStage::Negotiation, "Negociação", "#f59e0b"),
        (DealStage::Closed, "Fechado", "#10b981"),
        (DealStage::Lost, "Perdido", "#ef4444"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (id, name, color))| PipelineStage {
        id,
        name: name.to_string(),
        color: color.to_string(),
        order: index as u32 + 1,
    })
    .collect()
}

/// Built-in task columns used when no custom board exists.
pub fn default_task_columns() -> Vec<TaskColumn> {
    [
        ("todo", "A Fazer", "#64748b"),
        ("in_progress", "Em Andamento", "#3b82f6"),
        ("review", "Revisão", "#f59e0b"),
        ("done", "Concluído", "#10b981"),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (id, name, color))| TaskColumn {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        order: index as u32 + 1,
    })
    .collect()
}
