//! Board groupings for the pipeline and task kanbans.

use crate::model::board::{PipelineStage, TaskColumn};
use crate::model::deal::Deal;
use crate::model::task::Task;
use crate::store::CrmStore;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLane<'a> {
    pub stage: &'a PipelineStage,
    pub deals: Vec<&'a Deal>,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLane<'a> {
    pub column: &'a TaskColumn,
    pub tasks: Vec<&'a Task>,
}

/// Deals grouped by stage, in board order. Deals whose stage no longer
/// exists are not shown.
pub fn deals_by_stage(store: &CrmStore) -> Vec<StageLane<'_>> {
    store
        .pipeline_stages()
        .iter()
        .map(|stage| {
            let deals: Vec<&Deal> = store
                .deals()
                .iter()
                .filter(|deal| deal.stage == stage.id)
                .collect();
            StageLane {
                stage,
                total_value: deals.iter().map(|deal| deal.value).sum(),
                deals,
            }
        })
        .collect()
}

/// Tasks grouped by column, in board order.
pub fn tasks_by_column(store: &CrmStore) -> Vec<ColumnLane<'_>> {
    store
        .task_columns()
        .iter()
        .map(|column| ColumnLane {
            column,
            tasks: store
                .tasks()
                .iter()
                .filter(|task| task.status == column.id)
                .collect(),
        })
        .collect()
}

/// Task list view: earliest due date first, higher priority first on ties.
pub fn tasks_by_due_date(store: &CrmStore) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = store.tasks().iter().collect();
    tasks.sort_by(|left, right| {
        left.due_date
            .cmp(&right.due_date)
            .then_with(|| right.priority.cmp(&left.priority))
    });
    tasks
}
