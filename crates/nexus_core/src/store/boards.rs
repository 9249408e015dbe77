//! Pipeline stage and task column configuration.
//!
//! # Responsibility
//! - Add, rename, recolor, reorder and delete kanban buckets.
//! - Migrate cards (deals or tasks) when their bucket id changes or the
//!   bucket is deleted.
//!
//! # Invariants
//! - Bucket ids are non-blank and unique within their list.
//! - `order` is `1..=N` in list order after every mutation.
//! - The last remaining bucket of a list cannot be deleted.

use super::table::Table;
use super::{CrmStore, StoreError, StoreResult};
use crate::model::board::{BucketPatch, Ordered, PipelineStage, TaskColumn};
use crate::model::deal::DealStage;
use crate::model::notification::NotificationKind;
use crate::model::Record;
use log::info;

impl CrmStore {
    pub fn add_pipeline_stage(
        &mut self,
        id: &str,
        name: &str,
        color: &str,
    ) -> StoreResult<PipelineStage> {
        let id = validate_new_id(&self.pipeline_stages, id)?;
        let stage = PipelineStage {
            id: DealStage::parse(&id),
            name: name.trim().to_string(),
            color: color.to_string(),
            order: self.pipeline_stages.len() as u32 + 1,
        };
        self.pipeline_stages.push(stage.clone());

        info!("event=stage_create module=store status=ok stage_id={id}");
        self.notify(
            NotificationKind::Success,
            "Etapa criada",
            format!("{} foi adicionada ao pipeline", stage.name),
        );
        Ok(stage)
    }

    /// Renames or recolors a stage. A new id moves every deal in the stage.
    pub fn update_pipeline_stage(
        &mut self,
        id: &str,
        patch: BucketPatch,
    ) -> StoreResult<PipelineStage> {
        self.pipeline_stages.require(id)?;
        let new_id = renamed_id(&self.pipeline_stages, id, patch.id.as_deref())?;

        let stage = self.pipeline_stages.require_mut(id)?;
        if let Some(name) = patch.name {
            stage.name = name.trim().to_string();
        }
        if let Some(color) = patch.color {
            stage.color = color;
        }
        if let Some(new_id) = new_id.as_deref() {
            stage.id = DealStage::parse(new_id);
        }
        let updated = stage.clone();

        if let Some(new_id) = new_id {
            let moved = self.migrate_deals(id, &updated.id);
            info!(
                "event=stage_rename module=store status=ok from={id} to={new_id} deals_moved={moved}"
            );
        } else {
            info!("event=stage_update module=store status=ok stage_id={id}");
        }
        Ok(updated)
    }

    /// Deletes a stage, moving its deals into the first remaining stage.
    pub fn delete_pipeline_stage(&mut self, id: &str) -> StoreResult<PipelineStage> {
        self.pipeline_stages.require(id)?;
        if self.pipeline_stages.len() < 2 {
            info!("event=stage_delete module=store status=skip stage_id={id} reason=last_stage");
            return Err(StoreError::LastPipelineStage);
        }

        let removed = self.pipeline_stages.remove(id)?.record;
        renumber(self.pipeline_stages.rows_mut());
        let fallback = self
            .pipeline_stages
            .first()
            .map(|stage| stage.id.clone())
            .ok_or(StoreError::LastPipelineStage)?;
        let moved = self.migrate_deals(id, &fallback);

        info!(
            "event=stage_delete module=store status=ok stage_id={id} deals_moved={moved} to={fallback}"
        );
        self.notify(
            NotificationKind::Success,
            "Etapa excluída",
            format!("{} foi removida do pipeline", removed.name),
        );
        Ok(removed)
    }

    /// Moves a stage to `target_index` (clamped) and renumbers the board.
    pub fn reorder_pipeline_stage(&mut self, id: &str, target_index: usize) -> StoreResult<()> {
        reorder(&mut self.pipeline_stages, id, target_index)?;
        info!("event=stage_reorder module=store status=ok stage_id={id} target={target_index}");
        Ok(())
    }

    pub fn add_task_column(&mut self, id: &str, name: &str, color: &str) -> StoreResult<TaskColumn> {
        let id = validate_new_id(&self.task_columns, id)?;
        let column = TaskColumn {
            id: id.clone(),
            name: name.trim().to_string(),
            color: color.to_string(),
            order: self.task_columns.len() as u32 + 1,
        };
        self.task_columns.push(column.clone());

        info!("event=column_create module=store status=ok column_id={id}");
        self.notify(
            NotificationKind::Success,
            "Coluna criada",
            format!("{} foi adicionada ao quadro", column.name),
        );
        Ok(column)
    }

    /// Renames or recolors a column. A new id moves every task in the column.
    pub fn update_task_column(&mut self, id: &str, patch: BucketPatch) -> StoreResult<TaskColumn> {
        self.task_columns.require(id)?;
        let new_id = renamed_id(&self.task_columns, id, patch.id.as_deref())?;

        let column = self.task_columns.require_mut(id)?;
        if let Some(name) = patch.name {
            column.name = name.trim().to_string();
        }
        if let Some(color) = patch.color {
            column.color = color;
        }
        if let Some(new_id) = new_id.as_deref() {
            column.id = new_id.to_string();
        }
        let updated = column.clone();

        if let Some(new_id) = new_id {
            let moved = self.migrate_tasks(id, &new_id);
            info!(
                "event=column_rename module=store status=ok from={id} to={new_id} tasks_moved={moved}"
            );
        } else {
            info!("event=column_update module=store status=ok column_id={id}");
        }
        Ok(updated)
    }

    /// Deletes a column, moving its tasks into the first remaining column.
    pub fn delete_task_column(&mut self, id: &str) -> StoreResult<TaskColumn> {
        self.task_columns.require(id)?;
        if self.task_columns.len() < 2 {
            info!("event=column_delete module=store status=skip column_id={id} reason=last_column");
            return Err(StoreError::LastTaskColumn);
        }

        let removed = self.task_columns.remove(id)?.record;
        renumber(self.task_columns.rows_mut());
        let fallback = self.first_column_id().ok_or(StoreError::LastTaskColumn)?;
        let moved = self.migrate_tasks(id, &fallback);

        info!(
            "event=column_delete module=store status=ok column_id={id} tasks_moved={moved} to={fallback}"
        );
        self.notify(
            NotificationKind::Success,
            "Coluna excluída",
            format!("{} foi removida do quadro", removed.name),
        );
        Ok(removed)
    }

    /// Moves a column to `target_index` (clamped) and renumbers the board.
    pub fn reorder_task_column(&mut self, id: &str, target_index: usize) -> StoreResult<()> {
        reorder(&mut self.task_columns, id, target_index)?;
        info!("event=column_reorder module=store status=ok column_id={id} target={target_index}");
        Ok(())
    }

    fn migrate_deals(&mut self, from: &str, to: &DealStage) -> usize {
        let now = self.now();
        let mut moved = 0;
        for deal in self.deals.rows_mut() {
            if deal.stage.as_str() == from {
                deal.stage = to.clone();
                deal.updated_at = now;
                moved += 1;
            }
        }
        moved
    }

    fn migrate_tasks(&mut self, from: &str, to: &str) -> usize {
        let now = self.now();
        let mut moved = 0;
        for task in self.tasks.rows_mut() {
            if task.status == from {
                task.status = to.to_string();
                task.updated_at = now;
                moved += 1;
            }
        }
        moved
    }
}

fn validate_new_id<T: Record>(table: &Table<T>, id: &str) -> StoreResult<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(StoreError::BlankId(T::KIND));
    }
    if table.contains(id) {
        return Err(StoreError::DuplicateId {
            kind: T::KIND,
            id: id.to_string(),
        });
    }
    Ok(id.to_string())
}

/// Validated replacement id, or `None` when the id is unchanged.
fn renamed_id<T: Record>(
    table: &Table<T>,
    current: &str,
    requested: Option<&str>,
) -> StoreResult<Option<String>> {
    match requested.map(str::trim) {
        None => Ok(None),
        Some(requested) if requested == current => Ok(None),
        Some(requested) => validate_new_id(table, requested).map(Some),
    }
}

fn reorder<T: Record + Ordered>(
    table: &mut Table<T>,
    id: &str,
    target_index: usize,
) -> StoreResult<()> {
    let from = table.position(id).ok_or_else(|| StoreError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    })?;
    let rows = table.rows_mut();
    let item = rows.remove(from);
    let target = target_index.min(rows.len());
    rows.insert(target, item);
    renumber(rows);
    Ok(())
}

fn renumber<T: Ordered>(rows: &mut [T]) {
    for (index, row) in rows.iter_mut().enumerate() {
        row.set_order(index as u32 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::renumber;
    use crate::model::board::{default_task_columns, Ordered};

    #[test]
    fn renumber_writes_dense_one_based_orders() {
        let mut columns = default_task_columns();
        columns.swap(0, 3);
        columns[1].set_order(42);
        renumber(&mut columns);
        let orders: Vec<u32> = columns.iter().map(Ordered::order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert_eq!(columns[0].id, "done");
    }
}
