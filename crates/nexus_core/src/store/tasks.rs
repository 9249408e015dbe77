//! Task mutators.
//!
//! # Invariants
//! - `Task.status` always names an existing task column after a mutator
//!   returns `Ok`.

use super::undo::UndoCommand;
use super::{CrmStore, StoreError, StoreResult};
use crate::model::notification::NotificationKind;
use crate::model::task::{NewTask, Task, TaskPatch};
use crate::model::new_entity_id;
use log::info;

impl CrmStore {
    /// Adds a task. A missing status places it in the first column.
    pub fn add_task(&mut self, input: NewTask) -> StoreResult<Task> {
        let status = match input.status.clone() {
            Some(status) => {
                self.ensure_column_exists(&status)?;
                status
            }
            None => self
                .first_column_id()
                .ok_or(StoreError::LastTaskColumn)?,
        };

        let now = self.now();
        let task = input.into_task(new_entity_id(), self.config.tenant_id.clone(), status, now);
        self.tasks.push(task.clone());

        info!(
            "event=task_create module=store status=ok task_id={} column={}",
            task.id, task.status
        );
        self.notify(
            NotificationKind::Success,
            "Tarefa criada",
            format!("{} foi adicionada", task.title),
        );
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> StoreResult<Task> {
        if let Some(status) = patch.status.as_deref() {
            self.ensure_column_exists(status)?;
        }

        let now = self.now();
        let task = self.tasks.require_mut(id)?;
        let before = task.clone();
        patch.apply(task);
        task.updated_at = now;
        let updated = task.clone();

        self.record_undo(UndoCommand::UpdateTask { before });
        info!("event=task_update module=store status=ok task_id={id}");
        self.notify(
            NotificationKind::Success,
            "Tarefa atualizada",
            format!("{} foi atualizada", updated.title),
        );
        Ok(updated)
    }

    /// Drops a task card onto another column.
    ///
    /// Dropping onto the current column is a no-op and records no undo entry.
    pub fn move_task(&mut self, id: &str, column_id: &str) -> StoreResult<Task> {
        self.ensure_column_exists(column_id)?;
        let now = self.now();
        let task = self.tasks.require_mut(id)?;
        if task.status == column_id {
            return Ok(task.clone());
        }

        let before = task.clone();
        task.status = column_id.to_string();
        task.updated_at = now;
        let moved = task.clone();

        self.record_undo(UndoCommand::UpdateTask { before });
        info!(
            "event=task_move module=store status=ok task_id={id} to={column_id}"
        );
        Ok(moved)
    }

    pub fn delete_task(&mut self, id: &str) -> StoreResult<Task> {
        let removed = self.tasks.remove(id)?;
        let task = removed.record.clone();
        self.record_undo(UndoCommand::DeleteTask { task: removed });

        info!("event=task_delete module=store status=ok task_id={id}");
        self.notify(
            NotificationKind::Success,
            "Tarefa excluída",
            format!("{} foi removida", task.title),
        );
        Ok(task)
    }

    fn ensure_column_exists(&self, column_id: &str) -> StoreResult<()> {
        if self.task_columns.contains(column_id) {
            Ok(())
        } else {
            Err(StoreError::UnknownTaskColumn(column_id.to_string()))
        }
    }
}
