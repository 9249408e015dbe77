//! Reversible action log.
//!
//! # Responsibility
//! - Keep the last N reversible actions as typed commands with snapshots.
//! - Apply the inverse of the newest command on `undo()`.
//!
//! # Invariants
//! - The log never exceeds its capacity; the oldest entry is dropped first.
//! - Undoing an update never resurrects a record deleted after the update;
//!   such entries are consumed and reported as not applied.
//! - Undoing a delete re-inserts rows at their original positions and skips
//!   rows whose id is taken again.

use super::table::Removed;
use super::CrmStore;
use crate::model::client::Client;
use crate::model::deal::Deal;
use crate::model::notification::NotificationKind;
use crate::model::task::Task;
use crate::model::team::{Goal, TeamMember};
use crate::model::EntityId;
use log::info;
use std::collections::VecDeque;

/// One reversible action with everything needed to invert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoCommand {
    DeleteClient {
        client: Removed<Client>,
        deals: Vec<Removed<Deal>>,
        tasks: Vec<Removed<Task>>,
    },
    DeleteDeal {
        deal: Removed<Deal>,
        tasks: Vec<Removed<Task>>,
    },
    DeleteTask {
        task: Removed<Task>,
    },
    DeleteTeamMember {
        member: Removed<TeamMember>,
        goals: Vec<Removed<Goal>>,
    },
    UpdateClient {
        before: Client,
    },
    UpdateDeal {
        before: Deal,
    },
    UpdateTask {
        before: Task,
    },
    MoveDealStage {
        before: Deal,
        /// Client prior to the lifecycle rule, when it fired.
        client_before: Option<Client>,
        /// Follow-up task created by a move to `closed`.
        follow_up_task_id: Option<EntityId>,
    },
}

impl UndoCommand {
    /// Stable tag used in logs and UI labels.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::DeleteClient { .. } => "DELETE_CLIENT",
            Self::DeleteDeal { .. } => "DELETE_DEAL",
            Self::DeleteTask { .. } => "DELETE_TASK",
            Self::DeleteTeamMember { .. } => "DELETE_TEAM_MEMBER",
            Self::UpdateClient { .. } => "UPDATE_CLIENT",
            Self::UpdateDeal { .. } => "UPDATE_DEAL",
            Self::UpdateTask { .. } => "UPDATE_TASK",
            Self::MoveDealStage { .. } => "MOVE_DEAL_STAGE",
        }
    }

    /// Short pt-BR label for the undo button tooltip.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DeleteClient { .. } => "Exclusão de cliente",
            Self::DeleteDeal { .. } => "Exclusão de negócio",
            Self::DeleteTask { .. } => "Exclusão de tarefa",
            Self::DeleteTeamMember { .. } => "Remoção de membro",
            Self::UpdateClient { .. } => "Edição de cliente",
            Self::UpdateDeal { .. } => "Edição de negócio",
            Self::UpdateTask { .. } => "Edição de tarefa",
            Self::MoveDealStage { .. } => "Mudança de etapa",
        }
    }
}

/// Capped LIFO of [`UndoCommand`]s.
#[derive(Debug, Clone)]
pub struct UndoLog {
    entries: VecDeque<UndoCommand>,
    capacity: usize,
}

impl UndoLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Newest entry, if any.
    pub fn peek(&self) -> Option<&UndoCommand> {
        self.entries.back()
    }

    /// Tags from newest to oldest.
    pub fn tags(&self) -> Vec<&'static str> {
        self.entries.iter().rev().map(UndoCommand::tag).collect()
    }

    pub(crate) fn push(&mut self, command: UndoCommand) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(command);
    }

    pub(crate) fn pop(&mut self) -> Option<UndoCommand> {
        self.entries.pop_back()
    }
}

/// Result of one `undo()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoReport {
    pub tag: &'static str,
    /// `false` when the target record no longer exists and nothing changed.
    pub applied: bool,
}

impl CrmStore {
    /// Reverts the newest reversible action.
    ///
    /// Returns `None` when the log is empty.
    pub fn undo(&mut self) -> Option<UndoReport> {
        let command = self.undo_log.pop()?;
        let tag = command.tag();
        let applied = self.apply_inverse(command);

        if applied {
            info!("event=undo_apply module=store status=ok tag={tag}");
            self.notify(NotificationKind::Info, "Ação desfeita", "A última ação foi revertida");
        } else {
            info!("event=undo_apply module=store status=skip tag={tag} reason=target_missing");
            self.notify(
                NotificationKind::Warning,
                "Não foi possível desfazer",
                "O registro foi alterado ou removido depois desta ação",
            );
        }

        Some(UndoReport { tag, applied })
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_log.is_empty()
    }

    fn apply_inverse(&mut self, command: UndoCommand) -> bool {
        match command {
            UndoCommand::DeleteClient {
                client,
                deals,
                tasks,
            } => {
                let restored = self.clients.restore(vec![client]) == 1;
                self.restore_deals(deals);
                self.restore_tasks(tasks);
                restored
            }
            UndoCommand::DeleteDeal { deal, tasks } => {
                let restored = self.restore_deals(vec![deal]) == 1;
                self.restore_tasks(tasks);
                restored
            }
            UndoCommand::DeleteTask { task } => self.restore_tasks(vec![task]) == 1,
            UndoCommand::DeleteTeamMember { member, goals } => {
                let restored = self.team_members.restore(vec![member]) == 1;
                self.goals.restore(goals);
                restored
            }
            UndoCommand::UpdateClient { before } => self.clients.replace(before).is_some(),
            UndoCommand::UpdateDeal { mut before } => {
                self.rehome_deal(&mut before);
                self.deals.replace(before).is_some()
            }
            UndoCommand::UpdateTask { mut before } => {
                self.rehome_task(&mut before);
                self.tasks.replace(before).is_some()
            }
            UndoCommand::MoveDealStage {
                mut before,
                client_before,
                follow_up_task_id,
            } => {
                self.rehome_deal(&mut before);
                if self.deals.replace(before).is_none() {
                    return false;
                }
                if let Some(snapshot) = client_before {
                    match self.clients.require_mut(&snapshot.id) {
                        Ok(client) => {
                            client.status = snapshot.status;
                            client.updated_at = snapshot.updated_at;
                        }
                        Err(_) => info!(
                            "event=undo_client_status module=store status=skip client_id={} reason=client_missing",
                            snapshot.id
                        ),
                    }
                }
                if let Some(task_id) = follow_up_task_id {
                    if self.tasks.remove(&task_id).is_err() {
                        info!(
                            "event=undo_follow_up module=store status=skip task_id={task_id} reason=task_missing"
                        );
                    }
                }
                true
            }
        }
    }

    /// Restores tasks, moving any whose column was deleted meanwhile into
    /// the first column.
    fn restore_tasks(&mut self, mut tasks: Vec<Removed<Task>>) -> usize {
        for item in &mut tasks {
            self.rehome_task(&mut item.record);
        }
        self.tasks.restore(tasks)
    }

    /// Restores deals, moving any whose stage was deleted meanwhile into the
    /// first stage.
    fn restore_deals(&mut self, mut deals: Vec<Removed<Deal>>) -> usize {
        for item in &mut deals {
            self.rehome_deal(&mut item.record);
        }
        self.deals.restore(deals)
    }

    fn rehome_deal(&self, deal: &mut Deal) {
        if self.pipeline_stages.contains(deal.stage.as_str()) {
            return;
        }
        if let Some(first) = self.first_stage_id() {
            info!(
                "event=undo_rehome module=store status=ok deal_id={} from={} to={first}",
                deal.id, deal.stage
            );
            deal.stage = first;
        }
    }

    fn rehome_task(&self, task: &mut Task) {
        if self.task_columns.contains(&task.status) {
            return;
        }
        if let Some(first) = self.first_column_id() {
            task.status = first;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{UndoCommand, UndoLog};
    use crate::model::deal::DealStage;
    use crate::model::notification::NotificationKind;
    use crate::model::task::{Task, TaskPriority};
    use crate::store::table::Removed;
    use crate::{CrmStore, ManualClock, StoreConfig};
    use chrono::{NaiveDate, Utc};

    fn task_command(id: &str) -> UndoCommand {
        UndoCommand::DeleteTask {
            task: Removed {
                index: 0,
                record: Task {
                    id: id.to_string(),
                    tenant_id: "t1".to_string(),
                    title: id.to_string(),
                    description: String::new(),
                    status: "todo".to_string(),
                    priority: TaskPriority::Low,
                    due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    assigned_to: String::new(),
                    related_to: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                },
            },
        }
    }

    #[test]
    fn log_drops_oldest_entry_past_capacity() {
        let mut log = UndoLog::new(3);
        for id in ["a", "b", "c", "d"] {
            log.push(task_command(id));
        }
        assert_eq!(log.len(), 3);

        let newest = log.pop().expect("entry");
        assert!(matches!(newest, UndoCommand::DeleteTask { ref task } if task.record.id == "d"));
        log.pop();
        let oldest = log.pop().expect("entry");
        assert!(matches!(oldest, UndoCommand::DeleteTask { ref task } if task.record.id == "b"));
        assert!(log.pop().is_none());
    }

    #[test]
    fn zero_capacity_log_records_nothing() {
        let mut log = UndoLog::new(0);
        log.push(task_command("a"));
        assert!(log.is_empty());
    }

    #[test]
    fn update_of_deleted_record_is_consumed_without_resurrecting_it() {
        let mut store = CrmStore::new(StoreConfig::default());
        let UndoCommand::DeleteTask { task } = task_command("ghost") else {
            unreachable!()
        };
        store.record_undo(UndoCommand::UpdateTask {
            before: task.record,
        });

        let report = store.undo().expect("entry");
        assert_eq!(report.tag, "UPDATE_TASK");
        assert!(!report.applied);
        assert!(store.task("ghost").is_none());
        assert!(!store.can_undo());
        assert_eq!(
            store.notifications().last().map(|toast| toast.kind),
            Some(NotificationKind::Warning)
        );
    }

    #[test]
    fn stage_undo_tolerates_missing_follow_up_task() {
        let clock = ManualClock::at_date(2024, 6, 15).expect("date");
        let mut store = CrmStore::seeded(StoreConfig::default(), Box::new(clock));
        let moved = store
            .move_deal_stage("d3", DealStage::Closed)
            .expect("move");
        let follow_up_id = moved.follow_up_task.expect("follow-up").id;
        store.tasks.remove(&follow_up_id).expect("task present");

        let report = store.undo().expect("entry");

        assert!(report.applied);
        assert_eq!(store.deal("d3").map(|deal| deal.stage.clone()), Some(DealStage::New));
        assert!(store.task(&follow_up_id).is_none());
    }
}
