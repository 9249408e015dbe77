//! Task modal.

use super::{into_result, require_some, require_text, FieldErrors, FormError, FormMode, FormResult};
use crate::model::task::{NewTask, RelatedTo, Task, TaskPatch, TaskPriority};
use crate::store::{CrmStore, Prefill};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub mode: FormMode,
    pub title: String,
    pub description: String,
    /// Column id; `None` lets the store pick the first column.
    pub status: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: String,
    pub related_to: Option<RelatedTo>,
}

impl TaskForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            status: None,
            priority: TaskPriority::Medium,
            due_date: None,
            assigned_to: String::new(),
            related_to: None,
        }
    }

    /// Create-mode form seeded from another page (e.g. "task from deal").
    pub fn from_prefill(prefill: &Prefill) -> Self {
        let mut form = Self::create();
        if let Some(title) = prefill.title.as_ref() {
            form.title = title.clone();
        }
        form.related_to = prefill.related_to.clone();
        form
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            status: Some(task.status.clone()),
            priority: task.priority,
            due_date: Some(task.due_date),
            assigned_to: task.assigned_to.clone(),
            related_to: task.related_to.clone(),
        }
    }

    pub fn validate(&self) -> FormResult<()> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title, "Título é obrigatório");
        require_some(
            &mut errors,
            "due_date",
            &self.due_date,
            "Data de vencimento é obrigatória",
        );
        into_result(errors)
    }

    /// Validates, then creates or updates the task and closes the modal.
    pub fn submit(self, store: &mut CrmStore) -> FormResult<Task> {
        self.validate()?;
        let Some(due_date) = self.due_date else {
            return Err(FormError::Invalid(FieldErrors::new()));
        };

        let task = match self.mode {
            FormMode::Create => store.add_task(NewTask {
                title: self.title.trim().to_string(),
                description: self.description,
                status: self.status,
                priority: self.priority,
                due_date,
                assigned_to: self.assigned_to,
                related_to: self.related_to,
            })?,
            FormMode::Edit(id) => store.update_task(
                &id,
                TaskPatch {
                    title: Some(self.title.trim().to_string()),
                    description: Some(self.description),
                    status: self.status,
                    priority: Some(self.priority),
                    due_date: Some(due_date),
                    assigned_to: Some(self.assigned_to),
                    related_to: Some(self.related_to),
                },
            )?,
        };
        store.close_modal();
        Ok(task)
    }
}
