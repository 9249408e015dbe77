//! In-memory CRM state container.
//!
//! # Responsibility
//! - Own every entity collection plus UI-transient state.
//! - Apply cross-entity rules (client promotion, follow-up tasks, cascades)
//!   inside the mutators that trigger them.
//! - Record reversible actions in the undo log and emit toast notifications.
//!
//! # Invariants
//! - A mutator that returns `Err` leaves the store unchanged.
//! - Pipeline stages and task columns are stored in board order with
//!   `order == index + 1`.
//! - At least one pipeline stage and one task column always exist.
//!
//! The store is owned by the caller and passed by reference; there is no
//! process-wide instance in this crate.

mod boards;
mod cascade;
mod clients;
mod conversations;
mod deals;
mod notifications;
pub mod seed;
mod settings;
pub mod table;
mod tasks;
mod team;
mod ui;
mod undo;

pub use clients::DeleteReport;
pub use deals::StageMove;
pub use notifications::NotificationCenter;
pub use table::{Removed, Table};
pub use ui::{Modal, Page, Prefill, UiState};
pub use undo::{UndoCommand, UndoLog, UndoReport};

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::model::board::{default_pipeline_stages, default_task_columns, PipelineStage, TaskColumn};
use crate::model::client::Client;
use crate::model::conversation::Conversation;
use crate::model::deal::{Deal, DealStage};
use crate::model::notification::{Notification, NotificationKind};
use crate::model::settings::{ApiKey, Integration, Webhook};
use crate::model::task::Task;
use crate::model::team::{Goal, TeamMember};
use crate::model::EntityKind;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display name used when a deal points at a client that no longer exists.
pub const MISSING_CLIENT_NAME: &str = "Cliente não encontrado";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store mutation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record of `kind` has this id.
    NotFound { kind: EntityKind, id: String },
    /// A stage/column id is already in use.
    DuplicateId { kind: EntityKind, id: String },
    /// Stage/column ids must not be blank.
    BlankId(EntityKind),
    /// Task status does not name an existing column.
    UnknownTaskColumn(String),
    /// Deal stage does not name an existing pipeline stage.
    UnknownPipelineStage(String),
    /// The only remaining task column cannot be deleted.
    LastTaskColumn,
    /// The only remaining pipeline stage cannot be deleted.
    LastPipelineStage,
    /// Goal month outside `1..=12`.
    InvalidMonth(u32),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::DuplicateId { kind, id } => write!(f, "{kind} id already in use: {id}"),
            Self::BlankId(kind) => write!(f, "{kind} id must not be blank"),
            Self::UnknownTaskColumn(id) => write!(f, "unknown task column: {id}"),
            Self::UnknownPipelineStage(id) => write!(f, "unknown pipeline stage: {id}"),
            Self::LastTaskColumn => write!(f, "at least one task column must remain"),
            Self::LastPipelineStage => write!(f, "at least one pipeline stage must remain"),
            Self::InvalidMonth(month) => write!(f, "goal month must be 1..=12, got {month}"),
        }
    }
}

impl Error for StoreError {}

/// Single source of truth for CRM state.
pub struct CrmStore {
    config: StoreConfig,
    clock: Box<dyn Clock>,
    clients: Table<Client>,
    deals: Table<Deal>,
    tasks: Table<Task>,
    team_members: Table<TeamMember>,
    goals: Table<Goal>,
    webhooks: Table<Webhook>,
    api_keys: Table<ApiKey>,
    integrations: Table<Integration>,
    conversations: Table<Conversation>,
    pipeline_stages: Table<PipelineStage>,
    task_columns: Table<TaskColumn>,
    notifications: NotificationCenter,
    undo_log: UndoLog,
    ui: UiState,
}

/// Serializable read-only view of all collections, for UI hosts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot<'a> {
    pub tenant_id: &'a str,
    pub clients: &'a [Client],
    pub deals: &'a [Deal],
    pub tasks: &'a [Task],
    pub team_members: &'a [TeamMember],
    pub goals: &'a [Goal],
    pub webhooks: &'a [Webhook],
    pub api_keys: &'a [ApiKey],
    pub integrations: &'a [Integration],
    pub conversations: &'a [Conversation],
    pub pipeline_stages: &'a [PipelineStage],
    pub task_columns: &'a [TaskColumn],
    pub notifications: &'a [Notification],
    pub undo_depth: usize,
    pub ui: &'a UiState,
}

impl CrmStore {
    /// Creates an empty store on the system clock with default boards.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Creates an empty store with default boards on the given clock.
    pub fn with_clock(config: StoreConfig, clock: Box<dyn Clock>) -> Self {
        let notifications = NotificationCenter::new(config.notification_ttl);
        let undo_log = UndoLog::new(config.undo_capacity);
        Self {
            config,
            clock,
            clients: Table::default(),
            deals: Table::default(),
            tasks: Table::default(),
            team_members: Table::default(),
            goals: Table::default(),
            webhooks: Table::default(),
            api_keys: Table::default(),
            integrations: Table::default(),
            conversations: Table::default(),
            pipeline_stages: Table::from_rows(default_pipeline_stages()),
            task_columns: Table::from_rows(default_task_columns()),
            notifications,
            undo_log,
            ui: UiState::default(),
        }
    }

    /// Creates a store populated with the demo data set.
    pub fn seeded(config: StoreConfig, clock: Box<dyn Clock>) -> Self {
        let mut store = Self::with_clock(config, clock);
        let data = seed::seed_data(store.today(), store.now(), &store.config.tenant_id);
        store.clients = Table::from_rows(data.clients);
        store.deals = Table::from_rows(data.deals);
        store.tasks = Table::from_rows(data.tasks);
        store.team_members = Table::from_rows(data.team_members);
        store.goals = Table::from_rows(data.goals);
        store.webhooks = Table::from_rows(data.webhooks);
        store.api_keys = Table::from_rows(data.api_keys);
        store.integrations = Table::from_rows(data.integrations);
        store.conversations = Table::from_rows(data.conversations);
        store.pipeline_stages = Table::from_rows(data.pipeline_stages);
        store.task_columns = Table::from_rows(data.task_columns);
        store.ui.current_user_id = store.team_members.first().map(|member| member.id.clone());
        log::info!(
            "event=store_seed module=store status=ok clients={} deals={} tasks={}",
            store.clients.len(),
            store.deals.len(),
            store.tasks.len()
        );
        store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clients(&self) -> &[Client] {
        self.clients.as_slice()
    }

    pub fn client(&self, id: &str) -> Option<&Client> {
        self.clients.get(id)
    }

    /// Client display name, or [`MISSING_CLIENT_NAME`] for dangling ids.
    pub fn client_name(&self, id: &str) -> &str {
        self.clients
            .get(id)
            .map_or(MISSING_CLIENT_NAME, |client| client.name.as_str())
    }

    pub fn deals(&self) -> &[Deal] {
        self.deals.as_slice()
    }

    pub fn deal(&self, id: &str) -> Option<&Deal> {
        self.deals.get(id)
    }

    pub fn deals_for_client<'a>(&'a self, client_id: &'a str) -> impl Iterator<Item = &'a Deal> + 'a {
        self.deals.iter().filter(move |deal| deal.client_id == client_id)
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn team_members(&self) -> &[TeamMember] {
        self.team_members.as_slice()
    }

    pub fn team_member(&self, id: &str) -> Option<&TeamMember> {
        self.team_members.get(id)
    }

    pub fn goals(&self) -> &[Goal] {
        self.goals.as_slice()
    }

    pub fn webhooks(&self) -> &[Webhook] {
        self.webhooks.as_slice()
    }

    pub fn api_keys(&self) -> &[ApiKey] {
        self.api_keys.as_slice()
    }

    pub fn integrations(&self) -> &[Integration] {
        self.integrations.as_slice()
    }

    pub fn conversations(&self) -> &[Conversation] {
        self.conversations.as_slice()
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.get(id)
    }

    /// Pipeline stages in board order.
    pub fn pipeline_stages(&self) -> &[PipelineStage] {
        self.pipeline_stages.as_slice()
    }

    /// Task columns in board order.
    pub fn task_columns(&self) -> &[TaskColumn] {
        self.task_columns.as_slice()
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.as_slice()
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.undo_log
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn snapshot(&self) -> StoreSnapshot<'_> {
        StoreSnapshot {
            tenant_id: &self.config.tenant_id,
            clients: self.clients.as_slice(),
            deals: self.deals.as_slice(),
            tasks: self.tasks.as_slice(),
            team_members: self.team_members.as_slice(),
            goals: self.goals.as_slice(),
            webhooks: self.webhooks.as_slice(),
            api_keys: self.api_keys.as_slice(),
            integrations: self.integrations.as_slice(),
            conversations: self.conversations.as_slice(),
            pipeline_stages: self.pipeline_stages.as_slice(),
            task_columns: self.task_columns.as_slice(),
            notifications: self.notifications.as_slice(),
            undo_depth: self.undo_log.len(),
            ui: &self.ui,
        }
    }

    /// Name recorded as the author of history entries and outbound messages.
    pub(crate) fn actor_name(&self) -> String {
        self.ui
            .current_user_id
            .as_deref()
            .and_then(|id| self.team_members.get(id))
            .map_or_else(|| self.config.actor.clone(), |member| member.name.clone())
    }

    pub(crate) fn notify(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        let now = self.now();
        self.notifications.push(kind, title.into(), message.into(), now);
    }

    pub(crate) fn record_undo(&mut self, command: UndoCommand) {
        log::debug!(
            "event=undo_record module=store status=ok tag={} depth={}",
            command.tag(),
            self.undo_log.len() + 1
        );
        self.undo_log.push(command);
    }

    /// Id of the first task column in board order.
    pub(crate) fn first_column_id(&self) -> Option<String> {
        self.task_columns.first().map(|column| column.id.clone())
    }

    pub(crate) fn first_stage_id(&self) -> Option<DealStage> {
        self.pipeline_stages.first().map(|stage| stage.id.clone())
    }
}
