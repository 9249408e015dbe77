//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose CRM use cases to Dart via FRB as sync calls.
//! - Own the process-wide CRM session and the preferences database path.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every failure, including a poisoned session lock, becomes an envelope
//!   with `ok = false`.
//! - JSON payloads use the core's camelCase serde shapes.

use nexus_core::db::open_db;
use nexus_core::model::deal::DealStage;
use nexus_core::view::{dashboard, kanban};
use nexus_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ClientForm, CrmStore, FormError, OnboardingService, SqlitePreferenceRepository, StoreConfig,
    SystemClock,
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const PREFS_DB_FILE_NAME: &str = "nexus_prefs.sqlite3";
static PREFS_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: OnceLock<Mutex<CrmStore>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Safe to call repeatedly with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmActionResponse {
    pub ok: bool,
    /// Id of the record the action created or touched.
    pub id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl CrmActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Read response carrying a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmJsonResponse {
    pub ok: bool,
    /// JSON payload; empty when `ok` is false.
    pub json: String,
    pub message: String,
}

impl CrmJsonResponse {
    fn from_result(operation: &str, result: Result<String, String>) -> Self {
        match result {
            Ok(json) => Self {
                ok: true,
                json,
                message: String::new(),
            },
            Err(err) => {
                log::warn!("event=ffi_call module=ffi status=error op={operation}");
                Self {
                    ok: false,
                    json: String::new(),
                    message: format!("{operation} failed: {err}"),
                }
            }
        }
    }
}

/// Onboarding flag response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingStatusResponse {
    pub ok: bool,
    pub done: bool,
    pub message: String,
}

/// Whether the first-run onboarding has been completed.
#[flutter_rust_bridge::frb(sync)]
pub fn onboarding_status() -> OnboardingStatusResponse {
    match with_onboarding(|service| service.is_done().map_err(|err| err.to_string())) {
        Ok(done) => OnboardingStatusResponse {
            ok: true,
            done,
            message: String::new(),
        },
        Err(err) => OnboardingStatusResponse {
            ok: false,
            done: false,
            message: format!("onboarding_status failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn onboarding_complete() -> CrmActionResponse {
    match with_onboarding(|service| service.mark_done().map_err(|err| err.to_string())) {
        Ok(()) => CrmActionResponse::success("Onboarding completed.", None),
        Err(err) => CrmActionResponse::failure(format!("onboarding_complete failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn onboarding_reset() -> CrmActionResponse {
    match with_onboarding(|service| service.reset().map_err(|err| err.to_string())) {
        Ok(()) => CrmActionResponse::success("Onboarding reset.", None),
        Err(err) => CrmActionResponse::failure(format!("onboarding_reset failed: {err}")),
    }
}

/// Delay the UI awaits before a modal submit; 0 if the session is unavailable.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_submit_delay_ms() -> u64 {
    with_session(|store| store.config().submit_delay.as_millis() as u64).unwrap_or(0)
}

/// Full store snapshot for rendering.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_state_json() -> CrmJsonResponse {
    read_json("crm_state_json", state_json)
}

/// Dashboard cards, monthly chart, lead channels and team ranking.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_dashboard() -> CrmJsonResponse {
    read_json("crm_dashboard", dashboard_json)
}

/// Pipeline and task boards grouped by lane.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_boards() -> CrmJsonResponse {
    read_json("crm_boards", boards_json)
}

/// Creates a lead through the client form validator.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_create_client(name: String, email: String, phone: String) -> CrmActionResponse {
    action("crm_create_client", |store| {
        create_client(store, name, email, phone)
    })
}

/// Drops a deal card onto a pipeline stage.
///
/// `id` is the follow-up task id when the move closed the deal.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_move_deal(deal_id: String, stage_id: String) -> CrmActionResponse {
    action("crm_move_deal", |store| move_deal(store, &deal_id, &stage_id))
}

#[flutter_rust_bridge::frb(sync)]
pub fn crm_move_task(task_id: String, column_id: String) -> CrmActionResponse {
    action("crm_move_task", |store| move_task(store, &task_id, &column_id))
}

/// Deletes a client with its deals and related tasks.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_delete_client(client_id: String) -> CrmActionResponse {
    action("crm_delete_client", |store| delete_client(store, &client_id))
}

/// Reverts the newest reversible action.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_undo() -> CrmActionResponse {
    action("crm_undo", undo)
}

#[flutter_rust_bridge::frb(sync)]
pub fn crm_reorder_stage(stage_id: String, target_index: u32) -> CrmActionResponse {
    action("crm_reorder_stage", |store| {
        reorder_stage(store, &stage_id, target_index)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn crm_reorder_column(column_id: String, target_index: u32) -> CrmActionResponse {
    action("crm_reorder_column", |store| {
        reorder_column(store, &column_id, target_index)
    })
}

/// Appends an outbound reply to a conversation.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_send_message(conversation_id: String, body: String) -> CrmActionResponse {
    if body.trim().is_empty() {
        return CrmActionResponse::failure("crm_send_message failed: message body is blank");
    }
    action("crm_send_message", |store| {
        send_message(store, &conversation_id, &body)
    })
}

/// Live toasts after dropping expired ones.
#[flutter_rust_bridge::frb(sync)]
pub fn crm_notifications() -> CrmJsonResponse {
    read_json("crm_notifications", notifications_json)
}

#[flutter_rust_bridge::frb(sync)]
pub fn crm_dismiss_notification(notification_id: String) -> CrmActionResponse {
    action("crm_dismiss_notification", |store| {
        dismiss_notification(store, &notification_id)
    })
}

type ActionResult = Result<CrmActionResponse, String>;

fn state_json(store: &mut CrmStore) -> Result<String, String> {
    store.expire_notifications();
    serde_json::to_string(&store.snapshot()).map_err(|err| err.to_string())
}

fn dashboard_json(store: &mut CrmStore) -> Result<String, String> {
    let goals: Vec<_> = store
        .goals()
        .iter()
        .map(|goal| dashboard::goal_progress(store, goal))
        .collect();
    let payload = json!({
        "stats": dashboard::dashboard_stats(store),
        "monthly": dashboard::monthly_series(store),
        "channels": dashboard::lead_channels(store),
        "ranking": dashboard::team_ranking(store),
        "goals": goals,
    });
    serde_json::to_string(&payload).map_err(|err| err.to_string())
}

fn boards_json(store: &mut CrmStore) -> Result<String, String> {
    let payload = json!({
        "pipeline": kanban::deals_by_stage(store),
        "tasks": kanban::tasks_by_column(store),
    });
    serde_json::to_string(&payload).map_err(|err| err.to_string())
}

fn notifications_json(store: &mut CrmStore) -> Result<String, String> {
    store.expire_notifications();
    serde_json::to_string(store.notifications()).map_err(|err| err.to_string())
}

fn create_client(store: &mut CrmStore, name: String, email: String, phone: String) -> ActionResult {
    let mut form = ClientForm::create();
    form.name = name;
    form.email = email;
    form.phone = phone;
    match form.submit(store) {
        Ok(client) => Ok(CrmActionResponse::success("Client created.", Some(client.id))),
        Err(FormError::Invalid(errors)) => Ok(CrmActionResponse::failure(
            errors.into_values().collect::<Vec<_>>().join("; "),
        )),
        Err(err) => Err(err.to_string()),
    }
}

fn move_deal(store: &mut CrmStore, deal_id: &str, stage_id: &str) -> ActionResult {
    let moved = store
        .move_deal_stage(deal_id.trim(), DealStage::parse(stage_id))
        .map_err(|err| err.to_string())?;
    let message = if moved.changed {
        format!("Deal moved to {}.", moved.deal.stage)
    } else {
        "Deal already in stage.".to_string()
    };
    Ok(CrmActionResponse::success(
        message,
        moved.follow_up_task.map(|task| task.id),
    ))
}

fn move_task(store: &mut CrmStore, task_id: &str, column_id: &str) -> ActionResult {
    let task = store
        .move_task(task_id.trim(), column_id.trim())
        .map_err(|err| err.to_string())?;
    Ok(CrmActionResponse::success("Task moved.", Some(task.id)))
}

fn delete_client(store: &mut CrmStore, client_id: &str) -> ActionResult {
    let client_id = client_id.trim();
    let report = store
        .delete_client(client_id)
        .map_err(|err| err.to_string())?;
    Ok(CrmActionResponse::success(
        format!(
            "Client deleted with {} deal(s) and {} task(s).",
            report.deals_removed, report.tasks_removed
        ),
        Some(client_id.to_string()),
    ))
}

fn undo(store: &mut CrmStore) -> ActionResult {
    Ok(match store.undo() {
        Some(report) if report.applied => {
            CrmActionResponse::success(format!("Undone {}.", report.tag), None)
        }
        Some(report) => CrmActionResponse::failure(format!(
            "Could not undo {}: record changed.",
            report.tag
        )),
        None => CrmActionResponse::success("Nothing to undo.", None),
    })
}

fn reorder_stage(store: &mut CrmStore, stage_id: &str, target_index: u32) -> ActionResult {
    let stage_id = stage_id.trim();
    store
        .reorder_pipeline_stage(stage_id, target_index as usize)
        .map_err(|err| err.to_string())?;
    Ok(CrmActionResponse::success("Stage reordered.", Some(stage_id.to_string())))
}

fn reorder_column(store: &mut CrmStore, column_id: &str, target_index: u32) -> ActionResult {
    let column_id = column_id.trim();
    store
        .reorder_task_column(column_id, target_index as usize)
        .map_err(|err| err.to_string())?;
    Ok(CrmActionResponse::success("Column reordered.", Some(column_id.to_string())))
}

fn send_message(store: &mut CrmStore, conversation_id: &str, body: &str) -> ActionResult {
    let message = store
        .send_message(conversation_id.trim(), body.trim())
        .map_err(|err| err.to_string())?;
    Ok(CrmActionResponse::success("Message sent.", Some(message.id)))
}

fn dismiss_notification(store: &mut CrmStore, notification_id: &str) -> ActionResult {
    let message = if store.dismiss_notification(notification_id.trim()) {
        "Notification dismissed."
    } else {
        "Notification already gone."
    };
    Ok(CrmActionResponse::success(message, None))
}

fn action(operation: &str, f: impl FnOnce(&mut CrmStore) -> ActionResult) -> CrmActionResponse {
    respond(operation, with_session(f).and_then(|inner| inner))
}

fn respond(operation: &str, result: ActionResult) -> CrmActionResponse {
    match result {
        Ok(response) => {
            log::info!(
                "event=ffi_call module=ffi status={} op={operation}",
                if response.ok { "ok" } else { "skip" }
            );
            response
        }
        Err(err) => {
            log::warn!("event=ffi_call module=ffi status=error op={operation}");
            CrmActionResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn read_json(
    operation: &str,
    f: impl FnOnce(&mut CrmStore) -> Result<String, String>,
) -> CrmJsonResponse {
    CrmJsonResponse::from_result(operation, with_session(f).and_then(|inner| inner))
}

fn with_session<T>(f: impl FnOnce(&mut CrmStore) -> T) -> Result<T, String> {
    let session = SESSION.get_or_init(|| {
        let tenant = std::env::var("NEXUS_TENANT_ID").unwrap_or_default();
        let config = StoreConfig::default().with_tenant(&tenant);
        Mutex::new(CrmStore::seeded(config, Box::new(SystemClock)))
    });
    let mut store = session
        .lock()
        .map_err(|_| "CRM session lock poisoned".to_string())?;
    Ok(f(&mut store))
}

fn resolve_prefs_db_path() -> PathBuf {
    PREFS_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("NEXUS_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(PREFS_DB_FILE_NAME)
        })
        .clone()
}

fn with_onboarding<T>(
    f: impl FnOnce(&OnboardingService<SqlitePreferenceRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_db(resolve_prefs_db_path())
        .map_err(|err| format!("preferences DB open failed: {err}"))?;
    let repo = SqlitePreferenceRepository::try_new(&conn)
        .map_err(|err| format!("preferences repo init failed: {err}"))?;
    f(&OnboardingService::new(repo))
}
