use chrono::{Duration, NaiveDate};
use nexus_core::model::client::{ClientStatus, NewClient};
use nexus_core::model::deal::{DealPatch, DealStage, NewDeal};
use nexus_core::model::notification::NotificationKind;
use nexus_core::model::task::{RelatedKind, TaskPriority};
use nexus_core::view::kanban;
use nexus_core::{CrmStore, ManualClock, StoreConfig, StoreError};
use rust_decimal::Decimal;

fn seeded() -> CrmStore {
    let clock = ManualClock::at_date(2024, 6, 15).unwrap();
    CrmStore::seeded(StoreConfig::default(), Box::new(clock))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn new_deal(client_id: &str, stage: DealStage) -> NewDeal {
    NewDeal {
        title: "Consultoria trimestral".to_string(),
        client_id: client_id.to_string(),
        value: Decimal::from(12_000),
        stage,
        probability: 20,
        expected_close_date: date(2024, 7, 31),
        assigned_to: "Fernanda Lima".to_string(),
        notes: String::new(),
    }
}

#[test]
fn closing_a_deal_activates_client_and_schedules_onboarding() {
    let mut store = seeded();
    let tasks_before = store.tasks().len();

    let moved = store.move_deal_stage("d3", DealStage::Closed).unwrap();

    assert_eq!(store.tasks().len(), tasks_before + 1);

    assert!(moved.changed);
    assert_eq!(moved.deal.probability, 100);
    assert_eq!(moved.client_status, Some(ClientStatus::Active));
    assert_eq!(store.client("c3").unwrap().status, ClientStatus::Active);

    let task = moved.follow_up_task.expect("follow-up task");
    assert_eq!(task.title, "Onboarding: João Pereira");
    assert_eq!(task.priority, TaskPriority::High);
    assert_eq!(task.due_date, date(2024, 6, 22));
    assert_eq!(task.status, "todo");
    assert!(task.is_related_to(RelatedKind::Deal, "d3"));
    assert!(store.task(&task.id).is_some());

    let last = moved.deal.history.last().unwrap();
    assert_eq!(last.from, Some(DealStage::New));
    assert_eq!(last.to, DealStage::Closed);
    assert_eq!(last.changed_by, "Carlos Mendes");

    let toast = store.notifications().last().unwrap();
    assert_eq!(toast.kind, NotificationKind::Success);
    assert_eq!(toast.title, "Negócio fechado!");
}

#[test]
fn undoing_a_close_reverts_deal_client_and_follow_up() {
    let mut store = seeded();
    let tasks_before = store.tasks().len();

    store.move_deal_stage("d3", DealStage::Closed).unwrap();
    assert_eq!(store.tasks().len(), tasks_before + 1);

    let report = store.undo().unwrap();
    assert_eq!(report.tag, "MOVE_DEAL_STAGE");
    assert!(report.applied);

    let deal = store.deal("d3").unwrap();
    assert_eq!(deal.stage, DealStage::New);
    assert_eq!(deal.probability, 10);
    assert_eq!(deal.history.len(), 1);
    assert_eq!(store.client("c3").unwrap().status, ClientStatus::Lead);
    assert_eq!(store.tasks().len(), tasks_before);
}

#[test]
fn undoing_a_close_restores_client_timestamp() {
    let clock = ManualClock::at_date(2024, 6, 15).unwrap();
    let mut store = CrmStore::seeded(StoreConfig::default(), Box::new(clock.clone()));
    let client_before = store.client("c3").unwrap().clone();

    clock.advance(Duration::hours(3));
    store.move_deal_stage("d3", DealStage::Closed).unwrap();
    assert_ne!(store.client("c3").unwrap().updated_at, client_before.updated_at);

    store.undo().unwrap();

    assert_eq!(store.client("c3").unwrap(), &client_before);
}

#[test]
fn undone_stage_move_into_deleted_stage_lands_in_first_stage() {
    let mut store = seeded();
    store.move_deal_stage("d3", DealStage::Proposal).unwrap();
    store.delete_pipeline_stage("new").unwrap();

    store.undo().unwrap();

    let deal = store.deal("d3").unwrap();
    assert_eq!(deal.stage, DealStage::Qualified);
    let lanes = kanban::deals_by_stage(&store);
    assert!(lanes[0].deals.iter().any(|deal| deal.id == "d3"));
}

#[test]
fn undone_deal_delete_and_update_skip_deleted_stages() {
    let mut store = seeded();
    store.delete_deal("d5").unwrap();
    store.delete_pipeline_stage("proposal").unwrap();

    store.undo().unwrap();
    assert_eq!(store.deal("d5").unwrap().stage, DealStage::New);

    store
        .update_deal(
            "d3",
            DealPatch {
                title: Some("Pacote ampliado".to_string()),
                ..DealPatch::default()
            },
        )
        .unwrap();
    store.delete_pipeline_stage("new").unwrap();

    store.undo().unwrap();
    let deal = store.deal("d3").unwrap();
    assert_eq!(deal.title, "Pacote inicial");
    assert_eq!(deal.stage, DealStage::Qualified);
}

#[test]
fn losing_a_negotiation_deal_demotes_client_to_lead() {
    let mut store = seeded();

    let moved = store.move_deal_stage("d2", DealStage::Lost).unwrap();

    assert_eq!(moved.deal.probability, 0);
    assert_eq!(moved.client_status, Some(ClientStatus::Lead));
    assert!(moved.follow_up_task.is_none());
    assert_eq!(store.notifications().last().unwrap().kind, NotificationKind::Warning);
}

#[test]
fn losing_a_deal_leaves_active_client_alone() {
    let mut store = seeded();

    let moved = store.move_deal_stage("d1", DealStage::Lost).unwrap();

    assert_eq!(moved.client_status, None);
    assert_eq!(store.client("c1").unwrap().status, ClientStatus::Active);
}

#[test]
fn moving_to_an_open_stage_keeps_probability() {
    let mut store = seeded();

    let moved = store.move_deal_stage("d5", DealStage::Negotiation).unwrap();

    assert_eq!(moved.deal.probability, 50);
    assert_eq!(moved.client_status, None);
    let toast = store.notifications().last().unwrap();
    assert_eq!(toast.kind, NotificationKind::Info);
    assert!(toast.message.contains("Negociação"));
}

#[test]
fn dropping_on_same_stage_is_a_no_op() {
    let mut store = seeded();
    let undo_depth = store.undo_log().len();
    let toasts = store.notifications().len();

    let moved = store.move_deal_stage("d2", DealStage::Negotiation).unwrap();

    assert!(!moved.changed);
    assert_eq!(moved.deal.history.len(), 3);
    assert_eq!(store.undo_log().len(), undo_depth);
    assert_eq!(store.notifications().len(), toasts);
}

#[test]
fn unknown_stage_and_deal_are_rejected() {
    let mut store = seeded();

    assert_eq!(
        store
            .move_deal_stage("d2", DealStage::parse("archived"))
            .unwrap_err(),
        StoreError::UnknownPipelineStage("archived".to_string())
    );
    assert!(matches!(
        store.move_deal_stage("missing", DealStage::Closed).unwrap_err(),
        StoreError::NotFound { .. }
    ));
}

#[test]
fn new_deal_promotes_lead_client_to_negotiation() {
    let mut store = seeded();
    let client = store.add_client(NewClient::lead("Nova Empresa", "oi@nova.com", "(11) 1111-2222"));

    let deal = store.add_deal(new_deal(&client.id, DealStage::New)).unwrap();

    assert_eq!(store.client(&client.id).unwrap().status, ClientStatus::Negotiation);
    assert_eq!(deal.history.len(), 1);
    assert_eq!(deal.history[0].from, None);
    assert_eq!(deal.tenant_id, "t1");
}

#[test]
fn new_deal_for_active_client_keeps_status() {
    let mut store = seeded();

    store.add_deal(new_deal("c4", DealStage::Proposal)).unwrap();

    assert_eq!(store.client("c4").unwrap().status, ClientStatus::Active);
}

#[test]
fn deal_in_custom_stage_behaves_as_open() {
    let mut store = seeded();
    store
        .add_pipeline_stage("follow_up", "Acompanhamento", "#0ea5e9")
        .unwrap();

    let moved = store
        .move_deal_stage("d5", DealStage::parse("follow_up"))
        .unwrap();

    assert!(moved.deal.stage.is_open());
    assert_eq!(moved.deal.stage, DealStage::Custom("follow_up".to_string()));
    assert!(moved.follow_up_task.is_none());
}

#[test]
fn deleting_a_deal_cascades_to_related_tasks() {
    let mut store = seeded();
    store.select_deal(Some("d2")).unwrap();

    let report = store.delete_deal("d2").unwrap();

    assert_eq!(report.deals_removed, 1);
    assert_eq!(report.tasks_removed, 1);
    assert!(store.task("t1").is_none());
    assert_eq!(store.ui().selected_deal_id, None);

    store.undo().unwrap();
    assert!(store.deal("d2").is_some());
    assert!(store.task("t1").is_some());
}
