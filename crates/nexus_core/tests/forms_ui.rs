use chrono::NaiveDate;
use nexus_core::model::client::ClientStatus;
use nexus_core::model::deal::DealStage;
use nexus_core::model::task::RelatedKind;
use nexus_core::{
    ClientForm, CrmStore, DealForm, EntityKind, FormError, FormMode, ManualClock, Modal, Page,
    Prefill, StoreConfig, StoreError, TaskForm,
};
use rust_decimal::Decimal;

fn seeded() -> CrmStore {
    let clock = ManualClock::at_date(2024, 6, 15).unwrap();
    CrmStore::seeded(StoreConfig::default(), Box::new(clock))
}

#[test]
fn blank_client_form_reports_each_required_field() {
    let mut store = seeded();
    let clients_before = store.clients().len();

    let err = ClientForm::create().submit(&mut store).unwrap_err();

    let FormError::Invalid(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.len(), 3);
    assert_eq!(errors["name"], "Nome é obrigatório");
    assert_eq!(errors["email"], "E-mail é obrigatório");
    assert_eq!(errors["phone"], "Telefone é obrigatório");
    assert_eq!(store.clients().len(), clients_before);
}

#[test]
fn client_form_creates_lead_and_closes_modal() {
    let mut store = seeded();
    store.open_modal(Modal::Client { client_id: None }, None);

    let mut form = ClientForm::create();
    form.name = "  Loja Central ".to_string();
    form.email = "loja@central.com".to_string();
    form.phone = "(11) 4000-1000".to_string();
    form.company = "   ".to_string();
    let client = form.submit(&mut store).unwrap();

    assert_eq!(client.name, "Loja Central");
    assert_eq!(client.status, ClientStatus::Lead);
    assert_eq!(client.company, None);
    assert_eq!(store.ui().modal, None);
}

#[test]
fn client_form_edit_updates_existing_record() {
    let mut store = seeded();
    let mut form = ClientForm::edit(store.client("c5").unwrap());
    assert_eq!(form.mode, FormMode::Edit("c5".to_string()));

    form.status = ClientStatus::Active;
    form.submit(&mut store).unwrap();

    assert_eq!(store.client("c5").unwrap().status, ClientStatus::Active);
    assert_eq!(store.undo_log().tags()[0], "UPDATE_CLIENT");
}

#[test]
fn deal_form_requires_value_and_close_date() {
    let mut form = DealForm::create();
    form.title = "Novo contrato".to_string();
    form.client_id = "c1".to_string();

    let FormError::Invalid(errors) = form.validate().unwrap_err() else {
        panic!("expected validation errors");
    };
    let fields: Vec<&str> = errors.keys().copied().collect();
    assert_eq!(fields, ["expected_close_date", "value"]);
}

#[test]
fn deal_form_from_client_prefill_creates_deal() {
    let mut store = seeded();
    let prefill = store.prefill_deal_from_client("c3").unwrap();
    assert_eq!(store.ui().modal, Some(Modal::Deal { deal_id: None }));

    let mut form = DealForm::from_prefill(&prefill);
    assert_eq!(form.value, Some(Decimal::from(8_000)));
    form.expected_close_date = NaiveDate::from_ymd_opt(2024, 8, 1);
    let deal = form.submit(&mut store).unwrap();

    assert_eq!(deal.client_id, "c3");
    assert_eq!(deal.title, "Oportunidade: João Pereira");
    assert_eq!(store.ui().prefill, None);
    assert_eq!(store.client("c3").unwrap().status, ClientStatus::Negotiation);
}

#[test]
fn deal_form_edit_with_new_stage_runs_lifecycle_rules() {
    let mut store = seeded();
    let mut form = DealForm::edit(store.deal("d3").unwrap());
    form.value = Some(Decimal::from(9_500));
    form.stage = DealStage::Closed;

    let deal = form.submit(&mut store).unwrap();

    assert_eq!(deal.value, Decimal::from(9_500));
    assert_eq!(deal.stage, DealStage::Closed);
    assert_eq!(deal.probability, 100);
    assert_eq!(store.client("c3").unwrap().status, ClientStatus::Active);
    assert_eq!(store.undo_log().tags()[..2], ["MOVE_DEAL_STAGE", "UPDATE_DEAL"]);
}

#[test]
fn deal_form_with_unknown_stage_changes_nothing() {
    let mut store = seeded();
    let mut form = DealForm::edit(store.deal("d3").unwrap());
    form.title = "Renomeado".to_string();
    form.stage = DealStage::parse("archived");

    let err = form.submit(&mut store).unwrap_err();

    assert_eq!(
        err,
        FormError::Store(StoreError::UnknownPipelineStage("archived".to_string()))
    );
    assert_eq!(store.deal("d3").unwrap().title, "Pacote inicial");
}

#[test]
fn task_prefill_from_deal_links_task_to_deal() {
    let mut store = seeded();
    let prefill = store.prefill_task_from_deal("d2").unwrap();
    assert_eq!(store.ui().modal, Some(Modal::Task { task_id: None }));

    let mut form = TaskForm::from_prefill(&prefill);
    assert_eq!(form.title, "Follow-up: Licenças enterprise");
    form.due_date = NaiveDate::from_ymd_opt(2024, 6, 20);
    let task = form.submit(&mut store).unwrap();

    assert!(task.is_related_to(RelatedKind::Deal, "d2"));
    assert_eq!(task.status, "todo");

    let report = store.delete_deal("d2").unwrap();
    assert_eq!(report.tasks_removed, 2);
}

#[test]
fn task_form_rejects_unknown_column() {
    let mut store = seeded();
    let mut form = TaskForm::create();
    form.title = "Revisar contrato".to_string();
    form.due_date = NaiveDate::from_ymd_opt(2024, 6, 20);
    form.status = Some("archive".to_string());

    assert_eq!(
        form.submit(&mut store).unwrap_err(),
        FormError::Store(StoreError::UnknownTaskColumn("archive".to_string()))
    );
}

#[test]
fn task_from_conversation_carries_client_and_link() {
    let mut store = seeded();

    let prefill = store.prefill_task_from_conversation("conv2").unwrap();

    assert_eq!(prefill.client_id.as_deref(), Some("c3"));
    assert_eq!(prefill.title.as_deref(), Some("Responder João Pereira"));
    let related = prefill.related_to.unwrap();
    assert_eq!(related.kind, RelatedKind::Conversation);
    assert_eq!(related.id, "conv2");
}

#[test]
fn editing_target_reflects_open_modal() {
    let mut store = seeded();
    assert_eq!(store.editing_target(), None);

    store.open_modal(
        Modal::Deal {
            deal_id: Some("d1".to_string()),
        },
        None,
    );
    assert_eq!(store.editing_target(), Some((EntityKind::Deal, "d1")));

    store.close_modal();
    assert_eq!(store.editing_target(), None);
}

#[test]
fn navigation_and_selection_validate_ids() {
    let mut store = seeded();

    store.navigate(Page::Crm);
    store.select_client(Some("c1")).unwrap();
    assert_eq!(store.ui().page, Page::Crm);
    assert_eq!(store.ui().selected_client_id.as_deref(), Some("c1"));

    assert!(store.select_client(Some("ghost")).is_err());
    assert_eq!(store.ui().selected_client_id.as_deref(), Some("c1"));

    store.select_conversation(Some("conv1")).unwrap();
    assert_eq!(store.conversation("conv1").unwrap().unread_count, 0);

    store.set_current_user("tm3").unwrap();
    assert_eq!(store.current_user().unwrap().name, "Ricardo Alves");
    assert!(store.set_current_user("tm9").is_err());
}

#[test]
fn navigating_with_prefill_hands_values_to_next_form() {
    let mut store = seeded();

    store.navigate_with_prefill(
        Page::Tasks,
        Prefill {
            client_id: Some("c1".to_string()),
            title: Some("Ligar para Maria".to_string()),
            ..Prefill::default()
        },
    );

    assert_eq!(store.ui().page, Page::Tasks);
    let form = TaskForm::from_prefill(store.ui().prefill.as_ref().unwrap());
    assert_eq!(form.title, "Ligar para Maria");

    store.close_modal();
    assert_eq!(store.ui().prefill, None);
}
