use chrono::Duration;
use nexus_core::model::conversation::{ConversationStatus, MessageDirection};
use nexus_core::model::settings::{NewWebhook, WebhookPatch, API_KEY_PREFIX};
use nexus_core::model::team::{NewTeamMember, TeamRole};
use nexus_core::{CrmStore, ManualClock, StoreConfig};
use std::collections::BTreeMap;

fn seeded_with_clock() -> (CrmStore, ManualClock) {
    let clock = ManualClock::at_date(2024, 6, 15).unwrap();
    let store = CrmStore::seeded(StoreConfig::default(), Box::new(clock.clone()));
    (store, clock)
}

#[test]
fn inbox_is_sorted_by_latest_activity() {
    let (mut store, clock) = seeded_with_clock();
    let order: Vec<&str> = store
        .inbox()
        .into_iter()
        .map(|conversation| conversation.id.as_str())
        .collect();
    assert_eq!(order, ["conv1", "conv3", "conv2"]);

    clock.advance(Duration::minutes(1));
    store.receive_message("conv2", "Podemos marcar amanhã?").unwrap();

    assert_eq!(store.inbox()[0].id, "conv2");
    assert_eq!(store.conversation("conv2").unwrap().unread_count, 1);
    assert_eq!(store.unread_total(), 4);
}

#[test]
fn replies_are_authored_by_current_user_and_reopen_closed_threads() {
    let (mut store, _clock) = seeded_with_clock();
    store
        .set_conversation_status("conv3", ConversationStatus::Closed)
        .unwrap();
    store.set_current_user("tm4").unwrap();

    let message = store.send_message("conv3", "Atendemos sim!").unwrap();

    assert_eq!(message.direction, MessageDirection::Outbound);
    assert_eq!(message.author, "Juliana Rocha");
    let conversation = store.conversation("conv3").unwrap();
    assert_eq!(conversation.status, ConversationStatus::Open);
    assert_eq!(conversation.last_message().unwrap().body, "Atendemos sim!");
    assert_eq!(conversation.unread_count, 1);
}

#[test]
fn mark_read_and_assign_update_conversation() {
    let (mut store, _clock) = seeded_with_clock();

    store.mark_conversation_read("conv1").unwrap();
    let assigned = store.assign_conversation("conv3", "Fernanda Lima").unwrap();

    assert_eq!(store.conversation("conv1").unwrap().unread_count, 0);
    assert_eq!(assigned.assigned_to, "Fernanda Lima");
    assert!(store.send_message("conv9", "oi").is_err());
}

#[test]
fn webhooks_toggle_and_delete() {
    let (mut store, _clock) = seeded_with_clock();

    let webhook = store.add_webhook(NewWebhook {
        name: "CRM externo".to_string(),
        url: "https://example.com/hook".to_string(),
        events: vec!["deal.closed".to_string()],
    });
    assert!(webhook.active);

    assert!(!store.toggle_webhook(&webhook.id).unwrap());
    assert!(store.toggle_webhook("wh2").unwrap());

    let renamed = store
        .update_webhook(
            &webhook.id,
            WebhookPatch {
                url: Some("https://example.com/v2".to_string()),
                active: Some(true),
                ..WebhookPatch::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.url, "https://example.com/v2");
    assert_eq!(renamed.name, "CRM externo");
    assert!(renamed.active);

    store.delete_webhook(&webhook.id).unwrap();
    assert_eq!(store.webhooks().len(), 2);
    assert!(store.toggle_webhook(&webhook.id).is_err());
}

#[test]
fn api_keys_are_generated_masked_and_revoked() {
    let (mut store, _clock) = seeded_with_clock();

    let key = store.generate_api_key(" Zapier ");
    assert_eq!(key.name, "Zapier");
    assert!(key.key.starts_with(API_KEY_PREFIX));
    assert!(key.active);

    let masked = key.masked();
    assert!(masked.starts_with(API_KEY_PREFIX));
    assert!(masked.ends_with(&key.key[key.key.len() - 4..]));
    assert!(!masked.contains(&key.key[API_KEY_PREFIX.len()..API_KEY_PREFIX.len() + 8]));

    let revoked = store.revoke_api_key(&key.id).unwrap();
    assert!(!revoked.active);
    assert_eq!(store.api_keys().len(), 2);

    store.delete_api_key(&key.id).unwrap();
    assert_eq!(store.api_keys().len(), 1);
}

#[test]
fn integrations_connect_and_disconnect() {
    let (mut store, _clock) = seeded_with_clock();
    let mut config = BTreeMap::new();
    config.insert("api_token".to_string(), "secret".to_string());

    let connected = store.connect_integration("zapier", config).unwrap();
    assert!(connected.connected);
    assert!(connected.connected_at.is_some());

    let disconnected = store.disconnect_integration("whatsapp").unwrap();
    assert!(!disconnected.connected);
    assert!(disconnected.config.is_empty());
    assert!(disconnected.connected_at.is_none());
}

#[test]
fn new_member_gets_role_default_permissions() {
    let (mut store, _clock) = seeded_with_clock();

    let member = store.add_team_member(NewTeamMember {
        name: "Beatriz Souza".to_string(),
        email: "beatriz@nexus.com.br".to_string(),
        role: TeamRole::Support,
        permissions: None,
    });

    assert_eq!(member.permissions, TeamRole::Support.default_permissions());
    assert_eq!(member.tenant_id, "t1");
}

#[test]
fn deleting_current_user_cascades_goals_and_switches_user() {
    let (mut store, _clock) = seeded_with_clock();
    store.set_current_user("tm2").unwrap();

    store.delete_team_member("tm2").unwrap();

    assert!(store.goals().iter().all(|goal| goal.member_id != "tm2"));
    assert_eq!(store.current_user().unwrap().id, "tm1");

    let report = store.undo().unwrap();
    assert_eq!(report.tag, "DELETE_TEAM_MEMBER");
    assert!(store.goals().iter().any(|goal| goal.id == "g2"));
    assert_eq!(store.team_members()[1].id, "tm2");
}

#[test]
fn notifications_expire_after_ttl_and_can_be_dismissed() {
    let (mut store, clock) = seeded_with_clock();
    store.delete_task("t4").unwrap();
    clock.advance(Duration::seconds(2));
    store.delete_task("t3").unwrap();
    assert_eq!(store.notifications().len(), 2);

    clock.advance(Duration::seconds(3));
    assert_eq!(store.expire_notifications(), 1);
    assert_eq!(
        store.notifications()[0].message,
        "Responder dúvida sobre entrega foi removida"
    );

    let id = store.notifications()[0].id.clone();
    assert!(store.dismiss_notification(&id));
    assert!(!store.dismiss_notification(&id));
    assert!(store.notifications().is_empty());
}

#[test]
fn snapshot_serializes_with_camel_case_keys() {
    let (store, _clock) = seeded_with_clock();

    let value = serde_json::to_value(store.snapshot()).unwrap();

    assert_eq!(value["tenantId"], "t1");
    assert_eq!(value["undoDepth"], 0);
    assert_eq!(value["ui"]["page"], "dashboard");
    assert_eq!(value["deals"][0]["stage"], "closed");
    assert_eq!(value["clients"][1]["type"], "PJ");
}
