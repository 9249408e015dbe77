//! Demo data set loaded by [`crate::CrmStore::seeded`].
//!
//! Dates are relative to the clock's today so the dashboard always has data
//! in the current month and the trailing window.

use crate::model::board::{default_pipeline_stages, default_task_columns, PipelineStage, TaskColumn};
use crate::model::client::{Client, ClientKind, ClientStatus};
use crate::model::conversation::{
    Channel, Conversation, ConversationStatus, Message, MessageDirection,
};
use crate::model::deal::{Deal, DealStage, StageChange};
use crate::model::settings::{ApiKey, Integration, IntegrationCategory, Webhook, API_KEY_PREFIX};
use crate::model::task::{RelatedKind, RelatedTo, Task, TaskPriority};
use crate::model::team::{Goal, MemberStatus, TeamMember, TeamRole};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Every collection of the demo data set, in display order.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub clients: Vec<Client>,
    pub deals: Vec<Deal>,
    pub tasks: Vec<Task>,
    pub team_members: Vec<TeamMember>,
    pub goals: Vec<Goal>,
    pub webhooks: Vec<Webhook>,
    pub api_keys: Vec<ApiKey>,
    pub integrations: Vec<Integration>,
    pub conversations: Vec<Conversation>,
    pub pipeline_stages: Vec<PipelineStage>,
    pub task_columns: Vec<TaskColumn>,
}

pub fn seed_data(today: NaiveDate, now: DateTime<Utc>, tenant_id: &str) -> SeedData {
    let team_members = team_members(now, tenant_id);
    SeedData {
        clients: clients(now, tenant_id),
        deals: deals(today, now, tenant_id),
        tasks: tasks(today, now, tenant_id),
        goals: goals(today),
        team_members,
        webhooks: webhooks(now),
        api_keys: api_keys(now),
        integrations: integrations(now),
        conversations: conversations(now),
        pipeline_stages: default_pipeline_stages(),
        task_columns: default_task_columns(),
    }
}

fn team_members(now: DateTime<Utc>, tenant_id: &str) -> Vec<TeamMember> {
    [
        ("tm1", "Carlos Mendes", "carlos@nexus.com.br", TeamRole::Owner),
        ("tm2", "Fernanda Lima", "fernanda@nexus.com.br", TeamRole::Sales),
        ("tm3", "Ricardo Alves", "ricardo@nexus.com.br", TeamRole::Sales),
        ("tm4", "Juliana Rocha", "juliana@nexus.com.br", TeamRole::Support),
        ("tm5", "Paulo Santos", "paulo@nexus.com.br", TeamRole::Finance),
    ]
    .into_iter()
    .map(|(id, name, email, role)| TeamMember {
        id: id.to_string(),
        tenant_id: tenant_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        status: MemberStatus::Active,
        permissions: role.default_permissions(),
        created_at: now - Duration::days(180),
    })
    .collect()
}

struct ClientSeed {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    kind: ClientKind,
    document: &'static str,
    company: Option<&'static str>,
    status: ClientStatus,
    assigned_to: &'static str,
    tags: &'static [&'static str],
    score: u8,
    estimated_value: i64,
    age_days: i64,
}

fn clients(now: DateTime<Utc>, tenant_id: &str) -> Vec<Client> {
    let rows = [
        ClientSeed {
            id: "c1",
            name: "Maria Silva",
            email: "maria.silva@email.com",
            phone: "(11) 98765-4321",
            kind: ClientKind::Individual,
            document: "123.456.789-00",
            company: None,
            status: ClientStatus::Active,
            assigned_to: "Fernanda Lima",
            tags: &["Instagram", "VIP"],
            score: 85,
            estimated_value: 15_000,
            age_days: 120,
        },
        ClientSeed {
            id: "c2",
            name: "Tech Solutions Ltda",
            email: "contato@techsolutions.com.br",
            phone: "(11) 3456-7890",
            kind: ClientKind::Company,
            document: "12.345.678/0001-90",
            company: Some("Tech Solutions Ltda"),
            status: ClientStatus::Negotiation,
            assigned_to: "Ricardo Alves",
            tags: &["LinkedIn", "Enterprise"],
            score: 72,
            estimated_value: 67_000,
            age_days: 60,
        },
        ClientSeed {
            id: "c3",
            name: "João Pereira",
            email: "joao.pereira@email.com",
            phone: "(21) 99876-5432",
            kind: ClientKind::Individual,
            document: "987.654.321-00",
            company: None,
            status: ClientStatus::Lead,
            assigned_to: "Fernanda Lima",
            tags: &["WhatsApp"],
            score: 40,
            estimated_value: 8_000,
            age_days: 10,
        },
        ClientSeed {
            id: "c4",
            name: "Construtora Horizonte",
            email: "compras@horizonte.com.br",
            phone: "(31) 3333-4444",
            kind: ClientKind::Company,
            document: "98.765.432/0001-10",
            company: Some("Construtora Horizonte S.A."),
            status: ClientStatus::Active,
            assigned_to: "Carlos Mendes",
            tags: &["Indicação", "Enterprise"],
            score: 92,
            estimated_value: 120_000,
            age_days: 200,
        },
        ClientSeed {
            id: "c5",
            name: "Ana Costa",
            email: "ana.costa@email.com",
            phone: "(41) 97777-8888",
            kind: ClientKind::Individual,
            document: "456.789.123-00",
            company: None,
            status: ClientStatus::Inactive,
            assigned_to: "Ricardo Alves",
            tags: &["Google"],
            score: 15,
            estimated_value: 5_000,
            age_days: 300,
        },
    ];

    rows.into_iter()
        .map(|row| {
            let created_at = now - Duration::days(row.age_days);
            Client {
                id: row.id.to_string(),
                tenant_id: tenant_id.to_string(),
                name: row.name.to_string(),
                email: row.email.to_string(),
                phone: row.phone.to_string(),
                kind: row.kind,
                document: Some(row.document.to_string()),
                company: row.company.map(str::to_string),
                status: row.status,
                assigned_to: row.assigned_to.to_string(),
                tags: row.tags.iter().map(|tag| tag.to_string()).collect(),
                notes: String::new(),
                score: row.score,
                estimated_value: Decimal::from(row.estimated_value),
                created_at,
                updated_at: created_at,
            }
        })
        .collect()
}

fn deals(today: NaiveDate, now: DateTime<Utc>, tenant_id: &str) -> Vec<Deal> {
    let rows: [(&str, &str, &str, i64, &[DealStage], u8, NaiveDate, &str); 6] = [
        (
            "d1",
            "Plano anual de consultoria",
            "c1",
            15_000,
            &[DealStage::New, DealStage::Proposal, DealStage::Closed],
            100,
            today,
            "Fernanda Lima",
        ),
        (
            "d2",
            "Licenças enterprise",
            "c2",
            45_000,
            &[DealStage::New, DealStage::Qualified, DealStage::Negotiation],
            70,
            today + Duration::days(20),
            "Ricardo Alves",
        ),
        (
            "d3",
            "Pacote inicial",
            "c3",
            8_000,
            &[DealStage::New],
            10,
            today + Duration::days(45),
            "Fernanda Lima",
        ),
        (
            "d4",
            "Sistema de gestão de obras",
            "c4",
            120_000,
            &[DealStage::New, DealStage::Negotiation, DealStage::Closed],
            100,
            months_before(today, 1),
            "Carlos Mendes",
        ),
        (
            "d5",
            "Integração com ERP",
            "c2",
            22_000,
            &[DealStage::New, DealStage::Proposal],
            50,
            today + Duration::days(30),
            "Ricardo Alves",
        ),
        (
            "d6",
            "Renovação de suporte",
            "c5",
            5_000,
            &[DealStage::New, DealStage::Lost],
            0,
            months_before(today, 2),
            "Ricardo Alves",
        ),
    ];

    rows.into_iter()
        .map(
            |(id, title, client_id, value, path, probability, close_date, owner)| {
                let created_at = now - Duration::days(30 * path.len() as i64);
                let history = stage_history(path, created_at, owner);
                let stage = path.last().cloned().unwrap_or(DealStage::New);
                let updated_at = history.last().map_or(created_at, |entry| entry.changed_at);
                Deal {
                    id: id.to_string(),
                    tenant_id: tenant_id.to_string(),
                    title: title.to_string(),
                    client_id: client_id.to_string(),
                    value: Decimal::from(value),
                    stage,
                    probability,
                    expected_close_date: close_date,
                    assigned_to: owner.to_string(),
                    notes: String::new(),
                    history,
                    created_at,
                    updated_at,
                }
            },
        )
        .collect()
}

/// History walking `path` in order, ten days between moves.
fn stage_history(path: &[DealStage], start: DateTime<Utc>, actor: &str) -> Vec<StageChange> {
    let mut previous: Option<DealStage> = None;
    path.iter()
        .enumerate()
        .map(|(step, stage)| {
            let entry = StageChange {
                from: previous.clone(),
                to: stage.clone(),
                changed_at: start + Duration::days(10 * step as i64),
                changed_by: actor.to_string(),
            };
            previous = Some(stage.clone());
            entry
        })
        .collect()
}

fn tasks(today: NaiveDate, now: DateTime<Utc>, tenant_id: &str) -> Vec<Task> {
    let rows = [
        (
            "t1",
            "Enviar proposta revisada",
            "Ajustar valores das licenças conforme reunião",
            "in_progress",
            TaskPriority::Urgent,
            today + Duration::days(1),
            "Ricardo Alves",
            Some(RelatedTo::new(RelatedKind::Deal, "d2", "Licenças enterprise")),
        ),
        (
            "t2",
            "Ligar para qualificar lead",
            "Entender orçamento e prazo",
            "todo",
            TaskPriority::High,
            today - Duration::days(2),
            "Fernanda Lima",
            Some(RelatedTo::new(RelatedKind::Client, "c3", "João Pereira")),
        ),
        (
            "t3",
            "Responder dúvida sobre entrega",
            "Cliente perguntou pelo prazo no Instagram",
            "review",
            TaskPriority::Medium,
            today,
            "Juliana Rocha",
            Some(RelatedTo::new(RelatedKind::Conversation, "conv1", "Maria Silva")),
        ),
        (
            "t4",
            "Atualizar planilha de comissões",
            "Fechamento do mês anterior",
            "done",
            TaskPriority::Low,
            today - Duration::days(5),
            "Paulo Santos",
            None,
        ),
    ];

    rows.into_iter()
        .map(
            |(id, title, description, status, priority, due_date, owner, related_to)| Task {
                id: id.to_string(),
                tenant_id: tenant_id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                status: status.to_string(),
                priority,
                due_date,
                assigned_to: owner.to_string(),
                related_to,
                created_at: now - Duration::days(7),
                updated_at: now - Duration::days(7),
            },
        )
        .collect()
}

fn goals(today: NaiveDate) -> Vec<Goal> {
    [("g1", "tm1", 100_000), ("g2", "tm2", 50_000), ("g3", "tm3", 40_000)]
        .into_iter()
        .map(|(id, member_id, target)| Goal {
            id: id.to_string(),
            member_id: member_id.to_string(),
            month: today.month(),
            year: today.year(),
            target: Decimal::from(target),
        })
        .collect()
}

fn webhooks(now: DateTime<Utc>) -> Vec<Webhook> {
    vec![
        Webhook {
            id: "wh1".to_string(),
            name: "ERP - novos clientes".to_string(),
            url: "https://erp.example.com/hooks/clients".to_string(),
            events: vec!["client.created".to_string(), "deal.closed".to_string()],
            active: true,
            created_at: now - Duration::days(90),
        },
        Webhook {
            id: "wh2".to_string(),
            name: "Slack - vendas".to_string(),
            url: "https://hooks.slack.com/services/T000/B000/XXXX".to_string(),
            events: vec!["deal.closed".to_string(), "deal.lost".to_string()],
            active: false,
            created_at: now - Duration::days(30),
        },
    ]
}

fn api_keys(now: DateTime<Utc>) -> Vec<ApiKey> {
    vec![ApiKey {
        id: "k1".to_string(),
        name: "Integração ERP".to_string(),
        key: format!("{API_KEY_PREFIX}4f9a2c7e1b3d5f8a0c2e4b6d8f1a3c5e"),
        active: true,
        created_at: now - Duration::days(90),
        last_used_at: Some(now - Duration::hours(3)),
    }]
}

fn integrations(now: DateTime<Utc>) -> Vec<Integration> {
    [
        ("whatsapp", "WhatsApp Business", IntegrationCategory::Messaging, true),
        ("instagram", "Instagram Direct", IntegrationCategory::Messaging, false),
        ("gmail", "Gmail", IntegrationCategory::Email, false),
        ("google_calendar", "Google Calendar", IntegrationCategory::Calendar, false),
        ("rd_station", "RD Station", IntegrationCategory::Marketing, false),
        ("zapier", "Zapier", IntegrationCategory::Automation, false),
    ]
    .into_iter()
    .map(|(id, name, category, connected)| {
        let mut config = BTreeMap::new();
        if connected {
            config.insert("phone_number_id".to_string(), "5511999990000".to_string());
        }
        Integration {
            id: id.to_string(),
            name: name.to_string(),
            category,
            connected,
            config,
            connected_at: connected.then(|| now - Duration::days(60)),
        }
    })
    .collect()
}

fn conversations(now: DateTime<Utc>) -> Vec<Conversation> {
    let message = |id: &str, direction, author: &str, body: &str, minutes_ago: i64| Message {
        id: id.to_string(),
        direction,
        author: author.to_string(),
        body: body.to_string(),
        sent_at: now - Duration::minutes(minutes_ago),
    };

    vec![
        Conversation {
            id: "conv1".to_string(),
            channel: Channel::Instagram,
            client_id: Some("c1".to_string()),
            contact_name: "Maria Silva".to_string(),
            status: ConversationStatus::Open,
            assigned_to: "Juliana Rocha".to_string(),
            unread_count: 2,
            messages: vec![
                message("m1", MessageDirection::Inbound, "Maria Silva", "Oi! Qual o prazo de entrega?", 50),
                message("m2", MessageDirection::Outbound, "Juliana Rocha", "Olá Maria, vou verificar para você.", 45),
                message("m3", MessageDirection::Inbound, "Maria Silva", "Obrigada!", 40),
                message("m4", MessageDirection::Inbound, "Maria Silva", "Consegue me avisar hoje?", 10),
            ],
            updated_at: now - Duration::minutes(10),
        },
        Conversation {
            id: "conv2".to_string(),
            channel: Channel::Whatsapp,
            client_id: Some("c3".to_string()),
            contact_name: "João Pereira".to_string(),
            status: ConversationStatus::Pending,
            assigned_to: "Fernanda Lima".to_string(),
            unread_count: 0,
            messages: vec![
                message("m5", MessageDirection::Inbound, "João Pereira", "Gostaria de conhecer os planos.", 300),
                message("m6", MessageDirection::Outbound, "Fernanda Lima", "Claro! Te envio a apresentação.", 280),
            ],
            updated_at: now - Duration::minutes(280),
        },
        Conversation {
            id: "conv3".to_string(),
            channel: Channel::Email,
            client_id: None,
            contact_name: "Roberto Nunes".to_string(),
            status: ConversationStatus::Open,
            assigned_to: String::new(),
            unread_count: 1,
            messages: vec![message(
                "m7",
                MessageDirection::Inbound,
                "Roberto Nunes",
                "Vocês atendem empresas de logística?",
                90,
            )],
            updated_at: now - Duration::minutes(90),
        },
    ]
}

/// Same day `months` earlier, clamped to the month's last day.
fn months_before(today: NaiveDate, months: u32) -> NaiveDate {
    today.checked_sub_months(Months::new(months)).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::seed_data;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn task_statuses_name_seeded_columns() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let data = seed_data(today, now, "t1");
        for task in &data.tasks {
            assert!(
                data.task_columns.iter().any(|column| column.id == task.status),
                "task {} in unknown column {}",
                task.id,
                task.status
            );
        }
    }

    #[test]
    fn month_shift_clamps_to_shorter_month() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let data = seed_data(today, now, "t1");
        let d4 = data.deals.iter().find(|deal| deal.id == "d4").unwrap();
        assert_eq!(d4.expected_close_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }
}
