use chrono::NaiveDate;
use nexus_core::model::client::{ClientPatch, ClientStatus};
use nexus_core::model::deal::DealStage;
use nexus_core::model::team::{NewGoal, TeamMemberPatch, MemberStatus};
use nexus_core::view::dashboard::{self, OTHER_CHANNEL};
use nexus_core::{CrmStore, ManualClock, StoreConfig};
use rust_decimal::Decimal;

fn seeded() -> CrmStore {
    let clock = ManualClock::at_date(2024, 6, 15).unwrap();
    CrmStore::seeded(StoreConfig::default(), Box::new(clock))
}

fn money(value: i64) -> Decimal {
    Decimal::from(value)
}

#[test]
fn seeded_stats_match_hand_computed_values() {
    let store = seeded();

    let stats = dashboard::dashboard_stats(&store);

    assert_eq!(stats.revenue_closed, money(135_000));
    assert_eq!(stats.pipeline_total, money(75_000));
    assert_eq!(stats.pipeline_weighted, money(43_300));
    assert_eq!(stats.average_ticket, money(67_500));
    assert_eq!(
        (stats.deals_closed, stats.deals_open, stats.deals_lost),
        (2, 3, 1)
    );
    assert_eq!(stats.conversion_rate, 33);
    assert_eq!(stats.month_target, money(190_000));
    assert_eq!(stats.month_progress, 71);
    assert_eq!(stats.clients_total, 5);
    assert_eq!(stats.tasks_pending, 3);
    assert_eq!(stats.tasks_overdue, 1);

    let leads = stats
        .clients_by_status
        .iter()
        .find(|entry| entry.status == ClientStatus::Lead)
        .unwrap();
    assert_eq!(leads.count, 1);
}

#[test]
fn empty_store_has_zeroed_stats() {
    let store = CrmStore::new(StoreConfig::default());

    let stats = dashboard::dashboard_stats(&store);

    assert_eq!(stats.revenue_closed, Decimal::ZERO);
    assert_eq!(stats.average_ticket, Decimal::ZERO);
    assert_eq!(stats.conversion_rate, 0);
    assert_eq!(stats.month_progress, 0);
}

#[test]
fn month_progress_is_capped_at_one_hundred() {
    let mut store = seeded();
    let today = store.today();
    for goal_id in ["g1", "g2", "g3"] {
        store.delete_goal(goal_id).unwrap();
    }
    store
        .set_goal(NewGoal {
            member_id: "tm1".to_string(),
            month: 6,
            year: 2024,
            target: money(1_000),
        })
        .unwrap();

    assert_eq!(dashboard::month_target(store.goals(), today), money(1_000));
    assert_eq!(dashboard::dashboard_stats(&store).month_progress, 100);
}

#[test]
fn monthly_series_covers_trailing_window() {
    let store = seeded();

    let series = dashboard::monthly_series(&store);

    assert_eq!(series.len(), 7);
    assert_eq!((series[0].label, series[0].month, series[0].year), ("Dez", 12, 2023));
    let june = series.last().unwrap();
    assert_eq!((june.label, june.year), ("Jun", 2024));
    assert_eq!(june.revenue, money(15_000));
    assert_eq!(june.pipeline, Decimal::ZERO);
    assert_eq!(series[5].revenue, money(120_000));
    assert_eq!(series[4].revenue, Decimal::ZERO);
}

#[test]
fn lead_channels_count_each_client_once() {
    let mut store = seeded();
    store
        .update_client(
            "c5",
            ClientPatch {
                tags: Some(vec!["evento".to_string()]),
                ..ClientPatch::default()
            },
        )
        .unwrap();
    store
        .update_client(
            "c1",
            ClientPatch {
                tags: Some(vec!["instagram".to_string(), "WhatsApp".to_string()]),
                ..ClientPatch::default()
            },
        )
        .unwrap();

    let channels = dashboard::lead_channels(&store);
    let count = |name: &str| {
        channels
            .iter()
            .find(|share| share.channel == name)
            .map_or(0, |share| share.count)
    };

    assert_eq!(channels.last().unwrap().channel, OTHER_CHANNEL);
    assert_eq!(count("Instagram"), 1);
    assert_eq!(count("WhatsApp"), 1);
    assert_eq!(count("Google"), 0);
    assert_eq!(count(OTHER_CHANNEL), 1);
    assert_eq!(channels.iter().map(|share| share.count).sum::<usize>(), 5);
}

#[test]
fn team_ranking_orders_active_members_by_closed_revenue() {
    let mut store = seeded();
    store
        .update_team_member(
            "tm5",
            TeamMemberPatch {
                status: Some(MemberStatus::Inactive),
                ..TeamMemberPatch::default()
            },
        )
        .unwrap();

    let ranking = dashboard::team_ranking(&store);

    let names: Vec<&str> = ranking.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(
        names,
        ["Carlos Mendes", "Fernanda Lima", "Ricardo Alves", "Juliana Rocha"]
    );
    assert_eq!(ranking[0].revenue, money(120_000));
    assert_eq!(ranking[1].deals_closed, 1);
}

#[test]
fn goal_progress_counts_closed_deals_in_goal_month() {
    let mut store = seeded();
    let goal = store.goals().iter().find(|goal| goal.id == "g2").cloned().unwrap();

    let progress = dashboard::goal_progress(&store, &goal);
    assert_eq!(progress.realized, money(15_000));
    assert_eq!(progress.percent, 30);

    store.move_deal_stage("d3", DealStage::Closed).unwrap();
    store
        .update_deal(
            "d3",
            nexus_core::model::deal::DealPatch {
                expected_close_date: NaiveDate::from_ymd_opt(2024, 6, 30),
                ..Default::default()
            },
        )
        .unwrap();

    let progress = dashboard::goal_progress(&store, &goal);
    assert_eq!(progress.realized, money(23_000));
    assert_eq!(progress.percent, 46);
}

#[test]
fn goal_upsert_replaces_target_for_same_month() {
    let mut store = seeded();
    let goals_before = store.goals().len();

    let goal = store
        .set_goal(NewGoal {
            member_id: "tm2".to_string(),
            month: 6,
            year: 2024,
            target: money(80_000),
        })
        .unwrap();

    assert_eq!(goal.id, "g2");
    assert_eq!(store.goals().len(), goals_before);
    assert!(store
        .set_goal(NewGoal {
            member_id: "tm2".to_string(),
            month: 13,
            year: 2024,
            target: money(1),
        })
        .is_err());
}

#[test]
fn tiny_target_still_reads_full_progress() {
    let mut store = seeded();
    for goal_id in ["g1", "g2", "g3"] {
        store.delete_goal(goal_id).unwrap();
    }
    let goal = store
        .set_goal(NewGoal {
            member_id: "tm1".to_string(),
            month: 6,
            year: 2024,
            target: Decimal::new(1, 4),
        })
        .unwrap();

    let stats = dashboard::dashboard_stats(&store);
    assert_eq!(stats.revenue_closed, money(135_000));
    assert_eq!(stats.month_progress, 100);

    let progress = dashboard::goal_progress(&store, &goal);
    assert!(progress.percent > 100);
}
