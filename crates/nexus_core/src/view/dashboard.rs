//! Dashboard aggregates computed on read.
//!
//! # Responsibility
//! - Reduce clients, deals, tasks, goals and members into the dashboard
//!   cards, charts and team ranking.
//!
//! # Invariants
//! - Nothing here mutates the store or caches results.
//! - Percentages round half away from zero; a zero denominator yields 0.

use crate::model::client::ClientStatus;
use crate::model::deal::{Deal, DealStage};
use crate::model::team::{Goal, TeamMember};
use crate::store::CrmStore;
use chrono::{Datelike, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Portuguese month abbreviations, January first.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Bucket for clients whose tags match no known channel.
pub const OTHER_CHANNEL: &str = "Outros";

static LEAD_CHANNELS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    ["Instagram", "WhatsApp", "Google", "Indicação", "LinkedIn", "Site"]
        .into_iter()
        .map(|name| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(name));
            (name, Regex::new(&pattern).expect("valid channel regex"))
        })
        .collect()
});

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub revenue_closed: Decimal,
    pub pipeline_weighted: Decimal,
    pub pipeline_total: Decimal,
    pub average_ticket: Decimal,
    pub deals_closed: usize,
    pub deals_open: usize,
    pub deals_lost: usize,
    pub conversion_rate: u32,
    pub month_target: Decimal,
    pub month_progress: u32,
    pub clients_total: usize,
    pub clients_by_status: Vec<StatusCount>,
    pub tasks_pending: usize,
    pub tasks_overdue: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ClientStatus,
    pub count: usize,
}

/// One month of the revenue chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub label: &'static str,
    pub month: u32,
    pub year: i32,
    /// Closed deal value expected to close in this month.
    pub revenue: Decimal,
    /// Open deal value expected to close in this month.
    pub pipeline: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelShare {
    pub channel: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub member_id: String,
    pub name: String,
    pub revenue: Decimal,
    pub deals_closed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal_id: String,
    pub member_id: String,
    pub target: Decimal,
    pub realized: Decimal,
    /// Uncapped percentage of the target reached.
    pub percent: u32,
}

pub fn dashboard_stats(store: &CrmStore) -> DashboardStats {
    let deals = store.deals();
    let closed: Vec<&Deal> = deals.iter().filter(|deal| deal.stage == DealStage::Closed).collect();
    let open: Vec<&Deal> = deals.iter().filter(|deal| deal.stage.is_open()).collect();
    let deals_lost = deals.iter().filter(|deal| deal.stage == DealStage::Lost).count();

    let revenue_closed: Decimal = closed.iter().map(|deal| deal.value).sum();
    let pipeline_weighted: Decimal = open.iter().map(|deal| deal.weighted_value()).sum();
    let pipeline_total: Decimal = open.iter().map(|deal| deal.value).sum();
    let average_ticket = if closed.is_empty() {
        Decimal::ZERO
    } else {
        revenue_closed / Decimal::from(closed.len())
    };

    let today = store.today();
    let month_target = month_target(store.goals(), today);

    let clients_by_status = ClientStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            count: store
                .clients()
                .iter()
                .filter(|client| client.status == status)
                .count(),
        })
        .collect();

    let done_column = store.task_columns().last().map(|column| column.id.as_str());
    let pending: Vec<_> = store
        .tasks()
        .iter()
        .filter(|task| Some(task.status.as_str()) != done_column)
        .collect();
    let tasks_overdue = pending.iter().filter(|task| task.due_date < today).count();

    DashboardStats {
        revenue_closed,
        pipeline_weighted,
        pipeline_total,
        average_ticket,
        deals_closed: closed.len(),
        deals_open: open.len(),
        deals_lost,
        conversion_rate: percent(Decimal::from(closed.len()), Decimal::from(deals.len())),
        month_target,
        month_progress: percent(revenue_closed, month_target).min(100),
        clients_total: store.clients().len(),
        clients_by_status,
        tasks_pending: pending.len(),
        tasks_overdue,
    }
}

/// Sum of goal targets for the month containing `today`.
pub fn month_target(goals: &[Goal], today: NaiveDate) -> Decimal {
    goals
        .iter()
        .filter(|goal| goal.month == today.month() && goal.year == today.year())
        .map(|goal| goal.target)
        .sum()
}

/// Trailing window of months ending at the current month, oldest first.
pub fn monthly_series(store: &CrmStore) -> Vec<MonthlyPoint> {
    let today = store.today();
    let window = store.config().dashboard_window_months.max(1);
    let first_of_month = today.with_day(1).unwrap_or(today);

    (0..window)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(|month_start| {
            let in_month = |deal: &&Deal| {
                deal.expected_close_date.month() == month_start.month()
                    && deal.expected_close_date.year() == month_start.year()
            };
            let revenue = store
                .deals()
                .iter()
                .filter(in_month)
                .filter(|deal| deal.stage == DealStage::Closed)
                .map(|deal| deal.value)
                .sum();
            let pipeline = store
                .deals()
                .iter()
                .filter(in_month)
                .filter(|deal| deal.stage.is_open())
                .map(|deal| deal.value)
                .sum();
            MonthlyPoint {
                label: MONTH_LABELS[month_start.month0() as usize],
                month: month_start.month(),
                year: month_start.year(),
                revenue,
                pipeline,
            }
        })
        .collect()
}

/// Clients per acquisition channel, read from tags.
///
/// A client counts once, for the first channel any of its tags matches.
/// Channels keep their fixed order and [`OTHER_CHANNEL`] comes last.
pub fn lead_channels(store: &CrmStore) -> Vec<ChannelShare> {
    let mut counts = vec![0usize; LEAD_CHANNELS.len()];
    let mut other = 0usize;

    for client in store.clients() {
        let matched = LEAD_CHANNELS.iter().position(|(_, pattern)| {
            client.tags.iter().any(|tag| pattern.is_match(tag))
        });
        match matched {
            Some(index) => counts[index] += 1,
            None => other += 1,
        }
    }

    LEAD_CHANNELS
        .iter()
        .zip(counts)
        .map(|((channel, _), count)| ChannelShare { channel, count })
        .chain(std::iter::once(ChannelShare {
            channel: OTHER_CHANNEL,
            count: other,
        }))
        .collect()
}

/// Active members by closed revenue, highest first. Ties keep member order.
pub fn team_ranking(store: &CrmStore) -> Vec<RankingEntry> {
    let mut ranking: Vec<RankingEntry> = store
        .team_members()
        .iter()
        .filter(|member| member.is_active())
        .map(|member| {
            let closed: Vec<&Deal> = closed_deals_of(store.deals(), member).collect();
            RankingEntry {
                member_id: member.id.clone(),
                name: member.name.clone(),
                revenue: closed.iter().map(|deal| deal.value).sum(),
                deals_closed: closed.len(),
            }
        })
        .collect();
    ranking.sort_by(|left, right| right.revenue.cmp(&left.revenue));
    ranking
}

/// Realized revenue against one goal: closed deals of the member whose
/// expected close date falls in the goal month.
pub fn goal_progress(store: &CrmStore, goal: &Goal) -> GoalProgress {
    let realized = store
        .team_member(&goal.member_id)
        .map(|member| {
            closed_deals_of(store.deals(), member)
                .filter(|deal| {
                    deal.expected_close_date.month() == goal.month
                        && deal.expected_close_date.year() == goal.year
                })
                .map(|deal| deal.value)
                .sum()
        })
        .unwrap_or(Decimal::ZERO);

    GoalProgress {
        goal_id: goal.id.clone(),
        member_id: goal.member_id.clone(),
        target: goal.target,
        realized,
        percent: percent(realized, goal.target),
    }
}

/// `round(part / whole × 100)`, or 0 when `whole` is zero.
///
/// Negative ratios read as 0 and ratios past `u32::MAX` saturate.
pub fn percent(part: Decimal, whole: Decimal) -> u32 {
    if whole.is_zero() {
        return 0;
    }
    let ceiling = Decimal::from(u32::MAX);
    let ratio = part
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .unwrap_or_else(|| {
            if part.is_sign_negative() == whole.is_sign_negative() {
                ceiling
            } else {
                Decimal::ZERO
            }
        });
    ratio
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, ceiling)
        .to_u32()
        .unwrap_or(u32::MAX)
}

fn closed_deals_of<'a>(
    deals: &'a [Deal],
    member: &'a TeamMember,
) -> impl Iterator<Item = &'a Deal> + 'a {
    deals
        .iter()
        .filter(move |deal| deal.stage == DealStage::Closed && deal.assigned_to == member.name)
}

#[cfg(test)]
mod tests {
    use super::percent;
    use rust_decimal::Decimal;

    #[test]
    fn percent_rounds_half_away_from_zero() {
        assert_eq!(percent(Decimal::new(1, 0), Decimal::new(8, 0)), 13);
        assert_eq!(percent(Decimal::new(1, 0), Decimal::new(3, 0)), 33);
        assert_eq!(percent(Decimal::new(2, 0), Decimal::new(3, 0)), 67);
    }

    #[test]
    fn percent_saturates_instead_of_wrapping_to_zero() {
        let tiny = Decimal::new(1, 4);
        assert_eq!(percent(Decimal::from(135_000), tiny), u32::MAX);
        assert_eq!(percent(Decimal::MAX, tiny), u32::MAX);
        assert_eq!(percent(Decimal::from(-5), Decimal::from(10)), 0);
    }

    #[test]
    fn percent_of_zero_target_is_zero() {
        assert_eq!(percent(Decimal::new(500, 0), Decimal::ZERO), 0);
    }
}
