//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `nexus_core` linkage.
//! - Print a seeded dashboard summary for quick local sanity checks.

use nexus_core::view::dashboard;
use nexus_core::{CrmStore, StoreConfig, SystemClock};

fn main() {
    println!("nexus_core ping={}", nexus_core::ping());
    println!("nexus_core version={}", nexus_core::core_version());

    let store = CrmStore::seeded(StoreConfig::default(), Box::new(SystemClock));
    let stats = dashboard::dashboard_stats(&store);
    println!(
        "dashboard revenue_closed={} pipeline_weighted={} conversion_rate={}%",
        stats.revenue_closed, stats.pipeline_weighted, stats.conversion_rate
    );
    println!(
        "dashboard clients={} deals_open={} tasks_pending={} tasks_overdue={}",
        stats.clients_total, stats.deals_open, stats.tasks_pending, stats.tasks_overdue
    );
    for entry in dashboard::team_ranking(&store) {
        println!("ranking member={} revenue={}", entry.name, entry.revenue);
    }
}
