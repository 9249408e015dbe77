//! Store configuration.
//!
//! Defaults mirror the product behavior: tenant `t1`, a 10-entry undo log,
//! 5 second toasts, follow-up tasks one week after a won deal.

use std::time::Duration;

/// Tenant stamped on every record created by this build.
pub const DEFAULT_TENANT_ID: &str = "t1";
/// Name recorded in stage history when no active user is set.
pub const DEFAULT_ACTOR: &str = "Sistema";

/// Runtime knobs for [`crate::CrmStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Tenant id stamped on created records.
    pub tenant_id: String,
    /// Maximum number of undo entries kept; older entries are dropped.
    pub undo_capacity: usize,
    /// Lifetime of a toast notification.
    pub notification_ttl: Duration,
    /// Days between closing a deal and the onboarding follow-up due date.
    pub follow_up_days: i64,
    /// Months covered by the dashboard time series, current month included.
    pub dashboard_window_months: u32,
    /// Cosmetic delay the UI host waits before completing a form submit.
    pub submit_delay: Duration,
    /// Fallback actor name for history entries.
    pub actor: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            undo_capacity: 10,
            notification_ttl: Duration::from_secs(5),
            follow_up_days: 7,
            dashboard_window_months: 7,
            submit_delay: Duration::from_millis(800),
            actor: DEFAULT_ACTOR.to_string(),
        }
    }
}

impl StoreConfig {
    /// Returns a copy with a different tenant id.
    ///
    /// Blank values keep the default tenant.
    pub fn with_tenant(mut self, tenant_id: &str) -> Self {
        let trimmed = tenant_id.trim();
        if !trimmed.is_empty() {
            self.tenant_id = trimmed.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreConfig, DEFAULT_TENANT_ID};

    #[test]
    fn blank_tenant_keeps_default() {
        let config = StoreConfig::default().with_tenant("   ");
        assert_eq!(config.tenant_id, DEFAULT_TENANT_ID);
    }

    #[test]
    fn tenant_override_is_trimmed() {
        let config = StoreConfig::default().with_tenant(" acme ");
        assert_eq!(config.tenant_id, "acme");
    }
}
