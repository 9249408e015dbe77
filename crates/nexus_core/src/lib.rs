//! Core state and data layer for Nexus CRM.
//! This crate is the single source of truth for business rules.

pub mod clock;
pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use form::{ClientForm, DealForm, FieldErrors, FormError, FormMode, TaskForm};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{EntityId, EntityKind};
pub use repo::preference_repo::{
    PreferenceRepoError, PreferenceRepository, SqlitePreferenceRepository,
};
pub use service::onboarding_service::{OnboardingService, ONBOARDING_DONE_KEY};
pub use store::{
    CrmStore, DeleteReport, Modal, Page, Prefill, StageMove, StoreError, StoreResult,
    StoreSnapshot, UiState, UndoReport,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
