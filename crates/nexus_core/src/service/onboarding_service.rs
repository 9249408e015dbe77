//! First-run onboarding flag.
//!
//! # Invariants
//! - The flag is stored as the literal `"true"`; any other value, or no
//!   row, means onboarding has not finished.

use crate::repo::preference_repo::{PreferenceRepoError, PreferenceRepository};

/// Preference key holding the onboarding flag.
pub const ONBOARDING_DONE_KEY: &str = "nexus_onboarding_done";

const DONE_VALUE: &str = "true";

pub struct OnboardingService<R: PreferenceRepository> {
    repo: R,
}

impl<R: PreferenceRepository> OnboardingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn is_done(&self) -> Result<bool, PreferenceRepoError> {
        Ok(self.repo.get(ONBOARDING_DONE_KEY)?.as_deref() == Some(DONE_VALUE))
    }

    pub fn mark_done(&self) -> Result<(), PreferenceRepoError> {
        self.repo.set(ONBOARDING_DONE_KEY, DONE_VALUE)?;
        log::info!("event=onboarding_complete module=prefs status=ok");
        Ok(())
    }

    /// Clears the flag so the onboarding flow shows again.
    pub fn reset(&self) -> Result<(), PreferenceRepoError> {
        self.repo.remove(ONBOARDING_DONE_KEY)?;
        log::info!("event=onboarding_reset module=prefs status=ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{OnboardingService, ONBOARDING_DONE_KEY};
    use crate::repo::preference_repo::{PreferenceRepoResult, PreferenceRepository};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryRepo {
        values: RefCell<HashMap<String, String>>,
    }

    impl PreferenceRepository for MemoryRepo {
        fn get(&self, key: &str) -> PreferenceRepoResult<Option<String>> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> PreferenceRepoResult<()> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> PreferenceRepoResult<bool> {
            Ok(self.values.borrow_mut().remove(key).is_some())
        }
    }

    #[test]
    fn unexpected_stored_value_is_not_done() {
        let repo = MemoryRepo::default();
        repo.set(ONBOARDING_DONE_KEY, "yes").unwrap();
        let service = OnboardingService::new(repo);
        assert!(!service.is_done().unwrap());

        service.mark_done().unwrap();
        assert!(service.is_done().unwrap());
        service.reset().unwrap();
        assert!(!service.is_done().unwrap());
    }
}
